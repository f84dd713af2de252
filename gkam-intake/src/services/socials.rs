//! Social link parsing and platform classification
//!
//! Input is free text: one or more `url [metric]` entries separated by
//! newlines, or by commas followed by whitespace or another link. Commas
//! inside a URL or a metric such as `3,456` stay part of the entry. Platforms are recognized by URL host; anything else
//! lands under the fallback label.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

use crate::models::{Followers, SocialLink};
use gkam_common::config::SocialsConfig;

/// Follower metric as typed by users or shown on profile pages: `1.2M`, `3,456`, `12k`
static SHORTHAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([\d][\d.,]*)\s*([KkMmBb])?$").expect("shorthand pattern is valid")
});

/// Result of parsing one socials message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSocials {
    /// (platform label, link) in input order
    pub links: Vec<(String, SocialLink)>,
    /// Entries that were not http(s) links
    pub rejected: Vec<String>,
}

/// Classifies URLs into platform labels
#[derive(Debug, Clone)]
pub struct PlatformClassifier {
    config: SocialsConfig,
}

impl PlatformClassifier {
    pub fn new(config: SocialsConfig) -> Self {
        Self { config }
    }

    pub fn fallback_label(&self) -> &str {
        &self.config.fallback_label
    }

    /// Tracked platform labels in template order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.config.platforms.iter().map(|p| p.label.as_str())
    }

    /// Platform label for `url`, or the fallback label
    pub fn classify(&self, url: &Url) -> &str {
        let Some(host) = url.host_str().map(normalize_host) else {
            return self.fallback_label();
        };
        self.config
            .platforms
            .iter()
            .find(|p| {
                p.hosts.iter().any(|h| {
                    let h = normalize_host(h.trim());
                    !h.is_empty() && (host == h || host.ends_with(&format!(".{}", h)))
                })
            })
            .map(|p| p.label.as_str())
            .unwrap_or_else(|| self.fallback_label())
    }

    /// Parse a socials message into classified links
    pub fn parse(&self, text: &str) -> ParsedSocials {
        let mut parsed = ParsedSocials::default();

        for entry in split_entries(text) {
            let mut parts = entry.split_whitespace();
            let Some(raw_url) = parts.next() else {
                continue;
            };
            let metric = parts.next();

            let Some(url) = parse_link(raw_url) else {
                parsed.rejected.push(entry.to_string());
                continue;
            };

            let followers = match metric {
                Some(m) if parse_shorthand_count(m).is_some() => Followers::Reported(m.to_string()),
                Some(m) => {
                    tracing::debug!(metric = %m, "Ignoring unrecognized follower metric");
                    Followers::Unknown
                }
                None => Followers::Unknown,
            };

            let label = self.classify(&url).to_string();
            parsed.links.push((
                label,
                SocialLink {
                    url: raw_url.to_string(),
                    followers,
                },
            ));
        }

        parsed
    }
}

/// Split a socials message into trimmed, non-empty entries
fn split_entries(text: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    for line in text.lines() {
        let mut start = 0;
        for (i, _) in line.match_indices(',') {
            let rest = &line[i + 1..];
            let lower_rest = rest.get(..8).unwrap_or(rest).to_ascii_lowercase();
            let separates = rest.is_empty()
                || rest.starts_with(char::is_whitespace)
                || lower_rest.starts_with("http://")
                || lower_rest.starts_with("https://");
            if separates {
                entries.push(&line[start..i]);
                start = i + 1;
            }
        }
        entries.push(&line[start..]);
    }
    entries
        .into_iter()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect()
}

fn normalize_host(host: &str) -> String {
    let host = host.to_lowercase();
    host.strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .map(str::to_string)
        .unwrap_or(host)
}

/// Accept only absolute http(s) URLs with a host
fn parse_link(raw: &str) -> Option<Url> {
    let lower = raw.to_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return None;
    }
    Url::parse(raw).ok().filter(|u| u.host_str().is_some())
}

/// Convert shorthand counts (`1.2M`, `3,456`, `2b`) to an integer
///
/// Returns `None` when the text is not a count.
pub fn parse_shorthand_count(text: &str) -> Option<u64> {
    let caps = SHORTHAND.captures(text.trim())?;
    let number: f64 = caps[1].replace(',', "").parse().ok()?;
    let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(s) if s == "k" => 1_000.0,
        Some(s) if s == "m" => 1_000_000.0,
        Some(s) if s == "b" => 1_000_000_000.0,
        _ => 1.0,
    };
    let value = (number * multiplier).round();
    (value.is_finite() && value >= 0.0).then_some(value as u64)
}
