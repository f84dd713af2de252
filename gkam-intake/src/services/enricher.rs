//! Follower-count enrichment
//!
//! Best-effort lookup of follower counts for social links. The page markup
//! scraped here is undocumented and changes without notice, so every result
//! is advisory: failures are logged and reported as "no count", never as an
//! error.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;
use tracing::{debug, info};

use super::socials::{parse_shorthand_count, PlatformClassifier};
use crate::models::{Followers, SocialLink};
use gkam_common::config::EnrichmentConfig;

/// Source of follower counts for a profile URL
#[async_trait]
pub trait FollowerLookup: Send + Sync {
    /// Follower count for `url`, or `None` when unavailable for any reason
    async fn lookup(&self, url: &str) -> Option<u64>;
}

/// Lookup that never finds anything (enrichment switched off)
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLookup;

#[async_trait]
impl FollowerLookup for DisabledLookup {
    async fn lookup(&self, _url: &str) -> Option<u64> {
        None
    }
}

/// Patterns tried in order against the fetched page body
static FOLLOWER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // YouTube channel page
        r#""subscriberCountText".*?"simpleText":"([\d,.KMB]+)"#,
        // Instagram profile JSON
        r#""edge_followed_by":\s*\{\s*"count":\s*([0-9]+)\s*\}"#,
        // TikTok user JSON
        r#""fans":\s*"?([0-9,]+)"?"#,
        // Generic "1.2M followers"
        r"([\d.,]+[KkMmBb]?)\s*[Ff]ollowers",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Extract a follower count from a profile page body
pub fn extract_follower_count(body: &str) -> Option<u64> {
    FOLLOWER_PATTERNS
        .iter()
        .filter_map(|re| re.captures(body))
        .find_map(|caps| parse_shorthand_count(&caps[1]))
}

/// Scrapes public profile pages over HTTP
pub struct ScrapingFollowerLookup {
    http_client: reqwest::Client,
    max_body_bytes: usize,
}

impl ScrapingFollowerLookup {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            max_body_bytes: config.max_body_bytes,
        })
    }

    /// Fetch at most `max_body_bytes` of the page body
    async fn fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        let mut response = self.http_client.get(url).send().await?.error_for_status()?;

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            let room = self.max_body_bytes - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                debug!(url = %url, limit = self.max_body_bytes, "Profile page truncated");
                break;
            }
            body.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

#[async_trait]
impl FollowerLookup for ScrapingFollowerLookup {
    async fn lookup(&self, url: &str) -> Option<u64> {
        debug!(url = %url, "Fetching profile page for follower count");
        match self.fetch(url).await {
            Ok(body) => {
                let count = extract_follower_count(&body);
                if count.is_none() {
                    debug!(url = %url, "No follower count found in page");
                }
                count
            }
            Err(e) => {
                info!(url = %url, "Follower lookup failed: {}", e);
                None
            }
        }
    }
}

/// Fill in counts for links whose followers are unknown
///
/// Only links under a tracked platform label are looked up; the fallback
/// entry is never fetched. User-reported metrics are left untouched.
/// Returns how many links gained a count.
pub async fn enrich_socials(
    socials: &mut BTreeMap<String, SocialLink>,
    classifier: &PlatformClassifier,
    lookup: &dyn FollowerLookup,
) -> usize {
    let tracked: HashSet<&str> = classifier.labels().collect();
    let mut enriched = 0;
    for (label, link) in socials.iter_mut() {
        if !tracked.contains(label.as_str()) || !link.followers.is_unknown() {
            continue;
        }
        if let Some(count) = lookup.lookup(&link.url).await {
            debug!(platform = %label, count, "Follower count found");
            link.followers = Followers::Fetched(count);
            enriched += 1;
        }
    }
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use gkam_common::config::SocialsConfig;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers from a fixed table and remembers every URL it was asked for
    #[derive(Default)]
    struct FixedLookup {
        counts: HashMap<String, u64>,
        requested: Mutex<Vec<String>>,
    }

    impl FixedLookup {
        fn with(counts: &[(&str, u64)]) -> Self {
            Self {
                counts: counts.iter().map(|(u, c)| (u.to_string(), *c)).collect(),
                ..Self::default()
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FollowerLookup for FixedLookup {
        async fn lookup(&self, url: &str) -> Option<u64> {
            self.requested.lock().unwrap().push(url.to_string());
            self.counts.get(url).copied()
        }
    }

    fn classifier() -> PlatformClassifier {
        PlatformClassifier::new(SocialsConfig::default())
    }

    fn link(url: &str, followers: Followers) -> SocialLink {
        SocialLink {
            url: url.to_string(),
            followers,
        }
    }

    #[test]
    fn test_extract_youtube() {
        let body = r#"{"subscriberCountText":{"accessibility":{},"simpleText":"1.2M"}}"#;
        assert_eq!(extract_follower_count(body), Some(1_200_000));
    }

    #[test]
    fn test_extract_instagram() {
        let body = r#"..."edge_followed_by": {"count": 45678}..."#;
        assert_eq!(extract_follower_count(body), Some(45_678));
    }

    #[test]
    fn test_extract_tiktok() {
        let body = r#"{"stats":{"fans":"1,234","heart":9}}"#;
        assert_eq!(extract_follower_count(body), Some(1_234));
    }

    #[test]
    fn test_extract_generic() {
        assert_eq!(extract_follower_count("<span>12.5K Followers</span>"), Some(12_500));
        assert_eq!(extract_follower_count("<p>nothing here</p>"), None);
    }

    #[tokio::test]
    async fn test_enrich_only_unknown_links() {
        let mut socials = BTreeMap::new();
        socials.insert("TikTok".to_string(), link("https://tiktok.com/@x", Followers::Reported("3.1M".to_string())));
        socials.insert("YouTube".to_string(), link("https://youtube.com/@x", Followers::Unknown));
        socials.insert("other".to_string(), link("https://x.example", Followers::Unknown));

        let lookup = FixedLookup::with(&[
            ("https://tiktok.com/@x", 1),
            ("https://youtube.com/@x", 900),
            ("https://x.example", 5),
        ]);

        let enriched = enrich_socials(&mut socials, &classifier(), &lookup).await;

        assert_eq!(enriched, 1);
        assert_eq!(socials["TikTok"].followers, Followers::Reported("3.1M".to_string()));
        assert_eq!(socials["YouTube"].followers, Followers::Fetched(900));
        assert_eq!(socials["other"].followers, Followers::Unknown);
        assert_eq!(lookup.requested(), vec!["https://youtube.com/@x".to_string()]);
    }

    #[tokio::test]
    async fn test_fallback_link_is_never_requested() {
        let mut socials = BTreeMap::new();
        socials.insert(
            "other".to_string(),
            link("http://169.254.169.254/latest/meta-data", Followers::Unknown),
        );

        let lookup = FixedLookup::with(&[("http://169.254.169.254/latest/meta-data", 7)]);
        assert_eq!(enrich_socials(&mut socials, &classifier(), &lookup).await, 0);
        assert!(lookup.requested().is_empty());
        assert!(socials["other"].followers.is_unknown());
    }

    #[tokio::test]
    async fn test_disabled_lookup_changes_nothing() {
        let mut socials = BTreeMap::new();
        socials.insert("YouTube".to_string(), link("https://youtube.com/@x", Followers::Unknown));
        assert_eq!(enrich_socials(&mut socials, &classifier(), &DisabledLookup).await, 0);
        assert!(socials["YouTube"].followers.is_unknown());
    }

    /// Serve one HTTP response with `body` on a local port
    async fn serve_once(body: String) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(body.as_bytes()).await;
        });
        format!("http://{}/profile", addr)
    }

    #[tokio::test]
    async fn test_page_read_stops_at_body_limit() {
        let page = format!("{}<span>12.5K Followers</span>", " ".repeat(4096));

        let small = EnrichmentConfig {
            max_body_bytes: 1024,
            ..EnrichmentConfig::default()
        };
        let url = serve_once(page.clone()).await;
        let lookup = ScrapingFollowerLookup::new(&small).unwrap();
        assert_eq!(lookup.lookup(&url).await, None);

        let url = serve_once(page).await;
        let lookup = ScrapingFollowerLookup::new(&EnrichmentConfig::default()).unwrap();
        assert_eq!(lookup.lookup(&url).await, Some(12_500));
    }

    #[tokio::test]
    async fn test_unreachable_host_degrades_to_none() {
        let config = EnrichmentConfig {
            timeout_secs: 1,
            ..EnrichmentConfig::default()
        };
        let lookup = ScrapingFollowerLookup::new(&config).unwrap();
        assert_eq!(lookup.lookup("http://127.0.0.1:1/profile").await, None);
    }
}
