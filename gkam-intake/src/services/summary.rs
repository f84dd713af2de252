//! Summary text formatter
//!
//! Fixed-shape template: banner, four labeled fields, then one line per
//! tracked platform in configured order whether or not a link was given.

use std::collections::BTreeMap;

use crate::models::{Field, Followers, IntakeFields, SocialLink};

const BANNER: &str = "^^^^^^^^^^^^^^^";
const FOOTER: &str = "===============";
const EMPTY_FIELD: &str = "-";
const EMPTY_COUNT: &str = "( x )";
const EMPTY_URL: &str = "-";

/// Render the summary block
///
/// `platforms` lists the tracked platform labels in output order; entries in
/// `socials` under other labels are not rendered.
pub fn build_summary<'a>(
    fields: &IntakeFields,
    socials: &BTreeMap<String, SocialLink>,
    platforms: impl IntoIterator<Item = &'a str>,
) -> String {
    let mut lines = vec![BANNER.to_string(), String::new()];

    for field in Field::ALL {
        lines.push(format!(
            "{}: {}",
            field.label(),
            fields.get(field).map(str::trim).unwrap_or(EMPTY_FIELD)
        ));
    }

    lines.push("Top socials:".to_string());
    for platform in platforms {
        lines.push(social_line(platform, socials.get(platform)));
    }

    lines.push(String::new());
    lines.push(FOOTER.to_string());
    lines.join("\n")
}

fn social_line(platform: &str, link: Option<&SocialLink>) -> String {
    match link {
        Some(link) => format!("{} {} - {}", platform, count_text(&link.followers), link.url),
        None => format!("{} {} - {}", platform, EMPTY_COUNT, EMPTY_URL),
    }
}

fn count_text(followers: &Followers) -> String {
    match followers {
        Followers::Unknown => EMPTY_COUNT.to_string(),
        known => format!("({})", known),
    }
}
