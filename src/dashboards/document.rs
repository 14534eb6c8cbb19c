use std::sync::OnceLock;

use base64::prelude::*;
use regex::Regex;
use serde_json::Value;

pub const DEFAULT_REVISION: i64 = 1;

fn non_slug_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"))
}

/// URL-safe form of a dashboard title: lowercase ASCII alphanumerics joined
/// by single dashes.
///
/// Titles with no ASCII alphanumerics fall back to unpadded URL-safe base64
/// of the title, so only an empty title yields an empty slug.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = non_slug_chars()
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string();
    if slug.is_empty() && !title.is_empty() {
        return BASE64_URL_SAFE_NO_PAD.encode(title.as_bytes());
    }
    slug
}

/// A parsed dashboard definition.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardDocument {
    pub title: String,
    pub slug: String,
    pub revision: i64,
    pub data: Value,
}

impl DashboardDocument {
    pub fn from_json(data: Value) -> Self {
        let title = data
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let slug = match data.get("slug").and_then(Value::as_str) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => slugify(&title),
        };
        let revision = revision_of(&data);

        Self {
            title,
            slug,
            revision,
            data,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.data.get("description").and_then(Value::as_str)
    }
}

/// Integers that fit in `i64`; anything else falls back to 1.
fn revision_of(data: &Value) -> i64 {
    data.get("revision")
        .and_then(Value::as_i64)
        .unwrap_or(DEFAULT_REVISION)
}
