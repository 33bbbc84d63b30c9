//! Display formatting shared by the views.

use chrono::{DateTime, Local, Utc};

pub const MISSING: &str = "—";

/// Description length shown in episode rows.
pub const DESCRIPTION_LIMIT: usize = 140;

/// "DD Month YYYY" in UTC, e.g. "03 November 2022"; "—" when missing or invalid.
pub fn format_updated(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return MISSING.to_string();
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Utc).format("%d %B %Y").to_string(),
        Err(_) => MISSING.to_string(),
    }
}

/// Local short date and time for when a favorite was added.
pub fn format_added_at(added_at: &DateTime<Utc>) -> String {
    added_at
        .with_timezone(&Local)
        .format("%d %b %Y, %H:%M")
        .to_string()
}

/// Cut `text` to `limit` characters, appending "…" when anything was dropped.
pub fn shorten(text: &str, limit: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let cut: String = text.chars().take(limit).collect();
    format!("{}…", cut.trim_end())
}

/// " · S{n}" / " · E{n}" suffix for the player bar.
pub fn episode_suffix(season: Option<u32>, episode: Option<u32>) -> String {
    let mut out = String::new();
    if let Some(s) = season {
        out.push_str(&format!(" · S{s}"));
    }
    if let Some(e) = episode {
        out.push_str(&format!(" · E{e}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_updated() {
        assert_eq!(format_updated("2022-11-03T07:00:00.000Z"), "03 November 2022");
        assert_eq!(format_updated("2022-11-03T23:30:00-05:00"), "04 November 2022");
        assert_eq!(format_updated(""), "—");
        assert_eq!(format_updated("yesterday"), "—");
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("short", 140), "short");
        let long = "a".repeat(200);
        let out = shorten(&long, 140);
        assert_eq!(out.chars().count(), 141);
        assert!(out.ends_with('…'));
        assert_eq!(shorten("héllo wörld", 5), "héllo…");
    }

    #[test]
    fn test_episode_suffix() {
        assert_eq!(episode_suffix(Some(2), Some(5)), " · S2 · E5");
        assert_eq!(episode_suffix(None, Some(5)), " · E5");
        assert_eq!(episode_suffix(None, None), "");
    }
}
