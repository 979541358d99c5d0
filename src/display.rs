//! Text formatting for word list views
//!
//! Pure helpers shared by the CLI and any host-side renderer.

use crate::consts::MAX_RATING;
use crate::model::WordRecord;

const MS_PER_MINUTE: i64 = 60 * 1000;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Rating as filled/empty dots, e.g. `●●○○○` for 2
pub fn rating_dots(rating: u8) -> String {
    let filled = rating.min(MAX_RATING) as usize;
    let mut dots = "●".repeat(filled);
    dots.push_str(&"○".repeat(MAX_RATING as usize - filled));
    dots
}

/// Format a timestamp relative to `now`
pub fn format_last_seen(timestamp: i64, now: i64) -> String {
    let diff = now.saturating_sub(timestamp).max(0);
    let days = diff / MS_PER_DAY;
    let hours = diff / MS_PER_HOUR;
    let mins = diff / MS_PER_MINUTE;

    if days >= 1 {
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else {
            chrono::DateTime::from_timestamp_millis(timestamp)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string())
        }
    } else if hours >= 1 {
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if mins >= 1 {
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

/// One list row: word, lemma, ratings, groups and last-seen time
pub fn format_row(word: &str, record: &WordRecord, now: i64) -> String {
    let mut row = word.to_string();
    if let Some(lemma) = &record.lemma {
        row.push_str(&format!(" ({})", lemma));
    }
    let last_seen = record
        .last_seen()
        .map(|t| format_last_seen(t, now))
        .unwrap_or_else(|| "-".to_string());
    row.push_str(&format!(
        "  R:{} P:{}  [{}]  {}",
        rating_dots(record.recall),
        rating_dots(record.production),
        record.groups.join(","),
        last_seen
    ));
    row
}
