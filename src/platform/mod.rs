//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time (epoch millis)
//! - Where durable data lives on native targets

/// Current wall-clock time in epoch milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> i64 {
    js_sys::Date::now() as i64
}

/// Current wall-clock time in epoch milliseconds
#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Platform-specific data directory for the word list
///
/// - macOS: `~/Library/Application Support/zh-wordlist`
/// - Linux: `~/.local/share/zh-wordlist` (or `$XDG_DATA_HOME/zh-wordlist`)
/// - Windows: `%APPDATA%\zh-wordlist`
/// - Fallback: `./wordlist_data`
#[cfg(not(target_arch = "wasm32"))]
pub fn data_dir() -> std::path::PathBuf {
    directories::ProjectDirs::from("", "", "zh-wordlist")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| std::path::PathBuf::from("./wordlist_data"))
}
