//! zh-wordlist - a personal vocabulary list
//!
//! Core modules:
//! - `model`: Word records and the serializable snapshot format
//! - `store`: The word store and its mutation/persistence contract
//! - `persistence`: LocalStorage, file, export/import and remote backends
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Storage key, default group and account endpoint
//! - `display`: Text helpers for rendering a word list
//! - `web`: wasm-bindgen API for host pages (wasm32 only)

pub mod display;
pub mod error;
pub mod model;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod store;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{Result, WordlistError};
pub use model::{RatingField, Snapshot, WordRecord};
pub use persistence::{MemoryStorage, PersistenceAdapter};
pub use settings::Settings;
pub use store::{Clock, LoadToken, SystemClock, WordStore};

#[cfg(not(target_arch = "wasm32"))]
pub use persistence::JsonFileStorage;
#[cfg(target_arch = "wasm32")]
pub use persistence::LocalStorage;

/// Word list constants
pub mod consts {
    /// Storage key of the word list (LocalStorage key / native file stem)
    pub const STORAGE_KEY: &str = "zh_known_wordlist";
    /// Snapshot format version written by this crate
    pub const FORMAT_VERSION: u32 = 1;
    /// Highest recall/production rating
    pub const MAX_RATING: u8 = 5;
    /// Group given to new words when none is specified
    pub const DEFAULT_GROUP: &str = "default";
}
