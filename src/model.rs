//! Word records and the serializable snapshot
//!
//! The snapshot is the wire/file contract shared by every persistence
//! backend:
//!
//! ```json
//! { "version": 1, "words": { "苹果": { "timestamps": [1700000000000],
//!   "recall": 0, "production": 0, "groups": ["default"], "lemma": null } } }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::{FORMAT_VERSION, MAX_RATING};
use crate::error::{Result, WordlistError};

/// Which self-rated strength a rating update targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingField {
    Recall,
    Production,
}

impl RatingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingField::Recall => "recall",
            RatingField::Production => "production",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "recall" | "r" => Some(RatingField::Recall),
            "production" | "prod" | "p" => Some(RatingField::Production),
            _ => None,
        }
    }
}

/// Clamp an arbitrary rating input into `0..=MAX_RATING`
#[inline]
pub fn clamp_rating(value: i64) -> u8 {
    value.clamp(0, MAX_RATING as i64) as u8
}

/// Trim a word key; `None` when nothing is left
#[inline]
pub fn normalize_word(word: &str) -> Option<&str> {
    let trimmed = word.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn deserialize_rating<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    i64::deserialize(deserializer).map(clamp_rating)
}

/// Everything known about one vocabulary word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    /// Epoch millis of every time the word was added, oldest first
    pub timestamps: Vec<i64>,
    /// Self-rated recall strength (0-5)
    #[serde(deserialize_with = "deserialize_rating")]
    pub recall: u8,
    /// Self-rated production strength (0-5)
    #[serde(deserialize_with = "deserialize_rating")]
    pub production: u8,
    /// Tags such as "default"; unique, in insertion order
    pub groups: Vec<String>,
    /// Dictionary form, `None` when unset
    pub lemma: Option<String>,
}

impl WordRecord {
    /// A freshly added word: one timestamp, zero ratings, a single group
    pub fn new(timestamp: i64, group: &str) -> Self {
        Self {
            timestamps: vec![timestamp],
            recall: 0,
            production: 0,
            groups: vec![group.to_string()],
            lemma: None,
        }
    }

    pub fn rating(&self, field: RatingField) -> u8 {
        match field {
            RatingField::Recall => self.recall,
            RatingField::Production => self.production,
        }
    }

    pub fn set_rating(&mut self, field: RatingField, value: i64) {
        let value = clamp_rating(value);
        match field {
            RatingField::Recall => self.recall = value,
            RatingField::Production => self.production = value,
        }
    }

    /// Most recent time the word was encountered
    pub fn last_seen(&self) -> Option<i64> {
        self.timestamps.last().copied()
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    /// Remove `group` if present, otherwise add it. Returns true if added.
    pub fn toggle_group(&mut self, group: &str) -> bool {
        match self.groups.iter().position(|g| g == group) {
            Some(idx) => {
                self.groups.remove(idx);
                false
            }
            None => {
                self.groups.push(group.to_string());
                true
            }
        }
    }

    /// Set the lemma; an empty value clears it
    pub fn set_lemma(&mut self, lemma: Option<&str>) {
        self.lemma = lemma.filter(|l| !l.is_empty()).map(str::to_string);
    }

    /// Fold another record for the same word into this one
    fn merge(&mut self, other: WordRecord) {
        self.timestamps.extend(other.timestamps);
        self.timestamps.sort_unstable();
        self.recall = self.recall.max(other.recall);
        self.production = self.production.max(other.production);
        for group in other.groups {
            if !self.in_group(&group) {
                self.groups.push(group);
            }
        }
        if self.lemma.is_none() {
            self.lemma = other.lemma;
        }
    }

    /// Bring a record read from outside back within its invariants
    fn repair(&mut self, now: i64) {
        self.recall = self.recall.min(MAX_RATING);
        self.production = self.production.min(MAX_RATING);
        if self.timestamps.is_empty() {
            self.timestamps.push(now);
        }
        let mut seen = Vec::with_capacity(self.groups.len());
        for group in self.groups.drain(..) {
            if !group.is_empty() && !seen.contains(&group) {
                seen.push(group);
            }
        }
        self.groups = seen;
        if self.lemma.as_deref() == Some("") {
            self.lemma = None;
        }
    }
}

/// Full serializable state of the word list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub words: BTreeMap<String, WordRecord>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshot {
    /// Empty word list at the current format version
    pub fn new() -> Self {
        Self {
            version: FORMAT_VERSION,
            words: BTreeMap::new(),
        }
    }

    /// Parse snapshot text. Shape errors and future versions are rejected;
    /// out-of-range ratings are clamped.
    pub fn from_json(text: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(text)?;
        if snapshot.version > FORMAT_VERSION {
            return Err(WordlistError::UnsupportedVersion {
                found: snapshot.version,
                supported: FORMAT_VERSION,
            });
        }
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Repair every record so the store invariants hold.
    ///
    /// Keys are trimmed (empty keys dropped, colliding keys merged), groups
    /// de-duplicated, empty lemmas cleared, and records without timestamps
    /// stamped with `now`. The version is upgraded to the current one.
    pub fn repaired(self, now: i64) -> Self {
        let mut words: BTreeMap<String, WordRecord> = BTreeMap::new();
        for (key, mut record) in self.words {
            let Some(word) = normalize_word(&key) else {
                log::warn!("Dropping record with empty word key");
                continue;
            };
            record.repair(now);
            match words.get_mut(word) {
                Some(existing) => {
                    log::warn!("Merging duplicate records for '{}'", word);
                    existing.merge(record);
                }
                None => {
                    words.insert(word.to_string(), record);
                }
            }
        }
        Self {
            version: FORMAT_VERSION,
            words,
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
