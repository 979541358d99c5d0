//! The word store
//!
//! Owns the word → record map, enforces record invariants, and persists the
//! whole snapshot through its adapter after every mutation. Mutations on a
//! word that is not in the store are silent no-ops; each mutator returns
//! whether anything changed.

use crate::consts::DEFAULT_GROUP;
use crate::error::Result;
use crate::model::{RatingField, Snapshot, WordRecord, normalize_word};
use crate::persistence::PersistenceAdapter;
use crate::platform;

/// Source of "now" for new timestamps
pub trait Clock {
    /// Current time in epoch milliseconds
    fn now_millis(&self) -> i64;
}

/// Wall clock of the current platform
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        platform::now_millis()
    }
}

impl<F: Fn() -> i64> Clock for F {
    fn now_millis(&self) -> i64 {
        self()
    }
}

/// Called with the new snapshot after every change
pub type ChangeListener = Box<dyn FnMut(&Snapshot)>;

/// Identifies one started load; only the newest may replace the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadToken(u64);

pub struct WordStore<A: PersistenceAdapter> {
    snapshot: Snapshot,
    adapter: A,
    clock: Box<dyn Clock>,
    on_change: Option<ChangeListener>,
    default_group: String,
    load_generation: u64,
}

impl<A: PersistenceAdapter> WordStore<A> {
    /// Open the store and load whatever the adapter holds
    pub fn open(adapter: A) -> Result<Self> {
        Self::open_with_clock(adapter, SystemClock)
    }

    pub fn open_with_clock(adapter: A, clock: impl Clock + 'static) -> Result<Self> {
        let clock: Box<dyn Clock> = Box::new(clock);
        let snapshot = match adapter.load()? {
            Some(snapshot) => snapshot.repaired(clock.now_millis()),
            None => Snapshot::new(),
        };
        log::info!("Word store opened with {} words", snapshot.len());

        Ok(Self {
            snapshot,
            adapter,
            clock,
            on_change: None,
            default_group: DEFAULT_GROUP.to_string(),
            load_generation: 0,
        })
    }

    /// Group used by `add_word` when none is given
    pub fn with_default_group(mut self, group: &str) -> Self {
        if let Some(group) = normalize_word(group) {
            self.default_group = group.to_string();
        }
        self
    }

    pub fn default_group(&self) -> &str {
        &self.default_group
    }

    /// Register the "data changed" sink, replacing any previous one
    pub fn set_on_change(&mut self, listener: impl FnMut(&Snapshot) + 'static) {
        self.on_change = Some(Box::new(listener));
    }

    pub fn clear_on_change(&mut self) {
        self.on_change = None;
    }

    // --- Reads ---

    /// Read-only view of the whole store
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn get(&self, word: &str) -> Option<&WordRecord> {
        self.snapshot.words.get(word.trim())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.get(word).is_some()
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Words and records in stable (sorted) order
    pub fn words(&self) -> impl Iterator<Item = (&str, &WordRecord)> {
        self.snapshot.words.iter().map(|(w, r)| (w.as_str(), r))
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    // --- Mutations ---

    /// Add a word to the default group, or record another encounter
    pub fn add_word(&mut self, word: &str) -> bool {
        let group = self.default_group.clone();
        self.add_word_to_group(word, &group)
    }

    /// Add a word, or append a timestamp if it is already known.
    ///
    /// An existing record keeps its ratings, groups and lemma. Input that is
    /// empty after trimming is ignored.
    pub fn add_word_to_group(&mut self, word: &str, group: &str) -> bool {
        let Some(word) = normalize_word(word) else {
            return false;
        };
        let group = normalize_word(group)
            .unwrap_or(self.default_group.as_str())
            .to_string();
        let now = self.clock.now_millis();

        match self.snapshot.words.get_mut(word) {
            Some(record) => {
                record.timestamps.push(now);
                log::debug!("Re-encountered '{}' ({} times)", word, record.timestamps.len());
            }
            None => {
                self.snapshot
                    .words
                    .insert(word.to_string(), WordRecord::new(now, &group));
                log::debug!("Added '{}' to group '{}'", word, group);
            }
        }
        self.commit();
        true
    }

    /// Set a rating, clamped to 0-5
    pub fn update_rating(&mut self, word: &str, field: RatingField, value: i64) -> bool {
        let Some(record) = self.snapshot.words.get_mut(word.trim()) else {
            return false;
        };
        record.set_rating(field, value);
        log::debug!("Set {} of '{}' to {}", field.as_str(), word, record.rating(field));
        self.commit();
        true
    }

    /// Advance a rating by one, wrapping from 5 back to 0
    pub fn cycle_rating(&mut self, word: &str, field: RatingField) -> bool {
        let Some(current) = self.get(word).map(|r| r.rating(field)) else {
            return false;
        };
        let next = (current as i64 + 1) % (crate::consts::MAX_RATING as i64 + 1);
        self.update_rating(word, field, next)
    }

    /// Delete a word entirely
    pub fn remove_word(&mut self, word: &str) -> bool {
        if self.snapshot.words.remove(word.trim()).is_none() {
            return false;
        }
        log::debug!("Removed '{}'", word);
        self.commit();
        true
    }

    /// Set the lemma; `None` or an empty string clears it.
    ///
    /// Fires the change listener like every other mutator.
    pub fn set_lemma(&mut self, word: &str, lemma: Option<&str>) -> bool {
        let Some(record) = self.snapshot.words.get_mut(word.trim()) else {
            return false;
        };
        record.set_lemma(lemma);
        log::debug!("Set lemma of '{}' to {:?}", word, record.lemma);
        self.commit();
        true
    }

    /// Add the word to `group`, or take it out if already a member.
    /// The group name is trimmed; an empty name is ignored.
    pub fn toggle_group(&mut self, word: &str, group: &str) -> bool {
        let Some(group) = normalize_word(group) else {
            return false;
        };
        let Some(record) = self.snapshot.words.get_mut(word.trim()) else {
            return false;
        };
        let added = record.toggle_group(group);
        log::debug!(
            "{} '{}' {} group '{}'",
            if added { "Added" } else { "Removed" },
            word,
            if added { "to" } else { "from" },
            group
        );
        self.commit();
        true
    }

    /// Replace the entire store with `snapshot` (after repair) and persist it
    pub fn replace_all(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot.repaired(self.clock.now_millis());
        log::info!("Word store replaced ({} words)", self.snapshot.len());
        self.commit();
    }

    /// Parse imported snapshot text and replace the store with it.
    /// On error the store is unchanged.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        let snapshot = Snapshot::from_json(text)?;
        self.replace_all(snapshot);
        Ok(())
    }

    // --- Asynchronous loads ---

    /// Mark the start of a load; any earlier pending load is superseded
    pub fn begin_load(&mut self) -> LoadToken {
        self.load_generation += 1;
        LoadToken(self.load_generation)
    }

    /// Apply the result of a load started with `token`.
    ///
    /// Returns `false` (and leaves the store alone) if a newer load has been
    /// started since.
    pub fn finish_load(&mut self, token: LoadToken, snapshot: Snapshot) -> bool {
        if token.0 != self.load_generation {
            log::info!("Discarding result of superseded load #{}", token.0);
            return false;
        }
        self.replace_all(snapshot);
        true
    }

    // --- Persistence ---

    /// Persist the current snapshot
    pub fn save(&mut self) -> Result<()> {
        self.adapter.save(&self.snapshot)
    }

    /// Persist and notify; a failed save is logged, never raised
    fn commit(&mut self) {
        if let Err(e) = self.adapter.save(&self.snapshot) {
            log::warn!("Failed to save word list: {}", e);
        }
        if let Some(listener) = self.on_change.as_mut() {
            listener(&self.snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WordlistError;
    use crate::model::clamp_rating;
    use crate::persistence::MemoryStorage;
    use proptest::prelude::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn fixed_clock(t: Rc<Cell<i64>>) -> impl Fn() -> i64 {
        move || t.get()
    }

    fn empty_store() -> (WordStore<MemoryStorage>, Rc<Cell<i64>>) {
        let time = Rc::new(Cell::new(1_000));
        let store =
            WordStore::open_with_clock(MemoryStorage::new(), fixed_clock(time.clone())).unwrap();
        (store, time)
    }

    /// Adapter whose saves always fail
    struct BrokenStorage;

    impl PersistenceAdapter for BrokenStorage {
        fn save(&mut self, _snapshot: &Snapshot) -> Result<()> {
            Err(WordlistError::Storage("quota exceeded".to_string()))
        }

        fn load(&self) -> Result<Option<Snapshot>> {
            Ok(None)
        }
    }

    #[test]
    fn test_add_word_twice_appends_timestamp() {
        let (mut store, time) = empty_store();
        assert!(store.add_word("苹果"));
        store.update_rating("苹果", RatingField::Production, 3);
        time.set(2_000);
        assert!(store.add_word("苹果"));

        assert_eq!(store.len(), 1);
        let record = store.get("苹果").unwrap();
        assert_eq!(record.timestamps, vec![1_000, 2_000]);
        assert_eq!(record.recall, 0);
        assert_eq!(record.production, 3);
        assert_eq!(record.groups, vec!["default"]);
        assert_eq!(record.lemma, None);
    }

    #[test]
    fn test_add_word_trims_and_rejects_blank() {
        let (mut store, _) = empty_store();
        assert!(!store.add_word("  "));
        assert!(!store.add_word(""));
        assert!(store.is_empty());
        assert_eq!(store.adapter().save_count(), 0);

        assert!(store.add_word("  你好\n"));
        assert!(store.contains("你好"));
        assert_eq!(store.words().next().unwrap().0, "你好");
    }

    #[test]
    fn test_add_word_to_group() {
        let (mut store, _) = empty_store();
        store.add_word_to_group("苹果", "食物");
        store.add_word_to_group("苹果", "水果");
        // Re-adding never changes groups
        assert_eq!(store.get("苹果").unwrap().groups, vec!["食物"]);

        store.add_word_to_group("水", " ");
        assert_eq!(store.get("水").unwrap().groups, vec!["default"]);
    }

    #[test]
    fn test_custom_default_group() {
        let (store, _) = empty_store();
        let mut store = store.with_default_group("hsk1");
        store.add_word("我");
        assert_eq!(store.get("我").unwrap().groups, vec!["hsk1"]);
    }

    #[test]
    fn test_scenario_clamped_production() {
        let (mut store, _) = empty_store();
        store.add_word("你好");
        assert!(store.update_rating("你好", RatingField::Production, 7));
        assert_eq!(store.get("你好").unwrap().production, 5);
        assert_eq!(store.snapshot().len(), 1);

        store.update_rating("你好", RatingField::Recall, -4);
        assert_eq!(store.get("你好").unwrap().recall, 0);
    }

    #[test]
    fn test_mutations_on_missing_word_are_noops() {
        let (mut store, _) = empty_store();
        store.add_word("水");
        let before = store.snapshot().clone();
        let saves = store.adapter().save_count();

        assert!(!store.remove_word("nonexistent"));
        assert!(!store.update_rating("nonexistent", RatingField::Recall, 3));
        assert!(!store.cycle_rating("nonexistent", RatingField::Recall));
        assert!(!store.set_lemma("nonexistent", Some("x")));
        assert!(!store.toggle_group("nonexistent", "g"));

        assert_eq!(store.snapshot(), &before);
        assert_eq!(store.adapter().save_count(), saves);
    }

    #[test]
    fn test_remove_word() {
        let (mut store, _) = empty_store();
        store.add_word("苹果");
        assert!(store.remove_word("苹果"));
        assert!(store.get("苹果").is_none());
        // Re-adding starts over, no tombstone
        store.add_word("苹果");
        assert_eq!(store.get("苹果").unwrap().timestamps.len(), 1);
    }

    #[test]
    fn test_toggle_group_twice_restores() {
        let (mut store, _) = empty_store();
        store.add_word("苹果");
        let original = store.get("苹果").unwrap().groups.clone();

        store.toggle_group("苹果", "食物");
        assert!(store.get("苹果").unwrap().in_group("食物"));
        store.toggle_group("苹果", "食物");
        assert_eq!(store.get("苹果").unwrap().groups, original);

        store.toggle_group("苹果", "default");
        assert!(store.get("苹果").unwrap().groups.is_empty());
    }

    #[test]
    fn test_toggle_group_normalizes_name() {
        let (mut store, _) = empty_store();
        store.add_word("苹果");
        let saves = store.adapter().save_count();

        assert!(!store.toggle_group("苹果", ""));
        assert!(!store.toggle_group("苹果", "   "));
        assert_eq!(store.get("苹果").unwrap().groups, vec!["default"]);
        assert_eq!(store.adapter().save_count(), saves);

        assert!(store.toggle_group("苹果", "  食物 "));
        assert!(store.toggle_group("苹果", "食物"));
        assert_eq!(store.get("苹果").unwrap().groups, vec!["default"]);

        store.toggle_group("苹果", "  x ");
        assert_eq!(store.get("苹果").unwrap().groups, vec!["default", "x"]);

        let exported = store.snapshot().to_pretty_json().unwrap();
        let (mut other, _) = empty_store();
        other.import_json(&exported).unwrap();
        assert_eq!(other.snapshot(), store.snapshot());
    }

    #[test]
    fn test_set_lemma_empty_is_null() {
        let (mut store, _) = empty_store();
        store.add_word("苹果");
        store.set_lemma("苹果", Some("苹果儿"));
        assert_eq!(store.get("苹果").unwrap().lemma.as_deref(), Some("苹果儿"));
        store.set_lemma("苹果", Some(""));
        assert_eq!(store.get("苹果").unwrap().lemma, None);
        store.set_lemma("苹果", Some("果"));
        store.set_lemma("苹果", None);
        assert_eq!(store.get("苹果").unwrap().lemma, None);
    }

    #[test]
    fn test_cycle_rating_wraps() {
        let (mut store, _) = empty_store();
        store.add_word("水");
        for expected in [1, 2, 3, 4, 5, 0] {
            store.cycle_rating("水", RatingField::Recall);
            assert_eq!(store.get("水").unwrap().recall, expected);
        }
    }

    #[test]
    fn test_every_mutation_persists_and_notifies() {
        let (mut store, _) = empty_store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store.set_on_change(move |snapshot| sink.borrow_mut().push(snapshot.len()));

        store.add_word("苹果");
        store.update_rating("苹果", RatingField::Recall, 2);
        store.set_lemma("苹果", Some("苹果"));
        store.toggle_group("苹果", "食物");
        store.add_word("水");
        store.remove_word("苹果");

        assert_eq!(*seen.borrow(), vec![1, 1, 1, 1, 2, 1]);
        assert_eq!(store.adapter().save_count(), 6);

        let persisted = store.adapter().load().unwrap().unwrap();
        assert_eq!(&persisted, store.snapshot());
    }

    #[test]
    fn test_save_failure_does_not_fail_mutation() {
        let mut store = WordStore::open(BrokenStorage).unwrap();
        assert!(store.add_word("苹果"));
        assert!(store.contains("苹果"));
        assert!(store.save().is_err());
    }

    #[test]
    fn test_open_loads_and_repairs() {
        let json = r#"{"version":1,"words":{" 水 ":{"timestamps":[],"recall":9,
            "production":1,"groups":["default","default"],"lemma":""}}}"#;
        let time = Rc::new(Cell::new(5_000));
        let store =
            WordStore::open_with_clock(MemoryStorage::with_json(json), fixed_clock(time)).unwrap();

        let record = store.get("水").unwrap();
        assert_eq!(record.timestamps, vec![5_000]);
        assert_eq!(record.recall, 5);
        assert_eq!(record.groups, vec!["default"]);
        assert_eq!(record.lemma, None);
    }

    #[test]
    fn test_open_malformed_is_error() {
        let result = WordStore::open(MemoryStorage::with_json("{not json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_import_round_trip() {
        let (mut store, _) = empty_store();
        store.add_word("苹果");
        store.add_word("苹果");
        store.update_rating("苹果", RatingField::Recall, 4);
        store.toggle_group("苹果", "食物");
        store.set_lemma("苹果", Some("苹果"));
        store.add_word("水");

        let exported = store.snapshot().to_pretty_json().unwrap();
        let (mut other, _) = empty_store();
        other.import_json(&exported).unwrap();
        assert_eq!(other.snapshot(), store.snapshot());
        assert!(other.adapter().json().is_some());
    }

    #[test]
    fn test_failed_import_leaves_store_unchanged() {
        let (mut store, _) = empty_store();
        store.add_word("水");
        let before = store.snapshot().clone();
        assert!(store.import_json(r#"{"version":1}"#).is_err());
        assert!(store.import_json(r#"{"version":3,"words":{}}"#).is_err());
        assert_eq!(store.snapshot(), &before);
    }

    #[test]
    fn test_superseded_load_is_discarded() {
        let (mut store, _) = empty_store();
        let mut first = Snapshot::new();
        first
            .words
            .insert("一".to_string(), WordRecord::new(1, "default"));
        let mut second = Snapshot::new();
        second
            .words
            .insert("二".to_string(), WordRecord::new(2, "default"));

        let old = store.begin_load();
        let new = store.begin_load();

        assert!(store.finish_load(new, second));
        assert!(!store.finish_load(old, first));
        assert!(store.contains("二"));
        assert!(!store.contains("一"));
    }

    proptest! {
        #[test]
        fn prop_update_rating_clamps(value in any::<i64>(), production in any::<bool>()) {
            let (mut store, _) = empty_store();
            store.add_word("词");
            let field = if production { RatingField::Production } else { RatingField::Recall };
            store.update_rating("词", field, value);
            let expected = value.clamp(0, 5) as u8;
            prop_assert_eq!(store.get("词").unwrap().rating(field), expected);
            prop_assert_eq!(clamp_rating(value), expected);
        }

        #[test]
        fn prop_toggle_group_is_involution(group in "[a-z\u{4e00}-\u{4e2f}]{1,6}") {
            let (mut store, _) = empty_store();
            store.add_word("词");
            let before = store.get("词").unwrap().groups.clone();
            store.toggle_group("词", &group);
            store.toggle_group("词", &group);
            prop_assert_eq!(&store.get("词").unwrap().groups, &before);
        }
    }
}
