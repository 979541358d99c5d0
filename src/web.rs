//! Browser API for host pages
//!
//! `WordlistWidget` wraps a `WordStore` backed by LocalStorage. Rendering is
//! left to the host: register a callback with `onChange` and redraw from
//! the data it receives (or from `getData()`).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::error::WordlistError;
use crate::model::{RatingField, Snapshot};
use crate::persistence::{LocalStorage, export, remote};
use crate::settings::Settings;
use crate::store::WordStore;

type SharedStore = Rc<RefCell<WordStore<LocalStorage>>>;

fn to_js(e: WordlistError) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

fn snapshot_to_js(snapshot: &Snapshot) -> Result<JsValue, JsValue> {
    let json = snapshot.to_json().map_err(to_js)?;
    js_sys::JSON::parse(&json)
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Word list handle exposed to JavaScript
#[wasm_bindgen]
pub struct WordlistWidget {
    store: SharedStore,
    settings: Settings,
    /// Set by the store's change listener, cleared when the host is notified
    dirty: Rc<Cell<bool>>,
    on_change: Rc<RefCell<Option<js_sys::Function>>>,
}

#[wasm_bindgen]
impl WordlistWidget {
    /// Open the word list. `settings` is an optional JSON string.
    #[wasm_bindgen(constructor)]
    pub fn new(settings: Option<String>) -> Result<WordlistWidget, JsValue> {
        let settings = match settings {
            Some(json) => Settings::from_json(&json).map_err(to_js)?,
            None => Settings::default(),
        };

        let storage = LocalStorage::new(settings.storage_key.clone());
        let mut store = WordStore::open(storage)
            .map_err(to_js)?
            .with_default_group(&settings.default_group);

        let dirty = Rc::new(Cell::new(false));
        let flag = dirty.clone();
        store.set_on_change(move |_| flag.set(true));

        log::info!("Word list widget ready ({} words)", store.len());
        Ok(Self {
            store: Rc::new(RefCell::new(store)),
            settings,
            dirty,
            on_change: Rc::new(RefCell::new(None)),
        })
    }

    /// Register the redraw callback; it receives the snapshot object
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: js_sys::Function) {
        *self.on_change.borrow_mut() = Some(callback);
    }

    #[wasm_bindgen(js_name = addWord)]
    pub fn add_word(&self, word: &str, group: Option<String>) -> bool {
        let changed = {
            let mut store = self.store.borrow_mut();
            match group {
                Some(group) => store.add_word_to_group(word, &group),
                None => store.add_word(word),
            }
        };
        self.notify();
        changed
    }

    #[wasm_bindgen(js_name = removeWord)]
    pub fn remove_word(&self, word: &str) -> bool {
        let changed = self.store.borrow_mut().remove_word(word);
        self.notify();
        changed
    }

    /// `field` is "recall" or "production"; the value is clamped to 0-5
    #[wasm_bindgen(js_name = updateRating)]
    pub fn update_rating(&self, word: &str, field: &str, value: f64) -> Result<bool, JsValue> {
        let field = parse_field(field)?;
        let changed = self
            .store
            .borrow_mut()
            .update_rating(word, field, value as i64);
        self.notify();
        Ok(changed)
    }

    #[wasm_bindgen(js_name = cycleRating)]
    pub fn cycle_rating(&self, word: &str, field: &str) -> Result<bool, JsValue> {
        let field = parse_field(field)?;
        let changed = self.store.borrow_mut().cycle_rating(word, field);
        self.notify();
        Ok(changed)
    }

    #[wasm_bindgen(js_name = setLemma)]
    pub fn set_lemma(&self, word: &str, lemma: Option<String>) -> bool {
        let changed = self.store.borrow_mut().set_lemma(word, lemma.as_deref());
        self.notify();
        changed
    }

    #[wasm_bindgen(js_name = toggleGroup)]
    pub fn toggle_group(&self, word: &str, group: &str) -> bool {
        let changed = self.store.borrow_mut().toggle_group(word, group);
        self.notify();
        changed
    }

    /// Current snapshot as a plain object (a copy; mutating it has no effect)
    #[wasm_bindgen(js_name = getData)]
    pub fn get_data(&self) -> Result<JsValue, JsValue> {
        snapshot_to_js(self.store.borrow().snapshot())
    }

    #[wasm_bindgen(js_name = wordCount)]
    pub fn word_count(&self) -> usize {
        self.store.borrow().len()
    }

    /// Download the word list as `wordlist_<millis>.json`
    #[wasm_bindgen(js_name = saveFile)]
    pub fn save_file(&self) -> Result<(), JsValue> {
        let store = self.store.borrow();
        export::download(store.snapshot(), store.now_millis()).map_err(to_js)
    }

    /// Replace the word list with the contents of a user-selected file
    #[wasm_bindgen(js_name = loadFile)]
    pub fn load_file(&self, file: web_sys::File) -> js_sys::Promise {
        let store = self.store.clone();
        let notifier = self.notifier();
        future_to_promise(async move {
            let token = store.borrow_mut().begin_load();
            let snapshot = export::read_browser_file(&file).await.map_err(to_js)?;
            let applied = store.borrow_mut().finish_load(token, snapshot);
            notifier.notify(&store);
            Ok(JsValue::from_bool(applied))
        })
    }

    /// POST the word list to `endpoint` (or the configured endpoint)
    #[wasm_bindgen(js_name = saveAccount)]
    pub fn save_account(&self, endpoint: Option<String>) -> Result<js_sys::Promise, JsValue> {
        let endpoint = self.resolve_endpoint(endpoint)?;
        let body = self.store.borrow().snapshot().to_json().map_err(to_js)?;
        Ok(future_to_promise(async move {
            remote::save_account(&endpoint, body).await.map_err(to_js)?;
            Ok(JsValue::TRUE)
        }))
    }

    /// GET the word list from `endpoint` (or the configured endpoint) and
    /// replace the local one. A failed request leaves the list unchanged.
    #[wasm_bindgen(js_name = loadAccount)]
    pub fn load_account(&self, endpoint: Option<String>) -> Result<js_sys::Promise, JsValue> {
        let endpoint = self.resolve_endpoint(endpoint)?;
        let store = self.store.clone();
        let notifier = self.notifier();
        Ok(future_to_promise(async move {
            let token = store.borrow_mut().begin_load();
            let snapshot = remote::load_account(&endpoint).await.map_err(to_js)?;
            let applied = store.borrow_mut().finish_load(token, snapshot);
            notifier.notify(&store);
            Ok(JsValue::from_bool(applied))
        }))
    }
}

impl WordlistWidget {
    fn resolve_endpoint(&self, endpoint: Option<String>) -> Result<String, JsValue> {
        self.settings
            .endpoint(endpoint.as_deref())
            .map(str::to_string)
            .ok_or_else(|| js_sys::Error::new("no account endpoint configured").into())
    }

    fn notifier(&self) -> Notifier {
        Notifier {
            dirty: self.dirty.clone(),
            callback: self.on_change.clone(),
        }
    }

    fn notify(&self) {
        self.notifier().notify(&self.store);
    }
}

/// Forwards store changes to the host callback once the store is released
struct Notifier {
    dirty: Rc<Cell<bool>>,
    callback: Rc<RefCell<Option<js_sys::Function>>>,
}

impl Notifier {
    fn notify(&self, store: &SharedStore) {
        if !self.dirty.replace(false) {
            return;
        }
        let Some(callback) = self.callback.borrow().clone() else {
            return;
        };
        let data = match snapshot_to_js(store.borrow().snapshot()) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("Could not convert word list for callback: {:?}", e);
                return;
            }
        };
        if let Err(e) = callback.call1(&JsValue::NULL, &data) {
            log::warn!("onChange callback failed: {:?}", e);
        }
    }
}

fn parse_field(field: &str) -> Result<RatingField, JsValue> {
    RatingField::from_str(field)
        .ok_or_else(|| js_sys::Error::new(&format!("unknown rating field '{}'", field)).into())
}
