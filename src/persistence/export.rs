//! File export and import
//!
//! Exports are pretty-printed snapshots named `wordlist_<epoch-millis>.json`.
//! Imports accept the same format; anything else is a hard error and the
//! caller decides how to report it.

use crate::error::Result;
use crate::model::Snapshot;

/// Delay before a download's object URL is released
#[cfg(target_arch = "wasm32")]
const REVOKE_DELAY_MS: i32 = 1000;

/// Download name for an export taken at `now`
pub fn file_name(now: i64) -> String {
    format!("wordlist_{}.json", now)
}

/// Pretty-printed export body
pub fn to_pretty_json(snapshot: &Snapshot) -> Result<String> {
    snapshot.to_pretty_json()
}

/// Parse the contents of a user-supplied file
pub fn parse(text: &str) -> Result<Snapshot> {
    Snapshot::from_json(text)
}

/// Write an export into `dir`, returning the file path
#[cfg(not(target_arch = "wasm32"))]
pub fn write_to_dir(
    dir: &std::path::Path,
    snapshot: &Snapshot,
    now: i64,
) -> Result<std::path::PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name(now));
    std::fs::write(&path, to_pretty_json(snapshot)?)?;
    log::info!("Exported {} words to {}", snapshot.len(), path.display());
    Ok(path)
}

/// Read and parse an exported file
#[cfg(not(target_arch = "wasm32"))]
pub fn read_file(path: &std::path::Path) -> Result<Snapshot> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

/// Offer the snapshot to the user as a downloaded file
#[cfg(target_arch = "wasm32")]
pub fn download(snapshot: &Snapshot, now: i64) -> Result<()> {
    use wasm_bindgen::JsCast;
    use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

    use crate::error::WordlistError;

    let js_err = |e: wasm_bindgen::JsValue| WordlistError::Storage(format!("{:?}", e));

    let body = to_pretty_json(snapshot)?;
    let parts = js_sys::Array::of1(&wasm_bindgen::JsValue::from_str(&body));
    let options = BlobPropertyBag::new();
    options.set_type("application/json");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options).map_err(js_err)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(js_err)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| WordlistError::Storage("no document".to_string()))?;
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| WordlistError::Storage("not an anchor element".to_string()))?;
    anchor.set_href(&url);
    anchor.set_download(&file_name(now));
    anchor.click();

    // The download may start after click() returns, so release the URL later
    let revoke = wasm_bindgen::closure::Closure::once(move || {
        if let Err(e) = Url::revoke_object_url(&url) {
            log::warn!("Failed to revoke export URL: {:?}", e);
        }
    });
    web_sys::window()
        .ok_or_else(|| WordlistError::Storage("no window".to_string()))?
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            revoke.as_ref().unchecked_ref(),
            REVOKE_DELAY_MS,
        )
        .map_err(js_err)?;
    revoke.forget();

    log::info!("Exported {} words", snapshot.len());
    Ok(())
}

/// Read a user-selected browser file and parse it
#[cfg(target_arch = "wasm32")]
pub async fn read_browser_file(file: &web_sys::File) -> Result<Snapshot> {
    use crate::error::WordlistError;

    let text = wasm_bindgen_futures::JsFuture::from(file.text())
        .await
        .map_err(|e| WordlistError::Storage(format!("{:?}", e)))?;
    let text = text
        .as_string()
        .ok_or_else(|| WordlistError::Storage("file contents are not text".to_string()))?;
    parse(&text)
}
