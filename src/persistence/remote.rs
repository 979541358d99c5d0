//! Account storage over HTTP
//!
//! Save is a `POST` of the serialized snapshot to the endpoint; load is a
//! `GET` expecting a snapshot body. There is no retry and no auth; a
//! transport failure or non-2xx status is returned to the caller and the
//! store is left untouched.

use crate::error::{Result, WordlistError};
use crate::model::Snapshot;

/// Longest response excerpt carried in an error
const MAX_ERROR_BODY: usize = 200;

/// Request body for a remote save
pub fn encode_upload(snapshot: &Snapshot) -> Result<String> {
    snapshot.to_json()
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn status_error(status: u16, body: &str) -> WordlistError {
    let message = if body.is_empty() {
        "no response body".to_string()
    } else {
        body.chars().take(MAX_ERROR_BODY).collect()
    };
    WordlistError::Remote { status, message }
}

/// Interpret the response to a remote save; the body is otherwise ignored
pub fn check_upload(status: u16, body: &str) -> Result<()> {
    if is_success(status) {
        Ok(())
    } else {
        Err(status_error(status, body))
    }
}

/// Interpret the response to a remote load
pub fn decode_download(status: u16, body: &str) -> Result<Snapshot> {
    if !is_success(status) {
        return Err(status_error(status, body));
    }
    Snapshot::from_json(body)
}

/// Blocking HTTP client for native builds
#[cfg(not(target_arch = "wasm32"))]
pub struct RemoteClient {
    http_client: reqwest::blocking::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for RemoteClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl RemoteClient {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::blocking::Client::new(),
        }
    }

    /// POST the snapshot to `endpoint`
    pub fn save_account(&self, endpoint: &str, snapshot: &Snapshot) -> Result<()> {
        let body = encode_upload(snapshot)?;
        log::debug!("Uploading {} bytes to {}", body.len(), endpoint);

        let response = self
            .http_client
            .post(endpoint)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .map_err(|e| WordlistError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().unwrap_or_default();
        check_upload(status, &text)?;

        log::info!("Saved {} words to {}", snapshot.len(), endpoint);
        Ok(())
    }

    /// GET a snapshot from `endpoint`
    pub fn load_account(&self, endpoint: &str) -> Result<Snapshot> {
        let response = self
            .http_client
            .get(endpoint)
            .send()
            .map_err(|e| WordlistError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .map_err(|e| WordlistError::Transport(e.to_string()))?;
        let snapshot = decode_download(status, &text)?;

        log::info!("Loaded {} words from {}", snapshot.len(), endpoint);
        Ok(snapshot)
    }
}

#[cfg(target_arch = "wasm32")]
mod fetch {
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Headers, Request, RequestInit, Response};

    use crate::error::{Result, WordlistError};

    fn transport(e: JsValue) -> WordlistError {
        WordlistError::Transport(format!("{:?}", e))
    }

    /// Run a fetch and return `(status, body text)`
    pub async fn send(method: &str, endpoint: &str, body: Option<&str>) -> Result<(u16, String)> {
        let init = RequestInit::new();
        init.set_method(method);
        if let Some(body) = body {
            let headers = Headers::new().map_err(transport)?;
            headers
                .set("Content-Type", "application/json")
                .map_err(transport)?;
            init.set_headers(&headers);
            init.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(endpoint, &init).map_err(transport)?;
        let window = web_sys::window()
            .ok_or_else(|| WordlistError::Transport("no window".to_string()))?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(transport)?
            .dyn_into()
            .map_err(transport)?;

        let text = JsFuture::from(response.text().map_err(transport)?)
            .await
            .map_err(transport)?
            .as_string()
            .unwrap_or_default();
        Ok((response.status(), text))
    }
}

/// POST the serialized snapshot to `endpoint` using `fetch`
#[cfg(target_arch = "wasm32")]
pub async fn save_account(endpoint: &str, body: String) -> Result<()> {
    let (status, text) = fetch::send("POST", endpoint, Some(&body)).await?;
    check_upload(status, &text)?;
    log::info!("Saved word list to {}", endpoint);
    Ok(())
}

/// GET a snapshot from `endpoint` using `fetch`
#[cfg(target_arch = "wasm32")]
pub async fn load_account(endpoint: &str) -> Result<Snapshot> {
    let (status, text) = fetch::send("GET", endpoint, None).await?;
    let snapshot = decode_download(status, &text)?;
    log::info!("Loaded {} words from {}", snapshot.len(), endpoint);
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WordRecord;

    #[test]
    fn test_encode_upload_is_snapshot_json() {
        let mut snapshot = Snapshot::new();
        snapshot
            .words
            .insert("好".to_string(), WordRecord::new(3, "default"));
        let body = encode_upload(&snapshot).unwrap();
        assert_eq!(Snapshot::from_json(&body).unwrap(), snapshot);
    }

    #[test]
    fn test_check_upload_status() {
        assert!(check_upload(200, "").is_ok());
        assert!(check_upload(204, "").is_ok());
        assert!(matches!(
            check_upload(401, "denied"),
            Err(WordlistError::Remote { status: 401, .. })
        ));
    }

    #[test]
    fn test_decode_download_success() {
        let body = r#"{"version":1,"words":{"水":{"timestamps":[1],"recall":2,
            "production":1,"groups":["default"],"lemma":null}}}"#;
        let snapshot = decode_download(200, body).unwrap();
        assert_eq!(snapshot.words["水"].recall, 2);
    }

    #[test]
    fn test_decode_download_failures() {
        match decode_download(500, &"x".repeat(1000)) {
            Err(WordlistError::Remote { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message.len(), MAX_ERROR_BODY);
            }
            other => panic!("expected remote error, got {:?}", other),
        }
        assert!(matches!(
            decode_download(404, ""),
            Err(WordlistError::Remote { status: 404, .. })
        ));
        assert!(matches!(
            decode_download(200, "<html>"),
            Err(WordlistError::Json(_))
        ));
    }
}
