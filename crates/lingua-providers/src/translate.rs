//! Translation client. One JSON POST per request; the service detects the
//! input language when asked to, and may volunteer romanizations,
//! "did you mean" rewrites and dictionary payloads.

use std::path::Path;
use std::sync::OnceLock;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use lingua_observability::{debug_log, Span};

use crate::api_key;
use crate::config;
use crate::ProviderError;

#[derive(Debug, Clone)]
pub struct TranslateRequest {
    pub input_lang: String,
    pub output_lang: String,
    pub text: String,
}

/// What the service answered. Dictionary payloads stay raw JSON; the UI
/// forwards them without interpreting their shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Translation {
    #[serde(default)]
    pub output_text: String,
    #[serde(default)]
    pub detected_input_lang: Option<String>,
    #[serde(default)]
    pub input_roman: Option<String>,
    #[serde(default)]
    pub output_roman: Option<String>,
    #[serde(default)]
    pub suggested_input_lang: Option<String>,
    #[serde(default)]
    pub suggested_input_text: Option<String>,
    #[serde(default)]
    pub input_dict: Option<serde_json::Value>,
    #[serde(default)]
    pub output_dict: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct TranslateReq<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
}

fn client() -> &'static Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT.get_or_init(Client::new)
}

fn err(code: &str, message: impl Into<String>) -> ProviderError {
    ProviderError::new(code, message)
}

pub async fn translate(
    data_dir: &Path,
    op_id: &str,
    req: &TranslateRequest,
) -> Result<Translation, ProviderError> {
    let span = Span::start(
        data_dir,
        Some(op_id),
        "Translate",
        "TRANSLATE.request",
        Some(serde_json::json!({
            "input_lang": req.input_lang,
            "output_lang": req.output_lang,
            "chars": req.text.len(),
        })),
    );
    let out = translate_inner(data_dir, op_id, req).await;
    match &out {
        Ok(t) => span.ok(Some(serde_json::json!({
            "output_chars": t.output_text.len(),
            "detected_input_lang": t.detected_input_lang,
            "has_dict": t.input_dict.is_some() && t.output_dict.is_some(),
        }))),
        Err(e) => span.err("remote", &e.code, &e.message, None),
    }
    out
}

async fn translate_inner(
    data_dir: &Path,
    op_id: &str,
    req: &TranslateRequest,
) -> Result<Translation, ProviderError> {
    if req.text.trim().is_empty() {
        return Err(err("E_TRANSLATE_EMPTY_INPUT", "nothing to translate"));
    }

    let key = api_key::load_api_key()
        .map_err(|e| err("E_TRANSLATE_API_KEY_MISSING", e.to_string()))?;
    let url = format!("{}/translate", config::base_url());

    let body = TranslateReq {
        q: &req.text,
        source: &req.input_lang,
        target: &req.output_lang,
    };

    let resp = client()
        .post(&url)
        .bearer_auth(&key)
        .json(&body)
        .send()
        .await
        .map_err(|e| err("E_TRANSLATE_NETWORK", e.to_string()))?;

    let status = resp.status();
    let raw = resp
        .bytes()
        .await
        .map_err(|e| err("E_TRANSLATE_NETWORK", e.to_string()))?;
    debug_log::write_payload_best_effort(data_dir, op_id, "translate_resp.json", raw.to_vec());

    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(err("E_TRANSLATE_AUTH", format!("http status {status}")));
    }
    if !status.is_success() {
        return Err(err("E_TRANSLATE_HTTP", format!("http status {status}")));
    }

    let t: Translation = serde_json::from_slice(&raw)
        .map_err(|e| err("E_TRANSLATE_BAD_RESPONSE", format!("invalid json: {e}")))?;
    if t.output_text.trim().is_empty() {
        return Err(err("E_TRANSLATE_BAD_RESPONSE", "missing output_text"));
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_tolerates_missing_optional_fields() {
        let t: Translation = serde_json::from_str(r#"{"output_text":"bonjour"}"#).unwrap();
        assert_eq!(t.output_text, "bonjour");
        assert!(t.input_roman.is_none());
        assert!(t.suggested_input_text.is_none());
        assert!(t.input_dict.is_none());
    }

    #[test]
    fn request_body_uses_service_field_names() {
        let body = TranslateReq {
            q: "hello",
            source: "en",
            target: "fr",
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["q"], "hello");
        assert_eq!(v["source"], "en");
        assert_eq!(v["target"], "fr");
    }
}
