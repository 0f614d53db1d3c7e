//! OCR: multipart image upload, recognized text back.

use std::path::Path;

use reqwest::multipart;

use lingua_observability::{debug_log, Span};

use crate::api_key;
use crate::config;
use crate::ProviderError;

#[derive(Debug, serde::Deserialize)]
struct OcrResp {
    #[serde(default)]
    text: Option<String>,
}

fn err(code: &str, message: impl Into<String>) -> ProviderError {
    ProviderError::new(code, message)
}

pub async fn recognize_image(
    data_dir: &Path,
    op_id: &str,
    lang: &str,
    image_path: &Path,
) -> Result<String, ProviderError> {
    let span = Span::start(
        data_dir,
        Some(op_id),
        "Ocr",
        "OCR.recognize_image",
        Some(serde_json::json!({"lang": lang, "image": image_path.to_string_lossy()})),
    );
    let out = recognize_inner(data_dir, op_id, lang, image_path).await;
    match &out {
        Ok(text) => span.ok(Some(serde_json::json!({"chars": text.len()}))),
        Err(e) => span.err("remote", &e.code, &e.message, None),
    }
    out
}

async fn recognize_inner(
    data_dir: &Path,
    op_id: &str,
    lang: &str,
    image_path: &Path,
) -> Result<String, ProviderError> {
    let key = api_key::load_api_key().map_err(|e| err("E_OCR_API_KEY_MISSING", e.to_string()))?;
    let bytes = tokio::fs::read(image_path)
        .await
        .map_err(|e| err("E_OCR_IO", format!("read image failed: {e}")))?;
    if bytes.is_empty() {
        return Err(err("E_OCR_IO", "image file is empty"));
    }

    let form = multipart::Form::new()
        .text("lang", lang.to_string())
        .part(
            "image",
            multipart::Part::bytes(bytes)
                .file_name("capture.png")
                .mime_str("image/png")
                .map_err(|e| err("E_OCR_CONFIG", e.to_string()))?,
        );

    let url = format!("{}/ocr", config::base_url());
    let resp = reqwest::Client::new()
        .post(&url)
        .bearer_auth(&key)
        .multipart(form)
        .send()
        .await
        .map_err(|e| err("E_OCR_NETWORK", e.to_string()))?;
    let status = resp.status();
    let raw = resp
        .bytes()
        .await
        .map_err(|e| err("E_OCR_NETWORK", e.to_string()))?;
    debug_log::write_payload_best_effort(data_dir, op_id, "ocr_resp.json", raw.to_vec());

    if !status.is_success() {
        return Err(err("E_OCR_HTTP", format!("http status {status}")));
    }
    let parsed: OcrResp = serde_json::from_slice(&raw)
        .map_err(|e| err("E_OCR_BAD_RESPONSE", format!("invalid json: {e}")))?;
    let text = parsed.text.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(err("E_OCR_NO_TEXT", "no text recognized"));
    }
    Ok(text)
}
