//! Text-to-speech: fetch synthesized audio for (lang, text) into the data
//! dir; the webview plays the file. One playback at a time, so the previous
//! clip is simply overwritten.

use std::path::{Path, PathBuf};

use serde::Serialize;

use lingua_observability::Span;

use crate::api_key;
use crate::config;
use crate::ProviderError;

#[derive(Debug, Serialize)]
struct SynthesizeReq<'a> {
    lang: &'a str,
    text: &'a str,
}

pub fn audio_path(data_dir: &Path) -> PathBuf {
    data_dir.join("tts").join("current.mp3")
}

fn err(code: &str, message: impl Into<String>) -> ProviderError {
    ProviderError::new(code, message)
}

pub async fn synthesize(
    data_dir: &Path,
    op_id: &str,
    lang: &str,
    text: &str,
) -> Result<PathBuf, ProviderError> {
    let span = Span::start(
        data_dir,
        Some(op_id),
        "Tts",
        "TTS.synthesize",
        Some(serde_json::json!({"lang": lang, "chars": text.len()})),
    );
    let out = synthesize_inner(data_dir, lang, text).await;
    match &out {
        Ok(p) => span.ok(Some(serde_json::json!({"path": p.to_string_lossy()}))),
        Err(e) => span.err("remote", &e.code, &e.message, None),
    }
    out
}

async fn synthesize_inner(
    data_dir: &Path,
    lang: &str,
    text: &str,
) -> Result<PathBuf, ProviderError> {
    if text.trim().is_empty() {
        return Err(err("E_TTS_EMPTY_TEXT", "nothing to speak"));
    }
    let key = api_key::load_api_key().map_err(|e| err("E_TTS_API_KEY_MISSING", e.to_string()))?;
    let url = format!("{}/tts", config::base_url());

    let resp = reqwest::Client::new()
        .post(&url)
        .bearer_auth(&key)
        .json(&SynthesizeReq { lang, text })
        .send()
        .await
        .map_err(|e| err("E_TTS_NETWORK", e.to_string()))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(err("E_TTS_HTTP", format!("http status {status}")));
    }
    let bytes = resp
        .bytes()
        .await
        .map_err(|e| err("E_TTS_NETWORK", e.to_string()))?;
    if bytes.is_empty() {
        return Err(err("E_TTS_BAD_RESPONSE", "empty audio payload"));
    }

    let path = audio_path(data_dir);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| err("E_TTS_IO", e.to_string()))?;
    }
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| err("E_TTS_IO", e.to_string()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_path_is_stable_under_the_data_dir() {
        let p = audio_path(Path::new("/data"));
        assert_eq!(p, PathBuf::from("/data/tts/current.mp3"));
    }
}
