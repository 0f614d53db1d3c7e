//! Handwriting recognition: stroke batches in, ranked candidates out.

use std::path::Path;

use serde::{Deserialize, Serialize};

use lingua_observability::Span;

use crate::api_key;
use crate::config;
use crate::ProviderError;

/// One pen stroke as (x, y) points in panel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<(f32, f32)>,
}

#[derive(Debug, Serialize)]
struct RecognizeReq<'a> {
    lang: &'a str,
    strokes: &'a [Stroke],
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct RecognizeResp {
    #[serde(default)]
    candidates: Vec<String>,
}

fn err(code: &str, message: impl Into<String>) -> ProviderError {
    ProviderError::new(code, message)
}

pub async fn recognize_strokes(
    data_dir: &Path,
    op_id: &str,
    lang: &str,
    strokes: &[Stroke],
    limit: usize,
) -> Result<Vec<String>, ProviderError> {
    let span = Span::start(
        data_dir,
        Some(op_id),
        "Handwriting",
        "HANDWRITING.recognize",
        Some(serde_json::json!({"lang": lang, "strokes": strokes.len(), "limit": limit})),
    );
    let out = recognize_inner(lang, strokes, limit).await;
    match &out {
        Ok(c) => span.ok(Some(serde_json::json!({"candidates": c.len()}))),
        Err(e) => span.err("remote", &e.code, &e.message, None),
    }
    out
}

async fn recognize_inner(
    lang: &str,
    strokes: &[Stroke],
    limit: usize,
) -> Result<Vec<String>, ProviderError> {
    if strokes.is_empty() {
        return Err(err("E_HANDWRITING_EMPTY", "no strokes to recognize"));
    }
    let key = api_key::load_api_key()
        .map_err(|e| err("E_HANDWRITING_API_KEY_MISSING", e.to_string()))?;
    let url = format!("{}/handwriting", config::base_url());

    let resp = reqwest::Client::new()
        .post(&url)
        .bearer_auth(&key)
        .json(&RecognizeReq { lang, strokes, limit })
        .send()
        .await
        .map_err(|e| err("E_HANDWRITING_NETWORK", e.to_string()))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(err("E_HANDWRITING_HTTP", format!("http status {status}")));
    }
    let parsed: RecognizeResp = resp
        .json()
        .await
        .map_err(|e| err("E_HANDWRITING_BAD_RESPONSE", e.to_string()))?;
    Ok(parsed.candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_strokes_as_point_lists() {
        let strokes = vec![Stroke {
            points: vec![(0.0, 0.0), (10.0, 4.5)],
        }];
        let v = serde_json::to_value(&RecognizeReq {
            lang: "ja",
            strokes: &strokes,
            limit: 8,
        })
        .unwrap();
        assert_eq!(v["lang"], "ja");
        assert_eq!(v["limit"], 8);
        assert_eq!(v["strokes"][0]["points"][1][0], 10.0);
    }

    #[test]
    fn candidates_default_to_empty() {
        let r: RecognizeResp = serde_json::from_str("{}").unwrap();
        assert!(r.candidates.is_empty());
    }
}
