//! Streaming voice recognition over a websocket. Audio chunks arrive from
//! the recorder through a channel, get gzip-compressed, and go out as binary
//! frames; the service answers with partial and final transcripts.

use std::io::Write as _;
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::connect_async;
use tokio_util::sync::CancellationToken;

use lingua_observability::Span;

use crate::api_key;
use crate::config;
use crate::ProviderError;

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptUpdate {
    pub text: String,
    pub is_final: bool,
}

#[derive(Debug, Deserialize)]
struct ServerMsg {
    #[serde(default)]
    text: String,
    #[serde(default)]
    is_final: bool,
    #[serde(default)]
    error: Option<ServerError>,
}

#[derive(Debug, Deserialize)]
struct ServerError {
    code: String,
    message: String,
}

fn err(code: &str, message: impl Into<String>) -> ProviderError {
    ProviderError::new(code, message)
}

fn gzip_chunk(bytes: &[u8]) -> Result<Vec<u8>, ProviderError> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::fast());
    enc.write_all(bytes)
        .map_err(|e| err("E_SPEECH_COMPRESS", e.to_string()))?;
    enc.finish().map_err(|e| err("E_SPEECH_COMPRESS", e.to_string()))
}

/// Stream `audio_rx` to the recognizer until the channel closes, feeding
/// every transcript update to `on_update`. Returns the assembled final text.
pub async fn recognize_stream(
    data_dir: &Path,
    op_id: &str,
    lang: &str,
    mut audio_rx: mpsc::Receiver<Vec<u8>>,
    mut on_update: impl FnMut(TranscriptUpdate),
    token: &CancellationToken,
) -> Result<String, ProviderError> {
    let span = Span::start(
        data_dir,
        Some(op_id),
        "Speech",
        "SPEECH.recognize_stream",
        Some(serde_json::json!({"lang": lang})),
    );

    let out = recognize_inner(lang, &mut audio_rx, &mut on_update, token).await;
    match &out {
        Ok(text) => span.ok(Some(serde_json::json!({"final_chars": text.len()}))),
        Err(e) => span.err("remote", &e.code, &e.message, None),
    }
    out
}

async fn recognize_inner(
    lang: &str,
    audio_rx: &mut mpsc::Receiver<Vec<u8>>,
    on_update: &mut impl FnMut(TranscriptUpdate),
    token: &CancellationToken,
) -> Result<String, ProviderError> {
    let key = api_key::load_api_key()
        .map_err(|e| err("E_SPEECH_API_KEY_MISSING", e.to_string()))?;
    let url = format!("{}/speech", config::ws_base_url());

    let mut request = url
        .into_client_request()
        .map_err(|e| err("E_SPEECH_CONFIG", e.to_string()))?;
    let auth = format!("Bearer {key}")
        .parse()
        .map_err(|_| err("E_SPEECH_CONFIG", "api key is not a valid header value"))?;
    request.headers_mut().insert("authorization", auth);

    let (ws, _resp) = connect_async(request)
        .await
        .map_err(|e| err("E_SPEECH_CONNECT", e.to_string()))?;
    let (mut tx, mut rx) = ws.split();

    let start = serde_json::json!({"lang": lang, "format": "pcm16", "gzip": true});
    tx.send(Message::Text(start.to_string()))
        .await
        .map_err(|e| err("E_SPEECH_NETWORK", e.to_string()))?;

    let mut audio_done = false;
    let mut finals: Vec<String> = Vec::new();

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                let _ = tx.send(Message::Close(None)).await;
                return Err(err("E_CANCELLED", "cancelled"));
            }
            chunk = audio_rx.recv(), if !audio_done => {
                match chunk {
                    Some(bytes) => {
                        let gz = gzip_chunk(&bytes)?;
                        tx.send(Message::Binary(gz))
                            .await
                            .map_err(|e| err("E_SPEECH_NETWORK", e.to_string()))?;
                    }
                    None => {
                        audio_done = true;
                        tx.send(Message::Text(r#"{"eof":true}"#.to_string()))
                            .await
                            .map_err(|e| err("E_SPEECH_NETWORK", e.to_string()))?;
                    }
                }
            }
            msg = rx.next() => {
                match msg {
                    Some(Ok(Message::Text(s))) => {
                        let parsed: ServerMsg = serde_json::from_str(&s)
                            .map_err(|e| err("E_SPEECH_BAD_RESPONSE", format!("invalid json: {e}")))?;
                        if let Some(se) = parsed.error {
                            return Err(err(&se.code, se.message));
                        }
                        let update = TranscriptUpdate {
                            text: parsed.text.clone(),
                            is_final: parsed.is_final,
                        };
                        on_update(update);
                        if parsed.is_final {
                            finals.push(parsed.text);
                            if audio_done {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        if audio_done {
                            break;
                        }
                        return Err(err("E_SPEECH_CLOSED", "service closed mid-stream"));
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(err("E_SPEECH_NETWORK", e.to_string())),
                }
            }
        }
    }

    let _ = tx.send(Message::Close(None)).await;
    Ok(finals.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    #[test]
    fn gzip_chunk_round_trips() {
        let raw = vec![7u8; 4096];
        let gz = gzip_chunk(&raw).expect("compress");
        assert!(gz.len() < raw.len());

        let mut dec = flate2::read::GzDecoder::new(gz.as_slice());
        let mut back = Vec::new();
        dec.read_to_end(&mut back).expect("decompress");
        assert_eq!(back, raw);
    }

    #[test]
    fn server_messages_parse_with_and_without_errors() {
        let ok: ServerMsg = serde_json::from_str(r#"{"text":"hel","is_final":false}"#).unwrap();
        assert_eq!(ok.text, "hel");
        assert!(!ok.is_final);
        assert!(ok.error.is_none());

        let bad: ServerMsg =
            serde_json::from_str(r#"{"error":{"code":"E_SPEECH_LANG","message":"nope"}}"#).unwrap();
        let e = bad.error.unwrap();
        assert_eq!(e.code, "E_SPEECH_LANG");
    }
}
