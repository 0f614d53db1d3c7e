//! Speech-panel session plumbing: the webview records audio, pushes chunks
//! through here, and the recognizer streams transcripts back as events.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use base64::Engine;
use serde::Serialize;
use tauri::{AppHandle, Emitter};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use lingua_providers::speech;

use crate::data_dir;
use crate::events;
use crate::store::Store;

const AUDIO_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Serialize)]
struct SpeechTranscriptEvent {
    session_id: String,
    text: String,
    is_final: bool,
}

#[derive(Debug, Clone, Serialize)]
struct SpeechErrorEvent {
    session_id: String,
    code: String,
}

struct ActiveSpeech {
    session_id: String,
    tx: Option<mpsc::Sender<Vec<u8>>>,
    token: CancellationToken,
}

#[derive(Clone, Default)]
pub struct SpeechInput {
    active: Arc<Mutex<Option<ActiveSpeech>>>,
}

impl SpeechInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, app: AppHandle, store: Store, lang: String) -> Result<String> {
        let session_id = Uuid::new_v4().to_string();
        let token = CancellationToken::new();
        let (tx, rx) = mpsc::channel::<Vec<u8>>(AUDIO_CHANNEL_CAPACITY);

        {
            let mut g = self.active.lock().unwrap();
            if let Some(prev) = g.replace(ActiveSpeech {
                session_id: session_id.clone(),
                tx: Some(tx),
                token: token.clone(),
            }) {
                prev.token.cancel();
            }
        }

        let this = self.clone();
        let session_id2 = session_id.clone();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build();
            let Ok(rt) = rt else {
                lingua_observability::safe_eprintln!("failed to create tokio runtime for speech");
                this.clear_if_current(&session_id2);
                return;
            };
            rt.block_on(async move {
                let Ok(dir) = data_dir::data_dir() else {
                    this.clear_if_current(&session_id2);
                    return;
                };
                let app2 = app.clone();
                let sid = session_id2.clone();
                let on_update = move |u: speech::TranscriptUpdate| {
                    let _ = app2.emit(
                        "speech_transcript",
                        SpeechTranscriptEvent {
                            session_id: sid.clone(),
                            text: u.text,
                            is_final: u.is_final,
                        },
                    );
                };
                let res =
                    speech::recognize_stream(&dir, &session_id2, &lang, rx, on_update, &token)
                        .await;
                match res {
                    Ok(final_text) => {
                        if !final_text.trim().is_empty() {
                            store.with(|s| {
                                s.input_text = final_text;
                                s.selection_start = None;
                                s.selection_end = None;
                            });
                            events::emit_home_changed(&app);
                        }
                        let _ = app.emit("speech_done", ());
                    }
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => {
                        let _ = app.emit(
                            "speech_error",
                            SpeechErrorEvent {
                                session_id: session_id2.clone(),
                                code: e.code,
                            },
                        );
                    }
                }
                this.clear_if_current(&session_id2);
            });
        });

        Ok(session_id)
    }

    /// Forward one recorded audio chunk (base64 PCM from the webview).
    /// Drops with an error when the recognizer cannot keep up.
    pub fn push_chunk(&self, session_id: &str, b64: &str) -> Result<()> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(b64.as_bytes())
            .map_err(|e| anyhow!("base64 decode failed: {e}"))?;

        let g = self.active.lock().unwrap();
        let active = g
            .as_ref()
            .filter(|a| a.session_id == session_id)
            .ok_or_else(|| anyhow!("speech session not active"))?;
        let tx = active
            .tx
            .as_ref()
            .ok_or_else(|| anyhow!("speech session already finished"))?;
        tx.try_send(bytes)
            .map_err(|_| anyhow!("audio backlog full, chunk dropped"))
    }

    /// Recording stopped: close the audio channel so the recognizer can
    /// finish up and deliver its final transcript.
    pub fn finish(&self, session_id: &str) -> Result<()> {
        let mut g = self.active.lock().unwrap();
        let active = g
            .as_mut()
            .filter(|a| a.session_id == session_id)
            .ok_or_else(|| anyhow!("speech session not active"))?;
        active.tx = None;
        Ok(())
    }

    /// Abandon the session (panel dismissed mid-recording).
    pub fn cancel(&self) {
        let mut g = self.active.lock().unwrap();
        if let Some(a) = g.take() {
            a.token.cancel();
        }
    }

    fn clear_if_current(&self, session_id: &str) {
        let mut g = self.active.lock().unwrap();
        if g.as_ref().map(|a| a.session_id.as_str()) == Some(session_id) {
            *g = None;
        }
    }
}
