//! Text-to-speech playback driver. Fetches the clip, flips the playing flag,
//! and tells the webview where the audio landed; actual playback lives in
//! the frontend's audio element.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tauri::{AppHandle, Emitter};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use lingua_providers::tts;

use crate::data_dir;
use crate::events;
use crate::store::Store;

#[derive(Debug, Clone, Serialize)]
struct TtsPlayEvent {
    path: String,
}

#[derive(Clone, Default)]
pub struct TtsPlayer {
    active: Arc<Mutex<Option<CancellationToken>>>,
}

impl TtsPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn play(&self, app: AppHandle, store: Store, lang: String, text: String) {
        let token = CancellationToken::new();
        {
            let mut g = self.active.lock().unwrap();
            if let Some(prev) = g.replace(token.clone()) {
                prev.cancel();
            }
        }

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build();
            let Ok(rt) = rt else {
                lingua_observability::safe_eprintln!("failed to create tokio runtime for tts");
                return;
            };
            rt.block_on(async move {
                let Ok(dir) = data_dir::data_dir() else {
                    return;
                };
                let op_id = Uuid::new_v4().to_string();
                let res = tokio::select! {
                    _ = token.cancelled() => return,
                    r = tts::synthesize(&dir, &op_id, &lang, &text) => r,
                };
                match res {
                    Ok(path) => {
                        store.with(|s| s.tts_playing = true);
                        events::emit_home_changed(&app);
                        let _ = app.emit(
                            "tts_play",
                            TtsPlayEvent {
                                path: path.to_string_lossy().to_string(),
                            },
                        );
                    }
                    Err(e) => {
                        // Span already recorded the failure; just surface it.
                        events::emit_snackbar(&app, &e.code);
                    }
                }
            });
        });
    }

    pub fn stop(&self, app: &AppHandle, store: &Store) {
        {
            let mut g = self.active.lock().unwrap();
            if let Some(tok) = g.take() {
                tok.cancel();
            }
        }
        store.with(|s| s.tts_playing = false);
        events::emit_home_changed(app);
        let _ = app.emit("tts_stop", ());
    }

    /// The frontend's audio element reached the end of the clip.
    pub fn finished(&self, app: &AppHandle, store: &Store) {
        store.with(|s| s.tts_playing = false);
        events::emit_home_changed(app);
    }
}
