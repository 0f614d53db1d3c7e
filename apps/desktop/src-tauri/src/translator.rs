//! Single-active translation driver. A new request cancels the one in
//! flight; the store only ever reflects the newest operation.

use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tauri::AppHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use lingua_core::{OutputStatus, TranslationOutput};
use lingua_observability::metrics;
use lingua_providers::translate::{self, TranslateRequest, Translation};
use lingua_storage::history;

use crate::data_dir;
use crate::events;
use crate::store::Store;

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

struct ActiveTranslation {
    op_id: String,
    token: CancellationToken,
}

#[derive(Clone, Default)]
pub struct Translator {
    active: Arc<Mutex<Option<ActiveTranslation>>>,
}

fn loading_output(input_lang: &str, output_lang: &str, text: &str) -> TranslationOutput {
    TranslationOutput {
        status: OutputStatus::Loading,
        input_lang: input_lang.to_string(),
        output_lang: output_lang.to_string(),
        input_text: text.to_string(),
        output_text: String::new(),
        input_roman: None,
        output_roman: None,
        suggested_input_lang: None,
        suggested_input_text: None,
        input_dict: None,
        output_dict: None,
        phrasebook_id: None,
        error_code: None,
    }
}

fn done_output(
    input_lang: &str,
    output_lang: &str,
    text: &str,
    t: Translation,
) -> TranslationOutput {
    TranslationOutput {
        status: OutputStatus::Done,
        input_lang: input_lang.to_string(),
        output_lang: output_lang.to_string(),
        input_text: text.to_string(),
        output_text: t.output_text,
        input_roman: t.input_roman,
        output_roman: t.output_roman,
        suggested_input_lang: t.suggested_input_lang,
        suggested_input_text: t.suggested_input_text,
        input_dict: t.input_dict.map(|v| v.to_string()),
        output_dict: t.output_dict.map(|v| v.to_string()),
        phrasebook_id: None,
        error_code: None,
    }
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_current(&self, op_id: &str) -> bool {
        let g = self.active.lock().unwrap();
        g.as_ref().map(|a| a.op_id.as_str()) == Some(op_id)
    }

    fn clear_if_current(&self, op_id: &str) {
        let mut g = self.active.lock().unwrap();
        if g.as_ref().map(|a| a.op_id.as_str()) == Some(op_id) {
            *g = None;
        }
    }

    pub fn cancel_active(&self) {
        let mut g = self.active.lock().unwrap();
        if let Some(a) = g.take() {
            a.token.cancel();
        }
    }

    pub fn start(
        &self,
        app: AppHandle,
        store: Store,
        input_lang: String,
        output_lang: String,
        text: String,
    ) -> Result<String> {
        let op_id = Uuid::new_v4().to_string();
        let token = CancellationToken::new();
        {
            let mut g = self.active.lock().unwrap();
            if let Some(prev) = g.replace(ActiveTranslation {
                op_id: op_id.clone(),
                token: token.clone(),
            }) {
                prev.token.cancel();
            }
        }

        store.with(|s| s.output = Some(loading_output(&input_lang, &output_lang, &text)));
        events::emit_home_changed(&app);
        events::emit_translate_event(&app, &op_id, "started", None);

        let this = self.clone();
        let op_id2 = op_id.clone();

        // The invoke handler may run without an active Tokio reactor; drive
        // the request from a detached thread with its own runtime.
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build();
            let rt = match rt {
                Ok(rt) => rt,
                Err(e) => {
                    lingua_observability::safe_eprintln!(
                        "failed to create tokio runtime for translate {op_id2}: {e}"
                    );
                    this.clear_if_current(&op_id2);
                    return;
                }
            };
            rt.block_on(async move {
                let data_dir = match data_dir::data_dir() {
                    Ok(d) => d,
                    Err(e) => {
                        lingua_observability::safe_eprintln!("data dir unavailable: {e}");
                        this.clear_if_current(&op_id2);
                        return;
                    }
                };
                let req = TranslateRequest {
                    input_lang: input_lang.clone(),
                    output_lang: output_lang.clone(),
                    text: text.clone(),
                };
                let res = tokio::select! {
                    _ = token.cancelled() => Err(lingua_providers::ProviderError::new(
                        "E_CANCELLED",
                        "cancelled",
                    )),
                    r = translate::translate(&data_dir, &op_id2, &req) => r,
                };

                match res {
                    Ok(t) => {
                        if this.is_current(&op_id2) {
                            let out = done_output(&input_lang, &output_lang, &text, t);
                            let item = history::HistoryItem {
                                id: op_id2.clone(),
                                created_at_ms: now_ms(),
                                input_lang: out.input_lang.clone(),
                                output_lang: out.output_lang.clone(),
                                input_text: out.input_text.clone(),
                                output_text: out.output_text.clone(),
                            };
                            store.with(|s| s.output = Some(out));
                            events::emit_home_changed(&app);
                            events::emit_translate_event(&app, &op_id2, "completed", None);

                            let db = data_dir.join("history.sqlite3");
                            if let Err(e) = history::append(&db, &item) {
                                lingua_observability::safe_eprintln!(
                                    "history append failed: {e:#}"
                                );
                            }
                            if let Err(e) = metrics::append_jsonl(
                                &data_dir,
                                &serde_json::json!({
                                    "type": "translate_done",
                                    "op_id": op_id2,
                                    "input_lang": item.input_lang,
                                    "output_lang": item.output_lang,
                                    "output_chars": item.output_text.len(),
                                }),
                            ) {
                                lingua_observability::safe_eprintln!(
                                    "metrics append failed (translate_done): {e:#}"
                                );
                            }
                        }
                    }
                    Err(e) if e.is_cancelled() => {
                        events::emit_translate_event(&app, &op_id2, "cancelled", Some(&e.code));
                    }
                    Err(e) => {
                        if this.is_current(&op_id2) {
                            store.with(|s| {
                                let mut out = loading_output(&input_lang, &output_lang, &text);
                                out.status = OutputStatus::Failed;
                                out.error_code = Some(e.code.clone());
                                s.output = Some(out);
                            });
                            events::emit_home_changed(&app);
                            events::emit_translate_event(&app, &op_id2, "failed", Some(&e.code));
                        }
                    }
                }
                this.clear_if_current(&op_id2);
            });
        });

        Ok(op_id)
    }
}
