mod data_dir;
mod events;
mod export;
mod home;
mod ocr_input;
mod panic_log;
mod screen_lock;
mod settings;
mod share;
mod speech_input;
mod startup_trace;
mod store;
mod strings;
mod translator;
mod tts_player;
mod window;

use lingua_core::{language, ImeMode, Intent, Platform};
use lingua_observability::Span;
use lingua_providers::api_key;
use lingua_providers::handwriting::{self, Stroke};
use lingua_providers::ocr;
use lingua_storage::{history, phrasebook, HistoryItem, PhrasebookItem};
use screen_lock::ScreenLockManager;
use settings::{Settings, SettingsPatch};
use speech_input::SpeechInput;
use store::{Effect, LanguagePair, Store};
use tauri::Emitter;
use tauri::Manager;
use translator::Translator;
use tts_player::TtsPlayer;

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn cmd_span(
    data_dir: &std::path::Path,
    op_id: Option<&str>,
    step_id: &str,
    ctx: Option<serde_json::Value>,
) -> Span {
    Span::start(data_dir, op_id, "Cmd", step_id, ctx)
}

fn intent_name(intent: &Intent) -> String {
    serde_json::to_value(intent)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

fn history_db_path() -> Result<std::path::PathBuf, String> {
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    std::fs::create_dir_all(&dir).ok();
    Ok(dir.join("history.sqlite3"))
}

fn phrasebook_db_path() -> Result<std::path::PathBuf, String> {
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    std::fs::create_dir_all(&dir).ok();
    Ok(dir.join("phrasebook.sqlite3"))
}

#[tauri::command]
fn home_view(store: tauri::State<Store>) -> Result<home::HomeView, String> {
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    let span = cmd_span(&dir, None, "CMD.home_view", None);
    let s = settings::load_settings_or_recover(&dir);
    let view = home::build_home_view(&store.snapshot(), &s, Platform::current());
    span.ok(None);
    Ok(view)
}

/// Star or unstar the current output. Runs synchronously on the dispatch
/// path; the membership id is stamped back onto the store's output.
fn toggle_phrasebook(app: &tauri::AppHandle, store: &Store) {
    let Ok(db) = phrasebook_db_path() else {
        return;
    };
    let snapshot = store.snapshot();
    let Some(out) = snapshot.output else {
        return;
    };

    match out.phrasebook_id {
        Some(id) => {
            if phrasebook::remove(&db, &id).is_ok() {
                store.with(|s| {
                    if let Some(o) = s.output.as_mut() {
                        o.phrasebook_id = None;
                    }
                });
                events::emit_home_changed(app);
            }
        }
        None => {
            let item = PhrasebookItem {
                id: String::new(),
                created_at_ms: now_ms(),
                input_lang: out.input_lang.clone(),
                output_lang: out.output_lang.clone(),
                input_text: out.input_text.clone(),
                output_text: out.output_text.clone(),
            };
            if let Ok(stored) = phrasebook::add(&db, item) {
                store.with(|s| {
                    if let Some(o) = s.output.as_mut() {
                        o.phrasebook_id = Some(stored.id.clone());
                    }
                });
                events::emit_home_changed(app);
            }
        }
    }
}

fn run_effects(
    app: &tauri::AppHandle,
    store: &Store,
    translator: &Translator,
    tts: &TtsPlayer,
    effects: Vec<Effect>,
) {
    for effect in effects {
        match effect {
            Effect::Translate {
                input_lang,
                output_lang,
                text,
            } => {
                if let Err(e) =
                    translator.start(app.clone(), store.clone(), input_lang, output_lang, text)
                {
                    lingua_observability::safe_eprintln!("translate start failed: {e:#}");
                }
            }
            Effect::PlayTts { lang, text } => {
                tts.play(app.clone(), store.clone(), lang, text);
            }
            Effect::StopTts => tts.stop(app, store),
            Effect::Copy { text } => match export::copy_text_to_clipboard(&text) {
                Ok(()) => events::emit_snackbar(app, strings::lookup("copied")),
                Err(e) => events::emit_snackbar(app, &e.code),
            },
            Effect::Share { text } => {
                if let Err(e) = share::share_text(app, &text) {
                    events::emit_snackbar(app, &e.code);
                }
            }
            Effect::TogglePhrasebook => toggle_phrasebook(app, store),
            Effect::LoadImage { from_camera } => {
                let _ = app.emit(
                    "load_image",
                    serde_json::json!({"from_camera": from_camera}),
                );
            }
            Effect::Navigate { route, arg } => events::emit_navigate(app, &route, arg),
            Effect::SetLanguages { input, output } => {
                // Unknown codes never reach the settings file.
                if !language::is_known(&input) || !language::is_output_capable(&output) {
                    continue;
                }
                if let Ok(dir) = data_dir::data_dir() {
                    let mut s = settings::load_settings_or_recover(&dir);
                    s.input_lang = input;
                    s.output_lang = output;
                    if let Err(e) = settings::save_settings(&dir, &s) {
                        lingua_observability::safe_eprintln!("save settings failed: {e:#}");
                    }
                    events::emit_home_changed(app);
                }
            }
        }
    }
}

#[tauri::command]
fn dispatch(
    app: tauri::AppHandle,
    store: tauri::State<Store>,
    translator: tauri::State<Translator>,
    tts: tauri::State<TtsPlayer>,
    speech: tauri::State<SpeechInput>,
    intent: Intent,
) -> Result<(), String> {
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    let span = cmd_span(
        &dir,
        None,
        "CMD.dispatch",
        Some(serde_json::json!({"intent": intent_name(&intent)})),
    );

    // Leaving the speech panel abandons any in-flight recognition.
    if matches!(
        intent,
        Intent::DismissImePanel | Intent::SetImeMode { mode: ImeMode::None }
    ) {
        speech.cancel();
    }

    let s = settings::load_settings_or_recover(&dir);
    let langs = LanguagePair {
        input: s.input_lang,
        output: s.output_lang,
    };
    let effects = store.with(|state| store::reduce(state, &langs, intent));
    events::emit_home_changed(&app);
    run_effects(&app, store.inner(), translator.inner(), tts.inner(), effects);

    span.ok(None);
    Ok(())
}

#[tauri::command]
fn get_settings() -> Result<Settings, String> {
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    let span = cmd_span(&dir, None, "CMD.get_settings", None);
    let s = settings::load_settings_or_recover(&dir);
    span.ok(None);
    Ok(s)
}

#[tauri::command]
fn update_settings(
    app: tauri::AppHandle,
    windows: tauri::State<window::MainWindow>,
    screen_lock: tauri::State<ScreenLockManager>,
    patch: SettingsPatch,
) -> Result<Settings, String> {
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    let patch_summary = serde_json::json!({
        "input_lang": patch.input_lang.is_some(),
        "output_lang": patch.output_lang.is_some(),
        "translate_when_pressing_enter": patch.translate_when_pressing_enter.is_some(),
        "preventing_screen_lock": patch.preventing_screen_lock.is_some(),
        "locale": patch.locale.is_some(),
    });
    let span = cmd_span(&dir, None, "CMD.update_settings", Some(patch_summary));

    let cur = settings::load_settings_or_recover(&dir);
    let next = settings::apply_patch(cur, patch);
    if let Err(e) = settings::save_settings(&dir, &next) {
        span.err_anyhow("settings", "E_CMD_UPDATE_SETTINGS", &e, None);
        return Err(e.to_string());
    }

    // The keep-awake handle follows the setting while the window is up.
    if windows.exists() {
        if next.preventing_screen_lock {
            screen_lock.acquire_best_effort(&dir, true);
        } else {
            screen_lock.release_best_effort(&dir);
        }
    }

    events::emit_home_changed(&app);
    span.ok(None);
    Ok(next)
}

#[tauri::command]
fn set_api_key(api_key_value: &str) -> Result<(), String> {
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    let span = cmd_span(
        &dir,
        None,
        "CMD.set_api_key",
        Some(serde_json::json!({"api_key_chars": api_key_value.len()})),
    );
    match api_key::set_api_key(api_key_value) {
        Ok(()) => {
            span.ok(None);
            Ok(())
        }
        Err(e) => {
            span.err_anyhow("auth", "E_CMD_SET_KEY", &e, None);
            Err(e.to_string())
        }
    }
}

#[tauri::command]
fn clear_api_key() -> Result<(), String> {
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    let span = cmd_span(&dir, None, "CMD.clear_api_key", None);
    match api_key::clear_api_key() {
        Ok(()) => {
            span.ok(None);
            Ok(())
        }
        Err(e) => {
            span.err_anyhow("auth", "E_CMD_CLEAR_KEY", &e, None);
            Err(e.to_string())
        }
    }
}

#[tauri::command]
fn api_key_status() -> Result<api_key::ApiKeyStatus, String> {
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    let span = cmd_span(&dir, None, "CMD.api_key_status", None);
    let st = api_key::api_key_status();
    span.ok(Some(
        serde_json::json!({"configured": st.configured, "source": st.source}),
    ));
    Ok(st)
}

#[tauri::command]
fn history_list(limit: i64, before_ms: Option<i64>) -> Result<Vec<HistoryItem>, String> {
    let db = history_db_path()?;
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    let span = cmd_span(
        &dir,
        None,
        "CMD.history_list",
        Some(serde_json::json!({"limit": limit, "before_ms": before_ms})),
    );
    match history::list(&db, limit, before_ms) {
        Ok(v) => {
            span.ok(Some(serde_json::json!({"count": v.len()})));
            Ok(v)
        }
        Err(e) => {
            span.err_anyhow("history", "E_CMD_HISTORY_LIST", &e, None);
            Err(e.to_string())
        }
    }
}

#[tauri::command]
fn history_clear() -> Result<(), String> {
    let db = history_db_path()?;
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    let span = cmd_span(&dir, None, "CMD.history_clear", None);
    match history::clear(&db) {
        Ok(()) => {
            span.ok(None);
            Ok(())
        }
        Err(e) => {
            span.err_anyhow("history", "E_CMD_HISTORY_CLEAR", &e, None);
            Err(e.to_string())
        }
    }
}

#[tauri::command]
fn phrasebook_list(limit: i64, before_ms: Option<i64>) -> Result<Vec<PhrasebookItem>, String> {
    let db = phrasebook_db_path()?;
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    let span = cmd_span(
        &dir,
        None,
        "CMD.phrasebook_list",
        Some(serde_json::json!({"limit": limit, "before_ms": before_ms})),
    );
    match phrasebook::list(&db, limit, before_ms) {
        Ok(v) => {
            span.ok(Some(serde_json::json!({"count": v.len()})));
            Ok(v)
        }
        Err(e) => {
            span.err_anyhow("phrasebook", "E_CMD_PHRASEBOOK_LIST", &e, None);
            Err(e.to_string())
        }
    }
}

/// OCR intake: base64 PNG from the file picker or camera. Recognized text
/// replaces the input box content.
#[tauri::command]
async fn submit_image(
    app: tauri::AppHandle,
    store: tauri::State<'_, Store>,
    b64: String,
) -> Result<String, String> {
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    let op_id = uuid::Uuid::new_v4().to_string();
    let span = cmd_span(
        &dir,
        Some(&op_id),
        "CMD.submit_image",
        Some(serde_json::json!({"b64_chars": b64.len()})),
    );

    let path = match ocr_input::save_base64_image(&dir, &op_id, &b64) {
        Ok(p) => p,
        Err(e) => {
            span.err_anyhow("io", "E_CMD_IMAGE_SAVE", &e, None);
            return Err(e.to_string());
        }
    };
    let dims = match ocr_input::png_dimensions(&path) {
        Ok(d) => d,
        Err(e) => {
            ocr_input::cleanup_image_best_effort(&path);
            span.err_anyhow("parse", "E_CMD_IMAGE_INVALID", &e, None);
            return Err(e.to_string());
        }
    };

    let s = settings::load_settings_or_recover(&dir);
    let res = ocr::recognize_image(&dir, &op_id, &s.input_lang, &path).await;
    ocr_input::cleanup_image_best_effort(&path);

    match res {
        Ok(text) => {
            store.with(|st| {
                st.input_text = text.clone();
                st.selection_start = None;
                st.selection_end = None;
            });
            events::emit_home_changed(&app);
            span.ok(Some(
                serde_json::json!({"width": dims.0, "height": dims.1, "chars": text.len()}),
            ));
            Ok(text)
        }
        Err(e) => {
            span.err("remote", &e.code, &e.message, None);
            Err(e.to_string())
        }
    }
}

/// Ranked candidates for the handwriting panel's current stroke batch.
#[tauri::command]
async fn handwriting_candidates(
    strokes: Vec<Stroke>,
    limit: Option<usize>,
) -> Result<Vec<String>, String> {
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    let op_id = uuid::Uuid::new_v4().to_string();
    let span = cmd_span(
        &dir,
        Some(&op_id),
        "CMD.handwriting_candidates",
        Some(serde_json::json!({"strokes": strokes.len()})),
    );
    let s = settings::load_settings_or_recover(&dir);
    match handwriting::recognize_strokes(&dir, &op_id, &s.input_lang, &strokes, limit.unwrap_or(8))
        .await
    {
        Ok(candidates) => {
            span.ok(Some(serde_json::json!({"count": candidates.len()})));
            Ok(candidates)
        }
        Err(e) => {
            span.err("remote", &e.code, &e.message, None);
            Err(e.to_string())
        }
    }
}

#[tauri::command]
fn speech_start(
    app: tauri::AppHandle,
    store: tauri::State<Store>,
    speech: tauri::State<SpeechInput>,
) -> Result<String, String> {
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    let span = cmd_span(&dir, None, "CMD.speech_start", None);
    let s = settings::load_settings_or_recover(&dir);
    if !language::supports_voice_input(&s.input_lang) {
        span.err(
            "config",
            "E_CMD_SPEECH_UNSUPPORTED",
            &format!("no voice input for {}", s.input_lang),
            None,
        );
        return Err("voice input is not supported for this language".to_string());
    }
    match speech.start(app, store.inner().clone(), s.input_lang) {
        Ok(session_id) => {
            span.ok(Some(serde_json::json!({"session_id": session_id})));
            Ok(session_id)
        }
        Err(e) => {
            span.err_anyhow("speech", "E_CMD_SPEECH_START", &e, None);
            Err(e.to_string())
        }
    }
}

#[tauri::command]
fn speech_push_chunk(
    speech: tauri::State<SpeechInput>,
    session_id: &str,
    chunk_b64: &str,
) -> Result<(), String> {
    speech
        .push_chunk(session_id, chunk_b64)
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn speech_finish(speech: tauri::State<SpeechInput>, session_id: &str) -> Result<(), String> {
    let dir = data_dir::data_dir().map_err(|e| e.to_string())?;
    let span = cmd_span(
        &dir,
        None,
        "CMD.speech_finish",
        Some(serde_json::json!({"session_id": session_id})),
    );
    match speech.finish(session_id) {
        Ok(()) => {
            span.ok(None);
            Ok(())
        }
        Err(e) => {
            span.err_anyhow("speech", "E_CMD_SPEECH_FINISH", &e, None);
            Err(e.to_string())
        }
    }
}

#[tauri::command]
fn notify_tts_finished(
    app: tauri::AppHandle,
    store: tauri::State<Store>,
    tts: tauri::State<TtsPlayer>,
) -> Result<(), String> {
    tts.finished(&app, store.inner());
    Ok(())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    startup_trace::mark_best_effort("run_enter");
    panic_log::install_best_effort();
    startup_trace::mark_best_effort("panic_hook_installed");
    let ctx = tauri::generate_context!();
    startup_trace::mark_best_effort("context_generated");

    let app = tauri::Builder::default()
        .manage(Store::new())
        .manage(Translator::new())
        .manage(TtsPlayer::new())
        .manage(SpeechInput::new())
        .manage(ScreenLockManager::new(
            Platform::current().supports_screen_lock_inhibit(),
        ))
        .manage(window::MainWindow::new())
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            // A second launch focuses the existing window instead.
            if let Some(w) = app.get_webview_window(window::MAIN_WINDOW_LABEL) {
                let _ = w.set_focus();
            }
        }))
        .setup(|app| {
            startup_trace::mark_best_effort("setup_enter");

            let windows = app.state::<window::MainWindow>();
            windows.create_if_absent(app.handle())?;

            if let Ok(dir) = data_dir::data_dir() {
                let s = settings::load_settings_or_recover(&dir);
                app.state::<ScreenLockManager>()
                    .acquire_best_effort(&dir, s.preventing_screen_lock);

                // Launch accounting; the fifth launch asks for a review.
                match settings::increment_launch_count(&dir) {
                    Ok(5) => {
                        let _ = app.handle().emit("ask_if_enjoy", ());
                    }
                    Ok(_) => {}
                    Err(e) => {
                        lingua_observability::safe_eprintln!("launch count failed: {e:#}");
                    }
                }
            }

            startup_trace::mark_best_effort("setup_exit");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            home_view,
            dispatch,
            get_settings,
            update_settings,
            set_api_key,
            clear_api_key,
            api_key_status,
            history_list,
            history_clear,
            phrasebook_list,
            submit_image,
            handwriting_candidates,
            speech_start,
            speech_push_chunk,
            speech_finish,
            notify_tts_finished
        ])
        .build(ctx)
        .expect("error while building tauri application");

    app.run(|app_handle, event| match event {
        tauri::RunEvent::WindowEvent {
            label,
            event: tauri::WindowEvent::Destroyed,
            ..
        } => {
            let windows = app_handle.state::<window::MainWindow>();
            if windows.clear_if_label(&label) {
                // The view unmounted; the keep-awake handle never outlives it.
                if let Ok(dir) = data_dir::data_dir() {
                    app_handle
                        .state::<ScreenLockManager>()
                        .release_best_effort(&dir);
                }
            }
        }
        tauri::RunEvent::ExitRequested { api, code, .. } => {
            // Closing the last window quits everywhere but macOS, where the
            // app stays resident in the menu bar.
            if code.is_none() && Platform::current() == Platform::Mac {
                api.prevent_exit();
            }
        }
        #[cfg(target_os = "macos")]
        tauri::RunEvent::Reopen {
            has_visible_windows,
            ..
        } => {
            if !has_visible_windows {
                let windows = app_handle.state::<window::MainWindow>();
                match windows.create_if_absent(app_handle) {
                    Ok(true) => {
                        if let Ok(dir) = data_dir::data_dir() {
                            let s = settings::load_settings_or_recover(&dir);
                            app_handle
                                .state::<ScreenLockManager>()
                                .acquire_best_effort(&dir, s.preventing_screen_lock);
                        }
                    }
                    Ok(false) => {}
                    Err(e) => {
                        lingua_observability::safe_eprintln!("window recreate failed: {e}");
                    }
                }
            }
        }
        _ => {}
    });
}
