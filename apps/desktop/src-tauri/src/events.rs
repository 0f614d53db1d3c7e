//! Events pushed to the webview. `home_changed` is a bare nudge: the
//! frontend re-pulls the home view snapshot rather than diffing payloads.

use serde::Serialize;
use tauri::{AppHandle, Emitter};

pub fn emit_home_changed(app: &AppHandle) {
    let _ = app.emit("home_changed", ());
}

#[derive(Debug, Clone, Serialize)]
pub struct SnackbarEvent {
    pub message: String,
}

pub fn emit_snackbar(app: &AppHandle, message: &str) {
    let _ = app.emit(
        "snackbar",
        SnackbarEvent {
            message: message.to_string(),
        },
    );
}

#[derive(Debug, Clone, Serialize)]
pub struct NavigateEvent {
    pub route: String,
    pub arg: Option<String>,
}

pub fn emit_navigate(app: &AppHandle, route: &str, arg: Option<String>) {
    let _ = app.emit(
        "navigate",
        NavigateEvent {
            route: route.to_string(),
            arg,
        },
    );
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslateEvent {
    pub op_id: String,
    pub status: String, // started|completed|failed|cancelled
    pub error_code: Option<String>,
}

pub fn emit_translate_event(app: &AppHandle, op_id: &str, status: &str, error_code: Option<&str>) {
    let _ = app.emit(
        "translate_event",
        TranslateEvent {
            op_id: op_id.to_string(),
            status: status.to_string(),
            error_code: error_code.map(str::to_string),
        },
    );
}
