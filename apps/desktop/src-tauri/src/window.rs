//! Exclusive ownership of the main window handle. `Destroyed` empties the
//! slot; reactivation with an empty slot builds a fresh window. No ambient
//! global, and at most one main window ever exists.

use std::sync::Mutex;

use tauri::{AppHandle, WebviewUrl, WebviewWindow, WebviewWindowBuilder};

pub const MAIN_WINDOW_LABEL: &str = "main";

const INITIAL_WIDTH: f64 = 500.0;
const INITIAL_HEIGHT: f64 = 600.0;
const MIN_WIDTH: f64 = 320.0;
const MIN_HEIGHT: f64 = 500.0;

#[derive(Default)]
pub struct MainWindow {
    slot: Mutex<Option<WebviewWindow>>,
}

impl MainWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exists(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }

    /// Create the main window if the slot is empty. Returns whether a
    /// window was actually created.
    pub fn create_if_absent(&self, app: &AppHandle) -> tauri::Result<bool> {
        let mut slot = self.slot.lock().unwrap();
        if slot.is_some() {
            return Ok(false);
        }

        let builder = WebviewWindowBuilder::new(
            app,
            MAIN_WINDOW_LABEL,
            WebviewUrl::App("index.html".into()),
        )
        .title("Lingua")
        .inner_size(INITIAL_WIDTH, INITIAL_HEIGHT)
        .min_inner_size(MIN_WIDTH, MIN_HEIGHT);

        #[cfg(target_os = "macos")]
        let builder = builder.title_bar_style(tauri::TitleBarStyle::Overlay);

        *slot = Some(builder.build()?);
        Ok(true)
    }

    /// Called from the window-event loop when a window is destroyed.
    /// Returns true when it was ours and the slot is now empty.
    pub fn clear_if_label(&self, label: &str) -> bool {
        if label != MAIN_WINDOW_LABEL {
            return false;
        }
        let mut slot = self.slot.lock().unwrap();
        slot.take().is_some()
    }
}
