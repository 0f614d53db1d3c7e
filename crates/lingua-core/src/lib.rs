//! Pure UI core for the Lingua translation assistant: language and platform
//! capability gates, toolbar control lists with responsive overflow, the
//! home-view render gate, and the intent vocabulary dispatched to the shell.
//!
//! Everything in this crate is a pure function of its inputs. No I/O, no
//! shared mutable state; the shell recomputes whatever it needs per render.

pub mod controls;
pub mod intent;
pub mod language;
pub mod platform;
pub mod view;

pub use controls::{
    input_controls, layout, output_controls, split_controls, Control, Icon, InputToolbarCtx,
    OutputToolbarCtx, ToolbarLayout, ICON_WIDTH_PX, INPUT_TOOLBAR_MARGIN_PX,
    OUTPUT_TOOLBAR_MARGIN_PX,
};
pub use intent::{Intent, LanguageSide};
pub use platform::Platform;
pub use view::{
    input_panel, output_pane, ImeMode, InputPanel, OutputPane, OutputStatus, TranslationOutput,
};
