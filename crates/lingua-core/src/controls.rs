//! Toolbar control lists and responsive overflow layout.
//!
//! Both toolbars are ordered `Control` sequences built from the current
//! store snapshot; order decides inline rendering and the overflow menu
//! alike. Builders are pure: same inputs, same list.

use serde::{Deserialize, Serialize};

use crate::intent::Intent;
use crate::language;
use crate::platform::Platform;

/// Fixed rendered width of one toolbar icon button.
pub const ICON_WIDTH_PX: i32 = 56;
/// Width the input toolbar cannot use (trailing translate button etc.).
pub const INPUT_TOOLBAR_MARGIN_PX: i32 = 200;
/// Width the output toolbar cannot use; smaller, no trailing button.
pub const OUTPUT_TOOLBAR_MARGIN_PX: i32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Clear,
    VolumeUp,
    Stop,
    Mic,
    Gesture,
    Image,
    CameraAlt,
    Fullscreen,
    FullscreenExit,
    Star,
    StarBorder,
    SwapVert,
    FormatSize,
    ContentCopy,
    Share,
}

/// One actionable toolbar affordance. Icon identifiers need not be unique
/// within a list; the tooltip key resolves through the localization table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Control {
    pub icon: Icon,
    pub tooltip_key: &'static str,
    pub intent: Intent,
}

fn control(icon: Icon, tooltip_key: &'static str, intent: Intent) -> Control {
    Control {
        icon,
        tooltip_key,
        intent,
    }
}

fn listen_control(playing: bool, lang: &str, text: &str) -> Control {
    if playing {
        control(Icon::Stop, "stop", Intent::StopTextToSpeech)
    } else {
        control(
            Icon::VolumeUp,
            "listen",
            Intent::PlayTextToSpeech {
                lang: lang.to_string(),
                text: text.to_string(),
            },
        )
    }
}

/// Insert `extra` immediately before the fullscreen toggle. Anchoring on the
/// control itself, not a numeric offset, keeps the placement stable when
/// earlier optional controls come and go.
fn insert_before_fullscreen(controls: &mut Vec<Control>, extra: Control) {
    let at = controls
        .iter()
        .position(|c| matches!(c.intent, Intent::ToggleFullscreenInputBox))
        .unwrap_or(controls.len());
    controls.insert(at, extra);
}

#[derive(Debug, Clone, Copy)]
pub struct InputToolbarCtx<'a> {
    pub input_lang: &'a str,
    pub input_text: &'a str,
    pub tts_playing: bool,
    pub fullscreen_input_box: bool,
    pub platform: Platform,
}

/// Controls under the input textarea, in display order.
pub fn input_controls(ctx: &InputToolbarCtx<'_>) -> Vec<Control> {
    let mut controls = vec![control(Icon::Clear, "clear", Intent::ClearInput)];

    if language::supports_tts(ctx.input_lang) {
        controls.push(listen_control(ctx.tts_playing, ctx.input_lang, ctx.input_text));
    }
    if language::supports_voice_input(ctx.input_lang) {
        controls.push(control(
            Icon::Mic,
            "speak",
            Intent::SetImeMode {
                mode: crate::view::ImeMode::Speech,
            },
        ));
    }
    if language::supports_handwriting(ctx.input_lang) {
        controls.push(control(
            Icon::Gesture,
            "draw",
            Intent::SetImeMode {
                mode: crate::view::ImeMode::Handwriting,
            },
        ));
    }
    if language::supports_ocr(ctx.input_lang) {
        controls.push(control(
            Icon::Image,
            "openImageFile",
            Intent::LoadImage { from_camera: false },
        ));
    }

    controls.push(if ctx.fullscreen_input_box {
        control(
            Icon::FullscreenExit,
            "exitFullscreen",
            Intent::ToggleFullscreenInputBox,
        )
    } else {
        control(Icon::Fullscreen, "fullscreen", Intent::ToggleFullscreenInputBox)
    });

    if ctx.platform.supports_camera_capture() && language::supports_ocr(ctx.input_lang) {
        insert_before_fullscreen(
            &mut controls,
            control(Icon::CameraAlt, "camera", Intent::LoadImage { from_camera: true }),
        );
    }

    controls
}

#[derive(Debug, Clone, Copy)]
pub struct OutputToolbarCtx<'a> {
    pub input_lang: &'a str,
    pub output_lang: &'a str,
    pub output_text: &'a str,
    pub phrasebook_id: Option<&'a str>,
    pub tts_playing: bool,
    pub platform: Platform,
}

/// Controls on the result card, in display order. The listen control goes to
/// the FRONT here (the input toolbar keeps it in second position); that
/// asymmetry is intended.
pub fn output_controls(ctx: &OutputToolbarCtx<'_>) -> Vec<Control> {
    let mut controls = vec![
        if ctx.phrasebook_id.is_some() {
            control(Icon::Star, "removeFromPhrasebook", Intent::TogglePhrasebook)
        } else {
            control(Icon::StarBorder, "addToPhrasebook", Intent::TogglePhrasebook)
        },
        control(
            Icon::SwapVert,
            "swap",
            Intent::SwapWithOutput {
                input_lang: ctx.output_lang.to_string(),
                output_lang: ctx.input_lang.to_string(),
                input_text: ctx.output_text.to_string(),
            },
        ),
        control(
            Icon::FormatSize,
            "biggerText",
            Intent::BiggerText {
                text: ctx.output_text.to_string(),
            },
        ),
        control(
            Icon::ContentCopy,
            "copy",
            Intent::CopyToClipboard {
                text: ctx.output_text.to_string(),
            },
        ),
    ];

    if language::supports_tts(ctx.output_lang) {
        controls.insert(0, listen_control(ctx.tts_playing, ctx.output_lang, ctx.output_text));
    }

    if ctx.platform.supports_native_share() {
        controls.push(control(
            Icon::Share,
            "share",
            Intent::ShareText {
                text: ctx.output_text.to_string(),
            },
        ));
    }

    controls
}

/// How many controls fit inline for a given viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolbarLayout {
    pub visible: usize,
    pub overflow: bool,
}

/// `visible = clamp(round((screen_width - margin) / 56), 0, count)`.
///
/// Rounding is half-away-from-zero; for the non-negative widths that can
/// reach this point it agrees with conventional half-up rounding, and a
/// negative intermediate clamps to 0 under either rule.
pub fn layout(screen_width: i32, margin: i32, count: usize) -> ToolbarLayout {
    let raw = f64::from(screen_width - margin) / f64::from(ICON_WIDTH_PX);
    let visible = (raw.round() as i64).clamp(0, count as i64) as usize;
    ToolbarLayout {
        visible,
        overflow: visible < count,
    }
}

/// Split a control list per `layout`: the inline slice, and the overflow
/// slice only when an overflow menu should exist at all.
pub fn split_controls<'a>(
    controls: &'a [Control],
    l: ToolbarLayout,
) -> (&'a [Control], Option<&'a [Control]>) {
    let visible = l.visible.min(controls.len());
    let inline = &controls[..visible];
    if l.overflow {
        (inline, Some(&controls[visible..]))
    } else {
        (inline, None)
    }
}
