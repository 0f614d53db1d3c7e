//! The store write contract: one intent per user action.
//!
//! Intents are opaque commands (name + arguments) consumed by the shell's
//! reducer/effect layer. Emitting one is fire-and-forget; nothing here
//! observes whether the action succeeded.

use serde::{Deserialize, Serialize};

use crate::view::ImeMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageSide {
    Input,
    Output,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    UpdateInputText {
        text: String,
        #[serde(default)]
        selection_start: Option<u32>,
        #[serde(default)]
        selection_end: Option<u32>,
    },
    ClearInput,
    Translate,
    /// Swap the language pair in place, keeping the input text.
    SwapLanguages,
    /// Adopt a finished translation as the new input (languages and text).
    SwapWithOutput {
        input_lang: String,
        output_lang: String,
        input_text: String,
    },
    SetInputLang {
        lang: String,
    },
    SetOutputLang {
        lang: String,
    },
    SetImeMode {
        mode: ImeMode,
    },
    /// Click outside an active ime panel dismisses it; a no-op otherwise.
    DismissImePanel,
    ToggleFullscreenInputBox,
    TogglePhrasebook,
    PlayTextToSpeech {
        lang: String,
        text: String,
    },
    StopTextToSpeech,
    CopyToClipboard {
        text: String,
    },
    ShareText {
        text: String,
    },
    BiggerText {
        text: String,
    },
    LoadImage {
        from_camera: bool,
    },
    OpenLanguageList {
        side: LanguageSide,
    },
    UpdateScreenWidth {
        width: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_serialize_as_tagged_commands() {
        let v = serde_json::to_value(&Intent::LoadImage { from_camera: true }).unwrap();
        assert_eq!(v["type"], "load_image");
        assert_eq!(v["from_camera"], true);

        let v = serde_json::to_value(&Intent::SetImeMode {
            mode: ImeMode::Speech,
        })
        .unwrap();
        assert_eq!(v["type"], "set_ime_mode");
        assert_eq!(v["mode"], "speech");
    }

    #[test]
    fn optional_selection_defaults_to_absent() {
        let i: Intent =
            serde_json::from_str(r#"{"type":"update_input_text","text":"hi"}"#).unwrap();
        assert_eq!(
            i,
            Intent::UpdateInputText {
                text: "hi".to_string(),
                selection_start: None,
                selection_end: None,
            }
        );
    }
}
