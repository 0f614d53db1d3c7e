//! The home-screen state store and its reducer.
//!
//! One intent in, pure state changes plus a list of side-effect descriptors
//! out. Effects are executed fire-and-forget by the dispatch layer; the
//! reducer never does I/O and never observes an effect's outcome.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use lingua_core::{language, ImeMode, Intent, LanguageSide, OutputStatus, TranslationOutput};

#[derive(Debug, Clone, Serialize)]
pub struct HomeState {
    pub screen_width: i32,
    pub input_text: String,
    pub selection_start: Option<u32>,
    pub selection_end: Option<u32>,
    pub output: Option<TranslationOutput>,
    pub ime_mode: ImeMode,
    pub fullscreen_input_box: bool,
    pub tts_playing: bool,
}

impl Default for HomeState {
    fn default() -> Self {
        Self {
            // Initial window width; the frontend reports the real value on
            // its first resize observation.
            screen_width: 500,
            input_text: String::new(),
            selection_start: None,
            selection_end: None,
            output: None,
            ime_mode: ImeMode::None,
            fullscreen_input_box: false,
            tts_playing: false,
        }
    }
}

/// Shared handle to the store; cheap to clone into worker threads.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<Mutex<HomeState>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> HomeState {
        self.inner.lock().unwrap().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut HomeState) -> R) -> R {
        let mut g = self.inner.lock().unwrap();
        f(&mut g)
    }
}

/// The language pair currently selected in settings; the reducer reads it
/// but never writes it directly (language changes go out as an effect).
#[derive(Debug, Clone)]
pub struct LanguagePair {
    pub input: String,
    pub output: String,
}

/// Side effects the dispatch layer runs after a reduce.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Translate {
        input_lang: String,
        output_lang: String,
        text: String,
    },
    PlayTts {
        lang: String,
        text: String,
    },
    StopTts,
    Copy {
        text: String,
    },
    Share {
        text: String,
    },
    TogglePhrasebook,
    LoadImage {
        from_camera: bool,
    },
    Navigate {
        route: String,
        arg: Option<String>,
    },
    SetLanguages {
        input: String,
        output: String,
    },
}

pub fn reduce(state: &mut HomeState, langs: &LanguagePair, intent: Intent) -> Vec<Effect> {
    match intent {
        Intent::UpdateInputText {
            text,
            selection_start,
            selection_end,
        } => {
            state.input_text = text;
            state.selection_start = selection_start;
            state.selection_end = selection_end;
            vec![]
        }
        Intent::ClearInput => {
            state.input_text.clear();
            state.selection_start = None;
            state.selection_end = None;
            vec![]
        }
        Intent::Translate => {
            if state.input_text.trim().is_empty() {
                return vec![];
            }
            vec![Effect::Translate {
                input_lang: langs.input.clone(),
                output_lang: langs.output.clone(),
                text: state.input_text.clone(),
            }]
        }
        Intent::SwapLanguages => {
            // Swapping is gated on the input side being a real language.
            if !language::is_output_capable(&langs.input) {
                return vec![];
            }
            vec![Effect::SetLanguages {
                input: langs.output.clone(),
                output: langs.input.clone(),
            }]
        }
        Intent::SwapWithOutput {
            input_lang,
            output_lang,
            input_text,
        } => {
            state.input_text = input_text;
            state.selection_start = None;
            state.selection_end = None;
            vec![Effect::SetLanguages {
                input: input_lang,
                output: output_lang,
            }]
        }
        Intent::SetInputLang { lang } => vec![Effect::SetLanguages {
            input: lang,
            output: langs.output.clone(),
        }],
        Intent::SetOutputLang { lang } => vec![Effect::SetLanguages {
            input: langs.input.clone(),
            output: lang,
        }],
        Intent::SetImeMode { mode } => {
            state.ime_mode = mode;
            vec![]
        }
        Intent::DismissImePanel => {
            state.ime_mode = ImeMode::None;
            vec![]
        }
        Intent::ToggleFullscreenInputBox => {
            state.fullscreen_input_box = !state.fullscreen_input_box;
            vec![]
        }
        Intent::TogglePhrasebook => match &state.output {
            Some(out) if out.status != OutputStatus::Loading => vec![Effect::TogglePhrasebook],
            _ => vec![],
        },
        Intent::PlayTextToSpeech { lang, text } => vec![Effect::PlayTts { lang, text }],
        Intent::StopTextToSpeech => vec![Effect::StopTts],
        Intent::CopyToClipboard { text } => vec![Effect::Copy { text }],
        Intent::ShareText { text } => vec![Effect::Share { text }],
        Intent::BiggerText { text } => vec![Effect::Navigate {
            route: "/bigger-text".to_string(),
            arg: Some(text),
        }],
        Intent::LoadImage { from_camera } => vec![Effect::LoadImage { from_camera }],
        Intent::OpenLanguageList { side } => vec![Effect::Navigate {
            route: "/language-list".to_string(),
            arg: Some(
                match side {
                    LanguageSide::Input => "inputLang",
                    LanguageSide::Output => "outputLang",
                }
                .to_string(),
            ),
        }],
        Intent::UpdateScreenWidth { width } => {
            state.screen_width = width.max(0);
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs() -> LanguagePair {
        LanguagePair {
            input: "en".to_string(),
            output: "fr".to_string(),
        }
    }

    fn loading_output() -> TranslationOutput {
        TranslationOutput {
            status: OutputStatus::Loading,
            input_lang: "en".to_string(),
            output_lang: "fr".to_string(),
            input_text: "hi".to_string(),
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

    #[test]
    fn translate_carries_the_current_pair_and_text() {
        let mut state = HomeState::default();
        state.input_text = "hello".to_string();
        let effects = reduce(&mut state, &langs(), Intent::Translate);
        assert_eq!(
            effects,
            vec![Effect::Translate {
                input_lang: "en".to_string(),
                output_lang: "fr".to_string(),
                text: "hello".to_string(),
            }]
        );
    }

    #[test]
    fn translate_with_blank_input_is_a_no_op() {
        let mut state = HomeState::default();
        state.input_text = "   ".to_string();
        assert!(reduce(&mut state, &langs(), Intent::Translate).is_empty());
    }

    #[test]
    fn swap_requires_an_output_capable_input_side() {
        let mut state = HomeState::default();
        let auto = LanguagePair {
            input: "auto".to_string(),
            output: "fr".to_string(),
        };
        assert!(reduce(&mut state, &auto, Intent::SwapLanguages).is_empty());

        let effects = reduce(&mut state, &langs(), Intent::SwapLanguages);
        assert_eq!(
            effects,
            vec![Effect::SetLanguages {
                input: "fr".to_string(),
                output: "en".to_string(),
            }]
        );
    }

    #[test]
    fn swap_with_output_adopts_text_and_pair() {
        let mut state = HomeState::default();
        let effects = reduce(
            &mut state,
            &langs(),
            Intent::SwapWithOutput {
                input_lang: "fr".to_string(),
                output_lang: "en".to_string(),
                input_text: "bonjour".to_string(),
            },
        );
        assert_eq!(state.input_text, "bonjour");
        assert_eq!(
            effects,
            vec![Effect::SetLanguages {
                input: "fr".to_string(),
                output: "en".to_string(),
            }]
        );
    }

    #[test]
    fn fullscreen_toggles_and_dismiss_clears_ime() {
        let mut state = HomeState::default();
        reduce(&mut state, &langs(), Intent::ToggleFullscreenInputBox);
        assert!(state.fullscreen_input_box);
        reduce(&mut state, &langs(), Intent::ToggleFullscreenInputBox);
        assert!(!state.fullscreen_input_box);

        state.ime_mode = ImeMode::Speech;
        reduce(&mut state, &langs(), Intent::DismissImePanel);
        assert_eq!(state.ime_mode, ImeMode::None);
    }

    #[test]
    fn phrasebook_toggle_needs_a_settled_output() {
        let mut state = HomeState::default();
        assert!(reduce(&mut state, &langs(), Intent::TogglePhrasebook).is_empty());

        state.output = Some(loading_output());
        assert!(reduce(&mut state, &langs(), Intent::TogglePhrasebook).is_empty());

        state.output.as_mut().unwrap().status = OutputStatus::Done;
        assert_eq!(
            reduce(&mut state, &langs(), Intent::TogglePhrasebook),
            vec![Effect::TogglePhrasebook]
        );
    }

    #[test]
    fn screen_width_never_goes_negative() {
        let mut state = HomeState::default();
        reduce(&mut state, &langs(), Intent::UpdateScreenWidth { width: -20 });
        assert_eq!(state.screen_width, 0);
        reduce(&mut state, &langs(), Intent::UpdateScreenWidth { width: 800 });
        assert_eq!(state.screen_width, 800);
    }
}
