//! Assembles the serializable home view the webview renders: toolbar
//! layouts with overflow already computed, the output pane state, and the
//! resolved header labels.

use serde::Serialize;

use lingua_core::{
    controls, language, Control, Icon, InputPanel, Intent, OutputPane, Platform,
    TranslationOutput,
};

use crate::settings::Settings;
use crate::store::HomeState;
use crate::strings;

#[derive(Debug, Clone, Serialize)]
pub struct ControlView {
    pub icon: Icon,
    pub tooltip: String,
    pub intent: Intent,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolbarView {
    pub inline: Vec<ControlView>,
    /// Present only when something actually overflows.
    pub overflow: Option<Vec<ControlView>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputPaneView {
    Hidden,
    History,
    Progress,
    Result {
        output: TranslationOutput,
        toolbar: ToolbarView,
        attribution: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub input_lang: String,
    pub output_lang: String,
    pub input_lang_label: String,
    pub output_lang_label: String,
    pub swap_enabled: bool,
    pub input_text: String,
    pub input_text_lang: String,
    pub input_placeholder: String,
    pub translate_label: String,
    pub translate_when_pressing_enter: bool,
    pub fullscreen_input_box: bool,
    pub ime_panel: InputPanel,
    pub input_toolbar: ToolbarView,
    pub output_pane: OutputPaneView,
}

fn resolve(controls: Vec<Control>) -> Vec<ControlView> {
    controls
        .into_iter()
        .map(|c| ControlView {
            icon: c.icon,
            tooltip: strings::lookup(c.tooltip_key).to_string(),
            intent: c.intent,
        })
        .collect()
}

fn toolbar_view(all: Vec<Control>, screen_width: i32, margin: i32) -> ToolbarView {
    let l = controls::layout(screen_width, margin, all.len());
    let (inline, overflow) = controls::split_controls(&all, l);
    ToolbarView {
        inline: resolve(inline.to_vec()),
        overflow: overflow.map(|rest| resolve(rest.to_vec())),
    }
}

pub fn build_home_view(state: &HomeState, settings: &Settings, platform: Platform) -> HomeView {
    let input_toolbar = toolbar_view(
        controls::input_controls(&controls::InputToolbarCtx {
            input_lang: &settings.input_lang,
            input_text: &state.input_text,
            tts_playing: state.tts_playing,
            fullscreen_input_box: state.fullscreen_input_box,
            platform,
        }),
        state.screen_width,
        controls::INPUT_TOOLBAR_MARGIN_PX,
    );

    let output_pane = match lingua_core::output_pane(state.fullscreen_input_box, state.output.as_ref())
    {
        OutputPane::Hidden => OutputPaneView::Hidden,
        OutputPane::History => OutputPaneView::History,
        OutputPane::Progress => OutputPaneView::Progress,
        OutputPane::Result(out) => {
            let toolbar = toolbar_view(
                controls::output_controls(&controls::OutputToolbarCtx {
                    input_lang: &out.input_lang,
                    output_lang: &out.output_lang,
                    output_text: &out.output_text,
                    phrasebook_id: out.phrasebook_id.as_deref(),
                    tts_playing: state.tts_playing,
                    platform,
                }),
                state.screen_width,
                controls::OUTPUT_TOOLBAR_MARGIN_PX,
            );
            OutputPaneView::Result {
                output: out.clone(),
                toolbar,
                attribution: strings::lookup("translatedBy").to_string(),
            }
        }
    };

    HomeView {
        input_lang: settings.input_lang.clone(),
        output_lang: settings.output_lang.clone(),
        input_lang_label: strings::lookup(&settings.input_lang).to_string(),
        output_lang_label: strings::lookup(&settings.output_lang).to_string(),
        swap_enabled: language::is_output_capable(&settings.input_lang),
        input_text: state.input_text.clone(),
        input_text_lang: language::country_removed(&settings.input_lang).to_string(),
        input_placeholder: strings::lookup("typeSomethingHere").to_string(),
        translate_label: strings::lookup("translate").to_string(),
        translate_when_pressing_enter: settings.translate_when_pressing_enter,
        fullscreen_input_box: state.fullscreen_input_box,
        ime_panel: lingua_core::input_panel(state.ime_mode),
        input_toolbar,
        output_pane,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingua_core::OutputStatus;

    fn settings() -> Settings {
        Settings {
            input_lang: "en".to_string(),
            output_lang: "fr".to_string(),
            ..Settings::default()
        }
    }

    fn done_output() -> TranslationOutput {
        TranslationOutput {
            status: OutputStatus::Done,
            input_lang: "en".to_string(),
            output_lang: "fr".to_string(),
            input_text: "hello".to_string(),
            output_text: "bonjour".to_string(),
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
    fn fullscreen_hides_the_output_pane_entirely() {
        let mut state = HomeState::default();
        state.output = Some(done_output());
        state.fullscreen_input_box = true;
        let view = build_home_view(&state, &settings(), Platform::Linux);
        assert!(matches!(view.output_pane, OutputPaneView::Hidden));
    }

    #[test]
    fn no_output_renders_history() {
        let view = build_home_view(&HomeState::default(), &settings(), Platform::Linux);
        assert!(matches!(view.output_pane, OutputPaneView::History));
    }

    #[test]
    fn wide_screen_input_toolbar_has_no_overflow_menu() {
        let mut state = HomeState::default();
        state.screen_width = 1024;
        let view = build_home_view(&state, &settings(), Platform::Linux);
        assert!(view.input_toolbar.overflow.is_none());
    }

    #[test]
    fn narrow_screen_folds_trailing_controls_into_overflow() {
        let mut state = HomeState::default();
        // 340px, margin 200 -> round(140/56) = 3 visible; "en" builds 6.
        state.screen_width = 340;
        let view = build_home_view(&state, &settings(), Platform::Linux);
        assert_eq!(view.input_toolbar.inline.len(), 3);
        let overflow = view.input_toolbar.overflow.expect("overflow menu");
        assert_eq!(overflow.len(), 3);
        assert_eq!(overflow.last().unwrap().icon, Icon::Fullscreen);
    }

    #[test]
    fn result_pane_resolves_tooltips_through_the_string_table() {
        let mut state = HomeState::default();
        state.screen_width = 1024;
        state.output = Some(done_output());
        let view = build_home_view(&state, &settings(), Platform::Linux);
        let OutputPaneView::Result { toolbar, .. } = view.output_pane else {
            panic!("expected result pane");
        };
        // French has TTS: listen first, then the phrasebook star.
        assert_eq!(toolbar.inline[0].icon, Icon::VolumeUp);
        assert_eq!(toolbar.inline[0].tooltip, "Listen");
        assert_eq!(toolbar.inline[1].tooltip, "Add to phrasebook");
    }

    #[test]
    fn swap_is_disabled_while_detecting_the_input_language() {
        let mut s = settings();
        s.input_lang = "auto".to_string();
        let view = build_home_view(&HomeState::default(), &s, Platform::Linux);
        assert!(!view.swap_enabled);
        assert_eq!(view.input_lang_label, "Detect language");
    }
}
