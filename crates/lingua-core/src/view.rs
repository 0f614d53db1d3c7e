//! Render gate: which panel owns the input surface and what the output pane
//! shows. Pure reads over store-owned fields; transitions happen elsewhere.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImeMode {
    #[default]
    None,
    Handwriting,
    Speech,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStatus {
    Loading,
    Done,
    Failed,
}

/// A translation result as the store holds it. Dictionary payloads are kept
/// as raw JSON strings from the provider; the view forwards them opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationOutput {
    pub status: OutputStatus,
    pub input_lang: String,
    pub output_lang: String,
    pub input_text: String,
    #[serde(default)]
    pub output_text: String,
    #[serde(default)]
    pub input_roman: Option<String>,
    #[serde(default)]
    pub output_roman: Option<String>,
    #[serde(default)]
    pub suggested_input_lang: Option<String>,
    #[serde(default)]
    pub suggested_input_text: Option<String>,
    #[serde(default)]
    pub input_dict: Option<String>,
    #[serde(default)]
    pub output_dict: Option<String>,
    /// Set while the result is starred into the phrasebook.
    #[serde(default)]
    pub phrasebook_id: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

impl TranslationOutput {
    /// The dictionary section renders only when both sides are present.
    pub fn has_dictionary(&self) -> bool {
        self.input_dict.is_some() && self.output_dict.is_some()
    }
}

/// What the output half of the home view renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPane<'a> {
    /// Fullscreen input box: the pane renders nothing at all.
    Hidden,
    /// No output yet: the history view takes the space.
    History,
    /// Translation in flight: progress indicator only.
    Progress,
    /// Finished (or failed) result card.
    Result(&'a TranslationOutput),
}

pub fn output_pane(fullscreen_input_box: bool, output: Option<&TranslationOutput>) -> OutputPane<'_> {
    if fullscreen_input_box {
        return OutputPane::Hidden;
    }
    match output {
        None => OutputPane::History,
        Some(out) if out.status == OutputStatus::Loading => OutputPane::Progress,
        Some(out) => OutputPane::Result(out),
    }
}

/// Which auxiliary panel overlays the input surface. The textarea and
/// controller row stay mounted underneath either panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPanel {
    None,
    Handwriting,
    Speech,
}

pub fn input_panel(mode: ImeMode) -> InputPanel {
    match mode {
        ImeMode::None => InputPanel::None,
        ImeMode::Handwriting => InputPanel::Handwriting,
        ImeMode::Speech => InputPanel::Speech,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(status: OutputStatus) -> TranslationOutput {
        TranslationOutput {
            status,
            input_lang: "en".to_string(),
            output_lang: "ja".to_string(),
            input_text: "hello".to_string(),
            output_text: "こんにちは".to_string(),
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
    fn fullscreen_suppresses_the_pane_regardless_of_output() {
        let done = output(OutputStatus::Done);
        assert_eq!(output_pane(true, None), OutputPane::Hidden);
        assert_eq!(output_pane(true, Some(&done)), OutputPane::Hidden);
        let loading = output(OutputStatus::Loading);
        assert_eq!(output_pane(true, Some(&loading)), OutputPane::Hidden);
    }

    #[test]
    fn absent_output_means_history() {
        assert_eq!(output_pane(false, None), OutputPane::History);
    }

    #[test]
    fn loading_renders_progress_and_everything_else_a_result() {
        let loading = output(OutputStatus::Loading);
        assert_eq!(output_pane(false, Some(&loading)), OutputPane::Progress);

        let done = output(OutputStatus::Done);
        assert_eq!(output_pane(false, Some(&done)), OutputPane::Result(&done));

        let failed = output(OutputStatus::Failed);
        assert_eq!(output_pane(false, Some(&failed)), OutputPane::Result(&failed));
    }

    #[test]
    fn ime_panels_are_mutually_exclusive() {
        assert_eq!(input_panel(ImeMode::None), InputPanel::None);
        assert_eq!(input_panel(ImeMode::Handwriting), InputPanel::Handwriting);
        assert_eq!(input_panel(ImeMode::Speech), InputPanel::Speech);
    }

    #[test]
    fn dictionary_requires_both_sides() {
        let mut out = output(OutputStatus::Done);
        assert!(!out.has_dictionary());
        out.input_dict = Some("{}".to_string());
        assert!(!out.has_dictionary());
        out.output_dict = Some("{}".to_string());
        assert!(out.has_dictionary());
    }
}
