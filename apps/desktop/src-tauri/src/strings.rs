//! Localized UI strings. Lookups that miss fall back to the key itself so a
//! stale key can never take the view down.

/// English table; other locales ship with the frontend bundle and override
/// these at render time.
const EN: &[(&str, &str)] = &[
    ("addToPhrasebook", "Add to phrasebook"),
    ("biggerText", "Bigger text"),
    ("camera", "Camera"),
    ("clear", "Clear"),
    ("copied", "Copied"),
    ("copy", "Copy"),
    ("didYouMean", "Did you mean"),
    ("draw", "Draw"),
    ("exitFullscreen", "Exit fullscreen"),
    ("fullscreen", "Fullscreen"),
    ("listen", "Listen"),
    ("more", "More"),
    ("openImageFile", "Open image file"),
    ("removeFromPhrasebook", "Remove from phrasebook"),
    ("share", "Share"),
    ("speak", "Speak"),
    ("stop", "Stop"),
    ("swap", "Swap"),
    ("translate", "Translate"),
    ("translateFrom", "Translate from"),
    ("translatedBy", "Translated by Lingua"),
    ("typeSomethingHere", "Type something here"),
    // Language display names, keyed by code.
    ("auto", "Detect language"),
    ("ar", "Arabic"),
    ("de", "German"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("hi", "Hindi"),
    ("id", "Indonesian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("sv", "Swedish"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("vi", "Vietnamese"),
    ("zh-CN", "Chinese (Simplified)"),
    ("zh-TW", "Chinese (Traditional)"),
];

pub fn lookup(key: &str) -> &str {
    EN.iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_resolve() {
        assert_eq!(lookup("clear"), "Clear");
        assert_eq!(lookup("zh-CN"), "Chinese (Simplified)");
    }

    #[test]
    fn missing_keys_fall_back_to_the_key() {
        assert_eq!(lookup("noSuchKey"), "noSuchKey");
        assert_eq!(lookup("xx"), "xx");
    }
}
