//! Per-language capability gate.
//!
//! Every predicate is a total function over a closed set of known language
//! codes; unknown codes always resolve to `false`. The tables below mirror
//! the coverage of the external translation/speech/vision services and are
//! recomputed on every call (no caching, no mutable state).

/// Pseudo language that asks the translation service to detect the input.
pub const AUTO: &str = "auto";

/// Languages the translation service can translate INTO. `auto` is
/// deliberately absent: it is an input-side convenience only.
const OUTPUT_LANGUAGES: &[&str] = &[
    "af", "ar", "az", "be", "bg", "bn", "bs", "ca", "cs", "cy", "da", "de",
    "el", "en", "eo", "es", "et", "eu", "fa", "fi", "fil", "fr", "ga", "gl",
    "he", "hi", "hr", "ht", "hu", "hy", "id", "is", "it", "ja", "ka", "kk",
    "km", "kn", "ko", "la", "lt", "lv", "mk", "ml", "mn", "ms", "mt", "my",
    "ne", "nl", "no", "pa", "pl", "pt", "ro", "ru", "si", "sk", "sl", "sq",
    "sr", "sv", "sw", "ta", "te", "th", "tr", "uk", "ur", "uz", "vi",
    "zh-CN", "zh-TW",
];

/// Languages with a synthesis voice.
const TTS_LANGUAGES: &[&str] = &[
    "af", "ar", "bs", "ca", "cs", "cy", "da", "de", "el", "en", "eo", "es",
    "fi", "fr", "hi", "hr", "ht", "hu", "hy", "id", "is", "it", "ja", "ko",
    "la", "lv", "mk", "nl", "no", "pl", "pt", "ro", "ru", "sk", "sq", "sr",
    "sv", "sw", "ta", "th", "tr", "vi", "zh-CN", "zh-TW",
];

/// Languages the streaming speech recognizer accepts.
const VOICE_LANGUAGES: &[&str] = &[
    "ar", "bg", "ca", "cs", "da", "de", "el", "en", "es", "fi", "fr", "he",
    "hi", "hr", "hu", "id", "is", "it", "ja", "ko", "lt", "lv", "nl", "no",
    "pl", "pt", "ro", "ru", "sk", "sl", "sr", "sv", "th", "tr", "uk", "vi",
    "zh-CN", "zh-TW",
];

/// Languages with handwriting-candidate recognition.
const HANDWRITING_LANGUAGES: &[&str] = &[
    "af", "be", "bg", "ca", "cs", "cy", "da", "de", "el", "en", "eo", "es",
    "et", "fi", "fil", "fr", "ga", "hi", "hr", "ht", "hu", "id", "is", "it",
    "ja", "ko", "la", "lt", "lv", "mk", "ms", "mt", "nl", "no", "pl", "pt",
    "ro", "ru", "sk", "sl", "sq", "sr", "sv", "sw", "th", "tr", "uk", "vi",
    "zh-CN", "zh-TW",
];

/// Languages the OCR service can read from images.
const OCR_LANGUAGES: &[&str] = &[
    "af", "bg", "ca", "cs", "da", "de", "el", "en", "es", "et", "fi", "fr",
    "hr", "hu", "id", "it", "ja", "ko", "lt", "lv", "mk", "ms", "mt", "nl",
    "no", "pl", "pt", "ro", "ru", "sk", "sl", "sq", "sr", "sv", "th", "tr",
    "uk", "vi", "zh-CN", "zh-TW",
];

fn contains(table: &[&str], lang: &str) -> bool {
    table.iter().any(|&l| l == lang)
}

/// Whether `lang` is a code this app knows at all (including `auto`).
pub fn is_known(lang: &str) -> bool {
    lang == AUTO || contains(OUTPUT_LANGUAGES, lang)
}

/// Whether `lang` can be the target of a translation. Gates the
/// swap-direction control: swapping is meaningless while the input side is
/// `auto` or unknown.
pub fn is_output_capable(lang: &str) -> bool {
    contains(OUTPUT_LANGUAGES, lang)
}

pub fn supports_tts(lang: &str) -> bool {
    contains(TTS_LANGUAGES, lang)
}

pub fn supports_voice_input(lang: &str) -> bool {
    contains(VOICE_LANGUAGES, lang)
}

pub fn supports_handwriting(lang: &str) -> bool {
    contains(HANDWRITING_LANGUAGES, lang)
}

pub fn supports_ocr(lang: &str) -> bool {
    contains(OCR_LANGUAGES, lang)
}

/// Strip a country suffix: `zh-CN` -> `zh`. Used for text panes whose
/// rendering attributes only understand bare language codes.
pub fn country_removed(lang: &str) -> &str {
    match lang.split_once('-') {
        Some((base, _)) => base,
        None => lang,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_codes_fail_every_predicate() {
        for lang in ["", "xx", "tlh", "en-GB-oed", "AUTO"] {
            assert!(!is_output_capable(lang), "{lang}");
            assert!(!supports_tts(lang), "{lang}");
            assert!(!supports_voice_input(lang), "{lang}");
            assert!(!supports_handwriting(lang), "{lang}");
            assert!(!supports_ocr(lang), "{lang}");
        }
    }

    #[test]
    fn auto_is_known_but_not_output_capable() {
        assert!(is_known(AUTO));
        assert!(!is_output_capable(AUTO));
        assert!(!supports_tts(AUTO));
    }

    #[test]
    fn capability_tables_are_subsets_of_output_languages() {
        for table in [
            TTS_LANGUAGES,
            VOICE_LANGUAGES,
            HANDWRITING_LANGUAGES,
            OCR_LANGUAGES,
        ] {
            for lang in table {
                assert!(is_output_capable(lang), "{lang} missing from registry");
            }
        }
    }

    #[test]
    fn country_removed_strips_only_the_suffix() {
        assert_eq!(country_removed("zh-CN"), "zh");
        assert_eq!(country_removed("zh-TW"), "zh");
        assert_eq!(country_removed("en"), "en");
        assert_eq!(country_removed("fil"), "fil");
    }

    #[test]
    fn predicates_are_pure() {
        // Same input twice, same answer: nothing is cached or consumed.
        assert_eq!(supports_tts("ja"), supports_tts("ja"));
        assert!(supports_tts("ja"));
        assert!(supports_voice_input("zh-CN"));
        assert!(supports_handwriting("ja"));
        assert!(supports_ocr("ru"));
    }
}
