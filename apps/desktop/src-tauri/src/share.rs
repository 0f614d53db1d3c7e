//! Hand a translation to the OS share surface. The control builder already
//! hides the affordance on Mac; this guard is the backstop for intents that
//! arrive anyway.

use tauri::AppHandle;
use tauri_plugin_opener::OpenerExt;

use lingua_core::Platform;

use crate::export::ExportError;

/// Percent-encode for a mailto/share URL body. Conservative: everything
/// outside unreserved characters is escaped.
fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

pub fn share_text(app: &AppHandle, text: &str) -> Result<(), ExportError> {
    if text.trim().is_empty() {
        return Err(ExportError::new(
            "E_SHARE_EMPTY_TEXT",
            "empty text cannot be shared",
        ));
    }
    if !Platform::current().supports_native_share() {
        return Err(ExportError::new(
            "E_SHARE_UNSUPPORTED",
            "native share is unavailable on this platform",
        ));
    }

    let url = format!("mailto:?body={}", encode_component(text));
    app.opener()
        .open_url(url, None::<&str>)
        .map_err(|e| ExportError::new("E_SHARE_FAILED", format!("share hand-off failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_escapes_reserved_characters() {
        assert_eq!(encode_component("a b&c=d?"), "a%20b%26c%3Dd%3F");
        assert_eq!(encode_component("safe-chars_.~"), "safe-chars_.~");
        assert_eq!(encode_component("猫"), "%E7%8C%AB");
    }
}
