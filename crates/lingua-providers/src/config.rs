//! Service endpoint configuration shared by every provider client.

const DEFAULT_BASE_URL: &str = "https://api.lingua.app/v1";

/// Base URL of the translation service suite. `LINGUA_API_BASE_URL`
/// overrides the default for self-hosted gateways.
pub fn base_url() -> String {
    let raw = std::env::var("LINGUA_API_BASE_URL").unwrap_or_default();
    normalize_base_url(&raw)
}

pub fn normalize_base_url(s: &str) -> String {
    let mut t = s.trim().trim_end_matches('/').to_string();
    if t.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }

    // Allow users to paste a full endpoint and still work.
    for suffix in ["/translate", "/tts", "/ocr", "/handwriting"] {
        if let Some(stripped) = t.strip_suffix(suffix) {
            t = stripped.to_string();
            break;
        }
    }
    t.trim_end_matches('/').to_string()
}

/// The websocket side of the same gateway.
pub fn ws_base_url() -> String {
    let base = base_url();
    if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_falls_back_to_the_default() {
        assert_eq!(normalize_base_url(""), DEFAULT_BASE_URL);
        assert_eq!(normalize_base_url("   "), DEFAULT_BASE_URL);
    }

    #[test]
    fn trailing_slashes_and_full_endpoints_are_tolerated() {
        assert_eq!(normalize_base_url("https://x.test/v1/"), "https://x.test/v1");
        assert_eq!(
            normalize_base_url("https://x.test/v1/translate"),
            "https://x.test/v1"
        );
        assert_eq!(normalize_base_url("https://x.test/v1/ocr/"), "https://x.test/v1");
    }
}
