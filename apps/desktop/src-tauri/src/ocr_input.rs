//! Image intake for the OCR flow. The webview hands over a base64 PNG (file
//! picker or camera frame); we persist it under the data dir, sanity-check
//! the encoding, and report its dimensions for the trace.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::Engine;

pub fn save_base64_image(data_dir: &Path, op_id: &str, b64: &str) -> Result<PathBuf> {
    let tmp = data_dir.join("tmp");
    std::fs::create_dir_all(&tmp).ok();
    let path = tmp.join(format!("{op_id}.png"));

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.as_bytes())
        .context("base64 decode failed")?;
    std::fs::write(&path, bytes).context("failed to write image file")?;
    Ok(path)
}

/// Decode the PNG header; rejects corrupt uploads before they hit the
/// network and yields (width, height) for logging.
pub fn png_dimensions(path: &Path) -> Result<(u32, u32)> {
    let f = std::fs::File::open(path).context("open image failed")?;
    let decoder = png::Decoder::new(f);
    let reader = decoder.read_info().context("not a valid png")?;
    let info = reader.info();
    Ok((info.width, info.height))
}

pub fn cleanup_image_best_effort(path: &Path) {
    let _ = std::fs::remove_file(path);
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG.
    const TINY_PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn save_then_measure_round_trips() {
        let td = tempfile::tempdir().expect("tempdir");
        let path = save_base64_image(td.path(), "op-1", TINY_PNG_B64).expect("save");
        assert!(path.exists());
        assert_eq!(png_dimensions(&path).expect("dims"), (1, 1));
        cleanup_image_best_effort(&path);
        assert!(!path.exists());
    }

    #[test]
    fn garbage_base64_is_rejected() {
        let td = tempfile::tempdir().expect("tempdir");
        assert!(save_base64_image(td.path(), "op-2", "!!!not-base64!!!").is_err());
    }

    #[test]
    fn non_png_payload_fails_validation() {
        let td = tempfile::tempdir().expect("tempdir");
        let b64 = base64::engine::general_purpose::STANDARD.encode(b"plain text");
        let path = save_base64_image(td.path(), "op-3", &b64).expect("save");
        assert!(png_dimensions(&path).is_err());
    }
}
