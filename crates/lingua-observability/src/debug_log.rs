//! Opt-in raw payload dumps for provider requests/responses.
//!
//! Disabled unless `LINGUA_DEBUG_VERBOSE` is set: payloads may contain user
//! text. Dumps are size-capped, SHA-256 stamped for cross-referencing with
//! metrics events, and pruned to a bounded number of operations.

use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use sha2::{Digest, Sha256};

use crate::metrics;

const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1_000_000; // 1MB
const DEFAULT_MAX_OPS: usize = 40;

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn env_bool(key: &str) -> bool {
    match std::env::var(key) {
        Ok(v) => {
            let t = v.trim().to_ascii_lowercase();
            t == "1" || t == "true" || t == "yes" || t == "on"
        }
        Err(_) => false,
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

pub fn verbose_enabled() -> bool {
    env_bool("LINGUA_DEBUG_VERBOSE")
}

fn max_payload_bytes() -> usize {
    env_usize("LINGUA_DEBUG_MAX_PAYLOAD_BYTES", DEFAULT_MAX_PAYLOAD_BYTES)
}

fn max_ops() -> usize {
    env_usize("LINGUA_DEBUG_MAX_OPS", DEFAULT_MAX_OPS)
}

pub fn debug_root(data_dir: &Path) -> PathBuf {
    data_dir.join("debug")
}

pub fn debug_op_dir(data_dir: &Path, op_id: &str) -> PathBuf {
    debug_root(data_dir).join(op_id)
}

#[derive(Debug, Clone)]
pub struct PayloadInfo {
    pub path: PathBuf,
    pub bytes_written: usize,
    pub truncated: bool,
    pub sha256: String,
}

fn sha256_hex(b: &[u8]) -> String {
    hex::encode(Sha256::digest(b))
}

fn truncate_with_suffix(mut b: Vec<u8>, max_bytes: usize, suffix: &[u8]) -> (Vec<u8>, bool) {
    if b.len() <= max_bytes {
        return (b, false);
    }
    b.truncate(max_bytes.saturating_sub(suffix.len()));
    b.extend_from_slice(suffix);
    (b, true)
}

pub fn write_payload_best_effort(
    data_dir: &Path,
    op_id: &str,
    filename: &str,
    bytes: Vec<u8>,
) -> Option<PayloadInfo> {
    if !verbose_enabled() {
        return None;
    }

    let (out, truncated) = truncate_with_suffix(bytes, max_payload_bytes(), b"\n...(truncated)\n");
    let sha256 = sha256_hex(&out);

    let dir = debug_op_dir(data_dir, op_id);
    if let Err(e) = fs::create_dir_all(&dir) {
        crate::safe_eprintln!("debug_log: create_dir_all failed: {}: {e}", dir.display());
        return None;
    }
    let path = dir.join(filename);
    if let Err(e) = fs::write(&path, &out) {
        crate::safe_eprintln!("debug_log: write failed: {}: {e}", path.display());
        return None;
    }

    prune_best_effort(data_dir);

    let info = PayloadInfo {
        path,
        bytes_written: out.len(),
        truncated,
        sha256,
    };
    let obj = serde_json::json!({
        "type": "debug_payload",
        "ts_ms": now_ms(),
        "op_id": op_id,
        "payload_path": info.path.to_string_lossy().to_string(),
        "payload_bytes": info.bytes_written,
        "truncated": info.truncated,
        "sha256": info.sha256,
    });
    if let Err(e) = metrics::append_jsonl(data_dir, &obj) {
        crate::safe_eprintln!("debug_log: metrics append failed: {e:#}");
    }
    Some(info)
}

/// Keep the debug directory from growing without bound: newest dirs win.
pub fn prune_best_effort(data_dir: &Path) {
    let root = debug_root(data_dir);
    let keep = max_ops();
    let Ok(entries) = fs::read_dir(&root) else {
        return;
    };

    let mut dirs: Vec<(SystemTime, PathBuf)> = Vec::new();
    for ent in entries.flatten() {
        let p = ent.path();
        if !p.is_dir() {
            continue;
        }
        let m = ent
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .unwrap_or(UNIX_EPOCH);
        dirs.push((m, p));
    }
    if dirs.len() <= keep {
        return;
    }
    dirs.sort_by(|a, b| b.0.cmp(&a.0));
    for (_m, p) in dirs.into_iter().skip(keep) {
        if let Err(e) = fs::remove_dir_all(&p) {
            crate::safe_eprintln!("debug_log: remove_dir_all failed: {}: {e}", p.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_keeps_the_suffix_inside_the_cap() {
        let (out, truncated) = truncate_with_suffix(vec![b'a'; 100], 32, b"...");
        assert!(truncated);
        assert_eq!(out.len(), 32);
        assert!(out.ends_with(b"..."));

        let (out, truncated) = truncate_with_suffix(vec![b'a'; 8], 32, b"...");
        assert!(!truncated);
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn disabled_by_default() {
        let td = tempfile::tempdir().expect("tempdir");
        // LINGUA_DEBUG_VERBOSE unset in the test environment.
        assert!(write_payload_best_effort(td.path(), "op-1", "req.json", b"{}".to_vec()).is_none());
    }
}
