//! Structured operation tracing as JSONL in the app data dir.
//!
//! Every command and provider call opens a [`Span`]; span ends carry a
//! status, a duration and, on errors, a stable `E_*` code. A span dropped
//! without an explicit end records `aborted` so silent early returns still
//! leave a trail. Size-based rotation keeps the log bounded.

use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use anyhow::Error as AnyhowError;
use serde::Serialize;
use serde_json::Value;

const DEFAULT_TRACE_MAX_BYTES: u64 = 5_000_000; // 5MB
const DEFAULT_TRACE_MAX_FILES: usize = 3;
const DEFAULT_BACKTRACE_MAX_CHARS: usize = 8_000;

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn env_bool_default_true(key: &str) -> bool {
    match std::env::var(key) {
        Ok(v) => {
            let t = v.trim().to_ascii_lowercase();
            !(t == "0" || t == "false" || t == "no" || t == "off")
        }
        Err(_) => true,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

pub fn enabled() -> bool {
    // Default: enabled. Set LINGUA_TRACE_ENABLED=0 to disable.
    env_bool_default_true("LINGUA_TRACE_ENABLED")
}

fn backtrace_enabled() -> bool {
    env_bool_default_true("LINGUA_TRACE_BACKTRACE")
}

pub fn trace_path(data_dir: &Path) -> PathBuf {
    data_dir.join("trace.jsonl")
}

fn rotate_if_needed_best_effort(data_dir: &Path) {
    let p = trace_path(data_dir);
    let max_bytes = env_u64("LINGUA_TRACE_MAX_BYTES", DEFAULT_TRACE_MAX_BYTES);
    let max_files = env_usize("LINGUA_TRACE_MAX_FILES", DEFAULT_TRACE_MAX_FILES);
    if max_files == 0 {
        return;
    }
    match std::fs::metadata(&p) {
        Ok(m) if m.len() > max_bytes => {}
        _ => return,
    }

    // Drop the oldest first; Windows refuses to rename onto an existing file.
    let _ = std::fs::remove_file(data_dir.join(format!("trace.jsonl.{max_files}")));
    let mut i = max_files;
    while i > 1 {
        let src = data_dir.join(format!("trace.jsonl.{}", i - 1));
        if src.exists() {
            let _ = std::fs::rename(&src, data_dir.join(format!("trace.jsonl.{i}")));
        }
        i -= 1;
    }
    let _ = std::fs::rename(&p, data_dir.join("trace.jsonl.1"));
}

fn write_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn emit_best_effort(data_dir: &Path, ev: &TraceEvent) {
    if !enabled() {
        return;
    }
    let _guard = write_lock().lock().unwrap();
    let _ = std::fs::create_dir_all(data_dir);
    rotate_if_needed_best_effort(data_dir);

    let p = trace_path(data_dir);
    let mut f = match OpenOptions::new().create(true).append(true).open(&p) {
        Ok(f) => f,
        Err(e) => {
            crate::safe_eprintln!("trace: open failed: {}: {e}", p.display());
            return;
        }
    };
    match serde_json::to_string(ev) {
        Ok(mut line) => {
            line.push('\n');
            if let Err(e) = f.write_all(line.as_bytes()) {
                crate::safe_eprintln!("trace: write failed: {e}");
            }
        }
        Err(e) => crate::safe_eprintln!("trace: serialize failed: {e}"),
    }
}

/// Scrub `<home prefix><username>` fragments so traces do not leak personal
/// absolute paths. Intentionally coarse; backtraces stay readable.
fn redact_user_paths(s: &str) -> String {
    let mut out = s.to_string();
    for (marker, sep) in [("/Users/", '/'), ("/home/", '/'), ("\\Users\\", '\\')] {
        let mut scrubbed = String::with_capacity(out.len());
        let mut rest = out.as_str();
        while let Some(pos) = rest.find(marker) {
            let after = pos + marker.len();
            scrubbed.push_str(&rest[..after]);
            scrubbed.push_str("<redacted>");
            let tail = &rest[after..];
            rest = match tail.find(sep) {
                Some(end) => &tail[end..],
                None => "",
            };
        }
        scrubbed.push_str(rest);
        out = scrubbed;
    }
    out
}

fn clamp_chars(s: &str, max_chars: usize) -> String {
    s.chars().filter(|&c| c != '\0').take(max_chars).collect()
}

fn maybe_backtrace() -> Option<String> {
    if !backtrace_enabled() {
        return None;
    }
    let bt = std::backtrace::Backtrace::force_capture();
    let max = env_usize("LINGUA_TRACE_BACKTRACE_MAX_CHARS", DEFAULT_BACKTRACE_MAX_CHARS);
    Some(clamp_chars(&redact_user_paths(&format!("{bt:?}")), max))
}

fn ctx_with_backtrace(extra: Option<Value>) -> Option<Value> {
    let Some(bt) = maybe_backtrace() else {
        return extra;
    };
    let mut m = match extra {
        Some(Value::Object(m)) => m,
        Some(v) => {
            let mut m = serde_json::Map::new();
            m.insert("extra".to_string(), v);
            m
        }
        None => serde_json::Map::new(),
    };
    m.insert("backtrace".to_string(), Value::String(bt));
    Some(Value::Object(m))
}

fn ctx_for_anyhow(err: &AnyhowError, extra: Option<Value>) -> Option<Value> {
    let chain: Vec<String> = err.chain().map(|e| e.to_string()).collect();
    let mut m = serde_json::Map::new();
    m.insert("err_chain".to_string(), serde_json::json!(chain));
    if let Some(Value::Object(extra)) = extra {
        for (k, v) in extra {
            m.insert(k, v);
        }
    }
    ctx_with_backtrace(Some(Value::Object(m)))
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceError {
    pub kind: String,    // io|http|db|remote|config|logic|unknown
    pub code: String,    // E_*
    pub message: String, // short
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub ts_ms: i64,
    pub op_id: Option<String>,
    pub stage: String,
    pub step_id: String,
    pub op: String,     // start|end|event
    pub status: String, // ok|err|aborted
    pub duration_ms: Option<u128>,
    pub error: Option<TraceError>,
    pub ctx: Option<Value>,
}

/// One-shot event without a surrounding span.
pub fn event(
    data_dir: &Path,
    op_id: Option<&str>,
    stage: &str,
    step_id: &str,
    status: &str,
    ctx: Option<Value>,
) {
    emit_best_effort(
        data_dir,
        &TraceEvent {
            ts_ms: now_ms(),
            op_id: op_id.map(str::to_string),
            stage: stage.to_string(),
            step_id: step_id.to_string(),
            op: "event".to_string(),
            status: status.to_string(),
            duration_ms: None,
            error: None,
            ctx,
        },
    );
}

pub struct Span {
    data_dir: PathBuf,
    op_id: Option<String>,
    stage: String,
    step_id: String,
    t0: Instant,
    finished: bool,
}

impl Span {
    pub fn start(
        data_dir: &Path,
        op_id: Option<&str>,
        stage: &str,
        step_id: &str,
        ctx: Option<Value>,
    ) -> Self {
        emit_best_effort(
            data_dir,
            &TraceEvent {
                ts_ms: now_ms(),
                op_id: op_id.map(str::to_string),
                stage: stage.to_string(),
                step_id: step_id.to_string(),
                op: "start".to_string(),
                status: "ok".to_string(),
                duration_ms: None,
                error: None,
                ctx,
            },
        );
        Self {
            data_dir: data_dir.to_path_buf(),
            op_id: op_id.map(str::to_string),
            stage: stage.to_string(),
            step_id: step_id.to_string(),
            t0: Instant::now(),
            finished: false,
        }
    }

    fn end(&mut self, status: &str, error: Option<TraceError>, ctx: Option<Value>) {
        self.finished = true;
        emit_best_effort(
            &self.data_dir,
            &TraceEvent {
                ts_ms: now_ms(),
                op_id: self.op_id.clone(),
                stage: self.stage.clone(),
                step_id: self.step_id.clone(),
                op: "end".to_string(),
                status: status.to_string(),
                duration_ms: Some(self.t0.elapsed().as_millis()),
                error,
                ctx,
            },
        );
    }

    pub fn ok(mut self, ctx: Option<Value>) {
        self.end("ok", None, ctx);
    }

    pub fn err(mut self, kind: &str, code: &str, message: &str, ctx: Option<Value>) {
        let error = Some(TraceError {
            kind: kind.to_string(),
            code: code.to_string(),
            message: message.to_string(),
        });
        let ctx = ctx_with_backtrace(ctx);
        self.end("err", error, ctx);
    }

    pub fn err_anyhow(mut self, kind: &str, code: &str, err: &AnyhowError, ctx: Option<Value>) {
        let error = Some(TraceError {
            kind: kind.to_string(),
            code: code.to_string(),
            message: err.to_string(),
        });
        let ctx = ctx_for_anyhow(err, ctx);
        self.end("err", error, ctx);
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let ctx = ctx_with_backtrace(None);
        self.end(
            "aborted",
            Some(TraceError {
                kind: "logic".to_string(),
                code: "ABORTED".to_string(),
                message: "span dropped without explicit ok/err".to_string(),
            }),
            ctx,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, thread};

    #[test]
    fn concurrent_emit_keeps_jsonl_lines_parseable() {
        let td = tempfile::tempdir().expect("tempdir");
        let dir = td.path().to_path_buf();
        let threads = 6;
        let per_thread = 80;

        let mut joins = Vec::new();
        for i in 0..threads {
            let dir2 = dir.clone();
            joins.push(thread::spawn(move || {
                for j in 0..per_thread {
                    event(
                        &dir2,
                        Some("op-concurrent"),
                        "TraceTest",
                        "TRACE.concurrent_emit",
                        "ok",
                        Some(serde_json::json!({"i": i, "j": j})),
                    );
                }
            }));
        }
        for j in joins {
            j.join().expect("join");
        }

        let raw = fs::read_to_string(trace_path(&dir)).expect("read trace");
        let mut lines = 0usize;
        for line in raw.lines() {
            lines += 1;
            let v: serde_json::Value = serde_json::from_str(line).expect("valid json line");
            assert!(v.get("step_id").is_some());
            assert!(v.get("status").is_some());
        }
        assert_eq!(lines, threads * per_thread);
    }

    #[test]
    fn dropped_span_records_aborted() {
        let td = tempfile::tempdir().expect("tempdir");
        {
            let _span = Span::start(td.path(), Some("op-1"), "Test", "TEST.drop", None);
        }
        let raw = fs::read_to_string(trace_path(td.path())).expect("read trace");
        let last: serde_json::Value =
            serde_json::from_str(raw.lines().last().expect("line")).expect("json");
        assert_eq!(last["status"], "aborted");
        assert_eq!(last["error"]["code"], "ABORTED");
    }

    #[test]
    fn err_span_carries_code_and_chain() {
        let td = tempfile::tempdir().expect("tempdir");
        let span = Span::start(td.path(), None, "Test", "TEST.err", None);
        let e = anyhow::anyhow!("inner").context("outer");
        span.err_anyhow("logic", "E_TEST", &e, None);
        let raw = fs::read_to_string(trace_path(td.path())).expect("read trace");
        let last: serde_json::Value =
            serde_json::from_str(raw.lines().last().expect("line")).expect("json");
        assert_eq!(last["error"]["code"], "E_TEST");
        assert_eq!(last["ctx"]["err_chain"][0], "outer");
        assert_eq!(last["ctx"]["err_chain"][1], "inner");
    }

    #[test]
    fn redaction_hides_the_username_segment() {
        let s = redact_user_paths("/home/alice/src/app.rs and /Users/bob/x");
        assert!(!s.contains("alice"), "{s}");
        assert!(!s.contains("bob"), "{s}");
        assert!(s.contains("/home/<redacted>/src/app.rs"), "{s}");
    }
}
