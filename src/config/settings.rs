//! Paths, filenames, and tuning constants.

use std::path::{Path, PathBuf};

use crate::error::{GoblinError, Result};


/// Raw telemetry log written by the Gemini CLI.
pub const RAW_LOG_FILE: &str = "telemetry.log";

/// Canonical JSONL file produced by conversion.
pub const JSONL_FILE: &str = "telemetry.jsonl";

/// Subdirectories the Gemini CLI may nest its telemetry under.
const GEMINI_SUBDIRS: [&str; 2] = [".gemini", "gemini"];

/// Seconds a cached price table stays fresh.
pub const PRICE_CACHE_MAX_AGE_SECS: u64 = 86_400;


/// Default raw log location: `.gemini/telemetry.log` under the working
/// directory.
pub fn default_raw_log_path() -> PathBuf {
    PathBuf::from(".gemini").join(RAW_LOG_FILE)
}


/// Resolve the telemetry file to read from `path`.
///
/// A directory is probed for a raw `telemetry.log` first, so fresh
/// events get converted before aggregation, then for `telemetry.jsonl`,
/// each directly and one level under `.gemini`/`gemini`. A file must
/// end in `.log` or `.jsonl`.
pub fn resolve_log_path(path: &Path) -> Result<PathBuf> {
    if path.is_dir() {
        for name in [RAW_LOG_FILE, JSONL_FILE] {
            for base in candidate_dirs(path) {
                let candidate = base.join(name);
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }
        return Err(GoblinError::TelemetryNotFound(path.to_path_buf()));
    }

    match path.extension().and_then(|e| e.to_str()) {
        Some("log") | Some("jsonl") => {
            if path.is_file() {
                Ok(path.to_path_buf())
            } else {
                Err(GoblinError::InputNotFound(path.to_path_buf()))
            }
        }
        _ => Err(GoblinError::InvalidInput {
            message: format!("telemetry file must be .log or .jsonl: {}", path.display()),
        }),
    }
}


fn candidate_dirs(dir: &Path) -> Vec<PathBuf> {
    let mut dirs = vec![dir.to_path_buf()];
    for sub in GEMINI_SUBDIRS {
        dirs.push(dir.join(sub));
    }
    dirs
}
