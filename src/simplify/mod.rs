//! Progressive, lossy simplification of telemetry records.
//!
//! Levels:
//! - 0: identity; every record and every field kept.
//! - 1: only `gemini_cli.api_response` / `gemini_cli.api_request`
//!   events, kept whole.
//! - 2: level-1 filter, then reshape to just `attributes` and `_body`.
//! - 3: `gemini_cli.api_response` only, with `attributes` reduced to a
//!   fixed token-accounting subset, plus `_body`.
//!
//! Each level's survivor set is contained in the previous level's, with
//! one documented exception: level 3 drops the `api_request` events that
//! levels 1 and 2 keep.

use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Value};

use crate::archive;
use crate::data::{write_record, JsonlStream, StreamError};
use crate::error::{GoblinError, Result};
use crate::models::{self, LogRecord, API_REQUEST_EVENT, API_RESPONSE_EVENT};


/// How aggressively records are filtered and reshaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SimplifyLevel {
    /// Keep everything as-is.
    Raw,
    /// Keep only API request/response events.
    Events,
    /// Events filter plus reshape to `attributes` and `_body`.
    Essential,
    /// API responses only, token-accounting attributes only.
    TokenCounts,
}


impl SimplifyLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Raw => 0,
            Self::Events => 1,
            Self::Essential => 2,
            Self::TokenCounts => 3,
        }
    }
}


impl TryFrom<u8> for SimplifyLevel {
    type Error = GoblinError;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            0 => Ok(Self::Raw),
            1 => Ok(Self::Events),
            2 => Ok(Self::Essential),
            3 => Ok(Self::TokenCounts),
            _ => Err(GoblinError::InvalidInput {
                message: format!("simplification level must be between 0 and 3, got {level}"),
            }),
        }
    }
}


impl fmt::Display for SimplifyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}


/// Attribute keys level 3 keeps. All of them must be present on a
/// response record; a record missing any is structurally broken.
const TOKEN_COUNT_KEYS: [&str; 11] = [
    "event.timestamp",
    "duration_ms",
    "input_token_count",
    "output_token_count",
    "cached_content_token_count",
    "thoughts_token_count",
    "total_token_count",
    "tool_token_count",
    "model",
    "session.id",
    "event.name",
];


/// Apply `level` to one record.
///
/// Returns `None` when the record should be dropped, either because the
/// level filters its event kind out (silent) or because a structural
/// precondition failed (warned). A structural failure never aborts the
/// stream; the caller just moves on to the next record.
pub fn simplify_record(mut record: LogRecord, level: SimplifyLevel) -> Option<LogRecord> {
    if level == SimplifyLevel::Raw {
        return Some(record);
    }

    let attributes = match models::attributes(&record) {
        Some(attributes) => attributes,
        None => {
            warn_skipped("no attributes map", &record);
            return None;
        }
    };
    let event = match models::event_name(attributes) {
        Some(event) => event.to_string(),
        None => {
            warn_skipped("no event.name attribute", &record);
            return None;
        }
    };

    match level {
        SimplifyLevel::Raw => unreachable!("handled above"),
        SimplifyLevel::Events => {
            if event == API_RESPONSE_EVENT || event == API_REQUEST_EVENT {
                Some(record)
            } else {
                None
            }
        }
        SimplifyLevel::Essential => {
            if event != API_RESPONSE_EVENT && event != API_REQUEST_EVENT {
                return None;
            }
            let attributes = match record.remove("attributes") {
                Some(attributes) => attributes,
                None => return None,
            };
            reshape(record, attributes)
        }
        SimplifyLevel::TokenCounts => {
            if event != API_RESPONSE_EVENT {
                return None;
            }
            let trimmed = match trim_attributes(attributes) {
                Some(trimmed) => trimmed,
                None => return None,
            };
            reshape(record, Value::Object(trimmed))
        }
    }
}


/// Build the fixed level-3 attribute subset. Every key is mandatory;
/// `null` values are kept, absent keys are not.
fn trim_attributes(attributes: &Map<String, Value>) -> Option<Map<String, Value>> {
    let mut trimmed = Map::new();
    for key in TOKEN_COUNT_KEYS {
        match attributes.get(key) {
            Some(value) => {
                trimmed.insert(key.to_string(), value.clone());
            }
            None => {
                eprintln!(
                    "Warning: skipping api_response record missing required attribute \"{key}\""
                );
                return None;
            }
        }
    }
    Some(trimmed)
}


/// Rebuild the record with exactly `attributes` and `_body`, in that
/// order. A record without `_body` is structurally broken and dropped.
fn reshape(mut record: LogRecord, attributes: Value) -> Option<LogRecord> {
    let body = match record.remove("_body") {
        Some(body) => body,
        None => {
            warn_skipped("no _body field", &record);
            return None;
        }
    };
    let mut out = LogRecord::new();
    out.insert("attributes".to_string(), attributes);
    out.insert("_body".to_string(), body);
    Some(out)
}


fn warn_skipped(reason: &str, record: &LogRecord) {
    let preview = serde_json::to_string(record).unwrap_or_default();
    eprintln!("Warning: skipping record with {reason}: {preview}");
}


/// Rewrite `input` in place at `level`, archiving the original first.
///
/// The simplified stream is written to `<input>.jsonl.tmp` and only
/// renamed over the input after the original has been archived (or
/// removed when archiving is disabled), so a crash part-way leaves the
/// original untouched. Pre-existing temp or archive files from an
/// earlier run are an error, reported before anything is moved.
/// Returns the number of records written.
pub fn run_file_simplification(
    input: &Path,
    level: SimplifyLevel,
    archive_folder: &Path,
    disable_archiving: bool,
) -> Result<u64> {
    if input.extension().and_then(|e| e.to_str()) != Some("jsonl") {
        return Err(GoblinError::InvalidInput {
            message: format!("input file must be a .jsonl file: {}", input.display()),
        });
    }
    if !input.is_file() {
        return Err(GoblinError::InputNotFound(input.to_path_buf()));
    }
    if level == SimplifyLevel::Raw {
        eprintln!("Warning: level 0 keeps every record; nothing to do");
        return Ok(0);
    }

    let temp_file = input.with_extension("jsonl.tmp");
    if temp_file.exists() {
        return Err(GoblinError::StaleArtifact(temp_file));
    }

    let archive_path = if disable_archiving {
        None
    } else {
        let target = archive::archive_target(input, archive_folder);
        if target.exists() {
            return Err(GoblinError::StaleArtifact(target));
        }
        Some(target)
    };

    let mut written = 0u64;
    {
        let out = fs::File::create(&temp_file)
            .map_err(|e| GoblinError::io(format!("create {}", temp_file.display()), e))?;
        let mut out = BufWriter::new(out);

        for item in JsonlStream::open(input)? {
            let record = match item {
                Ok(record) => record,
                Err(StreamError::Malformed { line, message }) => {
                    eprintln!(
                        "Warning: skipping malformed record at {}:{line}: {message}",
                        input.display()
                    );
                    continue;
                }
                Err(StreamError::Io(e)) => {
                    return Err(GoblinError::io(format!("read {}", input.display()), e));
                }
            };
            if let Some(simplified) = simplify_record(record, level) {
                write_record(&mut out, &simplified)
                    .map_err(|e| GoblinError::io(format!("write {}", temp_file.display()), e))?;
                written += 1;
            }
        }
        out.flush()
            .map_err(|e| GoblinError::io(format!("write {}", temp_file.display()), e))?;
    }

    match archive_path {
        Some(target) => {
            archive::move_file(input, &target)?;
            println!("Archived {} to {}", input.display(), target.display());
        }
        None => {
            fs::remove_file(input)
                .map_err(|e| GoblinError::io(format!("remove {}", input.display()), e))?;
        }
    }
    fs::rename(&temp_file, input).map_err(|e| {
        GoblinError::io(
            format!("rename {} to {}", temp_file.display(), input.display()),
            e,
        )
    })?;

    Ok(written)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::tempdir;

    fn record(json: &str) -> LogRecord {
        serde_json::from_str(json).unwrap()
    }

    fn response_record() -> LogRecord {
        record(
            r#"{
                "resource": {"service.name": "gemini-cli"},
                "attributes": {
                    "event.timestamp": "2024-01-01T00:00:00Z",
                    "duration_ms": 1200,
                    "input_token_count": 100,
                    "output_token_count": 50,
                    "cached_content_token_count": 0,
                    "thoughts_token_count": 10,
                    "total_token_count": 160,
                    "tool_token_count": 0,
                    "model": "gemini-pro",
                    "session.id": "s-1",
                    "event.name": "gemini_cli.api_response"
                },
                "_body": "API response"
            }"#,
        )
    }

    fn request_record() -> LogRecord {
        record(
            r#"{
                "attributes": {"event.name": "gemini_cli.api_request"},
                "_body": "API request"
            }"#,
        )
    }

    fn unrelated_record() -> LogRecord {
        record(
            r#"{
                "attributes": {"event.name": "gemini_cli.config"},
                "_body": "config"
            }"#,
        )
    }

    #[test]
    fn test_level_zero_is_identity() {
        for rec in [response_record(), unrelated_record(), record("{}")] {
            assert_eq!(
                simplify_record(rec.clone(), SimplifyLevel::Raw),
                Some(rec)
            );
        }
    }

    #[test]
    fn test_level_one_filters_by_event() {
        assert!(simplify_record(response_record(), SimplifyLevel::Events).is_some());
        assert!(simplify_record(request_record(), SimplifyLevel::Events).is_some());
        assert!(simplify_record(unrelated_record(), SimplifyLevel::Events).is_none());

        // Retained records keep their full structure.
        let kept = simplify_record(response_record(), SimplifyLevel::Events).unwrap();
        assert_eq!(kept, response_record());
    }

    #[test]
    fn test_missing_attributes_is_dropped() {
        assert!(simplify_record(record("{}"), SimplifyLevel::Events).is_none());
        assert!(simplify_record(
            record(r#"{"attributes": {"model": "x"}}"#),
            SimplifyLevel::Events
        )
        .is_none());
    }

    #[test]
    fn test_level_two_reshapes() {
        let kept = simplify_record(response_record(), SimplifyLevel::Essential).unwrap();

        let keys: Vec<_> = kept.keys().map(String::as_str).collect();
        assert_eq!(keys, ["attributes", "_body"]);
        assert_eq!(kept["_body"], "API response");
        // Attributes pass through unfiltered at level 2.
        assert_eq!(kept["attributes"]["duration_ms"], 1200);
    }

    #[test]
    fn test_level_two_requires_body() {
        let mut rec = response_record();
        rec.remove("_body");
        assert!(simplify_record(rec, SimplifyLevel::Essential).is_none());
    }

    #[test]
    fn test_level_three_drops_requests() {
        // The one break in the containment ordering: api_request survives
        // levels 1 and 2 but not level 3.
        assert!(simplify_record(request_record(), SimplifyLevel::Events).is_some());
        assert!(simplify_record(request_record(), SimplifyLevel::Essential).is_some());
        assert!(simplify_record(request_record(), SimplifyLevel::TokenCounts).is_none());
    }

    #[test]
    fn test_level_three_trims_attributes() {
        let kept = simplify_record(response_record(), SimplifyLevel::TokenCounts).unwrap();

        let keys: Vec<_> = kept.keys().map(String::as_str).collect();
        assert_eq!(keys, ["attributes", "_body"]);

        let attrs = kept["attributes"].as_object().unwrap();
        assert_eq!(attrs.len(), TOKEN_COUNT_KEYS.len());
        for key in TOKEN_COUNT_KEYS {
            assert!(attrs.contains_key(key), "missing {key}");
        }
        assert_eq!(attrs["model"], "gemini-pro");
    }

    #[test]
    fn test_level_three_requires_every_token_key() {
        let mut rec = response_record();
        rec["attributes"]
            .as_object_mut()
            .unwrap()
            .remove("duration_ms");
        assert!(simplify_record(rec, SimplifyLevel::TokenCounts).is_none());
    }

    #[test]
    fn test_survivors_are_nested_across_levels() {
        let records = vec![
            response_record(),
            request_record(),
            unrelated_record(),
            record("{}"),
        ];

        let survivors = |level: SimplifyLevel| -> Vec<usize> {
            records
                .iter()
                .enumerate()
                .filter(|(_, r)| simplify_record((*r).clone(), level).is_some())
                .map(|(i, _)| i)
                .collect()
        };

        let l1 = survivors(SimplifyLevel::Events);
        let l2 = survivors(SimplifyLevel::Essential);
        let l3 = survivors(SimplifyLevel::TokenCounts);

        assert_eq!(l1, vec![0, 1]);
        assert_eq!(l2, l1);
        // Level 3 is a strict subset: the request record falls out.
        assert_eq!(l3, vec![0]);
        assert!(l3.iter().all(|i| l2.contains(i)));
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(SimplifyLevel::try_from(0).unwrap(), SimplifyLevel::Raw);
        assert_eq!(
            SimplifyLevel::try_from(3).unwrap(),
            SimplifyLevel::TokenCounts
        );
        assert!(SimplifyLevel::try_from(4).is_err());
    }

    #[test]
    fn test_run_file_simplification() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("telemetry.jsonl");
        let archive_folder = dir.path().join("archive");
        fs::create_dir(&archive_folder).unwrap();

        let mut f = fs::File::create(&input).unwrap();
        for rec in [response_record(), request_record(), unrelated_record()] {
            writeln!(f, "{}", serde_json::to_string(&rec).unwrap()).unwrap();
        }
        writeln!(f, "{{malformed").unwrap();
        drop(f);

        let written =
            run_file_simplification(&input, SimplifyLevel::Events, &archive_folder, false)
                .unwrap();
        assert_eq!(written, 2);

        let content = fs::read_to_string(&input).unwrap();
        assert_eq!(content.lines().count(), 2);

        // The original was archived, the temp file cleaned up.
        assert_eq!(fs::read_dir(&archive_folder).unwrap().count(), 1);
        assert!(!input.with_extension("jsonl.tmp").exists());
    }

    #[test]
    fn test_run_file_simplification_can_discard_original() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("telemetry.jsonl");
        let mut f = fs::File::create(&input).unwrap();
        writeln!(f, "{}", serde_json::to_string(&response_record()).unwrap()).unwrap();
        drop(f);

        let written =
            run_file_simplification(&input, SimplifyLevel::TokenCounts, dir.path(), true)
                .unwrap();
        assert_eq!(written, 1);
        assert!(input.is_file());
        // Nothing archived.
        assert_eq!(
            fs::read_dir(dir.path())
                .unwrap()
                .filter(|e| e.as_ref().unwrap().path() != input)
                .count(),
            0
        );
    }

    #[test]
    fn test_run_file_simplification_preconditions() {
        let dir = tempdir().unwrap();

        let wrong_ext = dir.path().join("telemetry.log");
        fs::File::create(&wrong_ext).unwrap();
        assert!(matches!(
            run_file_simplification(&wrong_ext, SimplifyLevel::Events, dir.path(), true),
            Err(GoblinError::InvalidInput { .. })
        ));

        let missing = dir.path().join("missing.jsonl");
        assert!(matches!(
            run_file_simplification(&missing, SimplifyLevel::Events, dir.path(), true),
            Err(GoblinError::InputNotFound(_))
        ));

        let input = dir.path().join("telemetry.jsonl");
        fs::File::create(&input).unwrap();
        fs::File::create(input.with_extension("jsonl.tmp")).unwrap();
        assert!(matches!(
            run_file_simplification(&input, SimplifyLevel::Events, dir.path(), true),
            Err(GoblinError::StaleArtifact(_))
        ));
    }
}
