//! End-to-end pipeline tests: raw log → canonical JSONL → daily stats.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use chrono_tz::Tz;
use tempfile::tempdir;

use gemini_goblin::aggregation::process_log_file;
use gemini_goblin::convert::convert_log_file;
use gemini_goblin::data::read_last_timestamp;
use gemini_goblin::models::{ModelPricing, PriceSpec};
use gemini_goblin::simplify::SimplifyLevel;


fn response(model: &str, ts: &str, input: i64, output: i64) -> serde_json::Value {
    serde_json::json!({
        "resource": {"service.name": "gemini-cli"},
        "attributes": {
            "event.name": "gemini_cli.api_response",
            "event.timestamp": ts,
            "model": model,
            "input_token_count": input,
            "output_token_count": output,
            "cached_content_token_count": 0,
            "thoughts_token_count": 0,
        },
        "_body": "API response"
    })
}


fn write_raw_log(path: &Path, entries: &[serde_json::Value]) {
    let mut f = fs::File::create(path).unwrap();
    for entry in entries {
        writeln!(f, "{}", serde_json::to_string_pretty(entry).unwrap()).unwrap();
    }
}


fn price_spec() -> PriceSpec {
    let mut spec = HashMap::new();
    spec.insert(
        "gemini-pro".to_string(),
        ModelPricing {
            input_cost_per_token: Some(1e-6),
            output_cost_per_token: Some(2e-6),
            ..Default::default()
        },
    );
    spec
}


fn setup(dir: &Path) -> (PathBuf, PathBuf) {
    let raw = dir.join("telemetry.log");
    let jsonl = dir.join("telemetry.jsonl");
    write_raw_log(
        &raw,
        &[
            response("gemini-pro", "2024-03-01T10:00:00Z", 1000, 500),
            serde_json::json!({
                "attributes": {
                    "event.name": "gemini_cli.config",
                    "event.timestamp": "2024-03-01T10:00:01Z",
                },
                "_body": "config"
            }),
            response("gemini-flash", "2024-03-01T11:00:00Z", 200, 100),
        ],
    );
    (raw, jsonl)
}


#[test]
fn test_convert_then_aggregate() {
    let dir = tempdir().unwrap();
    let (raw, jsonl) = setup(dir.path());

    let outcome = convert_log_file(&raw, &jsonl, None, SimplifyLevel::Events).unwrap();
    assert_eq!(outcome.written, 2);
    assert_eq!(outcome.skipped, 0);

    // Level 1 keeps the retained records whole.
    let content = fs::read_to_string(&jsonl).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in &lines {
        let record: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(record["resource"]["service.name"], "gemini-cli");
        assert_eq!(record["_body"], "API response");
    }

    let (usage, count, had_errors) =
        process_log_file(&jsonl, &price_spec(), Some(Tz::UTC)).unwrap();
    assert!(!had_errors);
    assert_eq!(count, 2);

    let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let pro = &usage[&(day, "gemini-pro".to_string())];
    assert_eq!(pro.count, 1);
    assert_eq!(pro.input_tokens, 1000);
    assert!((pro.cost - 0.002).abs() < 1e-12);

    let flash = &usage[&(day, "gemini-flash".to_string())];
    assert_eq!(flash.count, 1);
    // Unlisted model: events still counted, cost zero.
    assert_eq!(flash.cost, 0.0);
}


#[test]
fn test_reconversion_is_idempotent() {
    let dir = tempdir().unwrap();
    let (raw, jsonl) = setup(dir.path());

    let first = convert_log_file(&raw, &jsonl, None, SimplifyLevel::Events).unwrap();
    assert_eq!(first.written, 2);

    // Converting the same input against its own output again skips
    // everything at or behind the watermark.
    let watermark = read_last_timestamp(&jsonl).unwrap();
    assert_eq!(watermark.as_deref(), Some("2024-03-01T11:00:00Z"));

    let second =
        convert_log_file(&raw, &jsonl, watermark.as_deref(), SimplifyLevel::Events).unwrap();
    assert_eq!(second.written, 0);
    assert_eq!(second.skipped, 3);
    assert_eq!(fs::read_to_string(&jsonl).unwrap().lines().count(), 2);
}


#[test]
fn test_new_records_append_after_watermark() {
    let dir = tempdir().unwrap();
    let (raw, jsonl) = setup(dir.path());

    convert_log_file(&raw, &jsonl, None, SimplifyLevel::Events).unwrap();
    let watermark = read_last_timestamp(&jsonl).unwrap();

    // The CLI appended one more event to the raw log since the last run.
    write_raw_log(
        &raw,
        &[
            response("gemini-pro", "2024-03-01T10:00:00Z", 1000, 500),
            response("gemini-flash", "2024-03-01T11:00:00Z", 200, 100),
            response("gemini-pro", "2024-03-02T09:00:00Z", 50, 25),
        ],
    );

    let outcome =
        convert_log_file(&raw, &jsonl, watermark.as_deref(), SimplifyLevel::Events).unwrap();
    assert_eq!(outcome.written, 1);
    assert_eq!(outcome.skipped, 2);

    let (usage, count, _) = process_log_file(&jsonl, &price_spec(), Some(Tz::UTC)).unwrap();
    assert_eq!(count, 3);
    let day2 = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    assert!(usage.contains_key(&(day2, "gemini-pro".to_string())));
}
