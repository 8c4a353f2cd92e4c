//! Incremental conversion of raw telemetry logs to canonical JSONL.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::data::{write_record, RawLogParser};
use crate::error::{GoblinError, Result};
use crate::models;
use crate::simplify::{simplify_record, SimplifyLevel};


/// Counters returned by a conversion run.
///
/// `skipped` counts records dropped for having no `event.timestamp` or
/// for sitting at or behind the watermark. Records removed by
/// simplification show up in neither counter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConvertOutcome {
    pub written: u64,
    pub skipped: u64,
}


/// Convert `input` (concatenated pretty-printed JSON) into JSONL at
/// `output`.
///
/// With a watermark the output is opened in append mode and records
/// whose timestamp does not exceed it are skipped; without one the
/// output is rewritten from scratch. Write failures abort the whole
/// conversion; malformed stretches of the input are handled by the
/// raw-log parser (warned and dropped).
pub fn convert_log_file(
    input: &Path,
    output: &Path,
    last_timestamp: Option<&str>,
    level: SimplifyLevel,
) -> Result<ConvertOutcome> {
    let parser = RawLogParser::open(input)?;

    let mut options = OpenOptions::new();
    options.create(true);
    if last_timestamp.is_some() {
        options.append(true);
    } else {
        options.write(true).truncate(true);
    }
    let out = options
        .open(output)
        .map_err(|e| GoblinError::io(format!("open {}", output.display()), e))?;
    let mut out = BufWriter::new(out);

    let mut outcome = ConvertOutcome::default();
    for item in parser {
        let record = item?;

        let timestamp = match models::attributes(&record).and_then(models::event_timestamp) {
            Some(ts) => ts.to_string(),
            None => {
                outcome.skipped += 1;
                continue;
            }
        };
        if let Some(watermark) = last_timestamp {
            if timestamp.as_str() <= watermark {
                outcome.skipped += 1;
                continue;
            }
        }

        let simplified = match simplify_record(record, level) {
            Some(simplified) => simplified,
            None => continue,
        };
        write_record(&mut out, &simplified)
            .map_err(|e| GoblinError::io(format!("write {}", output.display()), e))?;
        outcome.written += 1;
    }
    out.flush()
        .map_err(|e| GoblinError::io(format!("write {}", output.display()), e))?;

    Ok(outcome)
}
