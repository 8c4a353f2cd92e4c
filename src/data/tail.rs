//! Backward scan for the last event timestamp in a JSONL file.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use serde_json::Value;

use crate::error::{GoblinError, Result};
use crate::models;


/// How much of the file tail to pull in per backward step.
const TAIL_CHUNK_SIZE: u64 = 64 * 1024;


/// Find the `event.timestamp` of the last usable record in `path`.
///
/// Reads fixed-size chunks backward from the end of the file,
/// reassembling lines across chunk seams, so only the tail of a large
/// accumulated log is ever touched. Corrupt trailing lines are skipped
/// with a warning and the scan continues backward. Returns `None` for an
/// empty file or one where no line yields a timestamp; callers treat
/// that the same as a missing file (full rewrite).
pub fn read_last_timestamp(path: &Path) -> Result<Option<String>> {
    let mut file = File::open(path)
        .map_err(|e| GoblinError::io(format!("open {}", path.display()), e))?;
    let len = file
        .metadata()
        .map_err(|e| GoblinError::io(format!("stat {}", path.display()), e))?
        .len();

    let mut pos = len;
    // Unscanned suffix of the file, starting at `pos`.
    let mut tail: Vec<u8> = Vec::new();

    loop {
        // Everything to the right of a newline in `tail` is a complete
        // line; scan those from the end.
        let mut end = tail.len();
        while let Some(nl) = tail[..end].iter().rposition(|&b| b == b'\n') {
            if let Some(ts) = timestamp_from_line(&tail[nl + 1..end]) {
                return Ok(Some(ts));
            }
            end = nl;
        }

        if pos == 0 {
            // The remaining head is the first line of the file.
            return Ok(timestamp_from_line(&tail[..end]));
        }

        // Keep the partial head line and pull in the previous chunk.
        tail.truncate(end);
        let step = TAIL_CHUNK_SIZE.min(pos);
        pos -= step;
        file.seek(SeekFrom::Start(pos))
            .map_err(|e| GoblinError::io(format!("seek {}", path.display()), e))?;
        let mut chunk = vec![0u8; step as usize];
        file.read_exact(&mut chunk)
            .map_err(|e| GoblinError::io(format!("read {}", path.display()), e))?;
        chunk.extend_from_slice(&tail);
        tail = chunk;
    }
}


/// Parse one line and pull out `attributes["event.timestamp"]`.
fn timestamp_from_line(line: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(line).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(record)) => models::attributes(&record)
            .and_then(models::event_timestamp)
            .map(str::to_string),
        _ => {
            eprintln!("Warning: skipping corrupt trailing line while locating last timestamp");
            None
        }
    }
}
