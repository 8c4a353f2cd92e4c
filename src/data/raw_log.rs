//! Parser for raw telemetry logs: concatenated pretty-printed JSON objects.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use crate::error::{GoblinError, Result};
use crate::models::LogRecord;


/// Streams top-level JSON objects out of a raw telemetry log.
///
/// The Gemini CLI appends pretty-printed objects back to back with no
/// separator, so a `}` on its own line may close either a record or a
/// nested object inside one. Lines accumulate in a buffer and a full
/// parse is attempted whenever a lone closing brace shows up; a failed
/// parse just means the brace was nested and accumulation continues.
///
/// Content left in the buffer at end of input (a truncated or corrupt
/// tail) is dropped with a warning, not raised as an error.
pub struct RawLogParser<R: BufRead> {
    reader: R,
    buffer: String,
    finished: bool,
}


impl RawLogParser<BufReader<File>> {
    /// Open a raw log file for streaming.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GoblinError::InputNotFound(path.to_path_buf()),
            _ => GoblinError::io(format!("open {}", path.display()), e),
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}


impl<R: BufRead> RawLogParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::new(),
            finished: false,
        }
    }
}


impl<R: BufRead> Iterator for RawLogParser<R> {
    type Item = Result<LogRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut line = String::new();
        loop {
            line.clear();
            let read = match self.reader.read_line(&mut line) {
                Ok(n) => n,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(GoblinError::io("read raw log", e)));
                }
            };
            if read == 0 {
                self.finished = true;
                if !self.buffer.trim().is_empty() {
                    eprintln!(
                        "Warning: raw log ended with incomplete JSON data; trailing bytes dropped"
                    );
                }
                return None;
            }

            self.buffer.push_str(&line);

            // A lone closing brace is the cheapest hint that a record may
            // be complete; correctness comes from the parse below.
            if line.trim() != "}" {
                continue;
            }

            match serde_json::from_str::<Value>(&self.buffer) {
                Ok(Value::Object(record)) => {
                    self.buffer.clear();
                    return Some(Ok(record));
                }
                Ok(_) => {
                    eprintln!("Warning: skipping non-object value in raw log");
                    self.buffer.clear();
                }
                Err(_) => {
                    // The brace closed a nested object; keep accumulating.
                }
            }
        }
    }
}
