//! Streaming parser for canonical JSONL telemetry files.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Write};
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::error::{GoblinError, Result};
use crate::models::LogRecord;


/// Why a JSONL stream item could not be produced.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The underlying reader failed; the stream cannot continue.
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// A line that is not a single JSON object.
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
}


/// Lazily yields one record per line from a JSONL source.
///
/// Empty lines are skipped. Malformed lines come back as `Err` items;
/// the caller chooses the policy: conversion paths warn and move on,
/// aggregation stops at the first one.
pub struct JsonlStream<R: BufRead> {
    lines: Lines<R>,
    line_num: usize,
}


impl JsonlStream<BufReader<File>> {
    /// Open a JSONL file for streaming.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GoblinError::InputNotFound(path.to_path_buf()),
            _ => GoblinError::io(format!("open {}", path.display()), e),
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}


impl<R: BufRead> JsonlStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
        }
    }
}


impl<R: BufRead> Iterator for JsonlStream<R> {
    type Item = std::result::Result<LogRecord, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.line_num += 1;
                    return Some(Err(StreamError::Io(e)));
                }
            };
            self.line_num += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Object(record)) => Some(Ok(record)),
                Ok(_) => Some(Err(StreamError::Malformed {
                    line: self.line_num,
                    message: "not a JSON object".to_string(),
                })),
                Err(e) => Some(Err(StreamError::Malformed {
                    line: self.line_num,
                    message: e.to_string(),
                })),
            };
        }
    }
}


/// Append one record to `out` as a compact JSON line.
pub fn write_record<W: Write>(out: &mut W, record: &LogRecord) -> std::io::Result<()> {
    serde_json::to_writer(&mut *out, record)?;
    out.write_all(b"\n")
}
