//! Data access layer for Gemini CLI telemetry logs.

mod jsonl_parser;
mod raw_log;
mod tail;

#[allow(unused_imports)]
pub use jsonl_parser::{write_record, JsonlStream, StreamError};

#[allow(unused_imports)]
pub use raw_log::RawLogParser;

#[allow(unused_imports)]
pub use tail::read_last_timestamp;
