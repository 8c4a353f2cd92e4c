//! Configuration and settings for Gemini Goblin.

mod settings;

#[allow(unused_imports)]
pub use settings::{
    default_raw_log_path,
    resolve_log_path,
    JSONL_FILE,
    PRICE_CACHE_MAX_AGE_SECS,
    RAW_LOG_FILE,
};
