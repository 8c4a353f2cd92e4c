//! Convert command - raw telemetry log to canonical JSONL.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::archive::archive_file;
use crate::config::{default_raw_log_path, JSONL_FILE};
use crate::convert::convert_log_file;
use crate::data::read_last_timestamp;
use crate::simplify::SimplifyLevel;


/// Run the convert command.
pub fn run(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    level: u8,
    archive: bool,
    archive_folder: Option<PathBuf>,
) -> Result<()> {
    let level = SimplifyLevel::try_from(level)?;
    let input = input.unwrap_or_else(default_raw_log_path);
    let output = output.unwrap_or_else(|| input.with_file_name(JSONL_FILE));

    let last_timestamp = if output.is_file() {
        read_last_timestamp(&output)
            .with_context(|| format!("failed to scan the tail of {}", output.display()))?
    } else {
        None
    };
    if let Some(ts) = &last_timestamp {
        println!("Resuming after {ts}");
    }

    let outcome = convert_log_file(&input, &output, last_timestamp.as_deref(), level)?;
    println!(
        "Converted {} records to {} ({} skipped)",
        outcome.written,
        output.display(),
        outcome.skipped
    );

    if archive {
        let folder = archive_folder.unwrap_or_else(std::env::temp_dir);
        let target = archive_file(&input, &folder)?;
        println!("Archived {} to {}", input.display(), target.display());
    }

    Ok(())
}
