//! Simplify command - rewrite an existing JSONL file at a higher level.

use std::path::PathBuf;

use anyhow::Result;

use crate::simplify::{run_file_simplification, SimplifyLevel};


/// Run the simplify command.
pub fn run(
    input: PathBuf,
    level: u8,
    archive_folder: Option<PathBuf>,
    disable_archiving: bool,
) -> Result<()> {
    let level = SimplifyLevel::try_from(level)?;
    let folder = archive_folder.unwrap_or_else(std::env::temp_dir);

    let written = run_file_simplification(&input, level, &folder, disable_archiving)?;
    println!(
        "{} simplified at level {} ({} records kept)",
        input.display(),
        level,
        written
    );

    Ok(())
}
