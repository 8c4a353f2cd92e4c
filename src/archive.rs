//! Archiving of consumed log files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{GoblinError, Result};


/// Compute the archive destination for `input`: the original stem, a
/// fresh epoch-seconds timestamp, and the original suffix, inside
/// `folder`. The timestamp keeps repeated archives of the same file from
/// colliding and records when each one was retired.
pub fn archive_target(input: &Path, folder: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("telemetry");
    let suffix = input
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    folder.join(format!("{stem}.{}{suffix}", Utc::now().timestamp()))
}


/// Move `input` into `folder` under its archive name.
///
/// Refuses to overwrite an existing archive file. Returns the archive
/// path on success.
pub fn archive_file(input: &Path, folder: &Path) -> Result<PathBuf> {
    let target = archive_target(input, folder);
    if target.exists() {
        return Err(GoblinError::StaleArtifact(target));
    }
    move_file(input, &target)?;
    Ok(target)
}


/// Rename, falling back to copy + delete when the archive folder sits on
/// another filesystem.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(|e| {
        GoblinError::io(format!("copy {} to {}", from.display(), to.display()), e)
    })?;
    fs::remove_file(from)
        .map_err(|e| GoblinError::io(format!("remove {}", from.display()), e))
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_archive_target_name() {
        let target = archive_target(Path::new("/logs/telemetry.log"), Path::new("/tmp/archive"));

        let name = target.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("telemetry."));
        assert!(name.ends_with(".log"));
        // The middle piece is a plain integer timestamp.
        let middle = &name["telemetry.".len()..name.len() - ".log".len()];
        assert!(middle.parse::<i64>().is_ok(), "unexpected name {name}");
    }

    #[test]
    fn test_archive_file_moves_input() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("telemetry.log");
        fs::write(&input, "data").unwrap();
        let folder = dir.path().join("archive");
        fs::create_dir(&folder).unwrap();

        let target = archive_file(&input, &folder).unwrap();

        assert!(!input.exists());
        assert_eq!(fs::read_to_string(target).unwrap(), "data");
    }
}
