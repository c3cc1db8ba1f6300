//! CSV and JSON output files.

mod csv_file;
mod json_file;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub use csv_file::{generate_csv, save_csv};
pub use json_file::{generate_json, save_json};

/// Write `content` to `dir/file_name`.
///
/// Uses atomic write pattern: writes to temp file, syncs to disk, then renames.
/// This ensures partial writes don't corrupt existing files on crash.
fn write_atomic(dir: &Path, file_name: &str, content: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let output_file = dir.join(file_name);
    let temp_file = dir.join(format!(".{file_name}.tmp"));

    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content)?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if output_file.exists() {
        fs::remove_file(&output_file)?;
    }

    fs::rename(&temp_file, &output_file)?;

    Ok(output_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomic_creates_directory() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join("csv");
        let path = write_atomic(&dir, "llhb041.csv", b"content").unwrap();

        assert_eq!(path, dir.join("llhb041.csv"));
        assert_eq!(fs::read(&path).unwrap(), b"content");
        assert!(!dir.join(".llhb041.csv.tmp").exists());
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let temp_dir = tempdir().unwrap();
        write_atomic(temp_dir.path(), "out.json", b"old").unwrap();
        let path = write_atomic(temp_dir.path(), "out.json", b"new").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "new");
    }
}
