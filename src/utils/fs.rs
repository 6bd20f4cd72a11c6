//! Safe file system operations.
//!
//! This module provides the small set of file operations the rendering
//! pipeline needs, designed to behave consistently across platforms:
//!
//! - **Atomic writes**: output files are written to a uniquely named
//!   temporary file in the destination directory and then renamed into
//!   place, so readers never observe a partially written file and an
//!   interrupted render never corrupts an existing output.
//! - **Line-terminator-agnostic reads**: template sources are read as
//!   UTF-8 with CRLF sequences folded to LF, so the engine operates on a
//!   single line-terminator convention regardless of where the template
//!   was authored.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Read a UTF-8 text file, folding Windows line terminators to `\n`.
///
/// Templates are line-oriented throughout the engine; normalizing the
/// terminator on read keeps every downstream scan simple.
pub fn read_text(path: &Path) -> io::Result<String> {
    let raw = fs::read_to_string(path)?;
    if raw.contains('\r') {
        Ok(raw.replace("\r\n", "\n"))
    } else {
        Ok(raw)
    }
}

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Atomically write bytes to a file using a write-then-rename strategy.
///
/// The content is first written to a [`NamedTempFile`] created in the
/// destination directory (same filesystem, so the final rename is atomic)
/// and synced to disk before the rename. Each call uses a unique temporary
/// path, so concurrent writers targeting distinct outputs never collide.
///
/// The destination either contains the complete new content or is left
/// untouched; partial output is never visible at `path`.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_text_folds_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crlf.txt");
        fs::write(&path, "a=1\r\nb=2\r\n").unwrap();

        assert_eq!(read_text(&path).unwrap(), "a=1\nb=2\n");
    }

    #[test]
    fn read_text_leaves_lf_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lf.txt");
        fs::write(&path, "a=1\nb=2\n").unwrap();

        assert_eq!(read_text(&path).unwrap(), "a=1\nb=2\n");
    }

    #[test]
    fn atomic_write_creates_file_with_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.conf");

        atomic_write(&path, b"rendered\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "rendered\n");
    }

    #[test]
    fn atomic_write_replaces_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.conf");
        fs::write(&path, "old").unwrap();

        atomic_write(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn atomic_write_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.conf");

        atomic_write(&path, b"x").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "x");
    }

    #[test]
    fn atomic_write_leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.conf");

        atomic_write(&path, b"content").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
