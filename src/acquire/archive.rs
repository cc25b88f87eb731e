//! ZIP archive handling.
//!
//! Font foundries usually ship families as a ZIP of weights and styles,
//! often under nested directories. The archive is spooled to a temporary
//! file, unpacked into a temporary directory, and scanned recursively for
//! installable font files. Both temporaries are dropped whether or not
//! anything useful was found.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::{NamedTempFile, TempDir};
use tracing::debug;
use walkdir::WalkDir;
use zip::ZipArchive;

/// ZIP local-file-header magic.
const ZIP_MAGIC: &[u8] = b"PK";

/// Whether a response payload should be treated as a ZIP archive, by
/// leading bytes or by the declared content type.
pub fn looks_like_zip(bytes: &[u8], content_type: Option<&str>) -> bool {
    bytes.starts_with(ZIP_MAGIC)
        || content_type
            .map(|value| value.to_lowercase().contains("zip"))
            .unwrap_or(false)
}

/// Unpack `bytes` and return the paths of every `.ttf`/`.otf` entry,
/// rooted in the returned scratch directory. The caller must consume the
/// paths before dropping the `TempDir`.
pub fn unpack_fonts(bytes: &[u8], scratch_root: &Path) -> Result<(TempDir, Vec<std::path::PathBuf>)> {
    let mut spool = NamedTempFile::new_in(scratch_root).context("failed to create temp archive file")?;
    spool
        .write_all(bytes)
        .context("failed to spool archive to disk")?;

    let extract_dir = TempDir::new_in(scratch_root).context("failed to create temp extraction dir")?;
    extract_archive(spool.path(), extract_dir.path())?;

    let mut fonts = Vec::new();
    for entry in WalkDir::new(extract_dir.path())
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
    {
        if has_font_extension(entry.path()) {
            debug!(path = %entry.path().display(), "found font file in archive");
            fonts.push(entry.path().to_owned());
        }
    }
    debug!(count = fonts.len(), "archive scan complete");

    Ok((extract_dir, fonts))
}

fn has_font_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            ext == "ttf" || ext == "otf"
        })
        .unwrap_or(false)
}

fn extract_archive(archive_path: &Path, destination: &Path) -> Result<()> {
    let file = File::open(archive_path).context("failed to reopen temp archive")?;
    let mut archive = ZipArchive::new(file).context("failed to read ZIP archive")?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        // Entries with traversal components have no enclosed name; skip them.
        let out_path = match entry.enclosed_name() {
            Some(relative) => destination.join(relative),
            None => continue,
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
        } else {
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out_file = File::create(&out_path)?;
            io::copy(&mut entry, &mut out_file)?;
        }
    }
    Ok(())
}
