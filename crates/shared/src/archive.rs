//! Zip archive packing and extraction.
//!
//! Uploaded function source arrives as a zip archive and recovered source
//! leaves as one, so both directions live here. Extraction refuses entries
//! that would escape the target directory.

use std::fs::{self, File};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Errors that can occur while packing or extracting archives.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("archive entry escapes extraction directory: {0}")]
    PathTraversal(String),
}

/// Extracts a zip archive into `dest`, creating it if necessary.
///
/// Entries whose names resolve outside `dest` (absolute paths, `..`
/// components) are rejected with [`ArchiveError::PathTraversal`].
pub fn extract_zip(bytes: &[u8], dest: &Path) -> Result<(), ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    fs::create_dir_all(dest)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| ArchiveError::PathTraversal(entry.name().to_string()))?;
        let path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&path)?;
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&path)?;
        io::copy(&mut entry, &mut out)?;
    }

    Ok(())
}

/// Packs the contents of `root` into an in-memory zip archive (deflate).
///
/// Entry names are relative to `root` with `/` separators. Empty
/// directories are not recorded.
pub fn pack_dir(root: &Path) -> Result<Vec<u8>, ArchiveError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = Vec::new();
    collect_files(root, root, &mut files)?;
    files.sort();

    for relative in files {
        let name = zip_entry_name(&relative);
        zip.start_file(name, options)?;

        let mut file = File::open(root.join(&relative))?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        zip.write_all(&contents)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Recursively collects file paths under `dir`, relative to `root`.
fn collect_files(root: &Path, dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(root, &path, files)?;
        } else {
            let relative = path
                .strip_prefix(root)
                .expect("walked path is always under root")
                .to_path_buf();
            files.push(relative);
        }
    }
    Ok(())
}

/// Converts a relative path into a zip entry name with `/` separators.
fn zip_entry_name(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
