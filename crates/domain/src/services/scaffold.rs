//! Runtime scaffold injection.
//!
//! Each runtime ships a scaffold directory (entry-point shims, a runtime
//! Dockerfile) that fills the gaps in an uploaded function. Injection copies
//! scaffold entries into the build context without overwriting anything the
//! upload already provides.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{info, warn};

use crate::models::Runtime;

/// Copies the scaffold for `runtime` into `target`.
///
/// Top-level entries that already exist in `target` are skipped, so user
/// code always wins over scaffold code. A missing scaffold directory is
/// logged and tolerated; the build then proceeds with the upload as-is.
///
/// Returns the number of top-level entries injected.
pub fn inject_scaffold(scaffold_root: &Path, runtime: Runtime, target: &Path) -> io::Result<usize> {
    let scaffold_dir = scaffold_root.join(runtime.id());

    if !scaffold_dir.is_dir() {
        warn!(
            runtime = %runtime,
            path = %scaffold_dir.display(),
            "Scaffold directory not found, skipping injection"
        );
        return Ok(0);
    }

    let mut injected = 0;
    for entry in fs::read_dir(&scaffold_dir)? {
        let entry = entry?;
        let destination = target.join(entry.file_name());

        // User-supplied files take precedence over scaffold files.
        if destination.exists() {
            continue;
        }

        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &destination)?;
        } else {
            fs::copy(entry.path(), &destination)?;
        }
        injected += 1;
    }

    info!(runtime = %runtime, injected, "Injected runtime scaffold");
    Ok(injected)
}

/// Recursively copies a directory tree.
fn copy_tree(source: &Path, destination: &Path) -> io::Result<()> {
    fs::create_dir_all(destination)?;
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let target = destination.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
