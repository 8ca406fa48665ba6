//! Filesystem and naming helpers used by the tree walk.

use anyhow::{Context, Result};
use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};

/// Extension that marks a file as a template.
pub const MARKER: &str = "bp";

/// Output name for a template file, or `None` if `name` is a plain file.
///
/// Works on the raw name, so non-UTF-8 names are classified too. A file
/// called exactly `.bp` (or `..bp`) has no usable name left and stays plain.
pub fn strip_marker(name: &OsStr) -> Option<&OsStr> {
    let path = Path::new(name);
    if path.extension()? != MARKER {
        return None;
    }
    path.file_stem().filter(|stem| *stem != "." && *stem != "..")
}

/// `path` relative to `root`, failing if it lies outside.
pub fn rel_to(root: &Path, path: &Path) -> Result<PathBuf> {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .with_context(|| format!("{} is not under {}", path.display(), root.display()))
}

/// Create `dir` and any missing parents.
///
/// A directory that already exists is fine; anything else in the way is not.
/// Returns whether the directory was newly created.
pub fn ensure_dir(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir).with_context(|| format!("create directory {}", dir.display()))?;
    Ok(true)
}

/// Absolute, symlink-free form of `p`, or `p` unchanged if that fails.
pub fn canonical_or_self(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| p.to_path_buf())
}
