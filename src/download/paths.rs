//! Output path sanitization
//!
//! Turns a caller-supplied directory + filename into a traversal-free absolute
//! path. Filenames may not navigate at all; the joined result is re-checked
//! against the resolved directory prefix in case join behavior ever surprises.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Path validation errors
#[derive(Debug, Error)]
pub enum PathError {
    #[error("Path traversal attempt: {0}")]
    Traversal(String),

    #[error("Invalid output directory {dir}: {reason}")]
    InvalidDir { dir: String, reason: String },
}

/// Characters replaced with `_` in filenames
const UNSAFE_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Sanitize a bare filename
///
/// Rejects any attempt to navigate (`..`, `/`, `\`), then replaces characters
/// that are unsafe on common filesystems.
pub fn sanitize_filename(name: &str) -> Result<String, PathError> {
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(PathError::Traversal(name.to_string()));
    }
    Ok(name
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect())
}

/// Expand a leading `~` to the caller's home directory
fn expand_tilde(dir: &str) -> PathBuf {
    if let Some(stripped) = dir.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    } else if dir == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(dir)
}

/// Resolve `dir` to an absolute path, without requiring it to exist
///
/// Canonicalizes when possible (resolving symlinks), otherwise normalizes
/// `.`/`..` components against the current directory.
pub(crate) fn absolutize(dir: &str) -> Result<PathBuf, PathError> {
    let expanded = expand_tilde(dir);
    if let Ok(canonical) = expanded.canonicalize() {
        return Ok(canonical);
    }

    let base = if expanded.is_absolute() {
        PathBuf::new()
    } else {
        std::env::current_dir().map_err(|e| PathError::InvalidDir {
            dir: dir.to_string(),
            reason: e.to_string(),
        })?
    };

    let mut resolved = base;
    for component in expanded.components() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir => {}
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

/// Resolve a sanitized output path for `filename` under `dir`
///
/// The returned path is absolute and guaranteed to sit inside the resolved
/// directory.
pub fn resolve_output(dir: &str, filename: &str) -> Result<PathBuf, PathError> {
    let safe_name = sanitize_filename(filename)?;
    let base = absolutize(dir)?;
    let joined = base.join(&safe_name);

    // Containment re-check after the join
    if !joined.starts_with(&base) {
        return Err(PathError::Traversal(joined.display().to_string()));
    }
    Ok(joined)
}

/// Strip the final extension from a base filename, if any
///
/// `photo.png` → `photo`, `archive.tar.gz` → `archive.tar`, `noext` → `noext`.
pub fn strip_extension(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}
