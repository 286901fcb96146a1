//! Destination path resolution for untrusted entry names.

use std::path::{Component, Path, PathBuf};

use super::error::{ExtractError, Result};

/// Lexically clean a path: drop `.` components and fold `..` into its parent.
///
/// A `..` at the root stays at the root. Nothing touches the filesystem.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                cleaned.pop();
            }
            Component::CurDir => {}
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Resolve `entry_name` under `root`, rejecting anything that does not land
/// strictly inside it.
///
/// `root` must already be absolute and cleaned. The check compares whole
/// components, so a sibling like `root2` never passes for `root`.
pub fn resolve_entry_path(root: &Path, entry_name: &str) -> Result<PathBuf> {
    let traversal = || ExtractError::PathTraversal {
        entry: entry_name.to_string(),
    };

    if entry_name.contains('\0') {
        return Err(traversal());
    }

    // Archives written on Windows may use backslashes as separators
    let normalized = entry_name.replace('\\', "/");
    let candidate = clean_path(&root.join(normalized));

    if candidate == root || !candidate.starts_with(root) {
        return Err(traversal());
    }
    Ok(candidate)
}

/// Whether extraction would accept `entry_name` in any destination.
///
/// The check is purely lexical, so it runs against a placeholder root.
pub fn is_safe_entry_name(entry_name: &str) -> bool {
    let root = if cfg!(windows) {
        Path::new("C:\\package")
    } else {
        Path::new("/package")
    };
    resolve_entry_path(root, entry_name).is_ok()
}
