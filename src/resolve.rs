use std::path::{Component, Path, PathBuf};

/// Outcome of resolving a request path against the served root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    File(PathBuf),
    Directory(PathBuf),
    Rejected(Rejection),
}

/// Why a request path was rejected. Both map to the same client response;
/// they are kept apart for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    OutsideRoot,
    Missing,
}

/// Resolve a request path to a filesystem target confined to `root`.
///
/// The path is walked component by component: `.` is skipped and `..` pops
/// the previously pushed component, so self-cancelling traversal is allowed
/// while anything that would climb above `root` is rejected before the
/// filesystem is touched. Existing paths are then canonicalized and the
/// canonical result re-checked against the canonical root, which catches
/// symlinks pointing out of the tree.
pub fn resolve(root: &Path, request_path: &str) -> ResolvedTarget {
    let normalized = normalize(request_path);
    if normalized.is_empty() {
        return ResolvedTarget::Directory(root.to_path_buf());
    }

    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(normalized).components() {
        match component {
            Component::Normal(name) => {
                if name.to_string_lossy().contains('\0') {
                    return ResolvedTarget::Rejected(Rejection::OutsideRoot);
                }
                resolved.push(name);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return ResolvedTarget::Rejected(Rejection::OutsideRoot);
                }
                resolved.pop();
                depth -= 1;
            }
            // a second leading slash or a drive prefix survives the strip
            Component::RootDir | Component::Prefix(_) => {
                return ResolvedTarget::Rejected(Rejection::OutsideRoot);
            }
        }
    }

    let metadata = match std::fs::metadata(&resolved) {
        Ok(metadata) => metadata,
        Err(_) => return ResolvedTarget::Rejected(Rejection::Missing),
    };

    let canonical_root = match root.canonicalize() {
        Ok(path) => path,
        Err(_) => return ResolvedTarget::Rejected(Rejection::Missing),
    };
    let canonical = match resolved.canonicalize() {
        Ok(path) => path,
        Err(_) => return ResolvedTarget::Rejected(Rejection::Missing),
    };

    // Path::starts_with compares whole components, so a sibling such as
    // /srv/www-evil never passes as being under /srv/www.
    if !canonical.starts_with(&canonical_root) {
        return ResolvedTarget::Rejected(Rejection::OutsideRoot);
    }

    if metadata.is_dir() {
        ResolvedTarget::Directory(canonical)
    } else {
        ResolvedTarget::File(canonical)
    }
}

/// Strip a single leading and a single trailing slash.
fn normalize(path: &str) -> &str {
    let path = path.strip_prefix('/').unwrap_or(path);
    path.strip_suffix('/').unwrap_or(path)
}
