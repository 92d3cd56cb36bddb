//! URL to sandboxed filesystem path resolution.

use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// Resolve a request path to a regular file under `root`.
///
/// Returns `None` for anything that is not a plain file inside the
/// sandbox: traversal sequences, symlinks escaping the root, directories,
/// missing files, and any filesystem error along the way. A rejected
/// path is indistinguishable from a missing one.
pub fn resolve(url: &str, root: &Path) -> Option<PathBuf> {
    let clean = normalize_url(url)?;

    // Reject traversal sequences before touching the filesystem.
    if clean.contains("..") {
        return None;
    }

    let local = root.join(&clean);

    // Canonicalize both sides so symlinks and remaining dot segments
    // cannot escape the sandbox. The containment check runs on the
    // normalized path, never the raw input.
    let canonical = local.canonicalize().ok()?;
    let root_canonical = root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    canonical.is_file().then_some(canonical)
}

/// Percent-decode, strip the query string, and trim surrounding slashes.
/// An undecodable url resolves to `None` (treated as a miss).
fn normalize_url(url: &str) -> Option<String> {
    let decoded = percent_decode_str(url).decode_utf8().ok()?;
    let path = decoded.split('?').next().unwrap_or(&decoded);
    Some(path.trim_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sandbox() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.js"), "let a = 1;").unwrap();
        fs::create_dir(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/logo.png"), [0u8; 4]).unwrap();
        dir
    }

    #[test]
    fn resolves_files_inside_the_root() {
        let dir = sandbox();
        assert!(resolve("/app.js", dir.path()).is_some());
        assert!(resolve("/img/logo.png", dir.path()).is_some());
    }

    #[test]
    fn misses_on_absent_files_and_directories() {
        let dir = sandbox();
        assert!(resolve("/missing.js", dir.path()).is_none());
        assert!(resolve("/img", dir.path()).is_none());
    }

    #[test]
    fn rejects_literal_traversal() {
        let dir = sandbox();
        fs::write(dir.path().parent().unwrap().join("secret.txt"), "s").ok();
        assert!(resolve("/../secret.txt", dir.path()).is_none());
        assert!(resolve("/img/../../secret.txt", dir.path()).is_none());
    }

    #[test]
    fn rejects_encoded_traversal() {
        let dir = sandbox();
        assert!(resolve("/%2e%2e/secret.txt", dir.path()).is_none());
        assert!(resolve("/img/%2E%2E/%2E%2E/secret.txt", dir.path()).is_none());
    }

    #[test]
    fn strips_query_strings() {
        let dir = sandbox();
        assert!(resolve("/app.js?v=3", dir.path()).is_some());
    }
}
