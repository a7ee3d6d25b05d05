//! Path normalization

use std::path::Path;

/// Forward-slash form of a path string, regardless of host platform.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// `path` relative to `root`, normalized; `None` when `path` is outside `root`.
pub fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(normalize_path(&rel.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_to_strips_root() {
        let root = Path::new("/work/repo");
        assert_eq!(
            relative_to(root, Path::new("/work/repo/src/app.py")).as_deref(),
            Some("src/app.py")
        );
        assert_eq!(relative_to(root, Path::new("/elsewhere/x.py")), None);
    }
}
