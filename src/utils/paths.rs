//! Path resolution

use std::path::{Path, PathBuf};

/// Resolve `path` against the current working directory without touching the
/// filesystem (the file may not exist yet).
pub fn absolute_path(path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        return candidate.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(candidate),
        // No usable cwd: leave it relative and let the open call report it
        Err(_) => candidate.to_path_buf(),
    }
}

pub fn display_path(path: &Path) -> String {
    // Convert backslashes to forward slashes so log lines look the same everywhere
    path.display().to_string().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_path_keeps_absolute_input() {
        let tmp = tempfile::TempDir::new().expect("tmp");
        let input = tmp.path().join("a.env");
        let resolved = absolute_path(input.to_str().expect("utf8"));
        assert_eq!(resolved, input);
    }

    #[test]
    fn absolute_path_joins_relative_input_with_cwd() {
        let resolved = absolute_path("config/.env");
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("config/.env"));
    }

    #[test]
    fn display_path_uses_forward_slashes() {
        assert_eq!(display_path(Path::new(r"config\dev.env")), "config/dev.env");
    }
}
