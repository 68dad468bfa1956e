use std::path::PathBuf;

/// Directory used when no root path is configured.
pub const DEFAULT_PATH: &str = "database";

/// Configuration for opening a [`Store`](crate::Store).
#[derive(Debug, Clone)]
pub struct Options {
    /// Root directory holding one `<key>.json` file per entry.
    pub path: PathBuf,

    /// Fsync every entry file before it replaces the previous one, and the
    /// root directory after the replace (on Unix).
    pub sync_writes: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PATH),
            sync_writes: false,
        }
    }
}

impl Options {
    /// Returns default options rooted at `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn default_root_is_database() {
        let options = Options::default();
        assert_eq!(options.path, Path::new(DEFAULT_PATH));
        assert_eq!(DEFAULT_PATH, "database");
        assert!(!options.sync_writes);
    }

    #[test]
    fn with_path_keeps_other_defaults() {
        let options = Options::with_path("elsewhere");
        assert_eq!(options.path, Path::new("elsewhere"));
        assert!(!options.sync_writes);
    }
}
