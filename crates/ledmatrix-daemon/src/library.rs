//! The directory of animations the remote steps through.

use anyhow::{Context, Result};
use ledmatrix_core::container::ANIMATION_EXTENSION;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sorted list of `.ani` files with a wrapping cursor.
#[derive(Debug, Clone, Default)]
pub struct Library {
    entries: Vec<PathBuf>,
    cursor: usize,
}

impl Library {
    /// Lists `directory`. A missing directory is an error; an empty one is not.
    pub fn scan(directory: &Path) -> Result<Self> {
        let mut entries = Vec::new();
        let listing = std::fs::read_dir(directory).with_context(|| {
            format!("Failed to read animation library {}", directory.display())
        })?;
        for entry in listing {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(ANIMATION_EXTENSION) {
                entries.push(path);
            }
        }
        entries.sort();
        debug!(
            "Found {} animations in {}",
            entries.len(),
            directory.display()
        );
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<PathBuf>) -> Self {
        Self { entries, cursor: 0 }
    }

    /// The entry under the cursor.
    pub fn current(&self) -> Option<&Path> {
        self.entries.get(self.cursor).map(PathBuf::as_path)
    }

    /// Advances the cursor, wrapping to the first entry.
    pub fn next(&mut self) -> Option<&Path> {
        if !self.entries.is_empty() {
            self.cursor = (self.cursor + 1) % self.entries.len();
        }
        self.current()
    }

    /// Moves the cursor back, wrapping to the last entry.
    pub fn previous(&mut self) -> Option<&Path> {
        if !self.entries.is_empty() {
            self.cursor = (self.cursor + self.entries.len() - 1) % self.entries.len();
        }
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_both_ways() {
        let mut library =
            Library::from_entries(vec!["a.ani".into(), "b.ani".into(), "c.ani".into()]);
        assert_eq!(library.current(), Some(Path::new("a.ani")));
        assert_eq!(library.previous(), Some(Path::new("c.ani")));
        assert_eq!(library.next(), Some(Path::new("a.ani")));
        assert_eq!(library.next(), Some(Path::new("b.ani")));
        assert_eq!(library.next(), Some(Path::new("c.ani")));
        assert_eq!(library.next(), Some(Path::new("a.ani")));
    }

    #[test]
    fn test_empty_library() {
        let mut library = Library::default();
        assert_eq!(library.current(), None);
        assert_eq!(library.next(), None);
        assert_eq!(library.previous(), None);
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = std::env::temp_dir().join(format!("ledmatrixd-library-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["zeta.ani", "alpha.ani", "notes.txt"] {
            std::fs::write(dir.join(name), "").unwrap();
        }
        let library = Library::scan(&dir).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(library.entries.len(), 2);
        assert_eq!(library.current(), Some(dir.join("alpha.ani").as_path()));
    }

    #[test]
    fn test_scan_missing_directory() {
        assert!(Library::scan(Path::new("/nonexistent/ledmatrix-library")).is_err());
    }
}
