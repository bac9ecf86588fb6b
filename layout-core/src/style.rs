//! Named text style storage.
//!
//! The editor only talks to the [`StyleRepository`] trait; where styles live
//! (memory, a JSON file, a remote service) is up to the implementation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::{CanvasError, CanvasResult, TextStyle};

/// Storage for reusable text styles.
pub trait StyleRepository {
    /// Look up a style by name.
    fn get(&self, name: &str) -> Option<TextStyle>;

    /// Store a style, replacing any with the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the style cannot be persisted.
    fn save(&mut self, name: &str, style: TextStyle) -> CanvasResult<()>;

    /// All style names, sorted.
    fn names(&self) -> Vec<String>;
}

fn check_name(name: &str) -> CanvasResult<()> {
    if name.trim().is_empty() {
        return Err(CanvasError::Style("style name must not be empty".into()));
    }
    Ok(())
}

/// Non-persistent style storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStyleRepository {
    styles: BTreeMap<String, TextStyle>,
}

impl MemoryStyleRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StyleRepository for MemoryStyleRepository {
    fn get(&self, name: &str) -> Option<TextStyle> {
        self.styles.get(name).cloned()
    }

    fn save(&mut self, name: &str, style: TextStyle) -> CanvasResult<()> {
        check_name(name)?;
        self.styles.insert(name.to_string(), style);
        Ok(())
    }

    fn names(&self) -> Vec<String> {
        self.styles.keys().cloned().collect()
    }
}

/// Styles kept in a single JSON file, read on open and rewritten on save.
#[derive(Debug, Clone)]
pub struct JsonStyleRepository {
    path: PathBuf,
    styles: BTreeMap<String, TextStyle>,
}

impl JsonStyleRepository {
    /// Open a style file. A missing file yields an empty repository; the file
    /// is created on the first save.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> CanvasResult<Self> {
        let path = path.into();
        let styles = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            tracing::debug!("No style file at {}, starting empty", path.display());
            BTreeMap::new()
        };
        Ok(Self { path, styles })
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> CanvasResult<()> {
        let json = serde_json::to_string_pretty(&self.styles)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl StyleRepository for JsonStyleRepository {
    fn get(&self, name: &str) -> Option<TextStyle> {
        self.styles.get(name).cloned()
    }

    fn save(&mut self, name: &str, style: TextStyle) -> CanvasResult<()> {
        check_name(name)?;
        let previous = self.styles.insert(name.to_string(), style);
        if let Err(e) = self.persist() {
            tracing::warn!("Failed to persist style {name} to {}: {e}", self.path.display());
            // Leave memory in sync with disk.
            match previous {
                Some(old) => self.styles.insert(name.to_string(), old),
                None => self.styles.remove(name),
            };
            return Err(e);
        }
        Ok(())
    }

    fn names(&self) -> Vec<String> {
        self.styles.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn heading() -> TextStyle {
        TextStyle {
            font_size: 24.0,
            font_weight: 700,
            color: Color::rgb(0x20, 0x20, 0x80),
            ..TextStyle::default()
        }
    }

    #[test]
    fn test_memory_repository() {
        let mut repo = MemoryStyleRepository::new();
        repo.save("heading", heading()).expect("save");
        repo.save("body", TextStyle::default()).expect("save");
        assert_eq!(repo.get("heading"), Some(heading()));
        assert_eq!(repo.names(), vec!["body".to_string(), "heading".to_string()]);
        assert!(repo.get("missing").is_none());
        assert!(matches!(
            repo.save("  ", TextStyle::default()),
            Err(CanvasError::Style(_))
        ));
    }

    #[test]
    fn test_json_repository_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("styles").join("styles.json");

        let mut repo = JsonStyleRepository::open(&path).expect("open");
        assert!(repo.names().is_empty());
        repo.save("heading", heading()).expect("save");
        assert!(path.exists());

        let reopened = JsonStyleRepository::open(&path).expect("reopen");
        assert_eq!(reopened.get("heading"), Some(heading()));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_json_repository_rejects_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("styles.json");
        std::fs::write(&path, "not json").expect("write");
        assert!(matches!(
            JsonStyleRepository::open(&path),
            Err(CanvasError::Serialization(_))
        ));
    }
}
