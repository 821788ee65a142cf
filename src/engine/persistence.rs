use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::{Result, Error};
use log::debug;

/// The persisted mapping from counter name to the next integer to issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counters(BTreeMap<String, u64>);

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored value for `name`, or 0 when the counter is absent.
    pub fn get(&self, name: &str) -> u64 {
        self.0.get(name).copied().unwrap_or(0)
    }

    pub fn set(&mut self, name: &str, next: u64) {
        self.0.insert(name.to_string(), next);
    }

    /// Hands out the current value of `name` and advances it by one.
    ///
    /// An absent or zero counter starts at 1. A counter already at
    /// `u64::MAX` is exhausted and left untouched.
    pub fn advance(&mut self, name: &str) -> Result<u64> {
        let current = match self.get(name) {
            0 => 1,
            n => n,
        };
        let next = current
            .checked_add(1)
            .ok_or_else(|| Error::CounterExhausted(name.to_string()))?;
        self.set(name, next);
        Ok(current)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Handles disk I/O for the identifier counters.
///
/// The whole mapping lives in one JSON file that is overwritten wholesale on
/// every save, using a "write-then-rename" strategy so a crash mid-write never
/// leaves a truncated file behind.
#[derive(Debug, Clone)]
pub struct CounterFile {
    path: PathBuf,
}

impl CounterFile {
    /// Creates a handler for the counter file at `path`.
    ///
    /// The parent directory is created if it does not exist. The file itself
    /// is only created on first use. An empty path is rejected.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(Error::Internal("counter file path is empty".to_string()));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes an empty mapping if the file does not exist yet.
    pub fn init(&self) -> Result<()> {
        if !self.path.exists() {
            debug!("Initializing counter file {:?}", self.path);
            self.save(&Counters::new())?;
        }
        Ok(())
    }

    /// Reads the full mapping, initializing the file first when missing.
    ///
    /// An empty or unparsable file is an error; callers decide whether to
    /// fall back to an empty mapping.
    pub fn load(&self) -> Result<Counters> {
        self.init()?;
        let content = fs::read(&self.path)?;
        if content.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::Internal(format!(
                "counter file {:?} is empty or incomplete",
                self.path
            )));
        }
        Ok(serde_json::from_slice(&content)?)
    }

    /// Writes the full mapping atomically.
    pub fn save(&self, counters: &Counters) -> Result<()> {
        let temp_path = self.temp_path();
        let bytes = serde_json::to_vec_pretty(counters)?;

        fs::write(&temp_path, bytes)?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        Ok(())
    }

    /// Deletes the counter file. A missing file is not an error.
    pub fn remove(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_advance_starts_at_one() {
        let mut counters = Counters::new();
        assert_eq!(counters.advance("student").unwrap(), 1);
        assert_eq!(counters.advance("student").unwrap(), 2);
        assert_eq!(counters.get("student"), 3);

        counters.set("course", 0);
        assert_eq!(counters.advance("course").unwrap(), 1);
    }

    #[test]
    fn test_advance_refuses_to_wrap() {
        let mut counters = Counters::new();
        counters.set("student", u64::MAX);
        assert!(matches!(counters.advance("student"), Err(Error::CounterExhausted(name)) if name == "student"));
        assert_eq!(counters.get("student"), u64::MAX);

        counters.set("course", u64::MAX - 1);
        assert_eq!(counters.advance("course").unwrap(), u64::MAX - 1);
        assert!(counters.advance("course").is_err());
    }

    #[test]
    fn test_empty_path_is_rejected() {
        assert!(matches!(CounterFile::new(""), Err(Error::Internal(_))));
        assert!(matches!(CounterFile::new("   "), Err(Error::Internal(_))));
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counters.json");
        // A non-empty directory where the file should be makes the rename fail.
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let file = CounterFile::new(&path).unwrap();
        assert!(file.save(&Counters::new()).is_err());
        assert!(!dir.path().join("counters.json.tmp").exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let file = CounterFile::new(dir.path().join("counters.json")).unwrap();

        let mut counters = Counters::new();
        counters.set("student", 42);
        counters.set("course", 7);
        file.save(&counters).unwrap();

        let loaded = file.load().unwrap();
        assert_eq!(loaded, counters);
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_atomic_rename() {
        let dir = tempdir().unwrap();
        let file = CounterFile::new(dir.path().join("counters.json")).unwrap();
        file.save(&Counters::new()).unwrap();

        assert!(dir.path().join("counters.json").exists());
        assert!(!dir.path().join("counters.json.tmp").exists());
    }

    #[test]
    fn test_missing_file_is_initialized_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("counters.json");
        let file = CounterFile::new(&path).unwrap();

        assert!(!path.exists());
        let loaded = file.load().unwrap();
        assert!(loaded.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_empty_and_corrupt_files_are_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counters.json");
        let file = CounterFile::new(&path).unwrap();

        fs::write(&path, "").unwrap();
        assert!(matches!(file.load(), Err(Error::Internal(_))));

        fs::write(&path, "{\"student\": ").unwrap();
        assert!(matches!(file.load(), Err(Error::Serialization(_))));
    }

    #[test]
    fn test_plain_json_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counters.json");
        fs::write(&path, r#"{ "student": 42, "course": 7 }"#).unwrap();

        let loaded = CounterFile::new(&path).unwrap().load().unwrap();
        assert_eq!(loaded.get("student"), 42);
        assert_eq!(loaded.get("course"), 7);
        assert_eq!(loaded.get("person"), 0);
    }

    #[test]
    fn test_remove() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("counters.json");
        let file = CounterFile::new(&path).unwrap();
        file.init().unwrap();

        file.remove().unwrap();
        assert!(!path.exists());
        file.remove().unwrap();
    }
}
