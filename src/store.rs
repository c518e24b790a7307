//! The one piece of persistent state: the best stage score.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};

const FILE_NAME: &str = "highscore.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct HighScoreFile {
    high_score: i32,
}

pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    /// Uses `path` when given, otherwise the platform data directory.
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None => ProjectDirs::from("", "", "hunts")
                .ok_or(Error::NoDataDir)?
                .data_dir()
                .join(FILE_NAME),
        };
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails: a missing or unreadable file counts as no high score.
    pub fn load(&self) -> i32 {
        match self.try_load() {
            Ok(score) => score,
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring high score file");
                0
            }
        }
    }

    fn try_load(&self) -> Result<i32> {
        let json = fs::read_to_string(&self.path)?;
        let file: HighScoreFile = serde_json::from_str(&json)?;
        Ok(file.high_score)
    }

    pub fn save(&self, high_score: i32) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&HighScoreFile { high_score })?;
        fs::write(&self.path, json)?;
        info!(path = %self.path.display(), high_score, "high score saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> HighScoreStore {
        HighScoreStore::new(Some(dir.path().join("nested").join(FILE_NAME))).unwrap()
    }

    #[test]
    fn test_missing_file_loads_zero() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).load(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(325).unwrap();
        assert_eq!(store.load(), 325);

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"high_score\": 325"));
    }

    #[test]
    fn test_corrupt_file_loads_zero() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "not json").unwrap();
        assert_eq!(store.load(), 0);
        assert!(matches!(store.try_load(), Err(Error::Json(_))));
    }
}
