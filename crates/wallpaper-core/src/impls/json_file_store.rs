//! JsonFileLedgerStore - the ledger as one pretty-printed JSON array on disk.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::{Ledger, PersistenceError};
use crate::ports::LedgerStore;

#[derive(Debug, Clone)]
pub struct JsonFileLedgerStore {
    path: PathBuf,
}

impl JsonFileLedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_err(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl LedgerStore for JsonFileLedgerStore {
    fn load(&self) -> Result<Ledger, PersistenceError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no ledger yet, starting empty");
                return Ok(Ledger::new());
            }
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&text).map_err(|e| PersistenceError::Corrupt {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write to a temp file next to the target, fsync, then rename over it.
    /// Readers see either the old ledger or the new one, never a partial file.
    fn save(&self, ledger: &Ledger) -> Result<(), PersistenceError> {
        let mut bytes = serde_json::to_vec_pretty(ledger)?;
        bytes.push(b'\n');

        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| self.write_err(e))?;

        let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(|e| self.write_err(e))?;

        // NamedTempFile is created 0600; the ledger is meant to be published
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))
                .map_err(|e| self.write_err(e))?;
        }

        temp.write_all(&bytes).map_err(|e| self.write_err(e))?;
        temp.as_file().sync_all().map_err(|e| self.write_err(e))?;
        temp.persist(&self.path).map_err(|e| self.write_err(e.error))?;

        debug!(path = %self.path.display(), records = ledger.len(), "ledger written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;
    use serde_json::json;
    use tempfile::TempDir;

    fn rec(v: serde_json::Value) -> Record {
        Record::try_from(v).unwrap()
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileLedgerStore::new(dir.path().join("wallpaper.json"));

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_keeps_records_and_field_order() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileLedgerStore::new(dir.path().join("nested/wallpaper.json"));
        let ledger = Ledger::from_records(vec![rec(json!({
            "title": "海",
            "id": "abc",
            "date": "20240108",
        }))]);

        store.save(&ledger).unwrap();
        let back = store.load().unwrap();

        assert_eq!(back, ledger);
        let keys: Vec<_> = back.records()[0].fields().keys().cloned().collect();
        assert_eq!(keys, vec!["title", "id", "date"]);
    }

    #[test]
    fn file_is_pretty_utf8_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallpaper.json");
        let store = JsonFileLedgerStore::new(&path);

        store
            .save(&Ledger::from_records(vec![rec(json!({"id": "a", "title": "海", "date": "20240108"}))]))
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n  {\n    \"id\": \"a\""));
        assert!(text.contains("\"海\""));
        assert!(text.ends_with("]\n"));
    }

    #[test]
    fn resave_of_loaded_ledger_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallpaper.json");
        let store = JsonFileLedgerStore::new(&path);
        store
            .save(&Ledger::from_records(vec![
                rec(json!({"id": "a", "date": "20240108", "n": 1.5})),
                rec(json!({"id": "b", "date": "20240109", "tags": ["x", "y"]})),
            ]))
            .unwrap();
        let first = fs::read(&path).unwrap();

        store.save(&store.load().unwrap()).unwrap();

        assert_eq!(fs::read(&path).unwrap(), first);
    }

    #[test]
    fn non_array_file_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallpaper.json");
        fs::write(&path, r#"{"id": "a"}"#).unwrap();

        let err = JsonFileLedgerStore::new(&path).load().unwrap_err();

        assert!(matches!(err, PersistenceError::Corrupt { .. }));
    }

    #[test]
    fn array_of_non_objects_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wallpaper.json");
        fs::write(&path, "[1, 2]").unwrap();

        let err = JsonFileLedgerStore::new(&path).load().unwrap_err();

        assert!(matches!(err, PersistenceError::Corrupt { .. }));
    }

    #[test]
    fn save_leaves_no_temp_files_behind() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileLedgerStore::new(dir.path().join("wallpaper.json"));

        store.save(&Ledger::new()).unwrap();
        store.save(&Ledger::new()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["wallpaper.json"]);
    }
}
