use std::fs;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::persistence::domain::record_store::{RecordStore, StoreError};

/// Record store backed by a single JSON array file.
///
/// Replacing writes the full array to a sibling `.part` file, syncs it and
/// renames it over the target, so readers only ever see a complete array.
pub struct JsonFileStore<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: Serialize + DeserializeOwned> RecordStore<T> for JsonFileStore<T> {
    fn load(&self) -> Result<Vec<T>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&self.path).map_err(|e| StoreError::Read {
            path: self.path.clone(),
            source: e,
        })?;
        if json.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&json).map_err(|e| StoreError::Parse {
            path: self.path.clone(),
            source: e,
        })
    }

    fn replace(&self, records: &[T]) -> Result<(), StoreError> {
        write_json_atomic(&self.path, records)
    }
}

/// Serializes `value` and atomically installs it at `dest`.
pub fn write_json_atomic<V: Serialize + ?Sized>(
    dest: &Path,
    value: &V,
) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(value).map_err(StoreError::Serialize)?;

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::Write {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = dest.with_extension("part");
    let result = write_synced(&temp_path, &bytes).and_then(|()| {
        fs::rename(&temp_path, dest).map_err(|e| StoreError::Write {
            path: dest.to_path_buf(),
            source: e,
        })
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let to_error = |e| StoreError::Write {
        path: path.to_path_buf(),
        source: e,
    };
    let mut file = fs::File::create(path).map_err(to_error)?;
    file.write_all(bytes).map_err(to_error)?;
    file.sync_all().map_err(to_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::transcript::Transcript;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let store: JsonFileStore<Transcript> = JsonFileStore::new(tmp.path().join("none.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_empty_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.json");
        fs::write(&path, "  \n").unwrap();
        let store: JsonFileStore<Transcript> = JsonFileStore::new(path);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_replace_then_load() {
        let tmp = TempDir::new().unwrap();
        let store: JsonFileStore<Transcript> =
            JsonFileStore::new(tmp.path().join("nested/checkpoint.json"));
        let records = vec![
            Transcript::new("a/1.mp4", "Le chat"),
            Transcript::new("a/2.mp4", "Le chien"),
        ];
        store.replace(&records).unwrap();
        assert_eq!(store.load().unwrap(), records);
    }

    #[test]
    fn test_replace_leaves_no_part_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("checkpoint.json");
        let store: JsonFileStore<Transcript> = JsonFileStore::new(&path);
        store.replace(&[Transcript::new("a.mp4", "")]).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("part").exists());
    }

    #[test]
    fn test_non_ascii_written_verbatim() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("checkpoint.json");
        let store: JsonFileStore<Transcript> = JsonFileStore::new(&path);
        store.replace(&[Transcript::new("a.mp4", "l'été")]).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("l'été"));
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("checkpoint.json");
        fs::write(&path, "[{\"file\": ").unwrap();
        let store: JsonFileStore<Transcript> = JsonFileStore::new(path);
        assert!(matches!(store.load(), Err(StoreError::Parse { .. })));
    }

    #[test]
    fn test_failed_write_keeps_previous_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("checkpoint.json");
        let store: JsonFileStore<Transcript> = JsonFileStore::new(&path);
        store.replace(&[Transcript::new("a.mp4", "avant")]).unwrap();

        // A directory squatting on the temp path makes the write fail
        fs::create_dir(path.with_extension("part")).unwrap();
        assert!(store.replace(&[Transcript::new("b.mp4", "après")]).is_err());

        let records = store.load().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "avant");
    }

    #[test]
    fn test_write_json_atomic_bare_filename_parent() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("counts.json");
        write_json_atomic(&dest, &serde_json::json!({"chat": 2})).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&dest).unwrap()).unwrap();
        assert_eq!(value["chat"], 2);
    }
}
