// hackhub-service/src/utils/fs_backend.rs
//
// One JSON file per row: {root}/{table}/{id}.json
use crate::utils::store::{StoreError, TableBackend};
use log::{error, info, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        if !root.exists() {
            info!("Creating storage directory: {}", root.display());
            fs::create_dir_all(&root)?;
        }
        Ok(Self { root })
    }

    fn table_dir(&self, table: &str) -> PathBuf {
        self.root.join(table)
    }

    fn row_path(&self, table: &str, id: &str) -> PathBuf {
        self.table_dir(table).join(format!("{}.json", id))
    }
}

fn io_error(context: &str, path: &Path, e: std::io::Error) -> StoreError {
    error!("Failed to {} {}: {:?}", context, path.display(), e);
    StoreError::Backend(format!("failed to {} {}: {}", context, path.display(), e))
}

impl TableBackend for FsBackend {
    fn read_row(&self, table: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let path = self.row_path(table, id);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| io_error("read", &path, e))?;
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn write_row(&self, table: &str, id: &str, row: &Value) -> Result<(), StoreError> {
        let dir = self.table_dir(table);
        fs::create_dir_all(&dir).map_err(|e| io_error("create", &dir, e))?;

        let path = self.row_path(table, id);
        let tmp_path = dir.join(format!("{}.json.tmp", id));
        let json = serde_json::to_string_pretty(row)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        // Rename keeps the row write all-or-nothing
        fs::write(&tmp_path, json).map_err(|e| io_error("write", &tmp_path, e))?;
        fs::rename(&tmp_path, &path).map_err(|e| io_error("replace", &path, e))?;
        Ok(())
    }

    fn delete_row(&self, table: &str, id: &str) -> Result<bool, StoreError> {
        let path = self.row_path(table, id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| io_error("delete", &path, e))?;
        Ok(true)
    }

    fn scan(&self, table: &str) -> Result<Vec<Value>, StoreError> {
        let dir = self.table_dir(table);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut rows = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| io_error("read", &dir, e))? {
            let entry = entry.map_err(|e| io_error("read", &dir, e))?;
            let path = entry.path();
            if !(path.is_file() && path.extension().map_or(false, |ext| ext == "json")) {
                continue;
            }

            let content = fs::read_to_string(&path).map_err(|e| io_error("read", &path, e))?;
            match serde_json::from_str(&content) {
                Ok(row) => rows.push(row),
                Err(e) => warn!("Failed to parse {}: {:?}", path.display(), e),
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rows_survive_a_new_backend_on_the_same_root() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        backend.write_row("teams", "t1", &json!({"id": "t1", "name": "Rustaceans"})).unwrap();

        let reopened = FsBackend::new(dir.path()).unwrap();
        let row = reopened.read_row("teams", "t1").unwrap().unwrap();
        assert_eq!(row["name"], "Rustaceans");
        assert_eq!(reopened.scan("teams").unwrap().len(), 1);
    }

    #[test]
    fn scan_skips_temp_and_unparseable_files() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        backend.write_row("teams", "t1", &json!({"id": "t1"})).unwrap();
        fs::write(dir.path().join("teams").join("broken.json"), "{not json").unwrap();
        fs::write(dir.path().join("teams").join("t2.json.tmp"), "{}").unwrap();

        assert_eq!(backend.scan("teams").unwrap().len(), 1);
    }

    #[test]
    fn missing_rows_and_tables_are_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FsBackend::new(dir.path()).unwrap();
        assert_eq!(backend.read_row("teams", "nope").unwrap(), None);
        assert!(backend.scan("teams").unwrap().is_empty());
        assert!(!backend.delete_row("teams", "nope").unwrap());
    }
}
