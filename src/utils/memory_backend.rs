use crate::utils::store::{StoreError, TableBackend};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

// Process-local tables, used for STORAGE_BACKEND=memory and in tests
#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("memory table lock poisoned".to_string())
}

impl TableBackend for MemoryBackend {
    fn read_row(&self, table: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.get(table).and_then(|rows| rows.get(id)).cloned())
    }

    fn write_row(&self, table: &str, id: &str, row: &Value) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        tables
            .entry(table.to_string())
            .or_default()
            .insert(id.to_string(), row.clone());
        Ok(())
    }

    fn delete_row(&self, table: &str, id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        Ok(tables
            .get_mut(table)
            .map_or(false, |rows| rows.remove(id).is_some()))
    }

    fn scan(&self, table: &str) -> Result<Vec<Value>, StoreError> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }
}
