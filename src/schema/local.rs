use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::SchemaCache;

/// One column as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
        }
    }
}

/// Statistics about schema cache lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub clears: u64,
    /// Number of tables currently cached
    pub size: usize,
}

/// In-memory per-connection column cache using DashMap
#[derive(Debug, Default)]
pub struct LocalSchemaCache {
    /// Columns by table name
    tables: DashMap<String, Arc<Vec<ColumnInfo>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    clears: AtomicU64,
}

impl LocalSchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached columns for a table, if present
    pub fn get(&self, table: &str) -> Option<Arc<Vec<ColumnInfo>>> {
        match self.tables.get(table) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(entry.value()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn insert(&self, table: impl Into<String>, columns: Vec<ColumnInfo>) {
        self.tables.insert(table.into(), Arc::new(columns));
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn stats(&self) -> SchemaCacheStats {
        SchemaCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            size: self.tables.len(),
        }
    }
}

impl SchemaCache for LocalSchemaCache {
    fn clear(&self) {
        self.tables.clear();
        self.clears.fetch_add(1, Ordering::Relaxed);
    }
}
