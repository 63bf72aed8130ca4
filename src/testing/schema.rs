use std::sync::atomic::{AtomicUsize, Ordering};

use crate::schema::{ColumnMetadata, SchemaCache};

/// Schema cache that only counts how often it was cleared
#[derive(Debug, Default)]
pub struct RecordingSchemaCache {
    clears: AtomicUsize,
}

impl RecordingSchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl SchemaCache for RecordingSchemaCache {
    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}

/// Model descriptor that counts column metadata reloads
#[derive(Debug)]
pub struct RecordingModel {
    table_name: String,
    reloads: AtomicUsize,
}

impl RecordingModel {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            reloads: AtomicUsize::new(0),
        }
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl ColumnMetadata for RecordingModel {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn reload_column_metadata(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}
