//! Cached schema metadata and its process-wide invalidation
//!
//! When a query fails because a column no longer matches what was cached, every
//! pooled connection's schema cache is cleared and every registered model is
//! told to reload its column metadata. The [`SchemaRegistry`] is the single
//! place those collaborators are registered.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pg_failover::schema::{ColumnInfo, LocalSchemaCache, SchemaRegistry};
//!
//! let registry = SchemaRegistry::new();
//! let cache = Arc::new(LocalSchemaCache::new());
//! registry.register_cache(cache.clone());
//!
//! cache.insert("users", vec![ColumnInfo::new("id", "uuid", false)]);
//! assert_eq!(cache.len(), 1);
//!
//! let report = registry.invalidate_all();
//! assert_eq!(report.caches, 1);
//! assert!(cache.is_empty());
//! ```

mod local;

use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;

pub use local::{ColumnInfo, LocalSchemaCache, SchemaCacheStats};

/// Per-connection cache of table metadata
pub trait SchemaCache: Send + Sync + Debug {
    /// Drop everything cached; the next lookup goes back to the catalog
    fn clear(&self);
}

/// A model or table descriptor that keeps its own copy of column metadata
pub trait ColumnMetadata: Send + Sync + Debug {
    fn table_name(&self) -> &str;

    fn reload_column_metadata(&self);
}

/// How many collaborators an invalidation touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchemaResetReport {
    pub caches: usize,
    pub models: usize,
}

/// Registry of every schema cache and model descriptor in the process
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    /// Pooled connection caches by registration id
    caches: DashMap<usize, Arc<dyn SchemaCache>>,
    /// Model descriptors by table name
    models: DashMap<String, Arc<dyn ColumnMetadata>>,
    next_id: AtomicUsize,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection's schema cache, returning an id for unregistering
    pub fn register_cache(&self, cache: Arc<dyn SchemaCache>) -> usize {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.caches.insert(id, cache);
        id
    }

    pub fn unregister_cache(&self, id: usize) -> bool {
        self.caches.remove(&id).is_some()
    }

    /// Register a model; a later registration for the same table replaces it
    pub fn register_model(&self, model: Arc<dyn ColumnMetadata>) {
        self.models.insert(model.table_name().to_string(), model);
    }

    pub fn unregister_model(&self, table_name: &str) -> bool {
        self.models.remove(table_name).is_some()
    }

    pub fn cache_count(&self) -> usize {
        self.caches.len()
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Clear every registered cache and reload every registered model
    ///
    /// Safe to run concurrently; redundant invalidations only repeat work.
    pub fn invalidate_all(&self) -> SchemaResetReport {
        // Collect first so no shard lock is held while collaborators run
        let caches: Vec<Arc<dyn SchemaCache>> =
            self.caches.iter().map(|entry| Arc::clone(entry.value())).collect();
        let models: Vec<Arc<dyn ColumnMetadata>> =
            self.models.iter().map(|entry| Arc::clone(entry.value())).collect();

        for cache in &caches {
            cache.clear();
        }

        for model in &models {
            tracing::debug!(table = model.table_name(), "Reloading column metadata");
            model.reload_column_metadata();
        }

        SchemaResetReport {
            caches: caches.len(),
            models: models.len(),
        }
    }
}
