//! Catalog - table references and data source lookup
//!
//! The catalog maps table references to the data sources backing them.
//! Lookups treat an unset namespace as a wildcard, so `users` resolves a
//! table registered as `public.users` when no other namespace claims it.

pub mod schema;

pub use schema::{DataType, Field, Schema};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::datasource::DataSource;
use crate::planner::error::{PlannerError, PlannerResult};

/// Reference to a table, optionally qualified by a namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableRef {
    pub namespace: Option<String>,
    pub table: String,
}

impl TableRef {
    /// Unqualified table reference
    pub fn bare(table: impl Into<String>) -> Self {
        TableRef {
            namespace: None,
            table: table.into(),
        }
    }

    /// Namespace-qualified table reference
    pub fn qualified(namespace: impl Into<String>, table: impl Into<String>) -> Self {
        TableRef {
            namespace: Some(namespace.into()),
            table: table.into(),
        }
    }

    /// Check whether two references may name the same table.
    ///
    /// Table names must be equal; namespaces must be equal unless either
    /// side leaves it unset.
    pub fn matches(&self, other: &TableRef) -> bool {
        if self.table != other.table {
            return false;
        }
        match (&self.namespace, &other.namespace) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}.{}", ns, self.table),
            None => write!(f, "{}", self.table),
        }
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        match name.split_once('.') {
            Some((ns, table)) => TableRef::qualified(ns, table),
            None => TableRef::bare(name),
        }
    }
}

/// Resolves table references to data sources
pub trait Catalog: Send + Sync {
    /// Look up the data source for a table
    fn get_data_source(&self, table: &TableRef) -> PlannerResult<Arc<dyn DataSource>>;
}

/// In-memory catalog of registered data sources
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: RwLock<HashMap<TableRef, Arc<dyn DataSource>>>,
}

impl MemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a data source, returning the one it replaced
    pub fn register(
        &self,
        table: impl Into<TableRef>,
        source: Arc<dyn DataSource>,
    ) -> Option<Arc<dyn DataSource>> {
        let table = table.into();
        debug!(table = %table, "registering data source");
        self.tables.write().insert(table, source)
    }

    /// Remove a data source
    pub fn deregister(&self, table: &TableRef) -> Option<Arc<dyn DataSource>> {
        self.tables.write().remove(table)
    }

    /// Registered table references, sorted
    pub fn table_names(&self) -> Vec<TableRef> {
        let mut names: Vec<_> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Catalog for MemoryCatalog {
    fn get_data_source(&self, table: &TableRef) -> PlannerResult<Arc<dyn DataSource>> {
        let tables = self.tables.read();
        if let Some(source) = tables.get(table) {
            return Ok(source.clone());
        }

        let mut candidates = tables.iter().filter(|(name, _)| name.matches(table));
        match (candidates.next(), candidates.next()) {
            (Some((_, source)), None) => Ok(source.clone()),
            (Some(_), Some(_)) => Err(PlannerError::InvalidPlan(format!(
                "table reference {} matches more than one namespace",
                table
            ))),
            (None, _) => Err(PlannerError::UnknownTable(table.to_string())),
        }
    }
}
