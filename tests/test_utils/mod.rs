//! Shared test utilities
//!
//! Note: clippy reports false-positive dead_code warnings because it can't
//! trace usage across test binaries. These utilities are used by multiple tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use plancraft::catalog::{DataType, Field, MemoryCatalog, Schema, TableRef};
use plancraft::datasource::{CsvDataSource, DataSource};
use tracing_subscriber::EnvFilter;

/// Install an env-filtered subscriber writing to the test output.
/// Only the first call per test binary takes effect.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("plancraft=warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn users_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Int),
        Field::new("username", DataType::Text),
        Field::new("age", DataType::Int),
        Field::new("state", DataType::Text),
        Field::new("wallet", DataType::Text),
    ])
}

/// The `users` fixture loaded from CSV
pub fn users_source() -> Arc<dyn DataSource> {
    let source = CsvDataSource::open(fixture_path("users.csv"), users_schema())
        .expect("Failed to load users fixture");
    Arc::new(source)
}

/// Catalog with the `users` fixture registered
pub fn test_catalog() -> MemoryCatalog {
    init_logging();
    let catalog = MemoryCatalog::new();
    catalog.register(TableRef::bare("users"), users_source());
    catalog
}
