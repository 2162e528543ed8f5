//! Shared test utilities for planner module tests

use std::sync::Arc;

use crate::catalog::{DataType, Field, MemoryCatalog, Schema, TableRef};
use crate::datasource::{DataSource, MemoryDataSource};
use crate::executor::{Datum, Row};

/// The five-row `users` table
pub fn users_source() -> Arc<dyn DataSource> {
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int),
        Field::new("username", DataType::Text),
        Field::new("age", DataType::Int),
        Field::new("state", DataType::Text),
        Field::new("wallet", DataType::Text),
    ]);
    let rows = [
        (1, "Adam", 20, "CA", Some("0xa1")),
        (2, "Ben", 21, "NY", Some("0xb2")),
        (3, "Cindy", 22, "CA", None),
        (4, "Dave", 23, "TX", Some("0xd4")),
        (5, "Eve", 19, "NY", Some("0xe5")),
    ]
    .into_iter()
    .map(|(id, name, age, state, wallet)| {
        Row::new(vec![
            Datum::Int(id),
            Datum::Text(name.to_string()),
            Datum::Int(age),
            Datum::Text(state.to_string()),
            wallet.map_or(Datum::Null, |w| Datum::Text(w.to_string())),
        ])
    })
    .collect();
    Arc::new(MemoryDataSource::new(schema, rows).unwrap())
}

/// The three-row `orders` table
pub fn orders_source() -> Arc<dyn DataSource> {
    let schema = Schema::new(vec![
        Field::new("id", DataType::Int),
        Field::new("user_id", DataType::Int),
        Field::new("total", DataType::Float),
    ]);
    let rows = vec![
        Row::new(vec![Datum::Int(1), Datum::Int(1), Datum::Float(10.5)]),
        Row::new(vec![Datum::Int(2), Datum::Int(2), Datum::Float(20.0)]),
        Row::new(vec![Datum::Int(3), Datum::Int(2), Datum::Float(5.25)]),
    ];
    Arc::new(MemoryDataSource::new(schema, rows).unwrap())
}

/// Create a test catalog with `users` and `orders` tables
pub fn test_catalog() -> MemoryCatalog {
    let catalog = MemoryCatalog::new();
    catalog.register(TableRef::bare("users"), users_source());
    catalog.register(TableRef::bare("orders"), orders_source());
    catalog
}
