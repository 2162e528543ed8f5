//! Executor integration tests
//!
//! Each test plans SQL against the `users` CSV fixture, optimizes, lowers
//! and executes the result.

mod test_utils;

use plancraft::executor::{Datum, ExecutorError, QueryResult, Row};
use plancraft::planner::{Optimizer, QueryPlanner, VirtualPlanner};

use test_utils::test_catalog;

async fn run(sql: &str) -> QueryResult {
    let catalog = test_catalog();
    let plan = QueryPlanner::new(&catalog).plan_sql(sql).unwrap();
    let optimized = Optimizer::new().optimize(&plan).unwrap();
    VirtualPlanner::to_plan(&optimized)
        .unwrap()
        .execute()
        .await
        .unwrap()
}

fn ints(rows: &[Row]) -> Vec<i64> {
    rows.iter()
        .map(|r| r.values()[0].as_int().unwrap())
        .collect()
}

// ============ Reference query ============

#[tokio::test]
async fn test_reference_query_csv() {
    let mut result = run("SELECT username, age FROM users WHERE age > 20").await;
    assert_eq!(result.schema().field_names(), vec!["username", "age"]);
    assert_eq!(
        result.to_csv().await.unwrap(),
        "username,age\nBen,21\nCindy,22\nDave,23\n"
    );
}

#[tokio::test]
async fn test_each_execute_is_independent() {
    let catalog = test_catalog();
    let plan = QueryPlanner::new(&catalog)
        .plan_sql("SELECT id FROM users WHERE age > 20")
        .unwrap();
    let virtual_plan = VirtualPlanner::to_plan(&Optimizer::new().optimize(&plan).unwrap()).unwrap();

    let mut first = virtual_plan.execute().await.unwrap();
    let mut second = virtual_plan.execute().await.unwrap();
    assert!(first.next().await.unwrap().is_some());
    assert_eq!(second.collect().await.unwrap().len(), 3);
    assert_eq!(first.collect().await.unwrap().len(), 2);
}

// ============ Filtering ============

#[tokio::test]
async fn test_null_predicates() {
    let mut result = run("SELECT id FROM users WHERE wallet IS NULL").await;
    assert_eq!(ints(&result.collect().await.unwrap()), vec![3]);

    // Comparisons with NULL never pass
    let mut result = run("SELECT id FROM users WHERE wallet = NULL").await;
    assert!(result.collect().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_boolean_connectives() {
    let mut result = run("SELECT id FROM users WHERE state = 'CA' OR (age > 21 AND NOT state = 'TX')").await;
    assert_eq!(ints(&result.collect().await.unwrap()), vec![1, 3]);
}

#[tokio::test]
async fn test_type_mismatch_is_evaluation_error() {
    let mut result = run("SELECT username FROM users WHERE username > 5").await;
    assert!(matches!(
        result.collect().await,
        Err(ExecutorError::Evaluation(_))
    ));
}

// ============ Sort, limit, distinct ============

#[tokio::test]
async fn test_sort_desc_with_limit() {
    let mut result = run("SELECT username, age FROM users ORDER BY age DESC LIMIT 2").await;
    assert_eq!(
        result.to_csv().await.unwrap(),
        "username,age\nDave,23\nCindy,22\n"
    );
}

#[tokio::test]
async fn test_sort_nulls_first_on_unprojected_column() {
    let mut result = run("SELECT id FROM users ORDER BY wallet NULLS FIRST").await;
    assert_eq!(ints(&result.collect().await.unwrap()), vec![3, 1, 2, 4, 5]);
}

#[tokio::test]
async fn test_limit_offset() {
    let mut result = run("SELECT id FROM users LIMIT 2 OFFSET 3").await;
    assert_eq!(ints(&result.collect().await.unwrap()), vec![4, 5]);
}

#[tokio::test]
async fn test_distinct() {
    let mut result = run("SELECT DISTINCT state FROM users").await;
    assert_eq!(result.to_csv().await.unwrap(), "state\nCA\nNY\nTX\n");
}

// ============ Expressions ============

#[tokio::test]
async fn test_scalar_functions_and_arithmetic() {
    let mut result = run("SELECT upper(username), length(state), age * 2 + 1 FROM users WHERE id = 1").await;
    let rows = result.collect().await.unwrap();
    assert_eq!(
        rows,
        vec![Row::new(vec![
            Datum::Text("ADAM".into()),
            Datum::Int(2),
            Datum::Int(41),
        ])]
    );
}

#[tokio::test]
async fn test_select_without_from() {
    let mut result = run("SELECT 1 + 2 AS three").await;
    assert_eq!(result.to_csv().await.unwrap(), "three\n3\n");
}
