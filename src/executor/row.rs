//! Row type - a collection of datums

use super::datum::Datum;
use super::error::{ExecutorError, ExecutorResult};

/// A row of datums
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Row {
    values: Vec<Datum>,
}

impl Row {
    /// Create a new row with the given values
    pub fn new(values: Vec<Datum>) -> Self {
        Row { values }
    }

    /// Create a row with no columns
    pub fn empty() -> Self {
        Row { values: vec![] }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a datum by index
    pub fn get(&self, index: usize) -> ExecutorResult<&Datum> {
        self.values
            .get(index)
            .ok_or(ExecutorError::ColumnIndexOutOfBounds {
                index,
                row_len: self.values.len(),
            })
    }

    pub fn values(&self) -> &[Datum] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Datum> {
        self.values
    }

    /// Project specific columns by indices
    pub fn project(&self, indices: &[usize]) -> ExecutorResult<Row> {
        let mut values = Vec::with_capacity(indices.len());
        for &idx in indices {
            values.push(self.get(idx)?.clone());
        }
        Ok(Row { values })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Datum> {
        self.values.iter()
    }
}

impl From<Vec<Datum>> for Row {
    fn from(values: Vec<Datum>) -> Self {
        Row { values }
    }
}

impl IntoIterator for Row {
    type Item = Datum;
    type IntoIter = std::vec::IntoIter<Datum>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Datum;
    type IntoIter = std::slice::Iter<'a, Datum>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_get() {
        let row = Row::new(vec![Datum::Int(42)]);
        assert!(matches!(row.get(0), Ok(Datum::Int(42))));
        assert!(matches!(
            row.get(1),
            Err(ExecutorError::ColumnIndexOutOfBounds { index: 1, row_len: 1 })
        ));
    }

    #[test]
    fn test_row_project() {
        let row = Row::new(vec![Datum::Int(1), Datum::Int(2), Datum::Int(3)]);
        let projected = row.project(&[2, 0]).unwrap();
        assert_eq!(projected, Row::new(vec![Datum::Int(3), Datum::Int(1)]));
        assert!(row.project(&[5]).is_err());
    }

    #[test]
    fn test_row_hash_eq() {
        use std::collections::HashSet;

        let r1 = Row::new(vec![Datum::Int(1), Datum::Null]);
        let r2 = Row::new(vec![Datum::Int(1), Datum::Null]);
        let r3 = Row::new(vec![Datum::Int(1), Datum::Int(3)]);

        let mut set = HashSet::new();
        set.insert(r1);
        assert!(set.contains(&r2));
        assert!(!set.contains(&r3));
    }
}
