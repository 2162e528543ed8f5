//! Schema model
//!
//! Schemas are ordered, immutable lists of fields. Fields may carry the
//! relation they came from, which is how qualified column references
//! such as `users.age` resolve.

use std::fmt;

use super::TableRef;
use crate::planner::error::{PlannerError, PlannerResult};

/// Value types known to the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Null,
    Boolean,
    Int,
    Float,
    Text,
    Blob,
}

impl DataType {
    /// Check if this is a numeric type
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int | DataType::Float)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Null => "null",
            DataType::Boolean => "bool",
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Text => "text",
            DataType::Blob => "blob",
        };
        f.write_str(name)
    }
}

/// A named, typed column, optionally tagged with its relation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub relation: Option<TableRef>,
}

impl Field {
    /// Create an unqualified field
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Field {
            name: name.into(),
            data_type,
            relation: None,
        }
    }

    /// Create a field belonging to a relation
    pub fn qualified(relation: TableRef, name: impl Into<String>, data_type: DataType) -> Self {
        Field {
            name: name.into(),
            data_type,
            relation: Some(relation),
        }
    }

    /// Return this field re-tagged with a relation
    pub fn with_relation(mut self, relation: TableRef) -> Self {
        self.relation = Some(relation);
        self
    }

    /// Name including the relation, e.g. `users.age`
    pub fn qualified_name(&self) -> String {
        match &self.relation {
            Some(rel) => format!("{}.{}", rel, self.name),
            None => self.name.clone(),
        }
    }

    /// Check if a (possibly qualified) column reference names this field
    pub fn matches(&self, relation: Option<&TableRef>, name: &str) -> bool {
        if self.name != name {
            return false;
        }
        match (relation, &self.relation) {
            (None, _) => true,
            (Some(wanted), Some(own)) => wanted.matches(own),
            (Some(_), None) => false,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.qualified_name(), self.data_type)
    }
}

/// Ordered list of fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Schema { fields }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in order
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Locate a column reference.
    ///
    /// Fails with `UnknownColumn` when nothing matches and with
    /// `AmbiguousColumn` when more than one field does.
    pub fn index_of(&self, relation: Option<&TableRef>, name: &str) -> PlannerResult<usize> {
        let mut matches = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.matches(relation, name))
            .map(|(i, _)| i);

        let display = || match relation {
            Some(rel) => format!("{}.{}", rel, name),
            None => name.to_string(),
        };

        match (matches.next(), matches.next()) {
            (Some(index), None) => Ok(index),
            (Some(_), Some(_)) => Err(PlannerError::AmbiguousColumn(display())),
            (None, _) => Err(PlannerError::UnknownColumn(display())),
        }
    }

    /// Resolve a column reference to its field
    pub fn resolve(&self, relation: Option<&TableRef>, name: &str) -> PlannerResult<&Field> {
        let index = self.index_of(relation, name)?;
        Ok(&self.fields[index])
    }

    /// Check if a column reference resolves to exactly one field
    pub fn contains(&self, relation: Option<&TableRef>, name: &str) -> bool {
        self.index_of(relation, name).is_ok()
    }

    /// Select fields by name, in the order given
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> PlannerResult<Schema> {
        let fields = names
            .iter()
            .map(|name| self.resolve(None, name.as_ref()).cloned())
            .collect::<PlannerResult<Vec<_>>>()?;
        Ok(Schema { fields })
    }

    /// Concatenate two schemas (join output)
    pub fn join(&self, other: &Schema) -> Schema {
        let mut fields = self.fields.clone();
        fields.extend(other.fields.iter().cloned());
        Schema { fields }
    }

    /// Append the fields of `other` not already present
    pub fn merge(&self, other: &Schema) -> Schema {
        let mut fields = self.fields.clone();
        for field in &other.fields {
            if !fields.contains(field) {
                fields.push(field.clone());
            }
        }
        Schema { fields }
    }

    /// Re-tag every field with the given relation
    pub fn with_relation(&self, relation: &TableRef) -> Schema {
        let fields = self
            .fields
            .iter()
            .map(|f| f.clone().with_relation(relation.clone()))
            .collect();
        Schema { fields }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<_> = self.fields.iter().map(|field| field.to_string()).collect();
        write!(f, "[{}]", fields.join(", "))
    }
}
