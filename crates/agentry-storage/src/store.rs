//! Store contract: raw rows, query model, and CRUD primitives.
//!
//! The repository never sees the storage engine directly; it speaks to an
//! [`AgentStore`] in terms of loosely typed JSON rows and a small
//! filter/order query model. Implementations are provided by adapters such
//! as [`crate::AgentTable`].

use std::cmp::Ordering;

use anyhow::Result;
use serde_json::Value;

/// A raw agent row as returned by, and handed to, the store.
pub type RawRow = serde_json::Map<String, Value>;

/// A single filter condition on a row field.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Field must be present and exactly equal to the value.
    Eq(String, Value),
    /// Field must be a string containing the substring.
    Contains(String, String),
}

/// Conjunction of field conditions.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(field.to_string(), value.into()));
        self
    }

    pub fn contains(mut self, field: &str, needle: impl Into<String>) -> Self {
        self.conditions
            .push(Condition::Contains(field.to_string(), needle.into()));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, row: &RawRow) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Condition::Eq(field, expected) => {
                row.get(field).is_some_and(|value| value == expected)
            }
            Condition::Contains(field, needle) => row
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|value| value.contains(needle.as_str())),
        })
    }
}

/// Sort direction for a single order key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Ordering specification: field names with directions, applied in turn.
#[derive(Debug, Clone, Default)]
pub struct Order {
    keys: Vec<(String, Direction)>,
}

impl Order {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by(mut self, field: &str, direction: Direction) -> Self {
        self.keys.push((field.to_string(), direction));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn compare(&self, a: &RawRow, b: &RawRow) -> Ordering {
        for (field, direction) in &self.keys {
            let ordering = compare_values(a.get(field), b.get(field));
            let ordering = match direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Compares two optional JSON values: absent/null first, numbers
/// numerically, strings lexicographically. Mixed kinds compare equal.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|value| !value.is_null());
    let b = b.filter(|value| !value.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .unwrap_or(0.0)
            .total_cmp(&y.as_f64().unwrap_or(0.0)),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Row-oriented CRUD primitives over the agent table.
///
/// Update and delete report store-level refusal (e.g. an unknown id) as
/// `Ok(false)`; transport failures surface as errors.
pub trait AgentStore: Send + Sync {
    /// Fetch rows matching the filter, sorted by the order specification.
    fn query(&self, filter: &Filter, order: &Order) -> Result<Vec<RawRow>>;

    /// Insert a row (without an id) and return the newly assigned id.
    fn insert(&self, row: &RawRow) -> Result<i64>;

    /// Overwrite the row stored under the given id.
    fn update(&self, id: i64, row: &RawRow) -> Result<bool>;

    /// Delete the row stored under the given id.
    fn delete(&self, id: i64) -> Result<bool>;
}
