//! # Predicate Builder
//!
//! Turns a criteria value into a [`Predicate`]: a flat AND of per-column
//! conditions. There is no OR and no grouping. A predicate with no clauses
//! matches every row.
//!
//! The same predicate can be rendered as SQL ([`Predicate::to_sql`]) for the
//! repositories, or evaluated against an in-memory value
//! ([`Predicate::matches`]). Both follow the same rules:
//!
//! | condition              | matches when                                     |
//! |------------------------|--------------------------------------------------|
//! | `Equals(v)`            | column equals `v`                                |
//! | `Contains(s)`          | column contains `s`, Unicode case-insensitive    |
//! | `Range { min, max }`   | `min <= column` (if set) and `column <= max` (if set) |
//!
//! SQLite's `lower()` folds ASCII only, so `Contains` on column `c` reads the
//! stored `c_folded` column, which the repositories fill with [`fold_case`].
//!
//! A NULL column never matches a condition. Building does no validation: a
//! range with `min > max` is kept as-is and simply matches nothing.

use crate::criteria::{ContainsFilter, EqualsFilter, RangeFilter};
use crate::models::Entity;
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

/// Case folding shared by stored `*_folded` columns and `Contains` needles.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// A scalar compared against a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Text(String),
    Bool(bool),
}

impl Value {
    fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

/// Test applied to one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Equals(Value),
    Contains(String),
    Range {
        min: Option<Value>,
        max: Option<Value>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub column: &'static str,
    pub condition: Condition,
}

/// Column access for in-memory evaluation.
pub trait Filterable {
    /// Value of `column`, `None` when the column is NULL or unknown
    fn field(&self, column: &str) -> Option<Value>;
}

/// A criteria object that can be compiled into a predicate over `Target`.
pub trait Criteria: fmt::Debug + Send + Sync {
    type Target: Entity + Filterable;

    fn predicate(&self) -> Predicate<Self::Target>;
}

/// Rendered SQL filter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SqlFilter {
    /// Empty, or ` WHERE ...` with a leading space
    pub where_clause: String,
    /// Positional parameters in placeholder order
    pub binds: Vec<Value>,
}

/// AND-combination of column conditions over entity `E`.
pub struct Predicate<E> {
    clauses: Vec<Clause>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Predicate<E> {
    /// The universal predicate
    pub fn all() -> Self {
        Self {
            clauses: Vec::new(),
            _entity: PhantomData,
        }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_universal(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn and(mut self, column: &'static str, condition: Condition) -> Self {
        self.clauses.push(Clause { column, condition });
        self
    }

    /// Add an equality clause when the filter is present
    pub fn equals<T>(self, column: &'static str, filter: &Option<EqualsFilter<T>>) -> Self
    where
        T: Clone + Into<Value>,
    {
        match filter {
            Some(f) => self.and(column, Condition::Equals(f.equals.clone().into())),
            None => self,
        }
    }

    /// Add a substring clause when the filter is present
    pub fn contains(self, column: &'static str, filter: &Option<ContainsFilter>) -> Self {
        match filter {
            Some(f) => self.and(column, Condition::Contains(f.contains.clone())),
            None => self,
        }
    }

    /// Add a range clause when the filter has at least one bound
    pub fn range<T>(self, column: &'static str, filter: &Option<RangeFilter<T>>) -> Self
    where
        T: Clone + Into<Value>,
    {
        match filter {
            Some(f) if f.min.is_some() || f.max.is_some() => self.and(
                column,
                Condition::Range {
                    min: f.min.clone().map(Into::into),
                    max: f.max.clone().map(Into::into),
                },
            ),
            _ => self,
        }
    }

    pub fn to_sql(&self) -> SqlFilter {
        let mut parts = Vec::with_capacity(self.clauses.len());
        let mut binds = Vec::new();

        for clause in &self.clauses {
            let column = clause.column;
            match &clause.condition {
                Condition::Equals(value) => {
                    parts.push(format!("{} = ?", column));
                    binds.push(value.clone());
                }
                Condition::Contains(needle) => {
                    parts.push(format!("instr({}_folded, ?) > 0", column));
                    binds.push(Value::Text(fold_case(needle)));
                }
                Condition::Range { min, max } => {
                    if let Some(min) = min {
                        parts.push(format!("{} >= ?", column));
                        binds.push(min.clone());
                    }
                    if let Some(max) = max {
                        parts.push(format!("{} <= ?", column));
                        binds.push(max.clone());
                    }
                }
            }
        }

        let where_clause = if parts.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", parts.join(" AND "))
        };

        SqlFilter {
            where_clause,
            binds,
        }
    }
}

impl<E: Filterable> Predicate<E> {
    pub fn matches(&self, entity: &E) -> bool {
        self.clauses.iter().all(|clause| {
            let Some(actual) = entity.field(clause.column) else {
                return false;
            };

            match &clause.condition {
                Condition::Equals(expected) => actual == *expected,
                Condition::Contains(needle) => match actual {
                    Value::Text(text) => fold_case(&text).contains(&fold_case(needle)),
                    _ => false,
                },
                Condition::Range { min, max } => {
                    let above_min = min.as_ref().map_or(true, |min| {
                        matches!(
                            actual.compare(min),
                            Some(Ordering::Greater | Ordering::Equal)
                        )
                    });
                    let below_max = max.as_ref().map_or(true, |max| {
                        matches!(actual.compare(max), Some(Ordering::Less | Ordering::Equal))
                    });
                    above_min && below_max
                }
            }
        })
    }
}

impl<E> Default for Predicate<E> {
    fn default() -> Self {
        Self::all()
    }
}

impl<E> Clone for Predicate<E> {
    fn clone(&self) -> Self {
        Self {
            clauses: self.clauses.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> PartialEq for Predicate<E> {
    fn eq(&self, other: &Self) -> bool {
        self.clauses == other.clauses
    }
}

impl<E> Eq for Predicate<E> {}

impl<E> fmt::Debug for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("clauses", &self.clauses)
            .finish()
    }
}
