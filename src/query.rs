//! Stateless query fragments for the load path.
//!
//! Paging, sorting, and variable-depth match clauses are pure
//! string-building concerns: the engine itself never parses or executes a
//! query language. The store driver interpolates these fragments into the
//! statements it sends.

use std::fmt;

use serde::{Deserialize, Serialize};

/// `SKIP n LIMIT m` paging fragment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Rows to skip.
    pub skip: usize,
    /// Rows to return.
    pub limit: usize,
}

impl Pagination {
    /// Pagination for the zero-based `page` of `size` rows.
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            skip: page * size,
            limit: size,
        }
    }
}

impl fmt::Display for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " SKIP {} LIMIT {}", self.skip, self.limit)
    }
}

/// Ordered `ORDER BY` clauses over root-node properties.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    clauses: Vec<SortClause>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct SortClause {
    property: String,
    descending: bool,
}

impl SortOrder {
    /// An empty sort order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an ascending clause on `property`.
    pub fn asc(mut self, property: impl Into<String>) -> Self {
        self.clauses.push(SortClause {
            property: property.into(),
            descending: false,
        });
        self
    }

    /// Appends a descending clause on `property`.
    pub fn desc(mut self, property: impl Into<String>) -> Self {
        self.clauses.push(SortClause {
            property: property.into(),
            descending: true,
        });
        self
    }

    /// True when no clauses were added.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Renders the fragment against the query variable `variable`, or an
    /// empty string when no clauses were added.
    pub fn fragment(&self, variable: &str) -> String {
        if self.clauses.is_empty() {
            return String::new();
        }
        let mut out = String::from(" ORDER BY ");
        for (index, clause) in self.clauses.iter().enumerate() {
            if index > 0 {
                out.push_str(", ");
            }
            out.push_str(variable);
            out.push('.');
            out.push_str(&clause.property);
            if clause.descending {
                out.push_str(" DESC");
            }
        }
        out
    }
}

/// Variable-depth match clause loading every `label` root to `depth` hops.
///
/// Depth zero degenerates to a plain node match with no traversal.
pub fn load_clause(label: &str, depth: usize) -> String {
    if depth == 0 {
        return format!("MATCH (n:`{label}`) RETURN n");
    }
    format!("MATCH (n:`{label}`) WITH n MATCH p=(n)-[*1..{depth}]-(m) RETURN collect(distinct p)")
}
