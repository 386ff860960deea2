// SPDX-FileCopyrightText: 2026 msiq contributors
// SPDX-License-Identifier: MIT

//! Query string templates for Windows Installer databases.
//!
//! The installer engine compiles a small SQL dialect. This crate only builds
//! the statement text: table names, filters, column lists and values are
//! interpolated as given. Malformed or hostile input yields a malformed
//! statement, which the engine rejects when the view is opened.
//!
//! # Example
//!
//! ```
//! use msiq_query::{Query, Select};
//!
//! let query = Query::from(Select::new("Property").filter("Property = 'ProductCode'"));
//! assert_eq!(
//!     query.to_string(),
//!     "SELECT * FROM Property WHERE Property = 'ProductCode'"
//! );
//! ```

use std::fmt;

/// Statement listing the persistent tables of a package.
pub const LIST_TABLES: &str = "SELECT `Name` FROM `_Tables`";

/// `SELECT * FROM <table> [WHERE <filter>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    pub table: String,
    pub filter: Option<String>,
}

impl Select {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: None,
        }
    }

    /// Restrict the rows with a `WHERE` clause.
    ///
    /// A blank filter leaves the statement unfiltered.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.filter = if filter.trim().is_empty() {
            None
        } else {
            Some(filter)
        };
        self
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT * FROM {}", self.table)?;
        if let Some(filter) = &self.filter {
            write!(f, " WHERE {filter}")?;
        }
        Ok(())
    }
}

/// `UPDATE <table> SET <column>='<value>' WHERE <key>='<key_value>'`
///
/// The row is addressed through its primary key column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub table: String,
    pub column: String,
    pub value: String,
    pub key: String,
    pub key_value: String,
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UPDATE {} SET {}='{}' WHERE {}='{}'",
            self.table, self.column, self.value, self.key, self.key_value
        )
    }
}

/// ``INSERT INTO `<table>` (<columns>) VALUES (<values>)``
///
/// `columns` and `values` are comma separated lists passed through as-is, so
/// string values must carry their own quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insert {
    pub table: String,
    pub columns: String,
    pub values: String,
}

impl fmt::Display for Insert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "INSERT INTO `{}` ({}) VALUES ({})",
            self.table, self.columns, self.values
        )
    }
}

/// Any statement this crate knows how to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Select(Select),
    Update(Update),
    Insert(Insert),
    ListTables,
}

impl Query {
    /// Table the statement targets.
    pub fn table(&self) -> &str {
        match self {
            Query::Select(q) => &q.table,
            Query::Update(q) => &q.table,
            Query::Insert(q) => &q.table,
            Query::ListTables => "_Tables",
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Select(q) => q.fmt(f),
            Query::Update(q) => q.fmt(f),
            Query::Insert(q) => q.fmt(f),
            Query::ListTables => f.write_str(LIST_TABLES),
        }
    }
}

impl From<Select> for Query {
    fn from(q: Select) -> Self {
        Query::Select(q)
    }
}

impl From<Update> for Query {
    fn from(q: Update) -> Self {
        Query::Update(q)
    }
}

impl From<Insert> for Query {
    fn from(q: Insert) -> Self {
        Query::Insert(q)
    }
}
