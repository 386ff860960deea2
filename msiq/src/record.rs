// SPDX-FileCopyrightText: 2026 msiq contributors
// SPDX-License-Identifier: MIT

//! Rows marshalled out of a view.

use msiq_engine::{Column, Row};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One result row: column name to value, in column order.
///
/// Null fields and binary stream fields have no value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Option<String>)>,
}

impl Record {
    /// Pair `row` with the names in `columns`.
    ///
    /// Missing trailing fields are null; binary columns are always null.
    pub fn new(columns: &[Column], row: Row) -> Self {
        let mut values = row.into_iter();
        let fields = columns
            .iter()
            .map(|column| {
                let value = values.next().flatten();
                let value = if column.is_binary() { None } else { value };
                (column.name.clone(), value)
            })
            .collect();
        Self { fields }
    }

    /// Value of the column called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(column, _)| column == name)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = Option<&str>> {
        self.fields.iter().map(|(_, value)| value.as_deref())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Rows matched by a read, with the column names of the view.
///
/// The columns are known even when nothing matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl ResultSet {
    pub fn new(columns: &[Column]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.name.clone()).collect(),
            records: Vec::new(),
        }
    }
}
