// SPDX-FileCopyrightText: 2026 msiq contributors
// SPDX-License-Identifier: MIT

//! Values exchanged with the installer engine.

use crate::error::{Error, Result};

/// Database open mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read-only access (engine persist mode 0)
    ReadOnly,
    /// Read-write access, changes kept until commit (engine persist mode 1)
    Transact,
}

impl OpenMode {
    /// Persist mode value understood by the engine.
    pub fn persist(self) -> usize {
        match self {
            OpenMode::ReadOnly => 0,
            OpenMode::Transact => 1,
        }
    }
}

/// Column metadata of a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// 1-based field index
    pub index: u32,
    pub name: String,
    /// Engine type descriptor, e.g. `s72`, `i2`, `L0`, `v0`
    pub ty: String,
}

impl Column {
    /// Whether the column holds a binary stream.
    ///
    /// Stream fields cannot be read as strings; their values are reported as
    /// `None`.
    pub fn is_binary(&self) -> bool {
        self.ty.starts_with(['v', 'V'])
    }
}

/// Which record fields of a view hold binary streams.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) struct StreamFields(Vec<bool>);

#[cfg_attr(not(windows), allow(dead_code))]
impl StreamFields {
    pub(crate) fn new(columns: &[Column]) -> Self {
        let len = columns.iter().map(|c| c.index as usize).max().unwrap_or(0);
        let mut fields = vec![false; len];
        for column in columns.iter().filter(|c| c.is_binary() && c.index > 0) {
            fields[column.index as usize - 1] = true;
        }
        Self(fields)
    }

    /// Whether 1-based `field` is a stream. Unknown fields are not.
    pub(crate) fn contains(&self, field: u32) -> bool {
        field
            .checked_sub(1)
            .and_then(|i| self.0.get(i as usize))
            .copied()
            .unwrap_or(false)
    }
}

// MSICONDITION
const CONDITION_FALSE: i32 = 0;
const CONDITION_TRUE: i32 = 1;
const CONDITION_NONE: i32 = 2;

/// Map the answer of a table persistence query to table existence.
///
/// Temporary tables (`MSICONDITION_FALSE`) exist too; only
/// `MSICONDITION_NONE` means the table is absent.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn table_exists_from_condition(condition: i32) -> Result<bool> {
    match condition {
        CONDITION_TRUE | CONDITION_FALSE => Ok(true),
        CONDITION_NONE => Ok(false),
        _ => Err(Error::call("MsiDatabaseIsTablePersistent", condition as u32)),
    }
}

/// Field values of one fetched row, in column order.
///
/// Null and binary fields are `None`.
pub type Row = Vec<Option<String>>;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn column(index: u32, ty: &str) -> Column {
        Column {
            index,
            name: format!("Field{index}"),
            ty: ty.into(),
        }
    }

    #[rstest]
    #[case("v0", true)]
    #[case("V0", true)]
    #[case("s72", false)]
    #[case("S255", false)]
    #[case("L0", false)]
    #[case("i2", false)]
    fn column_type(#[case] ty: &str, #[case] binary: bool) {
        assert_eq!(column(1, ty).is_binary(), binary);
    }

    #[test]
    fn stream_fields_follow_column_index() {
        let streams = StreamFields::new(&[column(1, "s72"), column(2, "v0"), column(3, "i2")]);
        assert!(!streams.contains(1));
        assert!(streams.contains(2));
        assert!(!streams.contains(3));
        // fields the view never described, including the record's field 0
        assert!(!streams.contains(0));
        assert!(!streams.contains(4));
    }

    #[test]
    fn stream_fields_of_unordered_columns() {
        let streams = StreamFields::new(&[column(3, "V0"), column(1, "s72")]);
        assert!(streams.contains(3));
        assert!(!streams.contains(1));
        assert!(!streams.contains(2));
        assert_eq!(StreamFields::new(&[]), StreamFields::default());
    }

    #[rstest]
    #[case(CONDITION_TRUE, true)]
    #[case(CONDITION_FALSE, true)]
    #[case(CONDITION_NONE, false)]
    fn table_condition(#[case] condition: i32, #[case] exists: bool) {
        assert_eq!(table_exists_from_condition(condition).unwrap(), exists);
    }

    #[test]
    fn table_condition_error() {
        assert!(matches!(
            table_exists_from_condition(3),
            Err(Error::Call {
                call: "MsiDatabaseIsTablePersistent",
                code: 3
            })
        ));
    }

    #[test]
    fn persist_modes() {
        assert_eq!(OpenMode::ReadOnly.persist(), 0);
        assert_eq!(OpenMode::Transact.persist(), 1);
    }
}
