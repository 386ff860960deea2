// SPDX-FileCopyrightText: 2026 msiq contributors
// SPDX-License-Identifier: MIT

//! Transform summary flags.
//!
//! A transform's summary information records which errors to suppress when
//! it is applied and which properties of the target package to validate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Error conditions suppressed when the transform is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCondition {
    AddExistingRow,
    DeleteMissingRow,
    AddExistingTable,
    DeleteMissingTable,
    UpdateMissingRow,
    ChangeCodepage,
    ViewTransform,
}

impl ErrorCondition {
    pub const ALL: [ErrorCondition; 7] = [
        ErrorCondition::AddExistingRow,
        ErrorCondition::DeleteMissingRow,
        ErrorCondition::AddExistingTable,
        ErrorCondition::DeleteMissingTable,
        ErrorCondition::UpdateMissingRow,
        ErrorCondition::ChangeCodepage,
        ErrorCondition::ViewTransform,
    ];

    pub fn bits(self) -> i32 {
        match self {
            ErrorCondition::AddExistingRow => 0x0001,
            ErrorCondition::DeleteMissingRow => 0x0002,
            ErrorCondition::AddExistingTable => 0x0004,
            ErrorCondition::DeleteMissingTable => 0x0008,
            ErrorCondition::UpdateMissingRow => 0x0010,
            ErrorCondition::ChangeCodepage => 0x0020,
            ErrorCondition::ViewTransform => 0x0100,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ErrorCondition::AddExistingRow => "add-existing-row",
            ErrorCondition::DeleteMissingRow => "delete-missing-row",
            ErrorCondition::AddExistingTable => "add-existing-table",
            ErrorCondition::DeleteMissingTable => "delete-missing-table",
            ErrorCondition::UpdateMissingRow => "update-missing-row",
            ErrorCondition::ChangeCodepage => "change-codepage",
            ErrorCondition::ViewTransform => "view-transform",
        }
    }
}

/// Checks performed against the target package before the transform is
/// applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Validation {
    Language,
    Product,
    Platform,
    MajorVersion,
    MinorVersion,
    UpdateVersion,
    NewLessBase,
    NewLessEqualBase,
    NewEqualBase,
    NewGreaterEqualBase,
    NewGreaterBase,
    UpgradeCode,
}

impl Validation {
    pub const ALL: [Validation; 12] = [
        Validation::Language,
        Validation::Product,
        Validation::Platform,
        Validation::MajorVersion,
        Validation::MinorVersion,
        Validation::UpdateVersion,
        Validation::NewLessBase,
        Validation::NewLessEqualBase,
        Validation::NewEqualBase,
        Validation::NewGreaterEqualBase,
        Validation::NewGreaterBase,
        Validation::UpgradeCode,
    ];

    pub fn bits(self) -> i32 {
        match self {
            Validation::Language => 0x0001,
            Validation::Product => 0x0002,
            Validation::Platform => 0x0004,
            Validation::MajorVersion => 0x0008,
            Validation::MinorVersion => 0x0010,
            Validation::UpdateVersion => 0x0020,
            Validation::NewLessBase => 0x0040,
            Validation::NewLessEqualBase => 0x0080,
            Validation::NewEqualBase => 0x0100,
            Validation::NewGreaterEqualBase => 0x0200,
            Validation::NewGreaterBase => 0x0400,
            Validation::UpgradeCode => 0x0800,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Validation::Language => "language",
            Validation::Product => "product",
            Validation::Platform => "platform",
            Validation::MajorVersion => "major-version",
            Validation::MinorVersion => "minor-version",
            Validation::UpdateVersion => "update-version",
            Validation::NewLessBase => "new-less-base",
            Validation::NewLessEqualBase => "new-less-equal-base",
            Validation::NewEqualBase => "new-equal-base",
            Validation::NewGreaterEqualBase => "new-greater-equal-base",
            Validation::NewGreaterBase => "new-greater-base",
            Validation::UpgradeCode => "upgrade-code",
        }
    }
}

impl FromStr for ErrorCondition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCondition::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| Error::UnknownFlag {
                kind: "error condition",
                name: s.to_owned(),
            })
    }
}

impl FromStr for Validation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Validation::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| Error::UnknownFlag {
                kind: "validation",
                name: s.to_owned(),
            })
    }
}

impl fmt::Display for ErrorCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Summary flags written alongside a generated transform.
///
/// The default suppresses nothing and validates nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformFlags {
    pub suppress: Vec<ErrorCondition>,
    pub validate: Vec<Validation>,
}

impl TransformFlags {
    /// Combined error condition bits.
    pub fn error_bits(&self) -> i32 {
        self.suppress.iter().fold(0, |acc, c| acc | c.bits())
    }

    /// Combined validation bits.
    pub fn validation_bits(&self) -> i32 {
        self.validate.iter().fold(0, |acc, v| acc | v.bits())
    }
}
