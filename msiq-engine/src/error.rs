// SPDX-FileCopyrightText: 2026 msiq contributors
// SPDX-License-Identifier: MIT

//! Error types for installer engine calls.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for installer engine calls.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by, or on the way to, the installer engine.
#[derive(Error, Debug)]
pub enum Error {
    /// No installer engine could be acquired
    #[error("Installer engine unavailable: {0}")]
    Unavailable(String),

    /// An engine call returned a failure code
    #[error("{call} failed: {} (error {code})", describe_error_code(.code))]
    Call { call: &'static str, code: u32 },

    /// Transform requested between two identical databases
    #[error("No differences between '{}' and '{}', nothing to transform", .updated.display(), .reference.display())]
    NoChanges {
        updated: PathBuf,
        reference: PathBuf,
    },

    /// A string cannot be handed to the engine
    #[error("String contains a NUL character: {0:?}")]
    InteriorNul(String),

    /// Unknown transform flag name
    #[error("Unknown {kind} flag '{name}'")]
    UnknownFlag { kind: &'static str, name: String },
}

impl Error {
    pub fn call(call: &'static str, code: u32) -> Self {
        Self::Call { call, code }
    }
}

/// Short description of a Windows Installer error code.
pub fn describe_error_code(code: &u32) -> &'static str {
    match *code {
        2 => "file not found",
        5 => "access denied",
        6 => "invalid handle",
        13 => "invalid data",
        32 => "file in use by another process",
        87 => "invalid parameter",
        110 => "could not open the file",
        232 => "no differences between databases",
        1392 => "file is corrupt",
        1610 => "malformed column or table name",
        1615 => "bad query syntax",
        1620 => "not a valid installer package",
        1624 => "error applying transform",
        1627 => "function failed",
        1628 => "invalid table",
        1629 => "data type mismatch",
        1631 => "could not create the file",
        _ => "installer engine error",
    }
}
