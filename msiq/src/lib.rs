// SPDX-FileCopyrightText: 2026 msiq contributors
// SPDX-License-Identifier: MIT

//! Query, edit and diff Windows Installer packages.
//!
//! `msiq` builds SQL-like statements, hands them to the installer engine
//! (see [`msiq_engine`]) and renders what comes back. All parsing of the
//! package format and of the statements happens inside the engine.

pub mod cli;
pub mod config;
pub mod error;
pub mod ops;
pub mod output;
mod record;

pub use error::{Error, Result};
pub use ops::{Command, Outcome, execute};
pub use record::{Record, ResultSet};
