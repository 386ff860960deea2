// SPDX-FileCopyrightText: 2026 msiq contributors
// SPDX-License-Identifier: MIT

//! Windows Installer engine contract.
//!
//! Opening packages, compiling queries, fetching rows and generating
//! transforms all happen inside the installer engine shipped with Windows.
//! This crate describes what `msiq` needs from that engine as three traits
//! ([`Installer`], [`Database`], [`View`]) and provides the `msi.dll`
//! implementation behind [`system_installer`].
//!
//! Handles are released when their owner is dropped, so every exit path
//! (including `?` on an error) closes whatever was opened so far. A view
//! borrows the database it was opened from, and [`Database::commit`] takes
//! `&mut self`, so a commit can only happen once all views are gone.
//!
//! # Example
//!
//! ```ignore
//! use msiq_engine::{Database, Installer, OpenMode, View, system_installer};
//!
//! let installer = system_installer()?;
//! let db = installer.open_database("setup.msi".as_ref(), OpenMode::ReadOnly)?;
//! let mut view = db.open_view("SELECT * FROM Property")?;
//! view.execute()?;
//! while let Some(row) = view.fetch()? {
//!     println!("{row:?}");
//! }
//! ```

mod error;
mod transform;
mod types;
mod unavailable;
#[cfg(windows)]
mod windows;

use std::path::Path;

pub use error::{Error, Result, describe_error_code};
pub use transform::{ErrorCondition, TransformFlags, Validation};
pub use types::{Column, OpenMode, Row};
pub use unavailable::NoEngine;
#[cfg(windows)]
pub use windows::{WindowsDatabase, WindowsInstaller, WindowsView};

/// Entry point into an installer engine.
pub trait Installer {
    type Database: Database;

    /// Open the package at `path`.
    ///
    /// [`OpenMode::Transact`] databases keep changes pending until
    /// [`Database::commit`]; dropping without committing discards them.
    fn open_database(&self, path: &Path, mode: OpenMode) -> Result<Self::Database>;
}

/// An open package.
pub trait Database: Sized {
    type View<'db>: View
    where
        Self: 'db;

    /// Path the database was opened from.
    fn path(&self) -> &Path;

    /// Whether `table` exists as a persistent table.
    fn table_exists(&self, table: &str) -> Result<bool>;

    /// Compile `query` into a view. Syntax errors surface here.
    fn open_view(&self, query: &str) -> Result<Self::View<'_>>;

    /// Persist pending changes of a transacted database.
    fn commit(&mut self) -> Result<()>;

    /// Write a transform that turns `reference` into `self`.
    ///
    /// Fails with [`Error::NoChanges`] when both databases hold the same
    /// data; no file is written in that case.
    fn generate_transform(&self, reference: &Self, output: &Path) -> Result<()>;

    /// Attach summary information to a transform produced by
    /// [`Database::generate_transform`].
    fn create_transform_summary(
        &self,
        reference: &Self,
        output: &Path,
        flags: &TransformFlags,
    ) -> Result<()>;
}

/// A compiled query.
pub trait View {
    /// Run the query. Statements that modify data take effect here.
    fn execute(&mut self) -> Result<()>;

    /// Column metadata, in result order.
    fn columns(&self) -> Result<Vec<Column>>;

    /// Next result row, or `None` once the view is exhausted.
    fn fetch(&mut self) -> Result<Option<Row>>;
}

/// The installer engine of the running system.
#[cfg(windows)]
pub type SystemInstaller = WindowsInstaller;

/// The installer engine of the running system.
#[cfg(not(windows))]
pub type SystemInstaller = NoEngine;

/// Acquire the installer engine of the running system.
#[cfg(windows)]
pub fn system_installer() -> Result<SystemInstaller> {
    Ok(WindowsInstaller::new())
}

/// Acquire the installer engine of the running system.
///
/// Only Windows ships one, so this always fails elsewhere.
#[cfg(not(windows))]
pub fn system_installer() -> Result<SystemInstaller> {
    Err(Error::Unavailable(format!(
        "the Windows Installer engine is not available on {}",
        std::env::consts::OS
    )))
}
