// SPDX-FileCopyrightText: 2026 msiq contributors
// SPDX-License-Identifier: MIT

//! Engine stand-in for platforms without Windows Installer.

use std::path::Path;

use crate::error::Result;
use crate::transform::TransformFlags;
use crate::types::{Column, OpenMode, Row};
use crate::{Database, Installer, View};

/// An engine that cannot exist.
///
/// [`crate::system_installer`] never returns a value of this type; it only
/// gives non-Windows builds a concrete [`crate::SystemInstaller`].
#[derive(Debug)]
pub enum NoEngine {}

impl Installer for NoEngine {
    type Database = NoEngine;

    fn open_database(&self, _path: &Path, _mode: OpenMode) -> Result<Self::Database> {
        match *self {}
    }
}

impl Database for NoEngine {
    type View<'db> = NoEngine;

    fn path(&self) -> &Path {
        match *self {}
    }

    fn table_exists(&self, _table: &str) -> Result<bool> {
        match *self {}
    }

    fn open_view(&self, _query: &str) -> Result<Self::View<'_>> {
        match *self {}
    }

    fn commit(&mut self) -> Result<()> {
        match *self {}
    }

    fn generate_transform(&self, _reference: &Self, _output: &Path) -> Result<()> {
        match *self {}
    }

    fn create_transform_summary(
        &self,
        _reference: &Self,
        _output: &Path,
        _flags: &TransformFlags,
    ) -> Result<()> {
        match *self {}
    }
}

impl View for NoEngine {
    fn execute(&mut self) -> Result<()> {
        match *self {}
    }

    fn columns(&self) -> Result<Vec<Column>> {
        match *self {}
    }

    fn fetch(&mut self) -> Result<Option<Row>> {
        match *self {}
    }
}
