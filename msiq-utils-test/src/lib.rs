// SPDX-FileCopyrightText: 2026 msiq contributors
// SPDX-License-Identifier: MIT

//! Test utilities for msiq.
//!
//! [`FakeInstaller`] implements the installer engine contract in memory. It
//! does not understand queries: results are scripted per query string, and
//! failures can be injected at any [`Step`]. Every call is recorded and live
//! handles are counted, so tests can assert both the call sequence and that
//! every handle was released.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use msiq_engine::{Column, Database, Error, Installer, OpenMode, Result, Row, TransformFlags, View};
use tempfile::TempDir;

/// Engine call at which a failure can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    OpenDatabase,
    TableExists,
    OpenView,
    Execute,
    Columns,
    Fetch,
    Commit,
    GenerateTransform,
    CreateTransformSummary,
}

impl Step {
    fn call(self) -> &'static str {
        match self {
            Step::OpenDatabase => "MsiOpenDatabase",
            Step::TableExists => "MsiDatabaseIsTablePersistent",
            Step::OpenView => "MsiDatabaseOpenView",
            Step::Execute => "MsiViewExecute",
            Step::Columns => "MsiViewGetColumnInfo",
            Step::Fetch => "MsiViewFetch",
            Step::Commit => "MsiDatabaseCommit",
            Step::GenerateTransform => "MsiDatabaseGenerateTransform",
            Step::CreateTransformSummary => "MsiCreateTransformSummaryInfo",
        }
    }
}

/// A recorded engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    OpenDatabase(PathBuf, OpenMode),
    TableExists(String),
    OpenView(String),
    Execute(String),
    Columns(String),
    Fetch(String),
    Commit(PathBuf),
    GenerateTransform(PathBuf),
    CreateTransformSummary { error_bits: i32, validation_bits: i32 },
    CloseView(String),
    CloseDatabase(PathBuf),
}

#[derive(Debug, Default)]
struct State {
    tables: BTreeSet<String>,
    results: HashMap<String, (Vec<Column>, Vec<Row>)>,
    failures: HashMap<Step, u32>,
    calls: Vec<Call>,
    live_handles: usize,
}

impl State {
    fn step(&mut self, step: Step, call: Call) -> Result<()> {
        self.calls.push(call);
        match self.failures.get(&step) {
            Some(&code) => Err(Error::call(step.call(), code)),
            None => Ok(()),
        }
    }
}

/// Scripted, in-memory installer engine.
///
/// Clones share state, so a test can keep one clone for assertions and hand
/// another to the code under test.
#[derive(Debug, Clone, Default)]
pub struct FakeInstaller {
    state: Rc<RefCell<State>>,
}

impl FakeInstaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `table` as existing in every database.
    pub fn with_table(self, table: &str) -> Self {
        self.state.borrow_mut().tables.insert(table.to_owned());
        self
    }

    /// Serve `rows` with `columns` for `query`. `columns` pairs a name with
    /// an engine type descriptor.
    pub fn with_result(self, query: &str, columns: &[(&str, &str)], rows: Vec<Row>) -> Self {
        let columns = columns
            .iter()
            .zip(1..)
            .map(|(&(name, ty), index)| Column {
                index,
                name: name.to_owned(),
                ty: ty.to_owned(),
            })
            .collect();
        self.state
            .borrow_mut()
            .results
            .insert(query.to_owned(), (columns, rows));
        self
    }

    /// Fail every call at `step` with engine error `code`.
    pub fn fail_at(self, step: Step, code: u32) -> Self {
        self.state.borrow_mut().failures.insert(step, code);
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Database and view handles not yet released.
    pub fn live_handles(&self) -> usize {
        self.state.borrow().live_handles
    }

    /// Whether any call reached the engine.
    pub fn was_used(&self) -> bool {
        !self.state.borrow().calls.is_empty()
    }

    fn open(&self) {
        self.state.borrow_mut().live_handles += 1;
    }

    fn close(&self, call: Call) {
        let mut state = self.state.borrow_mut();
        state.live_handles -= 1;
        state.calls.push(call);
    }
}

impl Installer for FakeInstaller {
    type Database = FakeDatabase;

    fn open_database(&self, path: &Path, mode: OpenMode) -> Result<FakeDatabase> {
        self.state
            .borrow_mut()
            .step(Step::OpenDatabase, Call::OpenDatabase(path.to_owned(), mode))?;
        if !path.exists() {
            return Err(Error::call(Step::OpenDatabase.call(), 110));
        }
        self.open();
        Ok(FakeDatabase {
            engine: self.clone(),
            path: path.to_owned(),
            mode,
        })
    }
}

/// Database handle of a [`FakeInstaller`].
#[derive(Debug)]
pub struct FakeDatabase {
    engine: FakeInstaller,
    path: PathBuf,
    mode: OpenMode,
}

impl Drop for FakeDatabase {
    fn drop(&mut self) {
        self.engine.close(Call::CloseDatabase(self.path.clone()));
    }
}

impl Database for FakeDatabase {
    type View<'db> = FakeView<'db>;

    fn path(&self) -> &Path {
        &self.path
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let mut state = self.engine.state.borrow_mut();
        state.step(Step::TableExists, Call::TableExists(table.to_owned()))?;
        Ok(state.tables.contains(table))
    }

    fn open_view(&self, query: &str) -> Result<FakeView<'_>> {
        self.engine
            .state
            .borrow_mut()
            .step(Step::OpenView, Call::OpenView(query.to_owned()))?;
        self.engine.open();
        Ok(FakeView {
            database: self,
            query: query.to_owned(),
            executed: false,
            cursor: 0,
        })
    }

    fn commit(&mut self) -> Result<()> {
        self.engine
            .state
            .borrow_mut()
            .step(Step::Commit, Call::Commit(self.path.clone()))?;
        if self.mode == OpenMode::ReadOnly {
            return Err(Error::call(Step::Commit.call(), 1627));
        }
        Ok(())
    }

    fn generate_transform(&self, reference: &Self, output: &Path) -> Result<()> {
        self.engine
            .state
            .borrow_mut()
            .step(Step::GenerateTransform, Call::GenerateTransform(output.to_owned()))?;
        let io_failure = |_| Error::call(Step::GenerateTransform.call(), 110);
        let updated = fs::read(&self.path).map_err(io_failure)?;
        let base = fs::read(&reference.path).map_err(io_failure)?;
        if updated == base {
            return Err(Error::NoChanges {
                updated: self.path.clone(),
                reference: reference.path.clone(),
            });
        }
        fs::write(output, updated).map_err(|_| Error::call(Step::GenerateTransform.call(), 1631))
    }

    fn create_transform_summary(
        &self,
        _reference: &Self,
        _output: &Path,
        flags: &TransformFlags,
    ) -> Result<()> {
        self.engine.state.borrow_mut().step(
            Step::CreateTransformSummary,
            Call::CreateTransformSummary {
                error_bits: flags.error_bits(),
                validation_bits: flags.validation_bits(),
            },
        )
    }
}

/// View handle of a [`FakeInstaller`].
#[derive(Debug)]
pub struct FakeView<'db> {
    database: &'db FakeDatabase,
    query: String,
    executed: bool,
    cursor: usize,
}

impl FakeView<'_> {
    fn engine(&self) -> &FakeInstaller {
        &self.database.engine
    }
}

impl Drop for FakeView<'_> {
    fn drop(&mut self) {
        self.engine().close(Call::CloseView(self.query.clone()));
    }
}

impl View for FakeView<'_> {
    fn execute(&mut self) -> Result<()> {
        self.engine()
            .state
            .borrow_mut()
            .step(Step::Execute, Call::Execute(self.query.clone()))?;
        let writes = self.query.starts_with("UPDATE") || self.query.starts_with("INSERT");
        if writes && self.database.mode == OpenMode::ReadOnly {
            return Err(Error::call(Step::Execute.call(), 1627));
        }
        self.executed = true;
        Ok(())
    }

    fn columns(&self) -> Result<Vec<Column>> {
        let mut state = self.engine().state.borrow_mut();
        state.step(Step::Columns, Call::Columns(self.query.clone()))?;
        Ok(state
            .results
            .get(&self.query)
            .map(|(columns, _)| columns.clone())
            .unwrap_or_default())
    }

    fn fetch(&mut self) -> Result<Option<Row>> {
        let database = self.database;
        let mut state = database.engine.state.borrow_mut();
        state.step(Step::Fetch, Call::Fetch(self.query.clone()))?;
        if !self.executed {
            return Err(Error::call(Step::Fetch.call(), 6));
        }
        let row = state
            .results
            .get(&self.query)
            .and_then(|(_, rows)| rows.get(self.cursor))
            .cloned();
        if row.is_some() {
            self.cursor += 1;
        }
        Ok(row)
    }
}

/// Temporary directory holding stand-in package files.
///
/// The fake engine only needs the files to exist; transform generation
/// compares their bytes.
pub struct Packages {
    dir: TempDir,
}

impl Packages {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Write a package file named `name` with `contents`.
    pub fn create(&self, name: &str, contents: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Path of `name` inside the directory, without creating it.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
