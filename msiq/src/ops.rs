// SPDX-FileCopyrightText: 2026 msiq contributors
// SPDX-License-Identifier: MIT

//! Package operations.
//!
//! Each operation runs in the same order: check that every input file
//! exists, acquire the engine, open the database(s), do the work, and let the
//! handles drop. A dry run stops after the file checks and only reports what
//! would be sent to the engine.

use std::path::{Path, PathBuf};

use msiq_engine::{Database, Installer, OpenMode, TransformFlags, View};
use msiq_query::{Insert, LIST_TABLES, Query, Select, Update};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{Record, ResultSet};

/// A single operation on one or two packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch the rows of a table
    Read { database: PathBuf, select: Select },
    /// Change one column of the row matching a primary key
    Update { database: PathBuf, update: Update },
    /// Add a row
    Insert { database: PathBuf, insert: Insert },
    /// Diff `updated` against `base` into a transform file
    Transform {
        updated: PathBuf,
        base: PathBuf,
        output: Option<PathBuf>,
        flags: TransformFlags,
    },
    /// List the persistent tables of a package
    Tables { database: PathBuf },
}

/// What a [`Command`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text that a dry run would have handed to the engine
    DryRun(String),
    Records(ResultSet),
    Tables(Vec<String>),
    /// A write statement was executed and committed
    Applied,
    /// A transform was written to `path`
    Transform { path: PathBuf },
}

impl Command {
    /// Package files the command reads.
    pub fn inputs(&self) -> Vec<&Path> {
        match self {
            Command::Read { database, .. }
            | Command::Update { database, .. }
            | Command::Insert { database, .. }
            | Command::Tables { database } => vec![database.as_path()],
            Command::Transform { updated, base, .. } => vec![updated.as_path(), base.as_path()],
        }
    }

    /// Statement sent to the engine, if the command runs one.
    pub fn query(&self) -> Option<Query> {
        match self {
            Command::Read { select, .. } => Some(select.clone().into()),
            Command::Update { update, .. } => Some(update.clone().into()),
            Command::Insert { insert, .. } => Some(insert.clone().into()),
            Command::Tables { .. } => Some(Query::ListTables),
            Command::Transform { .. } => None,
        }
    }

    /// Human readable description for dry runs.
    pub fn describe(&self) -> String {
        match self {
            Command::Transform {
                updated,
                base,
                output,
                flags,
            } => {
                let output = transform_path(updated, output.as_deref());
                format!(
                    "GENERATE TRANSFORM {} FROM {} TO {} (error conditions 0x{:04x}, validation 0x{:04x})",
                    output.display(),
                    base.display(),
                    updated.display(),
                    flags.error_bits(),
                    flags.validation_bits(),
                )
            }
            _ => self.query().map(|q| q.to_string()).unwrap_or_default(),
        }
    }
}

/// Transform path used when none is given: the updated package with an
/// `.mst` extension.
pub fn transform_path(updated: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(output) => output.to_owned(),
        None => updated.with_extension("mst"),
    }
}

/// Run `command`, acquiring the engine through `connect`.
///
/// Input files are checked first, also for a dry run. `connect` is only
/// called once they are all known to exist, and never for a dry run.
pub fn execute<I, F>(command: &Command, dry_run: bool, connect: F) -> Result<Outcome>
where
    I: Installer,
    F: FnOnce() -> msiq_engine::Result<I>,
{
    for input in command.inputs() {
        if !input.is_file() {
            return Err(Error::NotFound(input.to_owned()));
        }
    }

    if dry_run {
        return Ok(Outcome::DryRun(command.describe()));
    }

    let installer = connect()?;
    match command {
        Command::Read { database, select } => {
            let db = installer.open_database(database, OpenMode::ReadOnly)?;
            read(&db, select).map(Outcome::Records)
        }
        Command::Update { database, update } => {
            let db = installer.open_database(database, OpenMode::Transact)?;
            apply(db, &update.clone().into()).map(|()| Outcome::Applied)
        }
        Command::Insert { database, insert } => {
            let db = installer.open_database(database, OpenMode::Transact)?;
            apply(db, &insert.clone().into()).map(|()| Outcome::Applied)
        }
        Command::Tables { database } => {
            let db = installer.open_database(database, OpenMode::ReadOnly)?;
            tables(&db).map(Outcome::Tables)
        }
        Command::Transform {
            updated,
            base,
            output,
            flags,
        } => {
            let output = transform_path(updated, output.as_deref());
            transform(&installer, updated, base, &output, flags)?;
            Ok(Outcome::Transform { path: output })
        }
    }
}

fn ensure_table<D: Database>(db: &D, table: &str) -> Result<()> {
    if db.table_exists(table)? {
        Ok(())
    } else {
        Err(Error::TableNotFound {
            table: table.to_owned(),
            database: db.path().to_owned(),
        })
    }
}

/// Fetch every row matched by `select`.
pub fn read<D: Database>(db: &D, select: &Select) -> Result<ResultSet> {
    ensure_table(db, &select.table)?;

    let query = select.to_string();
    let mut view = db.open_view(&query)?;
    view.execute()?;
    let columns = view.columns()?;

    let mut set = ResultSet::new(&columns);
    while let Some(row) = view.fetch()? {
        set.records.push(Record::new(&columns, row));
    }
    debug!("{} rows from {}", set.records.len(), select.table);
    Ok(set)
}

/// Execute a write statement and commit it.
///
/// `db` must be opened with [`OpenMode::Transact`]; on any failure it is
/// dropped uncommitted.
pub fn apply<D: Database>(mut db: D, query: &Query) -> Result<()> {
    ensure_table(&db, query.table())?;
    {
        let mut view = db.open_view(&query.to_string())?;
        view.execute()?;
    }
    db.commit()?;
    info!("Applied to {}: {query}", db.path().display());
    Ok(())
}

/// Names of the persistent tables.
pub fn tables<D: Database>(db: &D) -> Result<Vec<String>> {
    let mut view = db.open_view(LIST_TABLES)?;
    view.execute()?;

    let mut names = Vec::new();
    while let Some(row) = view.fetch()? {
        if let Some(Some(name)) = row.into_iter().next() {
            names.push(name);
        }
    }
    Ok(names)
}

/// Generate a transform from `base` to `updated` at `output`, then write its
/// summary information.
pub fn transform<I: Installer>(
    installer: &I,
    updated: &Path,
    base: &Path,
    output: &Path,
    flags: &TransformFlags,
) -> Result<()> {
    let updated_db = installer.open_database(updated, OpenMode::ReadOnly)?;
    let base_db = installer.open_database(base, OpenMode::ReadOnly)?;

    updated_db.generate_transform(&base_db, output)?;
    updated_db.create_transform_summary(&base_db, output, flags)?;
    info!("Wrote transform to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn select(table: &str, filter: &str) -> Select {
        Select::new(table).filter(filter)
    }

    #[rstest]
    #[case(
        Command::Read { database: "a.msi".into(), select: select("File", "") },
        "SELECT * FROM File"
    )]
    #[case(
        Command::Read { database: "a.msi".into(), select: select("File", "FileSize > 0") },
        "SELECT * FROM File WHERE FileSize > 0"
    )]
    #[case(
        Command::Tables { database: "a.msi".into() },
        "SELECT `Name` FROM `_Tables`"
    )]
    #[case(
        Command::Transform {
            updated: "dir/new.msi".into(),
            base: "old.msi".into(),
            output: None,
            flags: TransformFlags::default(),
        },
        "GENERATE TRANSFORM dir/new.mst FROM old.msi TO dir/new.msi (error conditions 0x0000, validation 0x0000)"
    )]
    fn describe(#[case] command: Command, #[case] expected: &str) {
        assert_eq!(command.describe(), expected);
    }

    #[test]
    fn explicit_transform_path_wins() {
        assert_eq!(
            transform_path(Path::new("new.msi"), Some(Path::new("out/custom.mst"))),
            PathBuf::from("out/custom.mst")
        );
        assert_eq!(
            transform_path(Path::new("new.msi"), None),
            PathBuf::from("new.mst")
        );
    }

    #[test]
    fn transform_reads_both_inputs() {
        let command = Command::Transform {
            updated: "new.msi".into(),
            base: "old.msi".into(),
            output: None,
            flags: TransformFlags::default(),
        };
        assert_eq!(
            command.inputs(),
            vec![Path::new("new.msi"), Path::new("old.msi")]
        );
        assert_eq!(command.query(), None);
    }
}
