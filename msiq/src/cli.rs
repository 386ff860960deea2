// SPDX-FileCopyrightText: 2026 msiq contributors
// SPDX-License-Identifier: MIT

//! Command line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use msiq_engine::{ErrorCondition, TransformFlags, Validation};
use msiq_query::{Insert, Select, Update};

use crate::config::Config;
use crate::ops::Command;
use crate::output::Format;

/// Query, edit and diff Windows Installer packages
#[derive(Parser, Debug)]
#[command(name = "msiq", version, long_about = None)]
#[command(after_help = "ENVIRONMENT:
    MSIQ_CONFIG    Configuration file (default: ./msiq.toml if present)
    RUST_LOG       Log filter (default: warn)")]
pub struct Cli {
    /// Output format [default: from the configuration, else table]
    #[arg(short, long, global = true, value_enum)]
    pub format: Option<Format>,

    /// Print the statement instead of running it
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand, Debug)]
pub enum Action {
    /// Print the rows of a table
    Read {
        /// Package to read
        msi: PathBuf,

        /// Table to read
        table: String,

        /// Condition appended as a WHERE clause
        #[arg(long = "where", value_name = "FILTER", allow_hyphen_values = true)]
        filter: Option<String>,
    },

    /// Set one column of the row matching a primary key
    Update {
        /// Package to modify
        msi: PathBuf,

        table: String,

        column: String,

        /// New value, quoted into the statement as is
        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Primary key column and the value identifying the row
        #[arg(
            long,
            required = true,
            num_args = 2,
            value_names = ["KEY", "KEY_VALUE"],
            action = ArgAction::Set,
            allow_hyphen_values = true
        )]
        key: Vec<String>,
    },

    /// Add a row to a table
    Insert {
        /// Package to modify
        msi: PathBuf,

        table: String,

        /// Column list, e.g. "Property,Value"
        #[arg(allow_hyphen_values = true)]
        columns: String,

        /// Value list, e.g. "'ALLUSERS','1'"
        #[arg(allow_hyphen_values = true)]
        values: String,
    },

    /// Generate a transform that turns BASE into UPDATED
    Transform {
        /// Package with the changes
        updated: PathBuf,

        /// Package the transform applies to
        base: PathBuf,

        /// Transform file [default: UPDATED with an .mst extension]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Error conditions to suppress when applying the transform
        #[arg(long, value_delimiter = ',', value_name = "CONDITION")]
        suppress: Option<Vec<ErrorCondition>>,

        /// Properties checked before applying the transform
        #[arg(long, value_delimiter = ',', value_name = "CHECK")]
        validate: Option<Vec<Validation>>,
    },

    /// List the persistent tables of a package
    Tables {
        /// Package to inspect
        msi: PathBuf,
    },
}

/// A fully resolved command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub format: Format,
    pub dry_run: bool,
    pub command: Command,
}

impl Cli {
    /// Resolve the command line. Options not given fall back to `config`.
    pub fn into_invocation(self, config: &Config) -> Invocation {
        let command = match self.action {
            Action::Read { msi, table, filter } => {
                let mut select = Select::new(table);
                if let Some(filter) = filter {
                    select = select.filter(filter);
                }
                Command::Read {
                    database: msi,
                    select,
                }
            }
            Action::Update {
                msi,
                table,
                column,
                value,
                key,
            } => {
                let mut key = key.into_iter();
                Command::Update {
                    database: msi,
                    update: Update {
                        table,
                        column,
                        value,
                        key: key.next().unwrap_or_default(),
                        key_value: key.next().unwrap_or_default(),
                    },
                }
            }
            Action::Insert {
                msi,
                table,
                columns,
                values,
            } => Command::Insert {
                database: msi,
                insert: Insert {
                    table,
                    columns,
                    values,
                },
            },
            Action::Transform {
                updated,
                base,
                output,
                suppress,
                validate,
            } => Command::Transform {
                updated,
                base,
                output,
                flags: TransformFlags {
                    suppress: suppress.unwrap_or_else(|| config.transform.suppress.clone()),
                    validate: validate.unwrap_or_else(|| config.transform.validate.clone()),
                },
            },
            Action::Tables { msi } => Command::Tables { database: msi },
        };

        Invocation {
            format: self.format.unwrap_or(config.format),
            dry_run: self.dry_run,
            command,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use clap::error::ErrorKind;
    use rstest::rstest;

    use super::*;

    fn parse(line: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("msiq").chain(line.iter().copied()))
    }

    fn run(line: &[&str]) -> Invocation {
        parse(line)
            .unwrap_or_else(|e| panic!("{line:?} did not parse: {e}"))
            .into_invocation(&Config::default())
    }

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn read_with_filter() {
        let invocation = run(&["read", "setup.msi", "Property", "--where", "Property='ALLUSERS'"]);
        assert_eq!(invocation.format, Format::Table);
        assert!(!invocation.dry_run);
        assert_eq!(
            invocation.command,
            Command::Read {
                database: "setup.msi".into(),
                select: Select::new("Property").filter("Property='ALLUSERS'"),
            }
        );
    }

    #[rstest]
    #[case(&["tables", "-n", "setup.msi", "--format", "json"])]
    #[case(&["--format=json", "tables", "setup.msi", "--dry-run"])]
    #[case(&["-n", "-f", "json", "tables", "setup.msi"])]
    fn global_options_anywhere(#[case] line: &[&str]) {
        let invocation = run(line);
        assert_eq!(invocation.format, Format::Json);
        assert!(invocation.dry_run);
        assert_eq!(
            invocation.command,
            Command::Tables {
                database: "setup.msi".into()
            }
        );
    }

    #[rstest]
    #[case("2.0.0")]
    #[case("-rc1")]
    #[case("-1")]
    fn update_with_key(#[case] value: &str) {
        let invocation = run(&[
            "update",
            "setup.msi",
            "Property",
            "Value",
            value,
            "--key",
            "Property",
            "ProductVersion",
        ]);
        assert_eq!(
            invocation.command,
            Command::Update {
                database: "setup.msi".into(),
                update: Update {
                    table: "Property".into(),
                    column: "Value".into(),
                    value: value.into(),
                    key: "Property".into(),
                    key_value: "ProductVersion".into(),
                },
            }
        );
    }

    #[test]
    fn key_value_may_start_with_a_hyphen() {
        let invocation = run(&[
            "update", "setup.msi", "Media", "Cabinet", "x.cab", "--key", "DiskId", "-1",
        ]);
        let Command::Update { update, .. } = invocation.command else {
            panic!("expected an update");
        };
        assert_eq!(update.key, "DiskId");
        assert_eq!(update.key_value, "-1");
    }

    #[test]
    fn insert_negative_value() {
        let invocation = run(&["insert", "setup.msi", "Media", "DiskId,LastSequence", "-1"]);
        assert_eq!(
            invocation.command,
            Command::Insert {
                database: "setup.msi".into(),
                insert: Insert {
                    table: "Media".into(),
                    columns: "DiskId,LastSequence".into(),
                    values: "-1".into(),
                },
            }
        );
    }

    #[test]
    fn transform_flags_from_command_line() {
        let invocation = run(&[
            "transform",
            "new.msi",
            "old.msi",
            "--output",
            "diff.mst",
            "--suppress",
            "add-existing-row,update-missing-row",
            "--validate",
            "product",
        ]);
        assert_eq!(
            invocation.command,
            Command::Transform {
                updated: "new.msi".into(),
                base: "old.msi".into(),
                output: Some("diff.mst".into()),
                flags: TransformFlags {
                    suppress: vec![ErrorCondition::AddExistingRow, ErrorCondition::UpdateMissingRow],
                    validate: vec![Validation::Product],
                },
            }
        );
    }

    #[test]
    fn config_supplies_defaults() {
        let config = Config {
            format: Format::Json,
            transform: TransformFlags {
                suppress: vec![ErrorCondition::ChangeCodepage],
                validate: vec![Validation::Language],
            },
        };
        let invocation = parse(&["transform", "new.msi", "old.msi"])
            .unwrap()
            .into_invocation(&config);
        assert_eq!(invocation.format, Format::Json);
        let Command::Transform { flags, output, .. } = invocation.command else {
            panic!("expected a transform");
        };
        assert_eq!(flags, config.transform);
        assert_eq!(output, None);
    }

    #[test]
    fn command_line_overrides_config() {
        let config = Config {
            format: Format::Json,
            transform: TransformFlags {
                suppress: vec![ErrorCondition::ChangeCodepage],
                validate: Vec::new(),
            },
        };
        let invocation = parse(&[
            "-f",
            "table",
            "transform",
            "a.msi",
            "b.msi",
            "--suppress",
            "view-transform",
        ])
        .unwrap()
        .into_invocation(&config);
        assert_eq!(invocation.format, Format::Table);
        let Command::Transform { flags, .. } = invocation.command else {
            panic!("expected a transform");
        };
        assert_eq!(flags.suppress, vec![ErrorCondition::ViewTransform]);
    }

    #[rstest]
    #[case(&["--help"], ErrorKind::DisplayHelp)]
    #[case(&["read", "-h"], ErrorKind::DisplayHelp)]
    #[case(&["-V"], ErrorKind::DisplayVersion)]
    fn early_exits(#[case] line: &[&str], #[case] kind: ErrorKind) {
        let err = parse(line).unwrap_err();
        assert_eq!(err.kind(), kind);
        assert_eq!(err.exit_code(), 0);
    }

    #[rstest]
    #[case(&[])]
    #[case(&["drop", "setup.msi"])]
    #[case(&["read", "setup.msi"])]
    #[case(&["tables", "setup.msi", "--where", "x"])]
    #[case(&["update", "a.msi", "T", "C", "V"])]
    #[case(&["update", "a.msi", "T", "C", "V", "--key", "K"])]
    #[case(&["update", "a.msi", "T", "C", "V", "--key", "K", "1", "--key", "L", "2"])]
    #[case(&["read", "a.msi", "T", "--bogus"])]
    #[case(&["--format", "xml", "tables", "a.msi"])]
    #[case(&["transform", "a.msi", "b.msi", "--suppress", "nothing"])]
    #[case(&["transform", "a.msi", "b.msi", "--validate", "product,colour"])]
    fn usage_errors(#[case] line: &[&str]) {
        let err = parse(line).unwrap_err();
        assert_eq!(err.exit_code(), 2, "{line:?}: {err}");
    }
}
