// SPDX-FileCopyrightText: 2026 msiq contributors
// SPDX-License-Identifier: MIT

//! Rendering of command outcomes.

use std::io::Write;

use clap::ValueEnum;
use serde::Deserialize;
use serde_json::json;

use crate::error::{IoContext, Result};
use crate::ops::Outcome;
use crate::record::ResultSet;

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Aligned text columns
    #[default]
    Table,
    /// JSON document
    Json,
}

/// Write `outcome` to `out`. Successful writes print nothing.
pub fn render<W: Write>(outcome: &Outcome, format: Format, out: &mut W) -> Result<()> {
    match format {
        Format::Json => render_json(outcome, out),
        Format::Table => render_text(outcome, out),
    }
}

fn render_json<W: Write>(outcome: &Outcome, out: &mut W) -> Result<()> {
    let value = match outcome {
        Outcome::Applied => return Ok(()),
        Outcome::DryRun(query) => json!({ "dry_run": query }),
        Outcome::Records(set) => serde_json::to_value(&set.records)?,
        Outcome::Tables(names) => json!(names),
        Outcome::Transform { path } => json!({ "transform": path }),
    };
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out).io_context(|| "Failed to write output".to_string())
}

fn render_text<W: Write>(outcome: &Outcome, out: &mut W) -> Result<()> {
    let text = match outcome {
        Outcome::Applied => return Ok(()),
        Outcome::DryRun(query) => format!("{query}\n"),
        Outcome::Records(set) => table(set),
        Outcome::Tables(names) => names.iter().map(|n| format!("{n}\n")).collect(),
        Outcome::Transform { path } => format!("{}\n", path.display()),
    };
    out.write_all(text.as_bytes())
        .io_context(|| "Failed to write output".to_string())
}

/// Aligned table with a header row, printed even when no rows matched.
/// Nulls print as empty cells.
fn table(set: &ResultSet) -> String {
    let mut widths: Vec<usize> = set.columns.iter().map(|h| h.chars().count()).collect();
    for record in &set.records {
        for (width, value) in widths.iter_mut().zip(record.values()) {
            *width = (*width).max(value.unwrap_or_default().chars().count());
        }
    }

    let mut text = String::new();
    push_line(&mut text, set.columns.iter().map(String::as_str), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut text, rule.iter().map(String::as_str), &widths);
    for record in &set.records {
        push_line(&mut text, record.values().map(Option::unwrap_or_default), &widths);
    }
    text
}

fn push_line<'a>(text: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    text.push_str(line.trim_end());
    text.push('\n');
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use msiq_engine::Column;

    use super::*;
    use crate::record::Record;

    fn columns() -> Vec<Column> {
        [("Property", "s72"), ("Value", "L0")]
            .into_iter()
            .zip(1..)
            .map(|((name, ty), index)| Column {
                index,
                name: name.into(),
                ty: ty.into(),
            })
            .collect()
    }

    fn records() -> ResultSet {
        let columns = columns();
        let mut set = ResultSet::new(&columns);
        set.records = vec![
            Record::new(&columns, vec![Some("ProductName".into()), Some("Demo".into())]),
            Record::new(&columns, vec![Some("ALLUSERS".into()), None]),
        ];
        set
    }

    fn rendered(outcome: &Outcome, format: Format) -> String {
        let mut out = Vec::new();
        render(outcome, format, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn text_table() {
        assert_eq!(
            rendered(&Outcome::Records(records()), Format::Table),
            "Property     Value\n\
             -----------  -----\n\
             ProductName  Demo\n\
             ALLUSERS\n"
        );
    }

    #[test]
    fn json_records() {
        let json: serde_json::Value =
            serde_json::from_str(&rendered(&Outcome::Records(records()), Format::Json)).unwrap();
        assert_eq!(
            json,
            json!([
                { "Property": "ProductName", "Value": "Demo" },
                { "Property": "ALLUSERS", "Value": null },
            ])
        );
    }

    #[test]
    fn writes_print_nothing() {
        assert_eq!(rendered(&Outcome::Applied, Format::Table), "");
        assert_eq!(rendered(&Outcome::Applied, Format::Json), "");
    }

    #[test]
    fn transform_path() {
        let outcome = Outcome::Transform {
            path: PathBuf::from("patch.mst"),
        };
        assert_eq!(rendered(&outcome, Format::Table), "patch.mst\n");
    }

    #[test]
    fn empty_read_prints_header() {
        let empty = Outcome::Records(ResultSet::new(&columns()));
        assert_eq!(
            rendered(&empty, Format::Table),
            "Property  Value\n\
             --------  -----\n"
        );
        assert_ne!(rendered(&empty, Format::Table), rendered(&Outcome::Applied, Format::Table));
        assert_eq!(rendered(&empty, Format::Json), "[]\n");
    }
}
