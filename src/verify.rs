//! Post-load checks: row counts, primary keys, referential integrity and
//! date corrections

use serde::Serialize;
use std::path::Path;

use crate::error::Result;
use crate::parser::read_table_csv;
use crate::schema::{get_table, DependencyResolver};
use crate::ui::{Phase, Ui};
use crate::writer::schema_gen::*;
use crate::writer::{Introspect, LoadOptions};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl Check {
    fn new(name: String, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifyReport {
    pub checks: Vec<Check>,
}

impl VerifyReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed)
    }

    fn push(&mut self, check: Check, ui: &mut impl Ui) {
        if check.passed {
            ui.log(format!("ok   {}", check.name));
        } else {
            ui.log(format!("warning: FAIL {}: {}", check.name, check.detail));
        }
        self.checks.push(check);
    }
}

/// Compare a loaded schema against its CSV sources and declarations.
///
/// Query failures (e.g. a missing table) become failed checks; only
/// unreadable CSV input is an error.
pub fn verify_schema<D: Introspect>(
    db: &mut D,
    input_dir: &Path,
    options: &LoadOptions,
    ui: &mut impl Ui,
) -> Result<VerifyReport> {
    ui.set_phase(Phase::Verifying);
    let schema = options.schema.as_str();
    let tables = DependencyResolver::new().load_order()?;
    let mut report = VerifyReport::default();

    for (i, table) in tables.iter().enumerate() {
        ui.set_progress(i as u64, tables.len() as u64, table.name);

        let expected = read_table_csv(table, input_dir)?.len() as i64;
        let name = format!("{}: row count", table.name);
        let check = match db.query_count(&generate_count(schema, table.name)) {
            Ok(actual) => Check::new(
                name,
                actual == expected,
                format!("{} rows, CSV has {}", actual, expected),
            ),
            Err(e) => Check::new(name, false, e.to_string()),
        };
        report.push(check, ui);

        let name = format!("{}: primary key", table.name);
        let check = match db.query_texts(&generate_primary_key_query(schema, table.name)) {
            Ok(columns) => {
                let columns: Vec<String> = columns.into_iter().flatten().collect();
                let declared: Vec<&str> = table.primary_key.to_vec();
                Check::new(
                    name,
                    columns == declared,
                    format!("({}), declared ({})", columns.join(", "), declared.join(", ")),
                )
            }
            Err(e) => Check::new(name, false, e.to_string()),
        };
        report.push(check, ui);
    }
    ui.clear_progress();

    for table in &tables {
        for fk in table.foreign_keys {
            let parent_key = get_table(fk.references_table)
                .and_then(|p| p.primary_key.first().copied())
                .unwrap_or("id");
            let name = format!("{}: {} references {}", table.name, fk.column, fk.references_table);
            let check = match db.query_count(&generate_orphan_count(schema, table, fk, parent_key)) {
                Ok(0) => Check::new(name, true, "no orphans"),
                Ok(n) => Check::new(name, false, format!("{} rows without a parent", n)),
                Err(e) => Check::new(name, false, e.to_string()),
            };
            report.push(check, ui);
        }
    }

    for ov in &options.overrides {
        let key_column = get_table(&ov.table)
            .and_then(|t| t.primary_key.first().copied())
            .unwrap_or("id");
        let name = format!("{} {}: {}", ov.table, ov.id, ov.column);
        let expected = ov.value.format("%Y-%m-%d").to_string();
        let check = match db.query_texts(&generate_override_check(schema, key_column, ov)) {
            Ok(values) => match values.as_slice() {
                [Some(actual)] => Check::new(
                    name,
                    *actual == expected,
                    format!("{}, expected {}", actual, expected),
                ),
                [None] => Check::new(name, false, format!("NULL, expected {}", expected)),
                _ => Check::new(name, false, "row not present"),
            },
            Err(e) => Check::new(name, false, e.to_string()),
        };
        report.push(check, ui);
    }

    Ok(report)
}
