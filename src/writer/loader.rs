//! The rebuild sequence: reset, per-table load, date corrections, foreign keys

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::database::Database;
use super::postgresql::PgDatabase;
use super::schema_gen::*;
use crate::config::{ConnectionConfig, DEFAULT_SCHEMA};
use crate::error::{Result, SetupError};
use crate::parser::{normalize_dates, read_table_csv, RawTable, UnparsedDate};
use crate::schema::{builtin_overrides, get_table, DateOverride, DependencyResolver, TableSchema};
use crate::ui::{Phase, Ui};

/// What to build and which corrections to apply
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub schema: String,
    pub overrides: Vec<DateOverride>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            schema: DEFAULT_SCHEMA.to_string(),
            overrides: builtin_overrides(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: &'static str,
    pub rows: u64,
    /// CSV columns not in the descriptor, loaded as TEXT
    pub extra_columns: Vec<String>,
}

/// Outcome of a successful rebuild
#[derive(Debug, Clone, Serialize)]
pub struct RebuildSummary {
    pub schema: String,
    pub tables: Vec<TableReport>,
    /// Out-of-range dates loaded as NULL
    pub unparsed_dates: Vec<UnparsedDate>,
    pub overrides_applied: Vec<DateOverride>,
    /// Overrides whose row is not in the source data
    pub overrides_missing: Vec<DateOverride>,
    pub foreign_keys: usize,
}

impl RebuildSummary {
    fn new(schema: &str) -> Self {
        Self {
            schema: schema.to_string(),
            tables: Vec::new(),
            unparsed_dates: Vec::new(),
            overrides_applied: Vec::new(),
            overrides_missing: Vec::new(),
            foreign_keys: 0,
        }
    }

    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|t| t.rows).sum()
    }

    /// Out-of-range dates that no override puts back
    pub fn unresolved_dates(&self) -> Vec<&UnparsedDate> {
        self.unparsed_dates
            .iter()
            .filter(|d| {
                !self.overrides_applied.iter().any(|o| {
                    o.table == d.table && o.column == d.column && parse_key(&d.row_id) == Some(o.id)
                })
            })
            .collect()
    }
}

/// Map CSV headers to staging column names.
///
/// Headers matching a declared column (ignoring case) take the declared name;
/// any other header is kept as written. Every declared column must be present.
pub fn staging_columns(table: &TableSchema, raw: &RawTable) -> Result<(Vec<String>, Vec<String>)> {
    for col in table.columns {
        if raw.column_index(col.name).is_none() {
            return Err(SetupError::MissingColumn {
                table: table.name,
                column: col.name,
                file: table.source_file.to_string(),
            });
        }
    }

    let mut columns = Vec::with_capacity(raw.headers.len());
    let mut extra = Vec::new();

    for header in &raw.headers {
        let header = header.trim();
        match table
            .columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(header))
        {
            Some(col) => columns.push(col.name.to_string()),
            None => {
                columns.push(header.to_string());
                extra.push(header.to_string());
            }
        }
    }

    Ok((columns, extra))
}

/// Parse an integer key the way it may appear in a CSV (`42` or `42.0`)
fn parse_key(value: &str) -> Option<i64> {
    let value = value.trim();
    value.parse::<i64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// Integer values of a table's single-column key
fn key_values(table: &TableSchema, raw: &RawTable) -> HashSet<i64> {
    let Some(index) = table.primary_key.first().and_then(|pk| raw.column_index(pk)) else {
        return HashSet::new();
    };

    raw.rows
        .iter()
        .filter_map(|row| row[index].as_deref().and_then(parse_key))
        .collect()
}

struct TableLoad {
    report: TableReport,
    unparsed: Vec<UnparsedDate>,
}

/// Stage, type and key one table
fn load_table<D: Database>(
    db: &mut D,
    schema: &str,
    table: &TableSchema,
    raw: &mut RawTable,
) -> Result<TableLoad> {
    let (columns, extra_columns) = staging_columns(table, raw)?;
    let unparsed = normalize_dates(table, raw)?;

    db.execute(&generate_create_staging(schema, table, &columns))?;
    let rows = db.copy_rows(&generate_copy(schema, table, &columns), columns.len(), &raw.rows)?;
    db.execute(&generate_alter_types(schema, table))?;
    db.execute(&generate_primary_key(schema, table))?;

    Ok(TableLoad {
        report: TableReport {
            table: table.name,
            rows,
            extra_columns,
        },
        unparsed,
    })
}

/// Run the whole rebuild against any [`Database`]
pub fn rebuild_with<D: Database>(
    db: &mut D,
    input_dir: &Path,
    options: &LoadOptions,
    ui: &mut impl Ui,
) -> Result<RebuildSummary> {
    for ov in &options.overrides {
        ov.validate()?;
    }
    let tables = DependencyResolver::new().load_order()?;
    let mut summary = RebuildSummary::new(&options.schema);

    // Reset
    ui.set_phase(Phase::Resetting);
    ui.log(format!("Recreating schema {}", options.schema));
    db.execute(&generate_drop_schema(&options.schema))?;
    db.execute(&generate_create_schema(&options.schema))?;

    // Per-table load
    ui.set_phase(Phase::Loading);
    let total = tables.len() as u64;
    let mut override_keys: HashMap<&'static str, HashSet<i64>> = HashMap::new();

    for (i, table) in tables.iter().enumerate() {
        ui.set_progress(i as u64, total, table.name);
        ui.set_info(format!("Reading {}", table.source_file));

        let mut raw = read_table_csv(table, input_dir)?;
        let loaded = load_table(db, &options.schema, table, &mut raw)?;

        if options.overrides.iter().any(|o| o.table == table.name) {
            override_keys.insert(table.name, key_values(table, &raw));
        }

        ui.log(format!("{}: {} rows", table.name, loaded.report.rows));
        if !loaded.report.extra_columns.is_empty() {
            ui.log(format!(
                "warning: {} has undeclared columns kept as TEXT: {}",
                table.source_file,
                loaded.report.extra_columns.join(", ")
            ));
        }
        for date in &loaded.unparsed {
            ui.log(format!(
                "warning: {}.{} row {}: '{}' out of range, loaded as NULL",
                date.table, date.column, date.row_id, date.value
            ));
        }

        summary.tables.push(loaded.report);
        summary.unparsed_dates.extend(loaded.unparsed);
    }
    ui.set_progress(total, total, "all tables loaded");
    ui.clear_progress();

    // Date corrections
    ui.set_phase(Phase::Repairing);
    for ov in &options.overrides {
        let key_column = get_table(&ov.table)
            .and_then(|t| t.primary_key.first().copied())
            .ok_or_else(|| SetupError::Override(format!("unknown table '{}'", ov.table)))?;

        let present = override_keys
            .get(ov.table.as_str())
            .is_some_and(|keys| keys.contains(&ov.id));
        if !present {
            ui.log(format!(
                "warning: no {} row with {} = {}; {} correction skipped",
                ov.table, key_column, ov.id, ov.column
            ));
            summary.overrides_missing.push(ov.clone());
            continue;
        }

        db.execute(&generate_override(&options.schema, key_column, ov))?;
        ui.log(format!("{} {}.{} = {}", ov.table, ov.id, ov.column, ov.value));
        summary.overrides_applied.push(ov.clone());
    }

    // Foreign keys, only once every referenced key exists
    ui.set_phase(Phase::Constraining);
    for table in &tables {
        for fk in table.foreign_keys {
            db.execute(&generate_foreign_key(&options.schema, table, fk))?;
            summary.foreign_keys += 1;
        }
    }
    ui.log(format!("{} foreign keys added", summary.foreign_keys));

    ui.set_phase(Phase::Complete);
    Ok(summary)
}

/// Rebuild the schema in the database described by `config`
pub fn rebuild(
    input_dir: &Path,
    config: &ConnectionConfig,
    options: &LoadOptions,
    ui: &mut impl Ui,
) -> Result<RebuildSummary> {
    ui.set_phase(Phase::Connecting);
    ui.set_info(config.describe());

    let mut db = PgDatabase::connect(config)?;
    let summary = rebuild_with(&mut db, input_dir, options, ui)?;
    db.close()?;

    Ok(summary)
}
