use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Result, SetupError};
use crate::schema::{NaPolicy, TableSchema};

/// Field values treated as missing under `NaPolicy::Default`
pub const NA_SENTINELS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A CSV file held in memory, ready for the staging load
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Column names as written in the header row
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Position of a header, ignoring ASCII case
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn convert_field(field: &str, policy: NaPolicy) -> Option<String> {
    match policy {
        NaPolicy::Default if NA_SENTINELS.contains(&field) => None,
        _ => Some(field.to_string()),
    }
}

/// Parse CSV text from any reader
pub fn read_records<R: Read>(reader: R, policy: NaPolicy, file: &str) -> Result<RawTable> {
    let csv_err = |source: csv::Error| SetupError::Csv {
        file: file.to_string(),
        source,
    };

    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        rows.push(record.iter().map(|f| convert_field(f, policy)).collect());
    }

    Ok(RawTable { headers, rows })
}

/// Read the source CSV for a table from `input_dir`
pub fn read_table_csv(schema: &TableSchema, input_dir: &Path) -> Result<RawTable> {
    let path = input_dir.join(schema.source_file);
    let file = File::open(&path).map_err(|e| SetupError::io(&path, e))?;
    read_records(file, schema.na_policy, schema.source_file)
}
