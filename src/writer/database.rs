use crate::error::Result;

/// The statements a rebuild needs from a database connection.
///
/// Every call is one blocking statement that commits on its own.
pub trait Database {
    /// Run a single DDL/DML statement, returning the affected row count
    fn execute(&mut self, sql: &str) -> Result<u64>;

    /// Stream `rows` through a `COPY ... FROM STDIN (FORMAT binary)`
    /// statement whose columns are all TEXT
    fn copy_rows(&mut self, sql: &str, columns: usize, rows: &[Vec<Option<String>>]) -> Result<u64>;
}

/// Read-only queries used when checking a loaded schema
pub trait Introspect {
    /// Run a query returning a single integer (e.g. `COUNT(*)`)
    fn query_count(&mut self, sql: &str) -> Result<i64>;

    /// Run a query returning one text column
    fn query_texts(&mut self, sql: &str) -> Result<Vec<Option<String>>>;
}

/// Records statements instead of running them
#[derive(Debug, Default)]
pub struct DryRunDatabase {
    statements: Vec<String>,
    rows_copied: u64,
}

impl DryRunDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every statement in the order it was issued, COPY included
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn rows_copied(&self) -> u64 {
        self.rows_copied
    }
}

impl Database for DryRunDatabase {
    fn execute(&mut self, sql: &str) -> Result<u64> {
        self.statements.push(sql.to_string());
        Ok(0)
    }

    fn copy_rows(&mut self, sql: &str, _columns: usize, rows: &[Vec<Option<String>>]) -> Result<u64> {
        self.statements.push(sql.to_string());
        self.rows_copied += rows.len() as u64;
        Ok(rows.len() as u64)
    }
}
