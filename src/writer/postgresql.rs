use postgres::binary_copy::BinaryCopyInWriter;
use postgres::types::{ToSql, Type};
use postgres::{Client, NoTls};

use super::database::{Database, Introspect};
use crate::config::ConnectionConfig;
use crate::error::{Result, SetupError};

/// A single blocking PostgreSQL connection in autocommit mode
pub struct PgDatabase {
    client: Client,
}

impl PgDatabase {
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let client = config
            .pg_config()?
            .connect(NoTls)
            .map_err(|e| SetupError::database(format!("connect to {}", config.describe()), e))?;

        Ok(Self { client })
    }

    /// Close the connection, reporting any error the server sends on the way out
    pub fn close(self) -> Result<()> {
        self.client
            .close()
            .map_err(|e| SetupError::database("close connection", e))
    }
}

impl Database for PgDatabase {
    fn execute(&mut self, sql: &str) -> Result<u64> {
        self.client
            .execute(sql, &[])
            .map_err(|e| SetupError::database(sql, e))
    }

    fn copy_rows(&mut self, sql: &str, columns: usize, rows: &[Vec<Option<String>>]) -> Result<u64> {
        let err = |e: postgres::Error| SetupError::database(sql, e);

        let types = vec![Type::TEXT; columns];
        let sink = self.client.copy_in(sql).map_err(err)?;
        let mut writer = BinaryCopyInWriter::new(sink, &types);

        for row in rows {
            let values: Vec<&(dyn ToSql + Sync)> =
                row.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
            writer.write(&values).map_err(err)?;
        }

        writer.finish().map_err(err)
    }
}

impl Introspect for PgDatabase {
    fn query_count(&mut self, sql: &str) -> Result<i64> {
        let row = self
            .client
            .query_one(sql, &[])
            .map_err(|e| SetupError::database(sql, e))?;
        row.try_get(0).map_err(|e| SetupError::database(sql, e))
    }

    fn query_texts(&mut self, sql: &str) -> Result<Vec<Option<String>>> {
        let rows = self
            .client
            .query(sql, &[])
            .map_err(|e| SetupError::database(sql, e))?;
        rows.iter()
            .map(|row| row.try_get(0).map_err(|e| SetupError::database(sql, e)))
            .collect()
    }
}
