use std::collections::HashSet;
use std::fmt;

/// Target column type, applied after the untyped staging load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    BigInt,
    Boolean,
    Double,
    Date,
    /// Fixed-width text, e.g. ISO codes and credit ids
    Char(u16),
    Varchar(u16),
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "INTEGER"),
            ColumnType::BigInt => write!(f, "BIGINT"),
            ColumnType::Boolean => write!(f, "BOOLEAN"),
            ColumnType::Double => write!(f, "DOUBLE PRECISION"),
            ColumnType::Date => write!(f, "DATE"),
            ColumnType::Char(n) => write!(f, "CHAR({})", n),
            ColumnType::Varchar(n) => write!(f, "VARCHAR({})", n),
        }
    }
}

/// What to do with a date outside the representable window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRange {
    /// Abort the run
    Fail,
    /// Record the original value and load NULL
    Null,
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    /// Only consulted for `ColumnType::Date`
    pub out_of_range: OutOfRange,
}

impl Column {
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            out_of_range: OutOfRange::Fail,
        }
    }

    /// Out-of-range dates in this column load as NULL instead of aborting
    pub const fn lenient(self) -> Self {
        Self {
            out_of_range: OutOfRange::Null,
            ..self
        }
    }
}

/// Foreign key reference to another table's (single-column) primary key
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub name: &'static str,
    pub column: &'static str,
    pub references_table: &'static str,
}

impl ForeignKey {
    pub const fn new(
        name: &'static str,
        column: &'static str,
        references_table: &'static str,
    ) -> Self {
        Self {
            name,
            column,
            references_table,
        }
    }
}

/// Missing-value handling while reading a CSV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NaPolicy {
    /// The usual sentinels (`NA`, `NaN`, empty, ...) become NULL
    Default,
    /// Every field is kept as written; for tables where `NA` is a real code
    Keep,
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub source_file: &'static str,
    /// Ordered (column, target type) list driving the type coercion
    pub columns: &'static [Column],
    pub primary_key: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
    pub na_policy: NaPolicy,
}

impl TableSchema {
    /// Get all tables this table depends on (FK parents)
    pub fn dependencies(&self) -> HashSet<&'static str> {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table)
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn date_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|c| c.col_type == ColumnType::Date)
    }

    pub fn primary_key_name(&self) -> String {
        format!("{}_pk", self.name)
    }
}
