use crate::schema::{ColumnType, DateOverride, ForeignKey, TableSchema};

/// Keywords PostgreSQL rejects as bare column or table names, sorted
const RESERVED: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "authorization",
    "binary", "both", "case", "cast", "character", "check", "collate", "collation", "column",
    "concurrently", "constraint", "create", "cross", "current_catalog", "current_date",
    "current_role", "current_schema", "current_time", "current_timestamp", "current_user",
    "default", "deferrable", "desc", "distinct", "do", "else", "end", "except", "false", "fetch",
    "for", "foreign", "freeze", "from", "full", "grant", "group", "having", "ilike", "in",
    "initially", "inner", "intersect", "into", "is", "isnull", "join", "lateral", "leading", "left",
    "like", "limit", "localtime", "localtimestamp", "natural", "not", "notnull", "null", "offset",
    "on", "only", "or", "order", "outer", "overlaps", "placing", "primary", "references",
    "returning", "right", "select", "session_user", "similar", "some", "symmetric", "system_user",
    "table", "tablesample", "then", "to", "trailing", "true", "union", "unique", "user", "using",
    "variadic", "verbose", "when", "where", "window", "with",
];

/// Quote an identifier unless it is a plain lowercase name
pub fn quote_ident(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && RESERVED.binary_search(&name).is_err();

    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// `schema.table`, quoted as needed
pub fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

fn column_list<S: AsRef<str>>(columns: &[S]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn generate_drop_schema(schema: &str) -> String {
    format!("DROP SCHEMA IF EXISTS {} CASCADE", quote_ident(schema))
}

pub fn generate_create_schema(schema: &str) -> String {
    format!("CREATE SCHEMA {}", quote_ident(schema))
}

/// Generate the untyped staging table: every column TEXT
pub fn generate_create_staging(schema: &str, table: &TableSchema, columns: &[String]) -> String {
    let defs: Vec<String> = columns
        .iter()
        .map(|c| format!("    {} TEXT", quote_ident(c)))
        .collect();

    format!(
        "CREATE TABLE {} (\n{}\n)",
        qualified(schema, table.name),
        defs.join(",\n")
    )
}

/// Generate the binary COPY statement feeding the staging table
pub fn generate_copy(schema: &str, table: &TableSchema, columns: &[String]) -> String {
    format!(
        "COPY {} ({}) FROM STDIN (FORMAT binary)",
        qualified(schema, table.name),
        column_list(columns)
    )
}

/// Cast applied to the staged text when converting to `col_type`.
///
/// Text targets take PostgreSQL's assignment cast, which rejects values that
/// are too long instead of truncating them.
fn using_expression(column: &str, col_type: ColumnType) -> Option<String> {
    let col = quote_ident(column);
    match col_type {
        // Integer columns with gaps are exported as 1.0, 2.0, ...
        ColumnType::Integer => Some(format!("{}::numeric::integer", col)),
        ColumnType::BigInt => Some(format!("{}::numeric::bigint", col)),
        ColumnType::Boolean => Some(format!("{}::boolean", col)),
        ColumnType::Double => Some(format!("{}::double precision", col)),
        ColumnType::Date => Some(format!("{}::date", col)),
        ColumnType::Char(_) | ColumnType::Varchar(_) => None,
    }
}

/// Generate one ALTER TABLE coercing every declared column to its target type
pub fn generate_alter_types(schema: &str, table: &TableSchema) -> String {
    let clauses: Vec<String> = table
        .columns
        .iter()
        .map(|col| {
            let mut clause = format!(
                "    ALTER COLUMN {} TYPE {}",
                quote_ident(col.name),
                col.col_type
            );
            if let Some(expr) = using_expression(col.name, col.col_type) {
                clause.push_str(" USING ");
                clause.push_str(&expr);
            }
            clause
        })
        .collect();

    format!(
        "ALTER TABLE {}\n{}",
        qualified(schema, table.name),
        clauses.join(",\n")
    )
}

pub fn generate_primary_key(schema: &str, table: &TableSchema) -> String {
    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({})",
        qualified(schema, table.name),
        quote_ident(&table.primary_key_name()),
        column_list(table.primary_key)
    )
}

/// Generate a foreign key; the reference is implicitly the parent's primary key
pub fn generate_foreign_key(schema: &str, table: &TableSchema, fk: &ForeignKey) -> String {
    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}",
        qualified(schema, table.name),
        quote_ident(fk.name),
        quote_ident(fk.column),
        qualified(schema, fk.references_table)
    )
}

/// Generate the UPDATE writing one corrected date
pub fn generate_override(schema: &str, key_column: &str, ov: &DateOverride) -> String {
    format!(
        "UPDATE {} SET {} = DATE '{}' WHERE {} = {}",
        qualified(schema, &ov.table),
        quote_ident(&ov.column),
        ov.value.format("%Y-%m-%d"),
        quote_ident(key_column),
        ov.id
    )
}

pub fn generate_count(schema: &str, table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", qualified(schema, table))
}

/// Primary key column names of a table, in key order
pub fn generate_primary_key_query(schema: &str, table: &str) -> String {
    format!(
        "SELECT a.attname::text \
         FROM pg_index i \
         JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = ANY(i.indkey) \
         WHERE i.indrelid = '{}'::regclass AND i.indisprimary \
         ORDER BY array_position(i.indkey::int2[], a.attnum)",
        qualified(schema, table).replace('\'', "''")
    )
}

/// Count child rows whose foreign key value has no parent
pub fn generate_orphan_count(schema: &str, table: &TableSchema, fk: &ForeignKey, parent_key: &str) -> String {
    format!(
        "SELECT COUNT(*) FROM {} c WHERE c.{} IS NOT NULL AND NOT EXISTS \
         (SELECT 1 FROM {} p WHERE p.{} = c.{})",
        qualified(schema, table.name),
        quote_ident(fk.column),
        qualified(schema, fk.references_table),
        quote_ident(parent_key),
        quote_ident(fk.column)
    )
}

/// Read back an overridden cell as text
pub fn generate_override_check(schema: &str, key_column: &str, ov: &DateOverride) -> String {
    format!(
        "SELECT {}::text FROM {} WHERE {} = {}",
        quote_ident(&ov.column),
        qualified(schema, &ov.table),
        quote_ident(key_column),
        ov.id
    )
}
