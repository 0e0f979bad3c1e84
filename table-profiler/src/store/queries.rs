//! SQL text for every query the profiler sends to the Tabular Store.
//!
//! The queries only use constructs shared by PostgreSQL and DataFusion:
//! `information_schema` views, `COUNT`/`MIN`/`STDDEV` aggregates,
//! `EXTRACT(DOW ...)` and the `~*` regex operator.

use chrono::NaiveDate;

use crate::error::Result;
use crate::security::SqlSecurity;

/// Internal schemas excluded from every listing and classification query.
pub const EXCLUDED_SCHEMAS: [&str; 2] = ["information_schema", "pg_catalog"];

fn excluded_schemas() -> String {
    let quoted: Vec<String> = EXCLUDED_SCHEMAS
        .iter()
        .map(|s| SqlSecurity::quote_literal(s))
        .collect();
    format!("({})", quoted.join(", "))
}

/// Renders `"schema"."table"`.
pub fn qualified_table(schema: &str, table: &str) -> Result<String> {
    Ok(format!(
        "{}.{}",
        SqlSecurity::escape_identifier(schema)?,
        SqlSecurity::escape_identifier(table)?
    ))
}

/// Lists every (schema, table) pair outside the internal schemas.
pub fn tables_list_query() -> String {
    format!(
        "SELECT table_schema, table_name FROM information_schema.tables \
         WHERE table_schema NOT IN {}",
        excluded_schemas()
    )
}

/// Fetches the full content of a table.
pub fn table_data_query(schema: &str, table: &str) -> Result<String> {
    Ok(format!("SELECT * FROM {}", qualified_table(schema, table)?))
}

/// Lists the columns of a table with their type metadata.
pub fn table_columns_query(schema: &str, table: &str) -> Result<String> {
    Ok(format!(
        "SELECT table_name, column_name, data_type, is_nullable, character_maximum_length, \
         numeric_precision, datetime_precision FROM information_schema.columns \
         WHERE table_schema = {} AND table_name = {} ORDER BY ordinal_position",
        SqlSecurity::quote_identifier_literal(schema)?,
        SqlSecurity::quote_identifier_literal(table)?
    ))
}

/// Lists the primary-key column names of a table.
pub fn primary_key_query(schema: &str, table: &str) -> Result<String> {
    Ok(format!(
        "SELECT c.column_name FROM information_schema.table_constraints t \
         LEFT JOIN information_schema.constraint_column_usage c \
         ON c.constraint_name = t.constraint_name \
         WHERE t.table_schema = {} AND t.constraint_type = 'PRIMARY KEY' AND t.table_name = {}",
        SqlSecurity::quote_identifier_literal(schema)?,
        SqlSecurity::quote_identifier_literal(table)?
    ))
}

/// Lists the columns of a table whose `data_type` satisfies `type_predicate`.
///
/// `type_predicate` is a boolean SQL expression over `col.data_type`, as
/// rendered by [`TypeOracle::predicate`](crate::catalog::TypeOracle::predicate).
pub fn columns_of_kind_query(schema: &str, table: &str, type_predicate: &str) -> Result<String> {
    Ok(format!(
        "SELECT column_name FROM information_schema.columns AS col \
         WHERE {type_predicate} AND col.table_schema NOT IN {} \
         AND col.table_schema = {} AND col.table_name = {} ORDER BY col.ordinal_position",
        excluded_schemas(),
        SqlSecurity::quote_identifier_literal(schema)?,
        SqlSecurity::quote_identifier_literal(table)?
    ))
}

/// Counts distinct non-null values of a column.
pub fn distinct_count_query(schema: &str, table: &str, column: &str) -> Result<String> {
    let column = SqlSecurity::escape_identifier(column)?;
    Ok(format!(
        "SELECT COUNT(DISTINCT {column}) AS row_count FROM {}",
        qualified_table(schema, table)?
    ))
}

/// Counts entries strictly below zero.
pub fn negative_count_query(schema: &str, table: &str, column: &str) -> Result<String> {
    let column = SqlSecurity::escape_identifier(column)?;
    Ok(format!(
        "SELECT COUNT({column}) AS row_count FROM {} WHERE {column} < 0",
        qualified_table(schema, table)?
    ))
}

/// Sample standard deviation of a column.
pub fn std_dev_query(schema: &str, table: &str, column: &str) -> Result<String> {
    let column = SqlSecurity::escape_identifier(column)?;
    Ok(format!(
        "SELECT STDDEV({column}) AS std_dev FROM {}",
        qualified_table(schema, table)?
    ))
}

/// Counts null entries.
pub fn null_count_query(schema: &str, table: &str, column: &str) -> Result<String> {
    let column = SqlSecurity::escape_identifier(column)?;
    Ok(format!(
        "SELECT COUNT(*) AS row_count FROM {} WHERE {column} IS NULL",
        qualified_table(schema, table)?
    ))
}

/// Most frequent non-null value; ties resolve to the smallest value.
pub fn mode_query(schema: &str, table: &str, column: &str) -> Result<String> {
    let column = SqlSecurity::escape_identifier(column)?;
    Ok(format!(
        "SELECT {column} AS mode_value, COUNT(*) AS occurrences FROM {} \
         WHERE {column} IS NOT NULL GROUP BY {column} \
         ORDER BY occurrences DESC, mode_value ASC LIMIT 1",
        qualified_table(schema, table)?
    ))
}

/// Counts entries containing at least one alphabetic character.
pub fn alphabetic_count_query(schema: &str, table: &str, column: &str) -> Result<String> {
    let column = SqlSecurity::escape_identifier(column)?;
    Ok(format!(
        "SELECT COUNT({column}) AS row_count FROM {} WHERE {column} ~* '[A-Z]'",
        qualified_table(schema, table)?
    ))
}

/// Earliest value of a column.
pub fn min_query(schema: &str, table: &str, column: &str) -> Result<String> {
    let column = SqlSecurity::escape_identifier(column)?;
    Ok(format!(
        "SELECT MIN({column}) AS min_date FROM {}",
        qualified_table(schema, table)?
    ))
}

/// Counts entries falling on a Saturday or Sunday.
pub fn weekend_count_query(schema: &str, table: &str, column: &str) -> Result<String> {
    let column = SqlSecurity::escape_identifier(column)?;
    Ok(format!(
        "SELECT COUNT(*) AS row_count FROM \
         (SELECT EXTRACT(DOW FROM {column}) AS weekend FROM {}) AS day_parts \
         WHERE weekend IN (0, 6)",
        qualified_table(schema, table)?
    ))
}

/// Counts entries whose date portion equals `date`.
pub fn date_count_query(
    schema: &str,
    table: &str,
    column: &str,
    date: NaiveDate,
) -> Result<String> {
    let column = SqlSecurity::escape_identifier(column)?;
    Ok(format!(
        "SELECT COUNT(*) AS row_count FROM \
         (SELECT CAST({column} AS DATE) AS calendar_day FROM {}) AS day_parts \
         WHERE calendar_day = CAST('{}' AS DATE)",
        qualified_table(schema, table)?,
        date.format("%Y-%m-%d")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_list_excludes_system_schemas() {
        let sql = tables_list_query();
        assert!(sql.contains("NOT IN ('information_schema', 'pg_catalog')"));
    }

    #[test]
    fn test_identifiers_are_quoted() {
        assert_eq!(
            table_data_query("public", "Orders").unwrap(),
            "SELECT * FROM \"public\".\"Orders\""
        );
        assert_eq!(
            negative_count_query("public", "orders", "amount").unwrap(),
            "SELECT COUNT(\"amount\") AS row_count FROM \"public\".\"orders\" WHERE \"amount\" < 0"
        );
    }

    #[test]
    fn test_catalog_filters_use_literals() {
        let sql = table_columns_query("public", "o'rders").unwrap();
        assert!(sql.contains("table_name = 'o''rders'"));
        let sql = columns_of_kind_query("public", "orders", "col.data_type IN ('text')").unwrap();
        assert!(sql.contains("col.data_type IN ('text') AND col.table_schema NOT IN"));
        assert!(sql.contains("col.table_schema = 'public' AND col.table_name = 'orders'"));
    }

    #[test]
    fn test_mode_orders_by_selected_count() {
        let sql = mode_query("public", "words", "word").unwrap();
        assert!(sql.starts_with("SELECT \"word\" AS mode_value, COUNT(*) AS occurrences"));
        assert!(sql.ends_with("ORDER BY occurrences DESC, mode_value ASC LIMIT 1"));
    }

    #[test]
    fn test_date_count_query() {
        let day = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        let sql = date_count_query("s", "t", "born", day).unwrap();
        assert!(sql.contains("CAST(\"born\" AS DATE)"));
        assert!(sql.ends_with("CAST('1900-01-01' AS DATE)"));
    }

    #[test]
    fn test_invalid_identifier_is_rejected() {
        assert!(distinct_count_query("public", "", "id").is_err());
        assert!(mode_query("public", "t", "bad\0name").is_err());
    }
}
