// src/database/clause.rs
// Helper functions for SQL generation and parameter preparation

use super::value::RowData;
use rusqlite::types::Value;
use std::fmt;

/// Quote a SQL identifier by wrapping it in double quotes.
/// Embedded double quotes are doubled, so any table or column name is safe to
/// interpolate. Never use this for values; those are always bound parameters.
///
/// # Example
/// ```
/// use sinq::database::clause::escape_identifier;
/// assert_eq!(escape_identifier("User Name"), "\"User Name\"");
/// assert_eq!(escape_identifier("a\"b"), "\"a\"\"b\"");
/// ```
pub fn escape_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build a string of SQL placeholders (?, ?, ?, ...).
pub fn build_placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Assemble `"col"<suffix>` fragments joined by `separator`, in row order,
/// alongside the values to bind in the same order.
///
/// Use with an insert column list (`", "`, no suffix), a set clause
/// (`", "`, `" = ?"`) or a where clause (`" and "`, `" = ?"`).
pub fn clause_with_columns(row_data: &RowData, separator: &str, suffix: &str) -> (String, Vec<Value>) {
    let mut sql_clause = String::new();
    let mut param_list = Vec::with_capacity(row_data.len());
    for (index, (column, value)) in row_data.iter().enumerate() {
        if index > 0 {
            sql_clause.push_str(separator);
        }
        sql_clause.push_str(&escape_identifier(column));
        sql_clause.push_str(suffix);
        param_list.push(value.clone());
    }
    (sql_clause, param_list)
}

/// `" where a = ? and b = ?"`, or nothing at all when there are no predicates.
pub fn where_clause(restricting_values: &RowData) -> (String, Vec<Value>) {
    let (clause, params) = clause_with_columns(restricting_values, " and ", " = ?");
    if params.is_empty() {
        (String::new(), params)
    } else {
        (format!(" where {}", clause), params)
    }
}

/// Predicates identifying one row by `row_key`. A NULL key value is matched
/// with `is null`, since `= NULL` never holds.
pub fn key_clause(row_key: &RowData) -> (String, Vec<Value>) {
    let mut predicates = Vec::with_capacity(row_key.len());
    let mut params = Vec::with_capacity(row_key.len());
    for (column, value) in row_key.iter() {
        if matches!(value, Value::Null) {
            predicates.push(format!("{} is null", escape_identifier(column)));
        } else {
            predicates.push(format!("{} = ?", escape_identifier(column)));
            params.push(value.clone());
        }
    }
    (predicates.join(" and "), params)
}

/// Select the rows matching `row_key`, NULL key values included.
pub fn build_keyed_select_sql(table_name: &str, row_key: &RowData) -> (String, Vec<Value>) {
    let (predicates, params) = key_clause(row_key);
    let filter = if predicates.is_empty() {
        String::new()
    } else {
        format!(" where {}", predicates)
    };
    (
        format!("select * from {}{}", escape_identifier(table_name), filter),
        params,
    )
}

pub fn build_select_sql(table_name: &str, restricting_values: &RowData) -> (String, Vec<Value>) {
    let (filter, params) = where_clause(restricting_values);
    (
        format!("select * from {}{}", escape_identifier(table_name), filter),
        params,
    )
}

/// Build an INSERT statement. A row with no columns inserts default values.
///
/// # Example
/// ```
/// use sinq::database::clause::build_insert_sql;
/// use sinq::database::RowData;
/// use rusqlite::types::Value;
///
/// let row: RowData = [("id".to_string(), Value::Integer(1))].into_iter().collect();
/// let (sql, params) = build_insert_sql("t", &row);
/// assert_eq!(sql, "insert into \"t\" (\"id\") values (?)");
/// assert_eq!(params, vec![Value::Integer(1)]);
/// ```
pub fn build_insert_sql(table_name: &str, row_data: &RowData) -> (String, Vec<Value>) {
    if row_data.is_empty() {
        return (
            format!("insert into {} default values", escape_identifier(table_name)),
            Vec::new(),
        );
    }
    let (columns, params) = clause_with_columns(row_data, ", ", "");
    (
        format!(
            "insert into {} ({}) values ({})",
            escape_identifier(table_name),
            columns,
            build_placeholders(params.len())
        ),
        params,
    )
}

/// Build an UPDATE statement keyed by `row_key`. Parameters are set-then-where.
pub fn build_update_sql(table_name: &str, row_key: &RowData, row_data: &RowData) -> (String, Vec<Value>) {
    let (set_clause, mut params) = clause_with_columns(row_data, ", ", " = ?");
    let (key_predicates, key_params) = key_clause(row_key);
    params.extend(key_params);
    (
        format!(
            "update {} set {} where {}",
            escape_identifier(table_name),
            set_clause,
            key_predicates
        ),
        params,
    )
}

/// Coarse SQLite storage class inferred from a declared column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affinity {
    Integer,
    Text,
    Blob,
    Real,
    Numeric,
}

impl Affinity {
    pub fn is_numeric(self) -> bool {
        matches!(self, Affinity::Integer | Affinity::Real | Affinity::Numeric)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Affinity::Integer => "integer",
            Affinity::Text => "text",
            Affinity::Blob => "blob",
            Affinity::Real => "real",
            Affinity::Numeric => "numeric",
        }
    }
}

impl fmt::Display for Affinity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Classify a declared type. The checks run in a fixed order, so a type that
/// contains both "char" and "blob" is text.
pub fn sqlite3_affinity(type_name: Option<&str>) -> Affinity {
    let Some(type_name) = type_name else {
        return Affinity::Blob;
    };
    let type_name = type_name.to_lowercase();
    let contains = |needle: &&str| type_name.contains(*needle);

    if type_name.contains("int") {
        Affinity::Integer
    } else if ["char", "clob", "text"].iter().any(contains) {
        Affinity::Text
    } else if type_name.contains("blob") {
        Affinity::Blob
    } else if ["real", "floa", "doub"].iter().any(contains) {
        Affinity::Real
    } else {
        Affinity::Numeric
    }
}
