// src/database/writer.rs
// Insert and update operations - the only place rows are mutated

use super::clause::{build_insert_sql, build_update_sql};
use super::error::{DbError, DbResult};
use super::value::RowData;
use rusqlite::{params_from_iter, Connection};

/// What the engine reported for one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub rows_affected: usize,
    /// Rowid generated by the statement, when it was an insert.
    pub last_insert_rowid: Option<i64>,
}

pub struct DbWriter;

impl DbWriter {
    /// Insert one row. Each call is committed on its own.
    pub fn insert(conn: &Connection, table_name: &str, row_data: &RowData) -> DbResult<WriteOutcome> {
        let (sql, params) = build_insert_sql(table_name, row_data);
        tracing::debug!("insert SQL: {} {:?}", sql, params);

        let rows_affected = conn.execute(&sql, params_from_iter(params.iter()))?;
        let rowid = conn.last_insert_rowid();
        tracing::info!("Inserted row into '{}' (rowid {})", table_name, rowid);
        Ok(WriteOutcome {
            rows_affected,
            last_insert_rowid: Some(rowid),
        })
    }

    /// Update the row identified by `row_key` with every column in `row_data`.
    pub fn update(
        conn: &Connection,
        table_name: &str,
        row_key: &RowData,
        row_data: &RowData,
    ) -> DbResult<WriteOutcome> {
        if row_key.is_empty() {
            return Err(DbError::MissingRowKey(table_name.to_string()));
        }
        if row_data.is_empty() {
            tracing::debug!("update: nothing to set on '{}'", table_name);
            return Ok(WriteOutcome {
                rows_affected: 0,
                last_insert_rowid: None,
            });
        }

        let (sql, params) = build_update_sql(table_name, row_key, row_data);
        tracing::debug!("update SQL: {} {:?}", sql, params);

        let rows_affected = conn.execute(&sql, params_from_iter(params.iter()))?;
        if rows_affected != 1 {
            tracing::warn!(
                "Update of '{}' for key {:?} touched {} rows",
                table_name,
                row_key,
                rows_affected
            );
        } else {
            tracing::info!("Updated row in '{}'", table_name);
        }
        Ok(WriteOutcome {
            rows_affected,
            last_insert_rowid: None,
        })
    }
}
