// src/browse/summary.rs
// Human-readable row rendering that follows single-column foreign keys

use super::sentinels::separate_sentinels;
use crate::database::schema::{column_names, foreign_key_references};
use crate::database::{render_value, ColumnFilter, DbError, DbReader, DbResult, ForeignKeyReference, RowData};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::collections::BTreeSet;

/// Foreign keys of a table together with the column that represents each one.
#[derive(Debug, Clone)]
pub struct ForeignKeyLayout {
    pub references: Vec<ForeignKeyReference>,
    pub resolution: super::SentinelResolution,
}

impl ForeignKeyLayout {
    pub fn load(conn: &Connection, table_name: &str) -> DbResult<Self> {
        let references = foreign_key_references(conn, table_name)?;
        let lists: Vec<Vec<Option<&str>>> = references
            .iter()
            .map(|fk| fk.from.iter().map(|c| Some(c.as_str())).collect())
            .collect();
        let resolution = separate_sentinels(&lists);
        Ok(Self {
            references,
            resolution,
        })
    }

    /// The foreign key `column` is the sentinel of, if any.
    pub fn reference_for(&self, column: &str) -> Option<&ForeignKeyReference> {
        self.resolution
            .sentinel_for(column)
            .and_then(|index| self.references.get(index))
    }

    /// The foreign key `column` stands for on its own: it is the sentinel of a
    /// single-column reference.
    pub fn single_column_reference(&self, column: &str) -> Option<&ForeignKeyReference> {
        self.reference_for(column).filter(|fk| fk.is_single_column())
    }

    pub fn is_remainder(&self, column: &str) -> bool {
        self.resolution.is_remainder(column)
    }
}

/// Render `row` as `"; "`-joined column values.
///
/// A non-null sentinel of a single-column foreign key is replaced by the
/// summary of the parent row it points at, unless `table_name` was already
/// expanded further up the chain (`visited`). The outermost call appends the
/// raw key in parentheses so both forms stay visible.
pub fn row_summary(
    conn: &Connection,
    table_name: &str,
    row: &RowData,
    columns: Option<&[String]>,
    visited: &BTreeSet<String>,
) -> DbResult<String> {
    let columns = match columns {
        Some(columns) => columns.to_vec(),
        None => column_names(conn, table_name, ColumnFilter::All)?,
    };
    let expandable = !visited.contains(table_name);
    let layout = if expandable {
        Some(ForeignKeyLayout::load(conn, table_name)?)
    } else {
        None
    };

    let mut parts = Vec::with_capacity(columns.len());
    for column in &columns {
        let raw = row.get(column).cloned().unwrap_or(Value::Null);
        let reference = layout
            .as_ref()
            .and_then(|layout| layout.single_column_reference(column));

        let rendered = match reference {
            Some(fk) if raw != Value::Null => {
                let mut chain = visited.clone();
                chain.insert(table_name.to_string());
                match parent_summary(conn, fk, &raw, &chain)? {
                    Some(summary) if visited.is_empty() => {
                        format!("{} ({})", summary, render_value(&raw))
                    }
                    Some(summary) => summary,
                    None => render_value(&raw),
                }
            }
            _ => render_value(&raw),
        };
        parts.push(rendered);
    }
    Ok(parts.join("; "))
}

fn parent_summary(
    conn: &Connection,
    fk: &ForeignKeyReference,
    raw: &Value,
    visited: &BTreeSet<String>,
) -> DbResult<Option<String>> {
    let Some(parent_column) = fk.to.columns.first() else {
        return Ok(None);
    };
    let mut key = RowData::new();
    key.insert(parent_column.clone(), raw.clone());

    let parents = match DbReader::filtered_rows(conn, &fk.to.table, &key) {
        Ok(rows) => rows,
        Err(DbError::TableNotFound(table)) => {
            tracing::debug!("Foreign key points at missing table '{}'", table);
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    let Some(parent) = parents.first() else {
        tracing::debug!(
            "No row in '{}' with {} = {}; showing raw value",
            fk.to.table,
            parent_column,
            render_value(raw)
        );
        return Ok(None);
    };
    row_summary(conn, &fk.to.table, parent, None, visited).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DbConnection;

    fn setup(sql: &str) -> Connection {
        let conn = DbConnection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        conn
    }

    fn first_row(conn: &Connection, table: &str) -> RowData {
        DbReader::filtered_rows(conn, table, &RowData::new())
            .unwrap()
            .remove(0)
    }

    #[test]
    fn test_plain_row_summary() {
        let conn = setup(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT, gone TEXT);
             INSERT INTO t VALUES (1, 'x', NULL);",
        );
        let row = first_row(&conn, "t");
        let summary = row_summary(&conn, "t", &row, None, &BTreeSet::new()).unwrap();
        assert_eq!(summary, "1; x; null");

        let only = vec!["name".to_string()];
        assert_eq!(row_summary(&conn, "t", &row, Some(&only), &BTreeSet::new()).unwrap(), "x");
    }

    #[test]
    fn test_foreign_key_is_expanded_and_annotated() {
        let conn = setup(
            "CREATE TABLE country (id INTEGER PRIMARY KEY, name TEXT);
             CREATE TABLE city (id INTEGER PRIMARY KEY, name TEXT, country INTEGER REFERENCES country (id));
             CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT, city INTEGER REFERENCES city (id));
             INSERT INTO country VALUES (7, 'Norway');
             INSERT INTO city VALUES (3, 'Oslo', 7);
             INSERT INTO person VALUES (1, 'Ada', 3);",
        );
        let row = first_row(&conn, "person");
        let summary = row_summary(&conn, "person", &row, None, &BTreeSet::new()).unwrap();
        // Only the outermost reference carries the raw key.
        assert_eq!(summary, "1; Ada; 3; Oslo; 7; Norway (3)");
    }

    #[test]
    fn test_self_reference_terminates() {
        let conn = setup(
            "CREATE TABLE node (id INTEGER PRIMARY KEY, label TEXT, parent INTEGER REFERENCES node (id));
             INSERT INTO node VALUES (1, 'root', 1);
             INSERT INTO node VALUES (2, 'leaf', 1);",
        );
        let rows = DbReader::filtered_rows(&conn, "node", &RowData::new()).unwrap();
        let summary = row_summary(&conn, "node", &rows[1], None, &BTreeSet::new()).unwrap();
        assert_eq!(summary, "2; leaf; 1; root; 1 (1)");
    }

    #[test]
    fn test_cycle_between_tables_terminates() {
        let conn = setup(
            "PRAGMA foreign_keys=OFF;
             CREATE TABLE a (id INTEGER PRIMARY KEY, b_id INTEGER REFERENCES b (id));
             CREATE TABLE b (id INTEGER PRIMARY KEY, a_id INTEGER REFERENCES a (id));
             INSERT INTO a VALUES (1, 10);
             INSERT INTO b VALUES (10, 1);",
        );
        let row = first_row(&conn, "a");
        let summary = row_summary(&conn, "a", &row, None, &BTreeSet::new()).unwrap();
        assert_eq!(summary, "1; 10; 1; 10 (10)");
    }

    #[test]
    fn test_missing_parent_falls_back_to_raw_value() {
        let conn = setup(
            "PRAGMA foreign_keys=OFF;
             CREATE TABLE owner (id INTEGER PRIMARY KEY, name TEXT);
             CREATE TABLE pet (id INTEGER PRIMARY KEY, owner INTEGER REFERENCES owner (id),
                               vet INTEGER REFERENCES clinic (id));
             INSERT INTO pet VALUES (1, 99, 5);",
        );
        let row = first_row(&conn, "pet");
        let summary = row_summary(&conn, "pet", &row, None, &BTreeSet::new()).unwrap();
        assert_eq!(summary, "1; 99; 5");
    }

    #[test]
    fn test_composite_reference_is_not_expanded() {
        let conn = setup(
            "CREATE TABLE shelf (room TEXT, slot INTEGER, label TEXT, PRIMARY KEY (room, slot));
             CREATE TABLE book (id INTEGER PRIMARY KEY, room TEXT, slot INTEGER,
                                FOREIGN KEY (room, slot) REFERENCES shelf (room, slot));
             INSERT INTO shelf VALUES ('A', 1, 'top');
             INSERT INTO book VALUES (1, 'A', 1);",
        );
        let row = first_row(&conn, "book");
        let summary = row_summary(&conn, "book", &row, None, &BTreeSet::new()).unwrap();
        assert_eq!(summary, "1; A; 1");
    }
}
