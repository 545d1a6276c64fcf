// src/database/reader.rs
// Row lookups against arbitrary user tables

use super::clause::{build_keyed_select_sql, build_select_sql};
use super::error::DbResult;
use super::schema::require_table;
use super::value::RowData;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

pub struct DbReader;

impl DbReader {
    /// Every row of `table_name` whose columns equal `restricting_values`.
    /// No restricting values means a full table scan.
    pub fn filtered_rows(
        conn: &Connection,
        table_name: &str,
        restricting_values: &RowData,
    ) -> DbResult<Vec<RowData>> {
        let (sql, params) = build_select_sql(table_name, restricting_values);
        tracing::debug!("filtered_rows SQL: {} {:?}", sql, params);
        let rows = Self::query_rows(conn, table_name, &sql, &params)?;
        tracing::debug!("filtered_rows: '{}' -> {} row(s)", table_name, rows.len());
        Ok(rows)
    }

    /// Look up the row identified by `row_key`.
    ///
    /// A key matching zero or several rows is not fatal: the caller gets the
    /// first match (if any) together with the number of matches so it can
    /// tell the operator.
    pub fn keyed_row(
        conn: &Connection,
        table_name: &str,
        row_key: &RowData,
    ) -> DbResult<KeyedLookup> {
        let (sql, params) = build_keyed_select_sql(table_name, row_key);
        tracing::debug!("keyed_row SQL: {} {:?}", sql, params);
        let mut rows = Self::query_rows(conn, table_name, &sql, &params)?;
        let matches = rows.len();
        if matches != 1 {
            tracing::warn!(
                "Expected exactly one row in '{}' for key {:?}, found {}",
                table_name,
                row_key,
                matches
            );
        }
        let row = if rows.is_empty() { None } else { Some(rows.swap_remove(0)) };
        Ok(KeyedLookup { row, matches })
    }

    fn query_rows(conn: &Connection, table_name: &str, sql: &str, params: &[Value]) -> DbResult<Vec<RowData>> {
        require_table(conn, table_name)?;
        let mut stmt = conn.prepare(sql)?;
        let column_names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                let mut data = RowData::new();
                for (index, name) in column_names.iter().enumerate() {
                    data.insert(name.clone(), row.get::<_, Value>(index)?);
                }
                Ok(data)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Outcome of [`DbReader::keyed_row`].
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedLookup {
    pub row: Option<RowData>,
    pub matches: usize,
}

impl KeyedLookup {
    pub fn is_exact(&self) -> bool {
        self.matches == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DbConnection;

    fn orders() -> Connection {
        let conn = DbConnection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE orders (id INTEGER PRIMARY KEY, customer TEXT, total REAL, note BLOB);
             INSERT INTO orders VALUES (1, 'ann', 9.5, NULL);
             INSERT INTO orders VALUES (2, 'bob', 3.0, x'0102');
             INSERT INTO orders VALUES (3, 'ann', 1.25, NULL);",
        )
        .unwrap();
        conn
    }

    fn key(entries: &[(&str, Value)]) -> RowData {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_filtered_rows_without_filter_returns_everything() {
        let conn = orders();
        let rows = DbReader::filtered_rows(&conn, "orders", &RowData::new()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0].columns().collect::<Vec<_>>(),
            vec!["id", "customer", "total", "note"]
        );
        assert_eq!(rows[1].get("note"), Some(&Value::Blob(vec![1, 2])));
    }

    #[test]
    fn test_filtered_rows_ands_predicates() {
        let conn = orders();
        let ann = DbReader::filtered_rows(&conn, "orders", &key(&[("customer", Value::Text("ann".into()))]))
            .unwrap();
        assert_eq!(ann.len(), 2);

        let one = DbReader::filtered_rows(
            &conn,
            "orders",
            &key(&[("customer", Value::Text("ann".into())), ("id", Value::Integer(3))]),
        )
        .unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].get("total"), Some(&Value::Real(1.25)));
    }

    #[test]
    fn test_keyed_row_reports_cardinality() {
        let conn = orders();
        let exact = DbReader::keyed_row(&conn, "orders", &key(&[("id", Value::Integer(2))])).unwrap();
        assert!(exact.is_exact());

        let many = DbReader::keyed_row(&conn, "orders", &key(&[("customer", Value::Text("ann".into()))]))
            .unwrap();
        assert_eq!(many.matches, 2);
        assert_eq!(many.row.unwrap().get("id"), Some(&Value::Integer(1)));

        let none = DbReader::keyed_row(&conn, "orders", &key(&[("id", Value::Integer(99))])).unwrap();
        assert_eq!(none.matches, 0);
        assert!(none.row.is_none());
    }

    #[test]
    fn test_keyed_row_matches_null_key_values() {
        let conn = DbConnection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE note (title TEXT, body TEXT);
             INSERT INTO note VALUES ('a', NULL);
             INSERT INTO note VALUES ('a', 'kept');",
        )
        .unwrap();
        let row_key = key(&[("title", Value::Text("a".into())), ("body", Value::Null)]);
        let lookup = DbReader::keyed_row(&conn, "note", &row_key).unwrap();
        assert!(lookup.is_exact());
        assert_eq!(lookup.row.unwrap().get("body"), Some(&Value::Null));

        // Plain filtering keeps equality semantics.
        assert!(DbReader::filtered_rows(&conn, "note", &row_key).unwrap().is_empty());
    }
}
