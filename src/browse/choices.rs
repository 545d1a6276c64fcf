// src/browse/choices.rs
// Choice lists built from table rows

use super::summary::row_summary;
use crate::database::schema::{column_names, primary_key_columns};
use crate::database::{ColumnFilter, DbReader, DbResult, RowData, RowKey};
use rusqlite::Connection;
use std::collections::BTreeSet;

pub const NO_CHOICES_LABEL: &str = "No choices available!";
pub const NO_VALUE_LABEL: &str = "(no value)";

/// One selectable entry of a row list.
#[derive(Debug, Clone, PartialEq)]
pub enum RowChoice {
    /// A row offered for lookup. `value` is `None` only for the placeholder
    /// shown when there are no rows.
    Display { label: String, value: Option<RowKey> },
    /// A candidate parent row for a foreign key. `key` is `None` for the
    /// "no value" entry.
    Reference { label: String, key: Option<RowKey> },
}

impl RowChoice {
    pub fn label(&self) -> &str {
        match self {
            RowChoice::Display { label, .. } | RowChoice::Reference { label, .. } => label,
        }
    }

    pub fn row_key(&self) -> Option<&RowKey> {
        match self {
            RowChoice::Display { value, .. } => value.as_ref(),
            RowChoice::Reference { key, .. } => key.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChoiceOptions {
    /// Columns projected into each choice's key. Defaults to the primary key.
    pub value_columns: Option<Vec<String>>,
    pub restricting_values: Option<RowData>,
    /// Columns rendered into each label. Defaults to every column.
    pub display_columns: Option<Vec<String>>,
}

/// Parent rows offered for a foreign key, with the current one preselected.
#[derive(Debug, Clone)]
pub struct ReferenceSelection {
    pub choices: Vec<RowChoice>,
    pub selected_index: usize,
}

impl ReferenceSelection {
    pub fn labels(&self) -> Vec<String> {
        self.choices.iter().map(|c| c.label().to_string()).collect()
    }
}

/// Key columns for `table_name`: the primary key, or every column for tables
/// that declare none.
pub fn default_value_columns(conn: &Connection, table_name: &str) -> DbResult<Vec<String>> {
    let pks = primary_key_columns(conn, table_name)?;
    if pks.is_empty() {
        return column_names(conn, table_name, ColumnFilter::All);
    }
    Ok(pks)
}

fn labelled_rows(
    conn: &Connection,
    table_name: &str,
    options: &ChoiceOptions,
) -> DbResult<Vec<(String, RowKey)>> {
    let restricting = options.restricting_values.clone().unwrap_or_default();
    let rows = DbReader::filtered_rows(conn, table_name, &restricting)?;
    let value_columns = match &options.value_columns {
        Some(columns) => columns.clone(),
        None => default_value_columns(conn, table_name)?,
    };

    let visited = BTreeSet::new();
    rows.iter()
        .map(|row| {
            let label = row_summary(
                conn,
                table_name,
                row,
                options.display_columns.as_deref(),
                &visited,
            )?;
            Ok((label, row.pick(&value_columns)))
        })
        .collect()
}

/// One choice per matching row. An empty result yields a single placeholder
/// whose value is `None`; callers must check for it.
pub fn row_choices(conn: &Connection, table_name: &str, options: &ChoiceOptions) -> DbResult<Vec<RowChoice>> {
    let rows = labelled_rows(conn, table_name, options)?;
    if rows.is_empty() {
        return Ok(vec![RowChoice::Display {
            label: NO_CHOICES_LABEL.to_string(),
            value: None,
        }]);
    }
    Ok(rows
        .into_iter()
        .map(|(label, key)| RowChoice::Display {
            label,
            value: Some(key),
        })
        .collect())
}

/// Like [`row_choices`], as reference choices behind a leading "no value"
/// entry. The choice whose key equals `selected_value` (ignoring column order)
/// is preselected; otherwise the "no value" entry is.
pub fn reference_selection(
    conn: &Connection,
    table_name: &str,
    value_columns: &[String],
    selected_value: &RowData,
    options: &ChoiceOptions,
) -> DbResult<ReferenceSelection> {
    let options = ChoiceOptions {
        value_columns: Some(value_columns.to_vec()),
        ..options.clone()
    };
    let rows = labelled_rows(conn, table_name, &options)?;

    let mut choices = Vec::with_capacity(rows.len() + 1);
    choices.push(RowChoice::Reference {
        label: NO_VALUE_LABEL.to_string(),
        key: None,
    });
    choices.extend(rows.into_iter().map(|(label, key)| RowChoice::Reference {
        label,
        key: Some(key),
    }));

    let selected_index = if selected_value.is_empty() || selected_value.all_null() {
        0
    } else {
        choices
            .iter()
            .position(|choice| {
                choice
                    .row_key()
                    .is_some_and(|key| key.same_entries(selected_value))
            })
            .unwrap_or(0)
    };
    Ok(ReferenceSelection {
        choices,
        selected_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DbConnection;
    use rusqlite::types::Value;

    fn setup() -> Connection {
        let conn = DbConnection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE shelf (room TEXT, slot INTEGER, label TEXT, PRIMARY KEY (room, slot));
             INSERT INTO shelf VALUES ('A', 1, 'top');
             INSERT INTO shelf VALUES ('A', 2, 'middle');
             INSERT INTO shelf VALUES ('B', 1, 'floor');
             CREATE TABLE empty (id INTEGER PRIMARY KEY);
             CREATE TABLE loose (a TEXT, b TEXT);
             INSERT INTO loose VALUES ('x', 'y');",
        )
        .unwrap();
        conn
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_row_choices_default_to_primary_key() {
        let conn = setup();
        let choices = row_choices(&conn, "shelf", &ChoiceOptions::default()).unwrap();
        assert_eq!(choices.len(), 3);
        assert_eq!(choices[1].label(), "A; 2; middle");
        let key = choices[1].row_key().unwrap();
        assert_eq!(key.columns().collect::<Vec<_>>(), vec!["room", "slot"]);
        assert_eq!(key.get("slot"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_row_choices_with_display_and_restriction() {
        let conn = setup();
        let mut restrict = RowData::new();
        restrict.insert("room", Value::Text("A".into()));
        let options = ChoiceOptions {
            display_columns: Some(cols(&["label"])),
            restricting_values: Some(restrict),
            ..Default::default()
        };
        let labels: Vec<String> = row_choices(&conn, "shelf", &options)
            .unwrap()
            .iter()
            .map(|c| c.label().to_string())
            .collect();
        assert_eq!(labels, vec!["top", "middle"]);
    }

    #[test]
    fn test_empty_table_yields_placeholder() {
        let conn = setup();
        let choices = row_choices(&conn, "empty", &ChoiceOptions::default()).unwrap();
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].label(), NO_CHOICES_LABEL);
        assert!(choices[0].row_key().is_none());
    }

    #[test]
    fn test_table_without_primary_key_uses_all_columns() {
        let conn = setup();
        let choices = row_choices(&conn, "loose", &ChoiceOptions::default()).unwrap();
        assert_eq!(choices[0].row_key().unwrap().len(), 2);
    }

    #[test]
    fn test_reference_selection_matches_regardless_of_order() {
        let conn = setup();
        let mut selected = RowData::new();
        selected.insert("slot", Value::Integer(1));
        selected.insert("room", Value::Text("B".into()));

        let selection = reference_selection(
            &conn,
            "shelf",
            &cols(&["room", "slot"]),
            &selected,
            &ChoiceOptions::default(),
        )
        .unwrap();
        assert_eq!(selection.choices.len(), 4);
        assert_eq!(selection.choices[0].label(), NO_VALUE_LABEL);
        assert_eq!(selection.selected_index, 3);
        let key = selection.choices[3].row_key().unwrap();
        assert!(key.same_entries(&selected));
    }

    #[test]
    fn test_reference_selection_defaults_to_no_value() {
        let conn = setup();
        let mut selected = RowData::new();
        selected.insert("room", Value::Null);
        selected.insert("slot", Value::Null);
        let selection = reference_selection(
            &conn,
            "shelf",
            &cols(&["room", "slot"]),
            &selected,
            &ChoiceOptions::default(),
        )
        .unwrap();
        assert_eq!(selection.selected_index, 0);

        selected.insert("room", Value::Text("Z".into()));
        let selection = reference_selection(
            &conn,
            "shelf",
            &cols(&["room", "slot"]),
            &selected,
            &ChoiceOptions::default(),
        )
        .unwrap();
        assert_eq!(selection.selected_index, 0);

        let selection =
            reference_selection(&conn, "empty", &cols(&["id"]), &RowData::new(), &ChoiceOptions::default())
                .unwrap();
        assert_eq!(selection.choices.len(), 1);
    }
}
