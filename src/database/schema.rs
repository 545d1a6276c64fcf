// src/database/schema.rs
// READ-only catalog queries: tables, columns and foreign keys

use super::clause::{sqlite3_affinity, Affinity};
use super::error::{DbError, DbResult};
use rusqlite::{Connection, OptionalExtension};
use std::collections::BTreeMap;

/// One column as reported by `pragma_table_info`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub cid: i64,
    pub name: String,
    /// Declared type, empty when the column was declared without one.
    pub decl_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    /// Position within the primary key (1-based), 0 for non-key columns.
    pub pk: i64,
}

impl Column {
    pub fn affinity(&self) -> Affinity {
        sqlite3_affinity(Some(&self.decl_type))
    }

    pub fn is_primary_key(&self) -> bool {
        self.pk > 0
    }
}

/// Which columns `column_list` should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnFilter {
    #[default]
    All,
    /// Omit the key column when the primary key is exactly one column.
    /// A composite key is returned in full.
    ExcludeRowidPks,
    ExcludeAllPks,
    IncludeOnlyPks,
}

/// Parent side of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyTarget {
    pub table: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyReference {
    /// Constraint id as reported by the catalog.
    pub id: i64,
    /// Child columns, in constraint order.
    pub from: Vec<String>,
    pub to: ForeignKeyTarget,
    pub on_update: String,
    pub on_delete: String,
}

impl ForeignKeyReference {
    /// `(child, parent)` column pairs.
    pub fn child_to_parent(&self) -> Vec<(String, String)> {
        self.from
            .iter()
            .cloned()
            .zip(self.to.columns.iter().cloned())
            .collect()
    }

    /// `(parent, child)` column pairs.
    pub fn parent_to_child(&self) -> Vec<(String, String)> {
        self.to
            .columns
            .iter()
            .cloned()
            .zip(self.from.iter().cloned())
            .collect()
    }

    pub fn is_single_column(&self) -> bool {
        self.from.len() == 1
    }
}

/// Check if a table exists in the main schema
pub fn table_exists(conn: &Connection, table_name: &str) -> DbResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?",
            [table_name],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Verify table exists or return error
pub fn require_table(conn: &Connection, table_name: &str) -> DbResult<()> {
    if !table_exists(conn, table_name)? {
        return Err(DbError::TableNotFound(table_name.to_string()));
    }
    Ok(())
}

/// User tables of the main schema, by name. Engine-internal `sqlite_%` tables are excluded.
pub fn table_choices(conn: &Connection) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM pragma_table_list
         WHERE schema = 'main' AND type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
         ORDER BY name",
    )?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tables)
}

fn read_columns(conn: &Connection, table_name: &str) -> DbResult<Vec<Column>> {
    require_table(conn, table_name)?;
    let mut stmt = conn.prepare(
        "SELECT cid, name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?) ORDER BY cid",
    )?;
    let columns = stmt
        .query_map([table_name], |row| {
            Ok(Column {
                cid: row.get(0)?,
                name: row.get(1)?,
                decl_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                not_null: row.get::<_, i64>(3)? != 0,
                default_value: row.get(4)?,
                pk: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

/// Columns of `table_name` in declaration order, narrowed by `filter`.
pub fn column_list(conn: &Connection, table_name: &str, filter: ColumnFilter) -> DbResult<Vec<Column>> {
    let columns = read_columns(conn, table_name)?;
    let pk_count = columns.iter().filter(|c| c.is_primary_key()).count();

    let selected = match filter {
        ColumnFilter::ExcludeRowidPks if pk_count == 1 => {
            columns.into_iter().filter(|c| !c.is_primary_key()).collect()
        }
        ColumnFilter::ExcludeRowidPks | ColumnFilter::All => columns,
        ColumnFilter::ExcludeAllPks => columns.into_iter().filter(|c| !c.is_primary_key()).collect(),
        ColumnFilter::IncludeOnlyPks => columns.into_iter().filter(|c| c.is_primary_key()).collect(),
    };
    Ok(selected)
}

pub fn column_names(conn: &Connection, table_name: &str, filter: ColumnFilter) -> DbResult<Vec<String>> {
    Ok(column_list(conn, table_name, filter)?
        .into_iter()
        .map(|c| c.name)
        .collect())
}

/// Column names offered for per-column search.
pub fn column_choices(conn: &Connection, table_name: &str) -> DbResult<Vec<String>> {
    column_names(conn, table_name, ColumnFilter::ExcludeRowidPks)
}

/// Primary-key columns ordered by their position in the key.
pub fn primary_key_columns(conn: &Connection, table_name: &str) -> DbResult<Vec<String>> {
    let mut pks = column_list(conn, table_name, ColumnFilter::IncludeOnlyPks)?;
    pks.sort_by_key(|c| c.pk);
    Ok(pks.into_iter().map(|c| c.name).collect())
}

struct ForeignKeyRow {
    id: i64,
    seq: usize,
    table: String,
    from: String,
    to: Option<String>,
    on_update: String,
    on_delete: String,
}

struct PartialReference {
    table: String,
    from: Vec<Option<String>>,
    to: Vec<Option<String>>,
    on_update: String,
    on_delete: String,
}

fn place_at(list: &mut Vec<Option<String>>, seq: usize, value: Option<String>) {
    if list.len() <= seq {
        list.resize(seq + 1, None);
    }
    list[seq] = value;
}

/// Foreign keys declared by `table_name`, one per constraint id, in id order.
///
/// Each catalog row is placed at its `seq` position within its constraint. A
/// reference written without a parent column list reports no parent column;
/// those resolve to the parent's primary key, matched by position.
pub fn foreign_key_references(conn: &Connection, table_name: &str) -> DbResult<Vec<ForeignKeyReference>> {
    require_table(conn, table_name)?;
    let mut stmt = conn.prepare(
        "SELECT id, seq, \"table\", \"from\", \"to\", on_update, on_delete
         FROM pragma_foreign_key_list(?) ORDER BY id, seq",
    )?;
    let rows = stmt
        .query_map([table_name], |row| {
            Ok(ForeignKeyRow {
                id: row.get(0)?,
                seq: row.get::<_, i64>(1)?.max(0) as usize,
                table: row.get(2)?,
                from: row.get(3)?,
                to: row.get(4)?,
                on_update: row.get(5)?,
                on_delete: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut grouped: BTreeMap<i64, PartialReference> = BTreeMap::new();
    for row in rows {
        let entry = grouped.entry(row.id).or_insert_with(|| PartialReference {
            table: row.table.clone(),
            from: Vec::new(),
            to: Vec::new(),
            on_update: row.on_update.clone(),
            on_delete: row.on_delete.clone(),
        });
        place_at(&mut entry.from, row.seq, Some(row.from));
        place_at(&mut entry.to, row.seq, row.to);
    }

    let mut references = Vec::with_capacity(grouped.len());
    for (id, partial) in grouped {
        let implicit_parent = partial.to.iter().any(Option::is_none);
        let parent_pks = if implicit_parent && table_exists(conn, &partial.table)? {
            primary_key_columns(conn, &partial.table)?
        } else {
            Vec::new()
        };

        let from: Vec<String> = partial.from.into_iter().flatten().collect();
        let to: Vec<String> = partial
            .to
            .into_iter()
            .enumerate()
            .filter_map(|(seq, column)| column.or_else(|| parent_pks.get(seq).cloned()))
            .collect();

        if from.is_empty() || from.len() != to.len() {
            tracing::warn!(
                "Skipping foreign key {} of '{}' -> '{}': {} child column(s) but {} parent column(s)",
                id,
                table_name,
                partial.table,
                from.len(),
                to.len()
            );
            continue;
        }

        references.push(ForeignKeyReference {
            id,
            from,
            to: ForeignKeyTarget {
                table: partial.table,
                columns: to,
            },
            on_update: partial.on_update,
            on_delete: partial.on_delete,
        });
    }

    tracing::debug!(
        "foreign_key_references: '{}' -> {} constraint(s)",
        table_name,
        references.len()
    );
    Ok(references)
}
