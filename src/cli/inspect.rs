// src/cli/inspect.rs
use super::Commands;
use crate::browse::ForeignKeyLayout;
use crate::database::schema::{column_list, require_table, table_choices};
use crate::database::{ColumnFilter, DbResult};
use rusqlite::Connection;
use std::io::Write;

pub fn run(conn: &Connection, command: &Commands, out: &mut impl Write) -> DbResult<()> {
    match command {
        Commands::Tables => list_tables(conn, out),
        Commands::Columns { table } => list_columns(conn, table, out),
        Commands::ForeignKeys { table } => list_foreign_keys(conn, table, out),
    }
}

fn list_tables(conn: &Connection, out: &mut impl Write) -> DbResult<()> {
    for table in table_choices(conn)? {
        writeln!(out, "{}", table)?;
    }
    Ok(())
}

fn list_columns(conn: &Connection, table: &str, out: &mut impl Write) -> DbResult<()> {
    require_table(conn, table)?;
    writeln!(out, "=== {} columns ===\n", table)?;
    writeln!(out, "{:<4} {:<20} {:<15} {:<9} {:<3} {}", "Cid", "Column Name", "Type", "Affinity", "PK", "Not Null")?;
    writeln!(out, "{}", "-".repeat(64))?;
    for column in column_list(conn, table, ColumnFilter::All)? {
        writeln!(
            out,
            "{:<4} {:<20} {:<15} {:<9} {:<3} {}",
            column.cid,
            column.name,
            if column.decl_type.is_empty() { "-" } else { column.decl_type.as_str() },
            column.affinity(),
            column.pk,
            if column.not_null { "yes" } else { "no" }
        )?;
    }
    Ok(())
}

fn list_foreign_keys(conn: &Connection, table: &str, out: &mut impl Write) -> DbResult<()> {
    require_table(conn, table)?;
    let layout = ForeignKeyLayout::load(conn, table)?;
    writeln!(out, "=== {} foreign keys ===\n", table)?;
    if layout.references.is_empty() {
        writeln!(out, "  (none)")?;
        return Ok(());
    }
    for (index, fk) in layout.references.iter().enumerate() {
        let sentinel = layout.resolution.sentinels.get(index).cloned().flatten();
        writeln!(
            out,
            "  #{} ({}) -> {} ({})  on update {}, on delete {}",
            fk.id,
            fk.from.join(", "),
            fk.to.table,
            fk.to.columns.join(", "),
            fk.on_update,
            fk.on_delete
        )?;
        writeln!(out, "      edited through: {}", sentinel.as_deref().unwrap_or("(no column of its own)"))?;
    }
    if !layout.resolution.remainder.is_empty() {
        writeln!(out, "\n  Driven by other keys: {}", layout.resolution.remainder.join(", "))?;
    }
    Ok(())
}
