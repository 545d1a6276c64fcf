// src/database/mod.rs

pub mod clause;
pub mod connection;
pub mod error;
pub mod reader;
pub mod schema;
pub mod value;
pub mod writer;

pub use clause::{escape_identifier, sqlite3_affinity, Affinity};
pub use connection::DbConnection;
pub use error::{DbError, DbResult};
pub use reader::{DbReader, KeyedLookup};
pub use schema::{Column, ColumnFilter, ForeignKeyReference, ForeignKeyTarget};
pub use value::{render_value, RowData, RowKey};
pub use writer::{DbWriter, WriteOutcome};
