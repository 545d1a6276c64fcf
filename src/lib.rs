// src/lib.rs
//! Browse and edit the rows of an SQLite database without writing SQL.
//!
//! Foreign keys are followed to render readable row summaries and to offer
//! parent rows as choices when a referencing column is edited.

pub mod browse;
pub mod cli;
pub mod database;
pub mod prompt;
pub mod session;
pub mod settings;
