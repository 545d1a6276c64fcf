// src/session/mod.rs
// Interactive edit session: explicit state loop over one database connection

pub mod check_in;
pub mod edit_row;
pub mod menus;
pub mod state;

pub use check_in::FlushReport;
pub use state::{DraftAction, EditMode, RowDraft, SessionState};

use crate::database::schema::table_exists;
use crate::database::DbError;
use crate::prompt::{Notice, PromptError, Prompter};
use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error("{0}")]
    Db(#[from] DbError),
    #[error("Edited row is not a valid JSON object: {0}")]
    InvalidEdit(String),
    #[error("No table selected.")]
    NoTable,
}

pub struct EditSession {
    conn: Connection,
    mode: EditMode,
    table: Option<String>,
    pending: Vec<RowDraft>,
    /// The last save stopped at `pending[0]`.
    flush_failed: bool,
}

impl EditSession {
    pub fn new(conn: Connection, mode: EditMode) -> Self {
        Self {
            conn,
            mode,
            table: None,
            pending: Vec::new(),
            flush_failed: false,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn pending(&self) -> &[RowDraft] {
        &self.pending
    }

    /// Drive the session until the operator exits or input ends.
    ///
    /// With `initial_table` the session starts at that table's menu.
    pub fn run(&mut self, prompter: &mut dyn Prompter, initial_table: Option<&str>) -> Result<(), SessionError> {
        let mut state = match initial_table {
            Some(table) if table_exists(&self.conn, table)? => {
                self.table = Some(table.to_string());
                SessionState::TableMenu
            }
            Some(table) => {
                prompter.notify(Notice::Warning(format!("No table named '{}'.", table)));
                SessionState::SelectTable
            }
            None => SessionState::SelectTable,
        };

        loop {
            if state == SessionState::Finished {
                break;
            }
            let recovery = state.recovery();
            let from = state.name();
            state = match self.step(state, prompter) {
                Ok(next) => {
                    tracing::debug!("session: {} -> {}", from, next.name());
                    next
                }
                Err(SessionError::Prompt(PromptError::Closed)) => {
                    tracing::info!("Input closed; ending session");
                    self.discard_pending(prompter);
                    break;
                }
                Err(SessionError::Prompt(PromptError::Unsupported(reason))) => {
                    tracing::error!("Prompt not supported: {}", reason);
                    return Err(PromptError::Unsupported(reason).into());
                }
                Err(SessionError::Prompt(PromptError::Interrupted)) => {
                    tracing::info!("session: {} cancelled, back to {}", from, recovery.name());
                    prompter.notify(Notice::Info("Cancelled.".to_string()));
                    recovery
                }
                Err(e) => {
                    tracing::warn!("session: {} failed: {}; back to {}", from, e, recovery.name());
                    prompter.notify(Notice::Error(e.to_string()));
                    recovery
                }
            };
        }
        Ok(())
    }

    fn step(&mut self, state: SessionState, prompter: &mut dyn Prompter) -> Result<SessionState, SessionError> {
        match state {
            SessionState::SelectTable => self.select_table(prompter),
            SessionState::TableMenu => self.table_menu(prompter),
            SessionState::EditRow(draft) => self.edit_row(prompter, draft),
            SessionState::CheckIn => self.check_in(prompter),
            SessionState::Finished => Ok(SessionState::Finished),
        }
    }

    fn current_table(&self) -> Result<String, SessionError> {
        self.table
            .clone()
            .ok_or(SessionError::NoTable)
    }

    pub(crate) fn discard_pending(&mut self, prompter: &mut dyn Prompter) {
        if self.pending.is_empty() {
            return;
        }
        let count = self.pending.len();
        tracing::info!("Discarding {} unsaved draft(s)", count);
        prompter.notify(Notice::Warning(format!("Discarded {} unsaved row(s).", count)));
        self.pending.clear();
        self.flush_failed = false;
    }
}
