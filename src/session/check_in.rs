// src/session/check_in.rs
// What to do with the pending drafts: keep going, save them all, or drop them

use super::menus::describe_key;
use super::{DraftAction, EditSession, RowDraft, SessionError, SessionState};
use crate::database::{DbResult, DbWriter, RowData, WriteOutcome};
use crate::prompt::{MenuOption, Notice, Prompter, Question, QuestionKind};

enum CheckInAction {
    Continue,
    AddAnother,
    Save,
    Open,
    Top,
    Exit,
}

/// Result of [`EditSession::save_pending`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlushReport {
    pub saved: usize,
    /// Engine message for the draft that stopped the flush.
    pub failure: Option<String>,
}

impl EditSession {
    pub(crate) fn check_in(&mut self, prompter: &mut dyn Prompter) -> Result<SessionState, SessionError> {
        let Some(latest) = self.pending.last() else {
            return Ok(SessionState::TableMenu);
        };
        let table = latest.table.clone();
        let count = self.pending.len();
        let verb = if latest.is_new() { "adding" } else { "saving" };
        let open_label = if self.flush_failed {
            "Open the row that could not be saved in an editor"
        } else {
            "Open this row in an editor"
        };

        let actions = [
            (
                MenuOption::new('c', format!("Continue with table '{}'", table)),
                CheckInAction::Continue,
            ),
            (MenuOption::new('a', "Add another new row"), CheckInAction::AddAnother),
            (
                MenuOption::new('s', format!("Save all {} row(s) edited so far", count)),
                CheckInAction::Save,
            ),
            (MenuOption::new('o', open_label), CheckInAction::Open),
            (
                MenuOption::new('t', format!("Go back to the top menu (without {} these rows)", verb)),
                CheckInAction::Top,
            ),
            (MenuOption::new('x', "Exit"), CheckInAction::Exit),
        ];
        let answers = prompter.ask_one(Question::new(
            "action",
            "What would you like to do next?",
            QuestionKind::Menu {
                options: actions.iter().map(|(option, _)| option.clone()).collect(),
                default: 0,
            },
        ))?;
        let Some((_, action)) = actions.get(answers.choice("action")?) else {
            return Ok(SessionState::CheckIn);
        };

        match action {
            CheckInAction::Continue => Ok(SessionState::TableMenu),
            CheckInAction::AddAnother => Ok(SessionState::EditRow(RowDraft::new_row(table))),
            CheckInAction::Save => {
                let report = self.save_pending(prompter);
                match report.failure {
                    None => {
                        prompter.notify(Notice::Info(format!("Saved {} row(s).", report.saved)));
                        Ok(SessionState::SelectTable)
                    }
                    Some(_) => Ok(SessionState::CheckIn),
                }
            }
            CheckInAction::Open => {
                self.open_focused(prompter)?;
                Ok(SessionState::CheckIn)
            }
            CheckInAction::Top => {
                self.discard_pending(prompter);
                Ok(SessionState::SelectTable)
            }
            CheckInAction::Exit => {
                self.discard_pending(prompter);
                Ok(SessionState::Finished)
            }
        }
    }

    /// Write every pending draft in order, each as its own statement.
    ///
    /// Stops at the first rejected draft: it and every later draft stay
    /// pending, and the engine's message is passed to the operator unchanged.
    pub fn save_pending(&mut self, prompter: &mut dyn Prompter) -> FlushReport {
        let mut saved = 0;
        let mut failure = None;
        for draft in &self.pending {
            match persist(&self.conn, draft) {
                Ok(outcome) => {
                    if draft.action == DraftAction::Edit && outcome.rows_affected != 1 {
                        prompter.notify(Notice::Warning(format!(
                            "Update of '{}' for key {} changed {} row(s).",
                            draft.table,
                            describe_key(&draft.row_key),
                            outcome.rows_affected
                        )));
                    }
                    saved += 1;
                }
                Err(e) => {
                    tracing::error!("Saving draft for '{}' failed: {}", draft.table, e);
                    prompter.notify(Notice::Error(format!(
                        "Could not save row in '{}': {}",
                        draft.table, e
                    )));
                    failure = Some(e.to_string());
                    break;
                }
            }
        }
        self.pending.drain(..saved);
        self.flush_failed = failure.is_some();
        if saved > 0 && failure.is_some() {
            prompter.notify(Notice::Info(format!(
                "Saved {} row(s); {} still pending.",
                saved,
                self.pending.len()
            )));
        }
        tracing::info!("Flushed {} draft(s), {} pending", saved, self.pending.len());
        FlushReport { saved, failure }
    }

    /// The draft check-in acts on: the one a failed flush stopped at,
    /// otherwise the most recent.
    fn focus_index(&self) -> Option<usize> {
        if self.pending.is_empty() {
            None
        } else if self.flush_failed {
            Some(0)
        } else {
            Some(self.pending.len() - 1)
        }
    }

    /// Replace the focused draft's row with operator-edited JSON.
    fn open_focused(&mut self, prompter: &mut dyn Prompter) -> Result<(), SessionError> {
        let Some(index) = self.focus_index() else {
            return Ok(());
        };
        let initial = self.pending[index]
            .row
            .to_json_pretty()
            .map_err(|e| SessionError::InvalidEdit(e.to_string()))?;
        let answers = prompter.ask_one(Question::new(
            "edited",
            "Edit this row as JSON",
            QuestionKind::ExternalEdit {
                initial,
                extension: "json".to_string(),
            },
        ))?;
        let text = answers.text("edited")?;
        match RowData::from_json(&text) {
            Ok(row) => {
                self.pending[index].row = row;
            }
            Err(e) => {
                prompter.notify(Notice::Error(format!(
                    "Edited row is not a valid JSON object: {}; keeping the previous version.",
                    e
                )));
            }
        }
        Ok(())
    }
}

fn persist(conn: &rusqlite::Connection, draft: &RowDraft) -> DbResult<WriteOutcome> {
    match draft.action {
        DraftAction::New => DbWriter::insert(conn, &draft.table, &draft.row),
        DraftAction::Edit => DbWriter::update(conn, &draft.table, &draft.row_key, &draft.row),
    }
}
