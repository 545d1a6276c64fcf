// src/session/menus.rs
// Table selection, the per-table action menu and row lookup

use super::{DraftAction, EditMode, EditSession, RowDraft, SessionError, SessionState};
use crate::browse::{row_choices, ChoiceOptions, RowChoice};
use crate::database::schema::{column_choices, table_choices};
use crate::database::{DbReader, RowKey};
use crate::prompt::{MenuOption, Notice, Prompter, Question, QuestionKind};

enum TableAction {
    AddRow,
    ColumnSearch,
    FreeSearch,
    ChangeMode,
    OtherTable,
    Exit,
}

impl EditSession {
    pub(crate) fn select_table(&mut self, prompter: &mut dyn Prompter) -> Result<SessionState, SessionError> {
        let tables = table_choices(&self.conn)?;
        if tables.is_empty() {
            prompter.notify(Notice::Error("This database has no tables.".to_string()));
            return Ok(SessionState::Finished);
        }
        let default = self
            .table
            .as_ref()
            .and_then(|current| tables.iter().position(|t| t == current))
            .unwrap_or(0);

        let answers = prompter.ask_one(Question::new(
            "table",
            "Select a table to examine:",
            QuestionKind::Search {
                options: tables.clone(),
                default,
            },
        ))?;
        let index = answers.choice("table")?;
        let table = tables
            .get(index)
            .cloned()
            .ok_or(SessionError::NoTable)?;
        tracing::info!("Selected table '{}'", table);
        self.table = Some(table);
        Ok(SessionState::TableMenu)
    }

    pub(crate) fn table_menu(&mut self, prompter: &mut dyn Prompter) -> Result<SessionState, SessionError> {
        let table = self.current_table()?;
        let actions = [
            (MenuOption::new('n', "Add a new row"), TableAction::AddRow),
            (MenuOption::new('c', "Search for rows by column"), TableAction::ColumnSearch),
            (MenuOption::new('f', "Free search for rows"), TableAction::FreeSearch),
            (
                MenuOption::new('m', format!("Change edit mode (now: {})", self.mode)),
                TableAction::ChangeMode,
            ),
            (MenuOption::new('t', "Choose another table"), TableAction::OtherTable),
            (MenuOption::new('x', "Exit"), TableAction::Exit),
        ];
        let answers = prompter.ask_one(Question::new(
            "action",
            format!("What action do you want to take on table '{}'?", table),
            QuestionKind::Menu {
                options: actions.iter().map(|(option, _)| option.clone()).collect(),
                default: 0,
            },
        ))?;
        let index = answers.choice("action")?;
        let Some((_, action)) = actions.get(index) else {
            return Ok(SessionState::TableMenu);
        };

        match action {
            TableAction::AddRow => Ok(SessionState::EditRow(RowDraft::new_row(table))),
            TableAction::ColumnSearch => self.column_search(prompter, &table),
            TableAction::FreeSearch => self.free_search(prompter, &table),
            TableAction::ChangeMode => self.change_mode(prompter),
            TableAction::OtherTable => Ok(SessionState::SelectTable),
            TableAction::Exit => {
                self.discard_pending(prompter);
                Ok(SessionState::Finished)
            }
        }
    }

    fn column_search(&mut self, prompter: &mut dyn Prompter, table: &str) -> Result<SessionState, SessionError> {
        let columns = column_choices(&self.conn, table)?;
        if columns.is_empty() {
            prompter.notify(Notice::Warning(format!(
                "Table '{}' has no searchable columns.",
                table
            )));
            return Ok(SessionState::TableMenu);
        }
        let answers = prompter.ask_one(Question::new(
            "column_name",
            "Which column do you want to search?",
            QuestionKind::Search {
                options: columns.clone(),
                default: 0,
            },
        ))?;
        let column = columns
            .get(answers.choice("column_name")?)
            .cloned()
            .unwrap_or_default();

        let options = ChoiceOptions {
            display_columns: Some(vec![column.clone()]),
            ..Default::default()
        };
        let choices = row_choices(&self.conn, table, &options)?;
        let message = format!("Select a value from '{}':", column);
        self.choose_row(prompter, table, choices, message, None)
    }

    fn free_search(&mut self, prompter: &mut dyn Prompter, table: &str) -> Result<SessionState, SessionError> {
        let columns = column_choices(&self.conn, table)?;
        let choices = row_choices(&self.conn, table, &ChoiceOptions::default())?;
        let prefix = format!("Columns in \"{}\": {}", table, columns.join("; "));
        self.choose_row(prompter, table, choices, "Select a row:".to_string(), Some(prefix))
    }

    /// Ask for one of `choices`, then load the chosen row.
    fn choose_row(
        &mut self,
        prompter: &mut dyn Prompter,
        table: &str,
        choices: Vec<RowChoice>,
        message: String,
        prefix: Option<String>,
    ) -> Result<SessionState, SessionError> {
        let mut question = Question::new(
            "row_key",
            message,
            QuestionKind::Search {
                options: choices.iter().map(|c| c.label().to_string()).collect(),
                default: 0,
            },
        );
        if let Some(prefix) = prefix {
            question = question.with_prefix(prefix);
        }
        let answers = prompter.ask_one(question)?;
        let key = choices
            .get(answers.choice("row_key")?)
            .and_then(|choice| choice.row_key())
            .cloned();
        match key {
            Some(key) => self.lookup_row(prompter, table, key),
            None => {
                prompter.notify(Notice::Warning(format!("Table '{}' has no rows to choose from.", table)));
                Ok(SessionState::TableMenu)
            }
        }
    }

    fn lookup_row(&mut self, prompter: &mut dyn Prompter, table: &str, key: RowKey) -> Result<SessionState, SessionError> {
        let lookup = DbReader::keyed_row(&self.conn, table, &key)?;
        if !lookup.is_exact() {
            prompter.notify(Notice::Warning(format!(
                "Expected one row in '{}' for key {}, found {}.",
                table,
                describe_key(&key),
                lookup.matches
            )));
        }
        match lookup.row {
            Some(mut row) => {
                if let Some(pending) = self.pending_edit(table, &key) {
                    tracing::debug!("Row in '{}' has unsaved edits; starting from them", table);
                    row.merge(pending.row.clone());
                }
                Ok(SessionState::EditRow(RowDraft::edit(table, key, row)))
            }
            None => Ok(SessionState::TableMenu),
        }
    }

    /// Latest unsaved edit of the row `key` identifies. Every edit draft is
    /// written in full, so a later draft of the same row must carry it along.
    fn pending_edit(&self, table: &str, key: &RowKey) -> Option<&RowDraft> {
        self.pending
            .iter()
            .rev()
            .find(|draft| draft.action == DraftAction::Edit && draft.table == table && draft.row_key.same_entries(key))
    }

    fn change_mode(&mut self, prompter: &mut dyn Prompter) -> Result<SessionState, SessionError> {
        let shortcuts = ['w', 's', 'e'];
        let options = EditMode::ALL
            .iter()
            .zip(shortcuts)
            .map(|(mode, shortcut)| MenuOption::new(shortcut, mode.to_string()))
            .collect();
        let default = EditMode::ALL
            .iter()
            .position(|mode| *mode == self.mode)
            .unwrap_or(0);
        let answers = prompter.ask_one(Question::new(
            "mode",
            "How should rows be edited?",
            QuestionKind::Menu { options, default },
        ))?;
        if let Some(mode) = EditMode::ALL.get(answers.choice("mode")?) {
            tracing::info!("Edit mode changed to {}", mode);
            self.mode = *mode;
        }
        Ok(SessionState::TableMenu)
    }
}

/// `col = value` pairs for operator messages.
pub(crate) fn describe_key(key: &RowKey) -> String {
    key.iter()
        .map(|(column, value)| format!("{} = {}", column, crate::database::render_value(value)))
        .collect::<Vec<_>>()
        .join(", ")
}
