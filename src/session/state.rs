// src/session/state.rs
use crate::database::{RowData, RowKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How much of a row one edit step covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EditMode {
    #[default]
    WholeRow,
    SingleColumn,
    /// The row as JSON in the operator's editor.
    ExternalText,
}

impl EditMode {
    pub const ALL: [EditMode; 3] = [EditMode::WholeRow, EditMode::SingleColumn, EditMode::ExternalText];
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EditMode::WholeRow => "whole row",
            EditMode::SingleColumn => "single column",
            EditMode::ExternalText => "external editor",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftAction {
    New,
    Edit,
}

/// A row edit that has not been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDraft {
    pub table: String,
    pub action: DraftAction,
    /// Identifies the row being edited. Empty for new rows.
    pub row_key: RowKey,
    pub row: RowData,
}

impl RowDraft {
    pub fn new_row(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            action: DraftAction::New,
            row_key: RowKey::new(),
            row: RowData::new(),
        }
    }

    pub fn edit(table: impl Into<String>, row_key: RowKey, row: RowData) -> Self {
        Self {
            table: table.into(),
            action: DraftAction::Edit,
            row_key,
            row,
        }
    }

    pub fn is_new(&self) -> bool {
        self.action == DraftAction::New
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    SelectTable,
    TableMenu,
    EditRow(RowDraft),
    CheckIn,
    Finished,
}

impl SessionState {
    /// Where to resume when the step taken from this state fails.
    pub fn recovery(&self) -> SessionState {
        match self {
            SessionState::SelectTable | SessionState::Finished => SessionState::Finished,
            SessionState::TableMenu => SessionState::SelectTable,
            SessionState::EditRow(_) | SessionState::CheckIn => SessionState::TableMenu,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionState::SelectTable => "select-table",
            SessionState::TableMenu => "table-menu",
            SessionState::EditRow(_) => "edit-row",
            SessionState::CheckIn => "check-in",
            SessionState::Finished => "finished",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_map() {
        assert_eq!(SessionState::SelectTable.recovery(), SessionState::Finished);
        assert_eq!(SessionState::TableMenu.recovery(), SessionState::SelectTable);
        assert_eq!(
            SessionState::EditRow(RowDraft::new_row("t")).recovery(),
            SessionState::TableMenu
        );
        assert_eq!(SessionState::CheckIn.recovery(), SessionState::TableMenu);
    }

    #[test]
    fn test_edit_mode_serde_names() {
        assert_eq!(serde_json::to_string(&EditMode::SingleColumn).unwrap(), "\"single-column\"");
        let mode: EditMode = serde_json::from_str("\"external-text\"").unwrap();
        assert_eq!(mode, EditMode::ExternalText);
    }
}
