// src/session/edit_row.rs
// Prompting for the editable columns of one draft

use super::{EditMode, EditSession, RowDraft, SessionError, SessionState};
use crate::browse::{reference_selection, ChoiceOptions, ForeignKeyLayout, ReferenceSelection};
use crate::database::schema::column_list;
use crate::database::{Column, ColumnFilter, DbError, ForeignKeyReference, RowData};
use crate::prompt::input::{friendly_column_name, parse_for_affinity};
use crate::prompt::{Answers, Notice, Prompter, Question, QuestionKind};
use rusqlite::types::Value;

/// What one question stands for, kept so its answer can be folded back.
enum ColumnPrompt {
    Scalar(Column),
    Reference {
        column: String,
        fk: ForeignKeyReference,
        selection: ReferenceSelection,
    },
}

impl EditSession {
    pub(crate) fn edit_row(
        &mut self,
        prompter: &mut dyn Prompter,
        mut draft: RowDraft,
    ) -> Result<SessionState, SessionError> {
        if self.mode == EditMode::ExternalText {
            draft.row = self.edit_externally(prompter, &draft)?;
            self.pending.push(draft);
            return Ok(SessionState::CheckIn);
        }

        let layout = ForeignKeyLayout::load(&self.conn, &draft.table)?;
        let mut columns = editable_columns(&self.conn, &draft.table, &layout)?;
        if self.mode == EditMode::SingleColumn && columns.len() > 1 {
            let answers = prompter.ask_one(Question::new(
                "column",
                "Which column do you want to edit?",
                QuestionKind::Search {
                    options: columns.iter().map(|c| c.name.clone()).collect(),
                    default: 0,
                },
            ))?;
            let index = answers.choice("column")?;
            let chosen = columns.swap_remove(index.min(columns.len() - 1));
            columns = vec![chosen];
        }

        let mut prompts = Vec::with_capacity(columns.len());
        let mut questions = Vec::with_capacity(columns.len());
        for column in columns {
            let (prompt, question) = self.column_question(prompter, &layout, column, &draft)?;
            prompts.push(prompt);
            questions.push(question);
        }

        let answers = prompter.ask(&questions)?;
        fold_answers(&mut draft, &prompts, &answers)?;
        tracing::debug!("Draft for '{}' now {:?}", draft.table, draft.row);
        self.pending.push(draft);
        Ok(SessionState::CheckIn)
    }

    fn column_question(
        &self,
        prompter: &mut dyn Prompter,
        layout: &ForeignKeyLayout,
        column: Column,
        draft: &RowDraft,
    ) -> Result<(ColumnPrompt, Question), SessionError> {
        let message = friendly_column_name(&column.name);

        if let Some(fk) = layout.reference_for(&column.name) {
            let selected = draft.row.pick(&fk.from).rekey(&fk.child_to_parent());
            match reference_selection(
                &self.conn,
                &fk.to.table,
                &fk.to.columns,
                &selected,
                &ChoiceOptions::default(),
            ) {
                Ok(selection) => {
                    let question = Question::new(
                        column.name.clone(),
                        message,
                        QuestionKind::Search {
                            options: selection.labels(),
                            default: selection.selected_index,
                        },
                    );
                    let prompt = ColumnPrompt::Reference {
                        column: column.name.clone(),
                        fk: fk.clone(),
                        selection,
                    };
                    return Ok((prompt, question));
                }
                Err(DbError::TableNotFound(parent)) => {
                    tracing::warn!(
                        "'{}' references missing table '{}'; editing raw value",
                        column.name,
                        parent
                    );
                    prompter.notify(Notice::Warning(format!(
                        "'{}' refers to missing table '{}'; enter the raw value.",
                        column.name, parent
                    )));
                }
                Err(e) => return Err(e.into()),
            }
        }

        let affinity = column.affinity();
        let type_name = if column.decl_type.is_empty() {
            affinity.to_string()
        } else {
            column.decl_type.to_lowercase()
        };
        let question = Question::new(
            column.name.clone(),
            message,
            QuestionKind::FreeText {
                default: draft.row.get(&column.name).cloned(),
                hint: Some(format!("({})", type_name)),
                transform: Some(Box::new(move |typed: &str| parse_for_affinity(typed, affinity))),
            },
        );
        Ok((ColumnPrompt::Scalar(column), question))
    }

    fn edit_externally(&self, prompter: &mut dyn Prompter, draft: &RowDraft) -> Result<RowData, SessionError> {
        let mut skeleton = draft.row.clone();
        if draft.is_new() {
            for column in column_list(&self.conn, &draft.table, ColumnFilter::ExcludeRowidPks)? {
                if !skeleton.contains(&column.name) {
                    skeleton.insert(column.name, Value::Null);
                }
            }
        }
        let initial = skeleton
            .to_json_pretty()
            .map_err(|e| SessionError::InvalidEdit(e.to_string()))?;
        let answers = prompter.ask_one(Question::new(
            "edited",
            format!("Edit the row of '{}' as JSON", draft.table),
            QuestionKind::ExternalEdit {
                initial,
                extension: "json".to_string(),
            },
        ))?;
        let edited = RowData::from_json(&answers.text("edited")?)
            .map_err(|e| SessionError::InvalidEdit(e.to_string()))?;
        Ok(drop_untouched_nulls(draft, edited))
    }
}

/// Columns offered for editing: everything but a lone rowid key and the
/// foreign-key columns driven through some other column.
fn editable_columns(
    conn: &rusqlite::Connection,
    table: &str,
    layout: &ForeignKeyLayout,
) -> Result<Vec<Column>, SessionError> {
    Ok(column_list(conn, table, ColumnFilter::ExcludeRowidPks)?
        .into_iter()
        .filter(|column| !layout.is_remainder(&column.name))
        .collect())
}

/// A new row leaves columns it never set to the engine's defaults.
fn drop_untouched_nulls(draft: &RowDraft, edited: RowData) -> RowData {
    if !draft.is_new() {
        return edited;
    }
    edited
        .into_iter()
        .filter(|(column, value)| *value != Value::Null || draft.row.contains(column))
        .collect()
}

/// Merge answers into the draft. A reference answer is spread across every
/// child column of its foreign key.
fn fold_answers(draft: &mut RowDraft, prompts: &[ColumnPrompt], answers: &Answers) -> Result<(), SessionError> {
    for prompt in prompts {
        match prompt {
            ColumnPrompt::Scalar(column) => {
                let value = answers.value(&column.name)?;
                let untouched = matches!(&value, Value::Text(t) if t.is_empty());
                if draft.is_new() && untouched && !draft.row.contains(&column.name) {
                    continue;
                }
                draft.row.insert(column.name.clone(), value);
            }
            ColumnPrompt::Reference { column, fk, selection } => {
                let index = answers.choice(column)?;
                let chosen = selection.choices.get(index).and_then(|c| c.row_key());
                match chosen {
                    Some(key) => draft.row.merge(key.rekey(&fk.parent_to_child())),
                    None => {
                        for child in &fk.from {
                            draft.row.insert(child.clone(), Value::Null);
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
