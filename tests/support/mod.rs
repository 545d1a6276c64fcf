// tests/support/mod.rs
// Scripted stand-in for the operator

#![allow(dead_code)]

use rusqlite::types::Value;
use sinq::prompt::{Answer, Answers, Notice, PromptError, Prompter, Question, QuestionKind};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub enum Step {
    /// Raw text for a free-text question; empty accepts the default.
    Type(String),
    /// Option whose label contains the text (searches and menus).
    Pick(String),
    /// Menu shortcut.
    Key(char),
    Index(usize),
    /// Whatever the question preselects.
    Default,
    /// Result of an external edit.
    Edit(String),
    Cancel,
}

pub fn typed(text: &str) -> Step {
    Step::Type(text.to_string())
}

pub fn pick(label: &str) -> Step {
    Step::Pick(label.to_string())
}

pub fn edit(text: &str) -> Step {
    Step::Edit(text.to_string())
}

/// What the session asked, for assertions.
#[derive(Debug, Clone)]
pub struct Asked {
    pub name: String,
    pub message: String,
    pub options: Vec<String>,
    pub default_index: Option<usize>,
    pub default_value: Option<Value>,
    pub initial_text: Option<String>,
}

#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    steps: VecDeque<Step>,
    pub asked: Vec<Asked>,
    pub notices: Vec<Notice>,
}

impl ScriptedPrompter {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    pub fn asked_names(&self) -> Vec<&str> {
        self.asked.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn last_asked(&self, name: &str) -> Option<&Asked> {
        self.asked.iter().rev().find(|a| a.name == name)
    }

    pub fn has_notice(&self, fragment: &str) -> bool {
        self.notices.iter().any(|n| n.message().contains(fragment))
    }

    fn record(question: &Question) -> Asked {
        let mut asked = Asked {
            name: question.name.clone(),
            message: question.message.clone(),
            options: Vec::new(),
            default_index: None,
            default_value: None,
            initial_text: None,
        };
        match &question.kind {
            QuestionKind::FreeText { default, .. } => asked.default_value = default.clone(),
            QuestionKind::Search { options, default } => {
                asked.options = options.clone();
                asked.default_index = Some(*default);
            }
            QuestionKind::Menu { options, default } => {
                asked.options = options.iter().map(|o| o.label.clone()).collect();
                asked.default_index = Some(*default);
            }
            QuestionKind::ExternalEdit { initial, .. } => asked.initial_text = Some(initial.clone()),
        }
        asked
    }

    fn answer(question: &Question, step: Step) -> Result<Answer, PromptError> {
        let find = |labels: Vec<String>, wanted: &str| {
            labels
                .iter()
                .position(|label| label.contains(wanted))
                .unwrap_or_else(|| panic!("no option containing '{}' in {:?}", wanted, labels))
        };
        match (&question.kind, step) {
            (_, Step::Cancel) => Err(PromptError::Interrupted),
            (QuestionKind::FreeText { default, transform, .. }, Step::Type(text)) => {
                if text.is_empty() {
                    if let Some(value) = default {
                        return Ok(Answer::Value(value.clone()));
                    }
                }
                Ok(Answer::Value(match transform {
                    Some(transform) => transform(text.as_str()),
                    None => Value::Text(text),
                }))
            }
            (QuestionKind::FreeText { default, .. }, Step::Default) => {
                Ok(Answer::Value(default.clone().unwrap_or(Value::Null)))
            }
            (QuestionKind::Search { options, .. }, Step::Pick(wanted)) => {
                Ok(Answer::Choice(find(options.clone(), wanted.as_str())))
            }
            (QuestionKind::Menu { options, .. }, Step::Pick(wanted)) => Ok(Answer::Choice(find(
                options.iter().map(|o| o.label.clone()).collect(),
                wanted.as_str(),
            ))),
            (QuestionKind::Menu { options, .. }, Step::Key(key)) => Ok(Answer::Choice(
                options
                    .iter()
                    .position(|o| o.shortcut == key)
                    .unwrap_or_else(|| panic!("no shortcut '{}' in {:?}", key, options)),
            )),
            (QuestionKind::Search { .. } | QuestionKind::Menu { .. }, Step::Index(index)) => {
                Ok(Answer::Choice(index))
            }
            (QuestionKind::Search { default, .. } | QuestionKind::Menu { default, .. }, Step::Default) => {
                Ok(Answer::Choice(*default))
            }
            (QuestionKind::ExternalEdit { .. }, Step::Edit(text)) => Ok(Answer::Text(text)),
            (QuestionKind::ExternalEdit { initial, .. }, Step::Default) => Ok(Answer::Text(initial.clone())),
            (kind, step) => panic!("step {:?} does not fit question '{}' ({:?})", step, question.name, kind),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, questions: &[Question]) -> Result<Answers, PromptError> {
        let mut answers = Answers::new();
        for question in questions {
            self.asked.push(Self::record(question));
            let Some(step) = self.steps.pop_front() else {
                return Err(PromptError::Closed);
            };
            answers.insert(question.name.clone(), Self::answer(question, step)?);
        }
        Ok(answers)
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
