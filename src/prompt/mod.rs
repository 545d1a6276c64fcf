// src/prompt/mod.rs
// Boundary between the edit session and whatever asks the operator questions

pub mod input;
pub mod terminal;

use rusqlite::types::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub use terminal::TerminalPrompter;

/// Converts raw typed text into the value stored for a free-text answer.
pub type ValueTransform = Box<dyn Fn(&str) -> Value>;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt cancelled by operator.")]
    Interrupted,
    #[error("Input closed.")]
    Closed,
    #[error("This terminal is not supported: {0}")]
    Unsupported(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("External editor failed: {0}")]
    Editor(String),
    #[error("No answer recorded for '{0}'.")]
    MissingAnswer(String),
}

#[derive(Debug)]
pub struct Question {
    pub name: String,
    pub message: String,
    /// Printed on its own line(s) before the question.
    pub prefix: Option<String>,
    pub kind: QuestionKind,
}

impl Question {
    pub fn new(name: impl Into<String>, message: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            prefix: None,
            kind,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

pub enum QuestionKind {
    /// Typed value. Empty input answers `default` unchanged.
    FreeText {
        default: Option<Value>,
        /// Rendering hint shown after the message (declared type, null marker).
        hint: Option<String>,
        transform: Option<ValueTransform>,
    },
    /// Single choice from a filterable list.
    Search { options: Vec<String>, default: usize },
    /// Single choice from a short menu with one-key shortcuts.
    Menu { options: Vec<MenuOption>, default: usize },
    /// Text edited outside the prompt, usually in the operator's editor.
    ExternalEdit { initial: String, extension: String },
}

impl fmt::Debug for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::FreeText {
                default,
                hint,
                transform,
            } => f
                .debug_struct("FreeText")
                .field("default", default)
                .field("hint", hint)
                .field("transform", &transform.as_ref().map(|_| "<fn>"))
                .finish(),
            QuestionKind::Search { options, default } => f
                .debug_struct("Search")
                .field("options", options)
                .field("default", default)
                .finish(),
            QuestionKind::Menu { options, default } => f
                .debug_struct("Menu")
                .field("options", options)
                .field("default", default)
                .finish(),
            QuestionKind::ExternalEdit { initial, extension } => f
                .debug_struct("ExternalEdit")
                .field("initial", initial)
                .field("extension", extension)
                .finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    pub shortcut: char,
}

impl MenuOption {
    pub fn new(shortcut: char, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            shortcut,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Value(Value),
    Choice(usize),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Answers(BTreeMap<String, Answer>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, answer: Answer) {
        self.0.insert(name.into(), answer);
    }

    pub fn get(&self, name: &str) -> Option<&Answer> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn value(&self, name: &str) -> Result<Value, PromptError> {
        match self.get(name) {
            Some(Answer::Value(value)) => Ok(value.clone()),
            Some(Answer::Text(text)) => Ok(Value::Text(text.clone())),
            _ => Err(PromptError::MissingAnswer(name.to_string())),
        }
    }

    pub fn choice(&self, name: &str) -> Result<usize, PromptError> {
        match self.get(name) {
            Some(Answer::Choice(index)) => Ok(*index),
            _ => Err(PromptError::MissingAnswer(name.to_string())),
        }
    }

    pub fn text(&self, name: &str) -> Result<String, PromptError> {
        match self.get(name) {
            Some(Answer::Text(text)) => Ok(text.clone()),
            _ => Err(PromptError::MissingAnswer(name.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Info(m) | Notice::Warning(m) | Notice::Error(m) => m,
        }
    }
}

/// Asks the operator one batch of questions at a time.
pub trait Prompter {
    fn ask(&mut self, questions: &[Question]) -> Result<Answers, PromptError>;

    fn notify(&mut self, notice: Notice);

    fn ask_one(&mut self, question: Question) -> Result<Answers, PromptError> {
        self.ask(std::slice::from_ref(&question))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers_accessors() {
        let mut answers = Answers::new();
        answers.insert("n", Answer::Value(Value::Integer(3)));
        answers.insert("c", Answer::Choice(2));
        answers.insert("t", Answer::Text("{}".into()));

        assert_eq!(answers.value("n").unwrap(), Value::Integer(3));
        assert_eq!(answers.choice("c").unwrap(), 2);
        assert_eq!(answers.text("t").unwrap(), "{}");
        assert!(matches!(answers.choice("n"), Err(PromptError::MissingAnswer(_))));
        assert!(matches!(answers.value("missing"), Err(PromptError::MissingAnswer(_))));
    }

    #[test]
    fn test_question_debug_hides_transform() {
        let question = Question::new(
            "name",
            "Name",
            QuestionKind::FreeText {
                default: None,
                hint: None,
                transform: Some(Box::new(|s: &str| Value::Text(s.to_string()))),
            },
        );
        let rendered = format!("{:?}", question);
        assert!(rendered.contains("<fn>"));
    }
}
