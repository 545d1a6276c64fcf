// src/prompt/terminal.rs
// Line-oriented prompter for interactive terminals

use super::input::escape_for_input;
use super::{Answer, Answers, MenuOption, Notice, PromptError, Prompter, Question, QuestionKind};
use crossterm::style::Stylize;
use crossterm::tty::IsTty;
use rusqlite::types::Value;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::Command;
use unicode_normalization::UnicodeNormalization;

/// Typed on its own, cancels the current prompt.
pub const CANCEL_INPUT: &str = "..";

/// Accent- and case-insensitive form used to match search filters.
pub fn fold_for_search(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
    editor: Option<String>,
    colors: bool,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter on the process's own terminal. Fails when standard input is
    /// not a terminal.
    pub fn stdio(editor: Option<String>) -> Result<Self, PromptError> {
        let stdin = io::stdin();
        if !stdin.is_tty() {
            return Err(PromptError::Unsupported(
                "standard input is not a terminal".to_string(),
            ));
        }
        let stdout = io::stdout();
        let colors = stdout.is_tty();
        Ok(Self::new(stdin.lock(), stdout)
            .with_editor(editor)
            .with_colors(colors))
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            editor: None,
            colors: false,
        }
    }

    pub fn with_editor(mut self, editor: Option<String>) -> Self {
        self.editor = editor.filter(|e| !e.trim().is_empty());
        self
    }

    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn hint(&self, text: &str) -> String {
        if self.colors {
            text.yellow().dim().to_string()
        } else {
            text.to_string()
        }
    }

    fn accent(&self, text: &str) -> String {
        if self.colors {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    fn null_marker(&self) -> String {
        if self.colors {
            "null".red().dim().to_string()
        } else {
            "null".to_string()
        }
    }

    fn read_line(&mut self) -> Result<String, PromptError> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }
        let line = line.trim_end_matches(['\n', '\r']).to_string();
        if line.trim() == CANCEL_INPUT {
            return Err(PromptError::Interrupted);
        }
        Ok(line)
    }

    fn write_header(&mut self, question: &Question) -> Result<(), PromptError> {
        if let Some(prefix) = &question.prefix {
            let prefix = if self.colors {
                prefix.as_str().green().to_string()
            } else {
                prefix.clone()
            };
            writeln!(self.output, "{}", prefix)?;
        }
        Ok(())
    }

    fn ask_free_text(
        &mut self,
        question: &Question,
        default: &Option<Value>,
        hint: &Option<String>,
        transform: Option<&super::ValueTransform>,
    ) -> Result<Answer, PromptError> {
        self.write_header(question)?;
        let mut line = format!("? {}", question.message);
        if let Some(hint) = hint {
            line.push(' ');
            line.push_str(&self.hint(hint));
        }
        match default {
            Some(Value::Null) => line.push_str(&format!(" [{}]", self.null_marker())),
            Some(value) => line.push_str(&format!(" [{}]", self.accent(&escape_for_input(value)))),
            None => {}
        }
        write!(self.output, "{}: ", line)?;

        let typed = self.read_line()?;
        if typed.is_empty() {
            if let Some(value) = default {
                return Ok(Answer::Value(value.clone()));
            }
        }
        let value = match transform {
            Some(transform) => transform(typed.as_str()),
            None => Value::Text(typed),
        };
        Ok(Answer::Value(value))
    }

    fn ask_search(
        &mut self,
        question: &Question,
        options: &[String],
        default: usize,
    ) -> Result<Answer, PromptError> {
        self.write_header(question)?;
        writeln!(self.output, "? {}", question.message)?;
        if options.is_empty() {
            writeln!(self.output, "  (nothing to choose from)")?;
            return Err(PromptError::Interrupted);
        }
        let default = default.min(options.len() - 1);
        let all: Vec<usize> = (0..options.len()).collect();
        self.write_numbered(options, &all, default)?;

        loop {
            let prompt = self.hint(&format!("number or filter text [{}]:", default + 1));
            write!(self.output, "  {} ", prompt)?;
            let typed = self.read_line()?;
            let typed = typed.trim();
            if typed.is_empty() {
                return Ok(Answer::Choice(default));
            }
            if let Ok(number) = typed.parse::<usize>() {
                if (1..=options.len()).contains(&number) {
                    return Ok(Answer::Choice(number - 1));
                }
            }

            let needle = fold_for_search(typed);
            let matches: Vec<usize> = options
                .iter()
                .enumerate()
                .filter(|(_, option)| fold_for_search(option).contains(&needle))
                .map(|(index, _)| index)
                .collect();
            match matches.as_slice() {
                [] => writeln!(self.output, "  no matches for '{}'", typed)?,
                [single] => return Ok(Answer::Choice(*single)),
                _ => self.write_numbered(options, &matches, default)?,
            }
        }
    }

    fn write_numbered(&mut self, options: &[String], shown: &[usize], default: usize) -> Result<(), PromptError> {
        for &index in shown {
            let marker = if index == default { ">" } else { " " };
            writeln!(self.output, "{} {:>3}) {}", marker, index + 1, options[index])?;
        }
        Ok(())
    }

    fn ask_menu(
        &mut self,
        question: &Question,
        options: &[MenuOption],
        default: usize,
    ) -> Result<Answer, PromptError> {
        self.write_header(question)?;
        writeln!(self.output, "? {}", question.message)?;
        if options.is_empty() {
            return Err(PromptError::Interrupted);
        }
        let default = default.min(options.len() - 1);
        for option in options {
            writeln!(self.output, "  {}) {}", option.shortcut, option.label)?;
        }

        loop {
            let prompt = self.hint(&format!("choice [{}]:", options[default].shortcut));
            write!(self.output, "  {} ", prompt)?;
            let typed = self.read_line()?;
            let typed = typed.trim();
            if typed.is_empty() {
                return Ok(Answer::Choice(default));
            }
            let mut chars = typed.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                if let Some(index) = options
                    .iter()
                    .position(|o| o.shortcut.eq_ignore_ascii_case(&c))
                {
                    return Ok(Answer::Choice(index));
                }
            }
            if let Ok(number) = typed.parse::<usize>() {
                if (1..=options.len()).contains(&number) {
                    return Ok(Answer::Choice(number - 1));
                }
            }
            writeln!(self.output, "  unknown choice '{}'", typed)?;
        }
    }

    fn ask_external(&mut self, question: &Question, initial: &str, extension: &str) -> Result<Answer, PromptError> {
        self.write_header(question)?;
        writeln!(self.output, "? {}", question.message)?;

        let mut file = tempfile::Builder::new()
            .prefix("sinq-")
            .suffix(&format!(".{}", extension))
            .tempfile()?;
        file.write_all(initial.as_bytes())?;
        file.flush()?;

        self.launch_editor(file.path())?;
        let edited = fs::read_to_string(file.path())?;
        Ok(Answer::Text(edited))
    }

    fn editor_command(&self) -> Option<String> {
        ["VISUAL", "EDITOR"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .chain(self.editor.clone())
            .find(|cmd| !cmd.trim().is_empty())
    }

    fn launch_editor(&mut self, path: &Path) -> Result<(), PromptError> {
        match self.editor_command() {
            Some(command_line) => {
                let mut parts = command_line.split_whitespace();
                let program = parts
                    .next()
                    .ok_or_else(|| PromptError::Editor("empty editor command".to_string()))?;
                tracing::debug!("Launching editor '{}' on {:?}", command_line, path);
                let status = Command::new(program)
                    .args(parts)
                    .arg(path)
                    .status()
                    .map_err(|e| PromptError::Editor(format!("{}: {}", command_line, e)))?;
                if !status.success() {
                    return Err(PromptError::Editor(format!(
                        "'{}' exited with {}",
                        command_line, status
                    )));
                }
                Ok(())
            }
            None => {
                open::that(path).map_err(|e| PromptError::Editor(e.to_string()))?;
                write!(
                    self.output,
                    "  Opened {}. Press Enter once your changes are saved. ",
                    path.display()
                )?;
                self.read_line()?;
                Ok(())
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn ask(&mut self, questions: &[Question]) -> Result<Answers, PromptError> {
        let mut answers = Answers::new();
        for question in questions {
            let answer = match &question.kind {
                QuestionKind::FreeText {
                    default,
                    hint,
                    transform,
                } => self.ask_free_text(question, default, hint, transform.as_ref())?,
                QuestionKind::Search { options, default } => self.ask_search(question, options, *default)?,
                QuestionKind::Menu { options, default } => self.ask_menu(question, options, *default)?,
                QuestionKind::ExternalEdit { initial, extension } => {
                    self.ask_external(question, initial, extension)?
                }
            };
            answers.insert(question.name.clone(), answer);
        }
        Ok(answers)
    }

    fn notify(&mut self, notice: Notice) {
        let line = match (&notice, self.colors) {
            (Notice::Info(m), false) => m.clone(),
            (Notice::Warning(m), false) => format!("warning: {}", m),
            (Notice::Error(m), false) => format!("error: {}", m),
            (Notice::Info(m), true) => m.as_str().green().to_string(),
            (Notice::Warning(m), true) => format!("warning: {}", m).yellow().to_string(),
            (Notice::Error(m), true) => format!("error: {}", m).red().to_string(),
        };
        if let Err(e) = writeln!(self.output, "{}", line) {
            tracing::error!("Could not write notice '{}': {}", notice.message(), e);
        }
    }
}
