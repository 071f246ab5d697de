use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};

use crate::error::PromptError;

/// A single free-text question put to the operator.
#[derive(Clone, Debug)]
pub struct InputRequest<'a> {
    pub field: &'a str,
    pub message: &'a str,
    /// Pre-filled text, usually a rejected given value.
    pub initial: Option<&'a str>,
}

/// Interactive I/O seam. Implementations block until the operator answers.
///
/// `input` must keep asking until `check` accepts the answer; it never returns
/// text that `check` rejected.
pub trait PromptDriver {
    fn input(
        &mut self,
        request: &InputRequest<'_>,
        check: &mut dyn FnMut(&str) -> Result<(), String>,
    ) -> Result<String, PromptError>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError>;
}

/// Terminal prompts rendered with `dialoguer`.
pub struct TerminalPrompt {
    theme: ColorfulTheme,
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl PromptDriver for TerminalPrompt {
    fn input(
        &mut self,
        request: &InputRequest<'_>,
        check: &mut dyn FnMut(&str) -> Result<(), String>,
    ) -> Result<String, PromptError> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(request.message)
            .allow_empty(true);
        if let Some(initial) = request.initial {
            input = input.with_initial_text(initial);
        }
        input
            .validate_with(|value: &String| -> Result<(), String> { check(value.as_str()) })
            .interact_text()
            .map_err(|err| match err {
                dialoguer::Error::IO(io) if io.kind() == std::io::ErrorKind::Interrupted => {
                    PromptError::Cancelled
                }
                other => PromptError::Terminal(other.to_string()),
            })
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError> {
        Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact_opt()
            .map_err(|err| PromptError::Terminal(err.to_string()))?
            .ok_or(PromptError::Cancelled)
    }
}

/// A canned operator answer for [`ScriptedPrompt`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Confirm(bool),
    Cancel,
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Answer::Text(value.to_string())
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        Answer::Confirm(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptKind {
    Text,
    Confirm,
}

#[derive(Clone, Debug)]
pub struct PromptRecord {
    pub kind: PromptKind,
    pub message: String,
    pub initial: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Rejection {
    pub message: String,
    pub answer: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default)]
pub struct Transcript {
    pub prompts: Vec<PromptRecord>,
    pub rejections: Vec<Rejection>,
}

impl Transcript {
    pub fn messages(&self) -> Vec<&str> {
        self.prompts.iter().map(|p| p.message.as_str()).collect()
    }
}

/// Answers prompts from a fixed queue and records everything it was asked.
/// Running out of answers behaves like the operator cancelling.
#[derive(Clone, Default)]
pub struct ScriptedPrompt {
    answers: Arc<Mutex<VecDeque<Answer>>>,
    transcript: Arc<Mutex<Transcript>>,
}

impl ScriptedPrompt {
    pub fn new<I, A>(answers: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Answer>,
    {
        Self {
            answers: Arc::new(Mutex::new(answers.into_iter().map(Into::into).collect())),
            transcript: Arc::new(Mutex::new(Transcript::default())),
        }
    }

    /// A driver with no answers: any prompt fails.
    pub fn silent() -> Self {
        Self::new(Vec::<Answer>::new())
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.lock().expect("transcript poisoned").clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().expect("answers poisoned").len()
    }

    fn next_answer(&self) -> Option<Answer> {
        self.answers.lock().expect("answers poisoned").pop_front()
    }

    fn record(&self, kind: PromptKind, message: &str, initial: Option<&str>) {
        self.transcript
            .lock()
            .expect("transcript poisoned")
            .prompts
            .push(PromptRecord {
                kind,
                message: message.to_string(),
                initial: initial.map(str::to_string),
            });
    }

    fn reject(&self, message: &str, answer: &str, reason: &str) {
        self.transcript
            .lock()
            .expect("transcript poisoned")
            .rejections
            .push(Rejection {
                message: message.to_string(),
                answer: answer.to_string(),
                reason: reason.to_string(),
            });
    }
}

impl PromptDriver for ScriptedPrompt {
    fn input(
        &mut self,
        request: &InputRequest<'_>,
        check: &mut dyn FnMut(&str) -> Result<(), String>,
    ) -> Result<String, PromptError> {
        self.record(PromptKind::Text, request.message, request.initial);
        loop {
            let text = match self.next_answer() {
                Some(Answer::Text(text)) => text,
                Some(Answer::Confirm(flag)) => flag.to_string(),
                Some(Answer::Cancel) => return Err(PromptError::Cancelled),
                None => return Err(PromptError::Exhausted(request.message.to_string())),
            };
            match check(&text) {
                Ok(()) => return Ok(text),
                Err(reason) => self.reject(request.message, &text, &reason),
            }
        }
    }

    fn confirm(&mut self, message: &str, _default: bool) -> Result<bool, PromptError> {
        self.record(PromptKind::Confirm, message, None);
        loop {
            match self.next_answer() {
                Some(Answer::Confirm(flag)) => return Ok(flag),
                Some(Answer::Text(text)) => match parse_yes_no(&text) {
                    Some(flag) => return Ok(flag),
                    None => self.reject(message, &text, "expected yes or no"),
                },
                Some(Answer::Cancel) => return Err(PromptError::Cancelled),
                None => return Err(PromptError::Exhausted(message.to_string())),
            }
        }
    }
}

pub(crate) fn parse_yes_no(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" => Some(true),
        "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
