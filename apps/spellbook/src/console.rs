use std::{fmt::Display, io::Write};

use rustyline::{error::ReadlineError, DefaultEditor};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("input closed")]
    Closed,
    #[error("terminal input failed: {0}")]
    Readline(#[from] ReadlineError),
    #[error("terminal output failed: {0}")]
    Output(#[from] std::io::Error),
}

pub trait LineSource {
    /// Next line typed at `prompt`; `Err(Closed)` once input has ended.
    fn read_line(&mut self, prompt: &str) -> Result<String, ConsoleError>;
}

pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    pub fn new() -> Result<Self, ConsoleError> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for Terminal {
    fn read_line(&mut self, prompt: &str) -> Result<String, ConsoleError> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(line)
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Err(ConsoleError::Closed),
            Err(error) => Err(error.into()),
        }
    }
}

pub struct Console<I, W> {
    input: I,
    out: W,
}

impl<I: LineSource, W: Write> Console<I, W> {
    pub fn new(input: I, out: W) -> Self {
        Self { input, out }
    }

    pub fn say(&mut self, text: impl Display) -> Result<(), ConsoleError> {
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    pub fn ask(&mut self, prompt: &str) -> Result<String, ConsoleError> {
        self.out.flush()?;
        let line = self.input.read_line(prompt)?;
        Ok(line.trim().to_string())
    }

    /// Re-prompts until the answer is an integer in `min..=max`.
    pub fn ask_int(&mut self, prompt: &str, min: u32, max: u32) -> Result<u32, ConsoleError> {
        loop {
            let answer = self.ask(prompt)?;
            match answer.parse::<i64>() {
                Err(_) => self.say("Invalid Input. Please enter an integer!")?,
                Ok(value) => match u32::try_from(value) {
                    Ok(value) if (min..=max).contains(&value) => return Ok(value),
                    _ => self.say("Invalid Input. Please enter a valid option!")?,
                },
            }
        }
    }

    pub fn ask_yes_no(&mut self, prompt: &str) -> Result<bool, ConsoleError> {
        loop {
            match self.ask(prompt)?.to_ascii_lowercase().as_str() {
                "yes" => return Ok(true),
                "no" => return Ok(false),
                _ => self.say("Invalid input. Please enter \"yes\" or \"no\".")?,
            }
        }
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (I, W) {
        (self.input, self.out)
    }
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
