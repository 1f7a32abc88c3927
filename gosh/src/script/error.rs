//! Error kinds reported by the interpreter.
//!
//! None of these are fatal to the shell.  A missing script stops that one run,
//! a structural fault skips one loop, and an unrecognized line is dropped.
//! Capacity limits are not errors at all; they show up as
//! [`SetOutcome`](crate::var::SetOutcome) and [`Substitution::truncated`](super::expand::Substitution).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    /// The script source has no file by this name.
    #[error("{name}: file not found")]
    FileNotFound { name: String },

    /// A loop header whose body could not be delimited.
    #[error("line {line}: {message}")]
    Structural { line: usize, message: String },

    /// No statement parser or command accepted the line.
    #[error("Unknown command: {text}")]
    Unrecognized { text: String },
}

impl ScriptError {
    pub(crate) fn structural(line: usize, message: impl Into<String>) -> Self {
        ScriptError::Structural { line, message: message.into() }
    }
}
