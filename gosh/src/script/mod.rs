//! The shell's scripting language.
//!
//! A script is plain text, one statement or command per line:
//!
//! - Variable substitution (`$name`, bare lowercase words)
//! - `let name value` and the mutations `=`, `+=`, `-=`, `++`, `--`
//! - `for var start end { ... }` counted loops (inclusive bounds)
//! - Drawing and console commands (`rect`, `cube`, `print`, `clear`, …)
//!
//! # Quick start
//!
//! ```rust
//! use gosh::device::Recorder;
//! use gosh::script::{Interpreter, Options};
//!
//! let mut host = Recorder::new().with_file("demo", "let n 2\nfor i 1 $n { print $i }");
//! let mut interp = Interpreter::with_options(Options { pace: 0, ..Options::default() });
//! interp.execute_script("demo", &mut host).unwrap();
//! assert_eq!(host.console_lines(), vec!["1", "2"]);
//! ```

pub mod builtins;
pub mod error;
pub mod expand;
pub mod interp;
pub mod lexer;
pub mod stmt;

// Re-exports for convenience.
pub use error::ScriptError;
pub use interp::{Dispatch, Interpreter, Options, RunReport};
