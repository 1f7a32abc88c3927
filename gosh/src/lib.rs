//! gosh: the shell of a small graphics OS.
//!
//! A fixed-slot variable store, a line-oriented scripting language with
//! counted loops, and a table of drawing and console commands.  The
//! interpreter drives any [`device::Host`]; the binary supplies a terminal
//! screen, a directory of scripts and the wall clock.

pub mod cli;
pub mod config;
pub mod device;
pub mod script;
pub mod terminal;
pub mod text;
pub mod var;
