//! Assignment statements.
//!
//! Two statement forms update the variable store; they are tried in this
//! order and the first match consumes the line:
//!
//! | Form | Example | Effect |
//! |------|---------|--------|
//! | declaration | `let x 5`, `let x = 5` | store the value text (`"0"` if empty) |
//! | mutation | `x += 3`, `x -= 1` | integer add / subtract |
//! | | `x++`, `x--` | ±1 |
//! | | `x = some text` | store the raw text |
//!
//! Whether a name is being assigned is decided by [`assignment_op`], which the
//! substitution engine also uses so an assignment target is never replaced by
//! its own value.

use std::sync::OnceLock;

use regex::Regex;

use crate::text::{format_int, parse_int};
use crate::var::{SetOutcome, VarStore};

// ── Assignment operators ──────────────────────────────────────────────────────

/// Operators that mark the word before them as an assignment target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Inc,
    Dec,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    Assign,
}

fn assign_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[ \t]*(\+\+|--|\+=|-=|\*=|/=|==|=)")
            .expect("assignment operator pattern")
    })
}

/// If `rest` (the text right after a name) starts with an assignment
/// operator, after optional blanks, return it and the text following it.
///
/// `==` is a comparison, not an assignment.
pub fn assignment_op(rest: &str) -> Option<(AssignOp, &str)> {
    let caps = assign_re().captures(rest)?;
    let op = caps.get(1)?;
    let kind = match op.as_str() {
        "++" => AssignOp::Inc,
        "--" => AssignOp::Dec,
        "+=" => AssignOp::AddAssign,
        "-=" => AssignOp::SubAssign,
        "*=" => AssignOp::MulAssign,
        "/=" => AssignOp::DivAssign,
        "=" => AssignOp::Assign,
        _ => return None,
    };
    Some((kind, &rest[op.end()..]))
}

/// Is the word ending at byte `word_end` of `line` the target of an
/// assignment?  True when an assignment operator follows it, or when it is
/// the name right after a leading `let`.
pub fn is_assignment_target(line: &str, word_start: usize, word_end: usize) -> bool {
    if assignment_op(&line[word_end..]).is_some() {
        return true;
    }
    // `parse_statement` skips leading blanks, so `let` may be indented.
    match strip_let(line.trim_start()) {
        Some(rest) => line.len() - rest.trim_start().len() == word_start,
        None => false,
    }
}

// ── Statements ────────────────────────────────────────────────────────────────

/// A parsed assignment statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `let name value`
    Declare { name: String, value: String },
    /// `name <op> [operand]`
    Mutate { name: String, op: Mutation },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Add(i64),
    Sub(i64),
    Inc,
    Dec,
    Assign(String),
}

/// Parse a (substituted) line as a declaration, then as a mutation.
/// `None` means the line is not an assignment and belongs to the dispatcher.
///
/// A line starting with `let` is only ever a declaration: `let` with no name
/// is not a statement at all.
pub fn parse_statement(line: &str) -> Option<Stmt> {
    let line = line.trim_start();
    match strip_let(line) {
        Some(rest) => parse_declaration(rest),
        None => parse_mutation(line),
    }
}

/// `rest` is the text after `let`.
fn parse_declaration(rest: &str) -> Option<Stmt> {
    let rest = rest.trim_start();

    let name_end = rest
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(rest.len());
    if name_end == 0 {
        return None;
    }
    let name = rest[..name_end].to_owned();

    let after = rest[name_end..].trim_start();
    let after = after.strip_prefix('=').unwrap_or(after).trim_start();
    let value = match after.find('#') {
        Some(i) => &after[..i],
        None => after,
    };
    let value = if value.trim().is_empty() { "0" } else { value };

    Some(Stmt::Declare { name, value: value.to_owned() })
}

fn parse_mutation(line: &str) -> Option<Stmt> {
    let name_end = line
        .find(|c: char| !is_ident_char(c))
        .unwrap_or(line.len());
    if name_end == 0 {
        return None;
    }
    let (op, operand) = assignment_op(&line[name_end..])?;
    let op = match op {
        AssignOp::AddAssign => Mutation::Add(parse_int(operand)),
        AssignOp::SubAssign => Mutation::Sub(parse_int(operand)),
        AssignOp::Inc => Mutation::Inc,
        AssignOp::Dec => Mutation::Dec,
        AssignOp::Assign => Mutation::Assign(operand.trim_start().to_owned()),
        AssignOp::MulAssign | AssignOp::DivAssign => return None,
    };
    Some(Stmt::Mutate { name: line[..name_end].to_owned(), op })
}

impl Stmt {
    /// Apply the statement to `vars`.
    pub fn apply(&self, vars: &mut VarStore) -> SetOutcome {
        match self {
            Stmt::Declare { name, value } => vars.set(name, value),
            Stmt::Mutate { name, op } => {
                let current = vars.get(name).map(parse_int).unwrap_or(0);
                let next = match op {
                    Mutation::Assign(text) => return vars.set(name, text),
                    Mutation::Add(n) => current.saturating_add(*n),
                    Mutation::Sub(n) => current.saturating_sub(*n),
                    Mutation::Inc => current.saturating_add(1),
                    Mutation::Dec => current.saturating_sub(1),
                };
                vars.set(name, &format_int(next))
            }
        }
    }
}

// ── Small utilities ───────────────────────────────────────────────────────────

pub(crate) fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `let` followed by a blank; returns the text after `let`.
fn strip_let(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("let")?;
    rest.starts_with([' ', '\t']).then_some(rest)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
