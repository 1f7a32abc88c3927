//! Built-in shell commands.
//!
//! Each entry in [`COMMANDS`] pairs a keyword with a parser that validates its
//! own arguments.  [`parse_command`] walks the table in order and returns the
//! first command that accepts the line; the interpreter then carries it out
//! against its [`Host`](crate::device::Host).
//!
//! | Command | Arguments |
//! |---------|-----------|
//! | `rect`  | `x y w h color [border]` |
//! | `cube`  | `x y w h color dark bright` |
//! | `print`, `echo` | text (trailing blanks trimmed) |
//! | `clear` | (none) |
//! | `help`, `info`, `i` | (none) |
//! | `cat`   | file name |
//! | `list`  | (none) |
//!
//! Numeric arguments are signed decimal integers.  Colors must be palette
//! indices 0–15; a command with an out-of-range color does not match at all.

use crate::device::Color;
use crate::text::take_int;

/// A recognized command with its arguments already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Rect {
        x: i64,
        y: i64,
        w: i64,
        h: i64,
        color: Color,
        border: Option<Color>,
    },
    Cube {
        x: i64,
        y: i64,
        w: i64,
        h: i64,
        color: Color,
        dark: Color,
        bright: Color,
    },
    Print(String),
    Clear,
    Help,
    Cat(String),
    List,
}

type Parser = fn(&str) -> Option<Command>;

/// Keyword → argument parser, in dispatch order.
pub const COMMANDS: &[(&str, Parser)] = &[
    ("rect", parse_rect),
    ("cube", parse_cube),
    ("print", parse_print),
    ("echo", parse_print),
    ("clear", parse_clear),
    ("help", parse_help),
    ("info", parse_help),
    ("i", parse_help),
    ("cat", parse_cat),
    ("list", parse_list),
];

/// Summary printed by `help`.
pub const HELP: &[&str] = &[
    "Commands:",
    "rect x y width height color [border]",
    "cube x y width height color darkcolor brightcolor",
    "print text, echo text",
    "let name value, name = text, name += n, name -= n, name++, name--",
    "for var start end { ... }",
    "cat file, list, run file, vars, clear",
];

/// Find the first command that accepts `line`.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim_start();
    COMMANDS.iter().find_map(|(keyword, parse)| {
        let args = strip_keyword(line, keyword)?;
        parse(args)
    })
}

// ── Parsers ───────────────────────────────────────────────────────────────────

fn parse_rect(args: &str) -> Option<Command> {
    let (x, rest) = take_int(args)?;
    let (y, rest) = take_int(rest)?;
    let (w, rest) = take_int(rest)?;
    let (h, rest) = take_int(rest)?;
    let (color, rest) = take_color(rest)?;
    let border = match take_int(rest) {
        Some((b, _)) => Some(Color::new(b)?),
        None => None,
    };
    Some(Command::Rect { x, y, w, h, color, border })
}

fn parse_cube(args: &str) -> Option<Command> {
    let (x, rest) = take_int(args)?;
    let (y, rest) = take_int(rest)?;
    let (w, rest) = take_int(rest)?;
    let (h, rest) = take_int(rest)?;
    let (color, rest) = take_color(rest)?;
    let (dark, rest) = take_color(rest)?;
    let (bright, _) = take_color(rest)?;
    Some(Command::Cube { x, y, w, h, color, dark, bright })
}

fn parse_print(args: &str) -> Option<Command> {
    Some(Command::Print(args.trim().to_owned()))
}

fn parse_cat(args: &str) -> Option<Command> {
    let name = args.trim();
    (!name.is_empty()).then(|| Command::Cat(name.to_owned()))
}

// Commands that take nothing; trailing text means no match.

fn parse_clear(args: &str) -> Option<Command> {
    args.trim().is_empty().then_some(Command::Clear)
}

fn parse_help(args: &str) -> Option<Command> {
    args.trim().is_empty().then_some(Command::Help)
}

fn parse_list(args: &str) -> Option<Command> {
    args.trim().is_empty().then_some(Command::List)
}

// ── Small utilities ───────────────────────────────────────────────────────────

fn take_color(s: &str) -> Option<(Color, &str)> {
    let (n, rest) = take_int(s)?;
    Some((Color::new(n)?, rest))
}

/// Text after `keyword` when the line's first word is exactly `keyword`.
fn strip_keyword<'s>(line: &'s str, keyword: &str) -> Option<&'s str> {
    let rest = line.strip_prefix(keyword)?;
    (rest.is_empty() || rest.starts_with([' ', '\t'])).then_some(rest)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
