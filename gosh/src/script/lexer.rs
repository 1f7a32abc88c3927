//! Line-and-brace-aware script lexer.
//!
//! Turns raw script text into a flat token sequence:
//!
//! ```text
//! let n 3                 Line("let n 3")
//! for i 1 $n {            LoopHeader { var: "i", start: "1", end: "$n" }
//!     print $i            Line("print $i")
//! }                       LoopBodyEnd
//! print done              Line("print done")
//! ```
//!
//! Blank lines and `#` comments never produce tokens.  A `for` header is
//! followed by its body lines and a closing [`Token::LoopBodyEnd`]; a header
//! whose body cannot be delimited yields a [`Token::Fault`] instead and no
//! body tokens.
//!
//! The body starts at the first `{` after the header's end token, scanning
//! across line breaks if necessary, and ends at the matching `}`.  Lexing
//! resumes right after that `}`, so text following it on the same line is the
//! next line.

use super::error::ScriptError;
use crate::text::truncate_chars;

/// Default cap on a single line, in characters.
pub const LINE_CAP: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An executable line, leading/trailing whitespace trimmed.
    Line { line: usize, text: String },
    /// `for var start end`; the bounds are kept as raw text.
    LoopHeader {
        line: usize,
        var: String,
        start: String,
        end: String,
    },
    /// Closes the body opened by the preceding [`Token::LoopHeader`].
    LoopBodyEnd,
    /// A loop that could not be delimited.
    Fault(ScriptError),
}

/// Tokenize a whole script.
pub fn tokenize(src: &str, line_cap: usize) -> Vec<Token> {
    let mut lexer = Lexer {
        src,
        pos: 0,
        line_cap,
        lines: LineCounter::default(),
        tokens: Vec::new(),
    };
    lexer.run();
    lexer.tokens
}

// ── Lexer ─────────────────────────────────────────────────────────────────────

struct Lexer<'a> {
    src: &'a str,
    /// Byte offset of the next unread character.
    pos: usize,
    line_cap: usize,
    lines: LineCounter,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn run(&mut self) {
        while self.pos < self.src.len() {
            let start = self.pos;
            let lineno = self.lines.line_at(self.src, start);
            let raw = self.take_line();
            let (text, cut) = truncate_chars(raw, self.line_cap);
            if cut {
                log::debug!("line {lineno}: truncated to {} characters", self.line_cap);
            }

            let trimmed = text.trim();
            if is_skippable(trimmed) {
                continue;
            }

            if let Some(rest) = strip_keyword(trimmed, "for") {
                // Offset of `rest` inside the source, so the brace scan can
                // start right after the header tokens.
                let rest_at = start + (text.len() - text.trim_start().len()) + (trimmed.len() - rest.len());
                self.lex_loop(lineno, rest, rest_at);
                continue;
            }

            self.tokens.push(Token::Line { line: lineno, text: trimmed.to_owned() });
        }
    }

    /// Consume one raw line (without its terminator).  `\r\n` counts as a
    /// single terminator.
    fn take_line(&mut self) -> &'a str {
        let src: &'a str = self.src;
        let rest = &src[self.pos..];
        let end = rest.find(['\n', '\r']).unwrap_or(rest.len());
        let line = &rest[..end];
        let mut advance = end;
        if rest[end..].starts_with("\r\n") {
            advance += 2;
        } else if end < rest.len() {
            advance += 1;
        }
        self.pos += advance;
        line
    }

    fn lex_loop(&mut self, lineno: usize, header: &str, header_at: usize) {
        let Some((var, after_var)) = split_word(header) else {
            self.fault(lineno, "malformed loop header: missing variable");
            return;
        };
        let Some((start, after_start)) = split_word(after_var) else {
            self.fault(lineno, "malformed loop header: missing start value");
            return;
        };
        let Some((end, after_end)) = split_word(after_start) else {
            self.fault(lineno, "malformed loop header: missing end value");
            return;
        };

        let scan_from = header_at + (header.len() - after_end.len());
        let Some(open) = self.src[scan_from..].find('{').map(|i| scan_from + i) else {
            // Resume on the line after the header.
            self.fault(lineno, "no opening brace");
            return;
        };
        let Some(close) = matching_brace(self.src, open) else {
            self.fault(lineno, "no closing brace");
            self.pos = self.src.len();
            return;
        };

        self.tokens.push(Token::LoopHeader {
            line: lineno,
            var: var.to_owned(),
            start: start.to_owned(),
            end: end.to_owned(),
        });

        let body = &self.src[open + 1..close];
        let mut body_line = self.lines.line_at(self.src, open + 1);
        for raw in body.split('\n') {
            for piece in raw.split('\r') {
                let (text, _) = truncate_chars(piece, self.line_cap);
                let trimmed = text.trim();
                if !is_skippable(trimmed) && !is_brace_only(trimmed) {
                    self.tokens.push(Token::Line { line: body_line, text: trimmed.to_owned() });
                }
            }
            body_line += 1;
        }
        self.tokens.push(Token::LoopBodyEnd);

        self.pos = close + 1;
    }

    fn fault(&mut self, line: usize, message: &str) {
        log::warn!("line {line}: {message}");
        self.tokens.push(Token::Fault(ScriptError::structural(line, message)));
    }
}

// ── Line numbering ────────────────────────────────────────────────────────────

/// Maps byte offsets to 1-based line numbers.  Offsets must be queried in
/// non-decreasing order.
#[derive(Debug)]
struct LineCounter {
    counted_to: usize,
    line: usize,
}

impl Default for LineCounter {
    fn default() -> Self {
        Self { counted_to: 0, line: 1 }
    }
}

impl LineCounter {
    fn line_at(&mut self, src: &str, offset: usize) -> usize {
        if offset > self.counted_to {
            self.line += src[self.counted_to..offset].matches('\n').count();
            self.counted_to = offset;
        }
        self.line
    }
}

// ── Small utilities ───────────────────────────────────────────────────────────

/// Index of the `}` matching the `{` at `open`, counting nested pairs.
/// `None` if the text ends first.
pub fn matching_brace(src: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in src[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Blank lines and `#` comments.
fn is_skippable(trimmed: &str) -> bool {
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn is_brace_only(trimmed: &str) -> bool {
    trimmed.chars().all(|c| c == '{' || c == '}')
}

/// `keyword` followed by whitespace; returns the text after the keyword.
fn strip_keyword<'s>(line: &'s str, keyword: &str) -> Option<&'s str> {
    let rest = line.strip_prefix(keyword)?;
    rest.starts_with([' ', '\t']).then_some(rest)
}

/// Split off the first whitespace-delimited word from `s`.
/// Returns `(word, rest)` or `None` if `s` is empty/all-whitespace.
fn split_word(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
