//! Variable substitution.
//!
//! Every line is rewritten once, left to right, before any parser or command
//! sees it:
//!
//! | Sequence | Meaning |
//! |----------|---------|
//! | `$name`  | value of `name` (letters, digits, `_`); kept verbatim if unset |
//! | `name`   | a bare run of `a`–`z`; replaced only if set **and** not an assignment target |
//!
//! A bare word is an assignment target when an assignment operator follows it
//! (`x = 9`, `x++`, `x += 1`, …) or when it is the name in `let name …`; see
//! [`is_assignment_target`].  Substituted values are inserted literally and
//! never re-scanned.
//!
//! The result holds at most [`OUTPUT_CAP`] characters; anything beyond is cut
//! and reported through [`Substitution::truncated`].

use std::ops::Range;

use super::stmt::{is_assignment_target, is_ident_char};
use crate::text::BoundedBuf;
use crate::var::VarStore;

/// Longest substituted line, in characters (a 255-byte buffer less its
/// terminator).
pub const OUTPUT_CAP: usize = 254;

/// Which syntax introduced a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// `$name`
    Dollar,
    /// bare lowercase word
    Bare,
}

/// One variable reference inside a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
    pub kind: RefKind,
    /// The variable name (without `$`).
    pub name: &'a str,
    /// Byte range of the whole reference, `$` included.
    pub span: Range<usize>,
}

/// A line is a sequence of literal text and references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'a> {
    Text(&'a str),
    Ref(Reference<'a>),
}

/// Output of [`substitute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    /// `true` if the result was cut at [`OUTPUT_CAP`].
    pub truncated: bool,
}

/// Split `line` into literal text and references.
pub fn scan(line: &str) -> Vec<Piece<'_>> {
    let bytes = line.as_bytes();
    let mut pieces = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let (kind, name_start) = match bytes[i] {
            b'$' => (RefKind::Dollar, i + 1),
            b'a'..=b'z' => (RefKind::Bare, i),
            _ => {
                i += 1;
                continue;
            }
        };
        let name_len = match kind {
            RefKind::Dollar => line[name_start..]
                .find(|c: char| !is_ident_char(c))
                .unwrap_or(line.len() - name_start),
            RefKind::Bare => bytes[name_start..]
                .iter()
                .take_while(|b| b.is_ascii_lowercase())
                .count(),
        };
        if name_len == 0 {
            // A lone `$`.
            i += 1;
            continue;
        }
        if text_start < i {
            pieces.push(Piece::Text(&line[text_start..i]));
        }
        let end = name_start + name_len;
        pieces.push(Piece::Ref(Reference {
            kind,
            name: &line[name_start..end],
            span: i..end,
        }));
        i = end;
        text_start = end;
    }
    if text_start < line.len() {
        pieces.push(Piece::Text(&line[text_start..]));
    }
    pieces
}

/// Substitute variable references in `line`.
pub fn substitute(line: &str, vars: &VarStore) -> Substitution {
    let mut out = BoundedBuf::new(OUTPUT_CAP);

    for piece in scan(line) {
        let fits = match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Ref(r) => {
                let original = &line[r.span.clone()];
                let value = match r.kind {
                    RefKind::Bare if is_assignment_target(line, r.span.start, r.span.end) => None,
                    _ => vars.get(r.name),
                };
                out.push_str(value.unwrap_or(original))
            }
        };
        if !fits {
            break;
        }
    }

    let truncated = out.is_truncated();
    if truncated {
        log::debug!("substitution truncated to {OUTPUT_CAP} characters: {line}");
    }
    Substitution { text: out.into_string(), truncated }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
