//! Primitive text utilities.
//!
//! Every cap in the shell (variable names, values, the substitution buffer,
//! the per-line limit of the script reader) is counted in characters, never in
//! bytes, so truncation always lands on a `char` boundary.

// ── Bounded copies ────────────────────────────────────────────────────────────

/// Return the longest prefix of `s` holding at most `max` characters, and
/// whether anything was cut off.
pub fn truncate_chars(s: &str, max: usize) -> (&str, bool) {
    match s.char_indices().nth(max) {
        Some((idx, _)) => (&s[..idx], true),
        None => (s, false),
    }
}

/// A growable string with a fixed character capacity.
///
/// Appends past the capacity are dropped and remembered in
/// [`BoundedBuf::is_truncated`].
#[derive(Debug, Clone)]
pub struct BoundedBuf {
    buf: String,
    len: usize,
    cap: usize,
    truncated: bool,
}

impl BoundedBuf {
    pub fn new(cap: usize) -> Self {
        Self {
            buf: String::with_capacity(cap),
            len: 0,
            cap,
            truncated: false,
        }
    }

    /// Append one character; returns `false` once the buffer is full.
    pub fn push(&mut self, ch: char) -> bool {
        if self.len >= self.cap {
            self.truncated = true;
            return false;
        }
        self.buf.push(ch);
        self.len += 1;
        true
    }

    /// Append as much of `s` as fits.  Returns `true` if all of it fit.
    pub fn push_str(&mut self, s: &str) -> bool {
        for ch in s.chars() {
            if !self.push(ch) {
                return false;
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

// ── Integer ↔ text ────────────────────────────────────────────────────────────

/// Lenient decimal parse: leading whitespace, an optional sign, then digits up
/// to the first non-digit.  Text with no digits is `0`; magnitudes beyond
/// `i64` saturate.
pub fn parse_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
    }
    value
}

/// Canonical decimal form: no leading zeros, `-` for negatives.
pub fn format_int(n: i64) -> String {
    n.to_string()
}

/// Strict signed integer token as accepted by command arguments: an optional
/// `-` followed by at least one digit.  Returns the value and the unparsed
/// remainder.
pub fn take_int(s: &str) -> Option<(i64, &str)> {
    let s = s.trim_start_matches([' ', '\t']);
    let body = s.strip_prefix('-').unwrap_or(s);
    let digits = body.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let end = s.len() - body.len() + digits;
    Some((parse_int(&s[..end]), &s[end..]))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
