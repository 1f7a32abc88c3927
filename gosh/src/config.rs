//! `goshrc` configuration file parser.
//!
//! | Directive | Action |
//! |-----------|--------|
//! | `set <key>=<value>` or `set <key> <value>` | set a setting |
//! | Lines starting with `;` or `#` | comment, ignored |
//! | Any other directive | silently skipped |
//!
//! Recognised keys:
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `scripts` | directory holding scripts |
//! | `pace` | ticks to wait after each loop iteration |
//! | `linecap` | longest script line, in characters |
//! | `visual` | `1` draws on the terminal, `0` prints plain text |
//!
//! Problems on recognised lines are collected as [`ConfigError`]s; loading
//! never stops early.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::script::Options;

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal error encountered while loading a config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

/// Settings read from a `goshrc`.  `None` means "not set here".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub scripts: Option<PathBuf>,
    pub pace: Option<u64>,
    pub line_cap: Option<usize>,
    pub visual: Option<bool>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config string.
    ///
    /// Unknown directives are skipped; unknown keys and bad values are
    /// reported.  Returns the config and every error, in line order.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = Config::new();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            let (cmd, args) = line
                .split_once(|c: char| c.is_ascii_whitespace())
                .unwrap_or((line, ""));
            if cmd != "set" {
                log::debug!("goshrc line {lineno}: skipping `{cmd}`");
                continue;
            }

            if let Err(message) = config.apply_set(args.trim()) {
                errors.push(ConfigError { line: lineno, message });
            }
        }

        (config, errors)
    }

    /// Read and parse a config file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<(Self, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&s))
    }

    /// Interpreter options, with defaults for anything unset.
    pub fn options(&self) -> Options {
        let defaults = Options::default();
        Options {
            pace: self.pace.unwrap_or(defaults.pace),
            line_cap: self.line_cap.unwrap_or(defaults.line_cap),
        }
    }

    fn apply_set(&mut self, args: &str) -> Result<(), String> {
        let (key, value) = split_set(args)?;
        match key {
            "scripts" => self.scripts = Some(PathBuf::from(value)),
            "pace" => self.pace = Some(parse_number(key, value)?),
            "linecap" => {
                let cap: usize = parse_number(key, value)?;
                if cap == 0 {
                    return Err("linecap must be at least 1".to_owned());
                }
                self.line_cap = Some(cap);
            }
            "visual" => {
                self.visual = Some(match value {
                    "1" | "on" | "yes" => true,
                    "0" | "off" | "no" => false,
                    _ => return Err(format!("visual: expected 0 or 1, got `{value}`")),
                })
            }
            _ => return Err(format!("unknown setting `{key}`")),
        }
        Ok(())
    }
}

// ── set ───────────────────────────────────────────────────────────────────────

/// Split `name=value` or `name value`; a value in double quotes loses them.
fn split_set(args: &str) -> Result<(&str, &str), String> {
    let (key, value) = match args.split_once('=') {
        Some((k, v)) if !k.trim().contains(char::is_whitespace) => (k.trim(), v.trim()),
        _ => args
            .split_once(|c: char| c.is_ascii_whitespace())
            .map(|(k, v)| (k, v.trim()))
            .unwrap_or((args, "")),
    };
    if key.is_empty() {
        return Err("set requires a name".to_owned());
    }
    if value.is_empty() {
        return Err(format!("set {key}: missing value"));
    }
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    Ok((key, value))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("{key}: expected a number, got `{value}`"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
