//! Command-line argument parsing.
//!
//! Usage:
//!   gosh [-f[<file>]] [-S<dir>] [-c<cmd>] [-p<ticks>] [-vd] [<script>]

use std::path::PathBuf;

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Script directory override (`-S<dir>`).
    pub script_dir: Option<PathBuf>,
    /// Which config file to load.
    pub config: ConfigFile,
    /// Command to execute after loading config (`-c<cmd>`).
    pub command: Option<String>,
    /// Loop pacing override in ticks (`-p<ticks>`).
    pub pace: Option<u64>,
    /// Disable visual mode (`-v`).
    pub no_visual: bool,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// Script to run, then exit.
    pub script: Option<String>,
}

/// How to choose the user config file.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum ConfigFile {
    /// Search the standard locations (default).
    #[default]
    Search,
    /// `-f` with no file argument: skip user config.
    Skip,
    /// `-f<file>`: load this specific file.
    Explicit(PathBuf),
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    parse_argv(&raw)
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        if arg == "--" {
            positional.extend(argv[i + 1..].iter().cloned());
            break;
        }

        if !arg.starts_with('-') || arg == "-" {
            positional.push(arg.to_owned());
            i += 1;
            continue;
        }

        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,
                'v' => args.no_visual = true,

                // -f[<file>]
                'f' => {
                    if j + 1 < chars.len() {
                        let file: String = chars[j + 1..].iter().collect();
                        args.config = ConfigFile::Explicit(PathBuf::from(file));
                        j = chars.len();
                    } else if i + 1 < argv.len() && !argv[i + 1].starts_with('-') {
                        i += 1;
                        args.config = ConfigFile::Explicit(PathBuf::from(&argv[i]));
                    } else {
                        args.config = ConfigFile::Skip;
                    }
                }

                'c' => {
                    args.command = Some(option_value(argv, &mut i, &chars, &mut j, "-c requires a command argument")?);
                }

                'S' => {
                    let dir = option_value(argv, &mut i, &chars, &mut j, "-S requires a directory argument")?;
                    args.script_dir = Some(PathBuf::from(dir));
                }

                'p' => {
                    let ticks = option_value(argv, &mut i, &chars, &mut j, "-p requires a tick count")?;
                    let ticks = ticks
                        .parse()
                        .map_err(|_| format!("invalid tick count: {ticks}"))?;
                    args.pace = Some(ticks);
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    match positional.len() {
        0 => {}
        1 => args.script = positional.pop(),
        n => return Err(format!("too many arguments ({n})")),
    }

    Ok(args)
}

/// Value of an option that takes one: the rest of this argument if any,
/// otherwise the next argument.
fn option_value(
    argv: &[String],
    i: &mut usize,
    chars: &[char],
    j: &mut usize,
    missing: &str,
) -> Result<String, String> {
    if *j + 1 < chars.len() {
        let s: String = chars[*j + 1..].iter().collect();
        *j = chars.len();
        Ok(s)
    } else if *i + 1 < argv.len() {
        *i += 1;
        Ok(argv[*i].clone())
    } else {
        Err(missing.to_owned())
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Search for the user config file in the standard locations.
/// Returns the first path that exists, or `None`.
pub fn find_user_config() -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(home) = std::env::var("HOME") {
        candidates.push(PathBuf::from(home).join(".goshrc"));
    }
    if let Some(dirs) = directories::ProjectDirs::from("", "", "gosh") {
        candidates.push(dirs.config_dir().join("goshrc"));
    }
    candidates.push(PathBuf::from("./.goshrc"));
    candidates.into_iter().find(|p| p.exists())
}

/// Determine the script directory.
///
/// Priority: `-S<dir>` CLI flag → `GOSH_SCRIPTS` env var → `scripts` from the
/// config file → `./scripts`.
pub fn resolve_script_dir(cli_override: Option<&PathBuf>, config: Option<&PathBuf>) -> PathBuf {
    if let Some(d) = cli_override {
        return d.clone();
    }
    if let Ok(d) = std::env::var("GOSH_SCRIPTS") {
        if !d.is_empty() {
            return PathBuf::from(d);
        }
    }
    if let Some(d) = config {
        return d.clone();
    }
    PathBuf::from("./scripts")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn empty_args() {
        let a = parse_argv(&argv(&[])).unwrap();
        assert!(a.script.is_none());
        assert_eq!(a.config, ConfigFile::Search);
        assert!(!a.no_visual && !a.debug);
    }

    #[test]
    fn script_positional() {
        let a = parse_argv(&argv(&["demo.gsh"])).unwrap();
        assert_eq!(a.script.as_deref(), Some("demo.gsh"));
    }

    #[test]
    fn combined_bool_flags() {
        let a = parse_argv(&argv(&["-vd"])).unwrap();
        assert!(a.no_visual && a.debug);
    }

    #[test]
    fn script_dir_embedded_and_separate() {
        let a = parse_argv(&argv(&["-S/some/dir"])).unwrap();
        assert_eq!(a.script_dir, Some(PathBuf::from("/some/dir")));
        let a = parse_argv(&argv(&["-S", "/some/dir"])).unwrap();
        assert_eq!(a.script_dir, Some(PathBuf::from("/some/dir")));
    }

    #[test]
    fn pace_override() {
        let a = parse_argv(&argv(&["-p0"])).unwrap();
        assert_eq!(a.pace, Some(0));
        let a = parse_argv(&argv(&["-p", "250"])).unwrap();
        assert_eq!(a.pace, Some(250));
        assert!(parse_argv(&argv(&["-pfast"])).is_err());
    }

    #[test]
    fn config_forms() {
        assert_eq!(parse_argv(&argv(&["-f"])).unwrap().config, ConfigFile::Skip);
        assert_eq!(
            parse_argv(&argv(&["-fmyrc"])).unwrap().config,
            ConfigFile::Explicit(PathBuf::from("myrc"))
        );
        assert_eq!(
            parse_argv(&argv(&["-f", "myrc"])).unwrap().config,
            ConfigFile::Explicit(PathBuf::from("myrc"))
        );
    }

    #[test]
    fn command_embedded_and_separate() {
        let a = parse_argv(&argv(&["-cprint hi"])).unwrap();
        assert_eq!(a.command.as_deref(), Some("print hi"));
        let a = parse_argv(&argv(&["-c", "rect 0 0 5 5 4", "demo"])).unwrap();
        assert_eq!(a.command.as_deref(), Some("rect 0 0 5 5 4"));
        assert_eq!(a.script.as_deref(), Some("demo"));
        assert!(parse_argv(&argv(&["-c"])).is_err());
    }

    #[test]
    fn double_dash_ends_flags() {
        let a = parse_argv(&argv(&["--", "-odd-name"])).unwrap();
        assert_eq!(a.script.as_deref(), Some("-odd-name"));
    }

    #[test]
    fn too_many_positional() {
        assert!(parse_argv(&argv(&["a", "b"])).is_err());
    }

    #[test]
    fn unknown_flag() {
        assert!(parse_argv(&argv(&["-z"])).is_err());
    }

    #[test]
    fn script_dir_cli_wins() {
        let cli = PathBuf::from("/cli");
        let rc = PathBuf::from("/rc");
        assert_eq!(resolve_script_dir(Some(&cli), Some(&rc)), cli);
    }
}
