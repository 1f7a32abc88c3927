use std::io::{self, BufRead, Stdout, Write};
use std::path::Path;

use gosh::cli::{self, ConfigFile};
use gosh::config::Config;
use gosh::device::{Canvas, Clock, Color, DirSource, ScriptSource, SystemClock};
use gosh::script::Interpreter;
use gosh::terminal::{PlainScreen, TermScreen};

const USAGE: &str = "Usage: gosh [-f[<file>]] [-S<dir>] [-c<cmd>] [-p<ticks>] [-vd] [<script>]";

fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("gosh: {e}");
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    };

    let default_filter = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    // ── User config ───────────────────────────────────────────────────────────
    let config = match &args.config {
        ConfigFile::Skip => Config::default(),
        ConfigFile::Explicit(path) => load_config(path),
        ConfigFile::Search => cli::find_user_config()
            .map(|path| load_config(&path))
            .unwrap_or_default(),
    };

    let mut options = config.options();
    if let Some(pace) = args.pace {
        options.pace = pace;
    }
    let script_dir = cli::resolve_script_dir(args.script_dir.as_ref(), config.scripts.as_ref());
    log::info!("scripts from {}", script_dir.display());

    let is_tty = unsafe {
        libc::isatty(libc::STDIN_FILENO) != 0 && libc::isatty(libc::STDOUT_FILENO) != 0
    };
    let visual = is_tty && !args.no_visual && config.visual.unwrap_or(true);

    let mut interp = Interpreter::with_options(options);
    let scripts = DirSource::new(script_dir);

    let code = if visual {
        let mut screen = TermScreen::stdout();
        let _guard = match screen.enter() {
            Ok(g) => g,
            Err(e) => {
                eprintln!("gosh: can't initialise terminal: {e}");
                std::process::exit(1);
            }
        };
        let mut machine = Machine::new(screen, scripts);
        session(&mut machine, &mut interp, &args)
    } else {
        let mut machine = Machine::new(PlainScreen::new(io::stdout()), scripts);
        session(&mut machine, &mut interp, &args)
    };
    std::process::exit(code);
}

fn load_config(path: &Path) -> Config {
    match Config::load_file(path) {
        Ok((config, errors)) => {
            for e in errors {
                eprintln!("gosh: {}: {e}", path.display());
            }
            config
        }
        Err(e) => {
            eprintln!("gosh: warning: {}: {e}", path.display());
            Config::default()
        }
    }
}

/// Draw the banner, run `-c`, then either the named script or the prompt.
fn session<S: Canvas + Prompt>(
    machine: &mut Machine<S>,
    interp: &mut Interpreter,
    args: &cli::CliArgs,
) -> i32 {
    interp.reset_display(machine);

    if let Some(cmd) = &args.command {
        if let Err(e) = interp.execute_shell_line(cmd, machine) {
            log::warn!("-c: {e}");
        }
    }

    if let Some(name) = &args.script {
        let code = match interp.execute_script(name, machine) {
            Ok(_) => 0,
            Err(_) => 1,
        };
        machine.screen.hold();
        return code;
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        machine.screen.prompt();
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                eprintln!("gosh: {e}");
                return 1;
            }
            None => return 0,
        };
        let line = line.trim();
        match line {
            "" => continue,
            "exit" | "quit" => return 0,
            _ => {
                if let Err(e) = interp.execute_shell_line(line, machine) {
                    log::debug!("{e}");
                }
            }
        }
    }
}

// ── Host wiring ───────────────────────────────────────────────────────────────

/// A screen plus the directory of scripts and the wall clock.
struct Machine<S> {
    screen: S,
    scripts: DirSource,
    clock: SystemClock,
}

impl<S> Machine<S> {
    fn new(screen: S, scripts: DirSource) -> Self {
        Self { screen, scripts, clock: SystemClock::new() }
    }
}

impl<S: Canvas> Canvas for Machine<S> {
    fn draw_text(&mut self, x: i64, y: i64, text: &str, color: Color) {
        self.screen.draw_text(x, y, text, color);
    }

    fn draw_rect_filled(&mut self, x: i64, y: i64, w: i64, h: i64, color: Color) {
        self.screen.draw_rect_filled(x, y, w, h, color);
    }

    fn clear(&mut self, color: Color) {
        self.screen.clear(color);
    }

    fn size(&self) -> (i64, i64) {
        self.screen.size()
    }

    fn draw_cube(
        &mut self,
        x: i64,
        y: i64,
        w: i64,
        h: i64,
        color: Color,
        dark: Color,
        bright: Color,
    ) {
        self.screen.draw_cube(x, y, w, h, color, dark, bright);
    }
}

impl<S> ScriptSource for Machine<S> {
    fn read_script(&self, name: &str) -> Option<Vec<u8>> {
        self.scripts.read_script(name)
    }

    fn list_scripts(&self) -> Vec<String> {
        self.scripts.list_scripts()
    }
}

impl<S> Clock for Machine<S> {
    fn current_tick(&self) -> u64 {
        self.clock.current_tick()
    }
}

// ── Prompting ─────────────────────────────────────────────────────────────────

/// Screen-specific input prompt.
trait Prompt {
    /// Ask for the next command line.
    fn prompt(&mut self);

    /// Keep a finished script's output visible before exiting.
    fn hold(&mut self) {}
}

impl Prompt for TermScreen<Stdout> {
    fn prompt(&mut self) {
        if let Err(e) = self.show_prompt("> ") {
            log::debug!("prompt: {e}");
        }
    }

    fn hold(&mut self) {
        if self.show_prompt("Press Enter to exit").is_ok() {
            let mut buf = String::new();
            let _ = io::stdin().lock().read_line(&mut buf);
        }
    }
}

impl Prompt for PlainScreen<Stdout> {
    fn prompt(&mut self) {
        let mut out = io::stdout();
        let _ = write!(out, "> ");
        let _ = out.flush();
    }
}
