//! Script interpreter.
//!
//! The [`Interpreter`] is the whole mutable state of the shell's language
//! layer: the variable store and the console row.  Everything it touches
//! outside itself goes through the [`Host`] passed to each call, so a test can
//! build a fresh interpreter and a [`Recorder`](crate::device::Recorder) and
//! run a script end to end.
//!
//! A line takes one of these paths:
//!
//! ```text
//! script text ──lexer──► Line ──substitute──► let / mutation ──► VarStore
//!                  │                         └► command table ──► Host
//!                  └► LoopHeader … LoopBodyEnd  (body lines re-run per value)
//! ```

use super::builtins::{parse_command, Command, HELP};
use super::error::ScriptError;
use super::expand::substitute;
use super::lexer::{tokenize, Token, LINE_CAP};
use super::stmt::parse_statement;
use crate::device::{Canvas, Clock, Color, Host};
use crate::text::{format_int, parse_int};
use crate::var::{SetOutcome, VarStore};

/// Title drawn at the top of the console.
pub const BANNER: &str = "Graphics OS Shell";

/// Default busy-wait between loop iterations, in ticks.
pub const DEFAULT_PACE: u64 = 150;

// ── Dispatch results ──────────────────────────────────────────────────────────

/// What a recognized line did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A declaration or mutation, with the store's verdict.
    Assigned(SetOutcome),
    /// A command from the command table ran.
    Command,
}

/// Summary of one script run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Lines dispatched, counting each loop-body line once per iteration.
    pub lines: usize,
    /// Loop iterations completed.
    pub iterations: usize,
    /// Structural faults and unrecognized lines, in order.
    pub errors: Vec<ScriptError>,
}

// ── Options ───────────────────────────────────────────────────────────────────

/// Tunables taken from the config file and command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Ticks to busy-wait after each loop iteration (0 disables pacing).
    pub pace: u64,
    /// Per-line cap for script text, in characters.
    pub line_cap: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self { pace: DEFAULT_PACE, line_cap: LINE_CAP }
    }
}

// ── Console ───────────────────────────────────────────────────────────────────

/// Row-by-row text output below the banner.
#[derive(Debug, Clone)]
struct Console {
    row: i64,
}

impl Console {
    const X: i64 = 10;
    const BANNER_Y: i64 = 10;
    const TOP: i64 = 30;
    const ROW_HEIGHT: i64 = 16;
    const BOTTOM: i64 = 180;

    fn new() -> Self {
        Self { row: Self::TOP }
    }

    fn print<C: Canvas + ?Sized>(&mut self, canvas: &mut C, text: &str) {
        if self.row >= Self::BOTTOM {
            self.reset(canvas);
        }
        canvas.draw_text(Self::X, self.row, text, Color::WHITE);
        self.row += Self::ROW_HEIGHT;
    }

    fn reset<C: Canvas + ?Sized>(&mut self, canvas: &mut C) {
        canvas.clear(Color::BLUE);
        canvas.draw_text(Self::X, Self::BANNER_Y, BANNER, Color::WHITE);
        self.row = Self::TOP;
    }
}

// ── Interpreter ───────────────────────────────────────────────────────────────

/// The shell's script interpreter.
#[derive(Debug, Clone)]
pub struct Interpreter {
    /// Shell variables.
    pub vars: VarStore,
    console: Console,
    options: Options,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        Interpreter {
            vars: VarStore::new(),
            console: Console::new(),
            options,
        }
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Clear the display and draw the banner.
    pub fn reset_display<C: Canvas + ?Sized>(&mut self, canvas: &mut C) {
        self.console.reset(canvas);
    }

    /// Print a line on the console.
    pub fn print<C: Canvas + ?Sized>(&mut self, canvas: &mut C, text: &str) {
        self.console.print(canvas, text);
    }

    // ── Script execution ──────────────────────────────────────────────────────

    /// Run the script `name` from the host's script source.
    ///
    /// The variable store is cleared first.  A missing script is reported on
    /// the console and nothing runs.
    pub fn execute_script<H: Host + ?Sized>(
        &mut self,
        name: &str,
        host: &mut H,
    ) -> Result<RunReport, ScriptError> {
        self.vars.clear_all();

        let Some(bytes) = host.read_script(name) else {
            let err = ScriptError::FileNotFound { name: name.to_owned() };
            log::warn!("{err}");
            self.console.print(host, &err.to_string());
            return Err(err);
        };
        let src = String::from_utf8_lossy(&bytes);
        log::info!("running {name} ({} bytes)", bytes.len());

        let report = self.run_source(&src, host);
        log::info!(
            "{name}: {} lines, {} loop iterations, {} errors",
            report.lines,
            report.iterations,
            report.errors.len()
        );
        Ok(report)
    }

    /// Run script text against the current store (no clearing).
    pub fn run_source<H: Host + ?Sized>(&mut self, src: &str, host: &mut H) -> RunReport {
        let mut report = RunReport::default();
        let mut tokens = tokenize(src, self.options.line_cap).into_iter();

        while let Some(token) = tokens.next() {
            match token {
                Token::Line { line, text } => self.run_line(line, &text, host, &mut report),
                Token::LoopHeader { line, var, start, end } => {
                    let mut body = Vec::new();
                    for t in tokens.by_ref() {
                        match t {
                            Token::Line { line, text } => body.push((line, text)),
                            Token::LoopBodyEnd => break,
                            other => log::debug!("line {line}: ignoring {other:?} in loop body"),
                        }
                    }
                    self.run_loop(&var, &start, &end, &body, host, &mut report);
                }
                Token::LoopBodyEnd => {}
                Token::Fault(err) => {
                    self.console.print(host, &err.to_string());
                    report.errors.push(err);
                }
            }
        }
        report
    }

    fn run_loop<H: Host + ?Sized>(
        &mut self,
        var: &str,
        start: &str,
        end: &str,
        body: &[(usize, String)],
        host: &mut H,
        report: &mut RunReport,
    ) {
        let start = parse_int(&substitute(start, &self.vars).text);
        let end = parse_int(&substitute(end, &self.vars).text);
        log::debug!("loop {var} in {start}..={end}, {} body lines", body.len());

        for value in start..=end {
            self.vars.set(var, &format_int(value));
            for (line, text) in body {
                self.run_line(*line, text, host, report);
            }
            report.iterations += 1;
            self.pace(&*host);
        }
    }

    fn run_line<H: Host + ?Sized>(
        &mut self,
        line: usize,
        text: &str,
        host: &mut H,
        report: &mut RunReport,
    ) {
        report.lines += 1;
        if let Err(err) = self.execute_single_command(text, host) {
            // Scripts skip unrecognized lines without a visible message.
            log::debug!("line {line}: {err}");
            report.errors.push(err);
        }
    }

    /// Busy-wait `options.pace` ticks so each iteration's drawing is visible.
    fn pace<C: Clock + ?Sized>(&self, clock: &C) {
        if self.options.pace == 0 {
            return;
        }
        let deadline = clock.current_tick().saturating_add(self.options.pace);
        while clock.current_tick() < deadline {
            std::hint::spin_loop();
        }
    }

    // ── Single lines ──────────────────────────────────────────────────────────

    /// Substitute variables in `line` and dispatch it once.
    pub fn execute_single_command<H: Host + ?Sized>(
        &mut self,
        line: &str,
        host: &mut H,
    ) -> Result<Dispatch, ScriptError> {
        let substituted = substitute(line, &self.vars);
        self.dispatch(&substituted.text, host)
    }

    /// Try the statement parsers, then the command table, on an already
    /// substituted line.
    pub fn dispatch<H: Host + ?Sized>(
        &mut self,
        line: &str,
        host: &mut H,
    ) -> Result<Dispatch, ScriptError> {
        log::trace!("dispatch: {line}");
        if let Some(stmt) = parse_statement(line) {
            let outcome = stmt.apply(&mut self.vars);
            if outcome != SetOutcome::Ok {
                log::debug!("{line}: {outcome:?}");
            }
            return Ok(Dispatch::Assigned(outcome));
        }
        match parse_command(line) {
            Some(cmd) => {
                self.exec_command(cmd, host);
                Ok(Dispatch::Command)
            }
            None => Err(ScriptError::Unrecognized { text: line.trim().to_owned() }),
        }
    }

    /// One line typed at the interactive prompt.
    ///
    /// Besides everything [`execute_single_command`](Self::execute_single_command)
    /// accepts, the prompt understands `run name`, `vars`, and whole
    /// single-line `for` loops.  Unrecognized input prints `Unknown command`.
    pub fn execute_shell_line<H: Host + ?Sized>(
        &mut self,
        line: &str,
        host: &mut H,
    ) -> Result<Dispatch, ScriptError> {
        let trimmed = line.trim();
        if trimmed.starts_with("for ") || trimmed.starts_with("for\t") {
            let report = self.run_source(trimmed, host);
            return match report.errors.into_iter().next() {
                Some(err @ ScriptError::Structural { .. }) => Err(err),
                _ => Ok(Dispatch::Command),
            };
        }

        let substituted = substitute(trimmed, &self.vars).text;
        if let Some(name) = substituted.strip_prefix("run ").map(str::trim) {
            self.execute_script(name, host)?;
            return Ok(Dispatch::Command);
        }
        if substituted == "vars" {
            let lines: Vec<String> = self.vars.iter().map(|(n, v)| format!("{n}={v}")).collect();
            for l in &lines {
                self.console.print(host, l);
            }
            return Ok(Dispatch::Command);
        }

        let result = self.dispatch(&substituted, host);
        if result.is_err() {
            self.console.print(host, "Unknown command");
        }
        result
    }

    // ── Commands ──────────────────────────────────────────────────────────────

    fn exec_command<H: Host + ?Sized>(&mut self, cmd: Command, host: &mut H) {
        match cmd {
            Command::Rect { x, y, w, h, color, border } => {
                host.draw_rect_filled(x, y, w, h, color);
                if let Some(b) = border {
                    let bottom = y.saturating_add(h).saturating_sub(1);
                    let right = x.saturating_add(w).saturating_sub(1);
                    host.draw_rect_filled(x, y, w, 1, b);
                    host.draw_rect_filled(x, bottom, w, 1, b);
                    host.draw_rect_filled(x, y, 1, h, b);
                    host.draw_rect_filled(right, y, 1, h, b);
                }
            }
            Command::Cube { x, y, w, h, color, dark, bright } => {
                host.draw_cube(x, y, w, h, color, dark, bright);
            }
            Command::Print(text) => self.console.print(host, &text),
            Command::Clear => self.console.reset(host),
            Command::Help => {
                for line in HELP {
                    self.console.print(host, line);
                }
            }
            Command::Cat(name) => match host.read_script(&name) {
                Some(bytes) => {
                    let text = String::from_utf8_lossy(&bytes).into_owned();
                    for line in text.lines() {
                        self.console.print(host, line);
                    }
                }
                None => self.console.print(host, "cat: file not found"),
            },
            Command::List => {
                self.console.print(host, "Files:");
                for name in host.list_scripts() {
                    self.console.print(host, &name);
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DrawCall, Recorder};

    fn interp() -> Interpreter {
        Interpreter::with_options(Options { pace: 0, ..Options::default() })
    }

    fn run(src: &str) -> (Interpreter, Recorder, RunReport) {
        let mut host = Recorder::new().with_file("test.gsh", src);
        let mut it = interp();
        let report = it.execute_script("test.gsh", &mut host).expect("script missing");
        (it, host, report)
    }

    #[test]
    fn print_lines() {
        let (_, host, report) = run("print hello\necho world");
        assert_eq!(host.console_lines(), vec!["hello", "world"]);
        assert_eq!(report.lines, 2);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn let_then_mutate() {
        let (it, _, _) = run("let x 5\nx += 3");
        assert_eq!(it.vars.get("x"), Some("8"));
    }

    #[test]
    fn bare_word_substitution_and_assignment_target() {
        let (it, host, _) = run("let x 5\nprint x\nx = 9\nprint x");
        assert_eq!(host.console_lines(), vec!["5", "9"]);
        assert_eq!(it.vars.get("x"), Some("9"));
    }

    #[test]
    fn for_loop_inclusive() {
        let (it, host, report) = run("for i 1 3 { print $i }");
        assert_eq!(host.console_lines(), vec!["1", "2", "3"]);
        assert_eq!(it.vars.get("i"), Some("3"));
        assert_eq!(report.iterations, 3);
        assert_eq!(report.lines, 3);
    }

    #[test]
    fn for_loop_empty_range() {
        let (it, host, report) = run("for i 3 1 { print $i }\nprint done");
        assert_eq!(host.console_lines(), vec!["done"]);
        assert_eq!(report.iterations, 0);
        assert_eq!(it.vars.get("i"), None);
    }

    #[test]
    fn for_loop_bounds_are_substituted() {
        let (_, host, _) = run("let n 2\nfor i 0 $n {\nprint $i\n}");
        assert_eq!(host.console_lines(), vec!["0", "1", "2"]);
    }

    #[test]
    fn loop_body_mutates_outer_variable() {
        let (it, _, _) = run("let total 0\nfor i 1 4 {\ntotal += $i\n}");
        assert_eq!(it.vars.get("total"), Some("10"));
    }

    #[test]
    fn loop_draws_rects() {
        let (_, host, _) = run("for k 0 1 {\nrect $k 0 2 2 4\n}");
        assert_eq!(
            host.calls,
            vec![
                DrawCall::Rect { x: 0, y: 0, w: 2, h: 2, color: Color::RED },
                DrawCall::Rect { x: 1, y: 0, w: 2, h: 2, color: Color::RED },
            ]
        );
    }

    #[test]
    fn missing_brace_reports_and_continues() {
        let (_, host, report) = run("for i 1 3\nprint after");
        assert_eq!(host.console_lines(), vec!["line 1: no opening brace", "after"]);
        assert!(matches!(report.errors[0], ScriptError::Structural { line: 1, .. }));
    }

    #[test]
    fn unrecognized_is_silent_in_scripts() {
        let (it, host, report) = run("frobnicate 1 2 3\nprint ok");
        assert_eq!(host.console_lines(), vec!["ok"]);
        assert_eq!(
            report.errors,
            vec![ScriptError::Unrecognized { text: "frobnicate 1 2 3".into() }]
        );
        assert!(it.vars.is_empty());
    }

    #[test]
    fn missing_script() {
        let mut host = Recorder::new();
        let mut it = interp();
        let err = it.execute_script("nope", &mut host).unwrap_err();
        assert_eq!(err, ScriptError::FileNotFound { name: "nope".into() });
        assert_eq!(host.console_lines(), vec!["nope: file not found"]);
    }

    #[test]
    fn store_is_cleared_per_run() {
        let mut host = Recorder::new()
            .with_file("a", "let x 1")
            .with_file("b", "print $x");
        let mut it = interp();
        it.execute_script("a", &mut host).unwrap();
        assert_eq!(it.vars.get("x"), Some("1"));
        it.execute_script("b", &mut host).unwrap();
        assert_eq!(host.console_lines(), vec!["$x"]);
    }

    #[test]
    fn single_commands_keep_the_store() {
        let mut host = Recorder::new();
        let mut it = interp();
        assert_eq!(
            it.execute_single_command("let n 4", &mut host),
            Ok(Dispatch::Assigned(SetOutcome::Ok))
        );
        assert_eq!(it.execute_single_command("print $n", &mut host), Ok(Dispatch::Command));
        assert_eq!(host.console_lines(), vec!["4"]);
    }

    #[test]
    fn shell_line_unknown_command() {
        let mut host = Recorder::new();
        let mut it = interp();
        assert!(it.execute_shell_line("frobnicate", &mut host).is_err());
        assert_eq!(host.console_lines(), vec!["Unknown command"]);
    }

    #[test]
    fn shell_line_run_and_vars() {
        let mut host = Recorder::new().with_file("s", "let a 1\nlet b two");
        let mut it = interp();
        it.execute_shell_line("run s", &mut host).unwrap();
        it.execute_shell_line("vars", &mut host).unwrap();
        assert_eq!(host.console_lines(), vec!["a=1", "b=two"]);
    }

    #[test]
    fn shell_line_inline_loop() {
        let mut host = Recorder::new();
        let mut it = interp();
        it.execute_shell_line("let base 10", &mut host).unwrap();
        it.execute_shell_line("for i 1 2 { print $i }", &mut host).unwrap();
        assert_eq!(host.console_lines(), vec!["1", "2"]);
        // The prompt never clears the store.
        assert_eq!(it.vars.get("base"), Some("10"));
    }

    #[test]
    fn console_wraps_at_bottom() {
        let mut host = Recorder::new();
        let mut it = interp();
        for n in 0..11 {
            it.execute_single_command(&format!("print {n}"), &mut host).unwrap();
        }
        // Rows 30..=174 hold ten lines; the eleventh clears and redraws.
        assert!(host.calls.contains(&DrawCall::Clear(Color::BLUE)));
        assert_eq!(
            host.calls.last(),
            Some(&DrawCall::Text { x: 10, y: 30, text: "10".into(), color: Color::WHITE })
        );
    }

    #[test]
    fn cat_and_list() {
        let mut host = Recorder::new().with_file("notes", "one\ntwo");
        let mut it = interp();
        it.execute_single_command("cat notes", &mut host).unwrap();
        it.execute_single_command("cat missing", &mut host).unwrap();
        it.execute_single_command("list", &mut host).unwrap();
        assert_eq!(
            host.console_lines(),
            vec!["one", "two", "cat: file not found", "Files:", "notes"]
        );
    }

    #[test]
    fn rect_border_and_cube() {
        let mut host = Recorder::new();
        let mut it = interp();
        it.execute_single_command("rect 0 0 4 3 1 15", &mut host).unwrap();
        assert_eq!(host.calls.len(), 5);
        assert_eq!(host.calls[2], DrawCall::Rect { x: 0, y: 2, w: 4, h: 1, color: Color::WHITE });
        it.execute_single_command("cube 1 2 3 4 5 6 7", &mut host).unwrap();
        assert!(matches!(host.calls.last(), Some(DrawCall::Cube { x: 1, .. })));
    }

    #[test]
    fn border_at_coordinate_extremes() {
        let mut host = Recorder::new();
        let mut it = interp();
        let max = i64::MAX;
        it.execute_single_command(&format!("rect 0 {max} 4 {max} 1 2"), &mut host).unwrap();
        it.execute_single_command(&format!("rect {max} 0 {max} 4 1 2"), &mut host).unwrap();
        assert_eq!(host.calls.len(), 10);
        assert_eq!(host.calls[2], DrawCall::Rect { x: 0, y: max - 1, w: 4, h: 1, color: Color::GREEN });
    }

    #[test]
    fn indented_let_redeclares() {
        let mut host = Recorder::new();
        let mut it = interp();
        it.execute_single_command("let x 5", &mut host).unwrap();
        it.execute_single_command("  let x 7", &mut host).unwrap();
        assert_eq!(it.vars.get("x"), Some("7"));
        assert_eq!(it.vars.get("5"), None);
    }

    #[test]
    fn let_without_name_is_unrecognized() {
        let mut host = Recorder::new();
        let mut it = interp();
        assert_eq!(
            it.execute_single_command("let ", &mut host),
            Err(ScriptError::Unrecognized { text: "let".into() })
        );
        assert!(it.vars.is_empty());
    }

    #[test]
    fn pacing_spins_on_the_clock() {
        let mut host = Recorder::new().with_file("p", "for i 1 2 { print $i }");
        let mut it = Interpreter::with_options(Options { pace: 5, ..Options::default() });
        it.execute_script("p", &mut host).unwrap();
        // Each iteration reads the clock once for the deadline and until it passes.
        assert!(host.ticks() >= 10);
    }
}
