//! End-to-end script runs against an in-memory recording host.

use gosh::device::{Color, DrawCall, Recorder};
use gosh::script::{Dispatch, Interpreter, Options, ScriptError};
use gosh::var::{SetOutcome, SLOTS};

fn interp() -> Interpreter {
    Interpreter::with_options(Options { pace: 0, ..Options::default() })
}

/// Run `src` as a script and return the interpreter and the host.
fn run(src: &str) -> (Interpreter, Recorder) {
    let mut host = Recorder::new().with_file("main.gsh", src);
    let mut it = interp();
    it.execute_script("main.gsh", &mut host).expect("script missing");
    (it, host)
}

#[test]
fn demo_script() {
    let src = "\
# bouncing boxes
let size 10
let color 2

for x 0 2 {
    rect $x 5 $size $size $color
    color++
}
print done with $color
";
    let (it, host) = run(src);
    assert_eq!(
        host.calls[..3],
        [
            DrawCall::Rect { x: 0, y: 5, w: 10, h: 10, color: Color::GREEN },
            DrawCall::Rect { x: 1, y: 5, w: 10, h: 10, color: Color::CYAN },
            DrawCall::Rect { x: 2, y: 5, w: 10, h: 10, color: Color::RED },
        ]
    );
    // `with` is not a variable, so it passes through unchanged.
    assert_eq!(host.console_lines(), vec!["done with 5"]);
    assert_eq!(it.vars.get("x"), Some("2"));
}

#[test]
fn bare_words_and_assignment() {
    let (it, host) = run("let x 5\nprint x\nx = 9\nprint x\nx += x");
    assert_eq!(host.console_lines(), vec!["5", "9"]);
    assert_eq!(it.vars.get("x"), Some("18"));
}

#[test]
fn counter_loop_with_multiline_body() {
    let src = "let sum 0\nfor i 1 10\n{\n  sum += $i\n}\nprint $sum";
    let (_, host) = run(src);
    assert_eq!(host.console_lines(), vec!["55"]);
}

#[test]
fn nested_braces_inside_body_run_as_lines() {
    let src = "for i 1 2 {\n  print {$i}\n}";
    let (_, host) = run(src);
    assert_eq!(host.console_lines(), vec!["{1}", "{2}"]);
}

#[test]
fn structural_faults_do_not_stop_the_script() {
    let src = "for i 1 3\nprint a\nfor j 1\nprint b";
    let mut host = Recorder::new().with_file("s", src);
    let mut it = interp();
    let report = it.execute_script("s", &mut host).unwrap();
    assert_eq!(
        host.console_lines(),
        vec![
            "line 1: no opening brace",
            "a",
            "line 3: malformed loop header: missing end value",
            "b",
        ]
    );
    assert_eq!(report.errors.len(), 2);
}

#[test]
fn missing_closing_brace_skips_rest() {
    let (it, host) = run("let a 1\nfor i 1 3 {\nprint $i\nlet b 2");
    assert_eq!(host.console_lines(), vec!["line 2: no closing brace"]);
    assert_eq!(it.vars.get("a"), Some("1"));
    assert_eq!(it.vars.get("b"), None);
}

#[test]
fn unrecognized_line_leaves_store_untouched() {
    let mut host = Recorder::new();
    let mut it = interp();
    it.execute_single_command("let keep 1", &mut host).unwrap();
    let err = it.execute_single_command("frobnicate 1 2 3", &mut host).unwrap_err();
    assert_eq!(err, ScriptError::Unrecognized { text: "frobnicate 1 2 3".into() });
    assert_eq!(it.vars.iter().collect::<Vec<_>>(), vec![("keep", "1")]);
    assert!(host.calls.is_empty());
}

#[test]
fn store_full_is_reported_not_fatal() {
    let mut host = Recorder::new();
    let mut it = interp();
    for i in 0..SLOTS {
        it.execute_single_command(&format!("let v{i} {i}"), &mut host).unwrap();
    }
    assert_eq!(
        it.execute_single_command("let extra 1", &mut host),
        Ok(Dispatch::Assigned(SetOutcome::StoreFull))
    );
    assert_eq!(it.vars.get("extra"), None);
    assert_eq!(it.vars.get("v0"), Some("0"));
}

#[test]
fn long_values_are_truncated() {
    let mut host = Recorder::new();
    let mut it = interp();
    let line = format!("let s {}", "q".repeat(200));
    assert_eq!(
        it.execute_single_command(&line, &mut host),
        Ok(Dispatch::Assigned(SetOutcome::Truncated))
    );
    assert_eq!(it.vars.get("s").map(str::len), Some(127));
}

#[test]
fn crlf_scripts() {
    let (_, host) = run("let n 2\r\nfor i 1 $n {\r\nprint $i\r\n}\r\nprint end\r\n");
    assert_eq!(host.console_lines(), vec!["1", "2", "end"]);
}

#[test]
fn cube_and_bordered_rect() {
    let (_, host) = run("cube 50 60 40 30 4 8 12\nrect 0 0 10 10 1 15");
    assert_eq!(
        host.calls[0],
        DrawCall::Cube {
            x: 50,
            y: 60,
            w: 40,
            h: 30,
            color: Color::RED,
            dark: Color::DARK_GREY,
            bright: Color::LIGHT_RED,
        }
    );
    assert_eq!(host.calls.len(), 6);
}

#[test]
fn interactive_session() {
    let mut host = Recorder::new()
        .with_file("setup", "let w 20\nlet h 10")
        .with_file("notes", "remember the milk");
    let mut it = interp();

    it.reset_display(&mut host);
    it.execute_shell_line("run setup", &mut host).unwrap();
    it.execute_shell_line("rect 0 0 $w $h 3", &mut host).unwrap();
    it.execute_shell_line("cat notes", &mut host).unwrap();
    assert!(it.execute_shell_line("bogus", &mut host).is_err());
    it.execute_shell_line("vars", &mut host).unwrap();
    assert!(it.execute_shell_line("run nope", &mut host).is_err());

    assert!(host.calls.contains(&DrawCall::Rect { x: 0, y: 0, w: 20, h: 10, color: Color::CYAN }));
    assert_eq!(
        host.console_lines(),
        vec!["remember the milk", "Unknown command", "w=20", "h=10", "nope: file not found"]
    );
    // `run` clears the store even when the script is missing.
    assert!(it.vars.is_empty());
}

#[test]
fn help_lists_commands() {
    let mut host = Recorder::new();
    let mut it = interp();
    it.execute_single_command("help", &mut host).unwrap();
    let lines = host.console_lines();
    assert_eq!(lines[0], "Commands:");
    assert!(lines.iter().any(|l| l.starts_with("rect")));
}
