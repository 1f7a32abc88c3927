//! Terminal rendering for the binary.
//!
//! Two [`Canvas`] implementations:
//!
//! * [`TermScreen`] draws on the terminal with [`crossterm`], treating each
//!   character cell as an 8×16 block of pixels.  Text lands in the cell that
//!   contains its pixel origin; rectangles paint every cell they touch.
//! * [`PlainScreen`] writes console text as lines and shapes as one-line
//!   summaries, for pipes and `-v`.
//!
//! Every draw call is flushed so loop animations show as they run.  Terminal
//! writes are best-effort: failures are logged and dropped.

use std::io::{self, Write};
use std::ops::Range;

use crossterm::{
    cursor, queue,
    style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, ClearType},
};

use crate::device::{Canvas, Color};

/// Pixel width of one character cell.
pub const CELL_WIDTH: i64 = 8;
/// Pixel height of one character cell.
pub const CELL_HEIGHT: i64 = 16;

// ── Palette → crossterm ───────────────────────────────────────────────────────

/// Convert a VGA palette index to a crossterm [`style::Color`].
pub fn ansi_color(color: Color) -> style::Color {
    match color.index() {
        0 => style::Color::Black,
        1 => style::Color::DarkBlue,
        2 => style::Color::DarkGreen,
        3 => style::Color::DarkCyan,
        4 => style::Color::DarkRed,
        5 => style::Color::DarkMagenta,
        6 => style::Color::DarkYellow,
        7 => style::Color::Grey,
        8 => style::Color::DarkGrey,
        9 => style::Color::Blue,
        10 => style::Color::Green,
        11 => style::Color::Cyan,
        12 => style::Color::Red,
        13 => style::Color::Magenta,
        14 => style::Color::Yellow,
        15 => style::Color::White,
        _ => style::Color::Reset,
    }
}

/// Cells covered by the pixel span `start..start + len`, clipped to
/// `0..limit`.  `None` if nothing is visible.
fn cell_span(start: i64, len: i64, cell: i64, limit: u16) -> Option<Range<u16>> {
    if len <= 0 {
        return None;
    }
    let first = start.div_euclid(cell).max(0);
    let last = start.saturating_add(len - 1).div_euclid(cell).min(i64::from(limit) - 1);
    if first > last {
        return None;
    }
    Some(u16::try_from(first).ok()?..u16::try_from(last + 1).ok()?)
}

// ── TermScreen ────────────────────────────────────────────────────────────────

/// A cell-addressed terminal surface.
pub struct TermScreen<W: Write> {
    /// Terminal width in columns.
    pub width: u16,
    /// Terminal height in rows.
    pub height: u16,
    out: W,
}

impl TermScreen<io::Stdout> {
    /// Draw on stdout, sized to the current terminal (80×25 if unknown).
    pub fn stdout() -> Self {
        let (width, height) = terminal::size().unwrap_or((80, 25));
        Self::new(io::stdout(), width, height)
    }
}

impl<W: Write> TermScreen<W> {
    pub fn new(out: W, width: u16, height: u16) -> Self {
        Self { width, height, out }
    }

    /// Switch to the alternate screen.  The returned guard switches back.
    pub fn enter(&mut self) -> io::Result<ScreenGuard> {
        crossterm::execute!(self.out, terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(ScreenGuard(()))
    }

    /// Show the input prompt on the bottom row and leave the cursor after it.
    pub fn show_prompt(&mut self, text: &str) -> io::Result<()> {
        let row = self.height.saturating_sub(1);
        queue!(
            self.out,
            cursor::MoveTo(0, row),
            ResetColor,
            terminal::Clear(ClearType::UntilNewLine),
            Print(text),
            cursor::Show
        )?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn try_text(&mut self, x: i64, y: i64, text: &str, color: Color) -> io::Result<()> {
        let (Some(cols), Some(rows)) = (
            cell_span(x, CELL_WIDTH, CELL_WIDTH, self.width),
            cell_span(y, CELL_HEIGHT, CELL_HEIGHT, self.height),
        ) else {
            return Ok(());
        };
        let room = usize::from(self.width - cols.start);
        let visible: String = text.chars().take(room).collect();
        queue!(
            self.out,
            cursor::MoveTo(cols.start, rows.start),
            SetForegroundColor(ansi_color(color)),
            Print(visible),
            ResetColor
        )?;
        self.out.flush()
    }

    fn try_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Color) -> io::Result<()> {
        let (Some(cols), Some(rows)) = (
            cell_span(x, w, CELL_WIDTH, self.width),
            cell_span(y, h, CELL_HEIGHT, self.height),
        ) else {
            return Ok(());
        };
        let fill = " ".repeat(cols.len());
        queue!(self.out, SetBackgroundColor(ansi_color(color)))?;
        for row in rows {
            queue!(self.out, cursor::MoveTo(cols.start, row), Print(&fill))?;
        }
        queue!(self.out, ResetColor)?;
        self.out.flush()
    }

    fn try_clear(&mut self, color: Color) -> io::Result<()> {
        queue!(
            self.out,
            SetBackgroundColor(ansi_color(color)),
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        self.out.flush()
    }
}

impl<W: Write> Canvas for TermScreen<W> {
    fn draw_text(&mut self, x: i64, y: i64, text: &str, color: Color) {
        if let Err(e) = self.try_text(x, y, text, color) {
            log::debug!("terminal write failed: {e}");
        }
    }

    fn draw_rect_filled(&mut self, x: i64, y: i64, w: i64, h: i64, color: Color) {
        if let Err(e) = self.try_rect(x, y, w, h, color) {
            log::debug!("terminal write failed: {e}");
        }
    }

    fn clear(&mut self, color: Color) {
        if let Err(e) = self.try_clear(color) {
            log::debug!("terminal write failed: {e}");
        }
    }

    fn size(&self) -> (i64, i64) {
        (i64::from(self.width) * CELL_WIDTH, i64::from(self.height) * CELL_HEIGHT)
    }
}

// ── ScreenGuard ───────────────────────────────────────────────────────────────

/// RAII guard: leaves the alternate screen when dropped.
pub struct ScreenGuard(());

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            io::stdout(),
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
    }
}

// ── PlainScreen ───────────────────────────────────────────────────────────────

/// Line-oriented output: console text as-is, shapes as summaries.
pub struct PlainScreen<W: Write> {
    out: W,
}

impl<W: Write> PlainScreen<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{text}") {
            log::debug!("write failed: {e}");
        }
    }
}

impl<W: Write> Canvas for PlainScreen<W> {
    fn draw_text(&mut self, _x: i64, _y: i64, text: &str, _color: Color) {
        self.line(text);
    }

    fn draw_rect_filled(&mut self, x: i64, y: i64, w: i64, h: i64, color: Color) {
        self.line(&format!("[rect {x},{y} {w}x{h} color {}]", color.index()));
    }

    fn clear(&mut self, _color: Color) {}

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
        self.line(&format!(
            "[cube {x},{y} {w}x{h} colors {} {} {}]",
            color.index(),
            dark.index(),
            bright.index()
        ));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_maps_to_ansi() {
        assert_eq!(ansi_color(Color::BLACK), style::Color::Black);
        assert_eq!(ansi_color(Color::BLUE), style::Color::DarkBlue);
        assert_eq!(ansi_color(Color::RED), style::Color::DarkRed);
        assert_eq!(ansi_color(Color::LIGHT_BROWN), style::Color::Yellow);
        assert_eq!(ansi_color(Color::WHITE), style::Color::White);
    }

    #[test]
    fn cell_span_rounds_outward() {
        assert_eq!(cell_span(0, 8, 8, 80), Some(0..1));
        assert_eq!(cell_span(7, 2, 8, 80), Some(0..2));
        assert_eq!(cell_span(16, 1, 16, 25), Some(1..2));
    }

    #[test]
    fn cell_span_clips() {
        assert_eq!(cell_span(-20, 30, 8, 80), Some(0..2));
        assert_eq!(cell_span(600, 100, 8, 80), Some(75..80));
        assert_eq!(cell_span(-20, 10, 8, 80), None);
        assert_eq!(cell_span(1000, 8, 8, 80), None);
        assert_eq!(cell_span(0, 0, 8, 80), None);
        assert_eq!(cell_span(i64::MAX, 5, 8, 80), None);
        assert_eq!(cell_span(i64::MIN, i64::MAX, 8, 80), None);
        assert_eq!(cell_span(-8, i64::MAX, 8, 80), Some(0..80));
    }

    #[test]
    fn term_screen_survives_extreme_coordinates() {
        let mut screen = TermScreen::new(Vec::new(), 80, 25);
        screen.draw_rect_filled(i64::MAX, 0, 5, 5, Color::RED);
        screen.draw_text(i64::MAX, i64::MAX, "x", Color::WHITE);
        screen.draw_cube(i64::MAX - 7, 0, 40, 4, Color::RED, Color::BLACK, Color::WHITE);
        assert!(screen.into_inner().is_empty());

        let mut screen = TermScreen::new(Vec::new(), 80, 25);
        screen.draw_cube(0, 0, 9_000_000_000_000_000, 4, Color::RED, Color::BLACK, Color::WHITE);
        assert!(!screen.into_inner().is_empty());
    }

    #[test]
    fn term_screen_writes_text() {
        let mut screen = TermScreen::new(Vec::new(), 20, 5);
        screen.draw_text(10, 30, "hello", Color::WHITE);
        let out = String::from_utf8(screen.into_inner()).unwrap();
        assert!(out.contains("hello"));
    }

    #[test]
    fn term_screen_truncates_at_right_edge() {
        let mut screen = TermScreen::new(Vec::new(), 4, 2);
        screen.draw_text(0, 0, "abcdefgh", Color::WHITE);
        let out = String::from_utf8(screen.into_inner()).unwrap();
        assert!(out.contains("abcd"));
        assert!(!out.contains("abcde"));
    }

    #[test]
    fn term_screen_skips_offscreen() {
        let mut screen = TermScreen::new(Vec::new(), 10, 2);
        screen.draw_text(0, 500, "gone", Color::WHITE);
        screen.draw_rect_filled(-50, -50, 10, 10, Color::RED);
        assert!(screen.into_inner().is_empty());
    }

    #[test]
    fn plain_screen_summaries() {
        let mut screen = PlainScreen::new(Vec::new());
        screen.draw_text(10, 30, "hi", Color::WHITE);
        screen.draw_rect_filled(1, 2, 3, 4, Color::RED);
        screen.clear(Color::BLUE);
        screen.draw_cube(5, 6, 8, 9, Color::RED, Color::BLACK, Color::WHITE);
        let out = String::from_utf8(screen.into_inner()).unwrap();
        assert_eq!(out, "hi\n[rect 1,2 3x4 color 4]\n[cube 5,6 8x9 colors 4 0 15]\n");
    }
}
