//! Collaborators the interpreter drives: a drawing surface, a script source
//! and a tick counter.
//!
//! The interpreter never touches a terminal or a disk directly.  It is handed
//! something implementing [`Host`] and calls through these three traits.  The
//! binary wires them to [`DirSource`], [`SystemClock`] and one of the screens
//! in [`crate::terminal`]; tests use [`Recorder`].

use std::cell::Cell;
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Instant;

// ── Palette ───────────────────────────────────────────────────────────────────

/// A VGA palette index (0–15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Color(u8);

impl Color {
    pub const BLACK: Color = Color(0x00);
    pub const BLUE: Color = Color(0x01);
    pub const GREEN: Color = Color(0x02);
    pub const CYAN: Color = Color(0x03);
    pub const RED: Color = Color(0x04);
    pub const MAGENTA: Color = Color(0x05);
    pub const BROWN: Color = Color(0x06);
    pub const LIGHT_GREY: Color = Color(0x07);
    pub const DARK_GREY: Color = Color(0x08);
    pub const LIGHT_BLUE: Color = Color(0x09);
    pub const LIGHT_GREEN: Color = Color(0x0A);
    pub const LIGHT_CYAN: Color = Color(0x0B);
    pub const LIGHT_RED: Color = Color(0x0C);
    pub const LIGHT_MAGENTA: Color = Color(0x0D);
    pub const LIGHT_BROWN: Color = Color(0x0E);
    pub const WHITE: Color = Color(0x0F);

    /// Validate a palette index; anything outside 0–15 is `None`.
    pub fn new(index: i64) -> Option<Color> {
        u8::try_from(index).ok().filter(|i| *i <= 0x0F).map(Color)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// Pixel width of the graphics mode scripts are written for.
pub const SCREEN_WIDTH: i64 = 320;
/// Pixel height of the graphics mode scripts are written for.
pub const SCREEN_HEIGHT: i64 = 200;

// ── Collaborator traits ───────────────────────────────────────────────────────

/// A pixel-addressed drawing surface.
///
/// Coordinates are whatever a script asked for.  Implementations clip to
/// their own extent and must accept any `i64` without panicking.
pub trait Canvas {
    fn draw_text(&mut self, x: i64, y: i64, text: &str, color: Color);

    fn draw_rect_filled(&mut self, x: i64, y: i64, w: i64, h: i64, color: Color);

    /// Fill the whole surface.
    fn clear(&mut self, color: Color);

    /// Visible extent in pixels as `(width, height)`.
    fn size(&self) -> (i64, i64) {
        (SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    /// Pseudo-3D box: front face in `color`, a right face in `dark` and a top
    /// face in `bright`, both `w / 4` deep.  Face steps outside
    /// [`Canvas::size`] are not drawn.
    #[allow(clippy::too_many_arguments)]
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
        let (width, height) = self.size();
        let depth = (w / 4).max(0);
        let right = x.saturating_add(w);
        self.draw_rect_filled(x, y, w, h, color);
        for i in visible_steps(i128::from(x) + i128::from(w), depth, width) {
            self.draw_rect_filled(right.saturating_add(i), y.saturating_sub(i), 1, h, dark);
        }
        self.draw_rect_filled(right, y.saturating_sub(depth), depth, h, dark);
        for i in visible_steps(i128::from(y) - i128::from(depth), depth, height) {
            let back = depth - i;
            self.draw_rect_filled(x.saturating_add(back), y.saturating_sub(back), w, 1, bright);
        }
    }
}

/// Steps `i` in `0..count` for which `first + i` lies in `0..limit`.
fn visible_steps(first: i128, count: i64, limit: i64) -> Range<i64> {
    let count = i128::from(count.max(0));
    let lo = (-first).clamp(0, count);
    let hi = (i128::from(limit) - first).clamp(lo, count);
    // Both lie in 0..=count, so they fit back in an i64.
    i64::try_from(lo).unwrap_or(0)..i64::try_from(hi).unwrap_or(0)
}

/// Named blob storage holding scripts.
pub trait ScriptSource {
    /// Whole contents of `name`, or `None` if there is no such file.
    fn read_script(&self, name: &str) -> Option<Vec<u8>>;

    /// Names of every stored file, in display order.
    fn list_scripts(&self) -> Vec<String>;
}

/// Monotonic tick counter used for loop pacing.
pub trait Clock {
    fn current_tick(&self) -> u64;
}

/// Everything the interpreter needs from its environment.
pub trait Host: Canvas + ScriptSource + Clock {}

impl<T: Canvas + ScriptSource + Clock + ?Sized> Host for T {}

// ── Directory-backed script source ────────────────────────────────────────────

/// Scripts stored as plain files in a single directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Only bare file names resolve; anything that could walk out of the
    /// directory does not exist as far as the shell is concerned.
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let name = name.trim();
        if name.is_empty() || name == "." || name.contains("..") || name.contains(['/', '\\']) {
            return None;
        }
        Some(self.root.join(name))
    }
}

impl ScriptSource for DirSource {
    fn read_script(&self, name: &str) -> Option<Vec<u8>> {
        let path = self.resolve(name)?;
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::debug!("{}: {e}", path.display());
                None
            }
        }
    }

    fn list_scripts(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("{}: {e}", self.root.display());
                return Vec::new();
            }
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }
}

// ── Wall clock ────────────────────────────────────────────────────────────────

/// Milliseconds since construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn current_tick(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

// ── Recording host ────────────────────────────────────────────────────────────

/// One call made on a [`Recorder`]'s canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCall {
    Text { x: i64, y: i64, text: String, color: Color },
    Rect { x: i64, y: i64, w: i64, h: i64, color: Color },
    Cube { x: i64, y: i64, w: i64, h: i64, color: Color, dark: Color, bright: Color },
    Clear(Color),
}

/// In-memory host: scripts come from a map, drawing is recorded, and every
/// clock read advances the tick by one so pacing never stalls.
#[derive(Debug, Default)]
pub struct Recorder {
    pub calls: Vec<DrawCall>,
    pub files: BTreeMap<String, String>,
    tick: Cell<u64>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper to add a stored file.
    pub fn with_file(mut self, name: impl Into<String>, contents: impl Into<String>) -> Self {
        self.files.insert(name.into(), contents.into());
        self
    }

    /// Every text drawn, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Text drawn on console rows, leaving out the banner.
    pub fn console_lines(&self) -> Vec<&str> {
        self.texts()
            .into_iter()
            .filter(|t| *t != crate::script::interp::BANNER)
            .collect()
    }

    /// Ticks read so far.
    pub fn ticks(&self) -> u64 {
        self.tick.get()
    }
}

impl Canvas for Recorder {
    fn draw_text(&mut self, x: i64, y: i64, text: &str, color: Color) {
        self.calls.push(DrawCall::Text { x, y, text: text.to_owned(), color });
    }

    fn draw_rect_filled(&mut self, x: i64, y: i64, w: i64, h: i64, color: Color) {
        self.calls.push(DrawCall::Rect { x, y, w, h, color });
    }

    fn clear(&mut self, color: Color) {
        self.calls.push(DrawCall::Clear(color));
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
        self.calls.push(DrawCall::Cube { x, y, w, h, color, dark, bright });
    }
}

impl ScriptSource for Recorder {
    fn read_script(&self, name: &str) -> Option<Vec<u8>> {
        self.files.get(name).map(|s| s.as_bytes().to_vec())
    }

    fn list_scripts(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }
}

impl Clock for Recorder {
    fn current_tick(&self) -> u64 {
        let t = self.tick.get();
        self.tick.set(t + 1);
        t
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
