//! Display commands produced by the core.
//!
//! The core never draws pixels. It builds [`Screen`] snapshots and
//! [`Render`] commands that the display crate turns into framebuffer
//! operations. Coordinates are in pixels with the origin at the top-left.

use core::fmt;

/// Maximum characters per text line.
pub const LINE_CHARS: usize = 24;

/// Maximum text lines per screen.
pub const MAX_LINES: usize = 8;

/// Line text storage.
pub type LineText = heapless::String<LINE_CHARS>;

/// One string at a fixed position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub x: i32,
    pub y: i32,
    pub text: LineText,
}

/// Outline rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outline {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Immutable snapshot of one full frame.
///
/// Equality is structural, so a presenter can skip flushing a frame that
/// matches the one already on the panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Screen {
    lines: heapless::Vec<TextLine, MAX_LINES>,
    outline: Option<Outline>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line, truncating text beyond [`LINE_CHARS`]. Lines beyond
    /// [`MAX_LINES`] are ignored.
    pub fn text(mut self, x: i32, y: i32, text: &str) -> Self {
        self.push_text(x, y, text);
        self
    }

    /// Add a formatted line, e.g. `screen.line(0, 12, format_args!("ADC{}", i))`.
    pub fn line(mut self, x: i32, y: i32, args: fmt::Arguments) -> Self {
        self.push_line(x, y, args);
        self
    }

    pub fn outline(mut self, x: i32, y: i32, width: u32, height: u32) -> Self {
        self.outline = Some(Outline { x, y, width, height });
        self
    }

    pub fn push_text(&mut self, x: i32, y: i32, text: &str) {
        self.push_line(x, y, format_args!("{}", text));
    }

    pub fn push_line(&mut self, x: i32, y: i32, args: fmt::Arguments) {
        let mut text = LineText::new();
        let _ = fmt::write(&mut Truncating(&mut text), args);
        let _ = self.lines.push(TextLine { x, y, text });
    }

    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    pub fn outline_rect(&self) -> Option<Outline> {
        self.outline
    }

    /// Text of the line at `y`, if any. Convenience for tests and logging.
    pub fn text_at(&self, y: i32) -> Option<&str> {
        self.lines.iter().find(|l| l.y == y).map(|l| l.text.as_str())
    }

    pub fn contains(&self, text: &str) -> bool {
        self.lines.iter().any(|l| l.text == text)
    }
}

/// Writer that keeps as much of the output as fits and never fails.
struct Truncating<'a>(&'a mut LineText);

impl fmt::Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// One command for the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Render {
    /// Blank the whole panel.
    Clear,
    /// Replace the panel contents.
    Full(Screen),
    /// Clear the horizontal strip `y..y + height` and draw `text` at
    /// (`x`, `y`). Used for animation frames.
    Band {
        y: i32,
        height: u32,
        x: i32,
        text: &'static str,
    },
}
