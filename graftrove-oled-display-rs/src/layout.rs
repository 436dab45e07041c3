//! Display geometry and rendering of core [`Render`] commands.
//!
//! All text uses the 5×8 monospace font with a top baseline, so a line at
//! `y` occupies rows `y..y + 8` and each character advances 5 px.

use embedded_graphics::{
    mono_font::{ascii::FONT_5X8, MonoFont, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use graftrove::{AnimationGeometry, Render, Screen};

/// Font used for every string on the panel.
pub const FONT: &MonoFont<'static> = &FONT_5X8;

// ── DisplayConfig ────────────────────────────────────────────────────────

/// Panel geometry and the fixed screens drawn outside the demos.
///
/// [`DisplayConfig::default()`] matches the board: a 128×64 panel, the
/// `FreakStudio` animation on row 10 and the boot banner.
#[derive(Debug, Clone, Copy)]
pub struct DisplayConfig {
    /// Panel width in pixels. Default: 128.
    pub display_width: u32,
    /// Panel height in pixels. Default: 64.
    pub display_height: u32,
    /// Text swept by the boot animation.
    pub animation_text: &'static str,
    /// Top row of the animation text. Default: 10.
    pub animation_y: i32,
    /// Banner lines as (x, y, text).
    pub banner: [(i32, i32, &'static str); 3],
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            display_width: 128,
            display_height: 64,
            animation_text: "FreakStudio",
            animation_y: 10,
            banner: [(45, 5, "Freak"), (42, 15, "Studio"), (30, 25, "Graftrove")],
        }
    }
}

impl DisplayConfig {
    /// Rendered width of `text` in pixels.
    pub fn text_width(&self, text: &str) -> u32 {
        let chars = text.chars().count() as u32;
        if chars == 0 {
            return 0;
        }
        FONT.character_size.width * chars + FONT.character_spacing * (chars - 1)
    }

    /// Geometry for the core's animation state machine.
    pub fn animation_geometry(&self) -> AnimationGeometry {
        AnimationGeometry {
            display_width: self.display_width as i32,
            text_width: self.text_width(self.animation_text) as i32,
            y: self.animation_y,
            band_height: FONT.character_size.height,
        }
    }

    /// Boot banner: panel outline plus the banner lines.
    pub fn banner_screen(&self) -> Screen {
        let mut screen = Screen::new().outline(0, 0, self.display_width, self.display_height);
        for (x, y, text) in self.banner {
            screen.push_text(x, y, text);
        }
        screen
    }
}

// ── Rendering ────────────────────────────────────────────────────────────

/// Apply one [`Render`] command to a frame buffer.
///
/// `Clear` and `Full` start from a blank buffer. `Band` only touches the
/// strip `y..y + height` across the full width and leaves the rest of the
/// buffer as it was.
pub fn render<D>(target: &mut D, command: &Render, config: &DisplayConfig) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    match command {
        Render::Clear => target.clear(BinaryColor::Off),
        Render::Full(screen) => {
            target.clear(BinaryColor::Off)?;
            draw_screen(target, screen)
        }
        Render::Band { y, height, x, text } => {
            Rectangle::new(Point::new(0, *y), Size::new(config.display_width, *height))
                .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
                .draw(target)?;
            draw_text(target, *x, *y, text)
        }
    }
}

/// Draw a screen's outline and lines on top of the current buffer.
pub fn draw_screen<D>(target: &mut D, screen: &Screen) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    if let Some(outline) = screen.outline_rect() {
        Rectangle::new(
            Point::new(outline.x, outline.y),
            Size::new(outline.width, outline.height),
        )
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(target)?;
    }
    for line in screen.lines() {
        draw_text(target, line.x, line.y, &line.text)?;
    }
    Ok(())
}

fn draw_text<D>(target: &mut D, x: i32, y: i32, text: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(FONT, BinaryColor::On);
    Text::with_baseline(text, Point::new(x, y), style, Baseline::Top).draw(target)?;
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────────
