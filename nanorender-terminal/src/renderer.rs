/// Presents rendered color buffers in the terminal
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use nanorender_core::{ColorBuffer, Rgba};
use std::io::Write;

use crate::config::PresentStyle;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Upper half block: foreground paints the top pixel, background the bottom
const HALF_BLOCK: char = '▀';

/// Writes a color buffer into a rectangle of terminal cells.
///
/// Each cell covers two vertically stacked pixels in both styles, which
/// keeps the pixels roughly square.
#[derive(Debug, Clone, Copy)]
pub struct TerminalPresenter {
    style: PresentStyle,
}

impl TerminalPresenter {
    pub fn new(style: PresentStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> PresentStyle {
        self.style
    }

    /// Buffer size that fills `cols × rows` cells
    pub fn frame_size(cols: u16, rows: u16) -> (usize, usize) {
        (cols as usize, rows as usize * 2)
    }

    /// Draw `buffer` with its top-left corner at cell `(0, top)`
    pub fn draw<W: Write>(
        &self,
        writer: &mut W,
        buffer: &ColorBuffer,
        top: u16,
    ) -> std::io::Result<()> {
        let rows = buffer.height() / 2;
        for row in 0..rows {
            writer.queue(cursor::MoveTo(0, top + row as u16))?;
            let mut last: Option<(Rgba, Rgba)> = None;
            for col in 0..buffer.width() {
                let (upper, lower) = cell_pixels(buffer, col, row);
                match self.style {
                    PresentStyle::Color => {
                        if last != Some((upper, lower)) {
                            writer.queue(SetForegroundColor(to_color(upper)))?;
                            writer.queue(SetBackgroundColor(to_color(lower)))?;
                            last = Some((upper, lower));
                        }
                        writer.queue(Print(HALF_BLOCK))?;
                    }
                    PresentStyle::Ascii => {
                        let luminance = (upper.luminance() + lower.luminance()) / 2.0;
                        let c = ramp_glyph(luminance);
                        writer.queue(SetForegroundColor(glyph_color(c)))?;
                        writer.queue(Print(c))?;
                    }
                }
            }
            writer.queue(ResetColor)?;
        }
        Ok(())
    }
}

/// The two pixels shown by the cell at `col`, `row` (rows counted from the
/// top). Buffers store the bottom row first.
fn cell_pixels(buffer: &ColorBuffer, col: usize, row: usize) -> (Rgba, Rgba) {
    let height = buffer.height() as i32;
    let (x, upper_y) = (col as i32, height - 1 - 2 * row as i32);
    let upper = buffer.get(x, upper_y).unwrap_or_default();
    let lower = buffer.get(x, upper_y - 1).unwrap_or_default();
    (upper, lower)
}

fn to_color(c: Rgba) -> Color {
    Color::Rgb {
        r: c.r(),
        g: c.g(),
        b: c.b(),
    }
}

/// Glyph for a luminance in `[0, 1]`
pub fn ramp_glyph(luminance: f32) -> char {
    let index = (luminance.clamp(0.0, 1.0) * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

fn glyph_color(c: char) -> Color {
    match c {
        ' ' | '.' | ':' => Color::DarkGrey,
        '-' | '=' => Color::Grey,
        '+' | '*' => Color::White,
        _ => Color::Cyan,
    }
}
