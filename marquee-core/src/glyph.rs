//! Glyph rasterizer
//!
//! Draws column-major monochrome bitmaps onto a [`PanelSink`], either as
//! stored or rotated 90° to the left, in a solid color or with a gradient
//! evaluated per lit pixel. Pixels outside the panel are skipped.

use marquee_display::{DisplayError, PanelSink, Rgb565};
use marquee_protocol::{FontSize, Gradient, Orientation};

use crate::gradient::{GradientEngine, Region};

/// How lit pixels are colored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Solid(Rgb565),
    Gradient {
        gradient: Gradient,
        region: Region,
        /// Used if `gradient` turns out to be [`Gradient::Fixed`]
        base: Rgb565,
    },
}

/// Returns whether the bit for (`col`, `row`) is set
///
/// 16×16 glyphs have one word per column; 32×32 glyphs have two, the first
/// covering rows 0-15. Bit 15 of each word is the topmost row it covers.
#[inline]
pub fn is_lit(glyph: &[u16], font: FontSize, col: usize, row: usize) -> bool {
    let (index, bit) = match font {
        FontSize::Size16 => (col, row),
        FontSize::Size32 => (col * 2 + row / 16, row % 16),
    };
    glyph.get(index).is_some_and(|word| word & (0x8000 >> bit) != 0)
}

/// Rasterizer for a fixed panel size
#[derive(Debug, Clone, Copy)]
pub struct GlyphRenderer {
    width: i32,
    height: i32,
    gradient: GradientEngine,
}

impl GlyphRenderer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: i32::from(width),
            height: i32::from(height),
            gradient: GradientEngine::new(width, height),
        }
    }

    /// Draw one glyph with its top-left corner at (`x`, `y`)
    #[allow(clippy::too_many_arguments)]
    pub fn draw_glyph<S: PanelSink + ?Sized>(
        &self,
        sink: &mut S,
        x: i32,
        y: i32,
        glyph: &[u16],
        font: FontSize,
        orientation: Orientation,
        paint: Paint,
    ) -> Result<(), DisplayError> {
        let size = i32::from(font.pixels());
        if x + size <= 0 || x >= self.width || y + size <= 0 || y >= self.height {
            return Ok(());
        }

        for col in 0..size {
            for row in 0..size {
                if !is_lit(glyph, font, col as usize, row as usize) {
                    continue;
                }
                let (px, py) = match orientation {
                    Orientation::Horizontal => (x + col, y + row),
                    // (col, row) -> (row, size - 1 - col)
                    Orientation::Vertical => (x + row, y + size - 1 - col),
                };
                if px < 0 || px >= self.width || py < 0 || py >= self.height {
                    continue;
                }
                let color = match paint {
                    Paint::Solid(color) => color,
                    Paint::Gradient {
                        gradient,
                        region,
                        base,
                    } => self.gradient.color_at(px, py, region, gradient, base),
                };
                sink.set_pixel(px as u16, py as u16, color)?;
            }
        }
        Ok(())
    }

    /// Draw consecutive glyphs left to right, one glyph width apart
    ///
    /// The advance is horizontal in both orientations. A trailing partial
    /// glyph in `glyphs` is ignored.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_string<S: PanelSink + ?Sized>(
        &self,
        sink: &mut S,
        x: i32,
        y: i32,
        glyphs: &[u16],
        font: FontSize,
        orientation: Orientation,
        paint: Paint,
    ) -> Result<(), DisplayError> {
        let spacing = i32::from(font.spacing());
        let mut pos_x = x;
        for glyph in glyphs.chunks_exact(font.words_per_glyph()) {
            if pos_x >= self.width {
                break;
            }
            self.draw_glyph(sink, pos_x, y, glyph, font, orientation, paint)?;
            pos_x += spacing;
        }
        Ok(())
    }
}
