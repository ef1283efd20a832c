//! Redraw pipeline
//!
//! A redraw always repaints the whole panel: clear, background fill, then
//! text. With 16×16 glyphs the upper half holds one line at row 0 and the
//! lower half one line at the half-height row; with 32×32 glyphs a single
//! line covers the panel.

use marquee_display::{DisplayError, PanelSink};
use marquee_protocol::FontSize;

use crate::config::MatrixConfig;
use crate::glyph::{GlyphRenderer, Paint};
use crate::gradient::Region;
use crate::state::{ColorConfig, DisplayState, Effect, Half};

/// Glyphs to show from a line that may be paged
///
/// Returns `(first, count)`, or `None` if the group lies past the end.
pub fn visible_range(total: usize, group: usize, per_line: usize) -> Option<(usize, usize)> {
    if total <= per_line {
        return Some((0, total));
    }
    let first = group.checked_mul(per_line)?;
    if first >= total {
        return None;
    }
    Some((first, per_line.min(total - first)))
}

/// Left edge that centers `count` glyphs, never left of column 0
pub fn centered_x(screen_width: i32, count: usize, spacing: u16) -> i32 {
    let text_width = (count as i32).saturating_mul(i32::from(spacing));
    ((screen_width - text_width) / 2).max(0)
}

/// Draws a [`DisplayState`] onto a sink
#[derive(Debug, Clone)]
pub struct Renderer {
    width: i32,
    height: u16,
    half_height: u16,
    chars_per_line_16: usize,
    chars_per_line_32: usize,
    glyphs: GlyphRenderer,
}

impl Renderer {
    pub fn new(config: &MatrixConfig) -> Self {
        Self {
            width: i32::from(config.panel.width),
            height: config.panel.height,
            half_height: config.half_height(),
            chars_per_line_16: config.chars_per_line(FontSize::Size16),
            chars_per_line_32: config.chars_per_line(FontSize::Size32),
            glyphs: GlyphRenderer::new(config.panel.width, config.panel.height),
        }
    }

    /// Repaint the panel from `state` and flush
    ///
    /// Does not touch the dirty flags; the caller clears them once the
    /// redraw succeeded.
    pub fn redraw<S: PanelSink + ?Sized>(
        &self,
        state: &DisplayState,
        sink: &mut S,
    ) -> Result<(), DisplayError> {
        sink.clear()?;

        match state.font {
            FontSize::Size16 => {
                self.fill_background(sink, &state.upper.color, 0, self.half_height)?;
                self.fill_background(sink, &state.lower.color, self.half_height, self.height)?;
                for half in Half::ALL {
                    let slot = state.half(half);
                    let y = match half {
                        Half::Upper => 0,
                        Half::Lower => i32::from(self.half_height),
                    };
                    self.draw_line(sink, state, half.into(), y, &slot.effect, slot.group)?;
                }
            }
            FontSize::Size32 => {
                // The upper background covers the whole panel
                self.fill_background(sink, &state.upper.color, 0, self.height)?;
                self.draw_line(
                    sink,
                    state,
                    Region::Full,
                    0,
                    &state.upper.effect,
                    state.upper.group,
                )?;
            }
        }

        sink.flush()
    }

    fn fill_background<S: PanelSink + ?Sized>(
        &self,
        sink: &mut S,
        color: &ColorConfig,
        from_row: u16,
        to_row: u16,
    ) -> Result<(), DisplayError> {
        if color.background.is_black() {
            return Ok(());
        }
        sink.fill_rect(
            0,
            from_row,
            self.width as u16,
            to_row.saturating_sub(from_row),
            color.background,
        )
    }

    fn draw_line<S: PanelSink + ?Sized>(
        &self,
        sink: &mut S,
        state: &DisplayState,
        region: Region,
        y: i32,
        effect: &Effect,
        group: usize,
    ) -> Result<(), DisplayError> {
        if effect.hides_text() {
            return Ok(());
        }

        let (words, count) = state.glyphs(region);
        if count == 0 {
            return Ok(());
        }
        let font = region.font();
        let per_glyph = font.words_per_glyph();
        let paint = paint_for(state.color(region), effect, region);

        if let Some(scroll) = effect.scroll() {
            let text_width = (count as i32).saturating_mul(i32::from(font.spacing()));
            let x = scroll.position(self.width, text_width);
            if x < self.width && x + text_width > 0 {
                self.glyphs
                    .draw_string(sink, x, y, words, font, state.orientation, paint)?;
            }
            return Ok(());
        }

        let per_line = match font {
            FontSize::Size16 => self.chars_per_line_16,
            FontSize::Size32 => self.chars_per_line_32,
        };
        let Some((first, shown)) = visible_range(count, group, per_line) else {
            return Ok(());
        };
        let x = centered_x(self.width, shown, font.spacing());
        let Some(slice) = words.get(first * per_glyph..(first + shown) * per_glyph) else {
            return Ok(());
        };
        self.glyphs
            .draw_string(sink, x, y, slice, font, state.orientation, paint)
    }
}

/// Paint for a line's text
///
/// Gradients win over breathing; breathing dims the fixed color.
fn paint_for(color: &ColorConfig, effect: &Effect, region: Region) -> Paint {
    if color.uses_gradient() {
        return Paint::Gradient {
            gradient: color.gradient,
            region,
            base: color.text,
        };
    }
    match effect.breathe_multiplier() {
        Some(factor) => Paint::Solid(color.text.scaled(factor)),
        None => Paint::Solid(color.text),
    }
}
