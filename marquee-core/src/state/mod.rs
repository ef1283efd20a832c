//! Display state
//!
//! Everything the renderer needs to draw a frame lives here: font size,
//! orientation, brightness, and per-slot text, color and effect settings.
//! The display is split into an upper and a lower half, each with its own
//! independent settings. 32×32 mode draws a single full-screen line that
//! keeps its own text and color, but borrows the upper half's effect, group
//! cursor and background.

pub mod color;
pub mod effect;
pub mod text;

use alloc::collections::TryReserveError;
use alloc::vec::Vec;

use marquee_protocol::{FontSize, Orientation};

use crate::font::{DEFAULT_FULL, DEFAULT_LOWER, DEFAULT_UPPER};
use crate::gradient::Region;

pub use color::ColorConfig;
pub use effect::{BlinkState, BreatheState, Effect, ScrollState};
pub use text::GlyphBuffer;

/// One of the two half-screen bands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Half {
    Upper,
    Lower,
}

impl Half {
    pub const ALL: [Half; 2] = [Half::Upper, Half::Lower];
}

impl From<Half> for Region {
    fn from(half: Half) -> Self {
        match half {
            Half::Upper => Region::Upper,
            Half::Lower => Region::Lower,
        }
    }
}

/// What changed since the last redraw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirtyFlags {
    pub text: bool,
    pub color: bool,
    pub brightness: bool,
    pub effect: bool,
}

impl DirtyFlags {
    /// Whether a redraw is needed
    pub fn any(&self) -> bool {
        self.text || self.color || self.brightness || self.effect
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn mark_all(&mut self) {
        *self = Self {
            text: true,
            color: true,
            brightness: true,
            effect: true,
        };
    }
}

/// Settings for one half-screen band
#[derive(Debug, Clone, Default)]
pub struct HalfState {
    pub text: GlyphBuffer,
    pub color: ColorConfig,
    pub effect: Effect,
    /// Index of the character group currently shown when paging
    pub group: usize,
}

/// Complete display state
#[derive(Debug, Clone)]
pub struct DisplayState {
    pub font: FontSize,
    pub orientation: Orientation,
    pub brightness: u8,
    pub upper: HalfState,
    pub lower: HalfState,
    /// 32×32 text
    pub full_text: GlyphBuffer,
    /// 32×32 text color
    pub full_color: ColorConfig,
    pub dirty: DirtyFlags,
    /// When a group last advanced or text last changed
    pub last_page_ms: u32,
}

impl DisplayState {
    pub fn new(brightness: u8) -> Self {
        Self {
            font: FontSize::default(),
            orientation: Orientation::default(),
            brightness,
            upper: HalfState::default(),
            lower: HalfState::default(),
            full_text: GlyphBuffer::new(),
            full_color: ColorConfig::default(),
            dirty: DirtyFlags::default(),
            last_page_ms: 0,
        }
    }

    pub fn half(&self, half: Half) -> &HalfState {
        match half {
            Half::Upper => &self.upper,
            Half::Lower => &self.lower,
        }
    }

    pub fn half_mut(&mut self, half: Half) -> &mut HalfState {
        match half {
            Half::Upper => &mut self.upper,
            Half::Lower => &mut self.lower,
        }
    }

    /// Text buffer backing a slot
    pub fn text(&self, region: Region) -> &GlyphBuffer {
        match region {
            Region::Upper => &self.upper.text,
            Region::Lower => &self.lower.text,
            Region::Full => &self.full_text,
        }
    }

    /// Color settings for a slot
    pub fn color(&self, region: Region) -> &ColorConfig {
        match region {
            Region::Upper => &self.upper.color,
            Region::Lower => &self.lower.color,
            Region::Full => &self.full_color,
        }
    }

    /// Glyph words and character count to draw for a slot
    ///
    /// Falls back to the built-in glyphs while the slot is empty.
    pub fn glyphs(&self, region: Region) -> (&[u16], usize) {
        let buffer = self.text(region);
        if let Some(words) = buffer.words() {
            return (words, buffer.char_count());
        }
        let defaults: &'static [u16] = match region {
            Region::Upper => &DEFAULT_UPPER,
            Region::Lower => &DEFAULT_LOWER,
            Region::Full => &DEFAULT_FULL,
        };
        (defaults, defaults.len() / region.font().words_per_glyph())
    }

    /// Replace a slot's text and restart its paging
    ///
    /// On allocation failure the slot is left empty and shows its default.
    /// Either way the text is marked for redraw.
    pub fn set_text(
        &mut self,
        region: Region,
        words: &[u16],
        now_ms: u32,
    ) -> Result<(), TryReserveError> {
        self.set_text_with(region, words, now_ms, Vec::try_reserve_exact)
    }

    pub(crate) fn set_text_with<R>(
        &mut self,
        region: Region,
        words: &[u16],
        now_ms: u32,
        reserve: R,
    ) -> Result<(), TryReserveError>
    where
        R: FnOnce(&mut Vec<u16>, usize) -> Result<(), TryReserveError>,
    {
        let font = region.font();
        let result = match region {
            Region::Upper => {
                self.upper.group = 0;
                self.upper.text.replace_with(words, font, reserve)
            }
            Region::Lower => {
                self.lower.group = 0;
                self.lower.text.replace_with(words, font, reserve)
            }
            Region::Full => {
                self.upper.group = 0;
                self.full_text.replace_with(words, font, reserve)
            }
        };
        self.last_page_ms = now_ms;
        self.dirty.text = true;
        result
    }

    /// Replace whatever effect a half runs
    pub fn set_effect(&mut self, half: Half, effect: Effect) {
        self.half_mut(half).effect = effect;
        self.dirty.effect = true;
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new(128)
    }
}
