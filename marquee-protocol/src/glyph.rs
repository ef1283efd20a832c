//! Glyph payload view for set-text frames
//!
//! A set-text payload is one screen-area byte followed by glyph bitmaps as
//! big-endian 16-bit words. The word view is built once per frame and
//! cached, so repeated reads during dispatch never re-pack the bytes.

use alloc::vec::Vec;

use crate::command::{CommandError, FontSize, ScreenArea};
use crate::frame::Frame;

/// Borrowed view of the glyphs carried by a set-text frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphPayload<'a> {
    /// Area selector from the first payload byte
    pub area: ScreenArea,
    /// Geometry the words were sliced with
    pub font: FontSize,
    words: &'a [u16],
}

impl<'a> GlyphPayload<'a> {
    /// Build a view over already-packed words
    ///
    /// Trailing words that do not make up a whole glyph are dropped.
    pub fn new(area: ScreenArea, font: FontSize, words: &'a [u16]) -> Self {
        let per_glyph = font.words_per_glyph();
        let whole = words.len() - words.len() % per_glyph;
        Self {
            area,
            font,
            words: &words[..whole],
        }
    }

    /// Number of complete glyphs
    pub fn char_count(&self) -> usize {
        self.words.len() / self.font.words_per_glyph()
    }

    /// All glyph words, a whole number of glyphs long
    pub fn words(&self) -> &'a [u16] {
        self.words
    }

    /// Split after the first `count` glyphs
    ///
    /// `count` is clamped to the number of glyphs available.
    pub fn split_at(&self, count: usize) -> (&'a [u16], &'a [u16]) {
        let at = count.min(self.char_count()) * self.font.words_per_glyph();
        self.words.split_at(at)
    }
}

/// Pack bytes pairwise into big-endian words; an odd trailing byte is ignored
pub fn pack_words(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

impl Frame {
    /// Payload words after the area byte, packed on first use
    pub fn payload_words(&self) -> &[u16] {
        self.words
            .get_or_init(|| pack_words(self.payload.get(1..).unwrap_or(&[])))
    }

    /// Interpret this frame's payload as glyph data of the given size
    pub fn glyph_payload(&self, font: FontSize) -> Result<GlyphPayload<'_>, CommandError> {
        let Some((&area_byte, data)) = self.payload.split_first() else {
            return Err(CommandError::EmptyGlyphData);
        };
        if data.len() / font.bytes_per_glyph() == 0 {
            return Err(CommandError::EmptyGlyphData);
        }
        let area =
            ScreenArea::from_byte(area_byte).ok_or(CommandError::InvalidScreenArea(area_byte))?;

        Ok(GlyphPayload::new(area, font, self.payload_words()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandCode;

    fn text_frame(area: u8, glyph_bytes: &[u8]) -> Frame {
        let mut payload = alloc::vec![area];
        payload.extend_from_slice(glyph_bytes);
        Frame::new(CommandCode::SetText, &payload).unwrap()
    }

    #[test]
    fn test_big_endian_packing() {
        let mut bytes = alloc::vec![0u8; 32];
        bytes[0] = 0x12;
        bytes[1] = 0x34;
        let frame = text_frame(1, &bytes);

        let glyphs = frame.glyph_payload(FontSize::Size16).unwrap();
        assert_eq!(glyphs.words()[0], 0x1234);
        assert_eq!(glyphs.char_count(), 1);
        assert_eq!(glyphs.area, ScreenArea::Upper);
    }

    #[test]
    fn test_conversion_is_cached() {
        let frame = text_frame(2, &[0xAB; 64]);
        let first = frame.payload_words().as_ptr();
        let glyphs = frame.glyph_payload(FontSize::Size16).unwrap();
        assert_eq!(glyphs.words().as_ptr(), first);
        assert_eq!(frame.payload_words().as_ptr(), first);
        assert_eq!(glyphs.char_count(), 2);
    }

    #[test]
    fn test_partial_glyph_dropped() {
        // 1 whole 16x16 glyph plus 10 stray bytes
        let frame = text_frame(3, &[0xFF; 42]);
        let glyphs = frame.glyph_payload(FontSize::Size16).unwrap();
        assert_eq!(glyphs.char_count(), 1);
        assert_eq!(glyphs.words().len(), 16);
        assert_eq!(glyphs.split_at(2).1.len(), 0);
    }

    #[test]
    fn test_32_needs_128_bytes() {
        let frame = text_frame(1, &[0x00; 127]);
        assert_eq!(
            frame.glyph_payload(FontSize::Size32),
            Err(CommandError::EmptyGlyphData)
        );

        let frame = text_frame(1, &[0x00; 256]);
        let glyphs = frame.glyph_payload(FontSize::Size32).unwrap();
        assert_eq!(glyphs.char_count(), 2);
        assert_eq!(glyphs.split_at(1).1.len(), 64);
    }

    #[test]
    fn test_invalid_area_rejected() {
        let frame = text_frame(7, &[0x00; 32]);
        assert_eq!(
            frame.glyph_payload(FontSize::Size16),
            Err(CommandError::InvalidScreenArea(7))
        );
    }

    #[test]
    fn test_empty_payload() {
        let frame = Frame::empty(CommandCode::SetText);
        assert_eq!(
            frame.glyph_payload(FontSize::Size16),
            Err(CommandError::EmptyGlyphData)
        );
    }

    #[test]
    fn test_split_for_both_halves() {
        let frame = text_frame(3, &[0x01; 32 * 5]);
        let glyphs = frame.glyph_payload(FontSize::Size16).unwrap();
        let half = glyphs.char_count() / 2;
        let (upper, lower) = glyphs.split_at(half);
        assert_eq!(upper.len(), 32);
        assert_eq!(lower.len(), 48);
    }
}
