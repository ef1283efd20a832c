//! Glyph text buffers

use alloc::collections::TryReserveError;
use alloc::vec::Vec;

use marquee_protocol::FontSize;

/// Owned glyph words for one text slot
///
/// `None` means nothing has been received (or the last allocation failed);
/// the renderer then shows the built-in default for the slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphBuffer {
    words: Option<Vec<u16>>,
    char_count: usize,
}

impl GlyphBuffer {
    pub const fn new() -> Self {
        Self {
            words: None,
            char_count: 0,
        }
    }

    /// Replace the contents with a copy of `words`
    ///
    /// The previous buffer is released before the new one is allocated. On
    /// allocation failure the slot is left empty.
    pub fn replace(&mut self, words: &[u16], font: FontSize) -> Result<(), TryReserveError> {
        self.replace_with(words, font, Vec::try_reserve_exact)
    }

    /// [`replace`](Self::replace) with the allocation step supplied by the caller
    pub(crate) fn replace_with<R>(
        &mut self,
        words: &[u16],
        font: FontSize,
        reserve: R,
    ) -> Result<(), TryReserveError>
    where
        R: FnOnce(&mut Vec<u16>, usize) -> Result<(), TryReserveError>,
    {
        self.clear();

        let count = words.len() / font.words_per_glyph();
        if count == 0 {
            return Ok(());
        }
        let used = &words[..count * font.words_per_glyph()];

        let mut buffer = Vec::new();
        reserve(&mut buffer, used.len())?;
        buffer.extend_from_slice(used);

        self.words = Some(buffer);
        self.char_count = count;
        Ok(())
    }

    /// Drop the contents
    pub fn clear(&mut self) {
        self.words = None;
        self.char_count = 0;
    }

    /// Stored words, `None` if the slot is empty
    pub fn words(&self) -> Option<&[u16]> {
        match &self.words {
            Some(words) if self.char_count > 0 => Some(words.as_slice()),
            _ => None,
        }
    }

    pub fn char_count(&self) -> usize {
        self.char_count
    }

    pub fn is_empty(&self) -> bool {
        self.words().is_none()
    }
}

/// Allocation step that always fails, for exercising the fallback paths
#[cfg(test)]
pub(crate) fn refuse_allocation(_: &mut Vec<u16>, _: usize) -> Result<(), TryReserveError> {
    Vec::<u16>::new().try_reserve_exact(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_counts_whole_glyphs() {
        let mut buffer = GlyphBuffer::new();
        assert!(buffer.is_empty());

        let words = [0xAAAAu16; 40];
        buffer.replace(&words, FontSize::Size16).unwrap();
        assert_eq!(buffer.char_count(), 2);
        assert_eq!(buffer.words().unwrap().len(), 32);
    }

    #[test]
    fn test_replace_with_nothing_empties() {
        let mut buffer = GlyphBuffer::new();
        buffer.replace(&[1; 16], FontSize::Size16).unwrap();
        assert!(!buffer.is_empty());

        buffer.replace(&[1; 16], FontSize::Size32).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.char_count(), 0);
    }

    #[test]
    fn test_replace_drops_old_contents() {
        let mut buffer = GlyphBuffer::new();
        buffer.replace(&[1; 32], FontSize::Size16).unwrap();
        buffer.replace(&[2; 16], FontSize::Size16).unwrap();
        assert_eq!(buffer.words(), Some(&[2u16; 16][..]));
        assert_eq!(buffer.char_count(), 1);
    }

    #[test]
    fn test_allocation_failure_leaves_slot_empty() {
        let mut buffer = GlyphBuffer::new();
        buffer.replace(&[1; 32], FontSize::Size16).unwrap();

        let result = buffer.replace_with(&[2; 16], FontSize::Size16, refuse_allocation);
        assert!(result.is_err());
        assert!(buffer.is_empty());
        assert_eq!(buffer.char_count(), 0);
    }
}
