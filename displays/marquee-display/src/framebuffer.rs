//! In-memory sink
//!
//! Holds a full RGB565 canvas and records the calls made against it, so
//! host tests can assert on both the picture and the side effects.

use crate::backend::{DisplayError, PanelSink};
use crate::color::Rgb565;

/// A `W`×`H` RGB565 canvas in RAM
#[derive(Clone)]
pub struct FrameBuffer<const W: usize, const H: usize> {
    pixels: [[Rgb565; W]; H],
    brightness: Option<u8>,
    brightness_writes: u32,
    clears: u32,
    pixel_writes: u32,
    flushes: u32,
}

impl<const W: usize, const H: usize> Default for FrameBuffer<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const H: usize> FrameBuffer<W, H> {
    /// Create a black canvas with no brightness applied yet
    pub fn new() -> Self {
        Self {
            pixels: [[Rgb565::BLACK; W]; H],
            brightness: None,
            brightness_writes: 0,
            clears: 0,
            pixel_writes: 0,
            flushes: 0,
        }
    }

    /// Color at (x, y), `None` outside the canvas
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb565> {
        self.pixels.get(y).and_then(|row| row.get(x)).copied()
    }

    /// One row of pixels
    pub fn row(&self, y: usize) -> Option<&[Rgb565; W]> {
        self.pixels.get(y)
    }

    /// Last brightness written, if any
    pub fn brightness(&self) -> Option<u8> {
        self.brightness
    }

    /// Number of `set_brightness` calls
    pub fn brightness_writes(&self) -> u32 {
        self.brightness_writes
    }

    /// Number of `clear` calls
    pub fn clear_count(&self) -> u32 {
        self.clears
    }

    /// Number of `set_pixel` calls
    pub fn pixel_writes(&self) -> u32 {
        self.pixel_writes
    }

    /// Number of `flush` calls
    pub fn flush_count(&self) -> u32 {
        self.flushes
    }

    /// Count of non-black pixels inside the given rows
    pub fn lit_in_rows(&self, rows: core::ops::Range<usize>) -> usize {
        self.pixels
            .iter()
            .skip(rows.start)
            .take(rows.end.saturating_sub(rows.start))
            .flat_map(|row| row.iter())
            .filter(|p| !p.is_black())
            .count()
    }

    /// Count of non-black pixels on the whole canvas
    pub fn lit_count(&self) -> usize {
        self.lit_in_rows(0..H)
    }

    /// Forget recorded call counts, keeping the picture
    pub fn reset_counters(&mut self) {
        self.brightness_writes = 0;
        self.clears = 0;
        self.pixel_writes = 0;
        self.flushes = 0;
    }
}

impl<const W: usize, const H: usize> PanelSink for FrameBuffer<W, H> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        for row in self.pixels.iter_mut() {
            row.fill(Rgb565::BLACK);
        }
        self.clears += 1;
        Ok(())
    }

    fn set_pixel(&mut self, x: u16, y: u16, color: Rgb565) -> Result<(), DisplayError> {
        let cell = self
            .pixels
            .get_mut(usize::from(y))
            .and_then(|row| row.get_mut(usize::from(x)))
            .ok_or(DisplayError::InvalidCoordinates)?;
        *cell = color;
        self.pixel_writes += 1;
        Ok(())
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        self.brightness = Some(level);
        self.brightness_writes += 1;
        Ok(())
    }

    fn dimensions(&self) -> (u16, u16) {
        (W as u16, H as u16)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.flushes += 1;
        Ok(())
    }
}
