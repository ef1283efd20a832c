//! Panel sink trait
//!
//! Defines the interface the renderer draws through.

use crate::color::Rgb565;

/// Display sink errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with the panel or draw target
    Communication,
    /// Pixel outside the canvas
    InvalidCoordinates,
    /// Panel not initialized
    NotInitialized,
}

/// Pixel sink for an RGB565 LED matrix
///
/// Implementations own the physical specifics: scan timing, gamma, how
/// brightness is realized. Coordinates passed to [`PanelSink::set_pixel`]
/// are expected to be inside [`PanelSink::dimensions`]; callers clip.
pub trait PanelSink {
    /// Clear the entire canvas to black
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Set a single pixel
    fn set_pixel(&mut self, x: u16, y: u16, color: Rgb565) -> Result<(), DisplayError>;

    /// Set global brightness (0-255)
    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError>;

    /// Canvas size as (width, height) in pixels
    fn dimensions(&self) -> (u16, u16);

    /// Fill a rectangle, clipped to the canvas
    fn fill_rect(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        color: Rgb565,
    ) -> Result<(), DisplayError> {
        let (w, h) = self.dimensions();
        let x_end = x.saturating_add(width).min(w);
        let y_end = y.saturating_add(height).min(h);
        for py in y..y_end {
            for px in x..x_end {
                self.set_pixel(px, py, color)?;
            }
        }
        Ok(())
    }

    /// Push buffered content to the panel
    ///
    /// Sinks that draw immediately keep the default no-op.
    fn flush(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }
}

impl<S: PanelSink + ?Sized> PanelSink for &mut S {
    fn clear(&mut self) -> Result<(), DisplayError> {
        (**self).clear()
    }

    fn set_pixel(&mut self, x: u16, y: u16, color: Rgb565) -> Result<(), DisplayError> {
        (**self).set_pixel(x, y, color)
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        (**self).set_brightness(level)
    }

    fn dimensions(&self) -> (u16, u16) {
        (**self).dimensions()
    }

    fn fill_rect(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        color: Rgb565,
    ) -> Result<(), DisplayError> {
        (**self).fill_rect(x, y, width, height, color)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        (**self).flush()
    }
}
