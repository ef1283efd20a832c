//! `embedded-graphics` adapter
//!
//! Lets the renderer drive any `DrawTarget<Color = Rgb565>`: a HUB75 driver,
//! the desktop simulator, or `MockDisplay` in tests.

use embedded_graphics::pixelcolor::raw::{RawData, RawU16};
use embedded_graphics::pixelcolor::Rgb565 as EgRgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::backend::{DisplayError, PanelSink};
use crate::color::Rgb565;

impl From<Rgb565> for EgRgb565 {
    fn from(color: Rgb565) -> Self {
        EgRgb565::from(RawU16::new(color.raw()))
    }
}

impl From<EgRgb565> for Rgb565 {
    fn from(color: EgRgb565) -> Self {
        Rgb565::from_raw(RawU16::from(color).into_inner())
    }
}

/// A [`PanelSink`] over an `embedded-graphics` draw target
///
/// Draw targets have no brightness control, so the requested level is
/// stored for the owner to apply (PWM, driver register, etc.).
pub struct DrawTargetPanel<D> {
    target: D,
    brightness: u8,
}

impl<D> DrawTargetPanel<D>
where
    D: DrawTarget<Color = EgRgb565>,
{
    pub fn new(target: D) -> Self {
        Self {
            target,
            brightness: u8::MAX,
        }
    }

    /// Last brightness requested
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }
}

impl<D> PanelSink for DrawTargetPanel<D>
where
    D: DrawTarget<Color = EgRgb565>,
{
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.target
            .clear(EgRgb565::BLACK)
            .map_err(|_| DisplayError::Communication)
    }

    fn set_pixel(&mut self, x: u16, y: u16, color: Rgb565) -> Result<(), DisplayError> {
        Pixel(Point::new(i32::from(x), i32::from(y)), color.into())
            .draw(&mut self.target)
            .map_err(|_| DisplayError::Communication)
    }

    fn set_brightness(&mut self, level: u8) -> Result<(), DisplayError> {
        self.brightness = level;
        Ok(())
    }

    fn dimensions(&self) -> (u16, u16) {
        let size = self.target.bounding_box().size;
        (
            u16::try_from(size.width).unwrap_or(u16::MAX),
            u16::try_from(size.height).unwrap_or(u16::MAX),
        )
    }

    fn fill_rect(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        color: Rgb565,
    ) -> Result<(), DisplayError> {
        let area = Rectangle::new(
            Point::new(i32::from(x), i32::from(y)),
            Size::new(u32::from(width), u32::from(height)),
        )
        .intersection(&self.target.bounding_box());
        self.target
            .fill_solid(&area, color.into())
            .map_err(|_| DisplayError::Communication)
    }
}
