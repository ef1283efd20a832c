//! Per-slot color settings

use marquee_display::Rgb565;
use marquee_protocol::{ColorCommand, ColorMode, ColorTarget, Gradient};

/// Text and background colors for one slot
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorConfig {
    /// Packed text color used in fixed mode
    pub text: Rgb565,
    /// Packed background color; black means no fill
    pub background: Rgb565,
    pub mode: ColorMode,
    pub gradient: Gradient,
    /// Last text RGB received, restored when a gradient is cancelled
    pub remembered_rgb: [u8; 3],
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            text: Rgb565::WHITE,
            background: Rgb565::BLACK,
            mode: ColorMode::Fixed,
            gradient: Gradient::Fixed,
            remembered_rgb: [255, 255, 255],
        }
    }
}

impl ColorConfig {
    /// Whether text is painted with a gradient
    pub fn uses_gradient(&self) -> bool {
        self.mode == ColorMode::Gradient && self.gradient != Gradient::Fixed
    }

    /// Apply a decoded color command
    ///
    /// Text RGB is always remembered. In gradient mode the packed text color
    /// is left as it was.
    pub fn apply(&mut self, command: &ColorCommand) {
        let [r, g, b] = command.rgb;
        match command.target {
            ColorTarget::Text => {
                self.remembered_rgb = command.rgb;
                self.mode = command.mode;
                self.gradient = command.gradient;
                if command.mode == ColorMode::Fixed {
                    self.text = Rgb565::from_rgb888(r, g, b);
                }
            }
            ColorTarget::Background => {
                if command.mode == ColorMode::Fixed {
                    self.background = Rgb565::from_rgb888(r, g, b);
                }
            }
        }
    }

    /// Return to fixed mode with the remembered color, or white
    pub fn cancel_gradient(&mut self) {
        self.mode = ColorMode::Fixed;
        self.gradient = Gradient::Fixed;
        if self.remembered_rgb == [0, 0, 0] {
            self.remembered_rgb = [255, 255, 255];
            self.text = Rgb565::WHITE;
        } else {
            let [r, g, b] = self.remembered_rgb;
            self.text = Rgb565::from_rgb888(r, g, b);
        }
    }
}
