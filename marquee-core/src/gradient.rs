//! Gradient palettes
//!
//! Six fixed 7-stop palettes. The first three run top to bottom within a
//! text line, the last three run left to right across the panel. Stops are
//! picked by bucketing, not interpolated.

use marquee_display::Rgb565;
use marquee_protocol::{FontSize, Gradient, GradientAxis};

/// Stops per palette
pub const PALETTE_STOPS: usize = 7;

/// Palette table, indexed by [`Gradient::palette_index`]
pub const PALETTES: [[[u8; 3]; PALETTE_STOPS]; 6] = [
    // Rainbow: red, orange, yellow, green, cyan, blue, violet
    [
        [255, 0, 0],
        [255, 127, 0],
        [255, 255, 0],
        [0, 255, 0],
        [0, 255, 255],
        [0, 0, 255],
        [127, 0, 255],
    ],
    // Bright rainbow: red, pink, purple, azure, cyan, green, yellow
    [
        [255, 0, 0],
        [255, 0, 255],
        [128, 0, 255],
        [0, 128, 255],
        [0, 255, 255],
        [0, 255, 0],
        [255, 255, 0],
    ],
    // Reverse rainbow
    [
        [127, 0, 255],
        [0, 0, 255],
        [0, 255, 255],
        [0, 255, 0],
        [255, 255, 0],
        [255, 127, 0],
        [255, 0, 0],
    ],
    // Flame, symmetric around white
    [
        [255, 0, 0],
        [255, 127, 0],
        [255, 255, 0],
        [255, 255, 255],
        [255, 255, 0],
        [255, 127, 0],
        [255, 0, 0],
    ],
    // Neon
    [
        [255, 20, 147],
        [255, 165, 0],
        [255, 255, 0],
        [0, 255, 0],
        [0, 255, 255],
        [0, 0, 255],
        [138, 43, 226],
    ],
    // Forest, symmetric around white
    [
        [0, 100, 0],
        [0, 200, 0],
        [127, 255, 0],
        [255, 255, 255],
        [127, 255, 0],
        [0, 200, 0],
        [0, 100, 0],
    ],
];

/// Text slot a pixel belongs to
///
/// Upper and lower are the two 16×16 half-screen lines; `Full` is the single
/// 32×32 line used in large-font mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Region {
    Upper,
    Lower,
    Full,
}

impl Region {
    /// Glyph geometry stored in this slot
    pub fn font(self) -> FontSize {
        match self {
            Region::Upper | Region::Lower => FontSize::Size16,
            Region::Full => FontSize::Size32,
        }
    }
}

/// Per-pixel gradient color lookup for a panel of a given size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientEngine {
    width: u16,
    half_height: u16,
}

impl GradientEngine {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: width.max(1),
            half_height: height / 2,
        }
    }

    /// Palette stop for a pixel, always in `0..PALETTE_STOPS`
    ///
    /// Vertical palettes bucket the row within the glyph line (glyph
    /// height 16 for the halves, 32 for the full screen). Horizontal
    /// palettes bucket the column across the whole panel width.
    pub fn stop_index(&self, x: i32, y: i32, region: Region, axis: GradientAxis) -> usize {
        let stops = PALETTE_STOPS as i32;
        let index = match axis {
            GradientAxis::Vertical => {
                let rel_y = match region {
                    Region::Lower => y - i32::from(self.half_height),
                    Region::Upper | Region::Full => y,
                };
                rel_y * stops / i32::from(region.font().pixels())
            }
            GradientAxis::Horizontal => x * stops / i32::from(self.width),
        };
        index.clamp(0, stops - 1) as usize
    }

    /// Color for a lit pixel
    ///
    /// [`Gradient::Fixed`] returns `base` unchanged.
    pub fn color_at(
        &self,
        x: i32,
        y: i32,
        region: Region,
        gradient: Gradient,
        base: Rgb565,
    ) -> Rgb565 {
        let (Some(palette), Some(axis)) = (gradient.palette_index(), gradient.axis()) else {
            return base;
        };
        let [r, g, b] = PALETTES[palette][self.stop_index(x, y, region, axis)];
        Rgb565::from_rgb888(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(palette: usize, index: usize) -> Rgb565 {
        let [r, g, b] = PALETTES[palette][index];
        Rgb565::from_rgb888(r, g, b)
    }

    #[test]
    fn test_fixed_returns_base() {
        let engine = GradientEngine::new(64, 32);
        let base = Rgb565::from_rgb888(10, 200, 30);
        assert_eq!(
            engine.color_at(5, 5, Region::Upper, Gradient::Fixed, base),
            base
        );
    }

    #[test]
    fn test_horizontal_endpoints() {
        let engine = GradientEngine::new(64, 32);
        for gradient in [
            Gradient::Horizontal1,
            Gradient::Horizontal2,
            Gradient::Horizontal3,
        ] {
            let palette = gradient.palette_index().unwrap();
            assert_eq!(
                engine.color_at(0, 3, Region::Upper, gradient, Rgb565::WHITE),
                stop(palette, 0)
            );
            assert_eq!(
                engine.color_at(63, 3, Region::Lower, gradient, Rgb565::WHITE),
                stop(palette, 6)
            );
        }
    }

    #[test]
    fn test_vertical_lower_uses_relative_row() {
        let engine = GradientEngine::new(64, 32);
        // Row 16 is the top of the lower half
        assert_eq!(
            engine.stop_index(0, 16, Region::Lower, GradientAxis::Vertical),
            0
        );
        assert_eq!(
            engine.stop_index(0, 31, Region::Lower, GradientAxis::Vertical),
            6
        );
        // 7 * 7 / 16 = 3
        assert_eq!(
            engine.stop_index(0, 7, Region::Upper, GradientAxis::Vertical),
            3
        );
    }

    #[test]
    fn test_full_screen_uses_glyph_height_32() {
        let engine = GradientEngine::new(64, 32);
        // 15 * 7 / 32 = 3, whereas 15 * 7 / 16 would be 6
        assert_eq!(
            engine.stop_index(0, 15, Region::Full, GradientAxis::Vertical),
            3
        );
        assert_eq!(
            engine.stop_index(0, 31, Region::Full, GradientAxis::Vertical),
            6
        );
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let engine = GradientEngine::new(64, 32);
        assert_eq!(
            engine.stop_index(-20, 0, Region::Upper, GradientAxis::Horizontal),
            0
        );
        assert_eq!(
            engine.stop_index(500, 0, Region::Upper, GradientAxis::Horizontal),
            6
        );
        // Upper-region row in the lower half still lands on the last stop
        assert_eq!(
            engine.stop_index(0, 30, Region::Upper, GradientAxis::Vertical),
            6
        );
    }

    #[test]
    fn test_orange_stop_packing() {
        let engine = GradientEngine::new(64, 32);
        // Neon stop 1 is (255, 165, 0); x = 10 -> 70 / 64 = 1
        assert_eq!(
            engine
                .color_at(10, 0, Region::Upper, Gradient::Horizontal2, Rgb565::BLACK)
                .raw(),
            0xFD20
        );
    }
}
