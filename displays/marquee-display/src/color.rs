//! Packed 16-bit panel color

/// RGB565 color as sent to the panel (5 bits red, 6 green, 5 blue)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb565(u16);

impl Rgb565 {
    pub const BLACK: Self = Self(0x0000);
    pub const WHITE: Self = Self(0xFFFF);
    pub const RED: Self = Self(0xF800);
    pub const GREEN: Self = Self(0x07E0);
    pub const BLUE: Self = Self(0x001F);

    /// Wrap an already packed value
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Pack 8-bit channels, truncating the low bits
    pub const fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3))
    }

    /// Packed value
    pub const fn raw(self) -> u16 {
        self.0
    }

    pub const fn is_black(self) -> bool {
        self.0 == 0
    }

    /// Channels at native depth: (r 0-31, g 0-63, b 0-31)
    pub const fn channels(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 11) & 0x1F) as u8,
            ((self.0 >> 5) & 0x3F) as u8,
            (self.0 & 0x1F) as u8,
        )
    }

    /// Build from native-depth channels; excess bits are masked off
    pub const fn from_channels(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u16 & 0x1F) << 11) | ((g as u16 & 0x3F) << 5) | (b as u16 & 0x1F))
    }

    /// Scale each channel by `factor` (0.0-1.0), truncating toward zero
    pub fn scaled(self, factor: f32) -> Self {
        let (r, g, b) = self.channels();
        let scale = |c: u8| (f32::from(c) * factor) as u8;
        Self::from_channels(scale(r), scale(g), scale(b))
    }
}

impl From<u16> for Rgb565 {
    fn from(raw: u16) -> Self {
        Self(raw)
    }
}

impl From<Rgb565> for u16 {
    fn from(color: Rgb565) -> Self {
        color.0
    }
}
