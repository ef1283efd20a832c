//! Built-in glyph assets
//!
//! Shown whenever a text slot has no data of its own, e.g. right after boot
//! or after a failed allocation. Glyphs are column-major: one word per
//! column for 16×16 (bit 15 is the top row), two words per column for
//! 32×32 (rows 0-15 first, then rows 16-31).

/// 16×16 "人"
pub const PERSON_16: [u16; 16] = [
    0x0002, 0x0006, 0x000C, 0x0018, 0x0030, 0x00E0, 0x0380, 0x7E00, 0x7E00, 0x0380, 0x00E0,
    0x0030, 0x0018, 0x000C, 0x0006, 0x0002,
];

/// 16×16 filled diamond
pub const DIAMOND_16: [u16; 16] = [
    0x0000, 0x0180, 0x03C0, 0x07E0, 0x0FF0, 0x1FF8, 0x3FFC, 0x7FFE, 0x7FFE, 0x3FFC, 0x1FF8,
    0x0FF0, 0x07E0, 0x03C0, 0x0180, 0x0000,
];

/// 16×16 one-pixel frame
pub const FRAME_16: [u16; 16] = [
    0xFFFF, 0x8001, 0x8001, 0x8001, 0x8001, 0x8001, 0x8001, 0x8001, 0x8001, 0x8001, 0x8001,
    0x8001, 0x8001, 0x8001, 0x8001, 0xFFFF,
];

/// 32×32 right arrow
pub const ARROW_32: [u16; 64] = [
    0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0000, 0x0007, 0xE000, //
    0x0007, 0xE000, 0x0007, 0xE000, 0x0007, 0xE000, 0x0007, 0xE000, //
    0x0007, 0xE000, 0x0007, 0xE000, 0x0007, 0xE000, 0x0007, 0xE000, //
    0x0007, 0xE000, 0x0007, 0xE000, 0x0007, 0xE000, 0x0007, 0xE000, //
    0x0007, 0xE000, 0x1FFF, 0xFFF8, 0x0FFF, 0xFFF0, 0x07FF, 0xFFE0, //
    0x03FF, 0xFFC0, 0x01FF, 0xFF80, 0x00FF, 0xFF00, 0x007F, 0xFE00, //
    0x003F, 0xFC00, 0x001F, 0xF800, 0x000F, 0xF000, 0x0007, 0xE000, //
    0x0003, 0xC000, 0x0001, 0x8000, 0x0000, 0x0000, 0x0000, 0x0000, //
];

/// 32×32 solid block spanning columns 5-26
pub const BLOCK_32: [u16; 64] = {
    let mut words = [0u16; 64];
    let mut i = 10;
    while i < 54 {
        words[i] = 0xFFFF;
        i += 1;
    }
    words
};

const fn repeat<const M: usize, const N: usize>(glyph: &[u16; M]) -> [u16; N] {
    let mut out = [0u16; N];
    let mut i = 0;
    while i < N {
        out[i] = glyph[i % M];
        i += 1;
    }
    out
}

/// Upper half fallback: six characters, so it pages
pub static DEFAULT_UPPER: [u16; 16 * 6] = repeat(&PERSON_16);

/// Lower half fallback: five characters
pub static DEFAULT_LOWER: [u16; 16 * 5] = repeat(&PERSON_16);

/// Full-screen fallback: three arrows
pub static DEFAULT_FULL: [u16; 64 * 3] = repeat(&ARROW_32);
