//! Command codes and typed payload decoding
//!
//! Raw wire values stop here: each frame is decoded into a [`Command`]
//! whose fields are closed enums, so downstream code matches exhaustively
//! instead of comparing bytes.

use crate::frame::Frame;
use crate::glyph::GlyphPayload;

// Command codes
pub const CMD_SET_HORIZONTAL: u8 = 0x00;
pub const CMD_SET_VERTICAL: u8 = 0x01;
pub const CMD_SET_FONT_16: u8 = 0x02;
pub const CMD_SET_FONT_32: u8 = 0x03;
pub const CMD_SET_TEXT: u8 = 0x04;
pub const CMD_SET_ANIMATION: u8 = 0x05;
pub const CMD_SET_COLOR: u8 = 0x06;
pub const CMD_SET_BRIGHTNESS: u8 = 0x07;
pub const CMD_SET_EFFECT: u8 = 0x08;

/// Payload sizes for fixed-layout commands
pub const COLOR_PAYLOAD_LEN: usize = 7;
pub const BRIGHTNESS_PAYLOAD_LEN: usize = 1;
pub const EFFECT_PAYLOAD_LEN: usize = 3;

/// Highest speed value the effects are tuned for
pub const NOMINAL_MAX_SPEED: u8 = 10;

/// Protocol command byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandCode {
    /// Render text in normal orientation
    SetHorizontal,
    /// Render text rotated 90° left
    SetVertical,
    /// Switch to 16×16 glyphs
    SetFont16,
    /// Switch to 32×32 glyphs
    SetFont32,
    /// Replace glyph data
    SetText,
    /// Reserved
    SetAnimation,
    /// Set text or background color
    SetColor,
    /// Set panel brightness
    SetBrightness,
    /// Set the active effect
    SetEffect,
}

impl CommandCode {
    /// Parse a command code from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_SET_HORIZONTAL => Some(CommandCode::SetHorizontal),
            CMD_SET_VERTICAL => Some(CommandCode::SetVertical),
            CMD_SET_FONT_16 => Some(CommandCode::SetFont16),
            CMD_SET_FONT_32 => Some(CommandCode::SetFont32),
            CMD_SET_TEXT => Some(CommandCode::SetText),
            CMD_SET_ANIMATION => Some(CommandCode::SetAnimation),
            CMD_SET_COLOR => Some(CommandCode::SetColor),
            CMD_SET_BRIGHTNESS => Some(CommandCode::SetBrightness),
            CMD_SET_EFFECT => Some(CommandCode::SetEffect),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            CommandCode::SetHorizontal => CMD_SET_HORIZONTAL,
            CommandCode::SetVertical => CMD_SET_VERTICAL,
            CommandCode::SetFont16 => CMD_SET_FONT_16,
            CommandCode::SetFont32 => CMD_SET_FONT_32,
            CommandCode::SetText => CMD_SET_TEXT,
            CommandCode::SetAnimation => CMD_SET_ANIMATION,
            CommandCode::SetColor => CMD_SET_COLOR,
            CommandCode::SetBrightness => CMD_SET_BRIGHTNESS,
            CommandCode::SetEffect => CMD_SET_EFFECT,
        }
    }
}

/// Text orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// Glyphs drawn as-is
    #[default]
    Horizontal,
    /// Glyphs rotated 90° to the left, still laid out left to right
    Vertical,
}

/// Glyph geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontSize {
    /// 16×16 glyphs, one line per half-screen
    #[default]
    Size16,
    /// 32×32 glyphs, one line for the whole screen
    Size32,
}

impl FontSize {
    /// Glyph edge length in pixels
    pub const fn pixels(self) -> u16 {
        match self {
            FontSize::Size16 => 16,
            FontSize::Size32 => 32,
        }
    }

    /// Horizontal advance per character
    pub const fn spacing(self) -> u16 {
        self.pixels()
    }

    /// Words of bitmap data per glyph (one word per column per 16 rows)
    pub const fn words_per_glyph(self) -> usize {
        match self {
            FontSize::Size16 => 16,
            FontSize::Size32 => 64,
        }
    }

    /// Payload bytes per glyph
    pub const fn bytes_per_glyph(self) -> usize {
        self.words_per_glyph() * 2
    }
}

/// Target area of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScreenArea {
    /// Upper half
    Upper,
    /// Lower half
    Lower,
    /// Both halves (and the whole-screen slot)
    Both,
}

impl ScreenArea {
    /// Parse from wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(ScreenArea::Upper),
            0x02 => Some(ScreenArea::Lower),
            0x03 => Some(ScreenArea::Both),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            ScreenArea::Upper => 0x01,
            ScreenArea::Lower => 0x02,
            ScreenArea::Both => 0x03,
        }
    }

    /// Whether this area includes the upper half
    pub fn includes_upper(self) -> bool {
        matches!(self, ScreenArea::Upper | ScreenArea::Both)
    }

    /// Whether this area includes the lower half
    pub fn includes_lower(self) -> bool {
        matches!(self, ScreenArea::Lower | ScreenArea::Both)
    }
}

/// What a color command applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorTarget {
    Text,
    Background,
}

impl ColorTarget {
    /// Parse from wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(ColorTarget::Text),
            0x02 => Some(ColorTarget::Background),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            ColorTarget::Text => 0x01,
            ColorTarget::Background => 0x02,
        }
    }
}

/// Color mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorMode {
    #[default]
    Fixed,
    Gradient,
}

impl ColorMode {
    /// Parse from wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(ColorMode::Fixed),
            0x02 => Some(ColorMode::Gradient),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            ColorMode::Fixed => 0x01,
            ColorMode::Gradient => 0x02,
        }
    }
}

/// Direction a gradient palette is spread along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GradientAxis {
    /// Stops change with Y (top to bottom of the glyph line)
    Vertical,
    /// Stops change with X (across the screen width)
    Horizontal,
}

/// Gradient selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gradient {
    /// No gradient; the base color is used
    #[default]
    Fixed,
    /// Red → violet rainbow, top to bottom
    Vertical1,
    /// Bright rainbow, top to bottom
    Vertical2,
    /// Violet → red rainbow, top to bottom
    Vertical3,
    /// Flame, left to right
    Horizontal1,
    /// Neon, left to right
    Horizontal2,
    /// Forest, left to right
    Horizontal3,
}

impl Gradient {
    /// Parse from wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Gradient::Fixed),
            0x01 => Some(Gradient::Vertical1),
            0x02 => Some(Gradient::Vertical2),
            0x03 => Some(Gradient::Vertical3),
            0x04 => Some(Gradient::Horizontal1),
            0x05 => Some(Gradient::Horizontal2),
            0x06 => Some(Gradient::Horizontal3),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            Gradient::Fixed => 0x00,
            Gradient::Vertical1 => 0x01,
            Gradient::Vertical2 => 0x02,
            Gradient::Vertical3 => 0x03,
            Gradient::Horizontal1 => 0x04,
            Gradient::Horizontal2 => 0x05,
            Gradient::Horizontal3 => 0x06,
        }
    }

    /// Palette table index (0-5), `None` for [`Gradient::Fixed`]
    pub fn palette_index(self) -> Option<usize> {
        match self {
            Gradient::Fixed => None,
            other => Some(usize::from(other.to_byte()) - 1),
        }
    }

    /// Axis the palette runs along, `None` for [`Gradient::Fixed`]
    pub fn axis(self) -> Option<GradientAxis> {
        match self {
            Gradient::Fixed => None,
            Gradient::Vertical1 | Gradient::Vertical2 | Gradient::Vertical3 => {
                Some(GradientAxis::Vertical)
            }
            Gradient::Horizontal1 | Gradient::Horizontal2 | Gradient::Horizontal3 => {
                Some(GradientAxis::Horizontal)
            }
        }
    }
}

/// Effect type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EffectKind {
    /// Static display; clears any running effect
    Fixed,
    /// Text enters from the right and moves left
    ScrollLeft,
    /// Text enters from the left and moves right
    ScrollRight,
    /// Visibility toggles
    Blink,
    /// Text color pulses
    Breathe,
    /// Scroll-left counterpart for vertical orientation
    ScrollUp,
    /// Scroll-right counterpart for vertical orientation
    ScrollDown,
}

impl EffectKind {
    /// Parse from wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(EffectKind::Fixed),
            0x01 => Some(EffectKind::ScrollLeft),
            0x02 => Some(EffectKind::ScrollRight),
            0x03 => Some(EffectKind::Blink),
            0x04 => Some(EffectKind::Breathe),
            0x07 => Some(EffectKind::ScrollUp),
            0x08 => Some(EffectKind::ScrollDown),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            EffectKind::Fixed => 0x00,
            EffectKind::ScrollLeft => 0x01,
            EffectKind::ScrollRight => 0x02,
            EffectKind::Blink => 0x03,
            EffectKind::Breathe => 0x04,
            EffectKind::ScrollUp => 0x07,
            EffectKind::ScrollDown => 0x08,
        }
    }

    /// Returns true for the four scroll variants
    pub fn is_scroll(self) -> bool {
        matches!(
            self,
            EffectKind::ScrollLeft
                | EffectKind::ScrollRight
                | EffectKind::ScrollUp
                | EffectKind::ScrollDown
        )
    }
}

/// Decoded set-color payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorCommand {
    pub area: ScreenArea,
    pub target: ColorTarget,
    pub mode: ColorMode,
    pub rgb: [u8; 3],
    pub gradient: Gradient,
}

/// Decoded set-effect payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EffectCommand {
    pub area: ScreenArea,
    pub kind: EffectKind,
    /// Raw speed; nominally 0-10 but passed through unclamped
    pub speed: u8,
}

impl EffectCommand {
    /// Whether the speed is outside the tuned range
    pub fn speed_out_of_range(&self) -> bool {
        self.speed > NOMINAL_MAX_SPEED
    }
}

/// Semantic validation failures for structurally valid frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Payload shorter than the command's fixed layout
    PayloadTooShort { expected: u16, actual: u16 },
    /// Screen area byte not 1, 2 or 3
    InvalidScreenArea(u8),
    /// Color target byte not 1 or 2
    InvalidColorTarget(u8),
    /// Color mode byte not 1 or 2
    InvalidColorMode(u8),
    /// Gradient selector above 6
    InvalidGradient(u8),
    /// Backgrounds only support fixed colors
    GradientBackground,
    /// Unknown effect type byte
    InvalidEffect(u8),
    /// Text payload did not contain a single whole glyph
    EmptyGlyphData,
}

/// A decoded command
#[derive(Debug, Clone, Copy)]
pub enum Command<'a> {
    SetOrientation(Orientation),
    SetFontSize(FontSize),
    SetText(GlyphPayload<'a>),
    /// Reserved; accepted and ignored
    SetAnimation,
    SetColor(ColorCommand),
    SetBrightness(u8),
    SetEffect(EffectCommand),
}

fn require_len(frame: &Frame, expected: usize) -> Result<(), CommandError> {
    if frame.payload.len() < expected {
        return Err(CommandError::PayloadTooShort {
            expected: expected as u16,
            actual: frame.length(),
        });
    }
    Ok(())
}

impl<'a> Command<'a> {
    /// Decode a frame
    ///
    /// Glyph payloads are sliced according to `font`, the font size active
    /// when the frame is dispatched.
    pub fn from_frame(frame: &'a Frame, font: FontSize) -> Result<Self, CommandError> {
        match frame.command {
            CommandCode::SetHorizontal => Ok(Command::SetOrientation(Orientation::Horizontal)),
            CommandCode::SetVertical => Ok(Command::SetOrientation(Orientation::Vertical)),
            CommandCode::SetFont16 => Ok(Command::SetFontSize(FontSize::Size16)),
            CommandCode::SetFont32 => Ok(Command::SetFontSize(FontSize::Size32)),
            CommandCode::SetText => {
                Ok(Command::SetText(frame.glyph_payload(font)?))
            }
            CommandCode::SetAnimation => Ok(Command::SetAnimation),
            CommandCode::SetColor => {
                require_len(frame, COLOR_PAYLOAD_LEN)?;
                let p = &frame.payload;
                let area =
                    ScreenArea::from_byte(p[0]).ok_or(CommandError::InvalidScreenArea(p[0]))?;
                let target =
                    ColorTarget::from_byte(p[1]).ok_or(CommandError::InvalidColorTarget(p[1]))?;
                let mode = ColorMode::from_byte(p[2]).ok_or(CommandError::InvalidColorMode(p[2]))?;
                let gradient =
                    Gradient::from_byte(p[6]).ok_or(CommandError::InvalidGradient(p[6]))?;
                Ok(Command::SetColor(ColorCommand {
                    area,
                    target,
                    mode,
                    rgb: [p[3], p[4], p[5]],
                    gradient,
                }))
            }
            CommandCode::SetBrightness => {
                require_len(frame, BRIGHTNESS_PAYLOAD_LEN)?;
                Ok(Command::SetBrightness(frame.payload[0]))
            }
            CommandCode::SetEffect => {
                require_len(frame, EFFECT_PAYLOAD_LEN)?;
                let p = &frame.payload;
                let area =
                    ScreenArea::from_byte(p[0]).ok_or(CommandError::InvalidScreenArea(p[0]))?;
                let kind = EffectKind::from_byte(p[1]).ok_or(CommandError::InvalidEffect(p[1]))?;
                Ok(Command::SetEffect(EffectCommand {
                    area,
                    kind,
                    speed: p[2],
                }))
            }
        }
    }
}
