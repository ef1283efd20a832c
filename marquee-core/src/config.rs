//! Controller configuration
//!
//! Defaults reproduce the reference 64×32 panel. With the `toml` feature a
//! configuration can be loaded from a TOML document where every key is
//! optional:
//!
//! ```toml
//! [panel]
//! width = 128
//! initial_brightness = 64
//!
//! [text]
//! page_interval_ms = 3000
//! ```

use marquee_protocol::{FontSize, FRAME_TIMEOUT_MS, TIMEOUT_CHECK_INTERVAL};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest number of bytes pulled from the transport per read
pub const MAX_READ_CHUNK: usize = 256;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Width or height is zero
    ZeroDimension,
    /// Height must split into two equal halves
    OddHeight,
    /// Timeout check interval is zero
    ZeroCheckInterval,
    /// Characters per line is zero
    ZeroCharsPerLine,
    /// Read chunk is zero or above [`MAX_READ_CHUNK`]
    InvalidReadChunk,
    /// Panel sink reports a different size than configured
    SinkMismatch,
    /// TOML document could not be parsed
    TomlParse,
}

/// Physical panel parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct PanelConfig {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels (upper and lower halves each get half)
    pub height: u16,
    /// Brightness applied at startup (0-255)
    pub initial_brightness: u8,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 32,
            initial_brightness: 128,
        }
    }
}

/// Frame parser parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ProtocolConfig {
    /// A frame still open after this long is abandoned
    pub frame_timeout_ms: u32,
    /// Bytes between timeout checks
    pub timeout_check_interval: u16,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            frame_timeout_ms: FRAME_TIMEOUT_MS,
            timeout_check_interval: TIMEOUT_CHECK_INTERVAL,
        }
    }
}

/// Text layout parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct TextConfig {
    /// Time each group of characters stays on screen
    pub page_interval_ms: u32,
    /// Characters per half-screen line with 16×16 glyphs
    pub chars_per_line_16: u16,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            page_interval_ms: 2000,
            chars_per_line_16: 4,
        }
    }
}

/// Effect timing parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct EffectsConfig {
    /// Breathe phase update period, shared by both halves
    pub breathe_tick_ms: u32,
    /// Speeds above this are applied but logged as out of range
    pub speed_warn_above: u8,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            breathe_tick_ms: 30,
            speed_warn_above: 10,
        }
    }
}

/// Transport parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct TransportConfig {
    /// Bytes requested per non-blocking read
    pub read_chunk: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { read_chunk: 64 }
    }
}

/// Complete controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct MatrixConfig {
    pub panel: PanelConfig,
    pub protocol: ProtocolConfig,
    pub text: TextConfig,
    pub effects: EffectsConfig,
    pub transport: TransportConfig,
}

impl MatrixConfig {
    /// Check that the values describe a usable controller
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.panel.width == 0 || self.panel.height == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if self.panel.height % 2 != 0 {
            return Err(ConfigError::OddHeight);
        }
        if self.protocol.timeout_check_interval == 0 {
            return Err(ConfigError::ZeroCheckInterval);
        }
        if self.text.chars_per_line_16 == 0 {
            return Err(ConfigError::ZeroCharsPerLine);
        }
        if self.transport.read_chunk == 0 || self.transport.read_chunk > MAX_READ_CHUNK {
            return Err(ConfigError::InvalidReadChunk);
        }
        Ok(())
    }

    /// Height of one half-screen band
    pub fn half_height(&self) -> u16 {
        self.panel.height / 2
    }

    /// Characters shown per line before paging kicks in
    ///
    /// 32×32 text always fills the panel width; a panel narrower than one
    /// glyph still shows one character.
    pub fn chars_per_line(&self, font: FontSize) -> usize {
        match font {
            FontSize::Size16 => usize::from(self.text.chars_per_line_16),
            FontSize::Size32 => usize::from(self.panel.width / FontSize::Size32.spacing()).max(1),
        }
    }

    /// Parse a TOML document; missing keys keep their defaults
    #[cfg(feature = "toml")]
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: MatrixConfig = toml::from_str(input).map_err(|_| {
            warn!("TOML parse error");
            ConfigError::TomlParse
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_panel() {
        let config = MatrixConfig::default();
        assert_eq!(config.panel.width, 64);
        assert_eq!(config.panel.height, 32);
        assert_eq!(config.panel.initial_brightness, 128);
        assert_eq!(config.protocol.frame_timeout_ms, 5000);
        assert_eq!(config.protocol.timeout_check_interval, 100);
        assert_eq!(config.text.page_interval_ms, 2000);
        assert_eq!(config.effects.breathe_tick_ms, 30);
        assert_eq!(config.half_height(), 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_chars_per_line() {
        let config = MatrixConfig::default();
        assert_eq!(config.chars_per_line(FontSize::Size16), 4);
        assert_eq!(config.chars_per_line(FontSize::Size32), 2);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = MatrixConfig::default();
        config.panel.height = 31;
        assert_eq!(config.validate(), Err(ConfigError::OddHeight));

        let mut config = MatrixConfig::default();
        config.panel.width = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroDimension));

        let mut config = MatrixConfig::default();
        config.protocol.timeout_check_interval = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroCheckInterval));

        let mut config = MatrixConfig::default();
        config.transport.read_chunk = MAX_READ_CHUNK + 1;
        assert_eq!(config.validate(), Err(ConfigError::InvalidReadChunk));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_partial_document() {
        let config = MatrixConfig::from_toml_str(
            r#"
            [panel]
            width = 128
            initial_brightness = 40

            [effects]
            breathe_tick_ms = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.panel.width, 128);
        assert_eq!(config.panel.height, 32);
        assert_eq!(config.panel.initial_brightness, 40);
        assert_eq!(config.effects.breathe_tick_ms, 20);
        assert_eq!(config.text, TextConfig::default());
        assert_eq!(config.chars_per_line(FontSize::Size32), 4);
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_empty_document_is_default() {
        assert_eq!(
            MatrixConfig::from_toml_str("").unwrap(),
            MatrixConfig::default()
        );
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_errors() {
        assert_eq!(
            MatrixConfig::from_toml_str("[panel]\nwidth = \"wide\""),
            Err(ConfigError::TomlParse)
        );
        assert_eq!(
            MatrixConfig::from_toml_str("[panel]\nheight = 33"),
            Err(ConfigError::OddHeight)
        );
        assert_eq!(
            MatrixConfig::from_toml_str("[panle]\nwidth = 32"),
            Err(ConfigError::TomlParse)
        );
    }
}
