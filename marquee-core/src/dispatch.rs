//! Command dispatch
//!
//! Turns complete frames into display state changes. Frames are decoded
//! into typed commands first; anything out of range is rejected before
//! state is touched, so a rejected frame leaves no trace besides a log line.

use alloc::collections::TryReserveError;
use alloc::vec::Vec;

use marquee_display::{DisplayError, PanelSink};
use marquee_protocol::{
    ColorCommand, ColorMode, ColorTarget, Command, CommandError, EffectCommand, FontSize, Frame,
    Gradient, GlyphPayload, ScreenArea,
};

use crate::config::MatrixConfig;
use crate::gradient::Region;
use crate::state::{DisplayState, Effect, Half};

/// Reasons a frame was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// Payload failed semantic validation
    Command(CommandError),
    /// Sink rejected a brightness write
    Display(DisplayError),
}

impl From<CommandError> for DispatchError {
    fn from(e: CommandError) -> Self {
        DispatchError::Command(e)
    }
}

impl From<DisplayError> for DispatchError {
    fn from(e: DisplayError) -> Self {
        DispatchError::Display(e)
    }
}

/// Applies commands to a [`DisplayState`]
#[derive(Debug, Clone, Copy)]
pub struct CommandDispatcher {
    speed_warn_above: u8,
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new(&MatrixConfig::default())
    }
}

impl CommandDispatcher {
    pub fn new(config: &MatrixConfig) -> Self {
        Self {
            speed_warn_above: config.effects.speed_warn_above,
        }
    }

    /// Decode and apply one frame
    ///
    /// Brightness is written to `sink` immediately. Everything else only
    /// changes `state` and its dirty flags.
    pub fn dispatch<S: PanelSink + ?Sized>(
        &self,
        state: &mut DisplayState,
        frame: &Frame,
        sink: &mut S,
        now_ms: u32,
    ) -> Result<(), DispatchError> {
        let command = match Command::from_frame(frame, state.font) {
            Ok(command) => command,
            Err(e) => {
                warn!("Rejected {:?} frame: {:?}", frame.command, e);
                return Err(e.into());
            }
        };
        debug!(
            "Dispatching {:?} ({} payload bytes)",
            frame.command,
            frame.payload.len()
        );
        self.apply(state, command, sink, now_ms)
    }

    /// Apply an already decoded command
    pub fn apply<S: PanelSink + ?Sized>(
        &self,
        state: &mut DisplayState,
        command: Command<'_>,
        sink: &mut S,
        now_ms: u32,
    ) -> Result<(), DispatchError> {
        match command {
            Command::SetOrientation(orientation) => {
                state.orientation = orientation;
                state.dirty.text = true;
            }
            Command::SetFontSize(font) => {
                state.font = font;
                state.dirty.text = true;
            }
            Command::SetText(payload) => self.set_text(state, payload, now_ms),
            Command::SetAnimation => {
                debug!("Set-animation is reserved, ignoring");
            }
            Command::SetColor(color) => self.set_color(state, &color)?,
            Command::SetBrightness(level) => {
                sink.set_brightness(level)?;
                state.brightness = level;
                state.dirty.brightness = true;
            }
            Command::SetEffect(effect) => self.set_effect(state, &effect, now_ms),
        }
        Ok(())
    }

    fn set_text(&self, state: &mut DisplayState, payload: GlyphPayload<'_>, now_ms: u32) {
        match (payload.font, payload.area) {
            // Large text always fills the screen
            (FontSize::Size32, _) => store_text(state, Region::Full, payload.words(), now_ms),
            (FontSize::Size16, ScreenArea::Upper) => {
                store_text(state, Region::Upper, payload.words(), now_ms)
            }
            (FontSize::Size16, ScreenArea::Lower) => {
                store_text(state, Region::Lower, payload.words(), now_ms)
            }
            (FontSize::Size16, ScreenArea::Both) => {
                let (upper, lower) = payload.split_at(payload.char_count() / 2);
                store_text(state, Region::Upper, upper, now_ms);
                store_text(state, Region::Lower, lower, now_ms);
            }
        }
        debug!(
            "Text: {} glyphs for {:?}",
            payload.char_count(),
            payload.area
        );
    }

    fn set_color(
        &self,
        state: &mut DisplayState,
        color: &ColorCommand,
    ) -> Result<(), CommandError> {
        if color.target == ColorTarget::Background && color.mode == ColorMode::Gradient {
            warn!("Rejected color: backgrounds cannot use a gradient");
            return Err(CommandError::GradientBackground);
        }

        let cancel = color.target == ColorTarget::Text
            && color.mode == ColorMode::Gradient
            && color.gradient == Gradient::Fixed;

        let area = color.area;
        let targets = [
            (area.includes_upper(), &mut state.upper.color),
            (area.includes_lower(), &mut state.lower.color),
            (area == ScreenArea::Both, &mut state.full_color),
        ];
        for (selected, config) in targets {
            if !selected {
                continue;
            }
            if cancel {
                config.cancel_gradient();
            } else {
                config.apply(color);
            }
        }

        if cancel {
            info!("Gradient cancelled for {:?}", area);
        } else {
            debug!(
                "Color {:?} {:?} {:?} rgb={} gradient={:?}",
                area, color.target, color.mode, color.rgb, color.gradient
            );
        }
        state.dirty.color = true;
        Ok(())
    }

    fn set_effect(&self, state: &mut DisplayState, effect: &EffectCommand, now_ms: u32) {
        if effect.speed > self.speed_warn_above {
            warn!(
                "Effect speed {} above {}, applying anyway",
                effect.speed, self.speed_warn_above
            );
        }
        for half in Half::ALL {
            let selected = match half {
                Half::Upper => effect.area.includes_upper(),
                Half::Lower => effect.area.includes_lower(),
            };
            if selected {
                state.set_effect(half, Effect::start(effect.kind, effect.speed, now_ms));
            }
        }
        info!(
            "Effect {:?} on {:?} at speed {}",
            effect.kind, effect.area, effect.speed
        );
    }
}

fn store_text(state: &mut DisplayState, region: Region, words: &[u16], now_ms: u32) {
    store_text_with(state, region, words, now_ms, Vec::try_reserve_exact);
}

fn store_text_with<R>(
    state: &mut DisplayState,
    region: Region,
    words: &[u16],
    now_ms: u32,
    reserve: R,
) where
    R: FnOnce(&mut Vec<u16>, usize) -> Result<(), TryReserveError>,
{
    if state.set_text_with(region, words, now_ms, reserve).is_err() {
        warn!(
            "Glyph buffer allocation failed for {:?} ({} words), showing default",
            region,
            words.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_display::{FrameBuffer, Rgb565};
    use marquee_protocol::{CommandCode, EffectKind, Orientation};

    type Panel = FrameBuffer<64, 32>;

    fn frame(command: CommandCode, payload: &[u8]) -> Frame {
        Frame::new(command, payload).unwrap()
    }

    fn run(state: &mut DisplayState, frame: &Frame) -> Result<(), DispatchError> {
        let mut panel = Panel::new();
        CommandDispatcher::default().dispatch(state, frame, &mut panel, 1000)
    }

    fn text_payload(area: u8, glyphs: usize, bytes_per_glyph: usize) -> alloc::vec::Vec<u8> {
        let mut payload = alloc::vec![area];
        for i in 0..glyphs {
            payload.extend(core::iter::repeat(i as u8 + 1).take(bytes_per_glyph));
        }
        payload
    }

    #[test]
    fn test_orientation_and_font() {
        let mut state = DisplayState::default();
        run(&mut state, &Frame::empty(CommandCode::SetVertical)).unwrap();
        assert_eq!(state.orientation, Orientation::Vertical);
        assert!(state.dirty.text);

        run(&mut state, &Frame::empty(CommandCode::SetFont32)).unwrap();
        assert_eq!(state.font, FontSize::Size32);
    }

    #[test]
    fn test_brightness_hits_sink_immediately() {
        let mut state = DisplayState::default();
        let mut panel = Panel::new();
        CommandDispatcher::default()
            .dispatch(
                &mut state,
                &frame(CommandCode::SetBrightness, &[0x40]),
                &mut panel,
                0,
            )
            .unwrap();
        assert_eq!(panel.brightness(), Some(0x40));
        assert_eq!(panel.brightness_writes(), 1);
        assert_eq!(state.brightness, 0x40);
        assert!(state.dirty.brightness);
        assert!(!state.dirty.text);
    }

    #[test]
    fn test_text_both_splits_in_half() {
        let mut state = DisplayState::default();
        run(&mut state, &frame(CommandCode::SetText, &text_payload(3, 5, 32))).unwrap();

        let (upper, upper_count) = state.glyphs(Region::Upper);
        let (lower, lower_count) = state.glyphs(Region::Lower);
        assert_eq!(upper_count, 2);
        assert_eq!(lower_count, 3);
        assert_eq!(upper[0], 0x0101);
        assert_eq!(lower[0], 0x0303);
        assert_eq!(state.last_page_ms, 1000);
    }

    #[test]
    fn test_text_both_single_glyph_goes_lower() {
        let mut state = DisplayState::default();
        run(&mut state, &frame(CommandCode::SetText, &text_payload(3, 1, 32))).unwrap();
        assert!(state.upper.text.is_empty());
        assert_eq!(state.glyphs(Region::Upper).1, 6);
        assert_eq!(state.lower.text.char_count(), 1);
    }

    #[test]
    fn test_large_text_fills_full_slot() {
        let mut state = DisplayState::default();
        state.font = FontSize::Size32;
        run(&mut state, &frame(CommandCode::SetText, &text_payload(2, 2, 128))).unwrap();
        assert_eq!(state.full_text.char_count(), 2);
        assert!(state.lower.text.is_empty());
    }

    #[test]
    fn test_text_rejects_bad_area() {
        let mut state = DisplayState::default();
        let result = run(&mut state, &frame(CommandCode::SetText, &text_payload(9, 1, 32)));
        assert_eq!(
            result,
            Err(DispatchError::Command(CommandError::InvalidScreenArea(9)))
        );
        assert!(!state.dirty.any());
    }

    #[test]
    fn test_color_upper_leaves_full() {
        let mut state = DisplayState::default();
        run(
            &mut state,
            &frame(CommandCode::SetColor, &[1, 1, 1, 255, 0, 0, 0]),
        )
        .unwrap();
        assert_eq!(state.upper.color.text, Rgb565::RED);
        assert_eq!(state.lower.color.text, Rgb565::WHITE);
        assert_eq!(state.full_color.text, Rgb565::WHITE);
        assert!(state.dirty.color);
    }

    #[test]
    fn test_color_both_sets_all_slots() {
        let mut state = DisplayState::default();
        run(
            &mut state,
            &frame(CommandCode::SetColor, &[3, 2, 1, 0, 0, 255, 0]),
        )
        .unwrap();
        assert_eq!(state.upper.color.background, Rgb565::BLUE);
        assert_eq!(state.lower.color.background, Rgb565::BLUE);
        assert_eq!(state.full_color.background, Rgb565::BLUE);
    }

    #[test]
    fn test_gradient_background_rejected() {
        let mut state = DisplayState::default();
        let before = state.upper.color;
        let result = run(
            &mut state,
            &frame(CommandCode::SetColor, &[1, 2, 2, 255, 0, 0, 1]),
        );
        assert_eq!(
            result,
            Err(DispatchError::Command(CommandError::GradientBackground))
        );
        assert_eq!(state.upper.color, before);
        assert!(!state.dirty.any());
    }

    #[test]
    fn test_gradient_cancel() {
        let mut state = DisplayState::default();
        run(
            &mut state,
            &frame(CommandCode::SetColor, &[3, 1, 1, 0, 255, 0, 0]),
        )
        .unwrap();
        run(
            &mut state,
            &frame(CommandCode::SetColor, &[2, 1, 2, 9, 9, 9, 4]),
        )
        .unwrap();
        assert!(state.lower.color.uses_gradient());

        // Cancel on the lower half only
        run(
            &mut state,
            &frame(CommandCode::SetColor, &[2, 1, 2, 0, 0, 0, 0]),
        )
        .unwrap();
        assert!(!state.lower.color.uses_gradient());
        assert_eq!(state.lower.color.text, Rgb565::from_rgb888(9, 9, 9));
        assert_eq!(state.upper.color.text, Rgb565::GREEN);
    }

    #[test]
    fn test_effect_exclusive_per_half() {
        let mut state = DisplayState::default();
        run(&mut state, &frame(CommandCode::SetEffect, &[1, 3, 5])).unwrap();
        assert!(matches!(state.upper.effect, Effect::Blink(_)));

        run(&mut state, &frame(CommandCode::SetEffect, &[1, 1, 5])).unwrap();
        assert!(state.upper.effect.is_scrolling());
        assert!(!state.lower.effect.is_active());
        assert!(state.dirty.effect);
    }

    #[test]
    fn test_effect_both_and_fixed() {
        let mut state = DisplayState::default();
        run(&mut state, &frame(CommandCode::SetEffect, &[3, 4, 2])).unwrap();
        assert_eq!(state.upper.effect.kind(), EffectKind::Breathe);
        assert_eq!(state.lower.effect.kind(), EffectKind::Breathe);

        run(&mut state, &frame(CommandCode::SetEffect, &[2, 0, 0])).unwrap();
        assert_eq!(state.upper.effect.kind(), EffectKind::Breathe);
        assert!(!state.lower.effect.is_active());
    }

    #[test]
    fn test_fast_speed_still_applied() {
        let mut state = DisplayState::default();
        run(&mut state, &frame(CommandCode::SetEffect, &[1, 1, 40])).unwrap();
        assert_eq!(state.upper.effect.scroll().unwrap().speed, 40);
    }

    #[test]
    fn test_speed_above_warning_threshold_applies_to_both() {
        let mut config = MatrixConfig::default();
        config.effects.speed_warn_above = 3;
        let dispatcher = CommandDispatcher::new(&config);
        let mut state = DisplayState::default();
        let mut panel = Panel::new();

        dispatcher
            .dispatch(&mut state, &frame(CommandCode::SetEffect, &[3, 3, 200]), &mut panel, 50)
            .unwrap();
        for half in Half::ALL {
            let Effect::Blink(blink) = state.half(half).effect else {
                panic!("blink not applied");
            };
            assert_eq!(blink.speed, 200);
            assert_eq!(blink.last_toggle_ms, 50);
        }
        assert!(state.dirty.effect);
    }

    #[test]
    fn test_text_allocation_failure_shows_default() {
        let mut state = DisplayState::default();
        run(&mut state, &frame(CommandCode::SetText, &text_payload(1, 2, 32))).unwrap();
        assert_eq!(state.glyphs(Region::Upper).1, 2);
        state.dirty.clear();

        store_text_with(
            &mut state,
            Region::Upper,
            &[0xFFFF; 16],
            2000,
            crate::state::text::refuse_allocation,
        );
        let (words, count) = state.glyphs(Region::Upper);
        assert_eq!(count, 6);
        assert_eq!(words, &crate::font::DEFAULT_UPPER[..]);
        assert!(state.upper.text.is_empty());
        assert!(state.dirty.text);
    }

    #[test]
    fn test_unknown_effect_or_gradient_keeps_state() {
        let mut state = DisplayState::default();
        run(&mut state, &frame(CommandCode::SetEffect, &[1, 3, 5])).unwrap();
        state.dirty.clear();
        let color = state.upper.color;

        let result = run(&mut state, &frame(CommandCode::SetEffect, &[1, 6, 5]));
        assert_eq!(
            result,
            Err(DispatchError::Command(CommandError::InvalidEffect(6)))
        );
        let result = run(&mut state, &frame(CommandCode::SetColor, &[1, 1, 2, 0, 0, 0, 7]));
        assert_eq!(
            result,
            Err(DispatchError::Command(CommandError::InvalidGradient(7)))
        );

        assert!(matches!(state.upper.effect, Effect::Blink(_)));
        assert_eq!(state.upper.color, color);
        assert!(!state.dirty.any());
    }

    #[test]
    fn test_animation_is_ignored() {
        let mut state = DisplayState::default();
        run(&mut state, &frame(CommandCode::SetAnimation, &[1, 2, 3])).unwrap();
        assert!(!state.dirty.any());
    }
}
