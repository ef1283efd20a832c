//! Animated text effects
//!
//! Each text slot runs at most one effect. The timing formulas take the raw
//! wire speed (nominally 0-10) and saturate instead of wrapping, so speeds
//! above the nominal range simply advance on every tick.

use core::f32::consts::TAU;

use marquee_protocol::EffectKind;

/// Scroll interval in milliseconds for a speed
pub fn scroll_interval_ms(speed: u8) -> u32 {
    100u32.saturating_sub(u32::from(speed) * 8)
}

/// Pixels advanced per scroll step
pub fn scroll_step(speed: u8) -> i32 {
    i32::from(speed / 2) + 1
}

/// Blink half-period in milliseconds for a speed
pub fn blink_interval_ms(speed: u8) -> u32 {
    1000u32.saturating_sub(u32::from(speed) * 80)
}

/// Breathe phase increment per tick, in radians
pub fn breathe_increment(speed: u8) -> f32 {
    (f32::from(speed) + 1.0) * 0.08
}

/// Scroll progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScrollState {
    /// One of the four scroll kinds
    pub kind: EffectKind,
    pub speed: u8,
    /// Pixels travelled since the text last entered
    pub offset: i32,
    pub last_step_ms: u32,
}

impl ScrollState {
    /// Whether text enters from the right edge
    pub fn enters_from_right(&self) -> bool {
        matches!(self.kind, EffectKind::ScrollLeft | EffectKind::ScrollUp)
    }

    /// Left edge of the text for the current offset
    pub fn position(&self, screen_width: i32, text_width: i32) -> i32 {
        if self.enters_from_right() {
            screen_width - self.offset
        } else {
            self.offset - text_width
        }
    }

    /// Move one step, restarting once the text has fully left the screen
    pub fn advance(&mut self, screen_width: i32, text_width: i32) {
        self.offset += scroll_step(self.speed);
        if self.offset >= screen_width + text_width {
            self.offset = 0;
        }
    }
}

/// Blink visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlinkState {
    pub speed: u8,
    pub visible: bool,
    pub last_toggle_ms: u32,
}

/// Breathe phase
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BreatheState {
    pub speed: u8,
    /// Radians in `[0, 2π)`
    pub phase: f32,
}

impl BreatheState {
    /// Advance one tick, wrapping at 2π
    ///
    /// Steps wider than 2π (speeds above 77) still land inside the range.
    pub fn advance(&mut self) {
        self.phase = (self.phase + breathe_increment(self.speed)) % TAU;
    }

    /// Brightness factor in `[0.2, 1.0]`
    pub fn multiplier(&self) -> f32 {
        let sin = micromath::F32(self.phase).sin().0;
        0.2 + 0.8 * (sin + 1.0) / 2.0
    }
}

/// Active effect for a text slot
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Effect {
    #[default]
    None,
    Scroll(ScrollState),
    Blink(BlinkState),
    Breathe(BreatheState),
}

impl Effect {
    /// Fresh effect state for `kind`, timed from `now_ms`
    pub fn start(kind: EffectKind, speed: u8, now_ms: u32) -> Self {
        match kind {
            EffectKind::Fixed => Effect::None,
            EffectKind::ScrollLeft
            | EffectKind::ScrollRight
            | EffectKind::ScrollUp
            | EffectKind::ScrollDown => Effect::Scroll(ScrollState {
                kind,
                speed,
                offset: 0,
                last_step_ms: now_ms,
            }),
            EffectKind::Blink => Effect::Blink(BlinkState {
                speed,
                visible: true,
                last_toggle_ms: now_ms,
            }),
            EffectKind::Breathe => Effect::Breathe(BreatheState { speed, phase: 0.0 }),
        }
    }

    /// Wire kind of the active effect
    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::None => EffectKind::Fixed,
            Effect::Scroll(scroll) => scroll.kind,
            Effect::Blink(_) => EffectKind::Blink,
            Effect::Breathe(_) => EffectKind::Breathe,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Effect::None)
    }

    pub fn is_scrolling(&self) -> bool {
        matches!(self, Effect::Scroll(_))
    }

    /// Whether a blink currently hides the text
    pub fn hides_text(&self) -> bool {
        matches!(self, Effect::Blink(blink) if !blink.visible)
    }

    pub fn scroll(&self) -> Option<&ScrollState> {
        match self {
            Effect::Scroll(scroll) => Some(scroll),
            _ => None,
        }
    }

    /// Brightness factor while breathing
    pub fn breathe_multiplier(&self) -> Option<f32> {
        match self {
            Effect::Breathe(breathe) => Some(breathe.multiplier()),
            _ => None,
        }
    }
}
