//! Effect scheduler
//!
//! Advances time-driven state once per loop iteration: scroll offsets,
//! blink visibility, the shared breathe phase tick, and text paging. Each
//! effect keeps its own timestamp, so a slow loop catches up by at most one
//! step per iteration rather than bursting.

use marquee_protocol::clock::elapsed_ms;
use marquee_protocol::FontSize;

use crate::config::MatrixConfig;
use crate::gradient::Region;
use crate::state::effect::{blink_interval_ms, scroll_interval_ms};
use crate::state::{DisplayState, Effect, Half};

/// What a tick changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutcome {
    /// An effect advanced
    pub effects: bool,
    /// A text group advanced
    pub paged: bool,
}

impl TickOutcome {
    pub fn any(&self) -> bool {
        self.effects || self.paged
    }
}

/// Time-driven state updates
#[derive(Debug, Clone)]
pub struct EffectScheduler {
    screen_width: i32,
    page_interval_ms: u32,
    breathe_tick_ms: u32,
    chars_per_line_16: usize,
    chars_per_line_32: usize,
    last_breathe_ms: u32,
}

impl EffectScheduler {
    pub fn new(config: &MatrixConfig) -> Self {
        Self {
            screen_width: i32::from(config.panel.width),
            page_interval_ms: config.text.page_interval_ms,
            breathe_tick_ms: config.effects.breathe_tick_ms,
            chars_per_line_16: config.chars_per_line(FontSize::Size16),
            chars_per_line_32: config.chars_per_line(FontSize::Size32),
            last_breathe_ms: 0,
        }
    }

    /// Advance everything that is due at `now_ms`
    ///
    /// Sets the effect dirty flag if an effect moved and the text dirty flag
    /// if a group changed.
    pub fn tick(&mut self, state: &mut DisplayState, now_ms: u32) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        for half in Half::ALL {
            let text_width = text_width(state, half);
            let screen_width = self.screen_width;
            match &mut state.half_mut(half).effect {
                Effect::Scroll(scroll) => {
                    if elapsed_ms(now_ms, scroll.last_step_ms) >= scroll_interval_ms(scroll.speed) {
                        scroll.advance(screen_width, text_width);
                        scroll.last_step_ms = now_ms;
                        outcome.effects = true;
                    }
                }
                Effect::Blink(blink) => {
                    if elapsed_ms(now_ms, blink.last_toggle_ms) >= blink_interval_ms(blink.speed) {
                        blink.visible = !blink.visible;
                        blink.last_toggle_ms = now_ms;
                        outcome.effects = true;
                    }
                }
                Effect::Breathe(_) | Effect::None => {}
            }
        }

        if elapsed_ms(now_ms, self.last_breathe_ms) >= self.breathe_tick_ms {
            let mut breathed = false;
            for half in Half::ALL {
                if let Effect::Breathe(breathe) = &mut state.half_mut(half).effect {
                    breathe.advance();
                    breathed = true;
                }
            }
            if breathed {
                self.last_breathe_ms = now_ms;
                outcome.effects = true;
            }
        }

        outcome.paged = self.page(state, now_ms);

        if outcome.effects {
            state.dirty.effect = true;
        }
        if outcome.paged {
            state.dirty.text = true;
        }
        outcome
    }

    /// Move to the next character group where text overflows its line
    ///
    /// Scrolling text is never paged. Returns whether anything moved.
    fn page(&self, state: &mut DisplayState, now_ms: u32) -> bool {
        if elapsed_ms(now_ms, state.last_page_ms) < self.page_interval_ms {
            return false;
        }

        let mut paged = false;
        match state.font {
            FontSize::Size32 => {
                let count = state.glyphs(Region::Full).1;
                let scrolling = state.upper.effect.is_scrolling();
                paged = advance_group(&mut state.upper.group, count, self.chars_per_line_32, scrolling);
            }
            FontSize::Size16 => {
                for half in Half::ALL {
                    let count = state.glyphs(half.into()).1;
                    let slot = state.half_mut(half);
                    let scrolling = slot.effect.is_scrolling();
                    paged |= advance_group(&mut slot.group, count, self.chars_per_line_16, scrolling);
                }
            }
        }

        if paged {
            trace!("Paged text groups at {}", now_ms);
            state.last_page_ms = now_ms;
        }
        paged
    }
}

fn advance_group(group: &mut usize, count: usize, per_line: usize, scrolling: bool) -> bool {
    if scrolling || per_line == 0 || count <= per_line {
        return false;
    }
    *group = (*group + 1) % count.div_ceil(per_line);
    true
}

/// Pixel width of the text a half scrolls
///
/// In 32×32 mode the upper half's effect drives the full-screen line.
pub(crate) fn text_width(state: &DisplayState, half: Half) -> i32 {
    let region = match (state.font, half) {
        (FontSize::Size32, Half::Upper) => Region::Full,
        _ => half.into(),
    };
    let count = state.glyphs(region).1;
    (count as i32).saturating_mul(i32::from(region.font().spacing()))
}
