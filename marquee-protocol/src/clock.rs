//! Millisecond time source

/// Monotonic millisecond clock
///
/// The counter is free-running and wraps at `u32::MAX`; callers compare
/// timestamps with `wrapping_sub` so a wrap never looks like a timeout.
pub trait Clock {
    /// Current time in milliseconds
    fn now_ms(&self) -> u32;
}

impl<F> Clock for F
where
    F: Fn() -> u32,
{
    fn now_ms(&self) -> u32 {
        self()
    }
}

/// Milliseconds elapsed from `since` to `now`, tolerant of counter wrap
#[inline]
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}
