//! Board-agnostic core of the Marquee LED matrix controller
//!
//! This crate contains everything between the byte stream and the pixels
//! that does not depend on a specific panel or transport:
//!
//! - Gradient palettes and per-pixel color lookup
//! - Glyph rasterization (16×16 and 32×32, normal and rotated)
//! - Display state: text buffers, colors, effects, dirty tracking
//! - Command dispatch with semantic validation
//! - Effect scheduling (scroll, blink, breathe) and text paging
//! - The cooperative controller loop tying it all together
//! - Configuration types

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

// Must come first so the logging macros are visible to every module
mod fmt;

pub mod config;
pub mod controller;
pub mod dispatch;
pub mod font;
pub mod glyph;
pub mod gradient;
pub mod render;
pub mod scheduler;
pub mod state;

pub use config::{ConfigError, MatrixConfig};
pub use controller::{Controller, PollSummary};
pub use dispatch::{CommandDispatcher, DispatchError};
pub use gradient::{GradientEngine, Region};
pub use state::{DirtyFlags, DisplayState, Half};
