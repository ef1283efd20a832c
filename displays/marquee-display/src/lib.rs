//! Display sink abstraction for the Marquee LED matrix
//!
//! This crate provides:
//! - `PanelSink` trait for anything that can show RGB565 pixels (HUB75 panels,
//!   simulators, in-memory buffers)
//! - `Rgb565` packed color with the 8-bit to 16-bit conversion the panel uses
//! - `FrameBuffer`, an in-memory sink used by host tests and tools
//! - `DrawTargetPanel`, an adapter onto any `embedded-graphics` draw target
//!
//! # Architecture
//!
//! The renderer in `marquee-core` only ever talks to a `PanelSink`. Panel
//! drivers implement the trait directly, or expose an `embedded-graphics`
//! `DrawTarget` and get wrapped in a `DrawTargetPanel`.

#![no_std]
#![deny(unsafe_code)]

pub mod backend;
pub mod color;
pub mod framebuffer;
pub mod graphics;

// Re-export key types
pub use backend::{DisplayError, PanelSink};
pub use color::Rgb565;
pub use framebuffer::FrameBuffer;
pub use graphics::DrawTargetPanel;
