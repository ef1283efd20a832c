//! Marquee serial command protocol
//!
//! This crate defines the byte-stream protocol a host (phone app, PC tool)
//! uses to drive the LED matrix over a serial transport. The protocol is a
//! simple framed binary format with a fixed header and tail so the receiver
//! can resynchronise after line noise.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌───────┬───────┬─────┬────────┬────────┬──────────────┬──────┬──────┐
//! │ 0xAA  │ 0x55  │ CMD │ LEN_HI │ LEN_LO │ PAYLOAD      │ 0x0D │ 0x0A │
//! │ 1B    │ 1B    │ 1B  │ 1B     │ 1B     │ 0–8192B      │ 1B   │ 1B   │
//! └───────┴───────┴─────┴────────┴────────┴──────────────┴──────┴──────┘
//! ```
//!
//! Frames are parsed one byte at a time by [`FrameParser`]; complete frames
//! are decoded into typed [`Command`]s at the edge, so the rest of the system
//! never sees raw wire values.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod clock;
pub mod command;
pub mod frame;
pub mod glyph;

pub use clock::Clock;
pub use command::{
    ColorCommand, ColorMode, ColorTarget, Command, CommandCode, CommandError, EffectCommand,
    EffectKind, FontSize, Gradient, GradientAxis, Orientation, ScreenArea,
};
pub use frame::{
    BatchOutcome, EncodeError, Frame, FrameError, FrameParser, ParseResult, ParserState,
    FRAME_HEADER, FRAME_TAIL, FRAME_TIMEOUT_MS, MAX_DATA_LENGTH, TIMEOUT_CHECK_INTERVAL,
};
pub use glyph::GlyphPayload;
