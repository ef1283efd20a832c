//! Frame encoding and decoding for the Marquee serial protocol.
//!
//! Frame format:
//! - HEADER (2 bytes): 0xAA 0x55 synchronization bytes
//! - CMD (1 byte): command code, 0x00-0x08
//! - LENGTH (2 bytes): big-endian payload length (0-8192)
//! - PAYLOAD (0-8192 bytes): command-specific data
//! - TAIL (2 bytes): 0x0D 0x0A

use alloc::vec::Vec;
use core::cell::OnceCell;

use crate::clock::{elapsed_ms, Clock};
use crate::command::CommandCode;

/// Frame synchronization bytes
pub const FRAME_HEADER: [u8; 2] = [0xAA, 0x55];

/// Frame terminator bytes
pub const FRAME_TAIL: [u8; 2] = [0x0D, 0x0A];

/// Maximum payload size in bytes
pub const MAX_DATA_LENGTH: usize = 8192;

/// A frame that has not completed within this window is abandoned
pub const FRAME_TIMEOUT_MS: u32 = 5000;

/// The timeout is only checked once per this many bytes
pub const TIMEOUT_CHECK_INTERVAL: u16 = 100;

/// Bytes of framing around the payload (HEADER + CMD + LENGTH + TAIL)
pub const FRAME_OVERHEAD: usize = 2 + 1 + 2 + 2;

/// Errors that can occur while parsing a byte stream
///
/// Every error resets the parser to [`ParserState::AwaitingHeader1`] and
/// bumps its error counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Second header byte was not 0x55
    BadHeader,
    /// Tail bytes were not 0x0D 0x0A
    BadTail,
    /// Frame did not complete within the timeout window
    Timeout,
    /// Command byte outside the known range
    InvalidCommand,
    /// Declared payload length exceeds [`MAX_DATA_LENGTH`]
    DataTooLong,
}

impl FrameError {
    /// Coarse outcome reported for this error
    pub fn result(self) -> ParseResult {
        match self {
            FrameError::BadHeader | FrameError::BadTail | FrameError::Timeout => {
                ParseResult::FrameError
            }
            FrameError::InvalidCommand => ParseResult::InvalidCommand,
            FrameError::DataTooLong => ParseResult::DataTooLong,
        }
    }
}

/// Outcome of feeding bytes, as reported by the batch entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseResult {
    /// Frame still in progress (or idle)
    NeedMoreData,
    /// A complete frame was produced
    FrameComplete,
    /// Bad header, bad tail or timeout
    FrameError,
    /// Unknown command byte
    InvalidCommand,
    /// Declared length too large
    DataTooLong,
}

/// Errors that can occur while encoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Payload exceeds [`MAX_DATA_LENGTH`]
    PayloadTooLarge,
    /// Output buffer too small
    BufferTooSmall,
}

/// A complete, validated frame
///
/// Frames own their payload. The big-endian word view used by glyph
/// commands is computed on first request and cached for the lifetime of
/// the frame (see [`Frame::glyph_payload`]).
#[derive(Debug, Clone)]
pub struct Frame {
    /// Command code
    pub command: CommandCode,
    /// Payload data
    pub payload: Vec<u8>,
    /// Clock reading when the tail was received (0 for locally built frames)
    pub received_at: u32,
    /// Cached payload words, filled lazily
    pub(crate) words: OnceCell<Vec<u16>>,
}

impl Frame {
    /// Create a new frame with the given command and payload
    pub fn new(command: CommandCode, payload: &[u8]) -> Result<Self, EncodeError> {
        if payload.len() > MAX_DATA_LENGTH {
            return Err(EncodeError::PayloadTooLarge);
        }

        Ok(Self {
            command,
            payload: payload.to_vec(),
            received_at: 0,
            words: OnceCell::new(),
        })
    }

    /// Create a frame with no payload
    pub fn empty(command: CommandCode) -> Self {
        Self {
            command,
            payload: Vec::new(),
            received_at: 0,
            words: OnceCell::new(),
        }
    }

    /// Declared payload length
    pub fn length(&self) -> u16 {
        self.payload.len() as u16
    }

    /// Total encoded size including framing
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, EncodeError> {
        if self.payload.len() > MAX_DATA_LENGTH {
            return Err(EncodeError::PayloadTooLarge);
        }
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(EncodeError::BufferTooSmall);
        }

        let [len_hi, len_lo] = self.length().to_be_bytes();
        let end = 5 + self.payload.len();

        buffer[..2].copy_from_slice(&FRAME_HEADER);
        buffer[2] = self.command.to_byte();
        buffer[3] = len_hi;
        buffer[4] = len_lo;
        buffer[5..end].copy_from_slice(&self.payload);
        buffer[end..end + 2].copy_from_slice(&FRAME_TAIL);

        Ok(frame_len)
    }

    /// Encode this frame into a freshly allocated byte vector
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buffer = alloc::vec![0u8; self.encoded_len()];
        let len = self.encode(&mut buffer)?;
        buffer.truncate(len);
        Ok(buffer)
    }
}

/// Parser state machine position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParserState {
    /// Waiting for 0xAA (noise is ignored here)
    AwaitingHeader1,
    /// Got 0xAA, waiting for 0x55
    AwaitingHeader2,
    /// Waiting for the command byte
    AwaitingCommand,
    /// Waiting for the length high byte
    AwaitingLengthHigh,
    /// Waiting for the length low byte
    AwaitingLengthLow,
    /// Collecting payload bytes
    AwaitingPayload,
    /// Waiting for 0x0D
    AwaitingTail1,
    /// Waiting for 0x0A
    AwaitingTail2,
    /// A frame was just produced; the next byte starts over
    Complete,
}

impl ParserState {
    /// Label for diagnostics
    pub fn name(self) -> &'static str {
        match self {
            ParserState::AwaitingHeader1 => "AWAITING_HEADER1",
            ParserState::AwaitingHeader2 => "AWAITING_HEADER2",
            ParserState::AwaitingCommand => "AWAITING_COMMAND",
            ParserState::AwaitingLengthHigh => "AWAITING_LENGTH_HIGH",
            ParserState::AwaitingLengthLow => "AWAITING_LENGTH_LOW",
            ParserState::AwaitingPayload => "AWAITING_PAYLOAD",
            ParserState::AwaitingTail1 => "AWAITING_TAIL1",
            ParserState::AwaitingTail2 => "AWAITING_TAIL2",
            ParserState::Complete => "COMPLETE",
        }
    }
}

/// Result of feeding a buffer through [`FrameParser::feed_batch`]
#[derive(Debug)]
pub struct BatchOutcome<const N: usize> {
    /// Frames completed, in arrival order
    pub frames: heapless::Vec<Frame, N>,
    /// Outcome of the last byte processed
    pub last: ParseResult,
    /// Number of input bytes consumed (less than the input when `N` frames filled up)
    pub consumed: usize,
}

/// State machine for parsing incoming frames
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParserState,
    command: CommandCode,
    length: u16,
    buffer: heapless::Vec<u8, MAX_DATA_LENGTH>,
    frame_start_ms: u32,
    error_count: u32,
    bytes_since_check: u16,
    timeout_ms: u32,
    check_interval: u16,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser with the standard timeout policy
    pub fn new() -> Self {
        Self::with_timeout(FRAME_TIMEOUT_MS, TIMEOUT_CHECK_INTERVAL)
    }

    /// Create a parser with a custom timeout window and check cadence
    ///
    /// A `check_interval` of 0 is treated as 1 (check on every byte).
    pub fn with_timeout(timeout_ms: u32, check_interval: u16) -> Self {
        Self {
            state: ParserState::AwaitingHeader1,
            command: CommandCode::SetHorizontal,
            length: 0,
            buffer: heapless::Vec::new(),
            frame_start_ms: 0,
            error_count: 0,
            bytes_since_check: 0,
            timeout_ms,
            check_interval: check_interval.max(1),
        }
    }

    /// Reset the parser state
    ///
    /// The error counter is preserved.
    pub fn reset(&mut self) {
        self.state = ParserState::AwaitingHeader1;
        self.command = CommandCode::SetHorizontal;
        self.length = 0;
        self.buffer.clear();
        self.bytes_since_check = 0;
    }

    /// Current state machine position
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Number of framing errors seen since construction
    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    /// True right after a frame was produced, until the next byte arrives
    pub fn is_frame_complete(&self) -> bool {
        self.state == ParserState::Complete
    }

    /// True if a frame is in progress and has been open longer than the timeout
    pub fn is_timed_out<C: Clock + ?Sized>(&self, clock: &C) -> bool {
        self.state != ParserState::AwaitingHeader1
            && elapsed_ms(clock.now_ms(), self.frame_start_ms) > self.timeout_ms
    }

    fn fail(&mut self, error: FrameError) -> FrameError {
        self.error_count = self.error_count.wrapping_add(1);
        self.reset();
        error
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on parse error.
    /// The clock is only read when a frame starts and on the periodic
    /// timeout check.
    pub fn feed<C: Clock + ?Sized>(
        &mut self,
        byte: u8,
        clock: &C,
    ) -> Result<Option<Frame>, FrameError> {
        // A finished frame is left in place until the next byte; start over
        // and treat this byte as the first of a new stream.
        if self.state == ParserState::Complete {
            self.reset();
        }

        self.bytes_since_check += 1;
        if self.bytes_since_check >= self.check_interval {
            self.bytes_since_check = 0;
            if self.is_timed_out(clock) {
                return Err(self.fail(FrameError::Timeout));
            }
        }

        match self.state {
            ParserState::AwaitingHeader1 => {
                if byte == FRAME_HEADER[0] {
                    self.state = ParserState::AwaitingHeader2;
                    self.frame_start_ms = clock.now_ms();
                }
                // Silently ignore anything else while hunting for a header
                Ok(None)
            }
            ParserState::AwaitingHeader2 => {
                if byte != FRAME_HEADER[1] {
                    return Err(self.fail(FrameError::BadHeader));
                }
                self.state = ParserState::AwaitingCommand;
                Ok(None)
            }
            ParserState::AwaitingCommand => match CommandCode::from_byte(byte) {
                Some(command) => {
                    self.command = command;
                    self.state = ParserState::AwaitingLengthHigh;
                    Ok(None)
                }
                None => Err(self.fail(FrameError::InvalidCommand)),
            },
            ParserState::AwaitingLengthHigh => {
                self.length = u16::from(byte) << 8;
                self.state = ParserState::AwaitingLengthLow;
                Ok(None)
            }
            ParserState::AwaitingLengthLow => {
                self.length |= u16::from(byte);
                self.buffer.clear();

                if usize::from(self.length) > MAX_DATA_LENGTH {
                    return Err(self.fail(FrameError::DataTooLong));
                }

                self.state = if self.length == 0 {
                    ParserState::AwaitingTail1
                } else {
                    ParserState::AwaitingPayload
                };
                Ok(None)
            }
            ParserState::AwaitingPayload => {
                if self.buffer.push(byte).is_err() {
                    return Err(self.fail(FrameError::DataTooLong));
                }
                if self.buffer.len() == usize::from(self.length) {
                    self.state = ParserState::AwaitingTail1;
                }
                Ok(None)
            }
            ParserState::AwaitingTail1 => {
                if byte != FRAME_TAIL[0] {
                    return Err(self.fail(FrameError::BadTail));
                }
                self.state = ParserState::AwaitingTail2;
                Ok(None)
            }
            ParserState::AwaitingTail2 => {
                if byte != FRAME_TAIL[1] {
                    return Err(self.fail(FrameError::BadTail));
                }

                let frame = Frame {
                    command: self.command,
                    payload: self.buffer.to_vec(),
                    received_at: clock.now_ms(),
                    words: OnceCell::new(),
                };
                self.state = ParserState::Complete;
                Ok(Some(frame))
            }
            // Handled before the match
            ParserState::Complete => Ok(None),
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes<C: Clock + ?Sized>(
        &mut self,
        bytes: &[u8],
        clock: &C,
    ) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte, clock)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    /// Feed a buffer, collecting up to `N` frames
    ///
    /// Errors do not stop the batch; the parser resets and keeps going. The
    /// returned outcome carries the result of the last byte processed and
    /// how many bytes were consumed, so a caller whose batch filled up can
    /// resume with the remainder.
    pub fn feed_batch<const N: usize, C: Clock + ?Sized>(
        &mut self,
        bytes: &[u8],
        clock: &C,
    ) -> BatchOutcome<N> {
        let mut frames = heapless::Vec::new();
        let mut last = ParseResult::NeedMoreData;
        let mut consumed = 0;

        for &byte in bytes {
            if frames.is_full() {
                break;
            }
            consumed += 1;

            last = match self.feed(byte, clock) {
                Ok(Some(frame)) => {
                    // Capacity checked at the top of the loop
                    let _ = frames.push(frame);
                    self.reset();
                    ParseResult::FrameComplete
                }
                Ok(None) => ParseResult::NeedMoreData,
                Err(e) => e.result(),
            };
        }

        BatchOutcome {
            frames,
            last,
            consumed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    fn at_zero() -> u32 {
        0
    }

    #[test]
    fn test_frame_encode_empty_payload() {
        let frame = Frame::empty(CommandCode::SetFont16);
        let mut buffer = [0u8; 10];
        let len = frame.encode(&mut buffer).unwrap();

        assert_eq!(len, 7);
        assert_eq!(&buffer[..7], &[0xAA, 0x55, 0x02, 0x00, 0x00, 0x0D, 0x0A]);
    }

    #[test]
    fn test_frame_encode_with_payload() {
        let frame = Frame::new(CommandCode::SetBrightness, &[0x80]).unwrap();
        let encoded = frame.encode_to_vec().unwrap();

        assert_eq!(
            encoded.as_slice(),
            &[0xAA, 0x55, 0x07, 0x00, 0x01, 0x80, 0x0D, 0x0A]
        );
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let frame = Frame::new(CommandCode::SetEffect, &[1, 1, 5]).unwrap();
        let mut buffer = [0u8; 9];
        assert_eq!(frame.encode(&mut buffer), Err(EncodeError::BufferTooSmall));
    }

    #[test]
    fn test_payload_too_large() {
        let large_payload = alloc::vec![0u8; MAX_DATA_LENGTH + 1];
        let result = Frame::new(CommandCode::SetText, &large_payload);
        assert!(matches!(result, Err(EncodeError::PayloadTooLarge)));
    }

    #[test]
    fn test_frame_roundtrip() {
        let original = Frame::new(CommandCode::SetColor, &[1, 1, 1, 255, 0, 0, 0]).unwrap();
        let encoded = original.encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&encoded, &at_zero).unwrap().unwrap();

        assert_eq!(parsed.command, original.command);
        assert_eq!(parsed.payload, original.payload);
        assert_eq!(parsed.length(), 7);
        assert!(parser.is_frame_complete());
    }

    #[test]
    fn test_timestamp_taken_at_tail() {
        let now = Cell::new(40u32);
        let clock = || now.get();
        let mut parser = FrameParser::new();

        parser.feed_bytes(&[0xAA, 0x55, 0x02, 0x00, 0x00, 0x0D], &clock).unwrap();
        now.set(75);
        let frame = parser.feed(0x0A, &clock).unwrap().unwrap();
        assert_eq!(frame.received_at, 75);
    }

    #[test]
    fn test_zero_length_skips_payload() {
        let mut parser = FrameParser::new();
        parser.feed_bytes(&[0xAA, 0x55, 0x00, 0x00, 0x00], &at_zero).unwrap();
        assert_eq!(parser.state(), ParserState::AwaitingTail1);
    }

    #[test]
    fn test_bad_header_resets() {
        let mut parser = FrameParser::new();
        assert!(matches!(parser.feed(0xAA, &at_zero), Ok(None)));
        assert_eq!(parser.feed(0x56, &at_zero).unwrap_err(), FrameError::BadHeader);
        assert_eq!(parser.state(), ParserState::AwaitingHeader1);
        assert_eq!(parser.error_count(), 1);
    }

    #[test]
    fn test_bad_tail_resets() {
        let mut parser = FrameParser::new();
        let result = parser.feed_bytes(&[0xAA, 0x55, 0x07, 0x00, 0x01, 0x80, 0x0D, 0x0B], &at_zero);
        assert_eq!(result.unwrap_err(), FrameError::BadTail);
        assert_eq!(parser.state(), ParserState::AwaitingHeader1);

        let result = parser.feed_bytes(&[0xAA, 0x55, 0x07, 0x00, 0x01, 0x80, 0x0A], &at_zero);
        assert_eq!(result.unwrap_err(), FrameError::BadTail);
        assert_eq!(parser.error_count(), 2);
    }

    #[test]
    fn test_invalid_command() {
        let mut parser = FrameParser::new();
        let result = parser.feed_bytes(&[0xAA, 0x55, 0x09], &at_zero);
        assert_eq!(result.unwrap_err(), FrameError::InvalidCommand);
        assert_eq!(FrameError::InvalidCommand.result(), ParseResult::InvalidCommand);
        assert_eq!(parser.state(), ParserState::AwaitingHeader1);
    }

    #[test]
    fn test_data_too_long_before_payload() {
        let mut parser = FrameParser::new();
        // 0x2001 = 8193
        let result = parser.feed_bytes(&[0xAA, 0x55, 0x04, 0x20, 0x01], &at_zero);
        assert_eq!(result.unwrap_err(), FrameError::DataTooLong);
        assert_eq!(parser.state(), ParserState::AwaitingHeader1);
        assert_eq!(parser.error_count(), 1);
    }

    #[test]
    fn test_max_length_accepted() {
        let mut parser = FrameParser::new();
        parser.feed_bytes(&[0xAA, 0x55, 0x04, 0x20, 0x00], &at_zero).unwrap();
        assert_eq!(parser.state(), ParserState::AwaitingPayload);
    }

    #[test]
    fn test_parser_resync_after_garbage() {
        let frame = Frame::new(CommandCode::SetBrightness, &[0x10]).unwrap();
        let encoded = frame.encode_to_vec().unwrap();

        let mut data = alloc::vec![0x00, 0xFF, 0x12, 0x34, 0x0D];
        data.extend_from_slice(&encoded);

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&data, &at_zero).unwrap().unwrap();

        assert_eq!(parsed.command, CommandCode::SetBrightness);
        assert_eq!(parser.error_count(), 0);
    }

    #[test]
    fn test_complete_state_reprocesses_next_byte() {
        let mut parser = FrameParser::new();
        parser
            .feed_bytes(&[0xAA, 0x55, 0x02, 0x00, 0x00, 0x0D, 0x0A], &at_zero)
            .unwrap()
            .unwrap();
        assert_eq!(parser.state(), ParserState::Complete);

        // The byte after a frame is the first byte of the next one
        assert!(parser.feed(0xAA, &at_zero).unwrap().is_none());
        assert_eq!(parser.state(), ParserState::AwaitingHeader2);
    }

    #[test]
    fn test_timeout_detected_on_checked_byte() {
        let now = Cell::new(0u32);
        let clock = || now.get();
        let mut parser = FrameParser::new();

        // Set-text frame declaring 200 payload bytes
        parser.feed_bytes(&[0xAA, 0x55, 0x04, 0x00, 0xC8], &clock).unwrap();
        now.set(FRAME_TIMEOUT_MS + 1);

        // Bytes 6..=99 pass unchecked
        for _ in 0..94 {
            assert!(matches!(parser.feed(0x00, &clock), Ok(None)));
        }
        // Byte 100 triggers the check
        assert_eq!(parser.feed(0x00, &clock).unwrap_err(), FrameError::Timeout);
        assert_eq!(parser.state(), ParserState::AwaitingHeader1);
        assert_eq!(parser.error_count(), 1);
        assert_eq!(FrameError::Timeout.result(), ParseResult::FrameError);
    }

    #[test]
    fn test_no_timeout_when_idle() {
        let now = Cell::new(0u32);
        let clock = || now.get();
        let mut parser = FrameParser::new();

        now.set(60_000);
        for _ in 0..250 {
            assert!(parser.feed(0x00, &clock).unwrap().is_none());
        }
        assert_eq!(parser.error_count(), 0);
        assert!(!parser.is_timed_out(&clock));
    }

    #[test]
    fn test_error_count_monotonic() {
        let mut parser = FrameParser::new();
        for expected in 1..=5 {
            let _ = parser.feed_bytes(&[0xAA, 0x00], &at_zero);
            assert_eq!(parser.error_count(), expected);
        }
        parser.reset();
        assert_eq!(parser.error_count(), 5);
    }

    #[test]
    fn test_batch_collects_frames() {
        let a = Frame::new(CommandCode::SetBrightness, &[1]).unwrap();
        let b = Frame::empty(CommandCode::SetVertical);
        let mut data = a.encode_to_vec().unwrap();
        data.extend_from_slice(&[0xAA, 0x00]); // broken frame between the two
        data.extend_from_slice(&b.encode_to_vec().unwrap());

        let mut parser = FrameParser::new();
        let outcome = parser.feed_batch::<4, _>(&data, &at_zero);

        assert_eq!(outcome.frames.len(), 2);
        assert_eq!(outcome.frames[0].command, CommandCode::SetBrightness);
        assert_eq!(outcome.frames[1].command, CommandCode::SetVertical);
        assert_eq!(outcome.last, ParseResult::FrameComplete);
        assert_eq!(outcome.consumed, data.len());
        assert_eq!(parser.error_count(), 1);
    }

    #[test]
    fn test_batch_stops_when_full() {
        let frame = Frame::empty(CommandCode::SetFont32).encode_to_vec().unwrap();
        let mut data = frame.clone();
        data.extend_from_slice(&frame);

        let mut parser = FrameParser::new();
        let outcome = parser.feed_batch::<1, _>(&data, &at_zero);

        assert_eq!(outcome.frames.len(), 1);
        assert_eq!(outcome.consumed, frame.len());
        assert_eq!(parser.state(), ParserState::AwaitingHeader1);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(ParserState::AwaitingPayload.name(), "AWAITING_PAYLOAD");
        assert_eq!(ParserState::Complete.name(), "COMPLETE");
    }
}
