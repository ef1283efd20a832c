//! Cooperative controller loop
//!
//! One [`Controller::poll`] call is one loop iteration:
//!
//! 1. Drain every byte the source has ready through the frame parser,
//!    dispatching each complete frame as soon as it is parsed
//! 2. Advance effects and paging for the current time
//! 3. Redraw if anything is dirty
//!
//! Nothing blocks and no error ends the loop. Failures are logged and
//! reported in the returned [`PollSummary`].

use embedded_io::{Error as _, ErrorKind, Read, ReadReady};
use marquee_display::{DisplayError, PanelSink};
use marquee_protocol::{Clock, FrameParser};

use crate::config::{ConfigError, MatrixConfig, MAX_READ_CHUNK};
use crate::dispatch::{CommandDispatcher, DispatchError};
use crate::render::Renderer;
use crate::scheduler::EffectScheduler;
use crate::state::DisplayState;

/// What one loop iteration did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollSummary {
    /// Bytes pulled from the source
    pub bytes_read: usize,
    /// Frames applied to the display state
    pub frames_dispatched: u32,
    /// Well-formed frames refused by the dispatcher
    pub frames_rejected: u32,
    /// Framing errors (bad header/tail, timeout, unknown command, too long)
    pub framing_errors: u32,
    /// Whether the panel was repainted
    pub redrawn: bool,
    /// Last transport failure, if reading stopped early
    pub transport_error: Option<ErrorKind>,
    /// Last sink failure
    pub display_error: Option<DisplayError>,
}

/// Owns every piece between the byte source and the panel
pub struct Controller<S, C> {
    config: MatrixConfig,
    parser: FrameParser,
    state: DisplayState,
    dispatcher: CommandDispatcher,
    scheduler: EffectScheduler,
    renderer: Renderer,
    sink: S,
    clock: C,
}

impl<S, C> Controller<S, C>
where
    S: PanelSink,
    C: Clock,
{
    /// Build a controller
    ///
    /// Fails if the configuration is invalid or the sink's size does not
    /// match the configured panel.
    pub fn new(config: MatrixConfig, sink: S, clock: C) -> Result<Self, ConfigError> {
        config.validate()?;
        if sink.dimensions() != (config.panel.width, config.panel.height) {
            warn!(
                "Sink is {}x{}, config expects {}x{}",
                sink.dimensions().0,
                sink.dimensions().1,
                config.panel.width,
                config.panel.height
            );
            return Err(ConfigError::SinkMismatch);
        }

        Ok(Self {
            parser: FrameParser::with_timeout(
                config.protocol.frame_timeout_ms,
                config.protocol.timeout_check_interval,
            ),
            state: DisplayState::new(config.panel.initial_brightness),
            dispatcher: CommandDispatcher::new(&config),
            scheduler: EffectScheduler::new(&config),
            renderer: Renderer::new(&config),
            config,
            sink,
            clock,
        })
    }

    /// Apply the initial brightness and paint the first frame
    pub fn start(&mut self) -> Result<(), DisplayError> {
        let brightness = self.config.panel.initial_brightness;
        info!(
            "Marquee starting: {}x{} panel, brightness {}",
            self.config.panel.width, self.config.panel.height, brightness
        );
        self.sink.set_brightness(brightness)?;
        self.state.brightness = brightness;
        self.state.last_page_ms = self.clock.now_ms();
        self.state.dirty.mark_all();
        self.redraw()
    }

    /// Run one loop iteration against a non-blocking byte source
    pub fn poll<R>(&mut self, source: &mut R) -> PollSummary
    where
        R: Read + ReadReady,
    {
        let mut summary = PollSummary::default();
        let mut buf = [0u8; MAX_READ_CHUNK];
        let chunk = self.config.transport.read_chunk.min(MAX_READ_CHUNK);

        loop {
            match source.read_ready() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    warn!("Transport not readable: {:?}", e.kind());
                    summary.transport_error = Some(e.kind());
                    break;
                }
            }
            match source.read(&mut buf[..chunk]) {
                Ok(0) => break,
                Ok(n) => {
                    trace!("RX: {} bytes", n);
                    summary.bytes_read += n;
                    self.ingest(&buf[..n], &mut summary);
                }
                Err(e) => {
                    warn!("Transport read failed: {:?}", e.kind());
                    summary.transport_error = Some(e.kind());
                    break;
                }
            }
        }

        self.finish_iteration(&mut summary);
        summary
    }

    /// Run one loop iteration over bytes already in memory
    pub fn feed(&mut self, bytes: &[u8]) -> PollSummary {
        let mut summary = PollSummary {
            bytes_read: bytes.len(),
            ..PollSummary::default()
        };
        self.ingest(bytes, &mut summary);
        self.finish_iteration(&mut summary);
        summary
    }

    fn ingest(&mut self, bytes: &[u8], summary: &mut PollSummary) {
        for &byte in bytes {
            match self.parser.feed(byte, &self.clock) {
                Ok(Some(frame)) => {
                    match self.dispatcher.dispatch(
                        &mut self.state,
                        &frame,
                        &mut self.sink,
                        frame.received_at,
                    ) {
                        Ok(()) => summary.frames_dispatched += 1,
                        Err(DispatchError::Command(_)) => summary.frames_rejected += 1,
                        Err(DispatchError::Display(e)) => {
                            warn!("Sink error while dispatching: {:?}", e);
                            summary.frames_rejected += 1;
                            summary.display_error = Some(e);
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    summary.framing_errors += 1;
                    warn!(
                        "Frame error: {:?} ({} total)",
                        e,
                        self.parser.error_count()
                    );
                }
            }
        }
    }

    fn finish_iteration(&mut self, summary: &mut PollSummary) {
        let now = self.clock.now_ms();
        self.scheduler.tick(&mut self.state, now);

        if !self.state.dirty.any() {
            return;
        }
        match self.redraw() {
            Ok(()) => summary.redrawn = true,
            Err(e) => {
                error!("Redraw failed: {:?}", e);
                summary.display_error = Some(e);
            }
        }
    }

    /// Repaint now; dirty flags are cleared only on success
    pub fn redraw(&mut self) -> Result<(), DisplayError> {
        self.renderer.redraw(&self.state, &mut self.sink)?;
        self.state.dirty.clear();
        Ok(())
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn parser(&self) -> &FrameParser {
        &self.parser
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Tear down, returning the sink
    pub fn into_sink(self) -> S {
        self.sink
    }
}
