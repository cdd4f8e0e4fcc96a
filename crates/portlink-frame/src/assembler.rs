use bytes::{BufMut, Bytes, BytesMut};
use tracing::warn;

use crate::sentinel::SentinelCode;

/// Default cap on a single in-flight payload: 64 KiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 64 * 1024;

/// Two-state byte-at-a-time frame assembler.
///
/// Seeking discards bytes until the start sentinel arrives; Collecting
/// accumulates payload bytes until the end sentinel, then emits the payload.
/// Sentinel bytes never appear in an emitted payload, and the frames
/// produced are independent of how the input is chunked across calls.
#[derive(Debug)]
pub struct FrameAssembler {
    start: SentinelCode,
    end: SentinelCode,
    max_payload: usize,
    state: State,
    buf: BytesMut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Seeking,
    Collecting,
}

impl FrameAssembler {
    /// Assembler with the default payload cap.
    pub fn new(start: SentinelCode, end: SentinelCode) -> Self {
        Self {
            start,
            end,
            max_payload: DEFAULT_MAX_PAYLOAD,
            state: State::Seeking,
            buf: BytesMut::new(),
        }
    }

    /// Override the in-flight payload cap.
    pub fn with_max_payload(mut self, max_payload: usize) -> Self {
        self.max_payload = max_payload;
        self
    }

    /// Drive the machine one byte; returns the payload of a frame the byte
    /// completes.
    ///
    /// When the start and end codes are the same byte, it toggles the
    /// machine: every second occurrence completes a frame. An end byte seen
    /// while Seeking is garbage and emits nothing.
    pub fn consume(&mut self, byte: u8) -> Option<Bytes> {
        match self.state {
            State::Seeking => {
                if byte == self.start.value() {
                    self.state = State::Collecting;
                    self.buf.clear();
                }
                None
            }
            State::Collecting => {
                if byte == self.end.value() {
                    self.state = State::Seeking;
                    return Some(self.buf.split().freeze());
                }
                if self.buf.len() >= self.max_payload {
                    warn!(
                        max_payload = self.max_payload,
                        "in-flight payload exceeded cap, discarding frame"
                    );
                    self.reset();
                    return None;
                }
                self.buf.put_u8(byte);
                None
            }
        }
    }

    /// Feed a whole chunk; returns the frames completed within it.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Bytes> {
        bytes.iter().filter_map(|&b| self.consume(b)).collect()
    }

    /// Discard any in-flight payload and return to Seeking.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.state = State::Seeking;
    }

    /// Whether a frame is partway through assembly.
    pub fn is_collecting(&self) -> bool {
        self.state == State::Collecting
    }

    /// Bytes collected for the frame in progress.
    pub fn in_flight(&self) -> usize {
        self.buf.len()
    }
}

/// Wrap an encoded payload in start/end sentinels for the wire.
///
/// The codes used here are per call, so a send may frame with codes that
/// differ from the ones inbound assembly is configured with.
pub fn encode_frame(payload: &[u8], start: SentinelCode, end: SentinelCode) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 2);
    frame.push(start.value());
    frame.extend_from_slice(payload);
    frame.push(end.value());
    frame
}
