//! # Frame Accumulation
//!
//! The serial link delivers bytes in arbitrary chunks: a read may end in
//! the middle of a header, or contain the tail of one packet and the start of
//! the next. [`FrameAccumulator`] buffers those bytes and hands out complete
//! sync-delimited frames.
//!
//! ## Resynchronization
//!
//! - Bytes before a sync marker are noise and are discarded.
//! - A header whose length field exceeds [`MAX_PAYLOAD_LEN`] is treated as a
//!   false sync: one byte is skipped and the scan starts again.
//! - An incomplete frame stays buffered until more bytes arrive, unless a
//!   later sync marker already starts a complete frame with a valid
//!   checksum. The earlier marker was then a false sync and is skipped.
//! - A frame the decoder rejects is handed back with
//!   [`reject`](FrameAccumulator::reject): its first byte is dropped and the
//!   scan restarts right after it, so packets inside a bogus frame's span
//!   are still found.

use tracing::debug;

use super::commands::{CHECKSUM_LEN, HEADER_LEN, MAX_PAYLOAD_LEN, SYNC};
use super::packet::checksum;

/// One sync-delimited frame, sync marker through checksum, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame(Vec<u8>);

impl RawFrame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Counters kept by the accumulator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Complete frames handed out
    pub frames: u64,
    /// Bytes discarded while hunting for a sync marker
    pub noise_bytes: u64,
    /// Sync markers skipped because of an impossible length field, or
    /// because a complete frame turned up further on
    pub false_syncs: u64,
    /// Frames handed back by the decoder
    pub rejected: u64,
}

/// Buffers raw bytes and splits them into frames.
///
/// ## Example
///
/// ```
/// use gbprinter::protocol::{Command, FrameAccumulator, Packet};
///
/// let frame = Packet::encode(Command::Initialize, &[], false);
/// let mut acc = FrameAccumulator::new();
///
/// // First half: not enough for a frame yet
/// acc.feed(&frame[..4]);
/// assert!(acc.next_frame().is_none());
///
/// // Second half completes it
/// acc.feed(&frame[4..]);
/// assert_eq!(acc.next_frame().unwrap().as_bytes(), &frame[..]);
/// ```
#[derive(Debug, Default)]
pub struct FrameAccumulator {
    buffer: Vec<u8>,
    stats: FrameStats,
}

impl FrameAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes from the transport. An empty slice is fine.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes buffered but not yet part of a complete frame
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Drain every complete frame currently buffered.
    pub fn frames(&mut self) -> Frames<'_> {
        Frames { accumulator: self }
    }

    /// Pop the next complete frame, if one is buffered.
    ///
    /// Returns `None` when more bytes are needed; partial state is kept for
    /// the next call.
    pub fn next_frame(&mut self) -> Option<RawFrame> {
        loop {
            let Some(start) = find_sync(&self.buffer) else {
                // Keep a trailing first sync byte, its partner may be in the next read
                let keep = usize::from(self.buffer.last() == Some(&SYNC[0]));
                self.discard(self.buffer.len() - keep);
                return None;
            };
            self.discard(start);

            if self.buffer.len() < HEADER_LEN {
                return None;
            }

            let payload_len = u16::from_le_bytes([self.buffer[4], self.buffer[5]]) as usize;
            if payload_len > MAX_PAYLOAD_LEN {
                debug!(payload_len, "false sync: impossible payload length");
                self.stats.false_syncs += 1;
                self.discard(1);
                continue;
            }

            let total = HEADER_LEN + payload_len + CHECKSUM_LEN;
            if self.buffer.len() < total {
                if let Some(next) = self.later_valid_frame() {
                    debug!(skipped = next, "false sync: complete frame further on");
                    self.stats.false_syncs += 1;
                    self.discard(next);
                    continue;
                }
                return None;
            }

            let frame: Vec<u8> = self.buffer.drain(..total).collect();
            self.stats.frames += 1;
            return Some(RawFrame(frame));
        }
    }

    /// Hand back a frame that failed validation.
    ///
    /// Everything after its first byte returns to the front of the buffer,
    /// so the next scan starts just past the bad sync marker.
    pub fn reject(&mut self, frame: RawFrame) {
        let bytes = frame.into_bytes();
        let Some((_, rest)) = bytes.split_first() else {
            return;
        };
        self.buffer.splice(0..0, rest.iter().copied());
        self.stats.rejected += 1;
        self.stats.noise_bytes += 1;
    }

    /// Offset of the first sync marker after the start of the buffer that
    /// begins a complete, checksum-valid frame.
    fn later_valid_frame(&self) -> Option<usize> {
        (1..self.buffer.len())
            .filter(|&i| self.buffer[i..].starts_with(&SYNC))
            .find(|&i| is_valid_frame(&self.buffer[i..]))
    }

    fn discard(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        debug!(count, "discarding bytes before sync marker");
        self.buffer.drain(..count);
        self.stats.noise_bytes += count as u64;
    }
}

/// Iterator returned by [`FrameAccumulator::frames`]
pub struct Frames<'a> {
    accumulator: &'a mut FrameAccumulator,
}

impl Iterator for Frames<'_> {
    type Item = RawFrame;

    fn next(&mut self) -> Option<RawFrame> {
        self.accumulator.next_frame()
    }
}

fn find_sync(data: &[u8]) -> Option<usize> {
    data.windows(SYNC.len()).position(|window| window == SYNC)
}

/// True when `data` starts with a whole frame whose checksum matches.
fn is_valid_frame(data: &[u8]) -> bool {
    if data.len() < HEADER_LEN {
        return false;
    }
    let payload_len = u16::from_le_bytes([data[4], data[5]]) as usize;
    let total = HEADER_LEN + payload_len + CHECKSUM_LEN;
    if payload_len > MAX_PAYLOAD_LEN || data.len() < total {
        return false;
    }
    let sent = u16::from_le_bytes([data[total - 2], data[total - 1]]);
    checksum(&data[SYNC.len()..total - CHECKSUM_LEN]) == sent
}

// ============================================================================
// TESTS
// ============================================================================
