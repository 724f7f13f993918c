//! # Decoding Pipeline
//!
//! Glues [`FrameAccumulator`] → [`PacketDecoder`] → [`ImageAssembler`] into a
//! single [`feed`](Pipeline::feed) call. Bytes go in, in whatever pieces the
//! transport delivers them; events come out.
//!
//! ## Status Byte
//!
//! Every validated packet yields an acknowledgement `[0x81, 0x00, status]`.
//!
//! | After | Status |
//! |-------|--------|
//! | Initialize | cleared |
//! | Data with tiles | `unprocessed data` set |
//! | Print | `unprocessed data` cleared, `printing` on this acknowledgement only |
//! | a checksum failure | `checksum error` on the next acknowledgement only |
//! | less than a band of buffer left | `image full` until Initialize or Print |
//!
//! ## Resynchronization
//!
//! A frame that fails validation goes back to the accumulator minus its
//! first byte, so valid packets caught inside a bogus frame's span are
//! still decoded.
//!
//! ## Example
//!
//! ```
//! use gbprinter::pipeline::{Pipeline, PipelineEvent};
//! use gbprinter::protocol::{Command, Packet};
//!
//! let mut stream = Packet::encode(Command::Initialize, &[], false);
//! stream.extend(Packet::encode(Command::Data, &[0u8; 640], false));
//! stream.extend(Packet::encode(Command::Print, &[1, 0x13, 0xE4, 0x40], false));
//!
//! let mut pipeline = Pipeline::new();
//! let events = pipeline.feed(&stream);
//!
//! let image = events.into_iter().find_map(|event| match event {
//!     PipelineEvent::ImageReady(image) => Some(image),
//!     _ => None,
//! });
//! assert_eq!(image.unwrap().height(), 16);
//! ```

use tracing::{debug, warn};

use crate::error::{AssemblyError, DecodeError};
use crate::protocol::commands::{
    STATUS_CHECKSUM_ERROR, STATUS_IMAGE_FULL, STATUS_PRINTING, STATUS_UNPROCESSED,
    acknowledgement,
};
use crate::protocol::{Command, FrameAccumulator, FrameStats, PacketDecoder};
use crate::raster::{AssemblerEvent, ImageAssembler, RasterImage};

/// Something that happened while feeding bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// A packet was validated and applied
    Accepted {
        command: Command,
        event: AssemblerEvent,
        ack: [u8; 3],
    },
    /// A frame failed validation and was dropped
    DecodeFailed(DecodeError),
    /// A valid packet whose content could not be applied; nothing changed
    AssemblyFailed { error: AssemblyError, ack: [u8; 3] },
    /// A finished image, already taken from the assembler
    ImageReady(RasterImage),
}

impl PipelineEvent {
    /// Acknowledgement to write back, if this event carries one.
    pub fn ack(&self) -> Option<[u8; 3]> {
        match self {
            PipelineEvent::Accepted { ack, .. } | PipelineEvent::AssemblyFailed { ack, .. } => {
                Some(*ack)
            }
            _ => None,
        }
    }
}

/// Counters across the life of a pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub packets: u64,
    pub decode_errors: u64,
    pub assembly_errors: u64,
    pub images: u64,
}

#[derive(Debug, Default)]
pub struct Pipeline {
    frames: FrameAccumulator,
    decoder: PacketDecoder,
    assembler: ImageAssembler,
    status: u8,
    checksum_failed: bool,
    printing: bool,
    stats: PipelineStats,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed transport bytes and collect what they completed.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<PipelineEvent> {
        self.frames.feed(bytes);

        let mut events = Vec::new();
        while let Some(frame) = self.frames.next_frame() {
            match self.decoder.decode(frame.as_bytes()) {
                Ok(packet) => {
                    self.stats.packets += 1;
                    debug!(
                        command = packet.command.name(),
                        len = packet.payload.len(),
                        compressed = packet.compressed,
                        "packet"
                    );
                    match self.assembler.on_packet(&packet) {
                        Ok(event) => {
                            self.update_status(packet.command, event);
                            events.push(PipelineEvent::Accepted {
                                command: packet.command,
                                event,
                                ack: self.next_ack(),
                            });
                            if self.assembler.image_ready() {
                                self.collect_image(&mut events);
                            }
                        }
                        Err(error) => {
                            self.stats.assembly_errors += 1;
                            warn!(%error, "packet dropped");
                            events.push(PipelineEvent::AssemblyFailed {
                                error,
                                ack: self.next_ack(),
                            });
                        }
                    }
                }
                Err(error) => {
                    self.stats.decode_errors += 1;
                    if matches!(error, DecodeError::ChecksumMismatch { .. }) {
                        self.checksum_failed = true;
                    }
                    warn!(%error, "frame dropped");
                    self.frames.reject(frame);
                    events.push(PipelineEvent::DecodeFailed(error));
                }
            }
        }
        events
    }

    /// Status byte that the next acknowledgement will carry
    pub fn status(&self) -> u8 {
        let mut status = self.status;
        if self.checksum_failed {
            status |= STATUS_CHECKSUM_ERROR;
        }
        if self.printing {
            status |= STATUS_PRINTING;
        }
        if self.assembler.is_full() {
            status |= STATUS_IMAGE_FULL;
        }
        status
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn frame_stats(&self) -> FrameStats {
        self.frames.stats()
    }

    /// Height of the image still being received
    pub fn rows_in_progress(&self) -> usize {
        self.assembler.rows_in_progress()
    }

    fn update_status(&mut self, command: Command, event: AssemblerEvent) {
        match (command, event) {
            (Command::Initialize, _) => self.status = 0,
            (Command::Data, AssemblerEvent::Appended { .. }) => self.status |= STATUS_UNPROCESSED,
            (Command::Print, AssemblerEvent::ImageReady { .. }) => {
                self.status &= !STATUS_UNPROCESSED;
                self.printing = true;
            }
            (Command::Print, _) => self.status &= !STATUS_UNPROCESSED,
            _ => {}
        }
    }

    fn next_ack(&mut self) -> [u8; 3] {
        let ack = acknowledgement(self.status());
        self.checksum_failed = false;
        self.printing = false;
        ack
    }

    fn collect_image(&mut self, events: &mut Vec<PipelineEvent>) {
        match self.assembler.get_image() {
            Ok(image) => {
                self.stats.images += 1;
                events.push(PipelineEvent::ImageReady(image));
            }
            Err(error) => warn!(%error, "image vanished before collection"),
        }
    }
}
