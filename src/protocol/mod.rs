//! # Game Boy Printer Protocol
//!
//! This module turns the raw serial byte stream into validated packets.
//!
//! ## Module Structure
//!
//! - [`commands`]: Wire constants, command bytes, acknowledgement
//! - [`frame`]: Sync-marker framing over a fragmented byte stream
//! - [`packet`]: Packet type and the decoding state machine
//! - [`compression`]: Run-length payload compression
//!
//! ## Usage Example
//!
//! ```
//! use gbprinter::protocol::{Command, FrameAccumulator, Packet, PacketDecoder};
//!
//! let mut stream = Packet::encode(Command::Initialize, &[], false);
//! stream.extend(Packet::encode(Command::Data, &[0u8; 640], true));
//!
//! let mut frames = FrameAccumulator::new();
//! let mut decoder = PacketDecoder::new();
//! frames.feed(&stream);
//!
//! let packets: Vec<Packet> = frames
//!     .frames()
//!     .filter_map(|frame| decoder.decode(frame.as_bytes()).ok())
//!     .collect();
//!
//! assert_eq!(packets.len(), 2);
//! assert_eq!(packets[1].payload.len(), 640);
//! ```

pub mod commands;
pub mod compression;
pub mod frame;
pub mod packet;

pub use commands::Command;
pub use frame::{FrameAccumulator, FrameStats, RawFrame};
pub use packet::{Packet, PacketDecoder};
