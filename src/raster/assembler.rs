//! # Image Assembler
//!
//! Collects Data packets into a [`RasterImage`] and hands the finished image
//! out once a Print packet arrives.
//!
//! ## Packet Handling
//!
//! | Command | Effect |
//! |---------|--------|
//! | Initialize | drop any image in progress, start a new one |
//! | Data | append whole tiles as new 16-row bands |
//! | Data (empty) | end-of-data marker, no change |
//! | Print | finalize; `image_ready()` becomes true |
//! | Break | nothing |
//!
//! A Data payload that is not a whole number of tiles is rejected as a unit:
//! the raster is never left holding half a packet.
//!
//! Like the printer's RAM, one image holds at most [`IMAGE_BUFFER_BYTES`] of
//! tile data. A Data packet that would overflow it is rejected with
//! [`AssemblyError::BufferFull`]; Initialize or Print empties the buffer.

use tracing::{debug, info, warn};

use super::image::{BAND_BYTES, PrintParams, RasterImage};
use super::tile::TILE_BYTES;
use crate::error::AssemblyError;
use crate::protocol::{Command, Packet};

/// Tile data one image may hold, 8 KiB as in the printer
pub const IMAGE_BUFFER_BYTES: usize = 0x2000;

/// What a packet did to the assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerEvent {
    /// A new empty image was started
    Started,
    /// Tiles were appended; carries the new image height
    Appended { height: usize },
    /// Empty Data packet: the console finished sending tiles
    EndOfData,
    /// Print arrived and an image is now pending
    ImageReady { height: usize },
    /// Print arrived but there was nothing to print
    NothingToPrint,
    /// Break / status packet, no effect
    Passthrough,
}

/// Builds raster images from decoded packets.
#[derive(Debug, Default)]
pub struct ImageAssembler {
    current: Option<RasterImage>,
    finished: Option<RasterImage>,
    buffered: usize,
}

impl ImageAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one validated packet.
    pub fn on_packet(&mut self, packet: &Packet) -> Result<AssemblerEvent, AssemblyError> {
        match packet.command {
            Command::Initialize => {
                if let Some(dropped) = self.current.take().filter(|image| !image.is_empty()) {
                    debug!(
                        height = dropped.height(),
                        "initialize discarded unfinished image"
                    );
                }
                self.current = Some(RasterImage::new());
                self.buffered = 0;
                Ok(AssemblerEvent::Started)
            }
            Command::Data => self.append(&packet.payload),
            Command::Print => Ok(self.finish(&packet.payload)),
            Command::Break => Ok(AssemblerEvent::Passthrough),
        }
    }

    /// True when a finished image is waiting for [`get_image`](Self::get_image).
    pub fn image_ready(&self) -> bool {
        self.finished.is_some()
    }

    /// Take the finished image, leaving nothing pending.
    pub fn get_image(&mut self) -> Result<RasterImage, AssemblyError> {
        self.finished.take().ok_or(AssemblyError::NoImageAvailable)
    }

    /// Tile bytes held for the image under construction
    pub fn buffered(&self) -> usize {
        self.buffered
    }

    /// True when another full band would not fit.
    pub fn is_full(&self) -> bool {
        IMAGE_BUFFER_BYTES - self.buffered < BAND_BYTES
    }

    /// Height of the image under construction, if any.
    pub fn rows_in_progress(&self) -> usize {
        self.current.as_ref().map_or(0, RasterImage::height)
    }

    fn append(&mut self, payload: &[u8]) -> Result<AssemblerEvent, AssemblyError> {
        if payload.is_empty() {
            return Ok(AssemblerEvent::EndOfData);
        }
        if payload.len() % TILE_BYTES != 0 {
            return Err(AssemblyError::MalformedTileData { len: payload.len() });
        }
        let free = IMAGE_BUFFER_BYTES - self.buffered;
        if payload.len() > free {
            return Err(AssemblyError::BufferFull {
                len: payload.len(),
                free,
            });
        }

        let image = self.current.get_or_insert_with(RasterImage::new);
        image.append_tiles(payload);
        self.buffered += payload.len();
        debug!(
            tiles = payload.len() / TILE_BYTES,
            height = image.height(),
            "tiles appended"
        );
        Ok(AssemblerEvent::Appended {
            height: image.height(),
        })
    }

    fn finish(&mut self, payload: &[u8]) -> AssemblerEvent {
        self.buffered = 0;
        let Some(mut image) = self.current.take().filter(|image| !image.is_empty()) else {
            warn!("print requested with no image data");
            return AssemblerEvent::NothingToPrint;
        };

        let params = PrintParams::parse(payload);
        if let Some(p) = params {
            info!(
                height = image.height(),
                sheets = p.sheets,
                exposure = p.exposure,
                "image complete"
            );
        }
        image.set_print_params(params);

        if self.finished.is_some() {
            warn!("previous image was never collected, replacing it");
        }
        let height = image.height();
        self.finished = Some(image);
        AssemblerEvent::ImageReady { height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet(command: Command, payload: &[u8]) -> Packet {
        Packet {
            command,
            compressed: false,
            payload: payload.to_vec(),
            checksum: 0,
        }
    }

    #[test]
    fn test_full_cycle() {
        let mut asm = ImageAssembler::new();
        assert_eq!(
            asm.on_packet(&packet(Command::Initialize, &[])),
            Ok(AssemblerEvent::Started)
        );
        assert_eq!(
            asm.on_packet(&packet(Command::Data, &[0u8; 640])),
            Ok(AssemblerEvent::Appended { height: 16 })
        );
        assert_eq!(
            asm.on_packet(&packet(Command::Data, &[])),
            Ok(AssemblerEvent::EndOfData)
        );
        assert!(!asm.image_ready());
        assert_eq!(
            asm.on_packet(&packet(Command::Print, &[1, 0x13, 0xE4, 0x40])),
            Ok(AssemblerEvent::ImageReady { height: 16 })
        );
        assert!(asm.image_ready());

        let image = asm.get_image().unwrap();
        assert_eq!(image.height(), 16);
        assert_eq!(image.print_params().unwrap().sheets, 1);
        assert!(!asm.image_ready());
    }

    #[test]
    fn test_get_image_twice() {
        let mut asm = ImageAssembler::new();
        asm.on_packet(&packet(Command::Data, &[0u8; 16])).unwrap();
        asm.on_packet(&packet(Command::Print, &[])).unwrap();

        assert!(asm.get_image().is_ok());
        assert_eq!(asm.get_image(), Err(AssemblyError::NoImageAvailable));
    }

    #[test]
    fn test_get_image_before_print() {
        let mut asm = ImageAssembler::new();
        asm.on_packet(&packet(Command::Data, &[0u8; 16])).unwrap();
        assert_eq!(asm.get_image(), Err(AssemblyError::NoImageAvailable));
    }

    #[test]
    fn test_misaligned_data_leaves_image_untouched() {
        let mut asm = ImageAssembler::new();
        asm.on_packet(&packet(Command::Data, &[0xFF; 16])).unwrap();

        let err = asm.on_packet(&packet(Command::Data, &[0u8; 17])).unwrap_err();
        assert_eq!(err, AssemblyError::MalformedTileData { len: 17 });
        assert_eq!(asm.rows_in_progress(), 16);

        asm.on_packet(&packet(Command::Data, &[0u8; 32])).unwrap();
        assert_eq!(asm.rows_in_progress(), 32);
    }

    #[test]
    fn test_initialize_discards_progress() {
        let mut asm = ImageAssembler::new();
        asm.on_packet(&packet(Command::Data, &[0u8; 640])).unwrap();
        asm.on_packet(&packet(Command::Initialize, &[])).unwrap();
        assert_eq!(asm.rows_in_progress(), 0);
    }

    #[test]
    fn test_print_without_data() {
        let mut asm = ImageAssembler::new();
        asm.on_packet(&packet(Command::Initialize, &[])).unwrap();
        assert_eq!(
            asm.on_packet(&packet(Command::Print, &[1, 0, 0xE4, 0x40])),
            Ok(AssemblerEvent::NothingToPrint)
        );
        assert!(!asm.image_ready());
    }

    #[test]
    fn test_break_is_passthrough() {
        let mut asm = ImageAssembler::new();
        asm.on_packet(&packet(Command::Data, &[0u8; 16])).unwrap();
        assert_eq!(
            asm.on_packet(&packet(Command::Break, &[])),
            Ok(AssemblerEvent::Passthrough)
        );
        assert_eq!(asm.rows_in_progress(), 16);
    }

    #[test]
    fn test_buffer_cap() {
        let mut asm = ImageAssembler::new();
        asm.on_packet(&packet(Command::Initialize, &[])).unwrap();
        for _ in 0..12 {
            asm.on_packet(&packet(Command::Data, &[0u8; 640])).unwrap();
        }
        // 7680 of 8192 bytes used: a partial band still fits, a full one does not
        assert!(asm.is_full());
        assert_eq!(
            asm.on_packet(&packet(Command::Data, &[0u8; 640])),
            Err(AssemblyError::BufferFull { len: 640, free: 512 })
        );
        assert_eq!(asm.rows_in_progress(), 192);

        asm.on_packet(&packet(Command::Data, &[0u8; 512])).unwrap();
        assert_eq!(asm.buffered(), IMAGE_BUFFER_BYTES);

        asm.on_packet(&packet(Command::Print, &[])).unwrap();
        assert_eq!(asm.buffered(), 0);
        assert!(!asm.is_full());
    }
}
