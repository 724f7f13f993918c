//! # Printer Service
//!
//! The read loop. Pulls bytes from a [`ByteSource`], runs them through the
//! [`Pipeline`], writes acknowledgements back, renders every finished image
//! and hands it to each [`ImageSink`].
//!
//! ## Stopping
//!
//! The loop checks a shared stop flag between reads. Sources never block for
//! long (the serial port uses a 100 ms timeout), so raising the flag from a
//! signal handler ends the loop promptly. Finite sources also end it once
//! they are exhausted.
//!
//! ## Failure Handling
//!
//! | Failure | Effect |
//! |---------|--------|
//! | bad frame / bad packet | dropped by the pipeline, loop continues |
//! | render fault | image abandoned, logged, loop continues |
//! | sink error | logged, other sinks still run |
//! | read or ack write error | loop ends with the error |

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info};

use crate::config::ServiceConfig;
use crate::error::GbPrinterError;
use crate::output::ImageSink;
use crate::pipeline::{Pipeline, PipelineEvent, PipelineStats};
use crate::raster::RasterImage;
use crate::render::{self, Palette};
use crate::transport::ByteSource;

/// Bytes requested per read
const READ_BUFFER_SIZE: usize = 4096;

/// Totals reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    pub bytes_read: u64,
    pub images: u64,
    pub render_errors: u64,
    pub sink_errors: u64,
    pub pipeline: PipelineStats,
}

pub struct PrinterService<S: ByteSource> {
    source: S,
    pipeline: Pipeline,
    palette: &'static Palette,
    scale: u32,
    sinks: Vec<Box<dyn ImageSink>>,
    stop: Arc<AtomicBool>,
    stats: ServiceStats,
}

impl<S: ByteSource> PrinterService<S> {
    /// Build a service reading from `source`.
    ///
    /// The configuration is validated here; sinks are added separately.
    pub fn new(source: S, config: &ServiceConfig) -> Result<Self, GbPrinterError> {
        let palette = config.validate()?;
        Ok(Self {
            source,
            pipeline: Pipeline::new(),
            palette,
            scale: config.scale,
            sinks: Vec::new(),
            stop: Arc::new(AtomicBool::new(false)),
            stats: ServiceStats::default(),
        })
    }

    pub fn with_sink(mut self, sink: Box<dyn ImageSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Flag that ends [`run`](Self::run) when set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            pipeline: self.pipeline.stats(),
            ..self.stats
        }
    }

    /// Read until stopped or until a finite source runs dry.
    pub fn run(&mut self) -> Result<ServiceStats, GbPrinterError> {
        info!(
            palette = self.palette.name,
            scale = self.scale,
            sinks = self.sinks.len(),
            "waiting for data"
        );
        let mut buf = [0u8; READ_BUFFER_SIZE];

        while !self.stop.load(Ordering::Relaxed) {
            let n = match self.source.read_chunk(&mut buf) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(GbPrinterError::Transport(format!("Read failed: {}", e)));
                }
            };
            if n == 0 {
                if self.source.is_exhausted() {
                    debug!("source exhausted");
                    break;
                }
                continue;
            }
            self.stats.bytes_read += n as u64;

            for event in self.pipeline.feed(&buf[..n]) {
                self.handle(event)?;
            }
        }

        let stats = self.stats();
        info!(
            bytes = stats.bytes_read,
            packets = stats.pipeline.packets,
            images = stats.images,
            "service stopped"
        );
        Ok(stats)
    }

    fn handle(&mut self, event: PipelineEvent) -> Result<(), GbPrinterError> {
        if let Some(ack) = event.ack() {
            self.source
                .write_ack(&ack)
                .map_err(|e| GbPrinterError::Transport(format!("Ack write failed: {}", e)))?;
        }
        if let PipelineEvent::ImageReady(image) = event {
            self.dispatch(&image);
        }
        Ok(())
    }

    fn dispatch(&mut self, raster: &RasterImage) {
        let rendered = match render::render(raster, self.palette, self.scale) {
            Ok(rendered) => rendered,
            Err(e) => {
                self.stats.render_errors += 1;
                error!(error = %e, "image abandoned");
                return;
            }
        };
        self.stats.images += 1;
        info!(
            width = rendered.width(),
            height = rendered.height(),
            "image ready"
        );

        for sink in &mut self.sinks {
            if let Err(e) = sink.on_image_ready(&rendered) {
                self.stats.sink_errors += 1;
                error!(sink = sink.name(), error = %e, "sink failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;
    use crate::protocol::{Command, Packet};
    use crate::render::RenderedImage;
    use crate::transport::ReplaySource;

    struct FailingSink;

    impl ImageSink for FailingSink {
        fn name(&self) -> &str {
            "failing"
        }

        fn on_image_ready(&mut self, _image: &RenderedImage) -> Result<(), GbPrinterError> {
            Err(GbPrinterError::Image("disk full".to_string()))
        }
    }

    fn session() -> Vec<u8> {
        let mut stream = Packet::encode(Command::Initialize, &[], false);
        stream.extend(Packet::encode(Command::Data, &[0u8; 640], true));
        stream.extend(Packet::encode(Command::Print, &[1, 0x13, 0xE4, 0x40], false));
        stream
    }

    #[test]
    fn test_replay_to_memory() {
        let source = ReplaySource::from_bytes([session(), session()].concat()).with_chunk_size(7);
        let sink = MemorySink::new();
        let config = ServiceConfig {
            scale: 2,
            ..Default::default()
        };

        let mut service = PrinterService::new(source, &config)
            .unwrap()
            .with_sink(Box::new(sink.clone()));
        let stats = service.run().unwrap();

        assert_eq!(stats.images, 2);
        assert_eq!(stats.pipeline.packets, 6);
        let images = sink.take();
        assert_eq!(images.len(), 2);
        assert_eq!((images[0].width(), images[0].height()), (320, 32));
        assert_eq!(images[0].pixel(0, 0), 0xFFFFFF);

        // Three acks of three bytes per session
        assert_eq!(service.source().acks().len(), 18);
        assert_eq!(&service.source().acks()[..3], &[0x81, 0x00, 0x00]);
    }

    #[test]
    fn test_sink_failure_does_not_stop_service() {
        let source = ReplaySource::from_bytes([session(), session()].concat());
        let sink = MemorySink::new();

        let mut service = PrinterService::new(source, &ServiceConfig::default())
            .unwrap()
            .with_sink(Box::new(FailingSink))
            .with_sink(Box::new(sink.clone()));
        let stats = service.run().unwrap();

        assert_eq!(stats.sink_errors, 2);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_stop_flag_ends_run() {
        let source = ReplaySource::from_bytes(session());
        let sink = MemorySink::new();

        let mut service = PrinterService::new(source, &ServiceConfig::default())
            .unwrap()
            .with_sink(Box::new(sink.clone()));
        service.stop_handle().store(true, Ordering::Relaxed);

        let stats = service.run().unwrap();
        assert_eq!(stats.bytes_read, 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ServiceConfig {
            palette: "no such palette".to_string(),
            ..Default::default()
        };
        assert!(PrinterService::new(ReplaySource::from_bytes(Vec::new()), &config).is_err());
    }
}
