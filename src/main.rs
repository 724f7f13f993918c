//! # gbprinter CLI
//!
//! Receives pictures from a Game Boy through a printer emulator bridge.
//!
//! ## Usage
//!
//! ```bash
//! # Listen on the bridge's serial port, save PNGs to <tmp>/GameBoyPrinter
//! gbprinter --serial /dev/ttyACM0
//!
//! # Bigger images with a different palette
//! gbprinter --serial /dev/ttyACM0 --palette "bgb emulator" --scale 5
//!
//! # Also print on a 58mm thermal printer
//! gbprinter --serial /dev/ttyACM0 --printer /dev/usb/lp0
//!
//! # Decode a captured byte stream
//! gbprinter --replay capture.bin --dest ./prints
//!
//! # Show the palettes
//! gbprinter --list-palettes
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use gbprinter::{
    GbPrinterError, PrinterService, ServiceConfig,
    config::{MAX_SCALE, PrinterSettings},
    output::{FileSink, PrinterSink},
    render::palette,
    transport::{ByteSource, DeviceWriter, ReplaySource, SerialSource},
};

/// gbprinter - Game Boy Printer receiver
#[derive(Parser, Debug)]
#[command(name = "gbprinter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Serial port of the printer emulator bridge
    #[arg(long, value_name = "PORT", conflicts_with = "replay")]
    serial: Option<PathBuf>,

    /// Decode a captured byte stream instead of a live port
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Thermal printer device to print on
    #[arg(long, value_name = "DEVICE", conflicts_with = "no_printer")]
    printer: Option<PathBuf>,

    /// Never print, even if the config file names a printer
    #[arg(long)]
    no_printer: bool,

    /// Thermal printer head width in dots (384 for 58mm, 576 for 80mm)
    #[arg(long, value_name = "DOTS")]
    printer_width: Option<u16>,

    /// Palette index or name
    #[arg(short, long, value_name = "PALETTE")]
    palette: Option<String>,

    /// Scale factor for saved images
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=MAX_SCALE as i64))]
    scale: Option<u32>,

    /// Folder for saved images (default: <tmp>/GameBoyPrinter)
    #[arg(short, long, value_name = "DIR")]
    dest: Option<PathBuf>,

    /// Serial line speed
    #[arg(long)]
    baud: Option<u32>,

    /// JSON configuration file; command-line flags take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List available palettes and exit
    #[arg(long)]
    list_palettes: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Disable colored log output
    #[arg(long)]
    no_color: bool,
}

/// Raised by SIGINT / SIGTERM
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

extern "C" fn on_signal(_signal: libc::c_int) {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), GbPrinterError> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.no_color);

    if cli.list_palettes {
        println!("Available palettes:");
        for (index, name) in palette::list_palettes() {
            let marker = if index == palette::DEFAULT_PALETTE {
                " (default)"
            } else {
                ""
            };
            println!("  {:>2}  {}{}", index, name, marker);
        }
        return Ok(());
    }

    let config = build_config(&cli)?;
    config.validate()?;
    config.prepare_output_dir()?;
    debug!(?config, "configuration");

    let source: Box<dyn ByteSource> = match (&cli.serial, &cli.replay) {
        (Some(port), _) => Box::new(SerialSource::open(port, config.baud)?),
        (None, Some(file)) => Box::new(ReplaySource::open(file)?),
        (None, None) => {
            return Err(GbPrinterError::Config(
                "No input given. Use --serial <PORT> or --replay <FILE>.".to_string(),
            ));
        }
    };

    let mut service = PrinterService::new(source, &config)?
        .with_sink(Box::new(FileSink::new(&config.output_dir)));

    if let Some(printer) = &config.printer {
        let writer = DeviceWriter::open(&printer.device)?;
        service = service.with_sink(Box::new(PrinterSink::new(
            writer,
            printer.printer_config(),
        )));
        info!(device = %printer.device.display(), "printing enabled");
    }

    install_signal_handlers(service.stop_handle());

    println!(
        "Waiting for data. Images are saved to {}. Press Ctrl+C to stop.",
        config.output_dir.display()
    );
    let stats = service.run()?;
    println!("Received {} image(s).", stats.images);
    Ok(())
}

/// Config file first, then command-line overrides.
fn build_config(cli: &Cli) -> Result<ServiceConfig, GbPrinterError> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_json_file(path)?,
        None => ServiceConfig::default(),
    };

    if let Some(palette) = &cli.palette {
        config.palette = palette.clone();
    }
    if let Some(scale) = cli.scale {
        config.scale = scale;
    }
    if let Some(dest) = &cli.dest {
        config.output_dir = dest.clone();
    }
    if let Some(baud) = cli.baud {
        config.baud = baud;
    }

    if cli.no_printer {
        config.printer = None;
    } else if let Some(device) = &cli.printer {
        config.printer = Some(PrinterSettings {
            device: device.clone(),
            width_dots: None,
        });
    }
    if let Some(width) = cli.printer_width {
        match config.printer.as_mut() {
            Some(printer) => printer.width_dots = Some(width),
            None => warn!("--printer-width has no effect without a printer"),
        }
    }

    Ok(config)
}

fn init_logging(verbose: u8, no_color: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .init();
}

/// Route SIGINT / SIGTERM to the service's stop flag.
fn install_signal_handlers(stop: Arc<AtomicBool>) {
    let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
    unsafe {
        libc::signal(libc::SIGINT, handler);
        libc::signal(libc::SIGTERM, handler);
    }

    thread::spawn(move || {
        while !SHUTDOWN.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(50));
        }
        debug!("shutdown requested");
        stop.store(true, Ordering::Relaxed);
    });
}
