//! # Scopeshot CLI
//!
//! Command-line interface for ScopeMeter screen capture.
//!
//! ## Usage
//!
//! ```bash
//! # Identify the instrument
//! scopeshot --device /dev/ttyUSB1 identify
//!
//! # Read the status word
//! scopeshot status
//!
//! # Send any other query
//! scopeshot query CV
//!
//! # Capture the screen to QG129.pbm (and the raw payload to QG129.bin)
//! scopeshot grab
//!
//! # Capture with a PNG preview
//! scopeshot grab --png screen.png
//!
//! # Re-decode a saved payload
//! scopeshot decode QG129.bin --list
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use scopeshot::{
    InstrumentConfig, ScopeMeter, ScopeshotError,
    export::{self, dump, pbm, png},
    protocol::{Reply, Status, commands::DEFAULT_GRAPHICS_MODE},
    raster::{Bitmap, DecodeReport, Decoder, EscapeParser},
    transport::ByteChannel,
};

/// Default serial device
const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// Scopeshot - ScopeMeter screen capture utility
#[derive(Parser, Debug)]
#[command(name = "scopeshot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Serial device the ScopeMeter is connected to
    #[arg(long, global = true, default_value = DEFAULT_DEVICE)]
    device: String,

    /// JSON file overriding the instrument configuration
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Serial speed (overrides the config file)
    #[arg(long, global = true)]
    baud: Option<u32>,

    /// More logging (-v debug, -vv wire trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the instrument identification
    Identify,

    /// Print the instrument status word
    Status,

    /// Send a query and print the single-line answer
    Query {
        /// Command mnemonic, e.g. CV
        mnemonic: String,
    },

    /// Capture the screen
    Grab {
        /// Graphics output format to request
        #[arg(long, default_value_t = DEFAULT_GRAPHICS_MODE)]
        mode: u32,

        /// PBM output file (defaults to QG<mode>.pbm)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also write a PNG preview
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,

        /// Raw payload file (defaults to QG<mode>.bin)
        #[arg(long, value_name = "FILE", conflicts_with = "no_dump")]
        dump: Option<PathBuf>,

        /// Don't save the raw payload
        #[arg(long)]
        no_dump: bool,
    },

    /// Decode a saved graphics payload
    Decode {
        /// Raw payload file written by `grab`
        input: PathBuf,

        /// PBM output file (defaults to the input with a .pbm extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also write a PNG preview
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,

        /// Print the escape commands found in the payload
        #[arg(long)]
        list: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), ScopeshotError> {
    let mut config = match &cli.config {
        Some(path) => InstrumentConfig::load(path)?,
        None => InstrumentConfig::default(),
    };
    if let Some(baud) = cli.baud {
        config.baud_rate = baud;
    }

    match cli.command {
        Commands::Identify => {
            let mut scope = open_scope(&cli.device, &config)?;
            print_text_reply("ID", &scope.identify()?);
        }
        Commands::Status => {
            let mut scope = open_scope(&cli.device, &config)?;
            print_status_reply(&scope.instrument_status()?);
        }
        Commands::Query { mnemonic } => {
            let mnemonic = mnemonic.to_uppercase();
            let mut scope = open_scope(&cli.device, &config)?;
            let reply = scope.query(&mnemonic)?;
            print_text_reply(&mnemonic, &reply);
        }
        Commands::Grab {
            mode,
            output,
            png: png_file,
            dump: dump_file,
            no_dump,
        } => {
            let mut scope = open_scope(&cli.device, &config)?;

            print_text_reply("ID", &scope.identify()?);
            print_status_reply(&scope.instrument_status()?);

            println!(
                "Requesting screen (QG{}), this takes a while at {} baud...",
                mode, config.baud_rate
            );
            let reply = scope.query_graphics(mode)?;
            println!("QG: ack = '{}'", reply.ack_text);

            let Some(block) = reply.payload else {
                println!("QG{}: {}, no image", mode, reply.ack);
                return Ok(());
            };

            if !block.is_valid() {
                eprintln!(
                    "Checksum error (expected {}, read {}), decoding anyway",
                    block.computed, block.received
                );
            }

            if !no_dump {
                let dump_path = dump_file.unwrap_or_else(|| dump::default_path(mode));
                dump::save(&dump_path, &block.data)?;
            }

            let (bitmap, report) = Decoder::for_screen(&config).decode_with_report(&block.data);
            print_report(&report, &bitmap);

            let output = output.unwrap_or_else(|| PathBuf::from(format!("QG{}.pbm", mode)));
            write_images(&output, png_file.as_deref(), &bitmap)?;
        }
        Commands::Decode {
            input,
            output,
            png: png_file,
            list,
        } => {
            let payload = dump::load(&input)?;
            println!("Read {} bytes from {}", payload.len(), input.display());

            if list {
                let mut parser = EscapeParser::new(&payload);
                for (offset, command) in parser.by_ref() {
                    println!("{:6}  {}", offset, command);
                }
                if let Some(offset) = parser.truncated_at() {
                    println!("{:6}  (payload ends inside this escape)", offset);
                }
            }

            let (bitmap, report) = Decoder::for_screen(&config).decode_with_report(&payload);
            print_report(&report, &bitmap);

            let output = output.unwrap_or_else(|| input.with_extension("pbm"));
            write_images(&output, png_file.as_deref(), &bitmap)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn open_channel(device: &str, config: &InstrumentConfig) -> Result<Box<dyn ByteChannel>, ScopeshotError> {
    let transport = scopeshot::transport::SerialTransport::open(device, config)?;
    Ok(Box::new(transport))
}

#[cfg(not(unix))]
fn open_channel(_device: &str, _config: &InstrumentConfig) -> Result<Box<dyn ByteChannel>, ScopeshotError> {
    Err(ScopeshotError::Channel(
        "Serial ports are only supported on Unix".to_string(),
    ))
}

fn open_scope(
    device: &str,
    config: &InstrumentConfig,
) -> Result<ScopeMeter<Box<dyn ByteChannel>>, ScopeshotError> {
    log::info!("Connecting to {} on {}", config.name, device);
    let channel = open_channel(device, config)?;
    Ok(ScopeMeter::new(channel, config))
}

fn print_text_reply(name: &str, reply: &Reply<String>) {
    println!("{}: ack = '{}'", name, reply.ack_text);
    match &reply.payload {
        Some(text) => println!("{}: str = '{}'", name, text),
        None => println!("{}: {}", name, reply.ack),
    }
}

fn print_status_reply(reply: &Reply<Status>) {
    match &reply.payload {
        Some(status) => println!("IS: status = '{}' 0x{:04x}", status.raw, status.value),
        None => println!("IS: ack = '{}' ({})", reply.ack_text, reply.ack),
    }
}

fn print_report(report: &DecodeReport, bitmap: &Bitmap) {
    println!(
        "Decoded {} strips, {} of {}x{} pixels set",
        report.strips,
        bitmap.count_set(),
        bitmap.width(),
        bitmap.height()
    );
    if !report.unrecognized.is_empty() {
        println!("Skipped {} unrecognized escapes", report.unrecognized.len());
    }
    if let Some(offset) = report.truncated_at {
        println!("Payload truncated at offset {}, image is partial", offset);
    }
}

fn write_images(output: &Path, png_path: Option<&Path>, bitmap: &Bitmap) -> Result<(), ScopeshotError> {
    pbm::save(output, bitmap, export::CREATOR)?;
    println!("Saved to {}", output.display());

    if let Some(png_path) = png_path {
        png::save(png_path, bitmap)?;
        println!("Saved to {}", png_path.display());
    }

    Ok(())
}
