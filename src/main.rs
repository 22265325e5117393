// Copyright (C) 2026 Brian Johnson
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serialport::{DataBits, Parity, StopBits};
use thiserror::Error;
use tracing::{info, warn};

use ymodem::error::YmodemError;
use ymodem::link::Config;
use ymodem::protocol::PACKET_1K_SIZE;
use ymodem::receiver::{Chunk, Receiver, Start};
use ymodem::sender::{FinishReport, Sender};
use ymodem::serial::{self, RealSerialPort, Transport};

/// Longest filename accepted from a sender
const MAX_FILENAME_LEN: usize = 255;

#[derive(Parser)]
#[command(name = "ymodem")]
#[command(about = "YMODEM file transfer over a serial line", long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Serial port to use (e.g., /dev/ttyUSB0 or COM1)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long, default_value = "115200")]
    baud: u32,

    /// Data bits (5, 6, 7, or 8)
    #[arg(long, default_value = "8", value_name = "BITS", value_parser = parse_data_bits)]
    data_bits: DataBits,

    /// Parity (none, odd, or even)
    #[arg(long, default_value = "none", value_parser = parse_parity)]
    parity: Parity,

    /// Stop bits (1 or 2)
    #[arg(long, default_value = "1", value_name = "BITS", value_parser = parse_stop_bits)]
    stop_bits: StopBits,

    /// Time to wait for each byte from the peer
    #[arg(long, default_value = "1000", value_name = "MS")]
    timeout_ms: u64,

    /// Resends of a rejected packet before giving up
    #[arg(long, default_value = "10")]
    retries: u32,

    /// Enable debug output
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a file
    Send {
        /// File to send
        file: PathBuf,

        /// Reads spent waiting for the receiver to start
        #[arg(long, default_value = "60", value_name = "COUNT")]
        handshake_retries: u32,
    },
    /// Receive files
    Receive {
        /// Directory to save received files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// List available serial ports
    ListPorts,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Protocol(#[from] YmodemError),

    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("unusable filename: {0:?}")]
    BadFilename(String),
}

fn parse_data_bits(bits: &str) -> Result<DataBits, String> {
    match bits {
        "5" => Ok(DataBits::Five),
        "6" => Ok(DataBits::Six),
        "7" => Ok(DataBits::Seven),
        "8" => Ok(DataBits::Eight),
        _ => Err(format!("Invalid data bits: {}. Must be 5, 6, 7, or 8", bits)),
    }
}

fn parse_parity(parity: &str) -> Result<Parity, String> {
    match parity.to_lowercase().as_str() {
        "none" => Ok(Parity::None),
        "odd" => Ok(Parity::Odd),
        "even" => Ok(Parity::Even),
        _ => Err(format!("Invalid parity: {}. Must be 'none', 'odd', or 'even'", parity)),
    }
}

fn parse_stop_bits(bits: &str) -> Result<StopBits, String> {
    match bits {
        "1" => Ok(StopBits::One),
        "2" => Ok(StopBits::Two),
        _ => Err(format!("Invalid stop bits: {}. Must be 1 or 2", bits)),
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    if let Commands::ListPorts = cli.command {
        match serial::list_ports() {
            Ok(ports) if ports.is_empty() => println!("No serial ports found"),
            Ok(ports) => {
                for (name, description) in ports {
                    println!("{} : {}", name, description);
                }
            }
            Err(e) => {
                eprintln!("Failed to list serial ports: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let Some(port) = cli.port.as_deref() else {
        eprintln!("Error: --port is required");
        std::process::exit(1);
    };

    println!("Opening serial port: {}", port);
    println!("Settings: {} baud, {:?}, {:?}, {:?}", cli.baud, cli.data_bits, cli.parity, cli.stop_bits);

    let serial_port = match RealSerialPort::open(port, cli.baud, cli.data_bits, cli.parity, cli.stop_bits) {
        Ok(port) => port,
        Err(e) => {
            eprintln!("Failed to open serial port: {}", e);
            std::process::exit(1);
        }
    };

    let config = Config {
        timeout: Duration::from_millis(cli.timeout_ms),
        max_retries: cli.retries,
    };

    match cli.command {
        Commands::Send { file, handshake_retries } => {
            println!("\nSending file: {}", file.display());
            match send_file(Box::new(serial_port), &file, config, handshake_retries) {
                Ok(report) if !report.eot_acknowledged => {
                    println!("\nFile sent, but the receiver never confirmed the end of file");
                }
                Ok(_) => println!("\nFile sent successfully!"),
                Err(e) => {
                    eprintln!("Send failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Receive { output_dir } => {
            println!("\nReceiving files to: {}", output_dir.display());
            match receive_files(Box::new(serial_port), &output_dir, config) {
                Ok(files) => println!("\n{} file(s) received successfully!", files.len()),
                Err(e) => {
                    eprintln!("Receive failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::ListPorts => unreachable!("handled before opening the port"),
    }
}

fn send_file(
    transport: Box<dyn Transport>,
    file: &Path,
    config: Config,
    handshake_retries: u32,
) -> Result<FinishReport, CliError> {
    let data = std::fs::read(file).map_err(|source| CliError::File {
        path: file.to_path_buf(),
        source,
    })?;

    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::BadFilename(file.display().to_string()))?;

    let mut sender = Sender::new(transport, config);
    sender.start_with_length(name, data.len() as u64, handshake_retries)?;

    for chunk in data.chunks(PACKET_1K_SIZE) {
        sender.append(chunk)?;
    }

    let report = sender.finish()?;
    info!(bytes = data.len(), "Sent {}", name);
    Ok(report)
}

fn receive_files(transport: Box<dyn Transport>, output_dir: &Path, config: Config) -> Result<Vec<PathBuf>, CliError> {
    if !output_dir.is_dir() {
        return Err(CliError::File {
            path: output_dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "Output directory not found"),
        });
    }

    let mut receiver = Receiver::new(transport, config);
    let mut received = Vec::new();

    loop {
        let header = match receiver.start(MAX_FILENAME_LEN)? {
            Start::File(header) => header,
            Start::EndOfBatch => break,
        };

        let Some(path) = output_path(output_dir, &header.name) else {
            cancel_transfer(&mut receiver);
            return Err(CliError::BadFilename(header.name));
        };

        let mut file = match File::create(&path) {
            Ok(file) => file,
            Err(source) => {
                cancel_transfer(&mut receiver);
                return Err(CliError::File { path, source });
            }
        };

        loop {
            match receiver.next()? {
                Chunk::Data(data) => {
                    if let Err(source) = file.write_all(&data) {
                        cancel_transfer(&mut receiver);
                        return Err(CliError::File { path, source });
                    }
                }
                Chunk::EndOfFile => break,
            }
        }

        info!(path = %path.display(), "Saved {}", header.name);
        received.push(path);
    }

    Ok(received)
}

/// Tell the sender to stop. The caller reports its own error, so a failed
/// cancel is only logged.
fn cancel_transfer(receiver: &mut Receiver) {
    if let Err(e) = receiver.cancel() {
        warn!("Failed to cancel transfer: {}", e);
    }
}

/// Where to store a received file: only the last component of the sender's
/// name is used, so a header cannot point outside `output_dir`.
fn output_path(output_dir: &Path, name: &str) -> Option<PathBuf> {
    let name = Path::new(name).file_name()?;
    Some(output_dir.join(name))
}

// ============================================================================
// Tests
// ============================================================================
