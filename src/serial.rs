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

use std::io::{self, Read, Write};
use std::sync::mpsc;
use std::time::Duration;
use serialport::{SerialPort as SerialPortTrait, SerialPortInfo, SerialPortType, DataBits, Parity, StopBits};

// ============================================================================
// Transport Trait
// ============================================================================

/// Byte-level link the YMODEM sessions are driven through.
///
/// Both calls block. `get_byte` returns `Ok(None)` when nothing arrived
/// within `timeout`; `Err` is reserved for failures of the link itself.
pub trait Transport: Send {
    fn put_byte(&mut self, byte: u8) -> io::Result<()>;

    fn get_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>>;
}

// ============================================================================
// Real Serial Port Implementation
// ============================================================================

/// Real serial port implementation that wraps the serialport crate
pub struct RealSerialPort {
    port: Box<dyn SerialPortTrait>,
}

impl RealSerialPort {
    pub fn open(
        port_name: &str,
        baud_rate: u32,
        data_bits: DataBits,
        parity: Parity,
        stop_bits: StopBits,
    ) -> Result<Self, serialport::Error> {
        let port = serialport::new(port_name, baud_rate)
            .data_bits(data_bits)
            .parity(parity)
            .stop_bits(stop_bits)
            .timeout(Duration::from_millis(100))
            .open()?;

        Ok(RealSerialPort { port })
    }
}

impl Transport for RealSerialPort {
    fn put_byte(&mut self, byte: u8) -> io::Result<()> {
        self.port.write_all(&[byte])?;
        self.port.flush()
    }

    fn get_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        self.port.set_timeout(timeout)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Serial ports present on this machine, as `(name, description)` pairs.
pub fn list_ports() -> Result<Vec<(String, String)>, serialport::Error> {
    let ports = serialport::available_ports()?;
    Ok(ports.into_iter().map(|p: SerialPortInfo| {
        let description = match p.port_type {
            SerialPortType::UsbPort(usb) => {
                let product = usb.product.unwrap_or_else(|| "USB serial".to_string());
                format!("{} ({:04x}:{:04x})", product, usb.vid, usb.pid)
            }
            SerialPortType::PciPort => "PCI serial".to_string(),
            SerialPortType::BluetoothPort => "Bluetooth serial".to_string(),
            _ => "n/a".to_string(),
        };
        (p.port_name, description)
    }).collect())
}

// ============================================================================
// Mock Serial Port for Testing
// ============================================================================

#[cfg(test)]
pub struct MockSerialPort {
    // Data to return on reads (None = timeout)
    read_buffer: Vec<Option<u8>>,
    read_pos: usize,
    // Track what was written
    write_log: Vec<u8>,
    // Expected writes for verification
    expected_writes: Vec<u8>,
    // Writes beyond this many bytes fail
    write_limit: Option<usize>,
}

#[cfg(test)]
impl MockSerialPort {
    pub fn new(responses: Vec<Option<u8>>, expected_writes: Vec<u8>) -> Self {
        MockSerialPort {
            read_buffer: responses,
            read_pos: 0,
            write_log: Vec::new(),
            expected_writes,
            write_limit: None,
        }
    }

    pub fn with_write_limit(mut self, limit: usize) -> Self {
        self.write_limit = Some(limit);
        self
    }
}

#[cfg(test)]
impl Transport for MockSerialPort {
    fn put_byte(&mut self, byte: u8) -> io::Result<()> {
        if self.write_limit.is_some_and(|limit| self.write_log.len() >= limit) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "Mock write failure"));
        }
        self.write_log.push(byte);
        Ok(())
    }

    fn get_byte(&mut self, _timeout: Duration) -> io::Result<Option<u8>> {
        // Out of responses = timeout
        if self.read_pos >= self.read_buffer.len() {
            return Ok(None);
        }

        let response = self.read_buffer[self.read_pos];
        self.read_pos += 1;
        Ok(response)
    }
}

#[cfg(test)]
impl Drop for MockSerialPort {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }

        assert_eq!(
            self.read_pos,
            self.read_buffer.len(),
            "MockSerialPort dropped with {} unconsumed responses (read {} of {} bytes)",
            self.read_buffer.len() - self.read_pos,
            self.read_pos,
            self.read_buffer.len()
        );

        assert_eq!(
            &self.write_log,
            &self.expected_writes,
            "MockSerialPort write log mismatch!\nExpected {} bytes:\n{:02X?}\nGot {} bytes:\n{:02X?}",
            self.expected_writes.len(),
            self.expected_writes,
            self.write_log.len(),
            self.write_log
        );
    }
}

// ============================================================================
// In-memory Pipe
// ============================================================================

/// One end of a bidirectional in-memory byte link.
pub struct PipePort {
    tx: mpsc::Sender<u8>,
    rx: mpsc::Receiver<u8>,
}

/// Two connected pipe ends. Bytes put on one end are read from the other,
/// so a sender and a receiver can run against each other on two threads.
pub fn pipe_pair() -> (PipePort, PipePort) {
    let (a_tx, b_rx) = mpsc::channel();
    let (b_tx, a_rx) = mpsc::channel();
    (PipePort { tx: a_tx, rx: a_rx }, PipePort { tx: b_tx, rx: b_rx })
}

impl Transport for PipePort {
    fn put_byte(&mut self, byte: u8) -> io::Result<()> {
        self.tx.send(byte)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "Pipe closed"))
    }

    fn get_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        match self.rx.recv_timeout(timeout) {
            Ok(b) => Ok(Some(b)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "Pipe closed"))
            }
        }
    }
}
