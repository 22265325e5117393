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

use tracing::{debug, info, warn};

use crate::error::{Result, YmodemError};
use crate::link::{Config, Link};
use crate::packet::{self, SizeClass};
use crate::protocol::*;
use crate::serial::Transport;

// ============================================================================
// Packet Buffer
// ============================================================================

/// Pending file bytes, at most one 1K packet worth.
struct PacketBuffer {
    data: [u8; PACKET_1K_SIZE],
    len: usize,
}

impl PacketBuffer {
    fn new() -> Self {
        PacketBuffer {
            data: [0; PACKET_1K_SIZE],
            len: 0,
        }
    }

    fn len(&self) -> usize {
        self.len
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn is_full(&self) -> bool {
        self.len == PACKET_1K_SIZE
    }

    /// Copy as much of `input` as fits, returning the number of bytes taken.
    fn fill(&mut self, input: &[u8]) -> usize {
        let n = input.len().min(PACKET_1K_SIZE - self.len);
        self.data[self.len..self.len + n].copy_from_slice(&input[..n]);
        self.len += n;
        n
    }

    /// Payload for a packet of class `size`, zero padded past the buffered bytes.
    fn payload(&self, size: SizeClass) -> Vec<u8> {
        let take = self.len.min(size.payload_len());
        let mut payload = self.data[..take].to_vec();
        payload.resize(size.payload_len(), 0);
        payload
    }

    /// Drop `n` bytes from the front, shifting the rest down.
    fn consume(&mut self, n: usize) {
        assert!(n <= self.len, "consuming {} of {} buffered bytes", n, self.len);
        self.data.copy_within(n..self.len, 0);
        self.len -= n;
    }

    fn clear(&mut self) {
        self.data = [0; PACKET_1K_SIZE];
        self.len = 0;
    }
}

// ============================================================================
// Sender
// ============================================================================

/// Outcome of a completed [`Sender::finish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishReport {
    /// Receiver ACKed one of the EOT bytes
    pub eot_acknowledged: bool,
    /// Receiver ACKed the empty header closing the batch
    pub batch_closed: bool,
}

/// Transmit half of a YMODEM transfer.
pub struct Sender {
    link: Link,
    state: State,
    buffer: PacketBuffer,
    seq: u8,
}

impl Sender {
    pub fn new(transport: Box<dyn Transport>, config: Config) -> Self {
        Sender {
            link: Link::new(transport, config),
            state: State::Ready,
            buffer: PacketBuffer::new(),
            seq: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Wait for the receiver, send the header for `filename` and wait until
    /// the receiver asks for data.
    ///
    /// `retry_budget` bounds the reads spent waiting for the initial 'C'.
    /// An empty `filename` sends the header that ends the batch and leaves
    /// the session in `Ready`.
    pub fn start(&mut self, filename: &str, retry_budget: u32) -> Result<()> {
        self.begin(filename, None, retry_budget)
    }

    /// Like [`Sender::start`], also announcing the file length in the header.
    pub fn start_with_length(&mut self, filename: &str, length: u64, retry_budget: u32) -> Result<()> {
        self.begin(filename, Some(length), retry_budget)
    }

    /// Queue file bytes, sending every full 1K packet as it fills up.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        self.require(State::Transmitting, "append")?;

        let mut rest = data;
        while !rest.is_empty() {
            let copied = self.buffer.fill(rest);
            rest = &rest[copied..];

            if self.buffer.is_full() {
                if let Err(e) = self.flush(SizeClass::Long) {
                    self.reset();
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Send whatever is buffered, end the file with EOT and close the batch
    /// with an empty header. The session is back in `Ready` afterwards.
    ///
    /// A normal finish is `Ok`, not a timeout status: the report tells
    /// whether the receiver confirmed the EOT and the closing header. Only a
    /// failure to deliver the last data packet is an `Err`.
    pub fn finish(&mut self) -> Result<FinishReport> {
        self.require(State::Transmitting, "finish")?;

        if let Err(e) = self.send_tail() {
            self.reset();
            return Err(e);
        }

        let eot_acknowledged = match self.send_eot() {
            Ok(acked) => acked,
            Err(e) => {
                self.reset();
                return Err(e);
            }
        };

        let batch_closed = match self.close_batch() {
            Ok(()) => true,
            Err(e) => {
                warn!("Closing header failed: {}", e);
                false
            }
        };

        self.reset();
        info!(eot_acknowledged, batch_closed, "Transfer finished");
        Ok(FinishReport { eot_acknowledged, batch_closed })
    }

    /// Send the two-byte cancel sequence and drop the transfer.
    pub fn cancel(&mut self) -> Result<()> {
        self.reset();
        self.link.send_cancel()
    }

    fn begin(&mut self, filename: &str, length: Option<u64>, retry_budget: u32) -> Result<()> {
        self.require(State::Ready, "start")?;
        let (size, payload) = header_payload(filename, length)?;

        self.state = State::AwaitingHandshake;
        self.seq = 0;

        if filename.is_empty() {
            // Empty header ends the batch; no data request follows it
            let result = self.send_header(size, &payload, retry_budget);
            self.reset();
            return result;
        }

        match self.handshake(size, &payload, retry_budget) {
            Ok(()) => {
                self.state = State::Transmitting;
                info!(filename, "Header accepted, transmitting");
                Ok(())
            }
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    fn handshake(&mut self, size: SizeClass, payload: &[u8], retry_budget: u32) -> Result<()> {
        self.send_header(size, payload, retry_budget)?;

        // Receiver asks again once it is ready for the first data packet
        let attempts = self.link.config().max_retries;
        self.link.wait_for(CRC_REQUEST, attempts)?;
        debug!("Received: 'C' (ready for data)");
        Ok(())
    }

    /// Empty header telling the receiver no more files follow.
    fn close_batch(&mut self) -> Result<()> {
        self.state = State::AwaitingHandshake;
        self.seq = 0;
        let (size, payload) = header_payload("", None)?;
        let attempts = self.link.config().max_retries;
        self.send_header(size, &payload, attempts)
    }

    fn send_header(&mut self, size: SizeClass, payload: &[u8], attempts: u32) -> Result<()> {
        self.link.wait_for(CRC_REQUEST, attempts)?;
        debug!("Received: 'C'");

        let frame = packet::frame(self.seq, payload, size)?;
        self.link.exchange(&frame)?;
        debug!("Sent: header ({} bytes)", size.payload_len());

        self.seq = self.seq.wrapping_add(1);
        Ok(())
    }

    /// Send the front of the buffer as one packet of class `size`.
    fn flush(&mut self, size: SizeClass) -> Result<()> {
        let payload = self.buffer.payload(size);
        let frame = packet::frame(self.seq, &payload, size)?;
        self.link.exchange(&frame)?;
        debug!(seq = self.seq, "Sent: {} byte packet", size.payload_len());

        let sent = self.buffer.len().min(size.payload_len());
        self.buffer.consume(sent);
        self.seq = self.seq.wrapping_add(1);
        Ok(())
    }

    /// Flush the last partial packet in the smallest class that holds all of it.
    fn send_tail(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let size = SizeClass::fitting(self.buffer.len()).unwrap_or(SizeClass::Long);
        debug!("Flushing {} remaining bytes", self.buffer.len());
        self.flush(size)
    }

    fn send_eot(&mut self) -> Result<bool> {
        for _ in 0..MAX_EOT_ATTEMPTS {
            self.link.put_byte(EOT)?;
            debug!("Sent: EOT");

            match self.link.get_byte()? {
                Some(ACK) => {
                    debug!("Received: ACK");
                    return Ok(true);
                }
                Some(NAK) => debug!("Received: NAK, resending EOT"),
                Some(b) => debug!("Expected ACK, but 0x{:02X} received", b),
                None => debug!("No answer to EOT"),
            }
        }

        warn!("EOT never acknowledged");
        Ok(false)
    }

    fn require(&self, expected: State, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(YmodemError::State {
                operation,
                state: self.state,
            })
        }
    }

    fn reset(&mut self) {
        self.state = State::Ready;
        self.buffer.clear();
        self.seq = 0;
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Header payload: name, NUL, optional decimal length, zero padding.
/// An empty name gives the all-zero header that closes a batch.
///
/// `FilenameTooLong` reports the size of the whole field, length included.
fn header_payload(filename: &str, length: Option<u64>) -> Result<(SizeClass, Vec<u8>)> {
    let mut payload = filename.as_bytes().to_vec();
    if !filename.is_empty() {
        payload.push(0);
        if let Some(length) = length {
            payload.extend_from_slice(length.to_string().as_bytes());
        }
    }

    let size = SizeClass::fitting(payload.len()).ok_or(YmodemError::FilenameTooLong {
        len: payload.len(),
        max: PACKET_1K_SIZE,
    })?;
    payload.resize(size.payload_len(), 0);
    Ok((size, payload))
}

// ============================================================================
// Tests
// ============================================================================
