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

//! Byte-level plumbing shared by both sessions: timed reads, the cancel
//! sequence, and the send-packet-await-ACK exchange with bounded retries.

use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::error::{Result, YmodemError};
use crate::protocol::*;
use crate::serial::Transport;

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Bound on every single-byte read
    pub timeout: Duration,
    /// Resends of a packet after the first attempt, and the bound on
    /// consecutive receive failures
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            timeout: Duration::from_millis(1000),
            max_retries: 5,
        }
    }
}

/// Single response byte to a packet, after cancel handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Ack,
    Nak,
    Timeout,
    Unexpected(u8),
}

// ============================================================================
// Link
// ============================================================================

pub struct Link {
    transport: Box<dyn Transport>,
    config: Config,
}

impl Link {
    pub fn new(transport: Box<dyn Transport>, config: Config) -> Self {
        Link { transport, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn put_byte(&mut self, byte: u8) -> Result<()> {
        trace!("put 0x{:02X}", byte);
        self.transport.put_byte(byte)?;
        Ok(())
    }

    pub fn put_all(&mut self, bytes: &[u8]) -> Result<()> {
        for &b in bytes {
            self.transport.put_byte(b)?;
        }
        Ok(())
    }

    /// Read one byte, `None` if the timeout elapsed.
    pub fn get_byte(&mut self) -> Result<Option<u8>> {
        let byte = self.transport.get_byte(self.config.timeout)?;
        match byte {
            Some(b) => trace!("got 0x{:02X}", b),
            None => trace!("read timed out"),
        }
        Ok(byte)
    }

    /// Tell the peer to give up on the transfer.
    pub fn send_cancel(&mut self) -> Result<()> {
        debug!("Sent: CA CA");
        self.put_all(&[CA, CA])
    }

    /// Called after a CA was read; true when the next byte confirms it.
    pub fn cancel_confirmed(&mut self) -> Result<bool> {
        let confirmed = self.get_byte()? == Some(CA);
        if confirmed {
            warn!("Received: CA CA (cancelled by peer)");
        } else {
            warn!("Received: single CA");
        }
        Ok(confirmed)
    }

    /// Wait for the peer's answer to a packet.
    pub fn await_response(&mut self) -> Result<Response> {
        match self.get_byte()? {
            Some(ACK) => Ok(Response::Ack),
            Some(NAK) => Ok(Response::Nak),
            Some(CA) => {
                if self.cancel_confirmed()? {
                    Err(YmodemError::Abort)
                } else {
                    Err(YmodemError::Comm)
                }
            }
            Some(b) => Ok(Response::Unexpected(b)),
            None => Ok(Response::Timeout),
        }
    }

    /// Send a framed packet until the peer ACKs it.
    ///
    /// The whole frame is resent after a NAK, a timeout or an unexpected
    /// byte, at most `max_retries` times. Cancel and transport failures end
    /// the exchange immediately.
    pub fn exchange(&mut self, frame: &[u8]) -> Result<()> {
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!(attempt, "Resending packet");
            }

            self.put_all(frame)?;

            match self.await_response()? {
                Response::Ack => {
                    debug!("Received: ACK");
                    return Ok(());
                }
                Response::Nak => debug!("Received: NAK"),
                Response::Timeout => debug!("No response to packet"),
                Response::Unexpected(b) => warn!("Expected ACK or NAK, but 0x{:02X} received", b),
            }
        }

        warn!(retries = self.config.max_retries, "Packet not acknowledged");
        Err(YmodemError::Timeout)
    }

    /// Read up to `attempts` bytes looking for `expected`.
    ///
    /// A confirmed cancel ends the wait with `Abort`; anything else just
    /// uses up an attempt.
    pub fn wait_for(&mut self, expected: u8, attempts: u32) -> Result<()> {
        for _ in 0..attempts {
            match self.get_byte()? {
                Some(b) if b == expected => return Ok(()),
                Some(CA) => {
                    if self.cancel_confirmed()? {
                        return Err(YmodemError::Abort);
                    }
                }
                Some(b) => debug!("Expected 0x{:02X}, but 0x{:02X} received", expected, b),
                None => debug!("Waiting for 0x{:02X}...", expected),
            }
        }

        Err(YmodemError::Timeout)
    }
}

// ============================================================================
// Tests
// ============================================================================
