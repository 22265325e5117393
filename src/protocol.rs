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

//! YMODEM protocol constants and session states

use std::fmt;

/// Start of header - begins a 128-byte packet
pub const SOH: u8 = 0x01;

/// Start of text - begins a 1024-byte packet
pub const STX: u8 = 0x02;

/// End of transmission - sender has no more data for the current file
pub const EOT: u8 = 0x04;

/// Acknowledge - packet accepted
pub const ACK: u8 = 0x06;

/// Negative acknowledge - packet rejected, resend it
pub const NAK: u8 = 0x15;

/// Cancel - two in succession abort the transfer
pub const CA: u8 = 0x18;

/// 'C' - receiver requests a transfer using 16-bit CRC
pub const CRC_REQUEST: u8 = b'C';

/// Payload length of a SOH packet
pub const PACKET_SIZE: usize = 128;

/// Payload length of a STX packet
pub const PACKET_1K_SIZE: usize = 1024;

/// Bytes before the payload: type, sequence, complement
pub const PACKET_HEADER_SIZE: usize = 3;

/// Bytes after the payload: CRC high, CRC low
pub const PACKET_TRAILER_SIZE: usize = 2;

/// Number of EOT bytes sent while waiting for the receiver's ACK
pub const MAX_EOT_ATTEMPTS: usize = 10;

/// Protocol state of a sender or receiver session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Idle, no handshake done
    Ready,
    /// Sender waiting for the receiver's 'C' and header ACK
    AwaitingHandshake,
    /// Receiver waiting for a header packet
    AwaitingHeader,
    /// Sender accepting file data
    Transmitting,
    /// Receiver delivering file data
    Receiving,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Ready => "Ready",
            State::AwaitingHandshake => "AwaitingHandshake",
            State::AwaitingHeader => "AwaitingHeader",
            State::Transmitting => "Transmitting",
            State::Receiving => "Receiving",
        };
        f.write_str(name)
    }
}
