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

//! Packet framing.
//!
//! ```text
//! | type | seq | !seq | payload (128 or 1024) | crc hi | crc lo |
//! ```
//!
//! `type` is SOH for a 128-byte payload and STX for a 1024-byte payload.
//! The payload is always full length; short data is zero padded by the caller.

use thiserror::Error;

use crate::crc;
use crate::protocol::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error("payload is {actual} bytes, {expected} required")]
    PayloadLength { expected: usize, actual: usize },

    #[error("unknown packet type 0x{0:02X}")]
    UnknownType(u8),

    #[error("frame is {actual} bytes, {expected} required")]
    FrameLength { expected: usize, actual: usize },

    #[error("sequence 0x{seq:02X} does not match complement 0x{complement:02X}")]
    Complement { seq: u8, complement: u8 },

    #[error("crc mismatch: received 0x{received:04X}, computed 0x{computed:04X}")]
    Crc { received: u16, computed: u16 },
}

/// Payload size of a packet, selected by its type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    /// 128-byte payload, SOH
    Short,
    /// 1024-byte payload, STX
    Long,
}

impl SizeClass {
    pub fn payload_len(self) -> usize {
        match self {
            SizeClass::Short => PACKET_SIZE,
            SizeClass::Long => PACKET_1K_SIZE,
        }
    }

    pub fn type_byte(self) -> u8 {
        match self {
            SizeClass::Short => SOH,
            SizeClass::Long => STX,
        }
    }

    pub fn from_type_byte(byte: u8) -> Option<SizeClass> {
        match byte {
            SOH => Some(SizeClass::Short),
            STX => Some(SizeClass::Long),
            _ => None,
        }
    }

    /// Smallest class whose payload holds `len` bytes, if any.
    pub fn fitting(len: usize) -> Option<SizeClass> {
        if len <= PACKET_SIZE {
            Some(SizeClass::Short)
        } else if len <= PACKET_1K_SIZE {
            Some(SizeClass::Long)
        } else {
            None
        }
    }

    /// Total bytes on the wire for a packet of this class.
    pub fn frame_len(self) -> usize {
        PACKET_HEADER_SIZE + self.payload_len() + PACKET_TRAILER_SIZE
    }
}

/// A validated packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub size: SizeClass,
    pub seq: u8,
    pub payload: Vec<u8>,
}

/// Serialize a packet. `payload` must be exactly the class's payload length.
pub fn frame(seq: u8, payload: &[u8], size: SizeClass) -> Result<Vec<u8>, PacketError> {
    if payload.len() != size.payload_len() {
        return Err(PacketError::PayloadLength {
            expected: size.payload_len(),
            actual: payload.len(),
        });
    }

    let crc = crc::checksum(payload);

    let mut out = Vec::with_capacity(size.frame_len());
    out.push(size.type_byte());
    out.push(seq);
    out.push(!seq);
    out.extend_from_slice(payload);
    out.extend_from_slice(&crc.to_be_bytes());
    Ok(out)
}

/// Deserialize and validate a complete frame, type byte included.
pub fn parse(bytes: &[u8]) -> Result<Packet, PacketError> {
    let Some(&type_byte) = bytes.first() else {
        return Err(PacketError::FrameLength {
            expected: SizeClass::Short.frame_len(),
            actual: 0,
        });
    };
    let size = SizeClass::from_type_byte(type_byte).ok_or(PacketError::UnknownType(type_byte))?;

    if bytes.len() != size.frame_len() {
        return Err(PacketError::FrameLength {
            expected: size.frame_len(),
            actual: bytes.len(),
        });
    }

    let seq = bytes[1];
    let complement = bytes[2];
    if complement != !seq {
        return Err(PacketError::Complement { seq, complement });
    }

    let payload_end = PACKET_HEADER_SIZE + size.payload_len();
    let payload = &bytes[PACKET_HEADER_SIZE..payload_end];
    let received = u16::from_be_bytes([bytes[payload_end], bytes[payload_end + 1]]);
    let computed = crc::checksum(payload);
    if received != computed {
        return Err(PacketError::Crc { received, computed });
    }

    Ok(Packet {
        size,
        seq,
        payload: payload.to_vec(),
    })
}

// ============================================================================
// Tests
// ============================================================================
