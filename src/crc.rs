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

//! CRC-16 (polynomial 0x1021) used to protect every packet payload

const POLY: u32 = 0x1021;

/// Shift one byte, MSB first, through the CRC register.
///
/// The data bits enter at the bottom of the register, so the result only
/// becomes the packet CRC after two zero bytes have been pushed through.
pub fn update(crc: u16, byte: u8) -> u16 {
    let mut crc = crc as u32;
    let mut input = byte as u32 | 0x100;

    loop {
        crc <<= 1;
        input <<= 1;
        if input & 0x100 != 0 {
            crc += 1;
        }
        if crc & 0x10000 != 0 {
            crc ^= POLY;
        }
        if input & 0x10000 != 0 {
            break;
        }
    }

    (crc & 0xFFFF) as u16
}

/// CRC of a packet payload, as sent high byte first after the payload.
pub fn checksum(payload: &[u8]) -> u16 {
    let crc = payload.iter().fold(0u16, |crc, &b| update(crc, b));
    update(update(crc, 0), 0)
}

// ============================================================================
// Tests
// ============================================================================
