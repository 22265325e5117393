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

//! YMODEM file transfer over a byte-oriented, half-duplex link.
//!
//! A [`sender::Sender`] and a [`receiver::Receiver`] each own a
//! [`serial::Transport`] and drive it with blocking single-byte reads and
//! writes. Packets carry 128 or 1024 bytes of payload protected by a 16-bit
//! CRC; every packet is acknowledged before the next one is sent.
//!
//! - [`crc`]: CRC-16 over packet payloads
//! - [`packet`]: packet framing and validation
//! - [`link`]: timed reads, cancel handling, send-and-await-ACK with retries
//! - [`sender`]: transmit session: header, data, EOT, closing header
//! - [`receiver`]: receive session: header, data, EOT
//! - [`serial`]: transports: serial port, in-memory pipe

pub mod crc;
pub mod error;
pub mod link;
pub mod packet;
pub mod protocol;
pub mod receiver;
pub mod sender;
pub mod serial;
