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

use thiserror::Error;

use crate::packet::PacketError;
use crate::protocol::State;

/// Errors surfaced by the sender and receiver sessions.
///
/// Every error resets the session to [`State::Ready`].
#[derive(Debug, Error)]
pub enum YmodemError {
    /// Operation called in a state that does not allow it.
    #[error("{operation} not allowed in state {state}")]
    State {
        operation: &'static str,
        state: State,
    },

    /// Header field (name, NUL, length) does not fit in a packet, or the
    /// name exceeds the receiver's limit.
    #[error("filename too long: {len} bytes (max {max})")]
    FilenameTooLong { len: usize, max: usize },

    /// Handshake or retry budget exhausted.
    #[error("timed out waiting for peer")]
    Timeout,

    /// Peer sent the two-byte cancel sequence.
    #[error("transfer aborted by peer")]
    Abort,

    /// Peer sent a single cancel byte that was not confirmed by a second one.
    #[error("communication error: unconfirmed cancel from peer")]
    Comm,

    /// Malformed packet.
    #[error("format error: {0}")]
    Format(#[from] PacketError),

    /// The transport failed to send or receive a byte.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, YmodemError>;
