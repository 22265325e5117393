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
use crate::packet::{self, Packet, PacketError, SizeClass};
use crate::protocol::*;
use crate::serial::Transport;

// ============================================================================
// Results
// ============================================================================

/// Contents of a file header packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub name: String,
    /// Length announced after the name, if the sender included one
    pub length: Option<u64>,
}

/// Result of [`Receiver::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Start {
    File(FileHeader),
    /// Empty header: the sender has no more files
    EndOfBatch,
}

/// Result of [`Receiver::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Data(Vec<u8>),
    EndOfFile,
}

/// What arrived when a packet was expected.
enum Incoming {
    Packet(Packet),
    Eot,
    Invalid(PacketError),
    Noise(u8),
    Timeout,
}

// ============================================================================
// Receiver
// ============================================================================

/// Receive half of a YMODEM transfer.
pub struct Receiver {
    link: Link,
    state: State,
    expected_seq: u8,
    remaining: Option<u64>,
    /// No data packet accepted yet for the current file
    header_only: bool,
}

impl Receiver {
    pub fn new(transport: Box<dyn Transport>, config: Config) -> Self {
        Receiver {
            link: Link::new(transport, config),
            state: State::Ready,
            expected_seq: 0,
            remaining: None,
            header_only: false,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Request a header with 'C' until one arrives.
    ///
    /// A file header is ACKed and followed by another 'C' asking for data.
    /// Names longer than `max_filename_len` bytes cancel the transfer.
    pub fn start(&mut self, max_filename_len: usize) -> Result<Start> {
        self.require(State::Ready, "start")?;
        self.state = State::AwaitingHeader;

        match self.await_header(max_filename_len) {
            Ok(Start::File(header)) => {
                info!(name = %header.name, length = ?header.length, "Receiving file");
                self.state = State::Receiving;
                self.expected_seq = 1;
                self.remaining = header.length;
                self.header_only = true;
                Ok(Start::File(header))
            }
            Ok(Start::EndOfBatch) => {
                info!("End of batch");
                self.reset();
                Ok(Start::EndOfBatch)
            }
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    /// Receive the next data packet, or the end of the current file.
    pub fn next(&mut self) -> Result<Chunk> {
        self.require(State::Receiving, "next")?;

        match self.next_chunk() {
            Ok(Chunk::EndOfFile) => {
                info!("End of file");
                self.reset();
                Ok(Chunk::EndOfFile)
            }
            Ok(chunk) => Ok(chunk),
            Err(e) => {
                self.reset();
                Err(e)
            }
        }
    }

    /// Send the two-byte cancel sequence and drop the transfer.
    pub fn cancel(&mut self) -> Result<()> {
        self.reset();
        self.link.send_cancel()
    }

    fn await_header(&mut self, max_filename_len: usize) -> Result<Start> {
        let retries = self.link.config().max_retries;

        for _ in 0..=retries {
            self.link.put_byte(CRC_REQUEST)?;
            debug!("Sent: 'C'");

            match self.read_packet()? {
                Incoming::Packet(p) if p.seq == 0 => return self.accept_header(&p, max_filename_len),
                Incoming::Packet(p) => warn!("Expected header, got packet {}", p.seq),
                Incoming::Eot => {
                    // Sender missed our ACK for the previous file's EOT
                    debug!("Received: stray EOT");
                    self.link.put_byte(ACK)?;
                }
                Incoming::Invalid(e) => debug!("Bad header packet: {}", e),
                Incoming::Noise(b) => debug!("Expected header, but 0x{:02X} received", b),
                Incoming::Timeout => debug!("Waiting for header..."),
            }
        }

        Err(YmodemError::Timeout)
    }

    fn accept_header(&mut self, header: &Packet, max_filename_len: usize) -> Result<Start> {
        let payload = &header.payload;
        let name_len = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());

        if name_len == 0 {
            self.link.put_byte(ACK)?;
            debug!("Received: empty header, sent ACK");
            return Ok(Start::EndOfBatch);
        }

        if name_len > max_filename_len {
            warn!(name_len, max_filename_len, "Filename too long, cancelling");
            self.link.send_cancel()?;
            return Err(YmodemError::FilenameTooLong {
                len: name_len,
                max: max_filename_len,
            });
        }

        let name = String::from_utf8_lossy(&payload[..name_len]).into_owned();
        let length = parse_length(&payload[name_len..]);

        self.link.put_byte(ACK)?;
        self.link.put_byte(CRC_REQUEST)?;
        debug!("Sent: ACK 'C'");

        Ok(Start::File(FileHeader { name, length }))
    }

    fn next_chunk(&mut self) -> Result<Chunk> {
        let retries = self.link.config().max_retries;
        let max_noise = (retries as usize + 1) * SizeClass::Long.frame_len();
        let mut errors = 0;
        let mut noise = 0;

        loop {
            match self.read_packet()? {
                Incoming::Eot => {
                    self.link.put_byte(ACK)?;
                    debug!("Received: EOT, sent ACK");
                    return Ok(Chunk::EndOfFile);
                }
                Incoming::Packet(p) if p.seq == self.expected_seq => {
                    self.link.put_byte(ACK)?;
                    debug!(seq = p.seq, "Received: {} byte packet", p.size.payload_len());
                    self.expected_seq = self.expected_seq.wrapping_add(1);
                    self.header_only = false;
                    return Ok(Chunk::Data(self.trim(p.payload)));
                }
                Incoming::Packet(p) if p.seq == 0 && self.header_only => {
                    // Header ACK was lost; the sender still waits for 'C'
                    self.link.put_byte(ACK)?;
                    self.link.put_byte(CRC_REQUEST)?;
                    debug!("Received: repeated header, sent ACK 'C'");
                    continue;
                }
                Incoming::Packet(p) if p.seq == self.expected_seq.wrapping_sub(1) => {
                    // Our ACK was lost and the sender repeated the packet
                    self.link.put_byte(ACK)?;
                    debug!(seq = p.seq, "Received: duplicate packet, sent ACK");
                    continue;
                }
                Incoming::Packet(p) => {
                    warn!("Expected packet {}, got {}", self.expected_seq, p.seq);
                    self.link.put_byte(NAK)?;
                }
                Incoming::Invalid(e) => {
                    warn!("Bad packet: {}", e);
                    self.link.put_byte(NAK)?;
                }
                Incoming::Timeout => {
                    debug!("No packet, sent NAK");
                    self.link.put_byte(NAK)?;
                }
                Incoming::Noise(b) => {
                    debug!("Expected packet, but 0x{:02X} received", b);
                    noise += 1;
                    if noise > max_noise {
                        warn!(noise, "Line noise, giving up on packet {}", self.expected_seq);
                        return Err(YmodemError::Timeout);
                    }
                    continue;
                }
            }

            errors += 1;
            if errors > retries {
                warn!(errors, "Giving up on packet {}", self.expected_seq);
                return Err(YmodemError::Timeout);
            }
        }
    }

    /// Read one packet start byte and, for SOH/STX, the rest of the frame.
    fn read_packet(&mut self) -> Result<Incoming> {
        let Some(first) = self.link.get_byte()? else {
            return Ok(Incoming::Timeout);
        };

        let size = match first {
            EOT => return Ok(Incoming::Eot),
            CA => {
                return if self.link.cancel_confirmed()? {
                    Err(YmodemError::Abort)
                } else {
                    Err(YmodemError::Comm)
                };
            }
            b => match SizeClass::from_type_byte(b) {
                Some(size) => size,
                None => return Ok(Incoming::Noise(b)),
            },
        };

        let mut frame = Vec::with_capacity(size.frame_len());
        frame.push(first);
        while frame.len() < size.frame_len() {
            match self.link.get_byte()? {
                Some(b) => frame.push(b),
                None => {
                    return Ok(Incoming::Invalid(PacketError::FrameLength {
                        expected: size.frame_len(),
                        actual: frame.len(),
                    }));
                }
            }
        }

        Ok(match packet::parse(&frame) {
            Ok(p) => Incoming::Packet(p),
            Err(e) => Incoming::Invalid(e),
        })
    }

    /// Cut the padding off once the announced length has been delivered.
    fn trim(&mut self, mut payload: Vec<u8>) -> Vec<u8> {
        if let Some(remaining) = self.remaining {
            let keep = remaining.min(payload.len() as u64);
            payload.truncate(keep as usize);
            self.remaining = Some(remaining - keep);
        }
        payload
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
        self.expected_seq = 0;
        self.remaining = None;
        self.header_only = false;
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Decimal length following the name's NUL terminator, if present.
fn parse_length(after_name: &[u8]) -> Option<u64> {
    let field = after_name.get(1..)?;
    let digits = field.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    std::str::from_utf8(&field[..digits]).ok()?.parse().ok()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::frame;
    use crate::serial::MockSerialPort;
    use std::time::Duration;

    const C: u8 = CRC_REQUEST;

    fn config() -> Config {
        Config {
            timeout: Duration::from_millis(10),
            max_retries: 3,
        }
    }

    fn receiver(responses: Vec<Option<u8>>, expected_writes: Vec<u8>) -> Receiver {
        Receiver::new(Box::new(MockSerialPort::new(responses, expected_writes)), config())
    }

    fn wire(bytes: &[u8]) -> Vec<Option<u8>> {
        bytes.iter().map(|&b| Some(b)).collect()
    }

    fn header_frame(contents: &[u8]) -> Vec<u8> {
        let mut payload = contents.to_vec();
        payload.resize(128, 0);
        frame(0, &payload, SizeClass::Short).unwrap()
    }

    fn data_frame(seq: u8, data: &[u8], size: SizeClass) -> Vec<u8> {
        let mut payload = data.to_vec();
        payload.resize(size.payload_len(), 0);
        frame(seq, &payload, size).unwrap()
    }

    fn file(name: &str, length: Option<u64>) -> Start {
        Start::File(FileHeader { name: name.to_string(), length })
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length(b"\x004096\0\0"), Some(4096));
        assert_eq!(parse_length(b"\x0012 0644"), Some(12));
        assert_eq!(parse_length(b"\0\0\0"), None);
        assert_eq!(parse_length(b""), None);
        assert_eq!(parse_length(b"\x0099999999999999999999999"), None);
    }

    #[test]
    fn test_receiver_start_reads_header() {
        let responses = wire(&header_frame(b"test.bin\0"));
        let mut receiver = receiver(responses, vec![C, ACK, C]);

        assert_eq!(receiver.start(64).unwrap(), file("test.bin", None));
        assert_eq!(receiver.state(), State::Receiving);
        assert_eq!(receiver.expected_seq, 1);
    }

    #[test]
    fn test_receiver_start_reads_length() {
        let responses = wire(&header_frame(b"fw.img\x004096"));
        let mut receiver = receiver(responses, vec![C, ACK, C]);
        assert_eq!(receiver.start(64).unwrap(), file("fw.img", Some(4096)));
    }

    #[test]
    fn test_receiver_start_accepts_1k_header() {
        let name = "n".repeat(200);
        let mut payload = name.clone().into_bytes();
        payload.resize(1024, 0);
        let responses = wire(&frame(0, &payload, SizeClass::Long).unwrap());

        let mut receiver = receiver(responses, vec![C, ACK, C]);
        assert_eq!(receiver.start(255).unwrap(), file(&name, None));
    }

    #[test]
    fn test_receiver_start_retries_after_timeout_and_bad_header() {
        let good = header_frame(b"a.txt\0");
        let mut bad = good.clone();
        bad[40] ^= 0xFF;

        let mut responses = vec![None];
        responses.extend(wire(&bad));
        responses.push(Some(b'?'));
        responses.extend(wire(&good));

        let mut receiver = receiver(responses, vec![C, C, C, C, ACK, C]);
        assert_eq!(receiver.start(64).unwrap(), file("a.txt", None));
    }

    #[test]
    fn test_receiver_start_ignores_non_zero_sequence() {
        let mut payload = b"a.txt".to_vec();
        payload.resize(128, 0);
        let mut responses = wire(&frame(3, &payload, SizeClass::Short).unwrap());
        responses.extend(wire(&header_frame(b"a.txt\0")));

        let mut receiver = receiver(responses, vec![C, C, ACK, C]);
        assert_eq!(receiver.start(64).unwrap(), file("a.txt", None));
    }

    #[test]
    fn test_receiver_start_times_out() {
        let mut receiver = receiver(vec![], vec![C, C, C, C]);
        assert!(matches!(receiver.start(64), Err(YmodemError::Timeout)));
        assert_eq!(receiver.state(), State::Ready);
    }

    #[test]
    fn test_receiver_start_end_of_batch() {
        let responses = wire(&header_frame(b""));
        let mut receiver = receiver(responses, vec![C, ACK]);
        assert_eq!(receiver.start(64).unwrap(), Start::EndOfBatch);
        assert_eq!(receiver.state(), State::Ready);
    }

    #[test]
    fn test_receiver_start_filename_too_long() {
        let responses = wire(&header_frame(b"longname.bin\0"));
        let mut receiver = receiver(responses, vec![C, CA, CA]);
        assert!(matches!(
            receiver.start(4),
            Err(YmodemError::FilenameTooLong { len: 12, max: 4 })
        ));
        assert_eq!(receiver.state(), State::Ready);
    }

    #[test]
    fn test_receiver_start_abort() {
        let mut receiver = receiver(vec![Some(CA), Some(CA)], vec![C]);
        assert!(matches!(receiver.start(64), Err(YmodemError::Abort)));
        assert_eq!(receiver.state(), State::Ready);
    }

    #[test]
    fn test_receiver_full_transfer() {
        let mut responses = wire(&header_frame(b"small.txt\0"));
        responses.extend(wire(&data_frame(1, &[0xAA; 1024], SizeClass::Long)));
        responses.extend(wire(&data_frame(2, b"Test data", SizeClass::Short)));
        responses.push(Some(EOT));

        let mut receiver = receiver(responses, vec![C, ACK, C, ACK, ACK, ACK]);
        assert_eq!(receiver.start(64).unwrap(), file("small.txt", None));
        assert_eq!(receiver.next().unwrap(), Chunk::Data(vec![0xAA; 1024]));

        let mut expected = b"Test data".to_vec();
        expected.resize(128, 0);
        assert_eq!(receiver.next().unwrap(), Chunk::Data(expected));

        assert_eq!(receiver.next().unwrap(), Chunk::EndOfFile);
        assert_eq!(receiver.state(), State::Ready);
    }

    #[test]
    fn test_receiver_nak_on_bad_crc_then_accepts_resend() {
        let good = data_frame(1, b"payload", SizeClass::Short);
        let mut corrupted = good.clone();
        let last = corrupted.len() - 1;
        corrupted[last] ^= 0x5A;

        let mut responses = wire(&header_frame(b"crc.bin\0"));
        responses.extend(wire(&corrupted));
        responses.extend(wire(&good));

        let mut receiver = receiver(responses, vec![C, ACK, C, NAK, ACK]);
        receiver.start(64).unwrap();

        let mut expected = b"payload".to_vec();
        expected.resize(128, 0);
        assert_eq!(receiver.next().unwrap(), Chunk::Data(expected));
        assert_eq!(receiver.expected_seq, 2);
    }

    #[test]
    fn test_receiver_bad_packet_does_not_advance_sequence() {
        let good = data_frame(1, b"x", SizeClass::Short);
        let mut corrupted = good.clone();
        corrupted[10] ^= 0x01;

        // Corrupted packet, then nothing: NAK for each failure until the budget runs out
        let mut responses = wire(&header_frame(b"crc.bin\0"));
        responses.extend(wire(&corrupted));

        let mut receiver = receiver(responses, vec![C, ACK, C, NAK, NAK, NAK, NAK]);
        receiver.start(64).unwrap();
        assert!(matches!(receiver.next(), Err(YmodemError::Timeout)));
        assert_eq!(receiver.state(), State::Ready);
    }

    #[test]
    fn test_receiver_truncated_packet_is_nakked() {
        let good = data_frame(1, b"abc", SizeClass::Short);

        let mut responses = wire(&header_frame(b"t\0"));
        responses.extend(wire(&good[..50]));
        responses.push(None);
        responses.extend(wire(&good));

        let mut receiver = receiver(responses, vec![C, ACK, C, NAK, ACK]);
        receiver.start(64).unwrap();
        assert!(matches!(receiver.next().unwrap(), Chunk::Data(_)));
    }

    #[test]
    fn test_receiver_duplicate_packet_acked_not_delivered() {
        let first = data_frame(1, b"one", SizeClass::Short);
        let second = data_frame(2, b"two", SizeClass::Short);

        let mut responses = wire(&header_frame(b"dup\0"));
        responses.extend(wire(&first));
        responses.extend(wire(&first));
        responses.extend(wire(&second));

        let mut receiver = receiver(responses, vec![C, ACK, C, ACK, ACK, ACK]);
        receiver.start(64).unwrap();

        let Chunk::Data(one) = receiver.next().unwrap() else { panic!("Expected data") };
        assert_eq!(&one[..3], b"one");
        let Chunk::Data(two) = receiver.next().unwrap() else { panic!("Expected data") };
        assert_eq!(&two[..3], b"two");
    }

    #[test]
    fn test_receiver_repeated_header_gets_second_c() {
        // Sender missed the header ACK and sent the header again
        let header = header_frame(b"again.bin\0");
        let mut responses = wire(&header);
        responses.extend(wire(&header));
        responses.extend(wire(&data_frame(1, b"data", SizeClass::Short)));

        let mut receiver = receiver(responses, vec![C, ACK, C, ACK, C, ACK]);
        assert_eq!(receiver.start(64).unwrap(), file("again.bin", None));

        let Chunk::Data(d) = receiver.next().unwrap() else { panic!("Expected data") };
        assert_eq!(&d[..4], b"data");
        assert_eq!(receiver.expected_seq, 2);
    }

    #[test]
    fn test_receiver_data_packet_zero_after_wrap_is_plain_duplicate() {
        let mut responses = wire(&header_frame(b"w\0"));
        for seq in 1..=255u8 {
            responses.extend(wire(&data_frame(seq, &[seq], SizeClass::Short)));
        }
        let zero = data_frame(0, &[0], SizeClass::Short);
        responses.extend(wire(&zero));
        responses.extend(wire(&zero));
        responses.push(Some(EOT));

        let mut expected_writes = vec![C, ACK, C];
        expected_writes.extend(std::iter::repeat(ACK).take(255 + 2 + 1));

        let mut receiver = receiver(responses, expected_writes);
        receiver.start(64).unwrap();
        for _ in 0..256 {
            assert!(matches!(receiver.next().unwrap(), Chunk::Data(_)));
        }
        assert_eq!(receiver.next().unwrap(), Chunk::EndOfFile);
    }

    #[test]
    fn test_receiver_noise_does_not_use_retry_budget() {
        let mut responses = wire(&header_frame(b"n\0"));
        responses.extend(wire(&[b'?'; 20]));
        responses.extend(wire(&data_frame(1, b"ok", SizeClass::Short)));

        let mut receiver = receiver(responses, vec![C, ACK, C, ACK]);
        receiver.start(64).unwrap();
        assert!(matches!(receiver.next().unwrap(), Chunk::Data(_)));
    }

    #[test]
    fn test_receiver_endless_noise_times_out() {
        let max_noise = (config().max_retries as usize + 1) * SizeClass::Long.frame_len();
        let mut responses = wire(&header_frame(b"n\0"));
        responses.extend(std::iter::repeat(Some(b'?')).take(max_noise + 1));

        let mut receiver = receiver(responses, vec![C, ACK, C]);
        receiver.start(64).unwrap();
        assert!(matches!(receiver.next(), Err(YmodemError::Timeout)));
        assert_eq!(receiver.state(), State::Ready);
    }

    #[test]
    fn test_receiver_wrong_sequence_nakked() {
        let mut responses = wire(&header_frame(b"seq\0"));
        responses.extend(wire(&data_frame(5, b"?", SizeClass::Short)));
        responses.extend(wire(&data_frame(1, b"!", SizeClass::Short)));

        let mut receiver = receiver(responses, vec![C, ACK, C, NAK, ACK]);
        receiver.start(64).unwrap();
        assert!(matches!(receiver.next().unwrap(), Chunk::Data(_)));
    }

    #[test]
    fn test_receiver_abort_mid_transfer() {
        let mut responses = wire(&header_frame(b"abort\0"));
        responses.extend(wire(&data_frame(1, b"a", SizeClass::Short)));
        responses.extend([Some(CA), Some(CA)]);

        let mut receiver = receiver(responses, vec![C, ACK, C, ACK]);
        receiver.start(64).unwrap();
        receiver.next().unwrap();
        assert!(matches!(receiver.next(), Err(YmodemError::Abort)));
        assert_eq!(receiver.state(), State::Ready);
        assert!(matches!(receiver.next(), Err(YmodemError::State { .. })));
    }

    #[test]
    fn test_receiver_single_cancel_is_comm_error() {
        let mut responses = wire(&header_frame(b"c\0"));
        responses.extend([Some(CA), Some(0x01)]);

        let mut receiver = receiver(responses, vec![C, ACK, C]);
        receiver.start(64).unwrap();
        assert!(matches!(receiver.next(), Err(YmodemError::Comm)));
    }

    #[test]
    fn test_receiver_trims_to_announced_length() {
        let data: Vec<u8> = (0..1100u32).map(|i| (i % 200) as u8 + 1).collect();

        let mut responses = wire(&header_frame(b"len.bin\x001100"));
        responses.extend(wire(&data_frame(1, &data[..1024], SizeClass::Long)));
        responses.extend(wire(&data_frame(2, &data[1024..], SizeClass::Short)));
        responses.push(Some(EOT));

        let mut receiver = receiver(responses, vec![C, ACK, C, ACK, ACK, ACK]);
        receiver.start(64).unwrap();

        let mut received = Vec::new();
        while let Chunk::Data(d) = receiver.next().unwrap() {
            received.extend(d);
        }
        assert_eq!(received, data);
    }

    #[test]
    fn test_receiver_sequence_wraps() {
        let packets = 257usize;
        let mut responses = wire(&header_frame(b"wrap\0"));
        for i in 0..packets {
            responses.extend(wire(&data_frame((i + 1) as u8, &[i as u8], SizeClass::Short)));
        }
        responses.push(Some(EOT));

        let mut expected_writes = vec![C, ACK, C];
        expected_writes.extend(std::iter::repeat(ACK).take(packets + 1));

        let mut receiver = receiver(responses, expected_writes);
        receiver.start(64).unwrap();
        for i in 0..packets {
            let Chunk::Data(d) = receiver.next().unwrap() else { panic!("Expected data") };
            assert_eq!(d[0], i as u8);
        }
        assert_eq!(receiver.expected_seq, 2);
        assert_eq!(receiver.next().unwrap(), Chunk::EndOfFile);
    }

    #[test]
    fn test_receiver_state_errors_do_no_io() {
        let mut receiver = receiver(vec![], vec![]);
        assert!(matches!(
            receiver.next(),
            Err(YmodemError::State { operation: "next", state: State::Ready })
        ));
    }

    #[test]
    fn test_receiver_cancel() {
        let responses = wire(&header_frame(b"x\0"));
        let mut receiver = receiver(responses, vec![C, ACK, C, CA, CA]);
        receiver.start(64).unwrap();
        receiver.cancel().unwrap();
        assert_eq!(receiver.state(), State::Ready);
    }
}
