//! Best-effort extraction of a single image packet from one serial read.
//!
//! A packet on the wire looks like:
//!
//! ```text
//! [0x00][0xFF][length: u16 LE][metadata: 16 bytes][payload ...][0xDD?]
//! ```
//!
//! The read is not aligned to packet boundaries, so the header is searched for,
//! the payload is clamped to whatever the read actually holds, and the trailing
//! `0xDD` is only reported, never required. Only the first packet of a read is
//! looked at; anything after it is dropped.

use log::debug;

use crate::constants::{HEADER, LENGTH_SIZE, METADATA_SKIP, TERMINATOR};

/// Why a read produced nothing to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// The serial link returned no bytes.
    EmptyRead,
    /// No `0x00 0xFF` pair anywhere in the read.
    HeaderNotFound,
    /// The header was found but fewer than two length bytes follow it.
    ShortLength,
    /// After clamping to the read, no payload bytes remain.
    EmptyPayload,
}

/// A packet located inside one read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Index of the `0x00` header byte within the read.
    pub header_offset: usize,
    /// Length as declared by the device, before clamping.
    pub packet_length: u16,
    /// Payload bytes actually available in the read.
    pub payload: &'a [u8],
    /// Set when the declared length ran past the end of the read.
    pub truncated: bool,
    /// Set when `0xDD` immediately follows the payload.
    pub terminator_present: bool,
}

/// Result of decoding one read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded<'a> {
    /// The device sent a zero-length packet, meaning its view is blocked.
    Blocked { header_offset: usize },
    /// A packet with at least one payload byte.
    Frame(Frame<'a>),
    /// Nothing usable in this read.
    Skipped(Skip),
}

/// Locates the first header in `chunk`.
pub fn find_header(chunk: &[u8]) -> Option<usize> {
    chunk.windows(HEADER.len()).position(|pair| pair == HEADER)
}

/// Decodes at most one packet from `chunk`.
///
/// Never reads outside `chunk`. The payload window starts after the length field
/// and metadata and spans the declared length, clamped to the end of the read.
pub fn decode(chunk: &[u8]) -> Decoded<'_> {
    if chunk.is_empty() {
        return Decoded::Skipped(Skip::EmptyRead);
    }

    let Some(header_offset) = find_header(chunk) else {
        debug!("No header in {} byte read", chunk.len());
        return Decoded::Skipped(Skip::HeaderNotFound);
    };

    let mut cursor = header_offset + HEADER.len();
    let Some(length_bytes) = chunk.get(cursor..cursor + LENGTH_SIZE) else {
        debug!(
            "Header at {} but the read ends before the packet length",
            header_offset
        );
        return Decoded::Skipped(Skip::ShortLength);
    };
    let packet_length = u16::from_le_bytes([length_bytes[0], length_bytes[1]]);

    debug!(
        "[{}] Packet length: {}, bytes: {:02X?}",
        header_offset, packet_length, length_bytes
    );

    if packet_length == 0 {
        return Decoded::Blocked { header_offset };
    }

    cursor += METADATA_SKIP;

    let declared = usize::from(packet_length);
    let available = chunk.len().saturating_sub(cursor);
    let length = declared.min(available);
    let truncated = length < declared;
    if truncated {
        debug!(
            "Packet declares {} bytes but only {} remain in the read",
            declared, available
        );
    }

    let payload = chunk.get(cursor..cursor + length).unwrap_or(&[]);
    let terminator_present = chunk.get(cursor + length) == Some(&TERMINATOR);
    if !terminator_present && !truncated {
        debug!("Byte at end of packet is not {:02X}", TERMINATOR);
    }

    if payload.is_empty() {
        return Decoded::Skipped(Skip::EmptyPayload);
    }

    Decoded::Frame(Frame {
        header_offset,
        packet_length,
        payload,
        truncated,
        terminator_present,
    })
}
