//! Frame header and frame-type markers.
//!
//! Every TOYOPUC frame starts with a fixed 4-byte header:
//!
//! | Byte | Field | Description |
//! |------|-------|-------------|
//! | 0 | FT | Frame type (request or response marker) |
//! | 1 | RC | Status: always 0x00 in requests, exception code in responses |
//! | 2 | LL | Length, low byte |
//! | 3 | LH | Length, high byte |
//!
//! The length counts every octet after the header: the function code plus the
//! payload.
//!
//! # Example
//!
//! ```
//! use toyopuc::{FrameHeader, HEADER_SIZE};
//!
//! let header = FrameHeader::new(0x00, 0x00, 5);
//! assert_eq!(header.to_bytes(), [0x00, 0x00, 0x05, 0x00]);
//! assert_eq!(HEADER_SIZE, 4);
//! ```

use crate::error::{Result, ToyopucError};

/// Frame header size in bytes.
pub const HEADER_SIZE: usize = 4;

/// Default frame-type marker of outbound frames.
pub const REQUEST_FRAME_TYPE: u8 = 0x00;

/// Default frame-type marker of inbound frames.
pub const RESPONSE_FRAME_TYPE: u8 = 0x80;

/// Frame-type marker bytes used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameMarkers {
    /// Marker written into byte 0 of every request.
    pub request: u8,
    /// Marker expected in byte 0 of every response.
    pub response: u8,
}

impl FrameMarkers {
    /// Creates a marker pair.
    pub fn new(request: u8, response: u8) -> Self {
        Self { request, response }
    }
}

impl Default for FrameMarkers {
    fn default() -> Self {
        Self::new(REQUEST_FRAME_TYPE, RESPONSE_FRAME_TYPE)
    }
}

/// Fixed frame header (4 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Frame type marker.
    pub frame_type: u8,
    /// Status byte (0x00 = success).
    pub status: u8,
    /// Number of octets following the header.
    pub length: u16,
}

impl FrameHeader {
    /// Creates a new header.
    pub fn new(frame_type: u8, status: u8, length: u16) -> Self {
        Self {
            frame_type,
            status,
            length,
        }
    }

    /// Serializes the header to bytes, length little-endian.
    pub fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let [ll, lh] = self.length.to_le_bytes();
        [self.frame_type, self.status, ll, lh]
    }

    /// Parses a header from bytes.
    ///
    /// # Errors
    ///
    /// Returns `ToyopucError::Framing` if the slice is too short.
    ///
    /// # Example
    ///
    /// ```
    /// use toyopuc::FrameHeader;
    ///
    /// let header = FrameHeader::from_bytes(&[0x80, 0x41, 0x01, 0x00]).unwrap();
    /// assert_eq!(header.frame_type, 0x80);
    /// assert_eq!(header.status, 0x41);
    /// assert_eq!(header.length, 1);
    /// ```
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(ToyopucError::framing(format!(
                "header too short: expected {} bytes, got {}",
                HEADER_SIZE,
                data.len()
            )));
        }

        Ok(Self {
            frame_type: data[0],
            status: data[1],
            length: u16::from_le_bytes([data[2], data[3]]),
        })
    }
}
