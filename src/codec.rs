//! Frame codec: commands to wire octets and back.
//!
//! The codec is pure and stateless apart from the configured frame-type
//! markers. It performs no I/O and no semantic validation; quantity limits are
//! enforced earlier by [`Command::new`](crate::Command::new).
//!
//! # Example
//!
//! ```
//! use toyopuc::{Command, FrameCodec, FunctionCode, Payload};
//!
//! let codec = FrameCodec::default();
//! let cmd = Command::new(
//!     FunctionCode::SequentialProgramReadWord,
//!     None,
//!     Payload::Range { address: 1, quantity: 3 },
//! ).unwrap();
//!
//! let frame = codec.encode(&cmd);
//! assert_eq!(frame, [0x00, 0x00, 0x05, 0x00, 0x18, 0x01, 0x00, 0x03, 0x00]);
//!
//! let reply = [0x80, 0x00, 0x05, 0x00, 0x18, 0xAA, 0xBB, 0xCC, 0xDD];
//! codec.verify(&frame, &reply).unwrap();
//! let response = codec.decode(&reply).unwrap();
//! assert_eq!(response.data, vec![0xAA, 0xBB, 0xCC, 0xDD]);
//! ```

use crate::command::Command;
use crate::error::{Result, ToyopucError};
use crate::header::{FrameHeader, FrameMarkers, HEADER_SIZE};
use crate::response::Response;

/// Minimum decodable frame: header plus function code.
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + 1;

/// Encodes commands into frames and decodes response frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCodec {
    markers: FrameMarkers,
}

impl FrameCodec {
    /// Creates a codec using the given frame-type markers.
    pub fn new(markers: FrameMarkers) -> Self {
        Self { markers }
    }

    /// Returns the configured markers.
    pub fn markers(&self) -> FrameMarkers {
        self.markers
    }

    /// Encodes a command into a request frame.
    ///
    /// The status byte is always 0x00 and the length field counts the
    /// function code plus the payload.
    pub fn encode(&self, command: &Command) -> Vec<u8> {
        let payload = command.payload();
        // Payloads are bounded by the catalog, far below u16::MAX.
        let length = (payload.len() + 1) as u16;
        let header = FrameHeader::new(self.markers.request, 0x00, length);

        let mut frame = Vec::with_capacity(MIN_FRAME_SIZE + payload.len());
        frame.extend_from_slice(&header.to_bytes());
        frame.push(command.function_code().code());
        frame.extend_from_slice(payload);
        frame
    }

    /// Decodes a response frame.
    ///
    /// # Errors
    ///
    /// Returns `ToyopucError::Framing` if the frame is shorter than the header
    /// plus function code.
    pub fn decode(&self, frame: &[u8]) -> Result<Response> {
        if frame.len() < MIN_FRAME_SIZE {
            return Err(ToyopucError::framing(format!(
                "response too short: expected at least {} bytes, got {}",
                MIN_FRAME_SIZE,
                frame.len()
            )));
        }

        let header = FrameHeader::from_bytes(frame)?;
        Ok(Response::new(
            frame[HEADER_SIZE],
            header.status,
            frame[MIN_FRAME_SIZE..].to_vec(),
        ))
    }

    /// Structurally checks a response frame against the request it answers.
    ///
    /// # Errors
    ///
    /// Returns `ToyopucError::Framing` if the frame-type byte is not the
    /// response marker, or the length field disagrees with the number of
    /// octets after the header.
    pub fn verify(&self, _request: &[u8], response: &[u8]) -> Result<()> {
        let header = FrameHeader::from_bytes(response)?;

        if header.frame_type != self.markers.response {
            return Err(ToyopucError::framing(format!(
                "unexpected frame type 0x{:02X}, expected 0x{:02X}",
                header.frame_type, self.markers.response
            )));
        }

        let trailing = response.len() - HEADER_SIZE;
        if header.length as usize != trailing {
            return Err(ToyopucError::framing(format!(
                "length field {} does not match {} trailing bytes",
                header.length, trailing
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{FunctionCode, Payload};

    fn word_read() -> Command {
        Command::new(
            FunctionCode::SequentialProgramReadWord,
            None,
            Payload::Range {
                address: 1,
                quantity: 3,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_encode_word_read() {
        let frame = FrameCodec::default().encode(&word_read());
        assert_eq!(frame, vec![0x00, 0x00, 0x05, 0x00, 0x18, 0x01, 0x00, 0x03, 0x00]);
    }

    #[test]
    fn test_encode_custom_request_marker() {
        let codec = FrameCodec::new(FrameMarkers::new(0x05, 0x85));
        let frame = codec.encode(&word_read());
        assert_eq!(frame[0], 0x05);
        assert_eq!(frame[1], 0x00);
    }

    #[test]
    fn test_encode_bit_write() {
        let cmd = Command::new(
            FunctionCode::IoWriteBit,
            None,
            Payload::BitValue {
                address: 0x2000,
                value: true,
            },
        )
        .unwrap();
        let frame = FrameCodec::default().encode(&cmd);
        assert_eq!(frame, vec![0x00, 0x00, 0x04, 0x00, 0x21, 0x00, 0x20, 0x01]);
    }

    #[test]
    fn test_encode_length_is_little_endian() {
        let values = vec![0u16; 0x200];
        let cmd = Command::new(
            FunctionCode::IoWriteWord,
            None,
            Payload::Words {
                address: 0,
                values: &values,
            },
        )
        .unwrap();
        let frame = FrameCodec::default().encode(&cmd);
        // 1 + 2 + 1024 = 1027 = 0x0403
        assert_eq!(&frame[2..4], &[0x03, 0x04]);
        assert_eq!(frame.len(), HEADER_SIZE + 0x403);
    }

    #[test]
    fn test_decode_with_data() {
        let frame = [0x80, 0x00, 0x05, 0x00, 0x18, 0xAA, 0xBB, 0xCC, 0xDD];
        let response = FrameCodec::default().decode(&frame).unwrap();
        assert_eq!(response.function_code, 0x18);
        assert_eq!(response.status, 0x00);
        assert_eq!(response.data, vec![0xAA, 0xBB, 0xCC, 0xDD]);
    }

    #[test]
    fn test_decode_without_data() {
        let frame = [0x80, 0x41, 0x01, 0x00, 0x21];
        let response = FrameCodec::default().decode(&frame).unwrap();
        assert_eq!(response.function_code, 0x21);
        assert_eq!(response.status, 0x41);
        assert!(response.data.is_empty());
    }

    #[test]
    fn test_decode_too_short() {
        let result = FrameCodec::default().decode(&[0x80, 0x00, 0x01, 0x00]);
        assert!(matches!(result, Err(ToyopucError::Framing { .. })));
    }

    #[test]
    fn test_encode_decode_preserves_code_and_payload() {
        let codec = FrameCodec::default();
        let cmd = Command::new(
            FunctionCode::IoReadMultipointByte,
            None,
            Payload::Points {
                addresses: &[0x0001, 0x0100, 0xFFFF],
            },
        )
        .unwrap();
        let mut frame = codec.encode(&cmd);
        // Turn the request into a synthetic reply.
        frame[0] = codec.markers().response;
        codec.verify(&[], &frame).unwrap();
        let response = codec.decode(&frame).unwrap();
        assert_eq!(response.function_code, cmd.function_code().code());
        assert_eq!(response.data, cmd.payload());
    }

    #[test]
    fn test_verify_accepts_well_formed() {
        let frame = [0x80, 0x00, 0x03, 0x00, 0x20, 0x01, 0x00];
        assert!(FrameCodec::default().verify(&[], &frame).is_ok());
    }

    #[test]
    fn test_verify_rejects_wrong_frame_type() {
        let frame = [0x00, 0x00, 0x03, 0x00, 0x20, 0x01, 0x00];
        let result = FrameCodec::default().verify(&[], &frame);
        assert!(matches!(result, Err(ToyopucError::Framing { .. })));
    }

    #[test]
    fn test_verify_uses_configured_response_marker() {
        let codec = FrameCodec::new(FrameMarkers::new(0x00, 0x81));
        let frame = [0x81, 0x00, 0x01, 0x00, 0x20];
        assert!(codec.verify(&[], &frame).is_ok());

        let frame = [0x80, 0x00, 0x01, 0x00, 0x20];
        assert!(codec.verify(&[], &frame).is_err());
    }

    #[test]
    fn test_verify_rejects_length_mismatch() {
        let short = [0x80, 0x00, 0x05, 0x00, 0x20, 0x01];
        assert!(FrameCodec::default().verify(&[], &short).is_err());

        let long = [0x80, 0x00, 0x01, 0x00, 0x20, 0x01];
        assert!(FrameCodec::default().verify(&[], &long).is_err());
    }

    #[test]
    fn test_verify_rejects_truncated_header() {
        assert!(FrameCodec::default().verify(&[], &[0x80, 0x00]).is_err());
    }
}
