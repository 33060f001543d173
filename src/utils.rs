//! Conversion helpers for register data.
//!
//! Read operations return raw payload octets. These helpers turn them into
//! words or bits the way the PLC packs them: 16-bit words little-endian, one
//! octet per bit with 0x01 meaning ON.
//!
//! # Example
//!
//! ```
//! use toyopuc::utils::{bits_from_bytes, words_from_le_bytes, words_to_le_bytes};
//!
//! let words = words_from_le_bytes(&[0xAA, 0xBB, 0x05, 0x00]).unwrap();
//! assert_eq!(words, vec![0xBBAA, 0x0005]);
//! assert_eq!(words_to_le_bytes(&words), vec![0xAA, 0xBB, 0x05, 0x00]);
//!
//! assert_eq!(bits_from_bytes(&[0x01, 0x00]), vec![true, false]);
//! ```

use crate::error::{Result, ToyopucError};

/// Converts octets to little-endian 16-bit words.
///
/// # Errors
///
/// Returns `ToyopucError::Framing` if the length is odd.
pub fn words_from_le_bytes(data: &[u8]) -> Result<Vec<u16>> {
    if data.len() % 2 != 0 {
        return Err(ToyopucError::framing(format!(
            "data length {} must be even for word conversion",
            data.len()
        )));
    }

    Ok(data
        .chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .collect())
}

/// Converts 16-bit words to little-endian octets.
///
/// # Example
///
/// ```
/// use toyopuc::utils::words_to_le_bytes;
///
/// assert_eq!(words_to_le_bytes(&[0x1234]), vec![0x34, 0x12]);
/// ```
pub fn words_to_le_bytes(words: &[u16]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_le_bytes()).collect()
}

/// Converts one-octet-per-bit data to booleans (0x01 = ON).
pub fn bits_from_bytes(data: &[u8]) -> Vec<bool> {
    data.iter().map(|&value| value == 0x01).collect()
}

/// Converts booleans to one octet per bit (ON = 0x01, OFF = 0x00).
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.iter().map(|&bit| u8::from(bit)).collect()
}

/// Formats a frame as space-separated hex octets, e.g. `"00 00 05 00 18"`.
pub fn format_frame(frame: &[u8]) -> String {
    frame
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_from_le_bytes() {
        let words = words_from_le_bytes(&[0x34, 0x12, 0xCD, 0xAB]).unwrap();
        assert_eq!(words, vec![0x1234, 0xABCD]);
    }

    #[test]
    fn test_words_from_le_bytes_empty() {
        assert!(words_from_le_bytes(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_words_from_le_bytes_odd() {
        let result = words_from_le_bytes(&[0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(ToyopucError::Framing { .. })));
    }

    #[test]
    fn test_words_roundtrip() {
        let words = [0x0001, 0xFFFF, 0x8000];
        assert_eq!(
            words_from_le_bytes(&words_to_le_bytes(&words)).unwrap(),
            words.to_vec()
        );
    }

    #[test]
    fn test_bits() {
        assert_eq!(bits_to_bytes(&[true, false, true]), vec![0x01, 0x00, 0x01]);
        assert_eq!(bits_from_bytes(&[0x01, 0x00, 0x02]), vec![true, false, false]);
    }

    #[test]
    fn test_format_frame() {
        assert_eq!(format_frame(&[0x00, 0x80, 0x0A, 0xFF]), "00 80 0A FF");
        assert_eq!(format_frame(&[]), "");
    }
}
