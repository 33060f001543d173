//! Decoded TOYOPUC responses.
//!
//! A response frame carries, after the 4-byte header:
//!
//! | Component | Size | Description |
//! |-----------|------|-------------|
//! | CMD | 1 byte | Echo of the request's function code |
//! | Data | Variable | Response data (if any) |
//!
//! The header's status byte is 0x00 on success and an exception code
//! otherwise.
//!
//! # Example
//!
//! ```
//! use toyopuc::Response;
//!
//! let response = Response::new(0x1C, 0x00, vec![0x34, 0x12, 0x78, 0x56]);
//! assert!(response.is_success());
//! assert_eq!(response.to_words().unwrap(), vec![0x1234, 0x5678]);
//! ```

use crate::error::{Result, ToyopucError};

/// Decoded response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Function code echoed by the PLC.
    pub function_code: u8,
    /// Status byte (0x00 = success, otherwise an exception code).
    pub status: u8,
    /// Response data, empty when the frame carries none.
    pub data: Vec<u8>,
}

impl Response {
    /// Creates a response from its parts.
    pub fn new(function_code: u8, status: u8, data: Vec<u8>) -> Self {
        Self {
            function_code,
            status,
            data,
        }
    }

    /// Returns whether the status byte indicates success.
    pub fn is_success(&self) -> bool {
        self.status == 0x00
    }

    /// Checks the echoed function code, then the status byte.
    ///
    /// # Errors
    ///
    /// - `FunctionCodeMismatch` if the echo differs from `expected`
    /// - `Exception` if the status byte is non-zero
    ///
    /// # Example
    ///
    /// ```
    /// use toyopuc::{Response, ToyopucError};
    ///
    /// let response = Response::new(0x21, 0x41, Vec::new());
    /// match response.check(0x21) {
    ///     Err(ToyopucError::Exception { function_code, exception_code }) => {
    ///         assert_eq!(function_code, 0x21);
    ///         assert_eq!(exception_code, 0x41);
    ///     }
    ///     other => panic!("unexpected {:?}", other),
    /// }
    /// ```
    pub fn check(&self, expected: u8) -> Result<()> {
        if self.function_code != expected {
            return Err(ToyopucError::FunctionCodeMismatch {
                expected,
                received: self.function_code,
            });
        }
        if !self.is_success() {
            return Err(ToyopucError::exception(self.function_code, self.status));
        }
        Ok(())
    }

    /// Converts response data to little-endian words.
    ///
    /// # Errors
    ///
    /// Returns `ToyopucError::Framing` if the data length is odd.
    pub fn to_words(&self) -> Result<Vec<u16>> {
        crate::utils::words_from_le_bytes(&self.data)
    }

    /// Converts the first data octet to a bit (0x01 = ON).
    ///
    /// # Errors
    ///
    /// Returns `ToyopucError::Framing` if there is no data.
    pub fn to_bit(&self) -> Result<bool> {
        match self.data.first() {
            Some(&value) => Ok(value == 0x01),
            None => Err(ToyopucError::framing("no data for bit conversion")),
        }
    }

    /// Converts every data octet to a bit (0x01 = ON).
    pub fn to_bits(&self) -> Vec<bool> {
        crate::utils::bits_from_bytes(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_success() {
        let response = Response::new(0x18, 0x00, vec![0xAA]);
        assert!(response.check(0x18).is_ok());
    }

    #[test]
    fn test_check_function_code_mismatch() {
        let response = Response::new(0x1E, 0x00, Vec::new());
        let err = response.check(0x1C).unwrap_err();
        match err {
            ToyopucError::FunctionCodeMismatch { expected, received } => {
                assert_eq!(expected, 0x1C);
                assert_eq!(received, 0x1E);
            }
            _ => panic!("Expected FunctionCodeMismatch"),
        }
    }

    #[test]
    fn test_check_mismatch_wins_over_status() {
        let response = Response::new(0x1E, 0x41, Vec::new());
        assert!(matches!(
            response.check(0x1C),
            Err(ToyopucError::FunctionCodeMismatch { .. })
        ));
    }

    #[test]
    fn test_check_exception() {
        let response = Response::new(0x21, 0x41, Vec::new());
        let err = response.check(0x21).unwrap_err();
        assert!(err.to_string().contains("the number of words or bytes is out of range"));
    }

    #[test]
    fn test_to_words() {
        let response = Response::new(0x1C, 0x00, vec![0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(response.to_words().unwrap(), vec![0xBBAA, 0xDDCC]);
    }

    #[test]
    fn test_to_words_odd_length() {
        let response = Response::new(0x1C, 0x00, vec![0xAA, 0xBB, 0xCC]);
        assert!(response.to_words().is_err());
    }

    #[test]
    fn test_to_bit() {
        assert!(Response::new(0x20, 0, vec![0x01]).to_bit().unwrap());
        assert!(!Response::new(0x20, 0, vec![0x00]).to_bit().unwrap());
        assert!(Response::new(0x20, 0, Vec::new()).to_bit().is_err());
    }

    #[test]
    fn test_to_bits() {
        let response = Response::new(0x26, 0x00, vec![0x01, 0x00, 0x01]);
        assert_eq!(response.to_bits(), vec![true, false, true]);
    }
}
