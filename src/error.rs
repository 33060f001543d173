//! Error types for the TOYOPUC protocol.

use std::io;
use thiserror::Error;

/// Result type alias for TOYOPUC operations.
pub type Result<T> = std::result::Result<T, ToyopucError>;

/// Errors that can occur during TOYOPUC communication.
///
/// Every failure is returned to the caller exactly once per call. Nothing is
/// retried inside the crate.
#[derive(Debug, Error)]
pub enum ToyopucError {
    /// A quantity (elements, points or data octets) is outside the range the
    /// operation accepts. Raised before any I/O.
    #[error("quantity {quantity} of '{parameter}' must be between {min} and {max}")]
    QuantityOutOfRange {
        /// What was counted.
        parameter: &'static str,
        /// The offending count.
        quantity: usize,
        /// Lowest accepted count.
        min: usize,
        /// Highest accepted count.
        max: usize,
    },

    /// Multipoint write with different numbers of addresses and values.
    #[error("address count {addresses} must equal value count {values}")]
    CountMismatch {
        /// Number of addresses supplied.
        addresses: usize,
        /// Number of values supplied.
        values: usize,
    },

    /// Invalid parameter provided.
    #[error("invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter.
        parameter: String,
        /// Description of why the parameter is invalid.
        reason: String,
    },

    /// The TCP connection to the PLC could not be established.
    #[error("failed to connect to {address}: {source}")]
    Connection {
        /// Address that was dialed.
        address: String,
        /// Underlying dial error.
        #[source]
        source: io::Error,
    },

    /// Write or read failure during an exchange, including an expired deadline.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// Structurally malformed frame.
    #[error("framing error: {reason}")]
    Framing {
        /// Description of the framing problem.
        reason: String,
    },

    /// The response echoes a different function code than the request.
    #[error("function code mismatch: expected 0x{expected:02X}, received 0x{received:02X}")]
    FunctionCodeMismatch {
        /// Function code of the request.
        expected: u8,
        /// Function code found in the response.
        received: u8,
    },

    /// The PLC answered with a non-zero status byte.
    #[error(
        "exception 0x{exception_code:02X} ({}), function 0x{function_code:02X}",
        exception_description(*exception_code)
    )]
    Exception {
        /// Function code of the failed command.
        function_code: u8,
        /// Exception code reported in the status byte.
        exception_code: u8,
    },
}

impl ToyopucError {
    /// Creates a new `QuantityOutOfRange` error.
    ///
    /// # Example
    ///
    /// ```
    /// use toyopuc::ToyopucError;
    ///
    /// let err = ToyopucError::quantity_out_of_range("quantity", 0, 1, 0x200);
    /// assert!(err.is_validation());
    /// ```
    pub fn quantity_out_of_range(
        parameter: &'static str,
        quantity: usize,
        min: usize,
        max: usize,
    ) -> Self {
        Self::QuantityOutOfRange {
            parameter,
            quantity,
            min,
            max,
        }
    }

    /// Creates a new `InvalidParameter` error.
    pub fn invalid_parameter(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `Framing` error.
    ///
    /// # Example
    ///
    /// ```
    /// use toyopuc::ToyopucError;
    ///
    /// let err = ToyopucError::framing("frame too short");
    /// assert_eq!(err.to_string(), "framing error: frame too short");
    /// ```
    pub fn framing(reason: impl Into<String>) -> Self {
        Self::Framing {
            reason: reason.into(),
        }
    }

    /// Creates a new `Exception` error.
    pub fn exception(function_code: u8, exception_code: u8) -> Self {
        Self::Exception {
            function_code,
            exception_code,
        }
    }

    /// Returns true for errors raised by input validation, before any I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::QuantityOutOfRange { .. } | Self::CountMismatch { .. } | Self::InvalidParameter { .. }
        )
    }

    /// Returns true for protocol-level failures reported or echoed by the PLC.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::FunctionCodeMismatch { .. } | Self::Exception { .. }
        )
    }

    /// Returns true when a transport error was caused by an expired deadline.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => matches!(
                e.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}

/// Returns the human-readable cause for a TOYOPUC exception code.
///
/// Unknown codes map to `"unknown"`.
///
/// # Example
///
/// ```
/// use toyopuc::exception_description;
///
/// assert_eq!(exception_description(0x41), "the number of words or bytes is out of range");
/// assert_eq!(exception_description(0xEE), "unknown");
/// ```
pub fn exception_description(code: u8) -> &'static str {
    match code {
        0x11 => "hardware abnormality of CPU",
        0x20 => "ENQ cannot be 5",
        0x21 => "abnormal transmission quantity",
        0x23 => "illegal command code",
        0x24 => "illegal subcommand code",
        0x25 => "illegal data byte in command format",
        0x26 => "number of illegal function call operands",
        0x31 => "an attempt was made to write in an area where writing is prohibited in a sequential operation",
        0x32 => "during the stop duration, a disable command is sent",
        0x33 => "although not in debug mode, a debug function call was attempted",
        0x34 => "access is prohibited through access prohibition setting",
        0x35 => "because the execution permission is set, it cannot be executed",
        0x36 => "since the execution permission is set through other devices, it cannot be executed",
        0x39 => "after I/O point parameters and I/O allocated point parameters are written, try to start scanning without resetting",
        0x3C => "during a serious failure, an unenforceable command was issued",
        0x3D => "the command cannot be executed because a reset is in progress",
        0x3E => "in the command execution of other factors, the processing will conflict, so it is not executable",
        0x3F => "the command cannot be executed because it is stopped",
        0x40 => "the address is not in the range due to reading and writing commands, or the address + data quantity of the command deviates from the address range",
        0x41 => "the number of words or bytes is out of range",
        0x42 => "data other than specified was sent",
        0x43 => "there is an error in the operand of the function call",
        0x52 => "although the timer and counter are not used, the commands of reading and writing the set value and current value are still sent",
        0x66 => "there is no response from the link module of the link No. and station number specified by the relay command. (the specified link module does not exist or the power supply is off, or the line is abnormal, etc.)",
        0x70 => "the module of link No. specified by the relay command cannot be used (the error of the specified link No. or the exception of the link module)",
        0x72 => "there is no response from the link module of the link No. and station number specified by the relay command. (the specified link module does not exist or the power supply is off, or the line is abnormal, etc.)",
        0x73 => "since multiple relay commands are repeatedly sent to the same link module in the CPU module, the command processing cannot be carried out. (please send the command again)",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exception_display() {
        let err = ToyopucError::exception(0x21, 0x41);
        assert_eq!(
            err.to_string(),
            "exception 0x41 (the number of words or bytes is out of range), function 0x21"
        );
        assert!(err.is_protocol());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_unknown_exception_display() {
        let err = ToyopucError::exception(0x18, 0x99);
        assert_eq!(err.to_string(), "exception 0x99 (unknown), function 0x18");
    }

    #[test]
    fn test_quantity_out_of_range_display() {
        let err = ToyopucError::quantity_out_of_range("quantity", 0x201, 1, 0x200);
        assert_eq!(
            err.to_string(),
            "quantity 513 of 'quantity' must be between 1 and 512"
        );
        assert!(err.is_validation());
    }

    #[test]
    fn test_count_mismatch_display() {
        let err = ToyopucError::CountMismatch {
            addresses: 3,
            values: 2,
        };
        assert_eq!(err.to_string(), "address count 3 must equal value count 2");
        assert!(err.is_validation());
    }

    #[test]
    fn test_function_code_mismatch_display() {
        let err = ToyopucError::FunctionCodeMismatch {
            expected: 0x1C,
            received: 0x1E,
        };
        assert_eq!(
            err.to_string(),
            "function code mismatch: expected 0x1C, received 0x1E"
        );
        assert!(err.is_protocol());
    }

    #[test]
    fn test_is_timeout() {
        let err = ToyopucError::from(io::Error::new(io::ErrorKind::TimedOut, "deadline"));
        assert!(err.is_timeout());

        let err = ToyopucError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert!(!err.is_timeout());
        assert!(!ToyopucError::framing("x").is_timeout());
    }

    #[test]
    fn test_every_listed_code_is_known() {
        let codes = [
            0x11, 0x20, 0x21, 0x23, 0x24, 0x25, 0x26, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x39,
            0x3C, 0x3D, 0x3E, 0x3F, 0x40, 0x41, 0x42, 0x43, 0x52, 0x66, 0x70, 0x72, 0x73,
        ];
        for code in codes {
            assert_ne!(exception_description(code), "unknown", "code 0x{:02X}", code);
        }
        assert_eq!(exception_description(0x00), "unknown");
    }

    #[test]
    fn test_relay_exception_texts() {
        assert_eq!(exception_description(0x20), "ENQ cannot be 5");
        assert_eq!(
            exception_description(0x26),
            "number of illegal function call operands"
        );
        assert!(exception_description(0x66).ends_with("or the line is abnormal, etc.)"));
        assert_eq!(exception_description(0x72), exception_description(0x66));
        assert!(exception_description(0x70)
            .ends_with("(the error of the specified link No. or the exception of the link module)"));
        assert!(exception_description(0x73).ends_with("(please send the command again)"));
    }
}
