//! High-level TOYOPUC client.
//!
//! This module provides the [`Client`] struct, the primary interface for
//! reading and writing PLC registers.
//!
//! # Overview
//!
//! Every operation runs the same pipeline:
//! - Validate the input and build a [`Command`]
//! - Encode it into a request frame
//! - Exchange the frame over the [`Transport`]
//! - Verify and decode the response frame
//! - Check the echoed function code, then the status byte
//!
//! Reads return the raw response payload, except bit reads which return
//! `bool` values. Use [`utils`](crate::utils) to reinterpret octets as words.
//!
//! # Example
//!
//! ```no_run
//! use toyopuc::{Client, ClientConfig, ExpansionArea};
//! use toyopuc::utils::words_from_le_bytes;
//!
//! let client = Client::new(ClientConfig::new("192.168.1.10:1025"))?;
//!
//! // Read 3 words of sequential program starting at address 1
//! let data = client.read_sequential_program_word(1, 3)?;
//! let words = words_from_le_bytes(&data)?;
//!
//! // Write a bit
//! client.write_io_bit(0x2000, true)?;
//!
//! // Read from the extended register area
//! let data = client.read_data_expansion_word(ExpansionArea::ExtendedRegister, 0x0000, 4)?;
//! # Ok::<(), toyopuc::ToyopucError>(())
//! ```
//!
//! # Thread Safety
//!
//! `Client<TcpTransport>` is `Send + Sync`. Calls from several threads are
//! serialized on the single connection; each blocks until its own exchange
//! completes.

use std::time::Duration;

use tracing::debug;

use crate::area::{ExpansionArea, ExpansionMultipoint};
use crate::codec::{FrameCodec, MIN_FRAME_SIZE};
use crate::command::{Command, FunctionCode, Payload};
use crate::error::{Result, ToyopucError};
use crate::header::FrameMarkers;
use crate::response::Response;
use crate::transport::{
    TcpTransport, Transport, DEFAULT_IDLE_TIMEOUT, DEFAULT_TIMEOUT, MAX_FRAME_SIZE,
};
use crate::utils::bits_to_bytes;

/// Configuration for creating a TOYOPUC client.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientConfig {
    /// PLC address as `host:port`.
    pub address: String,
    /// Per-exchange timeout. Zero disables the deadline.
    pub timeout: Duration,
    /// Dial timeout. `None` uses `timeout`.
    pub connect_timeout: Option<Duration>,
    /// Idle time after which the connection is closed. Zero never closes.
    pub idle_timeout: Duration,
    /// Frame-type markers for requests and responses.
    pub markers: FrameMarkers,
    /// Largest accepted response frame, header included.
    pub max_frame_size: usize,
}

impl ClientConfig {
    /// Creates a configuration with default timeouts and markers.
    ///
    /// # Example
    ///
    /// ```
    /// use toyopuc::ClientConfig;
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new("192.168.1.10:1025");
    /// assert_eq!(config.timeout, Duration::from_secs(10));
    /// assert_eq!(config.idle_timeout, Duration::from_secs(60));
    /// ```
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            markers: FrameMarkers::default(),
            max_frame_size: MAX_FRAME_SIZE,
        }
    }

    /// Sets the per-exchange timeout (default is 10 seconds).
    ///
    /// # Example
    ///
    /// ```
    /// use toyopuc::ClientConfig;
    /// use std::time::Duration;
    ///
    /// let config = ClientConfig::new("192.168.1.10:1025")
    ///     .with_timeout(Duration::from_secs(3));
    /// ```
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the dial timeout (defaults to the exchange timeout).
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the idle timeout (default is 60 seconds).
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Overrides the frame-type markers (default 0x00 / 0x80).
    ///
    /// # Example
    ///
    /// ```
    /// use toyopuc::{ClientConfig, FrameMarkers};
    ///
    /// let config = ClientConfig::new("192.168.1.10:1025")
    ///     .with_markers(FrameMarkers::new(0x00, 0x80));
    /// ```
    pub fn with_markers(mut self, markers: FrameMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// Sets the largest accepted response frame (default is 0x405 octets, enough
    /// for a full 1024-octet expansion byte read).
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.address.is_empty() {
            return Err(ToyopucError::invalid_parameter(
                "address",
                "must not be empty",
            ));
        }
        if self.max_frame_size < MIN_FRAME_SIZE {
            return Err(ToyopucError::invalid_parameter(
                "max_frame_size",
                format!("must be at least {}", MIN_FRAME_SIZE),
            ));
        }
        Ok(())
    }
}

/// TOYOPUC client.
///
/// Each operation produces exactly one request and one response. Nothing is
/// retried; a failed call surfaces one typed error and the caller decides
/// what to do next.
///
/// # Example
///
/// ```no_run
/// use toyopuc::{Client, ClientConfig};
///
/// let client = Client::new(ClientConfig::new("192.168.1.10:1025")).unwrap();
///
/// // Read 2 I/O words starting at 0x0100
/// let data = client.read_io_word(0x0100, 2).unwrap();
///
/// // Write them back
/// client.write_io_word(0x0100, &[0x1234, 0x5678]).unwrap();
/// ```
pub struct Client<T = TcpTransport> {
    transport: T,
    codec: FrameCodec,
}

impl Client<TcpTransport> {
    /// Creates a client backed by a [`TcpTransport`].
    ///
    /// The connection is dialed lazily by the first operation, or eagerly by
    /// [`connect`](Self::connect).
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the address is empty or the maximum frame
    /// size cannot hold a header and function code.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut transport = TcpTransport::new(config.address)
            .with_timeout(config.timeout)
            .with_idle_timeout(config.idle_timeout)
            .with_max_frame_size(config.max_frame_size);
        if let Some(connect_timeout) = config.connect_timeout {
            transport = transport.with_connect_timeout(connect_timeout);
        }

        Ok(Self::with_transport(
            transport,
            FrameCodec::new(config.markers),
        ))
    }

    /// Dials the PLC now. A no-op when already connected.
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the dial fails.
    pub fn connect(&self) -> Result<()> {
        self.transport.connect()
    }

    /// Closes the connection. The next operation dials again.
    pub fn close(&self) -> Result<()> {
        self.transport.close()
    }

    /// Returns whether the connection is open.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }
}

impl<T: Transport> Client<T> {
    /// Creates a client over any transport.
    pub fn with_transport(transport: T, codec: FrameCodec) -> Self {
        Self { transport, codec }
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the frame codec.
    pub fn codec(&self) -> FrameCodec {
        self.codec
    }

    fn execute(
        &self,
        function_code: FunctionCode,
        area: Option<ExpansionArea>,
        payload: Payload<'_>,
    ) -> Result<Response> {
        let command = Command::new(function_code, area, payload)?;
        let request = self.codec.encode(&command);

        debug!(function = %function_code, payload_len = command.payload().len(), "executing");
        let frame = self.transport.send(&request)?;

        self.codec.verify(&request, &frame)?;
        let response = self.codec.decode(&frame)?;
        response.check(function_code.code())?;
        Ok(response)
    }

    fn execute_write(
        &self,
        function_code: FunctionCode,
        area: Option<ExpansionArea>,
        payload: Payload<'_>,
    ) -> Result<()> {
        self.execute(function_code, area, payload).map(|_| ())
    }

    /// Reads sequential program words (0x18).
    ///
    /// # Arguments
    ///
    /// * `address` - Start address
    /// * `quantity` - Number of words (1-512)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Quantity is 0 or > 512
    /// - Communication fails
    /// - PLC returns an exception
    ///
    /// # Example
    ///
    /// ```no_run
    /// use toyopuc::{Client, ClientConfig};
    ///
    /// let client = Client::new(ClientConfig::new("192.168.1.10:1025")).unwrap();
    /// let data = client.read_sequential_program_word(1, 3).unwrap();
    /// println!("Read {} octets", data.len());
    /// ```
    pub fn read_sequential_program_word(&self, address: u16, quantity: u16) -> Result<Vec<u8>> {
        let response = self.execute(
            FunctionCode::SequentialProgramReadWord,
            None,
            Payload::Range { address, quantity },
        )?;
        Ok(response.data)
    }

    /// Writes sequential program words (0x19). Accepts 1-512 words.
    pub fn write_sequential_program_word(&self, address: u16, values: &[u16]) -> Result<()> {
        self.execute_write(
            FunctionCode::SequentialProgramWriteWord,
            None,
            Payload::Words { address, values },
        )
    }

    /// Reads I/O register words (0x1C). Accepts 1-512 words.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use toyopuc::{Client, ClientConfig};
    /// use toyopuc::utils::words_from_le_bytes;
    ///
    /// let client = Client::new(ClientConfig::new("192.168.1.10:1025")).unwrap();
    /// let words = words_from_le_bytes(&client.read_io_word(0x0100, 4).unwrap()).unwrap();
    /// ```
    pub fn read_io_word(&self, address: u16, quantity: u16) -> Result<Vec<u8>> {
        let response = self.execute(
            FunctionCode::IoReadWord,
            None,
            Payload::Range { address, quantity },
        )?;
        Ok(response.data)
    }

    /// Writes I/O register words (0x1D). Accepts 1-512 words.
    pub fn write_io_word(&self, address: u16, values: &[u16]) -> Result<()> {
        self.execute_write(
            FunctionCode::IoWriteWord,
            None,
            Payload::Words { address, values },
        )
    }

    /// Reads I/O register bytes (0x1E). Accepts 1-512 bytes.
    pub fn read_io_byte(&self, address: u16, quantity: u16) -> Result<Vec<u8>> {
        let response = self.execute(
            FunctionCode::IoReadByte,
            None,
            Payload::Range { address, quantity },
        )?;
        Ok(response.data)
    }

    /// Writes I/O register bytes (0x1F). Accepts 1-512 bytes.
    pub fn write_io_byte(&self, address: u16, values: &[u8]) -> Result<()> {
        self.execute_write(
            FunctionCode::IoWriteByte,
            None,
            Payload::Bytes { address, values },
        )
    }

    /// Reads a single I/O bit (0x20).
    ///
    /// # Errors
    ///
    /// Returns `Framing` if the PLC replies without data, besides the usual
    /// transport and protocol errors.
    pub fn read_io_bit(&self, address: u16) -> Result<bool> {
        let response = self.execute(FunctionCode::IoReadBit, None, Payload::Bit { address })?;
        response.to_bit()
    }

    /// Writes a single I/O bit (0x21).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use toyopuc::{Client, ClientConfig, ToyopucError};
    ///
    /// let client = Client::new(ClientConfig::new("192.168.1.10:1025")).unwrap();
    /// match client.write_io_bit(0x2000, true) {
    ///     Ok(()) => {}
    ///     Err(ToyopucError::Exception { exception_code, .. }) => {
    ///         eprintln!("PLC refused write: 0x{:02X}", exception_code);
    ///     }
    ///     Err(e) => return Err(e),
    /// }
    /// # Ok::<(), ToyopucError>(())
    /// ```
    pub fn write_io_bit(&self, address: u16, value: bool) -> Result<()> {
        self.execute_write(
            FunctionCode::IoWriteBit,
            None,
            Payload::BitValue { address, value },
        )
    }

    /// Reads one word at each address (0x22). Accepts 1-128 addresses.
    pub fn read_io_multipoint_word(&self, addresses: &[u16]) -> Result<Vec<u8>> {
        let response = self.execute(
            FunctionCode::IoReadMultipointWord,
            None,
            Payload::Points { addresses },
        )?;
        Ok(response.data)
    }

    /// Writes one word to each address (0x23).
    ///
    /// # Errors
    ///
    /// Returns `CountMismatch` if `addresses` and `values` differ in length.
    pub fn write_io_multipoint_word(&self, addresses: &[u16], values: &[u16]) -> Result<()> {
        self.execute_write(
            FunctionCode::IoWriteMultipointWord,
            None,
            Payload::WordPoints { addresses, values },
        )
    }

    /// Reads one byte at each address (0x24). Accepts 1-128 addresses.
    pub fn read_io_multipoint_byte(&self, addresses: &[u16]) -> Result<Vec<u8>> {
        let response = self.execute(
            FunctionCode::IoReadMultipointByte,
            None,
            Payload::Points { addresses },
        )?;
        Ok(response.data)
    }

    /// Writes one byte to each address (0x25).
    pub fn write_io_multipoint_byte(&self, addresses: &[u16], values: &[u8]) -> Result<()> {
        self.execute_write(
            FunctionCode::IoWriteMultipointByte,
            None,
            Payload::BytePoints { addresses, values },
        )
    }

    /// Reads one bit at each address (0x26). Accepts 1-128 addresses.
    pub fn read_io_multipoint_bit(&self, addresses: &[u16]) -> Result<Vec<bool>> {
        let response = self.execute(
            FunctionCode::IoReadMultipointBit,
            None,
            Payload::Points { addresses },
        )?;
        Ok(response.to_bits())
    }

    /// Writes one bit to each address (0x27).
    pub fn write_io_multipoint_bit(&self, addresses: &[u16], values: &[bool]) -> Result<()> {
        let values = bits_to_bytes(values);
        self.execute_write(
            FunctionCode::IoWriteMultipointBit,
            None,
            Payload::BytePoints {
                addresses,
                values: &values,
            },
        )
    }

    /// Reads words from a program bank (0x90). Accepts 1-512 words.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `area` is not a program bank.
    pub fn read_program_expansion_word(
        &self,
        area: ExpansionArea,
        address: u16,
        quantity: u16,
    ) -> Result<Vec<u8>> {
        let response = self.execute(
            FunctionCode::ProgramExpansionReadWord,
            Some(area),
            Payload::Range { address, quantity },
        )?;
        Ok(response.data)
    }

    /// Writes words to a program bank (0x91). Accepts 1-512 words.
    pub fn write_program_expansion_word(
        &self,
        area: ExpansionArea,
        address: u16,
        values: &[u16],
    ) -> Result<()> {
        self.execute_write(
            FunctionCode::ProgramExpansionWriteWord,
            Some(area),
            Payload::Words { address, values },
        )
    }

    /// Reads words from an expansion area (0x94). Accepts 1-512 words.
    pub fn read_data_expansion_word(
        &self,
        area: ExpansionArea,
        address: u16,
        quantity: u16,
    ) -> Result<Vec<u8>> {
        let response = self.execute(
            FunctionCode::DataExpansionReadWord,
            Some(area),
            Payload::Range { address, quantity },
        )?;
        Ok(response.data)
    }

    /// Writes words to an expansion area (0x95). Accepts 1-512 words.
    pub fn write_data_expansion_word(
        &self,
        area: ExpansionArea,
        address: u16,
        values: &[u16],
    ) -> Result<()> {
        self.execute_write(
            FunctionCode::DataExpansionWriteWord,
            Some(area),
            Payload::Words { address, values },
        )
    }

    /// Reads bytes from an expansion area (0x96). Accepts 1-1024 bytes.
    pub fn read_data_expansion_byte(
        &self,
        area: ExpansionArea,
        address: u16,
        quantity: u16,
    ) -> Result<Vec<u8>> {
        let response = self.execute(
            FunctionCode::DataExpansionReadByte,
            Some(area),
            Payload::Range { address, quantity },
        )?;
        Ok(response.data)
    }

    /// Writes bytes to an expansion area (0x97). Accepts 1-1024 bytes.
    pub fn write_data_expansion_byte(
        &self,
        area: ExpansionArea,
        address: u16,
        values: &[u8],
    ) -> Result<()> {
        self.execute_write(
            FunctionCode::DataExpansionWriteByte,
            Some(area),
            Payload::Bytes { address, values },
        )
    }

    /// Reads mixed bit, byte and word points across expansion areas (0x98).
    ///
    /// The response carries bit values first, then bytes, then words, in the
    /// order the points were added.
    ///
    /// # Errors
    ///
    /// Returns `QuantityOutOfRange` if the request has no points, more than
    /// 176 points, or addresses more than 128 data octets.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use toyopuc::{Client, ClientConfig, ExpansionMultipoint, ExpansionPoint};
    ///
    /// let client = Client::new(ClientConfig::new("192.168.1.10:1025")).unwrap();
    /// let points = ExpansionMultipoint::new()
    ///     .with_bit(ExpansionPoint::new(112, 3072))
    ///     .with_byte(ExpansionPoint::new(0, 8192))
    ///     .with_word(ExpansionPoint::new(8, 0));
    /// let data = client.read_data_expansion_multipoint(&points).unwrap();
    /// ```
    pub fn read_data_expansion_multipoint(&self, points: &ExpansionMultipoint) -> Result<Vec<u8>> {
        let response = self.execute(
            FunctionCode::DataExpansionReadMultipoint,
            None,
            Payload::Mixed(points),
        )?;
        Ok(response.data)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("transport", &self.transport)
            .field("markers", &self.codec.markers())
            .finish()
    }
}
