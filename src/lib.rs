//! # TOYOPUC Computer Link Library
//!
//! A Rust library for reading and writing TOYOPUC PLC registers over TCP.
//!
//! This is a **protocol-only** library: no polling, scheduling or caching.
//! Each call produces exactly 1 request and 1 response, and nothing is
//! retried. The only automatic behavior is connection management: the socket
//! is dialed on first use and closed after a configurable idle period.
//!
//! ## Features
//!
//! - **Deterministic**: each call produces exactly 1 request and 1 response
//! - **Validated**: quantity limits are checked before any I/O
//! - **No panics**: all errors returned as `Result<T, ToyopucError>`
//! - **Thread-safe**: one connection shared by any number of callers
//! - **Pluggable transport**: any [`Transport`] can back a [`Client`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use toyopuc::{Client, ClientConfig};
//! use toyopuc::utils::words_from_le_bytes;
//!
//! fn main() -> toyopuc::Result<()> {
//!     let client = Client::new(ClientConfig::new("192.168.1.10:1025"))?;
//!
//!     // Read 3 sequential program words starting at address 1
//!     let data = client.read_sequential_program_word(1, 3)?;
//!     println!("words = {:?}", words_from_le_bytes(&data)?);
//!
//!     // Write two I/O words
//!     client.write_io_word(0x0100, &[0x1234, 0x5678])?;
//!
//!     // Read and write a single bit
//!     let bit = client.read_io_bit(0x2000)?;
//!     client.write_io_bit(0x2000, !bit)?;
//!
//!     client.close()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Operations
//!
//! | Code | Method | Limit |
//! |------|--------|-------|
//! | 0x18 / 0x19 | `read/write_sequential_program_word` | 1-512 words |
//! | 0x1C / 0x1D | `read/write_io_word` | 1-512 words |
//! | 0x1E / 0x1F | `read/write_io_byte` | 1-512 bytes |
//! | 0x20 / 0x21 | `read/write_io_bit` | single bit |
//! | 0x22 / 0x23 | `read/write_io_multipoint_word` | 1-128 points |
//! | 0x24 / 0x25 | `read/write_io_multipoint_byte` | 1-128 points |
//! | 0x26 / 0x27 | `read/write_io_multipoint_bit` | 1-128 points |
//! | 0x90 / 0x91 | `read/write_program_expansion_word` | 1-512 words |
//! | 0x94 / 0x95 | `read/write_data_expansion_word` | 1-512 words |
//! | 0x96 / 0x97 | `read/write_data_expansion_byte` | 1-1024 bytes |
//! | 0x98 | `read_data_expansion_multipoint` | 1-176 points, 1-128 octets |
//!
//! Reads return the raw payload octets (bit reads return `bool`). All 16-bit
//! values travel little-endian; see [`utils`] for conversions.
//!
//! ## Expansion Areas
//!
//! ```no_run
//! # use toyopuc::{Client, ClientConfig, ExpansionArea, ExpansionMultipoint, ExpansionPoint};
//! # let client = Client::new(ClientConfig::new("192.168.1.10:1025")).unwrap();
//! // Program bank 2
//! let data = client.read_program_expansion_word(ExpansionArea::Program2, 0x0000, 8)?;
//!
//! // Extended register area
//! client.write_data_expansion_byte(ExpansionArea::ExtendedRegister, 0x0100, &[0x12, 0x34])?;
//!
//! // Mixed points across areas in one exchange
//! let points = ExpansionMultipoint::new()
//!     .with_bit(ExpansionPoint::new(112, 3072))
//!     .with_word(ExpansionPoint::new(8, 0));
//! let data = client.read_data_expansion_multipoint(&points)?;
//! # Ok::<(), toyopuc::ToyopucError>(())
//! ```
//!
//! ## Error Handling
//!
//! ```no_run
//! use toyopuc::{Client, ClientConfig, ToyopucError};
//!
//! let client = Client::new(ClientConfig::new("192.168.1.10:1025"))?;
//!
//! match client.read_io_word(0x0100, 10) {
//!     Ok(data) => println!("Data: {:?}", data),
//!     Err(e) if e.is_timeout() => println!("Communication timeout"),
//!     Err(ToyopucError::Exception { exception_code, .. }) => {
//!         println!("PLC exception 0x{:02X}", exception_code);
//!     }
//!     Err(ToyopucError::Connection { address, .. }) => {
//!         println!("Cannot reach {}", address);
//!     }
//!     Err(e) => println!("Error: {}", e),
//! }
//! # Ok::<(), ToyopucError>(())
//! ```
//!
//! ## Configuration
//!
//! ```
//! use toyopuc::{ClientConfig, FrameMarkers};
//! use std::time::Duration;
//!
//! let config = ClientConfig::new("192.168.1.10:1025")
//!     .with_timeout(Duration::from_secs(3))          // Per call (default: 10s)
//!     .with_idle_timeout(Duration::from_secs(30))    // Idle close (default: 60s)
//!     .with_markers(FrameMarkers::new(0x00, 0x80));  // Frame-type bytes
//! ```
//!
//! ## Logging
//!
//! The library emits [`tracing`](https://docs.rs/tracing) events: `debug` for
//! connection lifecycle, `trace` for hex dumps of every frame. Install a
//! subscriber in the application to see them.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod area;
mod client;
mod codec;
mod command;
mod error;
mod header;
mod response;
mod transport;
pub mod utils;

// Public re-exports
pub use area::{ExpansionArea, ExpansionMultipoint, ExpansionPoint};
pub use client::{Client, ClientConfig};
pub use codec::{FrameCodec, MIN_FRAME_SIZE};
pub use command::{
    Command, FunctionCode, Payload, QuantityLimit, MAX_EXPANSION_BYTE_QUANTITY, MAX_MIXED_OCTETS,
    MAX_MIXED_POINTS, MAX_MULTIPOINT_POINTS, MAX_RANGE_QUANTITY,
};
pub use error::{exception_description, Result, ToyopucError};
pub use header::{FrameHeader, FrameMarkers, HEADER_SIZE, REQUEST_FRAME_TYPE, RESPONSE_FRAME_TYPE};
pub use response::Response;
pub use transport::{
    TcpTransport, Transport, DEFAULT_IDLE_TIMEOUT, DEFAULT_TIMEOUT, MAX_FRAME_SIZE,
};
