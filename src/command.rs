//! Command catalog: function codes, quantity limits and payload layouts.
//!
//! Every supported operation is one row of a single table declaring its
//! quantity rule, its payload layout and whether it takes an expansion area. [`Command::new`] looks the
//! row up, validates the caller's input against it and packs the payload.
//! Validation always happens before any I/O.
//!
//! # Quantity Limits
//!
//! | Operations | Limit |
//! |------------|-------|
//! | Sequential program / I/O word read and write | 1..=0x200 |
//! | I/O byte read and write | 1..=0x200 |
//! | I/O bit read and write | exactly one bit |
//! | I/O multipoint word, byte and bit | 1..=0x80 points |
//! | Program / data expansion word | 1..=0x200 |
//! | Data expansion byte | 1..=0x400 |
//! | Data expansion multipoint | 1..=176 points and 1..=128 data octets |
//!
//! # Payload Layouts
//!
//! All 16-bit fields are little-endian. Expansion commands prefix the payload
//! with the one-byte area number.
//!
//! - range read: `address, quantity`
//! - word write: `address, value...`
//! - byte write: `address, octet...`
//! - bit read: `address`
//! - bit write: `address, value(8)`
//! - multipoint read: `address...`
//! - multipoint write: `(address, value)...` interleaved per point
//! - mixed multipoint: `nbits, nbytes, nwords, (kind, address)...`
//!
//! # Example
//!
//! ```
//! use toyopuc::{Command, FunctionCode, Payload};
//!
//! let cmd = Command::new(
//!     FunctionCode::SequentialProgramReadWord,
//!     None,
//!     Payload::Range { address: 1, quantity: 3 },
//! ).unwrap();
//! assert_eq!(cmd.payload(), &[0x01, 0x00, 0x03, 0x00]);
//! ```

use crate::area::{ExpansionArea, ExpansionMultipoint};
use crate::error::{Result, ToyopucError};

/// Maximum quantity of plain and expansion word reads/writes and I/O byte
/// reads/writes.
pub const MAX_RANGE_QUANTITY: usize = 0x200;

/// Maximum quantity of data-expansion byte reads/writes.
pub const MAX_EXPANSION_BYTE_QUANTITY: usize = 0x400;

/// Maximum number of points in an I/O multipoint command.
pub const MAX_MULTIPOINT_POINTS: usize = 0x80;

/// Maximum number of points in a data-expansion multipoint command.
pub const MAX_MIXED_POINTS: usize = 176;

/// Maximum number of data octets addressed by a data-expansion multipoint
/// command.
pub const MAX_MIXED_OCTETS: usize = 128;

/// Command codes understood by the PLC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FunctionCode {
    /// Sequential program word read (0x18).
    SequentialProgramReadWord = 0x18,
    /// Sequential program word write (0x19).
    SequentialProgramWriteWord = 0x19,
    /// I/O register word read (0x1C).
    IoReadWord = 0x1C,
    /// I/O register word write (0x1D).
    IoWriteWord = 0x1D,
    /// I/O register byte read (0x1E).
    IoReadByte = 0x1E,
    /// I/O register byte write (0x1F).
    IoWriteByte = 0x1F,
    /// I/O register bit read (0x20).
    IoReadBit = 0x20,
    /// I/O register bit write (0x21).
    IoWriteBit = 0x21,
    /// I/O register multipoint word read (0x22).
    IoReadMultipointWord = 0x22,
    /// I/O register multipoint word write (0x23).
    IoWriteMultipointWord = 0x23,
    /// I/O register multipoint byte read (0x24).
    IoReadMultipointByte = 0x24,
    /// I/O register multipoint byte write (0x25).
    IoWriteMultipointByte = 0x25,
    /// I/O register multipoint bit read (0x26).
    IoReadMultipointBit = 0x26,
    /// I/O register multipoint bit write (0x27).
    IoWriteMultipointBit = 0x27,
    /// Program expansion word read (0x90).
    ProgramExpansionReadWord = 0x90,
    /// Program expansion word write (0x91).
    ProgramExpansionWriteWord = 0x91,
    /// Data expansion word read (0x94).
    DataExpansionReadWord = 0x94,
    /// Data expansion word write (0x95).
    DataExpansionWriteWord = 0x95,
    /// Data expansion byte read (0x96).
    DataExpansionReadByte = 0x96,
    /// Data expansion byte write (0x97).
    DataExpansionWriteByte = 0x97,
    /// Data expansion multipoint read (0x98).
    DataExpansionReadMultipoint = 0x98,
    /// Data expansion multipoint write (0x99). Recognized but not buildable.
    DataExpansionWriteMultipoint = 0x99,
}

/// Quantity rule of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityLimit {
    /// Exactly one element, no quantity parameter.
    Single,
    /// Between 1 and `max` elements.
    Range {
        /// Highest accepted quantity.
        max: usize,
    },
    /// Mixed bit/byte/word points: 1..=176 points and 1..=128 data octets.
    Mixed,
}

/// Payload layout of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layout {
    Range,
    Words,
    Bytes,
    Bit,
    BitValue,
    Points,
    WordPoints,
    BytePoints,
    Mixed,
}

/// Whether and which expansion area an operation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AreaRule {
    None,
    Program,
    Data,
}

/// One row of the command catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Operation {
    pub(crate) limit: QuantityLimit,
    pub(crate) layout: Layout,
    pub(crate) area: AreaRule,
}

const fn op(limit: QuantityLimit, layout: Layout, area: AreaRule) -> Option<Operation> {
    Some(Operation {
        limit,
        layout,
        area,
    })
}

const WORDS: QuantityLimit = QuantityLimit::Range {
    max: MAX_RANGE_QUANTITY,
};
const POINTS: QuantityLimit = QuantityLimit::Range {
    max: MAX_MULTIPOINT_POINTS,
};
const EXPANSION_BYTES: QuantityLimit = QuantityLimit::Range {
    max: MAX_EXPANSION_BYTE_QUANTITY,
};

impl FunctionCode {
    /// Returns the code byte sent on the wire.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Looks up a function code by its wire value.
    pub fn from_code(code: u8) -> Option<Self> {
        use FunctionCode::*;
        let function = match code {
            0x18 => SequentialProgramReadWord,
            0x19 => SequentialProgramWriteWord,
            0x1C => IoReadWord,
            0x1D => IoWriteWord,
            0x1E => IoReadByte,
            0x1F => IoWriteByte,
            0x20 => IoReadBit,
            0x21 => IoWriteBit,
            0x22 => IoReadMultipointWord,
            0x23 => IoWriteMultipointWord,
            0x24 => IoReadMultipointByte,
            0x25 => IoWriteMultipointByte,
            0x26 => IoReadMultipointBit,
            0x27 => IoWriteMultipointBit,
            0x90 => ProgramExpansionReadWord,
            0x91 => ProgramExpansionWriteWord,
            0x94 => DataExpansionReadWord,
            0x95 => DataExpansionWriteWord,
            0x96 => DataExpansionReadByte,
            0x97 => DataExpansionWriteByte,
            0x98 => DataExpansionReadMultipoint,
            0x99 => DataExpansionWriteMultipoint,
            _ => return None,
        };
        Some(function)
    }

    /// The catalog row for this function code. `None` for codes without a
    /// known payload layout.
    pub(crate) fn operation(self) -> Option<Operation> {
        use AreaRule as A;
        use FunctionCode::*;
        use Layout as L;
        use QuantityLimit::{Mixed, Single};

        match self {
            SequentialProgramReadWord => op(WORDS, L::Range, A::None),
            SequentialProgramWriteWord => op(WORDS, L::Words, A::None),
            IoReadWord => op(WORDS, L::Range, A::None),
            IoWriteWord => op(WORDS, L::Words, A::None),
            IoReadByte => op(WORDS, L::Range, A::None),
            IoWriteByte => op(WORDS, L::Bytes, A::None),
            IoReadBit => op(Single, L::Bit, A::None),
            IoWriteBit => op(Single, L::BitValue, A::None),
            IoReadMultipointWord => op(POINTS, L::Points, A::None),
            IoWriteMultipointWord => op(POINTS, L::WordPoints, A::None),
            IoReadMultipointByte => op(POINTS, L::Points, A::None),
            IoWriteMultipointByte => op(POINTS, L::BytePoints, A::None),
            IoReadMultipointBit => op(POINTS, L::Points, A::None),
            IoWriteMultipointBit => op(POINTS, L::BytePoints, A::None),
            ProgramExpansionReadWord => op(WORDS, L::Range, A::Program),
            ProgramExpansionWriteWord => op(WORDS, L::Words, A::Program),
            DataExpansionReadWord => op(WORDS, L::Range, A::Data),
            DataExpansionWriteWord => op(WORDS, L::Words, A::Data),
            DataExpansionReadByte => op(EXPANSION_BYTES, L::Range, A::Data),
            DataExpansionWriteByte => op(EXPANSION_BYTES, L::Bytes, A::Data),
            DataExpansionReadMultipoint => op(Mixed, L::Mixed, A::None),
            DataExpansionWriteMultipoint => None,
        }
    }

    /// Returns the quantity rule of this operation, if it is buildable.
    ///
    /// # Example
    ///
    /// ```
    /// use toyopuc::{FunctionCode, QuantityLimit};
    ///
    /// assert_eq!(
    ///     FunctionCode::DataExpansionReadByte.quantity_limit(),
    ///     Some(QuantityLimit::Range { max: 0x400 })
    /// );
    /// assert_eq!(FunctionCode::IoReadBit.quantity_limit(), Some(QuantityLimit::Single));
    /// ```
    pub fn quantity_limit(self) -> Option<QuantityLimit> {
        self.operation().map(|op| op.limit)
    }
}

impl std::fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} (0x{:02X})", self, self.code())
    }
}

/// Caller input for one command, shaped like its payload layout.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    /// Contiguous range read.
    Range {
        /// Start address.
        address: u16,
        /// Number of elements.
        quantity: u16,
    },
    /// Contiguous word write.
    Words {
        /// Start address.
        address: u16,
        /// Words to write.
        values: &'a [u16],
    },
    /// Contiguous byte write.
    Bytes {
        /// Start address.
        address: u16,
        /// Octets to write.
        values: &'a [u8],
    },
    /// Single bit read.
    Bit {
        /// Bit address.
        address: u16,
    },
    /// Single bit write.
    BitValue {
        /// Bit address.
        address: u16,
        /// New state.
        value: bool,
    },
    /// Multipoint read of independent addresses.
    Points {
        /// Addresses to read.
        addresses: &'a [u16],
    },
    /// Multipoint word write.
    WordPoints {
        /// Addresses to write.
        addresses: &'a [u16],
        /// One word per address.
        values: &'a [u16],
    },
    /// Multipoint byte or bit write.
    BytePoints {
        /// Addresses to write.
        addresses: &'a [u16],
        /// One octet per address.
        values: &'a [u8],
    },
    /// Data-expansion multipoint read.
    Mixed(&'a ExpansionMultipoint),
}

impl Payload<'_> {
    fn layout(&self) -> Layout {
        match self {
            Payload::Range { .. } => Layout::Range,
            Payload::Words { .. } => Layout::Words,
            Payload::Bytes { .. } => Layout::Bytes,
            Payload::Bit { .. } => Layout::Bit,
            Payload::BitValue { .. } => Layout::BitValue,
            Payload::Points { .. } => Layout::Points,
            Payload::WordPoints { .. } => Layout::WordPoints,
            Payload::BytePoints { .. } => Layout::BytePoints,
            Payload::Mixed(_) => Layout::Mixed,
        }
    }

    /// Name and size of the counted parameter.
    fn quantity(&self) -> Result<(&'static str, usize)> {
        match *self {
            Payload::Range { quantity, .. } => Ok(("quantity", quantity as usize)),
            Payload::Words { values, .. } => Ok(("values", values.len())),
            Payload::Bytes { values, .. } => Ok(("values", values.len())),
            Payload::Bit { .. } | Payload::BitValue { .. } => Ok(("bit", 1)),
            Payload::Points { addresses } => Ok(("addresses", addresses.len())),
            Payload::WordPoints { addresses, values } => {
                check_counts(addresses.len(), values.len())?;
                Ok(("addresses", addresses.len()))
            }
            Payload::BytePoints { addresses, values } => {
                check_counts(addresses.len(), values.len())?;
                Ok(("addresses", addresses.len()))
            }
            Payload::Mixed(points) => Ok(("points", points.point_count())),
        }
    }
}

fn check_counts(addresses: usize, values: usize) -> Result<()> {
    if addresses != values {
        return Err(ToyopucError::CountMismatch { addresses, values });
    }
    Ok(())
}

fn check_range(parameter: &'static str, quantity: usize, max: usize) -> Result<()> {
    if quantity < 1 || quantity > max {
        return Err(ToyopucError::quantity_out_of_range(
            parameter, quantity, 1, max,
        ));
    }
    Ok(())
}

/// A validated command: function code plus packed payload.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    function_code: FunctionCode,
    payload: Vec<u8>,
}

impl Command {
    /// Validates the input against the catalog and packs the payload.
    ///
    /// # Arguments
    ///
    /// * `function_code` - Operation to build
    /// * `area` - Expansion area, required by expansion word/byte operations
    ///   and rejected by all others
    /// * `payload` - Addresses and values, in the layout the operation expects
    ///
    /// # Errors
    ///
    /// - `QuantityOutOfRange` if a count is outside the operation's limit
    /// - `CountMismatch` if a multipoint write has unequal address/value counts
    /// - `InvalidParameter` if the payload shape or area does not fit the
    ///   operation
    ///
    /// # Example
    ///
    /// ```
    /// use toyopuc::{Command, ExpansionArea, FunctionCode, Payload};
    ///
    /// let cmd = Command::new(
    ///     FunctionCode::DataExpansionWriteByte,
    ///     Some(ExpansionArea::ExtendedBit),
    ///     Payload::Bytes { address: 0x2000, values: &[0x12, 0x34] },
    /// ).unwrap();
    /// assert_eq!(cmd.payload(), &[0x00, 0x00, 0x20, 0x12, 0x34]);
    ///
    /// let err = Command::new(
    ///     FunctionCode::IoReadWord,
    ///     None,
    ///     Payload::Range { address: 0, quantity: 0 },
    /// );
    /// assert!(err.is_err());
    /// ```
    pub fn new(
        function_code: FunctionCode,
        area: Option<ExpansionArea>,
        payload: Payload<'_>,
    ) -> Result<Self> {
        let operation = function_code.operation().ok_or_else(|| {
            ToyopucError::invalid_parameter(
                "function_code",
                format!("{} has no known payload layout", function_code),
            )
        })?;

        if payload.layout() != operation.layout {
            return Err(ToyopucError::invalid_parameter(
                "payload",
                format!(
                    "{} expects a {:?} payload, got {:?}",
                    function_code,
                    operation.layout,
                    payload.layout()
                ),
            ));
        }

        check_area(function_code, operation.area, area)?;

        let (parameter, quantity) = payload.quantity()?;
        match operation.limit {
            QuantityLimit::Single => {}
            QuantityLimit::Range { max } => check_range(parameter, quantity, max)?,
            QuantityLimit::Mixed => {
                check_range(parameter, quantity, MAX_MIXED_POINTS)?;
                if let Payload::Mixed(points) = payload {
                    check_range("data octets", points.data_octets(), MAX_MIXED_OCTETS)?;
                }
            }
        }

        Ok(Self {
            function_code,
            payload: encode_payload(area, payload),
        })
    }

    /// Returns the function code.
    pub fn function_code(&self) -> FunctionCode {
        self.function_code
    }

    /// Returns the packed payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

fn check_area(
    function_code: FunctionCode,
    rule: AreaRule,
    area: Option<ExpansionArea>,
) -> Result<()> {
    match (rule, area) {
        (AreaRule::None, None) | (AreaRule::Data, Some(_)) => Ok(()),
        (AreaRule::Program, Some(area)) if area.is_program_bank() => Ok(()),
        (AreaRule::Program, Some(area)) => Err(ToyopucError::invalid_parameter(
            "area",
            format!("{} only accepts program banks 1-3, got {}", function_code, area),
        )),
        (AreaRule::None, Some(_)) => Err(ToyopucError::invalid_parameter(
            "area",
            format!("{} does not take an expansion area", function_code),
        )),
        (_, None) => Err(ToyopucError::invalid_parameter(
            "area",
            format!("{} requires an expansion area", function_code),
        )),
    }
}

fn encode_payload(area: Option<ExpansionArea>, payload: Payload<'_>) -> Vec<u8> {
    let mut bytes = Vec::new();
    if let Some(area) = area {
        bytes.push(area.code());
    }

    match payload {
        Payload::Range { address, quantity } => {
            bytes.extend_from_slice(&address.to_le_bytes());
            bytes.extend_from_slice(&quantity.to_le_bytes());
        }
        Payload::Words { address, values } => {
            bytes.reserve(2 + values.len() * 2);
            bytes.extend_from_slice(&address.to_le_bytes());
            for value in values {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
        Payload::Bytes { address, values } => {
            bytes.extend_from_slice(&address.to_le_bytes());
            bytes.extend_from_slice(values);
        }
        Payload::Bit { address } => {
            bytes.extend_from_slice(&address.to_le_bytes());
        }
        Payload::BitValue { address, value } => {
            bytes.extend_from_slice(&address.to_le_bytes());
            bytes.push(u8::from(value));
        }
        Payload::Points { addresses } => {
            for address in addresses {
                bytes.extend_from_slice(&address.to_le_bytes());
            }
        }
        Payload::WordPoints { addresses, values } => {
            for (address, value) in addresses.iter().zip(values) {
                bytes.extend_from_slice(&address.to_le_bytes());
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
        Payload::BytePoints { addresses, values } => {
            for (address, value) in addresses.iter().zip(values) {
                bytes.extend_from_slice(&address.to_le_bytes());
                bytes.push(*value);
            }
        }
        Payload::Mixed(points) => {
            // Counts fit in one octet each: the total is capped at 176.
            bytes.push(points.bits.len() as u8);
            bytes.push(points.bytes.len() as u8);
            bytes.push(points.words.len() as u8);
            for point in points.bits.iter().chain(&points.bytes).chain(&points.words) {
                bytes.extend_from_slice(&point.to_bytes());
            }
        }
    }

    bytes
}
