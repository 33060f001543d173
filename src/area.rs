//! Expansion areas and mixed multipoint point lists.
//!
//! Expansion commands qualify every address with a one-byte area number that
//! selects a logical memory bank:
//!
//! | Area | Code | Description |
//! |------|:----:|-------------|
//! | [`ExpansionArea::ExtendedBit`] | 0x00 | Extended bit area (ES, EN, H) |
//! | [`ExpansionArea::Program1`] | 0x01 | Program bank 1 |
//! | [`ExpansionArea::Program2`] | 0x02 | Program bank 2 |
//! | [`ExpansionArea::Program3`] | 0x03 | Program bank 3 |
//! | [`ExpansionArea::ExtendedRegister`] | 0x08 | Extended register area (U) |
//! | [`ExpansionArea::Other`] | any | Any other area number, sent as given |
//!
//! Program-expansion commands only accept the three program banks. Data
//! expansion commands accept any area number.
//!
//! # Example
//!
//! ```
//! use toyopuc::ExpansionArea;
//!
//! assert_eq!(ExpansionArea::ExtendedRegister.code(), 0x08);
//! assert!(ExpansionArea::Program2.is_program_bank());
//! assert!(!ExpansionArea::ExtendedBit.is_program_bank());
//! assert_eq!(ExpansionArea::from_code(0x03), ExpansionArea::Program3);
//! assert_eq!(ExpansionArea::from_code(0x70), ExpansionArea::Other(0x70));
//! ```

/// Logical memory bank selected by an expansion command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpansionArea {
    /// Extended bit area (ES, EN, H).
    ExtendedBit,
    /// Program bank 1.
    Program1,
    /// Program bank 2.
    Program2,
    /// Program bank 3.
    Program3,
    /// Extended register area (U).
    ExtendedRegister,
    /// Any other area number.
    Other(u8),
}

impl ExpansionArea {
    /// Returns the area number sent on the wire.
    pub fn code(self) -> u8 {
        match self {
            ExpansionArea::ExtendedBit => 0x00,
            ExpansionArea::Program1 => 0x01,
            ExpansionArea::Program2 => 0x02,
            ExpansionArea::Program3 => 0x03,
            ExpansionArea::ExtendedRegister => 0x08,
            ExpansionArea::Other(code) => code,
        }
    }

    /// Maps an area number to its named area, or `Other` for unnamed ones.
    pub fn from_code(code: u8) -> Self {
        match code {
            0x00 => ExpansionArea::ExtendedBit,
            0x01 => ExpansionArea::Program1,
            0x02 => ExpansionArea::Program2,
            0x03 => ExpansionArea::Program3,
            0x08 => ExpansionArea::ExtendedRegister,
            other => ExpansionArea::Other(other),
        }
    }

    /// Returns whether this area is one of the program banks 1-3.
    ///
    /// Decided by the area number, so `Other(0x02)` is a program bank too.
    pub fn is_program_bank(self) -> bool {
        matches!(self.code(), 0x01..=0x03)
    }
}

impl From<u8> for ExpansionArea {
    fn from(code: u8) -> Self {
        Self::from_code(code)
    }
}

impl std::fmt::Display for ExpansionArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpansionArea::ExtendedBit => write!(f, "EXT-BIT"),
            ExpansionArea::Program1 => write!(f, "PRG1"),
            ExpansionArea::Program2 => write!(f, "PRG2"),
            ExpansionArea::Program3 => write!(f, "PRG3"),
            ExpansionArea::ExtendedRegister => write!(f, "EXT-REG"),
            ExpansionArea::Other(code) => write!(f, "AREA(0x{:02X})", code),
        }
    }
}

/// One addressed point of a mixed multipoint request.
///
/// `kind` is the raw one-byte selector sent ahead of the address; the PLC
/// defines its meaning per point type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionPoint {
    /// Point selector byte.
    pub kind: u8,
    /// Address within the selected area.
    pub address: u16,
}

impl ExpansionPoint {
    /// Creates a new point.
    pub fn new(kind: u8, address: u16) -> Self {
        Self { kind, address }
    }

    pub(crate) fn to_bytes(self) -> [u8; 3] {
        let [lo, hi] = self.address.to_le_bytes();
        [self.kind, lo, hi]
    }
}

/// Bit, byte and word points read together by one data-expansion multipoint
/// command.
///
/// # Example
///
/// ```
/// use toyopuc::{ExpansionMultipoint, ExpansionPoint};
///
/// let points = ExpansionMultipoint::new()
///     .with_bit(ExpansionPoint::new(0x70, 0x0C00))
///     .with_byte(ExpansionPoint::new(0x00, 0x2000))
///     .with_word(ExpansionPoint::new(0x08, 0x0000));
///
/// assert_eq!(points.point_count(), 3);
/// assert_eq!(points.data_octets(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionMultipoint {
    /// Bit points.
    pub bits: Vec<ExpansionPoint>,
    /// Byte points.
    pub bytes: Vec<ExpansionPoint>,
    /// Word points.
    pub words: Vec<ExpansionPoint>,
}

impl ExpansionMultipoint {
    /// Creates an empty point list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bit point.
    pub fn with_bit(mut self, point: ExpansionPoint) -> Self {
        self.bits.push(point);
        self
    }

    /// Adds a byte point.
    pub fn with_byte(mut self, point: ExpansionPoint) -> Self {
        self.bytes.push(point);
        self
    }

    /// Adds a word point.
    pub fn with_word(mut self, point: ExpansionPoint) -> Self {
        self.words.push(point);
        self
    }

    /// Total number of points of all kinds.
    pub fn point_count(&self) -> usize {
        self.bits.len() + self.bytes.len() + self.words.len()
    }

    /// Number of data octets the response carries: bits/8 + bytes + 2 x words.
    ///
    /// Bits are counted in whole octets only, so fewer than eight bit points
    /// contribute nothing.
    pub fn data_octets(&self) -> usize {
        self.bits.len() / 8 + self.bytes.len() + 2 * self.words.len()
    }
}
