//! Request-number encoding.
//!
//! Layout of a request number (Linux `_IOC` convention):
//! ```text
//! ┌─────────┬──────────────┬──────────┬──────────┐
//! │ dir (2) │ size (14)    │ type (8) │ nr (8)   │
//! │ 31..30  │ 29..16       │ 15..8    │ 7..0     │
//! └─────────┴──────────────┴──────────┴──────────┘
//! ```

use std::fmt;

const NR_SHIFT: u32 = 0;
const TYPE_SHIFT: u32 = 8;
const SIZE_SHIFT: u32 = 16;
const DIR_SHIFT: u32 = 30;

const NR_MASK: u32 = 0xFF;
const TYPE_MASK: u32 = 0xFF;
const SIZE_MASK: u32 = 0x3FFF;
const DIR_MASK: u32 = 0x3;

/// Data direction as seen from userspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    None,
    Write,
    Read,
    ReadWrite,
}

impl Direction {
    const fn bits(self) -> u32 {
        match self {
            Direction::None => 0,
            Direction::Write => 1,
            Direction::Read => 2,
            Direction::ReadWrite => 3,
        }
    }

    const fn from_bits(bits: u32) -> Self {
        match bits & DIR_MASK {
            0 => Direction::None,
            1 => Direction::Write,
            2 => Direction::Read,
            _ => Direction::ReadWrite,
        }
    }
}

/// Declared payload width of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    /// 4-byte integer argument.
    Int,
    /// 8-byte pointer to a userspace buffer.
    Pointer,
}

impl SizeClass {
    pub const fn bytes(self) -> u32 {
        match self {
            SizeClass::Int => 4,
            SizeClass::Pointer => 8,
        }
    }

    const fn from_bytes(bytes: u32) -> Option<Self> {
        match bytes {
            4 => Some(SizeClass::Int),
            8 => Some(SizeClass::Pointer),
            _ => None,
        }
    }
}

/// Pack the four request fields into a request number.
pub const fn encode(direction: Direction, type_tag: u8, number: u8, size: SizeClass) -> u32 {
    (direction.bits() << DIR_SHIFT)
        | ((type_tag as u32) << TYPE_SHIFT)
        | ((number as u32) << NR_SHIFT)
        | (size.bytes() << SIZE_SHIFT)
}

/// A driver control request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlCommand {
    pub direction: Direction,
    pub type_tag: u8,
    pub number: u8,
    pub size: SizeClass,
}

impl ControlCommand {
    pub const fn new(direction: Direction, type_tag: u8, number: u8, size: SizeClass) -> Self {
        Self {
            direction,
            type_tag,
            number,
            size,
        }
    }

    /// `_IOR` equivalent.
    pub const fn read(type_tag: u8, number: u8, size: SizeClass) -> Self {
        Self::new(Direction::Read, type_tag, number, size)
    }

    /// `_IOW` equivalent.
    pub const fn write(type_tag: u8, number: u8, size: SizeClass) -> Self {
        Self::new(Direction::Write, type_tag, number, size)
    }

    /// `_IOWR` equivalent.
    pub const fn read_write(type_tag: u8, number: u8, size: SizeClass) -> Self {
        Self::new(Direction::ReadWrite, type_tag, number, size)
    }

    /// The encoded request number.
    pub const fn code(&self) -> u32 {
        encode(self.direction, self.type_tag, self.number, self.size)
    }

    /// Split a request number back into its fields.
    ///
    /// Returns `None` when the size field is not one of the known classes.
    pub fn decode(code: u32) -> Option<Self> {
        let size = SizeClass::from_bytes((code >> SIZE_SHIFT) & SIZE_MASK)?;
        Some(Self {
            direction: Direction::from_bits(code >> DIR_SHIFT),
            type_tag: ((code >> TYPE_SHIFT) & TYPE_MASK) as u8,
            number: ((code >> NR_SHIFT) & NR_MASK) as u8,
            size,
        })
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIRECTIONS: [Direction; 4] = [
        Direction::None,
        Direction::Write,
        Direction::Read,
        Direction::ReadWrite,
    ];

    #[test]
    fn known_request_numbers() {
        // soc-hw-init on the detection node, as seen in driver logs
        assert_eq!(encode(Direction::Read, b'w', 10, SizeClass::Int), 0x8004_770a);
        assert_eq!(encode(Direction::Write, b'w', 1, SizeClass::Int), 0x4004_7701);
        assert_eq!(
            encode(Direction::Write, 0xA0, 4, SizeClass::Pointer),
            0x4008_a004
        );
        assert_eq!(
            encode(Direction::ReadWrite, 0xA0, 21, SizeClass::Pointer),
            0xc008_a015
        );
    }

    #[test]
    fn decode_recovers_fields() {
        for direction in DIRECTIONS {
            for type_tag in [0u8, b'w', 0xA0, 0xFF] {
                for number in [0u8, 1, 42, 0xFF] {
                    for size in [SizeClass::Int, SizeClass::Pointer] {
                        let cmd = ControlCommand::new(direction, type_tag, number, size);
                        assert_eq!(ControlCommand::decode(cmd.code()), Some(cmd));
                    }
                }
            }
        }
    }

    #[test]
    fn decode_rejects_unknown_size() {
        let code: u32 = (2u32 << DIR_SHIFT) | (16u32 << SIZE_SHIFT) | (0xA0u32 << TYPE_SHIFT) | 3;
        assert_eq!(ControlCommand::decode(code), None);
    }

    #[test]
    fn display_is_hex_code() {
        let cmd = ControlCommand::read(b'w', 10, SizeClass::Int);
        assert_eq!(cmd.to_string(), "0x8004770a");
    }
}
