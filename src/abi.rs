//! This module contains the definition of the elementary Solidity types whose
//! storage size the library is able to infer from their type labels.

use serde::{Deserialize, Serialize};

use crate::constant::{
    ADDRESS_SIZE_BYTES,
    BOOL_SIZE_BYTES,
    BYTE_SIZE_BITS,
    ENUM_SIZE_BYTES,
    EXTERNAL_FUNCTION_SIZE_BYTES,
    INTERNAL_FUNCTION_SIZE_BYTES,
    SLOT_SIZE_BITS,
    SLOT_SIZE_BYTES,
};

/// Elementary Solidity types that occupy a fixed number of bytes in storage.
///
/// # Invariants
///
/// Each individual variant in the enum describes the invariants placed upon it.
/// Values produced by [`ElementaryType::parse`] always satisfy them.
///
/// # Missing Solidity Types
///
/// The `fixed` and `ufixed` types are not supported by the language in
/// practice, and user-defined value types are not unwrapped, so neither is
/// recognised here.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementaryType {
    /// Unsigned integers of a given `size` in bits, where `8 <= size <= 256 &&
    /// size % 8 == 0`.
    UInt { size: usize },

    /// Signed (two's complement) integers of a given `size` in bits, where `8
    /// <= size <= 256 && size % 8 == 0`.
    Int { size: usize },

    /// Addresses, including `address payable` and contract-typed variables.
    Address,

    /// Booleans.
    Bool,

    /// Byte arrays of a fixed `length`, where `0 < length <= 32`.
    Bytes { length: usize },

    /// A function pointer.
    ///
    /// External pointers consist of an address followed by a selector, while
    /// internal pointers are offsets into the contract's code.
    Function { external: bool },

    /// An enumeration, which always fits in a single byte.
    Enum,
}

impl ElementaryType {
    /// Parses the provided Solidity type `label`, returning [`None`] if it
    /// does not name a fixed-size elementary type.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();

        let typ = match label {
            "bool" => Self::Bool,
            "address" | "address payable" => Self::Address,
            "byte" => Self::Bytes { length: 1 },
            "uint" => Self::UInt {
                size: SLOT_SIZE_BITS,
            },
            "int" => Self::Int {
                size: SLOT_SIZE_BITS,
            },
            _ if label.starts_with("function") => Self::Function {
                external: Self::is_external_function(label),
            },
            _ if label.starts_with("enum ") => Self::Enum,
            _ if label.starts_with("contract ") || label.starts_with("interface ") => {
                Self::Address
            }
            _ => {
                if let Some(bits) = label.strip_prefix("uint") {
                    Self::UInt {
                        size: Self::parse_bit_width(bits)?,
                    }
                } else if let Some(bits) = label.strip_prefix("int") {
                    Self::Int {
                        size: Self::parse_bit_width(bits)?,
                    }
                } else if let Some(length) = label.strip_prefix("bytes") {
                    let length: usize = length.parse().ok()?;
                    if length == 0 || length > usize::from(SLOT_SIZE_BYTES) {
                        return None;
                    }
                    Self::Bytes { length }
                } else {
                    return None;
                }
            }
        };

        Some(typ)
    }

    /// Gets the number of bytes that a value of this type occupies in storage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // Invariants bound sizes to a slot
    pub fn size_bytes(&self) -> u8 {
        match self {
            Self::UInt { size } | Self::Int { size } => (size / BYTE_SIZE_BITS) as u8,
            Self::Bytes { length } => *length as u8,
            Self::Address => ADDRESS_SIZE_BYTES,
            Self::Bool => BOOL_SIZE_BYTES,
            Self::Function { external: true } => EXTERNAL_FUNCTION_SIZE_BYTES,
            Self::Function { external: false } => INTERNAL_FUNCTION_SIZE_BYTES,
            Self::Enum => ENUM_SIZE_BYTES,
        }
    }

    /// Checks whether the function type `label` carries the `external`
    /// visibility.
    ///
    /// Only the modifiers between the parameter list and the return list are
    /// inspected, so function types nested in either list do not count.
    /// Function types without a visibility are internal.
    fn is_external_function(label: &str) -> bool {
        let Some(open) = label.find('(') else {
            return false;
        };
        let mut depth = 0usize;
        let mut close = None;
        for (offset, c) in label[open..].char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(open + offset);
                        break;
                    }
                }
                _ => (),
            }
        }
        let Some(close) = close else {
            return false;
        };

        label[close + 1..]
            .split_whitespace()
            .take_while(|word| !word.starts_with("returns"))
            .any(|word| word == "external")
    }

    fn parse_bit_width(bits: &str) -> Option<usize> {
        let size: usize = bits.parse().ok()?;
        let valid = size >= BYTE_SIZE_BITS && size <= SLOT_SIZE_BITS && size % BYTE_SIZE_BITS == 0;
        valid.then_some(size)
    }
}
