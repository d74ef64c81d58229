//! This module contains the representation of the packable items that the
//! library operates on: state variables and record (struct) members.

use serde::{Deserialize, Serialize};

use crate::{constant::SLOT_SIZE_BYTES, error::input};

/// The shape of a packable item, which determines how it is laid out in
/// storage.
#[derive(Copy, Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// A fixed-size, non-composite value that can share a slot with its
    /// neighbours.
    #[default]
    Elementary,

    /// A value of a record (struct) type.
    Record,

    /// A fixed-size array.
    Array,
}

impl VariableKind {
    /// Checks if items of this kind are able to share a slot.
    #[must_use]
    pub fn is_elementary(self) -> bool {
        self == Self::Elementary
    }
}

/// A single declared state variable or record member.
///
/// # Invariants
///
/// - `byte_size` is in `1..=32` for elementary items, and exactly
///   [`SLOT_SIZE_BYTES`] for records and arrays.
/// - Records that reach the packing engine are neither dynamic nor inherited.
///
/// These are enforced by the constructors, and the fields are not publicly
/// mutable.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct VariableRecord {
    name:              String,
    #[serde(rename = "type")]
    type_label:        String,
    byte_size:         u8,
    kind:              VariableKind,
    is_dynamic:        bool,
    is_inherited:      bool,
    declaration_index: usize,
}

impl VariableRecord {
    /// Constructs a new elementary item of `byte_size` bytes that was declared
    /// at position `declaration_index`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `byte_size` is zero or does not fit in a slot.
    pub fn elementary(
        name: impl Into<String>,
        type_label: impl Into<String>,
        byte_size: usize,
        declaration_index: usize,
    ) -> input::Result<Self> {
        let name = name.into();
        let byte_size = match u8::try_from(byte_size) {
            Ok(size) if (1..=SLOT_SIZE_BYTES).contains(&size) => size,
            _ => {
                return Err(input::Error::InvalidByteSize {
                    name,
                    size: byte_size,
                })
            }
        };

        Ok(Self {
            name,
            type_label: type_label.into(),
            byte_size,
            kind: VariableKind::Elementary,
            is_dynamic: false,
            is_inherited: false,
            declaration_index,
        })
    }

    /// Constructs a new record-typed item declared at `declaration_index`.
    ///
    /// Its size is the placeholder [`SLOT_SIZE_BYTES`], as records always
    /// start and end on a slot boundary.
    #[must_use]
    pub fn record(
        name: impl Into<String>,
        type_label: impl Into<String>,
        declaration_index: usize,
    ) -> Self {
        Self::composite(name, type_label, VariableKind::Record, declaration_index)
    }

    /// Constructs a new fixed-size array item declared at `declaration_index`.
    ///
    /// Its size is the placeholder [`SLOT_SIZE_BYTES`], as arrays always start
    /// and end on a slot boundary.
    #[must_use]
    pub fn array(
        name: impl Into<String>,
        type_label: impl Into<String>,
        declaration_index: usize,
    ) -> Self {
        Self::composite(name, type_label, VariableKind::Array, declaration_index)
    }

    fn composite(
        name: impl Into<String>,
        type_label: impl Into<String>,
        kind: VariableKind,
        declaration_index: usize,
    ) -> Self {
        Self {
            name: name.into(),
            type_label: type_label.into(),
            byte_size: SLOT_SIZE_BYTES,
            kind,
            is_dynamic: false,
            is_inherited: false,
            declaration_index,
        }
    }

    /// Gets the declared name of the item.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the human-readable type of the item.
    #[must_use]
    pub fn type_label(&self) -> &str {
        &self.type_label
    }

    /// Gets the number of bytes the item occupies in storage.
    #[must_use]
    pub fn byte_size(&self) -> u8 {
        self.byte_size
    }

    /// Gets the kind of the item.
    #[must_use]
    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    /// Checks if the item can share a slot with its neighbours.
    #[must_use]
    pub fn is_elementary(&self) -> bool {
        self.kind.is_elementary()
    }

    /// Checks if the item is dynamically sized.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        self.is_dynamic
    }

    /// Checks if the item was inherited from a parent contract.
    #[must_use]
    pub fn is_inherited(&self) -> bool {
        self.is_inherited
    }

    /// Gets the position of the item in the sequence it was declared in.
    #[must_use]
    pub fn declaration_index(&self) -> usize {
        self.declaration_index
    }
}

impl std::fmt::Display for VariableRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.type_label, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::{VariableKind, VariableRecord};
    use crate::error::input::Error;

    #[test]
    fn rejects_sizes_that_do_not_fit_in_a_slot() {
        assert_eq!(
            VariableRecord::elementary("a", "uint264", 33, 0),
            Err(Error::InvalidByteSize {
                name: "a".into(),
                size: 33,
            })
        );
        assert!(VariableRecord::elementary("b", "bytes0", 0, 1).is_err());
        assert!(VariableRecord::elementary("c", "bytes32", 32, 2).is_ok());
    }

    #[test]
    fn composites_use_the_placeholder_size() {
        let record = VariableRecord::record("s", "ExpensiveStruct", 3);
        let array = VariableRecord::array("xs", "uint8[4]", 4);

        assert_eq!(record.byte_size(), 32);
        assert_eq!(record.kind(), VariableKind::Record);
        assert_eq!(array.byte_size(), 32);
        assert!(!array.is_elementary());
        assert_eq!(array.declaration_index(), 4);
    }

    #[test]
    fn displays_as_a_declaration() -> anyhow::Result<()> {
        let var = VariableRecord::elementary("owner", "address", 20, 0)?;
        assert_eq!(var.to_string(), "address owner");

        Ok(())
    }
}
