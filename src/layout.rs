//! This module contains the definitions for the slot layout representation
//! types produced by the simulator and the solvers.

use serde::Serialize;

use crate::{constant::SLOT_SIZE_BYTES, variable::VariableRecord};

/// A mapping from 1-based slot indices to the items that occupy each slot.
///
/// Two slot maps are only ever compared by their [`SlotMap::slot_count`] when
/// deciding whether a packing improved.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SlotMap {
    slots: Vec<Slot>,
}

impl SlotMap {
    /// Creates a new, empty, slot map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new empty slot to the map, returning a mutable reference to
    /// it.
    pub(crate) fn open_slot(&mut self) -> &mut Slot {
        let position = self.slots.len();
        self.slots.push(Slot::new(position + 1));
        &mut self.slots[position]
    }

    /// Appends `member` to the last slot in the map, opening the first slot if
    /// the map is empty.
    ///
    /// The caller is responsible for ensuring that the member fits.
    pub(crate) fn push_to_last(&mut self, member: VariableRecord) {
        if self.slots.is_empty() {
            self.open_slot();
        }
        let position = self.slots.len() - 1;
        self.slots[position].push(member);
    }

    /// Appends a new slot containing `members` to the map.
    ///
    /// The caller is responsible for ensuring that the members fit in a slot.
    pub(crate) fn push_slot(&mut self, members: impl IntoIterator<Item = VariableRecord>) {
        let slot = self.open_slot();
        members.into_iter().for_each(|m| slot.push(m));
    }

    /// Gets the slots that make up this map, in ascending order of index.
    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        self.slots.as_slice()
    }

    /// Gets the slot at the 1-based `index`, if it exists.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Slot> {
        index.checked_sub(1).and_then(|i| self.slots.get(i))
    }

    /// Checks if the map contains a slot at the 1-based `index`.
    #[must_use]
    pub fn has_slot(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Gets the number of slots in the map.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Checks if the map is empty (has no slots).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over every item in the map, slot by slot.
    ///
    /// Declaring the items in this order reproduces the layout of the map.
    pub fn variables(&self) -> impl Iterator<Item = &VariableRecord> {
        self.slots.iter().flat_map(|s| s.members.iter())
    }
}

/// A single storage slot and the items packed into it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Slot {
    /// The 1-based index of the slot.
    index: usize,

    /// The items in the slot, in the order they are declared.
    members: Vec<VariableRecord>,
}

impl Slot {
    /// Constructs a new empty slot at the 1-based `index`.
    #[must_use]
    pub fn new(index: usize) -> Self {
        let members = Vec::new();
        Self { index, members }
    }

    pub(crate) fn push(&mut self, member: VariableRecord) {
        self.members.push(member);
    }

    /// Gets the 1-based index of this slot.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Gets the items that occupy this slot.
    #[must_use]
    pub fn members(&self) -> &[VariableRecord] {
        self.members.as_slice()
    }

    /// Gets the number of bytes used by the items in this slot.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.members.iter().map(|m| usize::from(m.byte_size())).sum()
    }

    /// Gets the number of bytes still free in this slot.
    #[must_use]
    pub fn free_bytes(&self) -> usize {
        usize::from(SLOT_SIZE_BYTES).saturating_sub(self.used_bytes())
    }
}
