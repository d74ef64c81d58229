//! This module contains the sequential slot simulator, which reproduces the
//! slot assignment that the compiler performs for a given declaration order.
//!
//! # The Filling Rule
//!
//! Items are visited in declaration order. An elementary item is placed in the
//! current slot if it fits in the bytes remaining there, and otherwise starts a
//! new slot. Records and arrays always start a new slot, consume it entirely,
//! and force the item after them to start a new slot as well.

use tracing::debug;

use crate::{constant::SLOT_SIZE_BYTES, layout::SlotMap, variable::VariableRecord};

/// Computes the slots that `items` occupy when declared in the provided order.
///
/// This is a pure function of its input. Slots are only ever created when an
/// item is placed in them, so the result never contains an empty slot.
#[must_use]
pub fn simulate(items: &[VariableRecord]) -> SlotMap {
    items
        .iter()
        .fold(SequentialFill::new(), SequentialFill::place)
        .into_slot_map()
}

/// The accumulator threaded through the simulation.
#[derive(Debug)]
struct SequentialFill {
    /// The slots filled so far.
    slots: SlotMap,

    /// The bytes still free in the last slot of `slots`.
    ///
    /// This is zero when no slot has been opened yet, or when the last slot
    /// must not be shared with the next item.
    free_bytes: u8,
}

impl SequentialFill {
    fn new() -> Self {
        let slots = SlotMap::new();
        let free_bytes = 0;
        Self { slots, free_bytes }
    }

    fn place(mut self, item: &VariableRecord) -> Self {
        debug!(
            "{item} is a {:?} item of {} bytes",
            item.kind(),
            item.byte_size()
        );

        if item.is_elementary() {
            let size = item.byte_size();
            if size > self.free_bytes {
                self.slots.open_slot();
                self.free_bytes = SLOT_SIZE_BYTES - size;
            } else {
                self.free_bytes -= size;
            }
            self.slots.push_to_last(item.clone());
        } else {
            self.slots.push_slot([item.clone()]);
            self.free_bytes = 0;
        }

        self
    }

    fn into_slot_map(self) -> SlotMap {
        self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::simulate;
    use crate::variable::VariableRecord;

    fn elementary(sizes: &[usize]) -> Vec<VariableRecord> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| {
                VariableRecord::elementary(format!("v{i}"), format!("bytes{size}"), size, i)
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn spills_items_that_do_not_fit() {
        let layout = simulate(&elementary(&[16, 32, 16]));
        assert_eq!(layout.slot_count(), 3);
    }

    #[test]
    fn fills_slots_exactly() {
        let layout = simulate(&elementary(&[16, 16, 32]));
        assert_eq!(layout.slot_count(), 2);
        assert_eq!(layout.get(1).unwrap().members().len(), 2);
        assert_eq!(layout.get(1).unwrap().free_bytes(), 0);
    }

    #[test]
    fn uses_one_slot_when_everything_fits() {
        let layout = simulate(&elementary(&[1, 1, 1, 1, 1, 1, 1, 1]));
        assert_eq!(layout.slot_count(), 1);

        let layout = simulate(&elementary(&[20, 4, 8]));
        assert_eq!(layout.slot_count(), 1);
    }

    #[test]
    fn simulates_interleaved_words() {
        let layout = simulate(&elementary(&[8, 32, 8, 32, 4, 32, 1, 32]));
        assert_eq!(layout.slot_count(), 8);
    }

    #[test]
    fn isolates_records_and_arrays() -> anyhow::Result<()> {
        let items = vec![
            VariableRecord::elementary("a", "uint8", 1, 0)?,
            VariableRecord::record("s", "Data", 1),
            VariableRecord::elementary("b", "uint8", 1, 2)?,
            VariableRecord::array("xs", "uint8[2]", 3),
            VariableRecord::elementary("c", "uint8", 1, 4)?,
            VariableRecord::elementary("d", "uint8", 1, 5)?,
        ];
        let layout = simulate(&items);

        assert_eq!(layout.slot_count(), 5);
        for slot in layout.slots() {
            let has_composite = slot.members().iter().any(|m| !m.is_elementary());
            if has_composite {
                assert_eq!(slot.members().len(), 1);
            }
        }
        assert_eq!(layout.get(5).unwrap().members().len(), 2);

        Ok(())
    }

    #[test]
    fn does_not_leave_an_empty_slot_after_a_trailing_record() -> anyhow::Result<()> {
        let items = vec![
            VariableRecord::elementary("a", "uint256", 32, 0)?,
            VariableRecord::record("s", "Data", 1),
        ];
        let layout = simulate(&items);

        assert_eq!(layout.slot_count(), 2);
        assert!(layout.slots().iter().all(|s| !s.members().is_empty()));

        Ok(())
    }

    #[test]
    fn preserves_declaration_indices() {
        let layout = simulate(&elementary(&[16, 32, 16]));
        let indices: Vec<usize> = layout
            .variables()
            .map(VariableRecord::declaration_index)
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
