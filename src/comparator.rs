//! This module contains the packing comparator, which decides whether the
//! declared order of a sequence of items wastes storage slots.
//!
//! The comparator runs the [`simulate`] function over the declared order and
//! asks a [`PackingSolver`] for the best packing of the same items. It only
//! ever reports an improvement when the solver's packing is valid and uses
//! strictly fewer slots.
//!
//! When the solver refuses a problem or gives up on it, the comparator falls
//! back to [`FirstFitDecreasing`], whose packing may still be strictly smaller
//! than the declared layout. Any other failure is treated as "no improvement".
//!
//! # Records and Arrays
//!
//! Record and array items cannot share slots, so they are set aside before the
//! elementary items are packed and re-appended afterwards, one per slot, in
//! their original relative order. Placing them at the end is a policy rather
//! than a verified optimum for mixed item kinds, but it never changes the slot
//! count.

use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    constant::SLOT_SIZE_BYTES,
    error::solver::Error,
    layout::SlotMap,
    simulator::simulate,
    solver::{FirstFitDecreasing, PackingSolver},
    variable::VariableRecord,
};

/// The result of comparing a declared order against the best packing found.
///
/// # Invariants
///
/// `optimized` is present if and only if `spared_slots > 0`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct PackingOutcome {
    spared_slots: usize,
    optimized:    Option<SlotMap>,
}

impl PackingOutcome {
    /// Constructs the outcome for items that are already tightly packed.
    #[must_use]
    pub fn tight() -> Self {
        Self::default()
    }

    /// Constructs the outcome for items where `optimized` uses fewer slots
    /// than `declared`.
    ///
    /// Returns a tight outcome if this is not actually the case.
    #[must_use]
    pub fn compare(declared: &SlotMap, optimized: SlotMap) -> Self {
        match declared.slot_count().checked_sub(optimized.slot_count()) {
            Some(spared_slots) if spared_slots > 0 => Self {
                spared_slots,
                optimized: Some(optimized),
            },
            _ => Self::tight(),
        }
    }

    /// Gets the number of slots that could be spared by reordering.
    #[must_use]
    pub fn spared_slots(&self) -> usize {
        self.spared_slots
    }

    /// Gets the improved layout, if one exists.
    #[must_use]
    pub fn optimized(&self) -> Option<&SlotMap> {
        self.optimized.as_ref()
    }

    /// Checks if the items cannot be packed into fewer slots.
    #[must_use]
    pub fn is_tight(&self) -> bool {
        self.spared_slots == 0
    }
}

/// Compares the slots that `items` occupy in their declared order with the
/// best packing that `solver` can find for them.
#[must_use]
pub fn compare(items: &[VariableRecord], solver: &dyn PackingSolver) -> PackingOutcome {
    let declared = simulate(items);
    debug!("The declared order uses {} slots", declared.slot_count());

    let Some(optimized) = pack(items, solver) else {
        return PackingOutcome::tight();
    };
    debug!("The packed order uses {} slots", optimized.slot_count());

    let outcome = PackingOutcome::compare(&declared, optimized);
    if !outcome.is_tight() {
        debug!("{} slots can be spared", outcome.spared_slots());
    }

    outcome
}

/// Packs the elementary `items` using `solver`, appending the composite items
/// afterwards.
///
/// Returns [`None`] if no usable packing is found, or the one found is invalid.
fn pack(items: &[VariableRecord], solver: &dyn PackingSolver) -> Option<SlotMap> {
    let (elementary, tail): (Vec<&VariableRecord>, Vec<&VariableRecord>) =
        items.iter().partition(|item| item.is_elementary());
    let sizes = elementary.iter().map(|item| item.byte_size()).collect_vec();

    let packing = solver
        .solve(&sizes, SLOT_SIZE_BYTES)
        .or_else(|error| match error {
            Error::TooManyItems { .. } | Error::NotOptimal { .. } => {
                warn!("Falling back to first-fit decreasing: {error}");
                FirstFitDecreasing.solve(&sizes, SLOT_SIZE_BYTES)
            }
            Error::InvalidPacking { .. } => Err(error),
        })
        .and_then(|packing| packing.validate(&sizes, SLOT_SIZE_BYTES).map(|()| packing));
    let packing = match packing {
        Ok(packing) => packing,
        Err(error) => {
            warn!("No improvement can be claimed: {error}");
            return None;
        }
    };

    if !packing.is_certified() {
        debug!("The packing found by {solver:?} is not known to be optimal");
    }

    let mut slots = SlotMap::new();
    for bin in packing.bins() {
        slots.push_slot(bin.iter().map(|&i| elementary[i].clone()));
    }
    for item in tail {
        slots.push_slot([item.clone()]);
    }

    Some(slots)
}
