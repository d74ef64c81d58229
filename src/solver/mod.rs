//! This module contains the [`PackingSolver`] interface to the bin packing
//! engines that compute how few slots a set of elementary items could occupy,
//! along with the implementations provided by the library.
//!
//! # Solvers
//!
//! - [`ExactSolver`] formulates the problem as a 0/1 integer program and
//!   certifies that its result is optimal.
//! - [`FirstFitDecreasing`] is a fast heuristic that may miss possible
//!   improvements, but never reports a packing that is not realisable.

pub mod exact;
pub mod first_fit;

use std::{fmt::Debug, rc::Rc};

use itertools::Itertools;

pub use crate::solver::{exact::ExactSolver, first_fit::FirstFitDecreasing};
use crate::error::solver::{Error, Result};

/// A dynamically dispatched [`PackingSolver`] instance.
pub type DynSolver = Rc<dyn PackingSolver>;

/// The interface to an engine that can pack a multiset of item sizes into as
/// few fixed-capacity bins as it is able to.
///
/// Solvers are stateless between calls. Any engine resources needed for a call
/// are acquired and released within it.
pub trait PackingSolver
where
    Self: Debug,
{
    /// Packs the items with the provided `sizes` into bins of `capacity`
    /// bytes.
    ///
    /// The returned [`Packing`] refers to items by their position in `sizes`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the solver is unable to produce a packing, or is
    /// required to certify optimality and cannot.
    fn solve(&self, sizes: &[u8], capacity: u8) -> Result<Packing>;
}

/// An assignment of items to bins produced by a [`PackingSolver`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Packing {
    /// The non-empty bins, each containing the indices of the items packed
    /// into it in ascending order.
    bins: Vec<Vec<usize>>,

    /// Whether the number of bins is known to be the minimum possible.
    certified: bool,
}

impl Packing {
    /// Constructs a packing from the provided `bins`, discarding any that are
    /// empty.
    ///
    /// Bins are ordered by the first item they contain, so that the packing
    /// keeps as much of the declared order as the solver allows.
    #[must_use]
    pub fn new(bins: Vec<Vec<usize>>, certified: bool) -> Self {
        let bins = bins
            .into_iter()
            .filter(|b| !b.is_empty())
            .map(|b| b.into_iter().sorted().collect_vec())
            .sorted_by_key(|b| b[0])
            .collect();
        Self { bins, certified }
    }

    /// Gets the bins of the packing.
    #[must_use]
    pub fn bins(&self) -> &[Vec<usize>] {
        self.bins.as_slice()
    }

    /// Gets the number of bins used by the packing.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    /// Checks if the packing is known to use the minimum number of bins.
    #[must_use]
    pub fn is_certified(&self) -> bool {
        self.certified
    }

    /// Checks that the packing places each of the items with the provided
    /// `sizes` exactly once, and that no bin exceeds `capacity`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] describing the first violation found.
    pub fn validate(&self, sizes: &[u8], capacity: u8) -> Result<()> {
        let mut placements = vec![0_usize; sizes.len()];

        for (bin_index, bin) in self.bins.iter().enumerate() {
            let mut load = 0_usize;
            for &item in bin {
                let size = sizes.get(item).ok_or_else(|| {
                    Error::invalid_packing(format!("item {item} does not exist"))
                })?;
                placements[item] += 1;
                load += usize::from(*size);
            }

            if load > usize::from(capacity) {
                return Err(Error::invalid_packing(format!(
                    "bin {bin_index} holds {load} bytes but only fits {capacity}"
                )));
            }
        }

        match placements.iter().position(|&count| count != 1) {
            Some(item) => Err(Error::invalid_packing(format!(
                "item {item} is placed {} times",
                placements[item]
            ))),
            None => Ok(()),
        }
    }
}

/// Computes the trivial lower bound on the number of bins of `capacity` needed
/// to hold items of the provided `sizes`.
#[must_use]
pub fn lower_bound(sizes: &[u8], capacity: u8) -> usize {
    let total: usize = sizes.iter().map(|&s| usize::from(s)).sum();
    total.div_ceil(usize::from(capacity.max(1)))
}

#[cfg(test)]
mod tests {
    use super::{lower_bound, Packing};
    use crate::error::solver::Error;

    #[test]
    fn discards_empty_bins() {
        let packing = Packing::new(vec![vec![1], vec![], vec![2, 0]], true);
        assert_eq!(packing.bin_count(), 2);
        assert_eq!(packing.bins(), &[vec![0, 2], vec![1]]);
    }

    #[test]
    fn validates_capacity() {
        let packing = Packing::new(vec![vec![0, 1], vec![2]], false);
        assert!(matches!(
            packing.validate(&[16, 32, 16], 32),
            Err(Error::InvalidPacking { .. })
        ));
    }

    #[test]
    fn validates_single_placement() {
        let missing = Packing::new(vec![vec![0, 2]], false);
        assert!(missing.validate(&[16, 32, 16], 32).is_err());

        let duplicated = Packing::new(vec![vec![0, 2], vec![1], vec![0]], false);
        assert!(duplicated.validate(&[16, 32, 16], 32).is_err());

        let unknown = Packing::new(vec![vec![0, 2], vec![1, 3]], false);
        assert!(unknown.validate(&[16, 32, 16], 32).is_err());

        let valid = Packing::new(vec![vec![0, 2], vec![1]], true);
        assert_eq!(valid.validate(&[16, 32, 16], 32), Ok(()));
    }

    #[test]
    fn computes_lower_bounds() {
        assert_eq!(lower_bound(&[], 32), 0);
        assert_eq!(lower_bound(&[1], 32), 1);
        assert_eq!(lower_bound(&[16, 16], 32), 1);
        assert_eq!(lower_bound(&[16, 16, 1], 32), 2);
    }
}
