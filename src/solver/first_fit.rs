//! This module contains a heuristic bin packing solver for use where the cost
//! of the exact solver is unacceptable.

use itertools::Itertools;
use tracing::debug;

use crate::{
    error::solver::Result,
    solver::{lower_bound, Packing, PackingSolver},
};

/// A solver that places items in decreasing order of size into the first bin
/// with enough room for them.
///
/// The packing it produces is always valid, but may use more bins than the
/// optimum. It is only reported as certified when it meets the trivial lower
/// bound on the number of bins.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FirstFitDecreasing;

impl PackingSolver for FirstFitDecreasing {
    fn solve(&self, sizes: &[u8], capacity: u8) -> Result<Packing> {
        let mut bins: Vec<(usize, Vec<usize>)> = Vec::new();

        for item in (0..sizes.len()).sorted_by(|a, b| sizes[*b].cmp(&sizes[*a])) {
            let size = usize::from(sizes[item]);
            match bins
                .iter_mut()
                .find(|(load, _)| load + size <= usize::from(capacity))
            {
                Some((load, members)) => {
                    *load += size;
                    members.push(item);
                }
                None => bins.push((size, vec![item])),
            }
        }

        let certified = bins.len() == lower_bound(sizes, capacity);
        debug!(
            "First-fit decreasing packed {} items into {} bins (certified: {certified})",
            sizes.len(),
            bins.len()
        );

        let bins = bins.into_iter().map(|(_, members)| members).collect();
        Ok(Packing::new(bins, certified))
    }
}
