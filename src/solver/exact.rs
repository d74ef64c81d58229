//! This module contains the exact bin packing solver, which formulates the
//! problem as a 0/1 integer program and hands it to an external engine.
//!
//! # Formulation
//!
//! For `n` items there are `n` candidate bins, as placing every item alone is
//! always feasible.
//!
//! - `assign[i][j]` is 1 when item `i` is placed in bin `j`.
//! - `used[j]` is 1 when bin `j` holds at least one item.
//! - Every item is placed exactly once: `Σ_j assign[i][j] = 1`.
//! - Every bin respects its capacity, and only counts as used when it holds
//!   weight: `Σ_i assign[i][j] * size[i] <= used[j] * capacity`.
//! - Bins are used in order, `used[j] >= used[j + 1]`, which prunes symmetric
//!   solutions without changing the optimum.
//! - The objective minimises `Σ_j used[j]`.
//!
//! # Bounded Search
//!
//! The branch-and-bound search can take exponential time to prove that the
//! heuristic packing cannot be improved upon. The solver therefore tries
//! [`FirstFitDecreasing`] first, and only runs the search when the heuristic
//! misses the lower bound. The search is seeded with the heuristic packing and
//! runs in batches of nodes, polling its [`Watchdog`] between batches.

use microlp::{ComparisonOp, OptimizationDirection, Problem, SolveOptions, Variable};
use tracing::debug;

use crate::{
    constant::DEFAULT_MAXIMUM_SOLVER_ITEMS,
    error::solver::{Error, Result},
    solver::{FirstFitDecreasing, Packing, PackingSolver},
    watchdog::{BudgetWatchdog, DynWatchdog, SearchProgress, Watchdog},
};

/// A solver that computes a certifiably optimal packing using integer
/// programming.
#[derive(Clone, Debug)]
pub struct ExactSolver {
    /// The maximum number of items the solver will attempt to pack.
    maximum_items: usize,

    /// The watchdog that bounds the search for a single problem.
    watchdog: DynWatchdog,
}

impl ExactSolver {
    /// Constructs a new exact solver with the default item limit of
    /// [`DEFAULT_MAXIMUM_SOLVER_ITEMS`] and the default [`BudgetWatchdog`].
    #[must_use]
    pub fn new() -> Self {
        let maximum_items = DEFAULT_MAXIMUM_SOLVER_ITEMS;
        let watchdog = BudgetWatchdog::default().in_rc();
        Self {
            maximum_items,
            watchdog,
        }
    }

    /// Sets the maximum number of items that the solver will attempt to pack.
    #[must_use]
    pub fn with_maximum_items(mut self, value: usize) -> Self {
        self.maximum_items = value;
        self
    }

    /// Sets the watchdog that decides when the solver abandons a search.
    #[must_use]
    pub fn with_watchdog(mut self, watchdog: DynWatchdog) -> Self {
        self.watchdog = watchdog;
        self
    }

    /// Gets the maximum number of items that the solver will attempt to pack.
    #[must_use]
    pub fn maximum_items(&self) -> usize {
        self.maximum_items
    }

    /// Gets the watchdog that decides when the solver abandons a search.
    #[must_use]
    pub fn watchdog(&self) -> &dyn Watchdog {
        self.watchdog.as_ref()
    }
}

impl Default for ExactSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PackingSolver for ExactSolver {
    fn solve(&self, sizes: &[u8], capacity: u8) -> Result<Packing> {
        let item_count = sizes.len();

        // Meeting the lower bound certifies the heuristic, which includes the
        // empty input.
        let heuristic = FirstFitDecreasing.solve(sizes, capacity)?;
        if heuristic.is_certified() {
            debug!("First-fit decreasing meets the lower bound for {item_count} items");
            return Ok(heuristic);
        }

        if item_count > self.maximum_items {
            return Err(Error::TooManyItems {
                count: item_count,
                limit: self.maximum_items,
            });
        }

        let formulation = Formulation::new(sizes, capacity);
        let mut options = SolveOptions::default();
        options.node_limit = Some(self.watchdog.poll_every());
        options.warm_start = Some(formulation.assignment_of(&heuristic));

        let mut outcome = formulation.problem.solve_with(options).map_err(engine_error)?;
        while !outcome.is_optimal() {
            let stats = outcome.stats();
            let progress = SearchProgress {
                nodes:   stats.nodes_solved,
                elapsed: stats.elapsed,
            };
            if self.watchdog.should_stop(&progress) {
                return Err(Error::not_optimal(format!(
                    "search abandoned after {} nodes in {:?}",
                    progress.nodes, progress.elapsed
                )));
            }
            outcome = outcome.resume().map_err(engine_error)?;
        }

        let solution = outcome
            .solution()
            .ok_or_else(|| Error::not_optimal("the engine proved optimality without a solution"))?;
        let bins = (0..item_count)
            .filter(|&bin| solution.var_value(formulation.used[bin]) > 0.5)
            .map(|bin| {
                (0..item_count)
                    .filter(|&item| solution.var_value(formulation.assign[item][bin]) > 0.5)
                    .collect()
            })
            .collect();
        let packing = Packing::new(bins, true);

        debug!(
            "Packed {item_count} items into {} bins of {capacity} bytes after {} nodes",
            packing.bin_count(),
            outcome.stats().nodes_solved
        );

        Ok(packing)
    }
}

/// The integer program for packing a given set of items.
struct Formulation {
    problem: Problem,
    assign:  Vec<Vec<Variable>>,
    used:    Vec<Variable>,
}

impl Formulation {
    fn new(sizes: &[u8], capacity: u8) -> Self {
        let item_count = sizes.len();
        let mut problem = Problem::new(OptimizationDirection::Minimize);

        let assign: Vec<Vec<Variable>> = (0..item_count)
            .map(|_| (0..item_count).map(|_| problem.add_binary_var(0.0)).collect())
            .collect();
        let used: Vec<Variable> = (0..item_count).map(|_| problem.add_binary_var(1.0)).collect();

        for row in &assign {
            problem.add_constraint(row.iter().map(|&placed| (placed, 1.0)), ComparisonOp::Eq, 1.0);
        }

        for (bin, &bin_used) in used.iter().enumerate() {
            let load = sizes
                .iter()
                .enumerate()
                .map(|(item, &size)| (assign[item][bin], f64::from(size)))
                .chain([(bin_used, -f64::from(capacity))]);
            problem.add_constraint(load, ComparisonOp::Le, 0.0);
        }

        for pair in used.windows(2) {
            problem.add_constraint([(pair[0], 1.0), (pair[1], -1.0)], ComparisonOp::Ge, 0.0);
        }

        Self {
            problem,
            assign,
            used,
        }
    }

    /// Expresses `packing` as an assignment to the variables of the program.
    fn assignment_of(&self, packing: &Packing) -> Vec<(Variable, f64)> {
        let mut values = Vec::with_capacity(self.used.len() * (self.used.len() + 1));
        for (bin, &bin_used) in self.used.iter().enumerate() {
            let members = packing.bins().get(bin);
            values.push((bin_used, if members.is_some() { 1.0 } else { 0.0 }));
            for (item, row) in self.assign.iter().enumerate() {
                let placed = members.is_some_and(|m| m.contains(&item));
                values.push((row[bin], if placed { 1.0 } else { 0.0 }));
            }
        }
        values
    }
}

fn engine_error(error: microlp::Error) -> Error {
    Error::not_optimal(error.to_string())
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::ExactSolver;
    use crate::{
        error::solver::Error,
        solver::{lower_bound, FirstFitDecreasing, PackingSolver},
        watchdog::{SearchProgress, Watchdog},
    };

    /// A watchdog that stops the search at the first opportunity.
    #[derive(Debug)]
    struct ImpatientWatchdog;

    impl Watchdog for ImpatientWatchdog {
        fn should_stop(&self, _: &SearchProgress) -> bool {
            true
        }

        fn poll_every(&self) -> u64 {
            1
        }
    }

    /// Six items of 13 bytes cannot share slots with enough of the rest to fit
    /// in seven slots, which the relaxation cannot see.
    const HARD_SIZES: [u8; 20] = [
        9, 13, 13, 10, 13, 10, 12, 13, 10, 11, 9, 12, 9, 10, 13, 13, 9, 11, 12, 9,
    ];

    #[test]
    fn packs_halves_together() -> anyhow::Result<()> {
        let sizes = [16, 32, 16];
        let packing = ExactSolver::new().solve(&sizes, 32)?;

        assert!(packing.is_certified());
        assert_eq!(packing.bin_count(), 2);
        packing.validate(&sizes, 32)?;
        assert!(packing.bins().contains(&vec![0, 2]));

        Ok(())
    }

    #[test]
    fn finds_the_optimum_for_interleaved_words() -> anyhow::Result<()> {
        let sizes = [8, 32, 8, 32, 4, 32, 1, 32];
        let packing = ExactSolver::new().solve(&sizes, 32)?;

        assert_eq!(packing.bin_count(), 5);
        packing.validate(&sizes, 32)?;

        Ok(())
    }

    #[test]
    fn uses_a_single_bin_when_everything_fits() -> anyhow::Result<()> {
        let sizes = [1, 2, 4, 8, 16];
        let packing = ExactSolver::new().solve(&sizes, 32)?;

        assert_eq!(packing.bin_count(), 1);
        assert_eq!(packing.bins()[0], vec![0, 1, 2, 3, 4]);

        Ok(())
    }

    #[test]
    fn beats_first_fit_decreasing_when_it_is_suboptimal() -> anyhow::Result<()> {
        // First-fit decreasing needs three bins here, whereas {12, 10, 10} and
        // {11, 11, 10} fit in two.
        let sizes = [12, 11, 11, 10, 10, 10];
        let packing = ExactSolver::new().solve(&sizes, 32)?;

        assert_eq!(packing.bin_count(), lower_bound(&sizes, 32));
        assert_eq!(packing.bin_count(), 2);
        packing.validate(&sizes, 32)?;

        Ok(())
    }

    #[test]
    fn handles_empty_input() -> anyhow::Result<()> {
        let packing = ExactSolver::new().solve(&[], 32)?;
        assert_eq!(packing.bin_count(), 0);
        assert!(packing.is_certified());

        Ok(())
    }

    #[test]
    fn refuses_inputs_above_the_item_limit() {
        let solver = ExactSolver::new().with_maximum_items(2);
        assert_eq!(
            solver.solve(&[20, 20, 20], 32),
            Err(Error::TooManyItems { count: 3, limit: 2 })
        );
    }

    #[test]
    fn skips_the_search_when_the_heuristic_meets_the_lower_bound() -> anyhow::Result<()> {
        // Any search at all would be abandoned, so the result must come from
        // the heuristic.
        let solver = ExactSolver::new()
            .with_maximum_items(0)
            .with_watchdog(Rc::new(ImpatientWatchdog));
        let sizes = [16, 32, 16];
        let packing = solver.solve(&sizes, 32)?;

        assert!(packing.is_certified());
        assert_eq!(packing, FirstFitDecreasing.solve(&sizes, 32)?);

        Ok(())
    }

    #[test]
    fn abandons_the_search_when_the_watchdog_says_so() {
        let solver = ExactSolver::new().with_watchdog(Rc::new(ImpatientWatchdog));
        assert!(matches!(
            solver.solve(&HARD_SIZES, 32),
            Err(Error::NotOptimal { .. })
        ));
    }

    #[test]
    fn terminates_on_inputs_the_relaxation_cannot_settle() -> anyhow::Result<()> {
        match ExactSolver::new().solve(&HARD_SIZES, 32) {
            Ok(packing) => {
                assert!(packing.is_certified());
                assert_eq!(packing.bin_count(), 8);
                packing.validate(&HARD_SIZES, 32)?;
            }
            Err(error) => assert!(matches!(error, Error::NotOptimal { .. })),
        }

        Ok(())
    }
}
