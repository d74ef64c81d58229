//! This module contains the type definitions necessary to bound the effort that
//! the exact solver spends on a single packing problem.
//!
//! # Best-Effort Monitoring
//!
//! Note that the monitoring provided by the watchdog is a best-effort approach.
//! The solver only polls the watchdog between batches of branch-and-bound
//! nodes, so a search may overrun its budget by up to one batch before it is
//! abandoned.

use std::{fmt::Debug, rc::Rc, time::Duration};

use crate::constant::{
    DEFAULT_SOLVER_NODE_BUDGET,
    DEFAULT_SOLVER_TIME_BUDGET,
    DEFAULT_WATCHDOG_POLL_NODES,
};

/// A dynamically dispatched [`Watchdog`] instance.
pub type DynWatchdog = Rc<dyn Watchdog>;

/// The work a solver has performed on the current problem so far.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SearchProgress {
    /// The number of branch-and-bound nodes whose relaxation has been solved.
    pub nodes: u64,

    /// The time spent inside the solving engine.
    pub elapsed: Duration,
}

/// The interface to an object that can be polled to see if the solver needs to
/// abandon its search.
///
/// The interface is simple, but it can encapsulate arbitrary logic as far as
/// the solver is concerned, allowing the client to implement complex stop
/// logic.
pub trait Watchdog
where
    Self: Debug,
{
    /// Checks if the solver should abandon its search given the `progress` it
    /// has made on the current problem.
    #[must_use]
    fn should_stop(&self, progress: &SearchProgress) -> bool;

    /// Gets the number of branch-and-bound nodes the solver should explore
    /// before polling the watchdog.
    #[must_use]
    fn poll_every(&self) -> u64;
}

/// A watchdog that tells the solver to stop once it has exhausted a budget of
/// nodes or of time, whichever runs out first.
///
/// By default, it allows [`DEFAULT_SOLVER_NODE_BUDGET`] nodes and
/// [`DEFAULT_SOLVER_TIME_BUDGET`], and is polled every
/// [`DEFAULT_WATCHDOG_POLL_NODES`] nodes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BudgetWatchdog {
    /// The number of nodes after which the search is abandoned.
    max_nodes: u64,

    /// The engine time after which the search is abandoned.
    max_elapsed: Duration,

    /// The number of nodes the solver should explore between polls.
    poll_nodes: u64,
}

impl BudgetWatchdog {
    /// Constructs a new `BudgetWatchdog` with the default budgets.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_nodes:   DEFAULT_SOLVER_NODE_BUDGET,
            max_elapsed: DEFAULT_SOLVER_TIME_BUDGET,
            poll_nodes:  DEFAULT_WATCHDOG_POLL_NODES,
        }
    }

    /// Sets the number of nodes after which the search is abandoned.
    #[must_use]
    pub fn with_max_nodes(mut self, nodes: u64) -> Self {
        self.max_nodes = nodes;
        self
    }

    /// Sets the engine time after which the search is abandoned.
    #[must_use]
    pub fn with_max_elapsed(mut self, elapsed: Duration) -> Self {
        self.max_elapsed = elapsed;
        self
    }

    /// Specifies the number of nodes that the solver should explore before
    /// polling the watchdog for status.
    ///
    /// A value of zero is treated as one.
    #[must_use]
    pub fn polling_every(mut self, nodes: u64) -> Self {
        self.poll_nodes = nodes.max(1);
        self
    }

    /// Wraps the watchdog into an [`Rc`].
    #[must_use]
    pub fn in_rc(self) -> DynWatchdog {
        Rc::new(self)
    }
}

impl Default for BudgetWatchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog for BudgetWatchdog {
    fn should_stop(&self, progress: &SearchProgress) -> bool {
        progress.nodes >= self.max_nodes || progress.elapsed >= self.max_elapsed
    }

    fn poll_every(&self) -> u64 {
        self.poll_nodes
    }
}
