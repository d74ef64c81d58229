//! This module contains the definition of the analyzer itself.

pub mod state;

use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    analyzer::state::State,
    comparator::{compare, PackingOutcome},
    constant::DEFAULT_MINIMUM_STORAGE_VARIABLES,
    contract::{Contract, SourceUnit},
    error,
    error::analysis,
    records::{analyze_records, RecordsAnalysis},
    solver::{DynSolver, ExactSolver},
};

/// Creates a new analyzer wrapping the provided `contract`, using the
/// provided `config` to control its behaviour.
#[must_use]
pub fn new(contract: Contract, config: Config) -> Analyzer<state::HasContract> {
    let state = state::HasContract;
    Analyzer {
        contract,
        config,
        state,
    }
}

/// Analyzes the first contract in the provided `unit`.
///
/// # Errors
///
/// Returns [`Err`] if the unit contains no contract, or if the contract cannot
/// be analyzed.
pub fn analyze_unit(unit: &SourceUnit, config: Config) -> error::Result<ContractAnalysis> {
    let contract = unit.primary_contract()?.clone();
    let analyzer = new(contract, config).analyze()?;

    Ok(analyzer.into_analysis())
}

/// The core of the packing analysis, the `Analyzer` is responsible for
/// ingesting a contract's declarations and reporting how its storage and
/// record types could be declared to occupy fewer slots.
///
/// # Basic Usage
///
/// For the most basic usage of the library, it is sufficient to construct an
/// `Analyzer` and call the `.analyze` method, or to call [`analyze_unit`] with
/// an entire source unit.
///
/// # Enforcing Valid State Transitions
///
/// The analyzer enforces that only correct state transitions can occur through
/// use of structs that implement the exact state required by it at any given
/// point.
///
/// There is the [`Self::state`] function that provides access to the state data
/// of whichever state it is in.
#[derive(Debug)]
pub struct Analyzer<S: State> {
    /// The contract that is being analyzed.
    contract: Contract,

    /// The configuration for the analysis.
    config: Config,

    /// The internal state of the analyzer.
    state: S,
}

/// Safe operations available in all states.
impl<S: State> Analyzer<S> {
    /// Gets a reference to the contract being analyzed.
    #[must_use]
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Gets a reference to the configuration of the analyzer.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gets a reference to the current state of the analyzer.
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }
}

/// Unsafe operations available in all states.
///
/// These operations are capable of **violating the state invariants** of the
/// analyzer, and must be used with the _utmost_ care.
impl<S: State> Analyzer<S> {
    /// Forces the analyzer into `new_state`, disregarding any safety with
    /// regards to state transitions.
    ///
    /// # Safety
    ///
    /// Do not force a state transition for the analyzer unless you totally
    /// understand the state that the analyzer is in, and the implications
    /// of doing so.
    pub unsafe fn set_state<NS: State>(self, new_state: NS) -> Analyzer<NS> {
        Analyzer {
            contract: self.contract,
            config:   self.config,
            state:    new_state,
        }
    }

    /// Forces the analyzer into the state `NS`, with the value of the state
    /// created by applying `transform` to the analyzer's current state and
    /// disregarding any safety with regard to state transitions.
    ///
    /// # Safety
    ///
    /// Do not force a state transition for the analyzer unless you totally
    /// understand the state that the analyzer is in, and the implications
    /// of doing so.
    pub unsafe fn transform_state<NS: State>(
        self,
        transform: impl FnOnce(&Contract, &Config, S) -> error::Result<NS>,
    ) -> error::Result<Analyzer<NS>> {
        let state = transform(&self.contract, &self.config, self.state)?;
        let contract = self.contract;
        let config = self.config;

        Ok(Analyzer {
            contract,
            config,
            state,
        })
    }
}

/// Operations available on a newly-created analyzer.
impl Analyzer<state::HasContract> {
    /// Executes the analysis process for beginning to end, performing all the
    /// intermediate steps automatically.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the contract's declarations cannot be resolved, or
    /// if it has no eligible state variables.
    pub fn analyze(self) -> error::Result<Analyzer<state::AnalysisComplete>> {
        let analyzer = self.resolve_variables()?;
        let analyzer = analyzer.analyze_records()?;
        let analyzer = analyzer.analyze_storage()?;

        Ok(analyzer)
    }

    /// Resolves the contract's declarations into the state variables and
    /// record types that take part in packing.
    ///
    /// Declarations that cannot be sized do not abort the analysis. A record
    /// type with such a member is left out, and a state variable without a
    /// size means that the contract's storage is not compared at all.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if no state variable is eligible for packing.
    pub fn resolve_variables(self) -> error::Result<Analyzer<state::VariablesResolved>> {
        unsafe {
            self.transform_state(|contract, _, _| {
                if contract.eligible_declarations().next().is_none() {
                    return Err(analysis::Error::NoEligibleVariables {
                        contract: contract.name.clone(),
                    }
                    .into());
                }
                let variables = match contract.eligible_variables() {
                    Ok(variables) => Some(variables),
                    Err(error) => {
                        warn!("Skipping the storage of {}: {error}", contract.name);
                        None
                    }
                };
                let record_types = contract.record_types();
                debug!(
                    "Resolved {} state variables and {} record types in {}",
                    variables.as_ref().map_or(0, Vec::len),
                    record_types.len(),
                    contract.name
                );

                Ok(state::VariablesResolved {
                    variables,
                    record_types,
                })
            })
        }
    }
}

/// Operations available on an analyzer that has resolved the contract's
/// declarations.
impl Analyzer<state::VariablesResolved> {
    /// Compares the declared member order of every record type against its
    /// optimal packing.
    ///
    /// # Errors
    ///
    /// This step does not currently fail, as solver failures are treated as
    /// the absence of an improvement.
    pub fn analyze_records(self) -> error::Result<Analyzer<state::RecordsAnalyzed>> {
        unsafe {
            self.transform_state(|_, config, old_state| {
                let records = analyze_records(&old_state.record_types, config.solver.as_ref());
                Ok(state::RecordsAnalyzed {
                    variables: old_state.variables,
                    records,
                })
            })
        }
    }
}

/// Operations available on an analyzer that has analyzed the contract's
/// record types.
impl Analyzer<state::RecordsAnalyzed> {
    /// Compares the declared order of the contract's state variables against
    /// their optimal packing.
    ///
    /// Contracts with fewer than [`Config::minimum_storage_variables`] state
    /// variables, or with a state variable that could not be sized, are
    /// considered tightly packed without comparison.
    ///
    /// # Errors
    ///
    /// This step does not currently fail, as solver failures are treated as
    /// the absence of an improvement.
    pub fn analyze_storage(self) -> error::Result<Analyzer<state::AnalysisComplete>> {
        let storage = match &self.state.variables {
            None => PackingOutcome::tight(),
            Some(variables) if variables.len() < self.config.minimum_storage_variables => {
                info!(
                    "Skipping the storage of {} as it has only {} state variables",
                    self.contract.name,
                    variables.len()
                );
                PackingOutcome::tight()
            }
            Some(variables) => compare(variables, self.config.solver.as_ref()),
        };

        let analysis = ContractAnalysis {
            contract: self.contract.name.clone(),
            records: self.state.records.clone(),
            storage,
        };

        Ok(unsafe { self.set_state(state::AnalysisComplete { analysis }) })
    }
}

/// Operations available on an analyzer that has completed its analysis.
impl Analyzer<state::AnalysisComplete> {
    /// Consumes the analyzer, returning the results of the analysis.
    #[must_use]
    pub fn into_analysis(self) -> ContractAnalysis {
        self.state.analysis
    }
}

/// The result of analyzing a single contract.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ContractAnalysis {
    /// The name of the analyzed contract.
    pub contract: String,

    /// The packing results for the contract's record types.
    pub records: RecordsAnalysis,

    /// The packing result for the contract's top-level state variables.
    pub storage: PackingOutcome,
}

impl ContractAnalysis {
    /// Checks if neither the record types nor the storage of the contract can
    /// be packed into fewer slots.
    #[must_use]
    pub fn is_tight(&self) -> bool {
        self.records.is_tight() && self.storage.is_tight()
    }
}

/// The configuration for the analyzer.
#[derive(Clone, Debug)]
pub struct Config {
    /// The solver used to find the best packing of a set of items.
    ///
    /// Defaults to [`ExactSolver`].
    pub solver: DynSolver,

    /// The number of eligible state variables that a contract must have before
    /// its storage is analyzed.
    ///
    /// Defaults to [`DEFAULT_MINIMUM_STORAGE_VARIABLES`].
    pub minimum_storage_variables: usize,
}

impl Config {
    /// Sets the `solver` config parameter to `value`.
    #[must_use]
    pub fn with_solver(mut self, value: DynSolver) -> Self {
        self.solver = value;
        self
    }

    /// Sets the `minimum_storage_variables` config parameter to `value`.
    #[must_use]
    pub fn with_minimum_storage_variables(mut self, value: usize) -> Self {
        self.minimum_storage_variables = value;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solver:                    Rc::new(ExactSolver::default()),
            minimum_storage_variables: DEFAULT_MINIMUM_STORAGE_VARIABLES,
        }
    }
}
