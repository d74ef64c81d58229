//! This module contains the state tracking functionality for the analyzer.

use std::fmt::Debug;

use crate::{
    analyzer::ContractAnalysis,
    records::{RecordType, RecordsAnalysis},
    variable::VariableRecord,
};

/// A marker trait that says that the type implementing it is an analyzer state.
pub trait State
where
    Self: Clone + Debug + Sized,
{
}

/// The initial state for the analyzer.
#[derive(Clone, Debug)]
pub struct HasContract;
impl State for HasContract {}

/// The analyzer has resolved the declarations of the contract into the items
/// that take part in packing.
#[derive(Clone, Debug)]
pub struct VariablesResolved {
    /// The eligible top-level state variables, in declaration order, or
    /// [`None`] if any of them could not be sized.
    pub variables: Option<Vec<VariableRecord>>,

    /// The record types declared by the contract, in declaration order.
    pub record_types: Vec<RecordType>,
}
impl State for VariablesResolved {}

/// The analyzer has compared the declared member order of every record type
/// against its optimal packing.
#[derive(Clone, Debug)]
pub struct RecordsAnalyzed {
    /// The eligible top-level state variables, in declaration order, or
    /// [`None`] if any of them could not be sized.
    pub variables: Option<Vec<VariableRecord>>,

    /// The packing results for the record types.
    pub records: RecordsAnalysis,
}
impl State for RecordsAnalyzed {}

/// The analyzer has compared both the record types and the storage of the
/// contract, and holds the final results.
#[derive(Clone, Debug)]
pub struct AnalysisComplete {
    /// The results of analyzing the contract.
    pub analysis: ContractAnalysis,
}
impl State for AnalysisComplete {}
