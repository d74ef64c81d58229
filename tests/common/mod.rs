//! This module contains common utilities for simplifying the writing of
//! integration tests for this library.

#![cfg(test)]

use std::path::PathBuf;

use storage_layout_packer::{
    analyzer::{analyze_unit, Config, ContractAnalysis},
    contract::SourceUnit,
    records::RecordAnalysis,
    variable::VariableRecord,
};

/// Gets the path to the fixture called `name` in the assets directory.
#[allow(unused)] // It is actually
pub fn asset_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("asset")
        .join(format!("{name}.json"))
}

/// Loads the source unit from the fixture called `name`.
#[allow(unused)] // It is actually
pub fn load_unit(name: &str) -> anyhow::Result<SourceUnit> {
    Ok(SourceUnit::from_file(asset_path(name))?)
}

/// Analyzes the source unit from the fixture called `name`, using the default
/// configuration.
#[allow(unused)] // It is actually
pub fn analyze_asset(name: &str) -> anyhow::Result<ContractAnalysis> {
    analyze_asset_with(name, Config::default())
}

/// Analyzes the source unit from the fixture called `name`, using the provided
/// `config`.
#[allow(unused)] // It is actually
pub fn analyze_asset_with(name: &str, config: Config) -> anyhow::Result<ContractAnalysis> {
    let unit = load_unit(name)?;
    Ok(analyze_unit(&unit, config)?)
}

/// Gets the analysis of the improvable record type called `name`, failing if
/// the record is already tight.
#[allow(unused)] // It is actually
pub fn improvable_record<'a>(
    analysis: &'a ContractAnalysis,
    name: &str,
) -> anyhow::Result<&'a RecordAnalysis> {
    analysis
        .records
        .get(name)
        .ok_or_else(|| anyhow::anyhow!("{name} was expected to be improvable"))
}

/// Gets the number of slots in the improved layout of the record type called
/// `name`.
#[allow(unused)] // It is actually
pub fn optimized_slot_count(analysis: &ContractAnalysis, name: &str) -> anyhow::Result<usize> {
    let record = improvable_record(analysis, name)?;
    let slots = record
        .outcome
        .optimized()
        .ok_or_else(|| anyhow::anyhow!("{name} has no improved layout"))?;
    Ok(slots.slot_count())
}

/// Gets the declared names of `variables`, in order.
#[allow(unused)] // It is actually
pub fn names<'a>(variables: impl IntoIterator<Item = &'a VariableRecord>) -> Vec<&'a str> {
    variables.into_iter().map(VariableRecord::name).collect()
}
