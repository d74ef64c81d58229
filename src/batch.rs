//! This module contains the batch runner, which analyzes many input units
//! without letting the failure of one unit affect the others.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    analyzer::{analyze_unit, Config, ContractAnalysis},
    contract::SourceUnit,
    error,
    error::Errors,
};

/// The analysis of a single input unit, tagged with that unit.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct UnitAnalysis {
    /// The input unit that was analyzed, usually the path it was loaded from.
    pub unit: String,

    /// The analysis of the unit's contract.
    pub analysis: ContractAnalysis,
}

/// The results of analyzing a batch of input units.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    /// The analyses of the units that could be analyzed, in the order that the
    /// units were provided.
    pub analyses: Vec<UnitAnalysis>,

    /// The errors for the units that could not be analyzed, each located to
    /// its unit.
    pub errors: Errors,
}

impl BatchReport {
    /// Gets the total number of units in the batch.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.analyses.len() + self.errors.len()
    }

    /// Checks if every unit in the batch could be analyzed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Loads and analyzes each of the input units at `paths` using `config`.
///
/// Units that fail to load or analyze are recorded in the report's errors and
/// never abort the batch.
pub fn analyze_files<P: AsRef<Path>>(
    paths: impl IntoIterator<Item = P>,
    config: &Config,
) -> BatchReport {
    paths
        .into_iter()
        .fold(BatchReport::default(), |mut report, path| {
            let unit = path.as_ref().display().to_string();
            debug!("Analyzing {unit}");

            match analyze_file(path.as_ref(), config) {
                Ok(analysis) => report.analyses.push(UnitAnalysis { unit, analysis }),
                Err(error) => {
                    info!("Skipping {unit}: {error}");
                    report.errors.add_located(unit, error);
                }
            }

            report
        })
}

fn analyze_file(path: &Path, config: &Config) -> error::Result<ContractAnalysis> {
    let unit = SourceUnit::from_file(path)?;
    analyze_unit(&unit, config.clone())
}
