//! This module contains the human-readable rendering of a contract's packing
//! analysis.

use std::fmt::{Display, Formatter};

use crate::{analyzer::ContractAnalysis, layout::SlotMap};

/// The text report for the analysis of a single contract from the input unit
/// called `unit`.
///
/// Each improvable record type and the contract's storage are listed along
/// with a declaration order that achieves the smaller layout, one `{type}
/// {name}` line per item.
#[derive(Clone, Copy, Debug)]
pub struct Report<'a> {
    unit:     &'a str,
    analysis: &'a ContractAnalysis,
}

impl<'a> Report<'a> {
    /// Constructs a report for the `analysis` of a contract from `unit`.
    #[must_use]
    pub fn new(unit: &'a str, analysis: &'a ContractAnalysis) -> Self {
        Self { unit, analysis }
    }

    fn write_order(f: &mut Formatter<'_>, slots: Option<&SlotMap>) -> std::fmt::Result {
        for variable in slots.into_iter().flat_map(|s| s.variables()) {
            writeln!(f, "{variable}")?;
        }
        Ok(())
    }
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let unit = self.unit;
        let contract = &self.analysis.contract;
        let records = &self.analysis.records;
        let storage = &self.analysis.storage;

        if !records.is_tight() {
            writeln!(f, "{unit} -> {contract}'s structs are not tight packed.")?;
            writeln!(
                f,
                "{} slot(s) could be spared by defining them in this order:",
                records.total_spared
            )?;
            for record in &records.improvable {
                writeln!(f, "{contract} -> {}:", record.record)?;
                Self::write_order(f, record.outcome.optimized())?;
            }
        }

        if storage.is_tight() {
            writeln!(f, "{unit} -> {contract}'s storage is tight packed.")
        } else {
            writeln!(f, "{unit} -> {contract}'s storage is not tight packed.")?;
            writeln!(
                f,
                "{} slot(s) could be spared by declaring the state variables in this order:",
                storage.spared_slots()
            )?;
            Self::write_order(f, storage.optimized())
        }
    }
}
