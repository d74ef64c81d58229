//! This module contains the record-type aggregator, which checks whether the
//! members of each declared record (struct) type are tightly packed.

use serde::Serialize;
use tracing::debug;

use crate::{
    comparator::{compare, PackingOutcome},
    solver::PackingSolver,
    variable::VariableRecord,
};

/// A declared record type and its eligible members, in declaration order.
///
/// Members that are themselves records or arrays appear as single
/// [`crate::variable::VariableKind::Record`] or
/// [`crate::variable::VariableKind::Array`] items, and are not unpacked.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RecordType {
    name:     String,
    position: usize,
    members:  Vec<VariableRecord>,
}

impl RecordType {
    /// Constructs a new record type called `name`, declared at `position`
    /// among the record types of its contract.
    #[must_use]
    pub fn new(name: impl Into<String>, position: usize, members: Vec<VariableRecord>) -> Self {
        let name = name.into();
        Self {
            name,
            position,
            members,
        }
    }

    /// Gets the name of the record type.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the position of the record type among its contract's record types.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Gets the members of the record type in declaration order.
    #[must_use]
    pub fn members(&self) -> &[VariableRecord] {
        self.members.as_slice()
    }
}

/// The packing outcome for a single record type, associated with the identity
/// of that record type.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RecordAnalysis {
    /// The name of the record type.
    pub record: String,

    /// The position of the record type among its contract's record types.
    pub position: usize,

    /// The outcome of packing the record's members.
    pub outcome: PackingOutcome,
}

/// The aggregate of the packing outcomes for all of a contract's record types.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RecordsAnalysis {
    /// The total number of slots that could be spared across all records.
    pub total_spared: usize,

    /// The records whose members can be packed into fewer slots, in
    /// declaration order.
    pub improvable: Vec<RecordAnalysis>,
}

impl RecordsAnalysis {
    /// Checks if every record type is already tightly packed.
    #[must_use]
    pub fn is_tight(&self) -> bool {
        self.total_spared == 0
    }

    /// Gets the analysis for the record type called `name`, if it can be
    /// improved.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RecordAnalysis> {
        self.improvable.iter().find(|r| r.record == name)
    }
}

/// Compares the declared member order of each of `record_types` against the
/// best packing found by `solver`.
#[must_use]
pub fn analyze_records(record_types: &[RecordType], solver: &dyn PackingSolver) -> RecordsAnalysis {
    record_types
        .iter()
        .fold(RecordsAnalysis::default(), |mut analysis, record| {
            debug!("Analyzing the members of {}", record.name());
            let outcome = compare(record.members(), solver);

            if !outcome.is_tight() {
                debug!(
                    "{} is not tightly packed, {} slots can be spared",
                    record.name(),
                    outcome.spared_slots()
                );
                analysis.total_spared += outcome.spared_slots();
                analysis.improvable.push(RecordAnalysis {
                    record:   record.name().to_string(),
                    position: record.position(),
                    outcome,
                });
            }

            analysis
        })
}

#[cfg(test)]
mod tests {
    use super::{analyze_records, RecordType};
    use crate::{solver::ExactSolver, variable::VariableRecord};

    fn members(sizes: &[usize]) -> Vec<VariableRecord> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| {
                VariableRecord::elementary(format!("m{i}"), format!("bytes{size}"), size, i)
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn aggregates_only_improvable_records() {
        let records = vec![
            RecordType::new("Cheap", 0, members(&[1, 1, 1, 1, 1, 1, 1, 1])),
            RecordType::new("Expensive", 1, members(&[8, 32, 8, 32, 4, 32, 1, 32])),
            RecordType::new("Child", 2, members(&[16, 32, 16])),
        ];
        let analysis = analyze_records(&records, &ExactSolver::new());

        assert_eq!(analysis.total_spared, 4);
        assert_eq!(analysis.improvable.len(), 2);
        assert!(analysis.get("Cheap").is_none());

        let expensive = analysis.get("Expensive").unwrap();
        assert_eq!(expensive.position, 1);
        assert_eq!(expensive.outcome.spared_slots(), 3);
        assert_eq!(expensive.outcome.optimized().unwrap().slot_count(), 5);

        assert_eq!(analysis.improvable[1].record, "Child");
    }

    #[test]
    fn treats_nested_records_as_opaque() -> anyhow::Result<()> {
        let nested = vec![
            VariableRecord::record("nested_a", "ExpensiveStruct", 0),
            VariableRecord::elementary("nested_b", "uint128", 16, 1)?,
            VariableRecord::record("nested_c", "ChildStruct", 2),
            VariableRecord::elementary("nested_d", "uint256", 32, 3)?,
            VariableRecord::elementary("nested_e", "uint128", 16, 4)?,
        ];
        let records = vec![RecordType::new("NestedExpensive", 0, nested)];
        let analysis = analyze_records(&records, &ExactSolver::new());

        assert_eq!(analysis.total_spared, 1);
        let outcome = &analysis.improvable[0].outcome;
        assert_eq!(outcome.optimized().unwrap().slot_count(), 4);

        Ok(())
    }

    #[test]
    fn is_tight_without_records() {
        let analysis = analyze_records(&[], &ExactSolver::new());
        assert!(analysis.is_tight());
        assert!(analysis.improvable.is_empty());
    }
}
