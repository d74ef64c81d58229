//! This module contains the types that represent the output of the external
//! contract analyzer: the contracts of a source unit, their state variables in
//! declaration order, and the record types they declare.
//!
//! These are read from JSON of the following shape:
//!
//! ```json
//! {
//!   "contracts": [
//!     {
//!       "name": "Example",
//!       "stateVariables": [
//!         { "name": "a", "type": "uint128" },
//!         { "name": "data", "type": "Data", "kind": "record" },
//!         { "name": "balances", "type": "mapping(address => uint256)", "dynamic": true }
//!       ],
//!       "records": [
//!         { "name": "Data", "members": [{ "name": "x", "type": "bytes23" }] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! The `size` of an elementary declaration may be omitted when it can be
//! inferred from its type.

use std::{fs::File, io::Read, path::Path};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    abi::ElementaryType,
    error::{analysis, input},
    records::RecordType,
    variable::{VariableKind, VariableRecord},
};

/// The contracts defined in a single input unit.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceUnit {
    #[serde(default)]
    pub contracts: Vec<Contract>,
}

impl SourceUnit {
    /// Reads a source unit from the JSON file at the provided `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the file cannot be read or is not a valid source
    /// unit.
    pub fn from_file(path: impl AsRef<Path>) -> input::Result<Self> {
        let path = path.as_ref();
        let io_error = |e: std::io::Error| input::Error::Io {
            path:    path.display().to_string(),
            message: e.to_string(),
        };

        let mut file = File::open(path).map_err(io_error)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(io_error)?;

        Self::from_json(&contents)
    }

    /// Reads a source unit from the provided JSON `text`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `text` is not a valid source unit.
    pub fn from_json(text: &str) -> input::Result<Self> {
        serde_json::from_str(text).map_err(|e| input::Error::Malformed {
            message: e.to_string(),
        })
    }

    /// Gets the contract that is to be analyzed for this unit.
    ///
    /// Only the first contract in a unit is analyzed.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the unit does not contain any contract.
    pub fn primary_contract(&self) -> analysis::Result<&Contract> {
        self.contracts
            .first()
            .ok_or(analysis::Error::NoEligibleContract)
    }
}

/// A contract as described by the external analyzer.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    /// The name of the contract.
    pub name: String,

    /// The state variables of the contract, in declaration order.
    #[serde(default)]
    pub state_variables: Vec<Declaration>,

    /// The record types declared by the contract, in declaration order.
    #[serde(default)]
    pub records: Vec<RecordDeclaration>,
}

impl Contract {
    /// Constructs a new contract called `name` with no declarations.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:            name.into(),
            state_variables: Vec::new(),
            records:         Vec::new(),
        }
    }

    /// Adds `declaration` to the end of the contract's state variables.
    #[must_use]
    pub fn with_variable(mut self, declaration: Declaration) -> Self {
        self.state_variables.push(declaration);
        self
    }

    /// Adds `record` to the end of the contract's record types.
    #[must_use]
    pub fn with_record(mut self, record: RecordDeclaration) -> Self {
        self.records.push(record);
        self
    }

    /// Gets the state variable declarations that take part in packing, namely
    /// those that are neither dynamic nor inherited, along with their position
    /// in the full declaration sequence.
    pub fn eligible_declarations(&self) -> impl Iterator<Item = (usize, &Declaration)> {
        self.state_variables
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.dynamic && !d.inherited)
    }

    /// Resolves the state variables that take part in packing.
    ///
    /// The resolved variables keep their position in the full declaration
    /// sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the size of an eligible variable cannot be
    /// determined or does not fit in a slot.
    pub fn eligible_variables(&self) -> input::Result<Vec<VariableRecord>> {
        self.eligible_declarations()
            .map(|(i, d)| d.resolve(i))
            .collect()
    }

    /// Resolves the record types declared by the contract, dropping any
    /// dynamic members.
    ///
    /// A record type with a member that cannot be resolved is skipped with a
    /// warning, as its layout cannot be simulated. The remaining record types
    /// keep their position in the declaration sequence.
    pub fn record_types(&self) -> Vec<RecordType> {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(position, record)| {
                let members = record
                    .members
                    .iter()
                    .enumerate()
                    .filter(|(_, d)| !d.dynamic)
                    .map(|(i, d)| d.resolve(i))
                    .collect::<input::Result<Vec<_>>>();
                match members {
                    Ok(members) => Some(RecordType::new(record.name.clone(), position, members)),
                    Err(error) => {
                        warn!("Skipping struct {} in {}: {error}", record.name, self.name);
                        None
                    }
                }
            })
            .collect()
    }
}

/// A record type as described by the external analyzer.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDeclaration {
    /// The name of the record type.
    pub name: String,

    /// The members of the record type, in declaration order.
    #[serde(default)]
    pub members: Vec<Declaration>,
}

impl RecordDeclaration {
    /// Constructs a new record declaration called `name` with `members`.
    #[must_use]
    pub fn new(name: impl Into<String>, members: Vec<Declaration>) -> Self {
        let name = name.into();
        Self { name, members }
    }
}

/// A single declared variable as described by the external analyzer.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    /// The declared name.
    pub name: String,

    /// The declared type, as written in the source.
    #[serde(rename = "type")]
    pub type_label: String,

    /// The storage size in bytes, if known.
    #[serde(default)]
    pub size: Option<usize>,

    /// The shape of the variable.
    #[serde(default)]
    pub kind: VariableKind,

    /// Whether the variable is a mapping or dynamically-sized array.
    #[serde(default)]
    pub dynamic: bool,

    /// Whether the variable is declared in a parent contract.
    #[serde(default)]
    pub inherited: bool,
}

impl Declaration {
    /// Constructs a new elementary declaration whose size is inferred from
    /// `type_label`.
    #[must_use]
    pub fn new(name: impl Into<String>, type_label: impl Into<String>) -> Self {
        Self {
            name:       name.into(),
            type_label: type_label.into(),
            size:       None,
            kind:       VariableKind::Elementary,
            dynamic:    false,
            inherited:  false,
        }
    }

    /// Sets the `kind` of the declaration to `value`.
    #[must_use]
    pub fn with_kind(mut self, value: VariableKind) -> Self {
        self.kind = value;
        self
    }

    /// Sets the `size` of the declaration to `value`.
    #[must_use]
    pub fn with_size(mut self, value: usize) -> Self {
        self.size = Some(value);
        self
    }

    /// Marks the declaration as dynamically sized.
    #[must_use]
    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    /// Marks the declaration as inherited.
    #[must_use]
    pub fn inherited(mut self) -> Self {
        self.inherited = true;
        self
    }

    /// Resolves the declaration into a packable item at `declaration_index`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the size of an elementary declaration cannot be
    /// determined or does not fit in a slot.
    pub fn resolve(&self, declaration_index: usize) -> input::Result<VariableRecord> {
        match self.kind {
            VariableKind::Record => Ok(VariableRecord::record(
                &self.name,
                &self.type_label,
                declaration_index,
            )),
            VariableKind::Array => Ok(VariableRecord::array(
                &self.name,
                &self.type_label,
                declaration_index,
            )),
            VariableKind::Elementary => {
                let size = self
                    .size
                    .or_else(|| {
                        ElementaryType::parse(&self.type_label).map(|t| usize::from(t.size_bytes()))
                    })
                    .ok_or_else(|| input::Error::UnknownSize {
                        name:       self.name.clone(),
                        type_label: self.type_label.clone(),
                    })?;
                VariableRecord::elementary(&self.name, &self.type_label, size, declaration_index)
            }
        }
    }
}
