//! This library analyzes the storage layout of a smart contract's persistent
//! state. Each state variable occupies bytes in a sequence of 32-byte slots,
//! and the order in which the variables are declared determines how many
//! slots they occupy. The library finds declaration orders that let a
//! contract's storage, and each of its record (struct) types, occupy fewer
//! slots.
//!
//! The library does not parse source code. It consumes the declarations
//! produced by an external contract analyzer, described in [`contract`].
//!
//! # How it Works
//!
//! From a very high level, the analysis of a contract is performed as follows:
//!
//! 1. The contract's declarations are resolved into [`variable::VariableRecord`]s,
//!    discarding those that do not take part in packing (mappings, dynamic
//!    arrays and inherited variables).
//! 2. The [`simulator`] replays the declared order to compute the slots the
//!    items occupy today.
//! 3. A [`solver::PackingSolver`] computes the fewest slots that the items
//!    could occupy in any order.
//! 4. The [`comparator`] reports an improvement only when the packing is valid
//!    and strictly smaller than the declared layout.
//!
//! This is done for the members of every record type, and for the contract's
//! top-level state variables.
//!
//! # Basic Usage
//!
//! For the most basic usage of the library, it is sufficient to construct an
//! `Analyzer` and call the `.analyze` method, passing your contract.
//!
//! ```
//! use storage_layout_packer as slp;
//! use storage_layout_packer::{
//!     analyzer::Config,
//!     contract::{Contract, Declaration},
//! };
//!
//! let contract = Contract::new("Example")
//!     .with_variable(Declaration::new("a", "uint128"))
//!     .with_variable(Declaration::new("b", "uint256"))
//!     .with_variable(Declaration::new("c", "uint128"));
//!
//! let analysis = slp::new(contract, Config::default())
//!     .analyze()
//!     .unwrap()
//!     .into_analysis();
//!
//! assert_eq!(analysis.storage.spared_slots(), 1);
//! ```

#![warn(clippy::all, clippy::cargo, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)] // Allows for better API naming

pub mod abi;
pub mod analyzer;
pub mod batch;
pub mod comparator;
pub mod constant;
pub mod contract;
pub mod error;
pub mod layout;
pub mod records;
pub mod report;
pub mod simulator;
pub mod solver;
pub mod variable;
pub mod watchdog;

// Re-exports to provide the library interface.
pub use analyzer::{analyze_unit, new};
pub use layout::SlotMap;
