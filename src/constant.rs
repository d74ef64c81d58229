//! This module contains constants that are needed throughout the codebase.

use std::time::Duration;

/// The width of a byte on the EVM (and most other places) in bits.
pub const BYTE_SIZE_BITS: usize = 8;

/// The width of a storage slot on the EVM in bits.
pub const SLOT_SIZE_BITS: usize = 256;

/// The width of a storage slot on the EVM in bytes.
///
/// This is the capacity of every bin in the packing problem.
#[allow(clippy::cast_possible_truncation)] // 256 / 8 always fits
pub const SLOT_SIZE_BYTES: u8 = (SLOT_SIZE_BITS / BYTE_SIZE_BITS) as u8;

/// The byte size of an address type.
pub const ADDRESS_SIZE_BYTES: u8 = 20;

/// The byte size of an external function type, an address followed by a
/// four-byte selector.
pub const EXTERNAL_FUNCTION_SIZE_BYTES: u8 = ADDRESS_SIZE_BYTES + 4;

/// The byte size of an internal function type, which is a code offset.
pub const INTERNAL_FUNCTION_SIZE_BYTES: u8 = 8;

/// The byte size of a boolean.
pub const BOOL_SIZE_BYTES: u8 = 1;

/// The byte size of an enum with at most 256 members, which is the only kind
/// Solidity allows.
pub const ENUM_SIZE_BYTES: u8 = 1;

/// The default number of eligible top-level state variables a contract must
/// declare before its storage is compared against the optimal packing.
///
/// Fewer than three elementary items can never be packed into fewer slots by
/// reordering them.
pub const DEFAULT_MINIMUM_STORAGE_VARIABLES: usize = 3;

/// The default maximum number of items that the exact solver will attempt to
/// pack.
///
/// The formulation grows quadratically in the number of items, so this bounds
/// the time spent on pathological inputs.
pub const DEFAULT_MAXIMUM_SOLVER_ITEMS: usize = 48;

/// The default number of branch-and-bound nodes the exact solver explores
/// between polls of its watchdog.
pub const DEFAULT_WATCHDOG_POLL_NODES: u64 = 64;

/// The default number of branch-and-bound nodes the exact solver may explore
/// for a single problem before giving up.
pub const DEFAULT_SOLVER_NODE_BUDGET: u64 = 200_000;

/// The default wall-clock time the exact solver may spend on a single problem
/// before giving up.
pub const DEFAULT_SOLVER_TIME_BUDGET: Duration = Duration::from_secs(2);
