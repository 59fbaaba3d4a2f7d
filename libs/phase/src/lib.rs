//! # Strand Phase Registry
//!
//! Defines the canonical, total ordering of named stages through which
//! every message passes. A phase set is fixed configuration: registries
//! are built once at startup, validated eagerly, and treated as
//! immutable by the chain layer afterwards.
//!
//! ## Built-in Ladders
//!
//! - Inbound: `receive → … → unmarshal → … → invoke → post-invoke`
//! - Outbound: `setup → … → marshal → … → write → send`
//! - Fault ladders: strict subsets of the above used when a failure is
//!   routed through its own serialization chain
//!
//! Custom phases are inserted relative to existing ones; referencing an
//! unknown anchor phase fails at registration time, never at run time.
//!
//! ## Usage
//!
//! ```rust
//! use phase::{names, PhaseRegistry};
//!
//! let mut registry = PhaseRegistry::outbound();
//! registry.insert_after("audit", names::MARSHAL).unwrap();
//! assert!(registry.index_of("audit") > registry.index_of(names::MARSHAL));
//! ```

pub mod config;
pub mod registry;

pub use config::{PhaseConfig, PhaseEntry};
pub use registry::{names, Phase, PhaseError, PhaseRegistry};
