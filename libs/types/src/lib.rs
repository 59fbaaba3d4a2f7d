//! # Strand Core Types
//!
//! Shared data model for the Strand message pipeline. This crate is the
//! "pure data" layer: it defines what a message *is*, never how it is
//! processed or transported.
//!
//! ## What This Crate Contains
//! - **Message**: the per-direction property bag every interceptor reads
//!   and mutates — string-keyed properties, typed content slots, and
//!   protocol headers
//! - **Exchange**: the correlation handle pairing one request with its
//!   response and fault messages for a single invocation
//! - **Fault**: the generic failure value carried through the pipeline,
//!   with a sender/receiver-style code
//!
//! ## What This Crate Does NOT Contain
//! - Chain execution or phase ordering (belongs in chain-core)
//! - Protocol rendering of faults (belongs in soap-codec)
//! - Transport connections (out of scope for the core)
//!
//! ## Ownership Model
//!
//! A `Message` is exclusively owned by the in-flight request that created
//! it. The `Exchange` is the only shared structure: it is a cheap
//! cloneable handle, and messages parked in its slots have their exchange
//! attachment detached so the handle graph stays acyclic.

pub mod exchange;
pub mod fault;
pub mod message;

pub use exchange::Exchange;
pub use fault::{Fault, FaultCode};
pub use message::{Direction, Header, Message};
