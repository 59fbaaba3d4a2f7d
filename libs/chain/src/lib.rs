//! # Strand Interceptor Chain Engine
//!
//! The processing backbone shared by every binding and transport: an
//! ordered sequence of interceptors, partitioned by phase, executed
//! sequentially over one message. On failure the chain reverses
//! direction and unwinds the interceptors that already ran.
//!
//! ## Architecture Role
//!
//! ```text
//! phase/        → [chain-core]        → soap-codec, transports
//!   ↑                  ↓                       ↓
//! Stage order    Chain execution         Protocol rendering
//! Fail-fast      Fault routing           Wire I/O
//! config         Suspend/resume
//! ```
//!
//! ## What This Crate Contains
//! - **Interceptor**: the unit of message processing, bound to a phase
//! - **PhaseInterceptorChain**: the chain state machine with cursor,
//!   unwind, and suspend/resume support
//! - **FaultChainInitiator**: bridges a failed chain into a dedicated
//!   fault-serialization chain
//! - **Binding / Conduit / Destination**: the seams where protocol and
//!   transport implementations plug in
//!
//! ## What This Crate Does NOT Contain
//! - Phase definitions (belongs in phase/)
//! - Message/Exchange data structures (belongs in types/)
//! - Any wire format (belongs in binding crates such as soap-codec)
//!
//! ## Concurrency Model
//!
//! One chain drives one message on one thread. Suspension is the only
//! hand-off seam: the chain is `Send`, and `resume()` may be called
//! from a different thread than the one that suspended it.

pub mod binding;
pub mod chain;
pub mod error;
pub mod observer;
pub mod test_utils;

pub use binding::{Binding, Conduit, Destination};
pub use chain::{ChainState, Outcome, PhaseInterceptorChain};
pub use error::ChainError;
pub use observer::{
    FaultChainInitiator, InFaultChainInitiator, MessageObserver, OutFaultChainInitiator,
};

use types::{Fault, Message};

/// What an interceptor asks the chain to do next
///
/// Control flow is expressed through return values, never by unwinding
/// the stack: a fault is `Err(Fault)`, a suspension is a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Proceed to the next interceptor
    Continue,
    /// Park the chain; the current caller will continue it shortly
    Pause,
    /// Park the chain and return control to the transport; a later
    /// `resume()` call, possibly from another thread, continues it
    Suspend,
}

/// A unit of message processing bound to one phase
///
/// `handle_message` may mutate the message, set exchange-scoped
/// properties, or fail with a `Fault`. Effects are observable only
/// through the shared Message/Exchange state — downstream interceptors
/// read what earlier ones wrote.
///
/// `handle_fault` runs only during unwind, in reverse order over the
/// interceptors that already executed. It is best-effort cleanup: a
/// returned error is logged by the chain and never propagated.
pub trait Interceptor: Send + Sync {
    /// Stable identifier, unique within the interceptor's phase
    fn id(&self) -> &str;

    /// Name of the phase this interceptor belongs to
    fn phase(&self) -> &str;

    /// Ids of same-phase interceptors this one must precede
    fn before(&self) -> Vec<String> {
        Vec::new()
    }

    /// Ids of same-phase interceptors this one must follow
    fn after(&self) -> Vec<String> {
        Vec::new()
    }

    fn handle_message(&self, message: &mut Message) -> Result<Flow, Fault>;

    fn handle_fault(&self, message: &mut Message) -> Result<(), Fault> {
        let _ = message;
        Ok(())
    }
}
