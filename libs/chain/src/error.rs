//! Chain configuration and lifecycle errors
//!
//! These are build-time and state errors, distinct from a runtime
//! `Fault`: a fault aborts one message, a `ChainError` means the chain
//! itself was assembled or driven incorrectly.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Interceptor named a phase the registry does not define
    #[error("interceptor '{interceptor}' references unknown phase '{phase}'")]
    UnknownPhase { interceptor: String, phase: String },

    /// Two interceptors registered under the same id within one phase
    #[error("duplicate interceptor id '{id}' in phase '{phase}'")]
    DuplicateInterceptor { id: String, phase: String },

    /// before/after constraints within a phase form a cycle
    #[error("ordering constraint cycle in phase '{phase}' among [{}]", ids.join(", "))]
    ConstraintCycle { phase: String, ids: Vec<String> },

    /// Chain already ran to completion; reset() before re-running
    #[error("chain already completed; call reset() to run it again")]
    AlreadyComplete,

    /// Chain aborted on a fault; reset() before reuse
    #[error("chain was aborted; call reset() before reuse")]
    AlreadyAborted,

    /// resume() called on a chain that is not parked
    #[error("chain is not paused or suspended (state: {state})")]
    NotSuspended { state: String },

    /// add() called after execution started; the cursor position would
    /// no longer identify the interceptors that already ran
    #[error("interceptors can only be added before the chain starts (state: {state})")]
    Sealed { state: String },
}
