//! Seams where protocol bindings and transports plug into the chain
//!
//! The chain core never constructs envelopes or touches the wire. A
//! `Binding` supplies fresh messages shaped for its protocol plus the
//! interceptors that serialize faults; a `Conduit`/`Destination` pair
//! moves finished messages. A transport-level failure must surface as
//! a `Fault` raised by an interceptor, never bypass the chain.

use std::sync::Arc;

use types::{Direction, Fault, Message};

use crate::Interceptor;

/// A protocol binding (e.g. SOAP 1.1, SOAP 1.2)
pub trait Binding: Send + Sync {
    /// Binding name for diagnostics
    fn name(&self) -> &str;

    /// Create a fresh message with the binding's envelope defaults
    ///
    /// The fault-chain initiator uses this so a fault message is
    /// serialized per the active binding's envelope rules.
    fn create_message(&self, direction: Direction) -> Message;

    /// Interceptors that serialize an outbound fault
    fn out_fault_interceptors(&self) -> Vec<Arc<dyn Interceptor>> {
        Vec::new()
    }

    /// Interceptors that read a received fault
    fn in_fault_interceptors(&self) -> Vec<Arc<dyn Interceptor>> {
        Vec::new()
    }
}

/// Outbound transport channel for one endpoint
pub trait Conduit: Send + Sync {
    fn name(&self) -> &str;

    /// Transmit a finished message; failures are ordinary faults
    fn send(&self, message: &mut Message) -> Result<(), Fault>;

    /// Release transport resources tied to this message
    fn close(&self, message: &mut Message) -> Result<(), Fault> {
        let _ = message;
        Ok(())
    }
}

/// Inbound transport endpoint
pub trait Destination: Send + Sync {
    fn name(&self) -> &str;

    /// Conduit for replying to the requester, when the transport has one
    fn back_channel(&self) -> Option<Arc<dyn Conduit>> {
        None
    }
}
