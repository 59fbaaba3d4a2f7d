//! Fault-chain initiation
//!
//! When a normal-processing chain aborts, the failure still needs
//! binding-appropriate formatting — a SOAP binding must answer with a
//! SOAP Fault element, not a dropped connection. The initiators here
//! bridge a failed message into a dedicated chain built over the fault
//! phase subset, so fault serialization runs through the same
//! phase-based mechanism as successful messages.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use phase::PhaseRegistry;
use tracing::{debug, error};
use types::{Direction, Fault, Message};

use crate::binding::Binding;
use crate::chain::{Outcome, PhaseInterceptorChain};
use crate::error::ChainError;

/// Receives messages at a chain boundary
///
/// Implemented by transports (to start normal processing) and by the
/// fault-chain initiators below (to start fault processing).
pub trait MessageObserver: Send + Sync {
    fn on_message(&self, message: Message);
}

/// Drives a failed message through a dedicated fault chain
///
/// Implementors choose the direction; the processing algorithm is the
/// provided `on_failure`. The initiator is the outermost error
/// boundary: a failure while reporting a failure is logged and never
/// propagates to the transport thread.
pub trait FaultChainInitiator: Send + Sync {
    /// Whether this initiator serializes outbound faults (`true`) or
    /// reads inbound ones (`false`)
    fn is_outbound(&self) -> bool;

    /// Binding that shapes and serializes the fault message
    fn binding(&self) -> Arc<dyn Binding>;

    /// Phase subset the fault chain runs over
    fn fault_phases(&self) -> PhaseRegistry {
        if self.is_outbound() {
            PhaseRegistry::outbound_fault()
        } else {
            PhaseRegistry::inbound_fault()
        }
    }

    /// Route a failed message through the fault chain
    ///
    /// 1. Read the recorded `Fault` off the failed message.
    /// 2. Look up the exchange's fault message for this direction, or
    ///    create a fresh one from the binding.
    /// 3. Copy headers, encoding, and the exchange handle across.
    /// 4. Build a chain over the fault phase subset with the binding's
    ///    fault interceptors and drive it.
    /// 5. Park the processed fault message back on the exchange.
    ///
    /// Any secondary failure is swallowed and logged; the triggering
    /// exchange is left in its terminal failed state.
    fn on_failure(&self, failed: &mut Message) {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.process(failed)));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(error = %err, "fault chain could not be built, fault not serialized");
            }
            Err(_) => {
                error!("fault chain processing panicked, fault not serialized");
            }
        }
    }

    #[doc(hidden)]
    fn process(&self, failed: &mut Message) -> Result<(), ChainError> {
        let fault = failed
            .content::<Fault>()
            .cloned()
            .unwrap_or_else(|| Fault::server("unreported processing failure"));

        let exchange = failed.exchange().cloned();

        let mut fault_message = exchange
            .as_ref()
            .and_then(|ex| {
                if self.is_outbound() {
                    ex.take_out_fault()
                } else {
                    ex.take_in_fault()
                }
            })
            .unwrap_or_else(|| {
                let direction = if self.is_outbound() {
                    Direction::Outbound
                } else {
                    Direction::Inbound
                };
                self.binding().create_message(direction)
            });

        // Carry over what the binding needs to frame the fault like
        // the message it answers; keep the binding's own defaults when
        // the failed message has nothing to contribute.
        if !failed.headers().is_empty() {
            fault_message.set_headers(failed.headers().to_vec());
        }
        if let Some(encoding) = failed.encoding() {
            fault_message.set_encoding(encoding.to_string());
        }
        if let Some(ref exchange) = exchange {
            fault_message.set_exchange(exchange.clone());
        }
        fault_message.set_content::<Fault>(fault.clone());

        let mut chain = PhaseInterceptorChain::new(self.fault_phases());
        let interceptors = if self.is_outbound() {
            self.binding().out_fault_interceptors()
        } else {
            self.binding().in_fault_interceptors()
        };
        chain.add_all(interceptors)?;

        debug!(
            direction = if self.is_outbound() { "out" } else { "in" },
            interceptors = chain.len(),
            "running fault chain"
        );

        match chain.execute(&mut fault_message)? {
            Outcome::Completed => {}
            Outcome::Aborted(secondary) => {
                error!(
                    fault = %secondary,
                    "fault chain itself aborted, original fault preserved on exchange"
                );
                // The aborting chain recorded the secondary fault on the
                // message; the original cause is the one worth keeping.
                fault_message.set_content::<Fault>(fault);
            }
            Outcome::Paused | Outcome::Suspended => {
                error!("fault chain suspended itself, fault left unserialized");
            }
        }

        if let Some(exchange) = exchange {
            if self.is_outbound() {
                exchange.set_out_fault(fault_message);
            } else {
                exchange.set_in_fault(fault_message);
            }
        }
        Ok(())
    }
}

/// Initiator for faults leaving this endpoint (server answering a
/// failed request, client reporting a local send failure)
pub struct OutFaultChainInitiator {
    binding: Arc<dyn Binding>,
}

impl OutFaultChainInitiator {
    pub fn new(binding: Arc<dyn Binding>) -> Self {
        Self { binding }
    }
}

impl FaultChainInitiator for OutFaultChainInitiator {
    fn is_outbound(&self) -> bool {
        true
    }

    fn binding(&self) -> Arc<dyn Binding> {
        self.binding.clone()
    }
}

impl MessageObserver for OutFaultChainInitiator {
    fn on_message(&self, mut message: Message) {
        self.on_failure(&mut message);
    }
}

/// Initiator for faults received from the peer
pub struct InFaultChainInitiator {
    binding: Arc<dyn Binding>,
}

impl InFaultChainInitiator {
    pub fn new(binding: Arc<dyn Binding>) -> Self {
        Self { binding }
    }
}

impl FaultChainInitiator for InFaultChainInitiator {
    fn is_outbound(&self) -> bool {
        false
    }

    fn binding(&self) -> Arc<dyn Binding> {
        self.binding.clone()
    }
}

impl MessageObserver for InFaultChainInitiator {
    fn on_message(&self, mut message: Message) {
        self.on_failure(&mut message);
    }
}
