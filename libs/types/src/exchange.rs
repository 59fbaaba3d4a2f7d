//! Invocation correlation handle
//!
//! An `Exchange` pairs the messages of one logical operation invocation:
//! one inbound, one outbound, and optionally one fault message per
//! direction. It is a cheap cloneable handle; the transport creates it,
//! attaches the initial message, and every later message of the same
//! invocation points at the same exchange.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::message::Message;

#[derive(Default)]
struct ExchangeState {
    properties: HashMap<String, Box<dyn Any + Send>>,
    oneway: bool,
    in_message: Option<Message>,
    out_message: Option<Message>,
    in_fault: Option<Message>,
    out_fault: Option<Message>,
    conduit: Option<String>,
    destination: Option<String>,
}

/// Shared handle to the state of one invocation
///
/// Message slots hold parked messages with their exchange attachment
/// detached; taking a message out re-attaches this handle. That keeps
/// the handle graph acyclic while preserving "every message knows its
/// exchange" for in-flight messages.
#[derive(Clone, Default)]
pub struct Exchange {
    inner: Arc<Mutex<ExchangeState>>,
}

impl Exchange {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking interceptor must not wedge the exchange for the
    // fault path that runs after it.
    fn lock(&self) -> MutexGuard<'_, ExchangeState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True when both handles refer to the same invocation
    pub fn same_as(&self, other: &Exchange) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_oneway(&self) -> bool {
        self.lock().oneway
    }

    pub fn set_oneway(&self, oneway: bool) {
        self.lock().oneway = oneway;
    }

    // --- exchange-scoped properties ---

    pub fn set_property<T: Any + Send>(&self, key: impl Into<String>, value: T) {
        self.lock().properties.insert(key.into(), Box::new(value));
    }

    /// Read a property by value; requires `Clone` because the state
    /// lives behind the exchange lock
    pub fn property<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.lock().properties.get(key)?.downcast_ref::<T>().cloned()
    }

    pub fn take_property<T: Any>(&self, key: &str) -> Option<T> {
        let mut state = self.lock();
        if state.properties.get(key)?.downcast_ref::<T>().is_none() {
            return None;
        }
        let boxed = state.properties.remove(key)?;
        boxed.downcast::<T>().ok().map(|b| *b)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.lock().properties.contains_key(key)
    }

    // --- reply routing hints ---

    pub fn set_conduit(&self, name: impl Into<String>) {
        self.lock().conduit = Some(name.into());
    }

    pub fn conduit(&self) -> Option<String> {
        self.lock().conduit.clone()
    }

    pub fn set_destination(&self, name: impl Into<String>) {
        self.lock().destination = Some(name.into());
    }

    pub fn destination(&self) -> Option<String> {
        self.lock().destination.clone()
    }

    // --- message slots ---

    pub fn set_in_message(&self, msg: Message) {
        self.park(msg, Slot::In)
    }

    pub fn take_in_message(&self) -> Option<Message> {
        self.unpark(Slot::In)
    }

    pub fn has_in_message(&self) -> bool {
        self.lock().in_message.is_some()
    }

    pub fn set_out_message(&self, msg: Message) {
        self.park(msg, Slot::Out)
    }

    pub fn take_out_message(&self) -> Option<Message> {
        self.unpark(Slot::Out)
    }

    pub fn has_out_message(&self) -> bool {
        self.lock().out_message.is_some()
    }

    pub fn set_in_fault(&self, msg: Message) {
        self.park(msg, Slot::InFault)
    }

    pub fn take_in_fault(&self) -> Option<Message> {
        self.unpark(Slot::InFault)
    }

    pub fn has_in_fault(&self) -> bool {
        self.lock().in_fault.is_some()
    }

    pub fn set_out_fault(&self, msg: Message) {
        self.park(msg, Slot::OutFault)
    }

    pub fn take_out_fault(&self) -> Option<Message> {
        self.unpark(Slot::OutFault)
    }

    pub fn has_out_fault(&self) -> bool {
        self.lock().out_fault.is_some()
    }

    fn park(&self, mut msg: Message, slot: Slot) {
        msg.detach_exchange();
        let mut state = self.lock();
        *slot.of(&mut state) = Some(msg);
    }

    fn unpark(&self, slot: Slot) -> Option<Message> {
        let mut msg = {
            let mut state = self.lock();
            slot.of(&mut state).take()?
        };
        msg.set_exchange(self.clone());
        Some(msg)
    }
}

#[derive(Clone, Copy)]
enum Slot {
    In,
    Out,
    InFault,
    OutFault,
}

impl Slot {
    fn of<'a>(self, state: &'a mut ExchangeState) -> &'a mut Option<Message> {
        match self {
            Slot::In => &mut state.in_message,
            Slot::Out => &mut state.out_message,
            Slot::InFault => &mut state.in_fault,
            Slot::OutFault => &mut state.out_fault,
        }
    }
}

impl std::fmt::Debug for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Exchange")
            .field("oneway", &state.oneway)
            .field("in", &state.in_message.is_some())
            .field("out", &state.out_message.is_some())
            .field("in_fault", &state.in_fault.is_some())
            .field("out_fault", &state.out_fault.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parked_message_detaches_exchange() {
        let exchange = Exchange::new();
        let mut msg = Message::inbound();
        msg.set_exchange(exchange.clone());

        exchange.set_in_message(msg);

        let msg = exchange.take_in_message().unwrap();
        assert!(msg.exchange().unwrap().same_as(&exchange));
        assert!(!exchange.has_in_message());
    }

    #[test]
    fn test_fault_slots_are_independent() {
        let exchange = Exchange::new();
        exchange.set_out_fault(Message::outbound());

        assert!(exchange.has_out_fault());
        assert!(!exchange.has_in_fault());

        let fault = exchange.take_out_fault().unwrap();
        assert!(fault.exchange().is_some());
        assert!(!exchange.has_out_fault());
    }

    #[test]
    fn test_properties_shared_across_clones() {
        let exchange = Exchange::new();
        let other = exchange.clone();

        exchange.set_property("invoked", true);
        assert_eq!(other.property::<bool>("invoked"), Some(true));
        assert!(other.same_as(&exchange));

        assert_eq!(other.take_property::<bool>("invoked"), Some(true));
        assert!(!exchange.has_property("invoked"));
    }

    #[test]
    fn test_oneway_and_routing_hints() {
        let exchange = Exchange::new();
        assert!(!exchange.is_oneway());

        exchange.set_oneway(true);
        exchange.set_conduit("http-conduit-1");
        exchange.set_destination("soap-endpoint");

        assert!(exchange.is_oneway());
        assert_eq!(exchange.conduit().as_deref(), Some("http-conduit-1"));
        assert_eq!(exchange.destination().as_deref(), Some("soap-endpoint"));
    }
}
