//! Shared fixtures for the end-to-end pipeline tests

use types::{Exchange, Message};

/// Install a fmt subscriber once so chain warnings show up under
/// `RUST_LOG` when a scenario misbehaves.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An outbound message already wired to a fresh exchange, the way a
/// transport hands one to the chain.
pub fn outbound_with_exchange() -> (Message, Exchange) {
    let exchange = Exchange::new();
    let mut message = Message::outbound();
    message.set_exchange(exchange.clone());
    (message, exchange)
}

/// Inbound counterpart of [`outbound_with_exchange`].
pub fn inbound_with_exchange() -> (Message, Exchange) {
    let exchange = Exchange::new();
    let mut message = Message::inbound();
    message.set_exchange(exchange.clone());
    (message, exchange)
}
