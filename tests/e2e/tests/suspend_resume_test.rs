//! Suspension hand-off between threads
//!
//! A transport thread suspends mid-chain; a worker thread picks the
//! chain up later and drives it to completion. No interceptor may run
//! twice across the hand-off.

use std::sync::mpsc;
use std::thread;

use anyhow::Result;
use chain_core::test_utils::{ExecutionLog, TestInterceptor};
use chain_core::{ChainState, Outcome, PhaseInterceptorChain};
use phase::{names, PhaseRegistry};

use strand_e2e_tests::{inbound_with_exchange, init_tracing};

#[test]
fn test_suspend_hands_chain_to_worker_thread() -> Result<()> {
    init_tracing();

    let log = ExecutionLog::new();
    let mut chain = PhaseInterceptorChain::new(PhaseRegistry::inbound());
    chain.add(TestInterceptor::new("receive", names::RECEIVE, &log).arc())?;
    chain.add(
        TestInterceptor::new("auth", names::PRE_LOGICAL, &log)
            .suspending()
            .arc(),
    )?;
    chain.add(TestInterceptor::new("invoke", names::INVOKE, &log).arc())?;

    let (mut message, _exchange) = inbound_with_exchange();
    let outcome = chain.execute(&mut message)?;
    assert!(matches!(outcome, Outcome::Suspended));
    assert_eq!(chain.state(), ChainState::Suspended);
    assert_eq!(log.entries(), vec!["receive:message", "auth:message"]);

    // Park chain and message, resume from a worker
    let (tx, rx) = mpsc::channel();
    tx.send((chain, message)).expect("receiver alive");

    let log_for_worker = log.clone();
    let worker = thread::spawn(move || -> Result<()> {
        let (mut chain, mut message) = rx.recv()?;
        let outcome = chain.resume(&mut message)?;
        assert!(matches!(outcome, Outcome::Completed));
        assert_eq!(chain.state(), ChainState::Complete);
        assert_eq!(
            log_for_worker.entries(),
            vec!["receive:message", "auth:message", "invoke:message"]
        );
        Ok(())
    });
    worker.join().expect("worker thread panicked")?;
    Ok(())
}

#[test]
fn test_pause_continues_on_the_same_thread() -> Result<()> {
    init_tracing();

    let log = ExecutionLog::new();
    let mut chain = PhaseInterceptorChain::new(PhaseRegistry::inbound());
    chain.add(
        TestInterceptor::new("reader", names::READ, &log)
            .pausing()
            .arc(),
    )?;
    chain.add(TestInterceptor::new("invoke", names::INVOKE, &log).arc())?;

    let (mut message, _exchange) = inbound_with_exchange();
    assert!(matches!(chain.execute(&mut message)?, Outcome::Paused));
    assert!(matches!(chain.resume(&mut message)?, Outcome::Completed));
    assert_eq!(
        log.entries(),
        vec!["reader:message", "invoke:message"]
    );
    Ok(())
}
