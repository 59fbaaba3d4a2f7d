//! Phase Ordering Property Tests
//!
//! Execution order must be a function of phase priority and declared
//! constraints alone, never of registration order.

use proptest::prelude::*;

use chain_core::test_utils::{ExecutionLog, TestInterceptor};
use chain_core::{Outcome, PhaseInterceptorChain};
use phase::{names, PhaseRegistry};
use types::Message;

/// One interceptor per inbound phase, identified by its phase name
const LADDER: [&str; 8] = [
    names::RECEIVE,
    names::PRE_PROTOCOL,
    names::PROTOCOL,
    names::READ,
    names::UNMARSHAL,
    names::PRE_LOGICAL,
    names::LOGICAL,
    names::INVOKE,
];

proptest! {
    #[test]
    fn registration_order_never_affects_execution_order(
        order in Just((0..LADDER.len()).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let log = ExecutionLog::new();
        let mut chain = PhaseInterceptorChain::new(PhaseRegistry::inbound());
        for &i in &order {
            chain
                .add(TestInterceptor::new(LADDER[i], LADDER[i], &log).arc())
                .unwrap();
        }

        let mut message = Message::inbound();
        let outcome = chain.execute(&mut message).unwrap();
        prop_assert!(matches!(outcome, Outcome::Completed));

        let expected: Vec<String> = LADDER.iter().map(|p| format!("{p}:message")).collect();
        prop_assert_eq!(log.entries(), expected);
    }

    #[test]
    fn unwind_mirrors_forward_order(
        ran in 1..LADDER.len()
    ) {
        // Fail at a random depth; everything before it unwinds in
        // exact reverse, the thrower itself does not.
        let log = ExecutionLog::new();
        let mut chain = PhaseInterceptorChain::new(PhaseRegistry::inbound());
        for phase in &LADDER[..ran] {
            chain
                .add(TestInterceptor::new(*phase, *phase, &log).arc())
                .unwrap();
        }
        chain
            .add(
                TestInterceptor::new("thrower", names::POST_LOGICAL, &log)
                    .failing(types::Fault::server("boom"))
                    .arc(),
            )
            .unwrap();

        let mut message = Message::inbound();
        let outcome = chain.execute(&mut message).unwrap();
        prop_assert!(matches!(outcome, Outcome::Aborted(_)));

        let mut expected: Vec<String> =
            LADDER[..ran].iter().map(|p| format!("{p}:message")).collect();
        expected.push("thrower:message".to_string());
        expected.extend(LADDER[..ran].iter().rev().map(|p| format!("{p}:fault")));
        prop_assert_eq!(log.entries(), expected);
    }

    #[test]
    fn same_phase_constraints_hold_for_any_registration_order(
        order in Just(vec!["first", "second", "third"]).prop_shuffle()
    ) {
        let log = ExecutionLog::new();
        let mut chain = PhaseInterceptorChain::new(PhaseRegistry::inbound());
        for id in order {
            let interceptor = match id {
                "first" => TestInterceptor::new("first", names::READ, &log)
                    .before(["second"]),
                "second" => TestInterceptor::new("second", names::READ, &log),
                _ => TestInterceptor::new("third", names::READ, &log)
                    .after(["second"]),
            };
            chain.add(interceptor.arc()).unwrap();
        }

        let ids = chain.ids();
        let pos = |id: &str| ids.iter().position(|x| x == id).unwrap();
        prop_assert!(pos("first") < pos("second"));
        prop_assert!(pos("second") < pos("third"));
    }
}
