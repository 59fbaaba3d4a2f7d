//! Full fault pipeline
//!
//! Drives a message through a real phase-ordered chain, fails it
//! mid-way, and follows the fault through the fault chain, the SOAP
//! binding, and back out over a conduit.

use std::sync::Arc;

use anyhow::{Context, Result};
use chain_core::test_utils::{CollectorConduit, ExecutionLog, TestInterceptor};
use chain_core::{
    Conduit, FaultChainInitiator, Outcome, OutFaultChainInitiator, PhaseInterceptorChain,
};
use phase::{names, PhaseRegistry};
use soap_codec::{parse_fault, SoapBinding, SoapFaultInInterceptor, SoapVersion};
use types::{Fault, FaultCode, Message};

use strand_e2e_tests::{inbound_with_exchange, init_tracing, outbound_with_exchange};

#[test]
fn test_failed_outbound_request_becomes_soap11_fault() -> Result<()> {
    init_tracing();

    let log = ExecutionLog::new();
    let mut chain = PhaseInterceptorChain::new(PhaseRegistry::outbound());
    chain.add(TestInterceptor::new("a", names::PREPARE, &log).arc())?;
    chain.add(
        TestInterceptor::new("b", names::MARSHAL, &log)
            .failing(Fault::server("boom"))
            .arc(),
    )?;

    let (mut message, exchange) = outbound_with_exchange();
    let outcome = chain.execute(&mut message)?;

    let fault = match outcome {
        Outcome::Aborted(fault) => fault,
        other => panic!("expected abort, got {other:?}"),
    };
    assert_eq!(fault.code(), FaultCode::Server);
    assert_eq!(fault.message(), "boom");
    // The interceptor before the failure unwound exactly once; the
    // failing one never saw handle_fault.
    assert_eq!(
        log.entries(),
        vec!["a:message", "b:message", "a:fault"]
    );

    // Route the failure through the binding's fault chain
    let binding = Arc::new(SoapBinding::new(SoapVersion::Soap11));
    let initiator = OutFaultChainInitiator::new(binding);
    initiator.on_failure(&mut message);

    let mut fault_message = exchange
        .take_out_fault()
        .context("fault chain should park its result on the exchange")?;
    let xml = fault_message
        .content::<String>()
        .context("fault message should carry a serialized envelope")?
        .clone();
    assert!(xml.contains("<faultcode>soap:Server</faultcode>"), "{xml}");
    assert!(xml.contains("<faultstring>boom</faultstring>"), "{xml}");

    // What went over the wire parses back to the same fault
    let conduit = CollectorConduit::new();
    conduit
        .send(&mut fault_message)
        .map_err(|f| anyhow::anyhow!("send failed: {f}"))?;
    let sent = conduit.sent();
    let parsed = parse_fault(&sent[0]).context("wire payload should be a fault envelope")?;
    assert_eq!(parsed.reason(), "boom");
    assert_eq!(parsed.to_fault().code(), FaultCode::Server);
    Ok(())
}

#[test]
fn test_client_fault_renders_as_soap12_sender() -> Result<()> {
    init_tracing();

    let log = ExecutionLog::new();
    let mut chain = PhaseInterceptorChain::new(PhaseRegistry::outbound());
    chain.add(
        TestInterceptor::new("validator", names::PRE_MARSHAL, &log)
            .failing(Fault::client("missing required element"))
            .arc(),
    )?;

    let (mut message, exchange) = outbound_with_exchange();
    chain.execute(&mut message)?;

    let binding = Arc::new(SoapBinding::new(SoapVersion::Soap12));
    OutFaultChainInitiator::new(binding).on_failure(&mut message);

    let fault_message = exchange
        .take_out_fault()
        .context("fault chain should park its result on the exchange")?;
    let xml = fault_message
        .content::<String>()
        .context("fault message should carry a serialized envelope")?;
    assert!(xml.contains("<env:Value>env:Sender</env:Value>"), "{xml}");
    assert!(xml.contains("missing required element"), "{xml}");
    Ok(())
}

#[test]
fn test_received_fault_envelope_decodes_during_unmarshal() -> Result<()> {
    init_tracing();

    let envelope = format!(
        r#"<soap:Envelope xmlns:soap="{}">
             <soap:Body>
               <soap:Fault>
                 <faultcode>soap:Client</faultcode>
                 <faultstring>unknown operation</faultstring>
               </soap:Fault>
             </soap:Body>
           </soap:Envelope>"#,
        soap_codec::SOAP11_NS
    );

    let log = ExecutionLog::new();
    let mut chain = PhaseInterceptorChain::new(PhaseRegistry::inbound());
    chain.add(Arc::new(SoapFaultInInterceptor))?;
    chain.add(TestInterceptor::new("dispatch", names::INVOKE, &log).arc())?;

    let (mut message, _exchange) = inbound_with_exchange();
    message.set_content::<String>(envelope);

    let outcome = chain.execute(&mut message)?;
    assert!(matches!(outcome, Outcome::Completed));

    let fault = message
        .content::<Fault>()
        .context("decoded fault should be recorded on the message")?;
    assert_eq!(fault.code(), FaultCode::Client);
    assert_eq!(fault.message(), "unknown operation");
    // Later phases still ran; recognizing a fault is not an abort
    assert_eq!(log.entries(), vec!["dispatch:message"]);
    Ok(())
}

#[test]
fn test_fresh_fault_message_carries_binding_defaults() -> Result<()> {
    init_tracing();

    // No exchange at all: the initiator must still serialize, using a
    // binding-created message, and simply have nowhere to park it.
    let mut failed = Message::outbound();
    failed.set_content::<Fault>(Fault::server("boom"));

    let binding = Arc::new(SoapBinding::new(SoapVersion::Soap11));
    OutFaultChainInitiator::new(binding).on_failure(&mut failed);

    // With an exchange the parked message shows the binding defaults
    let (mut failed, exchange) = outbound_with_exchange();
    failed.set_content::<Fault>(Fault::server("boom"));
    let binding = Arc::new(SoapBinding::new(SoapVersion::Soap11));
    OutFaultChainInitiator::new(binding).on_failure(&mut failed);

    let fault_message = exchange
        .take_out_fault()
        .context("fault chain should park its result on the exchange")?;
    assert_eq!(fault_message.encoding(), Some("utf-8"));
    assert_eq!(
        fault_message.header("Content-Type"),
        Some("text/xml; charset=utf-8")
    );
    Ok(())
}
