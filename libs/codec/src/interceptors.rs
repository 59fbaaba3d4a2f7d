//! Chain interceptors that bridge fault values and SOAP envelopes
//!
//! The outbound interceptor serializes the recorded [`Fault`] during the
//! marshal phase; the inbound one recognizes fault envelopes during
//! unmarshal and records the decoded fault on the message.

use chain_core::{Flow, Interceptor};
use tracing::debug;
use types::{Fault, Message};

use crate::builder::write_fault;
use crate::error::CodecError;
use crate::fault::SoapFault;
use crate::parser::parse_fault;
use crate::version::SoapVersion;

/// Serializes the message's recorded fault into a SOAP envelope
#[derive(Debug, Clone, Copy)]
pub struct SoapFaultOutInterceptor {
    version: SoapVersion,
}

impl SoapFaultOutInterceptor {
    pub fn new(version: SoapVersion) -> Self {
        Self { version }
    }
}

impl Interceptor for SoapFaultOutInterceptor {
    fn id(&self) -> &str {
        "soap-fault-out"
    }

    fn phase(&self) -> &str {
        phase::names::MARSHAL
    }

    fn handle_message(&self, message: &mut Message) -> Result<Flow, Fault> {
        let Some(fault) = message.content::<Fault>() else {
            return Ok(Flow::Continue);
        };
        let soap_fault = SoapFault::from_fault(fault, self.version);
        let xml = write_fault(&soap_fault)
            .map_err(|e| Fault::server(format!("fault serialization failed: {e}")))?;
        debug!(version = %self.version, code = %soap_fault.code(), "serialized fault envelope");
        message.set_content::<String>(xml);
        Ok(Flow::Continue)
    }
}

/// Recognizes incoming SOAP fault envelopes and records the decoded fault
#[derive(Debug, Clone, Copy, Default)]
pub struct SoapFaultInInterceptor;

impl Interceptor for SoapFaultInInterceptor {
    fn id(&self) -> &str {
        "soap-fault-in"
    }

    fn phase(&self) -> &str {
        phase::names::UNMARSHAL
    }

    fn handle_message(&self, message: &mut Message) -> Result<Flow, Fault> {
        let Some(xml) = message.content::<String>() else {
            return Ok(Flow::Continue);
        };
        match parse_fault(xml) {
            Ok(soap_fault) => {
                debug!(code = %soap_fault.code(), "decoded fault envelope");
                message.set_content::<Fault>(soap_fault.to_fault());
                message.set_content::<SoapFault>(soap_fault);
                Ok(Flow::Continue)
            }
            // Plain messages flow through untouched
            Err(CodecError::NotAFault) => Ok(Flow::Continue),
            Err(e) => Err(Fault::client(format!("malformed fault envelope: {e}"))),
        }
    }
}
