//! SOAP protocol binding

use std::sync::Arc;

use chain_core::{Binding, Interceptor};
use types::{Direction, Message};

use crate::interceptors::{SoapFaultInInterceptor, SoapFaultOutInterceptor};
use crate::version::SoapVersion;

/// Binding for one SOAP version
///
/// Messages it creates carry the version's Content-Type and a UTF-8
/// encoding, and its fault interceptors serialize and decode fault
/// envelopes for that version.
#[derive(Debug, Clone, Copy)]
pub struct SoapBinding {
    version: SoapVersion,
}

impl SoapBinding {
    pub fn new(version: SoapVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> SoapVersion {
        self.version
    }

    fn content_type(&self) -> &'static str {
        match self.version {
            SoapVersion::Soap11 => "text/xml; charset=utf-8",
            SoapVersion::Soap12 => "application/soap+xml; charset=utf-8",
        }
    }
}

impl Binding for SoapBinding {
    fn name(&self) -> &str {
        match self.version {
            SoapVersion::Soap11 => "soap-1.1",
            SoapVersion::Soap12 => "soap-1.2",
        }
    }

    fn create_message(&self, direction: Direction) -> Message {
        let mut message = match direction {
            Direction::Inbound => Message::inbound(),
            Direction::Outbound => Message::outbound(),
        };
        message.set_encoding("utf-8");
        message.add_header("Content-Type", self.content_type());
        message
    }

    fn out_fault_interceptors(&self) -> Vec<Arc<dyn Interceptor>> {
        vec![Arc::new(SoapFaultOutInterceptor::new(self.version))]
    }

    fn in_fault_interceptors(&self) -> Vec<Arc<dyn Interceptor>> {
        vec![Arc::new(SoapFaultInInterceptor)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_message_carries_envelope_defaults() {
        let binding = SoapBinding::new(SoapVersion::Soap12);
        let message = binding.create_message(Direction::Outbound);

        assert!(message.is_outbound());
        assert_eq!(message.encoding(), Some("utf-8"));
        assert_eq!(
            message.header("Content-Type"),
            Some("application/soap+xml; charset=utf-8")
        );
    }

    #[test]
    fn test_binding_names_follow_version() {
        assert_eq!(SoapBinding::new(SoapVersion::Soap11).name(), "soap-1.1");
        assert_eq!(SoapBinding::new(SoapVersion::Soap12).name(), "soap-1.2");
    }

    #[test]
    fn test_fault_interceptors_provided() {
        let binding = SoapBinding::new(SoapVersion::Soap11);
        assert_eq!(binding.out_fault_interceptors().len(), 1);
        assert_eq!(binding.in_fault_interceptors().len(), 1);
    }
}
