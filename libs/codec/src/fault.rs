//! Protocol-level SOAP fault representation

use types::{Fault, FaultCode};

use crate::version::{QName, SoapVersion};

/// A SOAP Fault as it appears on the wire
///
/// Distinct from the generic pipeline `Fault`: this form carries the
/// version-specific fault code QName, an optional subcode (SOAP 1.2
/// only), and the reason text with its language tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    version: SoapVersion,
    code: QName,
    subcode: Option<QName>,
    reason: String,
    lang: String,
    node: Option<String>,
    role: Option<String>,
    detail: Option<String>,
}

impl SoapFault {
    pub fn new(version: SoapVersion, code: QName, reason: impl Into<String>) -> Self {
        Self {
            version,
            code,
            subcode: None,
            reason: reason.into(),
            lang: "en".to_string(),
            node: None,
            role: None,
            detail: None,
        }
    }

    /// Render a generic pipeline fault in the given SOAP version
    ///
    /// CLIENT becomes the version's sender code, SERVER its receiver
    /// code. Message text and detail carry over unchanged.
    pub fn from_fault(fault: &Fault, version: SoapVersion) -> Self {
        let mut soap_fault = Self::new(version, version.code_for(fault.code()), fault.message());
        soap_fault.detail = fault.detail().map(str::to_string);
        soap_fault
    }

    /// Map back into the generic pipeline form
    pub fn to_fault(&self) -> Fault {
        let code = self.version.code_from_local(self.code.local_part());
        let fault = match code {
            FaultCode::Client => Fault::client(&self.reason),
            FaultCode::Server => Fault::server(&self.reason),
        };
        match &self.detail {
            Some(detail) => fault.with_detail(detail),
            None => fault,
        }
    }

    /// SOAP 1.2 subcode; ignored when rendering as SOAP 1.1
    pub fn with_subcode(mut self, subcode: QName) -> Self {
        self.subcode = Some(subcode);
        self
    }

    /// Language tag for the reason text (defaults to "en")
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// URI of the node that raised the fault
    ///
    /// Rendered as `env:Node` in SOAP 1.2 and `faultactor` in SOAP 1.1.
    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// Role the node was operating in; SOAP 1.2 only
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn version(&self) -> SoapVersion {
        self.version
    }

    pub fn code(&self) -> &QName {
        &self.code
    }

    pub fn subcode(&self) -> Option<&QName> {
        self.subcode.as_ref()
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fault_maps_codes() {
        let fault = Fault::client("bad input");
        let soap11 = SoapFault::from_fault(&fault, SoapVersion::Soap11);
        assert_eq!(soap11.code().local_part(), "Client");
        assert_eq!(soap11.reason(), "bad input");

        let soap12 = SoapFault::from_fault(&fault, SoapVersion::Soap12);
        assert_eq!(soap12.code().local_part(), "Sender");

        let fault = Fault::server("boom");
        assert_eq!(
            SoapFault::from_fault(&fault, SoapVersion::Soap11)
                .code()
                .local_part(),
            "Server"
        );
        assert_eq!(
            SoapFault::from_fault(&fault, SoapVersion::Soap12)
                .code()
                .local_part(),
            "Receiver"
        );
    }

    #[test]
    fn test_round_trip_to_generic_fault() {
        let original = Fault::server("boom").with_detail("stack hash 1f2e");
        let soap = SoapFault::from_fault(&original, SoapVersion::Soap12);
        let back = soap.to_fault();

        assert_eq!(back.code(), original.code());
        assert_eq!(back.message(), original.message());
        assert_eq!(back.detail(), original.detail());
    }

    #[test]
    fn test_default_lang_is_english() {
        let soap = SoapFault::from_fault(&Fault::server("x"), SoapVersion::Soap12);
        assert_eq!(soap.lang(), "en");
        assert_eq!(soap.with_lang("fr").lang(), "fr");
    }
}
