//! SOAP version constants and qualified names

use types::FaultCode;

/// SOAP 1.1 envelope namespace
pub const SOAP11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// SOAP 1.2 envelope namespace
pub const SOAP12_NS: &str = "http://www.w3.org/2003/05/soap-envelope";

/// An XML qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    namespace: String,
    local_part: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, local_part: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_part: local_part.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_part(&self) -> &str {
        &self.local_part
    }
}

impl std::fmt::Display for QName {
    // Clark notation: {namespace}local
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local_part)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local_part)
        }
    }
}

/// Supported SOAP envelope versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoapVersion {
    Soap11,
    Soap12,
}

impl SoapVersion {
    pub fn namespace(&self) -> &'static str {
        match self {
            SoapVersion::Soap11 => SOAP11_NS,
            SoapVersion::Soap12 => SOAP12_NS,
        }
    }

    /// Envelope prefix used when writing
    pub fn prefix(&self) -> &'static str {
        match self {
            SoapVersion::Soap11 => "soap",
            SoapVersion::Soap12 => "env",
        }
    }

    /// Detect the version from an envelope namespace URI
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            SOAP11_NS => Some(SoapVersion::Soap11),
            SOAP12_NS => Some(SoapVersion::Soap12),
            _ => None,
        }
    }

    /// Protocol fault code for "the requester was wrong"
    pub fn sender_code(&self) -> QName {
        match self {
            SoapVersion::Soap11 => QName::new(SOAP11_NS, "Client"),
            SoapVersion::Soap12 => QName::new(SOAP12_NS, "Sender"),
        }
    }

    /// Protocol fault code for "the service failed"
    pub fn receiver_code(&self) -> QName {
        match self {
            SoapVersion::Soap11 => QName::new(SOAP11_NS, "Server"),
            SoapVersion::Soap12 => QName::new(SOAP12_NS, "Receiver"),
        }
    }

    /// Map a generic fault code to this version's protocol code
    pub fn code_for(&self, code: FaultCode) -> QName {
        match code {
            FaultCode::Client => self.sender_code(),
            FaultCode::Server => self.receiver_code(),
        }
    }

    /// Reverse mapping from a protocol code local part
    ///
    /// Unrecognized codes read as `Server`: an unknown failure at the
    /// peer is attributed to the peer, not to our request.
    pub fn code_from_local(&self, local_part: &str) -> FaultCode {
        match (self, local_part) {
            (SoapVersion::Soap11, "Client") | (SoapVersion::Soap12, "Sender") => FaultCode::Client,
            _ => FaultCode::Server,
        }
    }
}

impl std::fmt::Display for SoapVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SoapVersion::Soap11 => write!(f, "SOAP 1.1"),
            SoapVersion::Soap12 => write!(f, "SOAP 1.2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_mapping_per_version() {
        assert_eq!(
            SoapVersion::Soap11.code_for(FaultCode::Client).local_part(),
            "Client"
        );
        assert_eq!(
            SoapVersion::Soap11.code_for(FaultCode::Server).local_part(),
            "Server"
        );
        assert_eq!(
            SoapVersion::Soap12.code_for(FaultCode::Client).local_part(),
            "Sender"
        );
        assert_eq!(
            SoapVersion::Soap12.code_for(FaultCode::Server).local_part(),
            "Receiver"
        );
    }

    #[test]
    fn test_code_mapping_is_reversible() {
        for version in [SoapVersion::Soap11, SoapVersion::Soap12] {
            for code in [FaultCode::Client, FaultCode::Server] {
                let qname = version.code_for(code);
                assert_eq!(version.code_from_local(qname.local_part()), code);
            }
        }
    }

    #[test]
    fn test_unknown_code_reads_as_server() {
        assert_eq!(
            SoapVersion::Soap11.code_from_local("VersionMismatch"),
            FaultCode::Server
        );
    }

    #[test]
    fn test_version_detection() {
        assert_eq!(
            SoapVersion::from_namespace(SOAP11_NS),
            Some(SoapVersion::Soap11)
        );
        assert_eq!(
            SoapVersion::from_namespace(SOAP12_NS),
            Some(SoapVersion::Soap12)
        );
        assert_eq!(SoapVersion::from_namespace("urn:other"), None);
    }

    #[test]
    fn test_qname_display() {
        let q = QName::new(SOAP11_NS, "Server");
        assert_eq!(
            q.to_string(),
            "{http://schemas.xmlsoap.org/soap/envelope/}Server"
        );
        assert_eq!(QName::new("", "bare").to_string(), "bare");
    }
}
