//! Generic pipeline failure value
//!
//! A `Fault` is how an interceptor signals that processing cannot
//! continue. It is a value, not a thrown exception: `handle_message`
//! returns `Result<_, Fault>` and the chain propagates it explicitly.
//! Protocol-specific renderings (e.g. a SOAP Fault element) are built
//! from this generic form downstream.

use std::error::Error;
use std::sync::Arc;

/// Which side of the conversation is responsible for the failure
///
/// Maps onto the sender/receiver split every supported protocol makes:
/// `Client` means the request itself was unacceptable, `Server` means
/// the service failed while processing an acceptable request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultCode {
    Client,
    Server,
}

impl std::fmt::Display for FaultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FaultCode::Client => write!(f, "Client"),
            FaultCode::Server => write!(f, "Server"),
        }
    }
}

/// A wrapped processing failure with an optional underlying cause
///
/// The message text and code survive end-to-end: whatever rendered the
/// fault on the wire must preserve both so the client sees the same
/// semantic failure regardless of how many layers relayed it.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code} fault: {message}")]
pub struct Fault {
    code: FaultCode,
    message: String,
    cause: Option<Arc<dyn Error + Send + Sync>>,
    detail: Option<String>,
}

impl Fault {
    /// Create a fault with an explicit code
    pub fn new(code: FaultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
            detail: None,
        }
    }

    /// Create a client-side (sender) fault
    pub fn client(message: impl Into<String>) -> Self {
        Self::new(FaultCode::Client, message)
    }

    /// Create a server-side (receiver) fault
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(FaultCode::Server, message)
    }

    /// Wrap an underlying error as a server fault, keeping it as cause
    pub fn caused_by<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        let message = error.to_string();
        Self {
            code: FaultCode::Server,
            message,
            cause: Some(Arc::new(error)),
            detail: None,
        }
    }

    /// Attach protocol-agnostic detail text (rendered in fault details)
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Override the fault code, keeping message and cause
    pub fn with_code(mut self, code: FaultCode) -> Self {
        self.code = code;
        self
    }

    pub fn code(&self) -> FaultCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// The wrapped underlying error, if this fault carries one
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync)> {
        self.cause.as_deref()
    }
}
