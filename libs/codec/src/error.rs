//! Codec-level errors for SOAP fault rendering and parsing

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The XML writer failed; carries the underlying error text
    #[error("XML write failed: {0}")]
    Write(String),

    /// The document is not well-formed XML
    #[error("XML parse failed: {0}")]
    Parse(String),

    /// The envelope namespace matches no supported SOAP version
    #[error("unsupported envelope namespace '{namespace}'")]
    UnknownNamespace { namespace: String },

    /// Well-formed XML, but no Fault element where one was expected
    #[error("document contains no SOAP Fault element")]
    NotAFault,

    /// A required fault child is absent for the detected version
    #[error("missing <{element}> in {version} fault")]
    MissingElement {
        element: &'static str,
        version: String,
    },
}
