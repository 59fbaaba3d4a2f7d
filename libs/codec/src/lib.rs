//! # Strand SOAP Codec
//!
//! Protocol rendering of pipeline faults: maps the generic `Fault`
//! carried through the chain onto a SOAP Fault element, in the terms of
//! the active SOAP version, and parses received fault envelopes back.
//!
//! ## Version Differences
//!
//! - **SOAP 1.1**: unqualified-structure fault with `<faultcode>`
//!   (prefix-qualified `Client`/`Server` value) and `<faultstring>`
//! - **SOAP 1.2**: `<env:Code><env:Value>` (`Sender`/`Receiver`) with
//!   optional `<env:Subcode>`, and `<env:Reason><env:Text xml:lang=…>`
//!
//! Round-trip guarantee: serializing a `SoapFault` and re-parsing it
//! with the matching fault-in interceptor reproduces the same fault
//! code and reason text.
//!
//! ## What This Crate Does NOT Contain
//! - Chain mechanics (chain-core drives these interceptors)
//! - Transport framing (HTTP/JMS belong to transport crates)

pub mod binding;
pub mod builder;
pub mod error;
pub mod fault;
pub mod interceptors;
pub mod parser;
pub mod version;

pub use binding::SoapBinding;
pub use builder::write_fault;
pub use error::CodecError;
pub use fault::SoapFault;
pub use interceptors::{SoapFaultInInterceptor, SoapFaultOutInterceptor};
pub use parser::parse_fault;
pub use version::{QName, SoapVersion, SOAP11_NS, SOAP12_NS};
