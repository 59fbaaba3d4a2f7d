//! SOAP fault envelope reader
//!
//! Version is detected from the Envelope namespace declaration, so one
//! entry point reads both SOAP 1.1 and SOAP 1.2 faults.

use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::Reader;

use crate::error::CodecError;
use crate::fault::SoapFault;
use crate::version::{QName, SoapVersion};

/// Parse a SOAP envelope containing a Fault element
///
/// Element text is accumulated across fragments: the reader splits
/// text at entity references (`&amp;`, `&#233;`, …) and reports each
/// reference as its own event, so a single assignment per text event
/// would drop everything before the last fragment.
pub fn parse_fault(xml: &str) -> Result<SoapFault, CodecError> {
    let mut reader = Reader::from_str(xml);

    let mut version: Option<SoapVersion> = None;
    let mut first_namespace = String::new();
    let mut found_fault = false;

    let mut stack: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut code_text: Option<String> = None;
    let mut subcode_text: Option<String> = None;
    let mut reason: Option<String> = None;
    let mut lang = "en".to_string();
    let mut node: Option<String> = None;
    let mut role: Option<String> = None;
    let mut detail: Option<String> = None;

    loop {
        match reader.read_event().map_err(parse_err)? {
            Event::Start(e) => {
                let local = local_name(&e);
                match local.as_str() {
                    "Envelope" if version.is_none() => {
                        version = detect_version(&e, &mut first_namespace);
                        if version.is_none() {
                            return Err(CodecError::UnknownNamespace {
                                namespace: first_namespace,
                            });
                        }
                    }
                    "Fault" => found_fault = true,
                    "Text" => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"xml:lang" {
                                lang = String::from_utf8_lossy(&attr.value).into_owned();
                            }
                        }
                    }
                    _ => {}
                }
                stack.push(local);
                buf.clear();
            }
            Event::Text(e) => {
                buf.push_str(&e.decode().map_err(parse_err)?);
            }
            Event::GeneralRef(e) => {
                buf.push(resolve_reference(&e)?);
            }
            Event::End(_) => {
                if found_fault && !buf.trim().is_empty() {
                    let text = std::mem::take(&mut buf);
                    match (parent(&stack, 1), parent(&stack, 0)) {
                        // SOAP 1.1
                        (_, Some("faultcode")) => code_text = Some(text),
                        (_, Some("faultstring")) => reason = Some(text),
                        (_, Some("faultactor")) => node = Some(text),
                        (_, Some("detail")) => detail = Some(text),
                        // SOAP 1.2
                        (Some("Code"), Some("Value")) => code_text = Some(text),
                        (Some("Subcode"), Some("Value")) => subcode_text = Some(text),
                        (Some("Reason"), Some("Text")) => reason = Some(text),
                        (_, Some("Node")) => node = Some(text),
                        (_, Some("Role")) => role = Some(text),
                        (_, Some("Detail")) => detail = Some(text),
                        _ => {}
                    }
                }
                stack.pop();
                buf.clear();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let version = version.ok_or(CodecError::UnknownNamespace {
        namespace: first_namespace,
    })?;
    if !found_fault {
        return Err(CodecError::NotAFault);
    }

    let code_text = code_text.ok_or(CodecError::MissingElement {
        element: match version {
            SoapVersion::Soap11 => "faultcode",
            SoapVersion::Soap12 => "Value",
        },
        version: version.to_string(),
    })?;
    let reason = reason.ok_or(CodecError::MissingElement {
        element: match version {
            SoapVersion::Soap11 => "faultstring",
            SoapVersion::Soap12 => "Text",
        },
        version: version.to_string(),
    })?;

    // Fault codes are written prefix-qualified against the envelope
    // namespace; resolve them back the same way.
    let code = QName::new(version.namespace(), strip_prefix(&code_text));
    let mut fault = SoapFault::new(version, code, reason).with_lang(lang);
    if let Some(subcode) = subcode_text {
        fault = fault.with_subcode(QName::new(version.namespace(), strip_prefix(&subcode)));
    }
    if let Some(node) = node {
        fault = fault.with_node(node);
    }
    if let Some(role) = role {
        fault = fault.with_role(role);
    }
    if let Some(detail) = detail {
        fault = fault.with_detail(detail);
    }
    Ok(fault)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn parent(stack: &[String], depth_from_top: usize) -> Option<&str> {
    stack
        .len()
        .checked_sub(depth_from_top + 1)
        .map(|i| stack[i].as_str())
}

fn strip_prefix(qualified: &str) -> &str {
    match qualified.split_once(':') {
        Some((_, local)) => local,
        None => qualified,
    }
}

/// Resolve one entity reference to its character
///
/// Character references resolve numerically; of the named entities
/// only the five the XML spec predefines are accepted.
fn resolve_reference(entity: &BytesRef<'_>) -> Result<char, CodecError> {
    if let Some(ch) = entity.resolve_char_ref().map_err(parse_err)? {
        return Ok(ch);
    }
    let name = entity.decode().map_err(parse_err)?;
    match name.as_ref() {
        "amp" => Ok('&'),
        "lt" => Ok('<'),
        "gt" => Ok('>'),
        "apos" => Ok('\''),
        "quot" => Ok('"'),
        other => Err(CodecError::Parse(format!(
            "unresolved entity reference '&{other};'"
        ))),
    }
}

fn detect_version(envelope: &BytesStart<'_>, first_namespace: &mut String) -> Option<SoapVersion> {
    for attr in envelope.attributes().flatten() {
        if attr.key.as_ref().starts_with(b"xmlns") {
            let value = String::from_utf8_lossy(&attr.value).into_owned();
            if let Some(version) = SoapVersion::from_namespace(&value) {
                return Some(version);
            }
            if first_namespace.is_empty() {
                *first_namespace = value;
            }
        }
    }
    None
}

fn parse_err<E: std::fmt::Display>(error: E) -> CodecError {
    CodecError::Parse(error.to_string())
}
