//! SOAP fault envelope writer

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::CodecError;
use crate::fault::SoapFault;
use crate::version::SoapVersion;

/// Serialize a fault as a complete SOAP envelope
///
/// The code QName is written prefix-qualified against the envelope
/// namespace; reason text is escaped by the writer, so any message
/// text round-trips through `parse_fault`.
pub fn write_fault(fault: &SoapFault) -> Result<String, CodecError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    let prefix = fault.version().prefix();

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(write_err)?;

    let envelope_name = format!("{prefix}:Envelope");
    let mut envelope = BytesStart::new(envelope_name.as_str());
    envelope.push_attribute((
        format!("xmlns:{prefix}").as_str(),
        fault.version().namespace(),
    ));
    writer
        .write_event(Event::Start(envelope))
        .map_err(write_err)?;

    start(&mut writer, &format!("{prefix}:Body"))?;
    start(&mut writer, &format!("{prefix}:Fault"))?;

    match fault.version() {
        SoapVersion::Soap11 => {
            let code = format!("{prefix}:{}", fault.code().local_part());
            text_element(&mut writer, "faultcode", &code)?;
            text_element(&mut writer, "faultstring", fault.reason())?;
            if let Some(node) = fault.node() {
                text_element(&mut writer, "faultactor", node)?;
            }
            if let Some(detail) = fault.detail() {
                text_element(&mut writer, "detail", detail)?;
            }
        }
        SoapVersion::Soap12 => {
            start(&mut writer, &format!("{prefix}:Code"))?;
            let value = format!("{prefix}:{}", fault.code().local_part());
            text_element(&mut writer, &format!("{prefix}:Value"), &value)?;
            if let Some(subcode) = fault.subcode() {
                start(&mut writer, &format!("{prefix}:Subcode"))?;
                text_element(
                    &mut writer,
                    &format!("{prefix}:Value"),
                    subcode.local_part(),
                )?;
                end(&mut writer, &format!("{prefix}:Subcode"))?;
            }
            end(&mut writer, &format!("{prefix}:Code"))?;

            start(&mut writer, &format!("{prefix}:Reason"))?;
            let text_name = format!("{prefix}:Text");
            let mut text = BytesStart::new(text_name.as_str());
            text.push_attribute(("xml:lang", fault.lang()));
            writer.write_event(Event::Start(text)).map_err(write_err)?;
            writer
                .write_event(Event::Text(BytesText::new(fault.reason())))
                .map_err(write_err)?;
            end(&mut writer, &text_name)?;
            end(&mut writer, &format!("{prefix}:Reason"))?;

            if let Some(node) = fault.node() {
                text_element(&mut writer, &format!("{prefix}:Node"), node)?;
            }
            if let Some(role) = fault.role() {
                text_element(&mut writer, &format!("{prefix}:Role"), role)?;
            }
            if let Some(detail) = fault.detail() {
                text_element(&mut writer, &format!("{prefix}:Detail"), detail)?;
            }
        }
    }

    end(&mut writer, &format!("{prefix}:Fault"))?;
    end(&mut writer, &format!("{prefix}:Body"))?;
    end(&mut writer, &envelope_name)?;

    String::from_utf8(writer.into_inner()).map_err(|e| CodecError::Write(e.to_string()))
}

fn start<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), CodecError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(write_err)
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), CodecError> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(write_err)
}

fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<(), CodecError> {
    start(writer, name)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(write_err)?;
    end(writer, name)
}

fn write_err<E: std::fmt::Display>(error: E) -> CodecError {
    CodecError::Write(error.to_string())
}
