//! Partner wire format: envelope writer, text folding, response parsing
//!
//! All flows of a given partner share one rigid envelope skeleton; only the
//! request root and the flow-specific fields vary. Responses mirror the
//! request shape, so flows only ever read leaf values.

use std::collections::BTreeMap;
use std::io::Cursor;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{DeliveryError, Result};

/// Wire date format (dateEmissionFlux)
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Wire time format (heureEmissionFlux)
pub const TIME_FORMAT: &str = "%H%M%S";

/// Uppercase letters and space, the narrowest allow-list partners accept
pub const ALPHA_UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ ";

/// Uppercase letters, digits and space
pub const ALPHA_UPPER_DIGITS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 ";

/// Outbound envelope: the fixed four-part skeleton shared by all flows.
///
/// Serialization is a pure function of the envelope value; the emission
/// instant is an explicit input, never read from a clock here.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    root: String,
    flux_type: String,
    emitted_at: DateTime<Utc>,
    fields: Vec<(String, String)>,
}

impl RequestEnvelope {
    /// Start an envelope for one flow
    pub fn new(
        root: impl Into<String>,
        flux_type: impl Into<String>,
        emitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            root: root.into(),
            flux_type: flux_type.into(),
            emitted_at,
            fields: Vec::new(),
        }
    }

    /// Append a flow-specific field
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Serialize the envelope
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        write_event(&mut writer, Event::Start(BytesStart::new("Envelope")))?;
        write_event(&mut writer, Event::Empty(BytesStart::new("Header")))?;
        write_event(&mut writer, Event::Start(BytesStart::new("Body")))?;
        write_event(&mut writer, Event::Start(BytesStart::new(self.root.as_str())))?;

        write_element(&mut writer, "typeFlux", &self.flux_type)?;
        write_element(
            &mut writer,
            "dateEmissionFlux",
            &self.emitted_at.format(DATE_FORMAT).to_string(),
        )?;
        write_element(
            &mut writer,
            "heureEmissionFlux",
            &self.emitted_at.format(TIME_FORMAT).to_string(),
        )?;

        for (name, value) in &self.fields {
            write_element(&mut writer, name, value)?;
        }

        write_event(&mut writer, Event::End(BytesEnd::new(self.root.as_str())))?;
        write_event(&mut writer, Event::End(BytesEnd::new("Body")))?;
        write_event(&mut writer, Event::End(BytesEnd::new("Envelope")))?;

        let bytes = writer.into_inner().into_inner();
        String::from_utf8(bytes)
            .map_err(|e| DeliveryError::Configuration(format!("envelope is not valid UTF-8: {e}")))
    }
}

fn write_event(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| DeliveryError::Configuration(format!("envelope serialization: {e}")))
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, tag: &str, text: &str) -> Result<()> {
    write_event(writer, Event::Start(BytesStart::new(tag)))?;
    write_event(writer, Event::Text(BytesText::new(text)))?;
    write_event(writer, Event::End(BytesEnd::new(tag)))
}

/// Fold free text into the partner character set: uppercase, accented Latin
/// letters mapped to their base letters, anything outside the allow-list
/// replaced with a space, truncated to `max_len` characters.
pub fn fold_text(input: &str, max_len: usize, allowed: Option<&str>) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        for upper in c.to_uppercase() {
            push_folded(&mut out, upper);
        }
    }

    if let Some(allowed) = allowed {
        out = out
            .chars()
            .map(|c| if allowed.contains(c) { c } else { ' ' })
            .collect();
    }

    out.chars().take(max_len).collect()
}

fn push_folded(out: &mut String, c: char) {
    match c {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => out.push('A'),
        'È' | 'É' | 'Ê' | 'Ë' => out.push('E'),
        'Ì' | 'Í' | 'Î' | 'Ï' => out.push('I'),
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => out.push('O'),
        'Ù' | 'Ú' | 'Û' | 'Ü' => out.push('U'),
        'Ç' => out.push('C'),
        'Ñ' => out.push('N'),
        'Ý' | 'Ÿ' => out.push('Y'),
        'Œ' => out.push_str("OE"),
        'Æ' => out.push_str("AE"),
        c if c.is_ascii() => out.push(c),
        _ => out.push(' '),
    }
}

/// Parsed partner response: leaf element name to text
#[derive(Debug, Clone, Default)]
pub struct PartnerResponse {
    fields: BTreeMap<String, String>,
}

impl PartnerResponse {
    /// Text of the named leaf element, if present
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Parse a partner response body into leaf fields.
///
/// Element nesting is flattened. A body that is not well-formed markup, or
/// contains no XML elements at all, is an error; the audit boundary turns it
/// into a permanent outcome.
pub fn parse_partner_response(body: &str) -> anyhow::Result<PartnerResponse> {
    let mut reader = Reader::from_str(body);
    let mut fields = BTreeMap::new();
    let mut current: Option<String> = None;
    let mut saw_element = false;

    loop {
        match reader.read_event().context("malformed partner response")? {
            Event::Start(start) => {
                saw_element = true;
                current = Some(String::from_utf8_lossy(start.local_name().as_ref()).into_owned());
            }
            Event::Empty(_) => saw_element = true,
            Event::Text(text) => {
                if let Some(tag) = &current {
                    let value = text.unescape().context("malformed partner response")?;
                    let value = value.trim();
                    if !value.is_empty() {
                        fields.insert(tag.clone(), value.to_string());
                    }
                }
            }
            Event::End(_) => current = None,
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_element {
        bail!("no XML elements in partner response");
    }

    Ok(PartnerResponse { fields })
}
