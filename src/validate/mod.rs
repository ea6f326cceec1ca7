//! Advisory structural checks on rendered XML.

use std::fmt;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::app::{Result, SheetfeedError};
use crate::render::escape::starts_with_reference;

/// A structural problem, with its position when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlIssue {
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub message: String,
}

impl XmlIssue {
    fn at(xml: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_column(xml, offset);
        Self {
            line: Some(line),
            column: Some(column),
            message: message.into(),
        }
    }

    fn unplaced(message: impl Into<String>) -> Self {
        Self {
            line: None,
            column: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for XmlIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(f, "line {}, column {}: {}", line, column, self.message)
            }
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for XmlIssue {}

/// What to do when a rendered document fails the check.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ValidateMode {
    Off,
    #[default]
    Warn,
    Strict,
}

/// 1-based line and byte column of `offset`.
fn line_column(xml: &str, offset: usize) -> (usize, usize) {
    let prefix = &xml.as_bytes()[..offset.min(xml.len())];
    let line = prefix.iter().filter(|&&b| b == b'\n').count() + 1;
    let column = match prefix.iter().rposition(|&b| b == b'\n') {
        Some(nl) => prefix.len() - nl,
        None => prefix.len() + 1,
    };
    (line, column)
}

/// Byte offset of the first `&` in `raw` that does not start a predefined
/// entity or a reference to a character XML allows.
fn bare_ampersand(raw: &[u8]) -> Option<usize> {
    let text = String::from_utf8_lossy(raw);
    text.char_indices()
        .find(|&(idx, c)| c == '&' && !starts_with_reference(&text[idx..]))
        .map(|(idx, _)| idx)
}

fn check_attributes(xml: &str, offset: usize, start: &BytesStart<'_>) -> std::result::Result<(), XmlIssue> {
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlIssue::at(xml, offset, format!("bad attribute: {}", e)))?;
        if bare_ampersand(&attr.value).is_some() {
            return Err(XmlIssue::at(
                xml,
                offset,
                format!(
                    "bare '&' in attribute {}",
                    String::from_utf8_lossy(attr.key.as_ref())
                ),
            ));
        }
    }
    Ok(())
}

/// Check that `xml` is a single well-formed document.
///
/// Catches mismatched or unclosed tags, a missing or repeated root element,
/// and `&` that does not start a predefined entity or character reference.
pub fn check_well_formed(xml: &str) -> std::result::Result<(), XmlIssue> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = true;

    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        let offset = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| XmlIssue::at(xml, reader.error_position() as usize, e.to_string()))?;

        match event {
            Event::Start(start) | Event::Empty(start) if depth == 0 && roots > 0 => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                return Err(XmlIssue::at(xml, offset, format!("second root element <{}>", name)));
            }
            Event::Start(start) => {
                check_attributes(xml, offset, &start)?;
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Event::Empty(start) => {
                check_attributes(xml, offset, &start)?;
                if depth == 0 {
                    roots += 1;
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) => {
                if let Some(idx) = bare_ampersand(&text) {
                    return Err(XmlIssue::at(
                        xml,
                        offset + idx,
                        "bare '&' not part of an entity or character reference",
                    ));
                }
                if depth == 0 && !text.iter().all(u8::is_ascii_whitespace) {
                    return Err(XmlIssue::at(xml, offset, "text outside the root element"));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth > 0 {
        return Err(XmlIssue::at(xml, xml.len(), format!("{} unclosed element(s)", depth)));
    }
    if roots == 0 {
        return Err(XmlIssue::unplaced("no root element"));
    }
    Ok(())
}

/// Parse `xml` as a feed and return its entry count.
pub fn check_rss_shape(xml: &str) -> std::result::Result<usize, XmlIssue> {
    feed_rs::parser::parse(xml.as_bytes())
        .map(|feed| feed.entries.len())
        .map_err(|e| XmlIssue::unplaced(format!("not a readable feed: {}", e)))
}

/// Run the well-formedness check according to `mode`.
///
/// `Strict` turns a failure into an error; `Warn` only logs it.
pub fn enforce(mode: ValidateMode, name: &str, xml: &str) -> Result<()> {
    if mode == ValidateMode::Off {
        return Ok(());
    }

    match check_well_formed(xml) {
        Ok(()) => Ok(()),
        Err(issue) if mode == ValidateMode::Strict => {
            Err(SheetfeedError::MalformedXml(format!("{}: {}", name, issue)))
        }
        Err(issue) => {
            tracing::warn!("{} is not well-formed: {}", name, issue);
            Ok(())
        }
    }
}
