//! Thin element-oriented wrapper around [`quick_xml::Writer`].
//!
//! Every document is produced through this writer so that text and
//! attribute values are always escaped. Output uses 2-space indentation and
//! a `<?xml version="1.0" encoding="UTF-8"?>` declaration, as Moodle writes.

use crate::error::{Error, Result};
use crate::model::is_xml_char;
use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io;

/// Placeholder Moodle writes for SQL NULL columns.
pub const NULL: &str = "$@NULL@$";

pub struct XmlDoc {
    writer: Writer<Vec<u8>>,
    document: &'static str,
}

impl XmlDoc {
    /// Start a new document. `document` names it in error messages.
    pub fn new(document: &'static str) -> Result<Self> {
        let mut writer = Writer::new_with_indent(Vec::with_capacity(4096), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|source| Error::Serialization { document, source })?;
        Ok(Self { writer, document })
    }

    pub fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
        let start = start_tag(tag, attrs)?;
        self.writer.write_event(Event::Start(start))
    }

    pub fn close(&mut self, tag: &str) -> io::Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(tag)))
    }

    /// `<tag>text</tag>`, or `<tag/>` when `text` is empty.
    pub fn leaf(&mut self, tag: &str, text: &str) -> io::Result<()> {
        self.leaf_with(tag, &[], text)
    }

    pub fn leaf_with(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) -> io::Result<()> {
        if text.is_empty() {
            return self.empty_with(tag, attrs);
        }
        self.open(tag, attrs)?;
        self.writer.write_event(Event::Text(text_event(text)?))?;
        self.close(tag)
    }

    /// Leaf holding any displayable value (ids, flags, counts).
    pub fn value(&mut self, tag: &str, value: impl std::fmt::Display) -> io::Result<()> {
        self.leaf(tag, &value.to_string())
    }

    pub fn empty(&mut self, tag: &str) -> io::Result<()> {
        self.empty_with(tag, &[])
    }

    pub fn empty_with(&mut self, tag: &str, attrs: &[(&str, &str)]) -> io::Result<()> {
        let start = start_tag(tag, attrs)?;
        self.writer.write_event(Event::Empty(start))
    }

    /// Run `body` and convert a writer failure into [`Error::Serialization`].
    pub fn build(&mut self, body: impl FnOnce(&mut Self) -> io::Result<()>) -> Result<()> {
        let document = self.document;
        body(self).map_err(|source| Error::Serialization { document, source })
    }

    pub fn finish(self) -> Result<String> {
        let document = self.document;
        let mut bytes = self.writer.into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes).map_err(|e| Error::Serialization {
            document,
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })
    }
}

fn check_chars(value: &str) -> io::Result<()> {
    match value.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("U+{:04X} cannot be represented in XML", c as u32),
        )),
        None => Ok(()),
    }
}

fn start_tag<'a>(tag: &'a str, attrs: &[(&str, &str)]) -> io::Result<BytesStart<'a>> {
    let mut start = BytesStart::new(tag);
    for &(key, value) in attrs {
        check_chars(value)?;
        start.push_attribute((key, value));
    }
    Ok(start)
}

/// Escaped text content. `\r` becomes `&#13;`, otherwise parsers fold CRLF
/// into LF on read.
fn text_event(text: &str) -> io::Result<BytesText<'_>> {
    check_chars(text)?;
    let escaped = escape(text);
    if escaped.contains('\r') {
        Ok(BytesText::from_escaped(escaped.replace('\r', "&#13;")))
    } else {
        Ok(BytesText::from_escaped(escaped))
    }
}

/// Fractions are written with 7 decimals, as Moodle's backup does.
pub fn fraction(value: f64) -> String {
    format!("{:.7}", value)
}

/// Marks and grades use 5 decimals.
pub fn mark(value: f64) -> String {
    format!("{:.5}", value)
}

pub fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}
