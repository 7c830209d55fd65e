//! Pull-parser helpers shared by the post and conversation readers

use crate::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// Owned-event cursor over an in-memory XML document
pub(crate) struct XmlSource<'a> {
    reader: Reader<&'a [u8]>,
    buf: Vec<u8>,
}

impl<'a> XmlSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    pub fn next_event(&mut self) -> Result<Event<'static>> {
        self.buf.clear();
        let event = self.reader.read_event_into(&mut self.buf)?;
        Ok(event.into_owned())
    }

    /// Text of the element whose start tag was just read, including the text
    /// of nested elements. Consumes the matching end tag.
    pub fn read_text(&mut self) -> Result<String> {
        let mut depth = 0usize;
        let mut text = String::new();
        loop {
            match self.next_event()? {
                Event::Text(t) => text.push_str(&t.unescape()?),
                Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
                Event::Start(_) => depth += 1,
                Event::End(_) => {
                    if depth == 0 {
                        return Ok(text);
                    }
                    depth -= 1;
                }
                Event::Eof => return Err(premature_eof()),
                _ => {}
            }
        }
    }

    /// Skip the rest of the element whose start tag was just read
    pub fn skip_element(&mut self) -> Result<()> {
        self.read_text().map(|_| ())
    }
}

pub(crate) fn premature_eof() -> Error {
    Error::Xml("Premature end of file".to_string())
}

pub(crate) fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Attributes keyed by local name
pub(crate) fn attributes(e: &BytesStart<'_>) -> Result<HashMap<String, String>> {
    let mut attrs = HashMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        attrs.insert(key, attr.unescape_value()?.into_owned());
    }
    Ok(attrs)
}

/// Parse an optional numeric attribute or element value
pub(crate) fn parse_number(name: &str, value: Option<&str>) -> Result<Option<i64>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse::<i64>()
            .map(Some)
            .map_err(|_| Error::Xml(format!("Invalid number for {}: '{}'", name, v))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_text_concatenates_nested_text_and_cdata() {
        let doc = b"<a>one <b>two</b> <![CDATA[<three>]]></a><next/>";
        let mut src = XmlSource::new(doc);
        assert!(matches!(src.next_event().unwrap(), Event::Start(_)));
        assert_eq!(src.read_text().unwrap(), "onetwo<three>");
        assert!(matches!(src.next_event().unwrap(), Event::Empty(_)));
    }

    #[test]
    fn read_text_reports_truncated_documents() {
        let mut src = XmlSource::new(b"<a>unfinished");
        src.next_event().unwrap();
        assert!(matches!(src.read_text(), Err(Error::Xml(_))));
    }

    #[test]
    fn parse_number_rejects_garbage() {
        assert_eq!(parse_number("width", Some(" 500 ")).unwrap(), Some(500));
        assert_eq!(parse_number("width", Some("")).unwrap(), None);
        assert!(parse_number("width", Some("wide")).is_err());
    }
}
