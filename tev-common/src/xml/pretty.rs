//! Indenting wrapper around `quick_xml::Writer`
//!
//! Whitespace is placed by a depth counter: every start or empty element goes
//! on a new line indented two spaces per level, and an end tag gets its own
//! line only when the element had child elements. Text-only elements stay on
//! one line.

use crate::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

const INDENT: &str = "  ";

pub struct PrettyXmlWriter<W: Write> {
    writer: Writer<W>,
    /// One flag per open element: has it had a child element yet
    open: Vec<bool>,
    /// Whether anything has been written yet
    started: bool,
}

impl<W: Write> PrettyXmlWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new(inner),
            open: Vec::new(),
            started: false,
        }
    }

    pub fn declaration(&mut self) -> Result<()> {
        self.started = true;
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(())
    }

    pub fn start(&mut self, element: BytesStart<'_>) -> Result<()> {
        self.child_element_begins()?;
        self.open.push(false);
        self.writer.write_event(Event::Start(element))?;
        Ok(())
    }

    pub fn end(&mut self, name: &str) -> Result<()> {
        let had_children = self.open.pop().unwrap_or(false);
        if had_children {
            self.newline_and_indent()?;
        }
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    pub fn empty(&mut self, element: BytesStart<'_>) -> Result<()> {
        self.child_element_begins()?;
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    /// Escaped character data
    pub fn text(&mut self, text: &str) -> Result<()> {
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }

    /// `<name>text</name>` on one line
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(BytesStart::new(name))?;
        self.text(text)?;
        self.end(name)
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn child_element_begins(&mut self) -> Result<()> {
        if self.started {
            self.newline_and_indent()?;
        }
        self.started = true;
        if let Some(parent) = self.open.last_mut() {
            *parent = true;
        }
        Ok(())
    }

    fn newline_and_indent(&mut self) -> Result<()> {
        let out = self.writer.get_mut();
        out.write_all(b"\n")?;
        for _ in 0..self.open.len() {
            out.write_all(INDENT.as_bytes())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(build: impl FnOnce(&mut PrettyXmlWriter<Vec<u8>>) -> Result<()>) -> String {
        let mut w = PrettyXmlWriter::new(Vec::new());
        build(&mut w).unwrap();
        String::from_utf8(w.into_inner()).unwrap()
    }

    #[test]
    fn nests_elements_and_keeps_text_inline() {
        let xml = render(|w| {
            w.declaration()?;
            w.start(BytesStart::new("tumblr"))?;
            w.start(BytesStart::new("posts"))?;
            w.text_element("tag", "a & b")?;
            w.end("posts")?;
            w.end("tumblr")
        });

        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<tumblr>\n  <posts>\n    <tag>a &amp; b</tag>\n  </posts>\n</tumblr>"
        );
    }

    #[test]
    fn empty_elements_count_as_children() {
        let xml = render(|w| {
            w.start(BytesStart::new("photoset"))?;
            w.empty(BytesStart::new("photo").with_attributes([("offset", "o1")]))?;
            w.end("photoset")
        });

        assert_eq!(xml, "<photoset>\n  <photo offset=\"o1\"/>\n</photoset>");
    }

    #[test]
    fn childless_element_closes_on_same_line() {
        let xml = render(|w| {
            w.start(BytesStart::new("posts"))?;
            w.end("posts")
        });
        assert_eq!(xml, "<posts></posts>");
    }
}
