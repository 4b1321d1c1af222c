//! ONIX document serialization.

use std::fmt::Write;

use super::tree::{Element, Node};
use crate::util::escape_xml;

const INDENT: &str = "  ";

/// Serialize a document with an XML declaration and two-space indentation.
///
/// Elements whose only children are text are written on one line so that
/// code values never pick up surrounding whitespace.
pub fn write_document(root: &Element) -> String {
    let mut out = String::with_capacity(8192);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    write_element(&mut out, root, 0);
    out
}

fn write_start(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.name);
    for (key, value) in &el.attributes {
        let _ = write!(out, " {}=\"{}\"", key, escape_xml(value));
    }
}

fn write_element(out: &mut String, el: &Element, depth: usize) {
    let indent = INDENT.repeat(depth);
    out.push_str(&indent);
    write_start(out, el);

    if el.children.is_empty() {
        out.push_str("/>\n");
        return;
    }

    if !el.has_element_children() {
        out.push('>');
        for node in &el.children {
            if let Node::Text(text) = node {
                out.push_str(&escape_xml(text));
            }
        }
        let _ = writeln!(out, "</{}>", el.name);
        return;
    }

    out.push_str(">\n");
    for node in &el.children {
        match node {
            Node::Element(child) => write_element(out, child, depth + 1),
            Node::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    let _ = writeln!(out, "{}{}{}", indent, INDENT, escape_xml(text));
                }
            }
        }
    }
    let _ = writeln!(out, "{}</{}>", indent, el.name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onix::tree::parse_document;

    #[test]
    fn test_write_nested() {
        let doc = Element::new("ONIXMessage")
            .with_attr("release", "3.0")
            .with_child(Element::new("Header").with_child(Element::leaf("SentDateTime", "20240101T000000")))
            .with_child(Element::new("Empty"));

        let xml = write_document(&doc);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<ONIXMessage release=\"3.0\">\n  <Header>\n    <SentDateTime>20240101T000000</SentDateTime>\n  </Header>\n  <Empty/>\n</ONIXMessage>\n"
        );
    }

    #[test]
    fn test_escaping() {
        let doc = Element::leaf("Text", "A & B <c>").with_attr("note", "say \"hi\"");
        let xml = write_document(&doc);
        assert!(xml.contains("<Text note=\"say &quot;hi&quot;\">A &amp; B &lt;c&gt;</Text>"));
    }

    #[test]
    fn test_reparse_preserves_tree() {
        let doc = Element::new("Product")
            .with_child(Element::leaf("RecordReference", "r & d"))
            .with_child(Element::new("DescriptiveDetail").with_child(Element::leaf("ProductForm", "EA")));
        let reparsed = parse_document(write_document(&doc).as_bytes()).unwrap();
        assert_eq!(reparsed, doc);
    }
}
