//! Owned document model
//!
//! Built from a reader through its accessors and written back through a
//! writer, depth first. Strings are always UTF-8 here, whichever
//! representation the document was read from.

use crate::core::encoding::{utf16_units, XmlEncoding};
use crate::core::unit::Unit;
use crate::error::{Construct, Error, Result};
use crate::reader::records::owned_string;
use crate::reader::{
    DocTypeDecl, ExternalId, NameValue, SliceReader, TokenKind, Utf16Reader, Utf8Reader, XmlDecl,
    XmlVersion,
};
use crate::writer::{Sink, Writer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: XmlVersion,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

impl XmlDeclaration {
    pub fn as_view(&self) -> XmlDecl<'_, u8> {
        XmlDecl {
            version: self.version,
            encoding: self.encoding.as_deref().map(str::as_bytes),
            standalone: self.standalone,
        }
    }
}

impl Default for XmlDeclaration {
    fn default() -> Self {
        XmlDeclaration {
            version: XmlVersion::V1_0,
            encoding: None,
            standalone: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalIdentifier {
    System { system: String },
    Public { public: String, system: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocType {
    pub name: String,
    pub external_id: Option<ExternalIdentifier>,
}

impl DocType {
    pub fn as_view(&self) -> DocTypeDecl<'_, u8> {
        let external_id = self.external_id.as_ref().map(|id| match id {
            ExternalIdentifier::System { system } => ExternalId::System {
                system: system.as_bytes(),
            },
            ExternalIdentifier::Public { public, system } => ExternalId::Public {
                public: public.as_bytes(),
                system: system.as_bytes(),
            },
        });
        DocTypeDecl {
            name: self.name.as_bytes(),
            external_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Normalized value, references resolved
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn as_view(&self) -> NameValue<'_, u8> {
        NameValue::new(self.name.as_bytes(), self.value.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingInstruction {
    pub target: String,
    pub data: String,
}

impl ProcessingInstruction {
    pub fn as_view(&self) -> NameValue<'_, u8> {
        NameValue::new(self.target.as_bytes(), self.data.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Kept in document order so prolog comments and PIs stay on their side of it
    DocType(DocType),
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(ProcessingInstruction),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Value of the first attribute with this name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Concatenated text and CDATA of all descendants, in document order
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) | Node::CData(text) => out.push_str(text),
            Node::Element(e) => collect_text(&e.children, out),
            Node::DocType(_) | Node::Comment(_) | Node::ProcessingInstruction(_) => {}
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub declaration: Option<XmlDeclaration>,
    /// Top-level nodes: the doctype and root element plus any surrounding
    /// comments, processing instructions and whitespace
    pub nodes: Vec<Node>,
}

impl Document {
    /// Drain a reader into a document.
    ///
    /// Attribute values use the CDATA whitespace rule. Input that ends with
    /// elements still open is an `ETag` grammar error.
    pub fn parse<U: Unit>(reader: &mut SliceReader<'_, U>) -> Result<Document> {
        let mut doc = Document::default();
        let mut open: Vec<Element> = Vec::new();

        while reader.advance()? {
            let node = match reader.token() {
                TokenKind::XmlDecl => {
                    doc.declaration = Some(reader.xml_decl()?.into_owned()?);
                    continue;
                }
                TokenKind::DocTypeDecl => Node::DocType(reader.doctype_decl()?.into_owned()?),
                TokenKind::StartTagStart => {
                    open.push(Element::new(owned_string(reader.raw_span()?)?));
                    continue;
                }
                TokenKind::Attribute => {
                    let attribute = reader.attribute(true)?.into_owned()?;
                    if let Some(element) = open.last_mut() {
                        element.attributes.push(attribute);
                    }
                    continue;
                }
                TokenKind::StartTagEnd | TokenKind::None => continue,
                TokenKind::EmptyTag | TokenKind::EndTag => match open.pop() {
                    Some(element) => Node::Element(element),
                    None => continue,
                },
                TokenKind::Text => Node::Text(reader.resolved_str()?.into_owned()),
                TokenKind::CData => Node::CData(owned_string(reader.raw_span()?)?),
                TokenKind::Comment => Node::Comment(owned_string(reader.raw_span()?)?),
                TokenKind::ProcessingInstruction => {
                    let pi = reader.raw_name_value()?;
                    Node::ProcessingInstruction(ProcessingInstruction {
                        target: owned_string(pi.name)?,
                        data: owned_string(pi.value)?,
                    })
                }
            };
            match open.last_mut() {
                Some(parent) => parent.children.push(node),
                None => doc.nodes.push(node),
            }
        }

        if !open.is_empty() {
            return Err(Error::Grammar {
                position: SliceReader::position(reader),
                construct: Construct::EndTag,
            });
        }
        Ok(doc)
    }

    /// Parse raw bytes, choosing UTF-8 or UTF-16 from the byte-order mark
    /// or the first bytes
    pub fn from_bytes(input: &[u8]) -> Result<Document> {
        let encoding = XmlEncoding::detect(input);
        if encoding.is_utf16() {
            let units = utf16_units(input, encoding)?;
            Document::parse(&mut Utf16Reader::new(&units))
        } else {
            Document::parse(&mut Utf8Reader::new(input))
        }
    }

    pub fn doctype(&self) -> Option<&DocType> {
        self.nodes.iter().find_map(|node| match node {
            Node::DocType(d) => Some(d),
            _ => None,
        })
    }

    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn write_to<S: Sink>(&self, writer: &mut Writer<S>) -> Result<()> {
        writer.write_document(self)
    }

    /// Serialize as UTF-8
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::<u8>::new());
        self.write_to(&mut writer)?;
        let bytes = writer.into_inner();
        String::from_utf8(bytes).map_err(|e| Error::Encoding {
            position: e.utf8_error().valid_up_to(),
        })
    }
}

impl<S: Sink> Writer<S> {
    pub fn write_document(&mut self, doc: &Document) -> Result<()> {
        if let Some(decl) = &doc.declaration {
            self.write_xml_decl(&decl.as_view())?;
        }
        for node in &doc.nodes {
            self.write_node(node)?;
        }
        Ok(())
    }

    pub fn write_node(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::DocType(doctype) => self.write_doctype_decl(&doctype.as_view()),
            Node::Element(element) => self.write_element(element),
            Node::Text(text) => self.write_text(text.as_bytes(), false),
            Node::CData(text) => self.write_text(text.as_bytes(), true),
            Node::Comment(text) => self.write_comment(text.as_bytes()),
            Node::ProcessingInstruction(pi) => self.write_processing_instruction(pi.as_view()),
        }
    }

    /// An element without children is written as an empty tag
    pub fn write_element(&mut self, element: &Element) -> Result<()> {
        let name = element.name.as_bytes();
        self.write_start_tag(name, element.attributes.iter().map(Attribute::as_view))?;
        if element.children.is_empty() {
            return self.write_start_tag_end(true);
        }
        self.write_start_tag_end(false)?;
        for child in &element.children {
            self.write_node(child)?;
        }
        self.write_end_tag(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
        <!DOCTYPE catalog SYSTEM \"catalog.dtd\">\
        <catalog><!-- books --><book id=\"b1\" lang='en'>\
        <title>Rust &amp; XML</title><note><![CDATA[<raw>]]></note><?render fast?>\
        </book><book id=\"b2\"/></catalog>";

    #[test]
    fn test_parse_document() {
        let doc = Document::from_bytes(SAMPLE.as_bytes()).unwrap();
        let decl = doc.declaration.as_ref().unwrap();
        assert_eq!(decl.encoding.as_deref(), Some("UTF-8"));
        assert_eq!(
            doc.doctype(),
            Some(&DocType {
                name: "catalog".into(),
                external_id: Some(ExternalIdentifier::System {
                    system: "catalog.dtd".into()
                }),
            })
        );

        let root = doc.root().unwrap();
        assert_eq!(root.name, "catalog");
        assert_eq!(root.children[0], Node::Comment(" books ".into()));

        let books: Vec<_> = root.elements().collect();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].attribute("id"), Some("b1"));
        assert_eq!(books[0].attribute("lang"), Some("en"));
        assert_eq!(books[0].inner_text(), "Rust & XML<raw>");
        assert_eq!(
            books[0].children[2],
            Node::ProcessingInstruction(ProcessingInstruction {
                target: "render".into(),
                data: "fast".into()
            })
        );
        assert!(books[1].children.is_empty());
    }

    #[test]
    fn test_write_back() {
        let doc = Document::from_bytes(SAMPLE.as_bytes()).unwrap();
        let xml = doc.to_xml().unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <!DOCTYPE catalog SYSTEM \"catalog.dtd\">\
             <catalog><!-- books --><book id=\"b1\" lang=\"en\">\
             <title>Rust &amp; XML</title><note><![CDATA[<raw>]]></note><?render fast?>\
             </book><book id=\"b2\"/></catalog>"
        );
        assert_eq!(Document::from_bytes(xml.as_bytes()).unwrap(), doc);
    }

    #[test]
    fn test_utf16_bytes() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "<r a=\"é\">日本</r>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let doc = Document::from_bytes(&bytes).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.attribute("a"), Some("é"));
        assert_eq!(root.inner_text(), "日本");
    }

    #[test]
    fn test_unclosed_element() {
        let err = Document::from_bytes(b"<a><b/>").unwrap_err();
        assert!(matches!(
            err,
            Error::Grammar {
                construct: Construct::EndTag,
                position: 7
            }
        ));
    }

    #[test]
    fn test_build_and_write_utf16() {
        let doc = Document {
            declaration: Some(XmlDeclaration::default()),
            nodes: vec![Node::Element(
                Element::new("r")
                    .with_attribute("q", "a\"b")
                    .with_child(Node::Text("1 < 2".into())),
            )],
        };
        let mut writer: Writer<Vec<u16>> = Writer::new(Vec::new());
        doc.write_to(&mut writer).unwrap();
        let out = String::from_utf16(&writer.into_inner()).unwrap();
        assert_eq!(out, "<?xml version=\"1.0\"?><r q=\"a&quot;b\">1 &lt; 2</r>");
    }

    #[test]
    fn test_prolog_order_is_kept() {
        let xml = "<?xml version=\"1.0\"?><!-- header --><?style sheet?>\
            <!DOCTYPE r PUBLIC \"-//R//EN\" \"r.dtd\"><!-- body --><r/>";
        let doc = Document::from_bytes(xml.as_bytes()).unwrap();
        assert_eq!(doc.nodes[0], Node::Comment(" header ".into()));
        assert!(matches!(doc.nodes[2], Node::DocType(_)));
        assert_eq!(doc.to_xml().unwrap(), xml);
    }
}
