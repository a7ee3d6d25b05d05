//! XML chunking: one document per direct child of the root element.

use crate::domain::{Document, DocumentKind, FileInfo};
use crate::utils::stable_hash;
use roxmltree::{Document as XmlDocument, ParsingOptions};
use serde_json::{json, Map};

pub struct XmlChunker;

impl Default for XmlChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlChunker {
    pub fn new() -> Self {
        Self
    }

    /// Malformed XML yields no documents and a warning.
    pub fn chunk(&self, file_info: &FileInfo, content: &str) -> Vec<Document> {
        let options = ParsingOptions { allow_dtd: true, ..ParsingOptions::default() };
        let xml = match XmlDocument::parse_with_options(content, options) {
            Ok(xml) => xml,
            Err(err) => {
                tracing::warn!("Error parsing XML {}: {}", file_info.relative_path, err);
                return Vec::new();
            }
        };

        xml.root_element()
            .children()
            .filter(|node| node.is_element())
            .enumerate()
            .map(|(index, element)| {
                let text = &content[element.range()];
                let tag = element.tag_name().name();

                let mut metadata = Map::new();
                metadata.insert("source".into(), json!(file_info.relative_path));
                metadata.insert("file_type".into(), json!("xml"));
                metadata.insert("element_tag".into(), json!(tag));

                Document {
                    id: stable_hash(text, &file_info.relative_path, &format!("element-{index}")),
                    kind: DocumentKind::Xml,
                    source: file_info.relative_path.clone(),
                    text: text.to_string(),
                    metadata,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn info() -> FileInfo {
        FileInfo {
            path: PathBuf::from("/tmp/pom.xml"),
            relative_path: "pom.xml".to_string(),
            size_bytes: 0,
            extension: ".xml".to_string(),
        }
    }

    #[test]
    fn one_document_per_root_child() {
        let content = "<project>\n  <groupId>org.acme</groupId>\n  <!-- note -->\n  <dependencies><dependency/></dependencies>\n</project>\n";
        let docs = XmlChunker::new().chunk(&info(), content);

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text, "<groupId>org.acme</groupId>");
        assert_eq!(docs[0].metadata["element_tag"], "groupId");
        assert_eq!(docs[1].metadata["element_tag"], "dependencies");
        assert_eq!(docs[1].metadata["file_type"], "xml");
        assert_ne!(docs[0].id, docs[1].id);
    }

    #[test]
    fn malformed_xml_yields_nothing() {
        assert!(XmlChunker::new().chunk(&info(), "<project><open></project>").is_empty());
    }
}
