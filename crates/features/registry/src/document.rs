//! Registry document codec.
//!
//! The only place that turns host content (base64 transport encoding of UTF-8 YAML)
//! into a [`RegistryDocument`] and back. Key order of the root mapping and the order
//! of `characters` are preserved; entries are carried verbatim.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_yaml::{Mapping, Value};
use std::borrow::Cow;
use std::string::FromUtf8Error;

const CHARACTERS_KEY: &str = "characters";

#[bsync_derive::bsync_error]
pub enum DocumentError {
    #[error("Transport decoding error{}: {source}", format_context(.context))]
    Base64 { source: base64::DecodeError, context: Option<Cow<'static, str>> },
    #[error("Document is not valid UTF-8{}: {source}", format_context(.context))]
    Utf8 { source: FromUtf8Error, context: Option<Cow<'static, str>> },
    #[error("YAML error{}: {source}", format_context(.context))]
    Yaml { source: serde_yaml::Error, context: Option<Cow<'static, str>> },
    #[error("Malformed registry document{}: {message}", format_context(.context))]
    Shape { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// In-memory registry file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryDocument {
    /// Root mapping; the `characters` slot (if any) holds a placeholder.
    root: Mapping,
    characters: Vec<Value>,
}

impl RegistryDocument {
    /// Decodes host content: base64 (line breaks allowed), then UTF-8, then YAML.
    ///
    /// # Errors
    /// Any [`DocumentError`] raised along the way.
    pub fn decode(content: &str) -> Result<Self, DocumentError> {
        let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = STANDARD.decode(compact).context("Decoding file content")?;
        let text = String::from_utf8(bytes).context("Decoding file content")?;
        Self::parse(&text)
    }

    /// Parses YAML text. Empty and `null` documents yield an empty registry; a leading
    /// byte order mark is ignored.
    ///
    /// # Errors
    /// [`DocumentError::Yaml`] for invalid YAML; [`DocumentError::Shape`] when the root
    /// is not a mapping or `characters` is not a list.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut root = match serde_yaml::from_str::<Value>(text).context("Parsing registry")? {
            Value::Null => return Ok(Self::default()),
            Value::Mapping(root) => root,
            _ => {
                return Err(DocumentError::Shape {
                    message: "top level must be a mapping".into(),
                    context: None,
                });
            }
        };

        let characters = match root.get_mut(CHARACTERS_KEY).map(std::mem::take) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(list)) => list,
            Some(_) => {
                return Err(DocumentError::Shape {
                    message: "`characters` must be a list".into(),
                    context: None,
                });
            }
        };

        Ok(Self { root, characters })
    }

    /// Renders the document as YAML text.
    ///
    /// # Errors
    /// [`DocumentError::Yaml`] if serialization fails.
    pub fn render(&self) -> Result<String, DocumentError> {
        let mut root = self.root.clone();
        // Replaces the placeholder in place, or appends for new documents.
        root.insert(CHARACTERS_KEY.into(), Value::Sequence(self.characters.clone()));
        serde_yaml::to_string(&root).context("Rendering registry")
    }

    /// Renders and applies the base64 transport encoding.
    ///
    /// # Errors
    /// See [`Self::render`].
    pub fn encode(&self) -> Result<String, DocumentError> {
        self.render().map(|text| STANDARD.encode(text))
    }

    #[must_use]
    pub fn characters(&self) -> &[Value] {
        &self.characters
    }

    pub(crate) fn characters_mut(&mut self) -> &mut Vec<Value> {
        &mut self.characters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_null_documents_are_empty() {
        for text in ["", "   \n", "null", "~"] {
            let doc = RegistryDocument::parse(text).unwrap();
            assert!(doc.characters().is_empty(), "{text:?}");
        }
        assert!(RegistryDocument::parse("characters:\n").unwrap().characters().is_empty());
    }

    #[test]
    fn leading_byte_order_mark_is_ignored() {
        let doc = RegistryDocument::parse("\u{feff}characters:\n- name: LUNA\n").unwrap();
        assert_eq!(doc.characters().len(), 1);

        let rendered = doc.render().unwrap();
        assert!(!rendered.starts_with('\u{feff}'), "{rendered:?}");
        assert!(RegistryDocument::parse("\u{feff}").unwrap().characters().is_empty());
    }

    #[test]
    fn non_mapping_root_is_rejected() {
        let err = RegistryDocument::parse("- a\n- b\n").unwrap_err();
        assert!(matches!(err, DocumentError::Shape { .. }));

        let err = RegistryDocument::parse("characters: nope\n").unwrap_err();
        assert!(matches!(err, DocumentError::Shape { .. }));
    }

    #[test]
    fn render_keeps_other_keys_and_their_order() {
        let text = "version: 2\ncharacters:\n- name: LUNA\n  face_blueprint:\n    eyes: blue\n  extra: kept\nowner: art\n";
        let doc = RegistryDocument::parse(text).unwrap();
        let rendered = doc.render().unwrap();

        let version = rendered.find("version").unwrap();
        let characters = rendered.find("characters").unwrap();
        let owner = rendered.find("owner").unwrap();
        assert!(version < characters && characters < owner, "{rendered}");
        assert!(rendered.contains("extra: kept"));
        assert_eq!(RegistryDocument::parse(&rendered).unwrap(), doc);
    }

    #[test]
    fn decode_accepts_wrapped_base64() {
        let encoded = STANDARD.encode("characters:\n- name: LUNA\n");
        let (head, tail) = encoded.split_at(8);
        let doc = RegistryDocument::decode(&format!("{head}\n{tail}\n")).unwrap();
        assert_eq!(doc.characters().len(), 1);
    }

    #[test]
    fn decode_reports_bad_transport_encoding() {
        assert!(matches!(RegistryDocument::decode("@@@"), Err(DocumentError::Base64 { .. })));
        let not_utf8 = STANDARD.encode([0xff, 0xfe]);
        assert!(matches!(RegistryDocument::decode(&not_utf8), Err(DocumentError::Utf8 { .. })));
    }
}
