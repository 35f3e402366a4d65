//! Definition trees
//!
//! Groups and resources are configured from a tree of named nodes with
//! string attributes. The tree usually comes from an external parser; this
//! module defines the interface it must provide and a serde-backed tree that
//! can be read from JSON:
//!
//! ```json
//! { "name": "group",
//!   "attributes": { "name": "level1", "overridable": "true" },
//!   "children": [
//!     { "name": "dependency", "attributes": { "name": "common" } },
//!     { "name": "blob", "attributes": { "name": "map", "file": "map.bin" } }
//!   ] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ResourceError;

/// A node of a parsed definition
pub trait DefinitionNode {
    fn name(&self) -> &str;

    fn attribute(&self, name: &str) -> Option<&str>;

    /// Child nodes in document order
    fn children(&self) -> Vec<&dyn DefinitionNode>;
}

/// Owned definition tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionTree {
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<DefinitionTree>,
}

impl DefinitionTree {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: DefinitionTree) -> Self {
        self.children.push(child);
        self
    }

    /// Parse a tree from JSON text.
    ///
    /// # Errors
    /// `BadDefinition` if the JSON is malformed.
    pub fn from_json(text: &str) -> Result<Self, ResourceError> {
        serde_json::from_str(text)
            .map_err(|e| ResourceError::BadDefinition(format!("definition JSON: {e}")))
    }

    /// Parse a tree from a reader of JSON bytes.
    ///
    /// # Errors
    /// `BadDefinition` if reading fails or the JSON is malformed.
    pub fn from_reader(reader: impl embedded_io::Read) -> Result<Self, ResourceError> {
        let bytes = read_all(reader)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ResourceError::BadDefinition(format!("definition JSON: {e}")))
    }
}

impl DefinitionNode for DefinitionTree {
    fn name(&self) -> &str {
        &self.name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn children(&self) -> Vec<&dyn DefinitionNode> {
        self.children
            .iter()
            .map(|child| child as &dyn DefinitionNode)
            .collect()
    }
}

/// Read a boolean attribute; a missing or empty attribute is `false`.
///
/// # Errors
/// `BadDefinition` for values other than `true`/`false`/`1`/`0`/`yes`/`no`.
pub fn bool_attribute(node: &dyn DefinitionNode, name: &str) -> Result<bool, ResourceError> {
    match node.attribute(name).map(str::trim) {
        None | Some("") => Ok(false),
        Some(value) if value.eq_ignore_ascii_case("true") || value == "1" => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("yes") => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("false") || value == "0" => Ok(false),
        Some(value) if value.eq_ignore_ascii_case("no") => Ok(false),
        Some(value) => Err(ResourceError::BadDefinition(format!(
            "attribute '{name}' of <{}> is not a boolean: '{value}'",
            node.name()
        ))),
    }
}

/// Read a required, non-empty attribute.
///
/// # Errors
/// `BadDefinition` if the attribute is missing or empty.
pub fn required_attribute<'a>(
    node: &'a dyn DefinitionNode,
    name: &str,
) -> Result<&'a str, ResourceError> {
    match node.attribute(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ResourceError::BadDefinition(format!(
            "<{}> has no '{name}' attribute",
            node.name()
        ))),
    }
}

pub(crate) fn read_all(mut reader: impl embedded_io::Read) -> Result<Vec<u8>, ResourceError> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            Err(e) => {
                return Err(ResourceError::BadDefinition(format!(
                    "Failed to read definition: {e:?}"
                )))
            }
        }
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_tree() {
        let tree = DefinitionTree::from_json(
            r#"{ "name": "group", "attributes": { "name": "g" },
                 "children": [ { "name": "dependency", "attributes": { "name": "base" } } ] }"#,
        )
        .unwrap();
        assert_eq!(tree.attribute("name"), Some("g"));
        let children = tree.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name(), "dependency");
        assert_eq!(children[0].attribute("name"), Some("base"));
    }

    #[test]
    fn test_bool_attribute_values() {
        let node = DefinitionTree::new("n")
            .with_attribute("a", "TRUE")
            .with_attribute("b", "0")
            .with_attribute("c", "maybe");
        assert!(bool_attribute(&node, "a").unwrap());
        assert!(!bool_attribute(&node, "b").unwrap());
        assert!(!bool_attribute(&node, "missing").unwrap());
        assert!(bool_attribute(&node, "c").is_err());
    }

    #[test]
    fn test_required_attribute_rejects_empty() {
        let node = DefinitionTree::new("blob").with_attribute("name", "");
        assert!(required_attribute(&node, "name").is_err());
        assert!(required_attribute(&node, "file").is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = DefinitionTree::from_json("{ not json").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::BadParameter);
    }
}
