//! OpenAPI schema nodes.
//!
//! [`SchemaNode`] has one variant per shape (reference, scalar, array, union) and
//! serializes to the matching OpenAPI fragment. [`Schema`] decorates a node with the
//! per-use metadata (description, example, enum values, readOnly), and
//! [`TypeDefinition`] is a named component schema built from a `typedef` block.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Types rendered as `{type: "string", format: <name>}`
pub const STRING_FORMATS: [&str; 4] = ["date", "date-time", "objectId", "ipv4"];

/// Types rendered as a bare `{type: <name>}`
pub const BASE_TYPES: [&str; 5] = ["object", "string", "number", "integer", "boolean"];

/// Property name every union discriminates on
pub const DISCRIMINATOR_PROPERTY: &str = "objectType";

/// Prefix of every component schema reference
pub const COMPONENTS_PREFIX: &str = "#/components/schemas/";

pub fn is_string_format(name: &str) -> bool {
    STRING_FORMATS.contains(&name)
}

pub fn is_base_type(name: &str) -> bool {
    BASE_TYPES.contains(&name)
}

/// Full `$ref` target for a component schema name
pub fn component_ref(name: &str) -> String {
    format!("{}{}", COMPONENTS_PREFIX, name)
}

/// OpenAPI discriminator object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Discriminator {
    #[serde(rename = "propertyName")]
    pub property_name: String,
}

impl Default for Discriminator {
    fn default() -> Self {
        Self {
            property_name: DISCRIMINATOR_PROPERTY.to_string(),
        }
    }
}

/// The structural part of a schema
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// `$ref` to a named component schema
    Reference(String),
    /// `type` plus an optional `format`
    Scalar { kind: String, format: Option<String> },
    /// `type: <container>` with `items`
    Array {
        container: String,
        items: Box<SchemaNode>,
    },
    /// `oneOf` with the fixed `objectType` discriminator
    Union(Vec<SchemaNode>),
}

impl SchemaNode {
    pub fn reference(name: impl Into<String>) -> Self {
        SchemaNode::Reference(name.into())
    }

    /// Scalar for a type name, mapping string formats onto `type: string`
    pub fn scalar(name: &str) -> Self {
        if is_string_format(name) {
            SchemaNode::Scalar {
                kind: "string".to_string(),
                format: Some(name.to_string()),
            }
        } else {
            SchemaNode::Scalar {
                kind: name.to_string(),
                format: None,
            }
        }
    }

    pub fn array(container: impl Into<String>, items: SchemaNode) -> Self {
        SchemaNode::Array {
            container: container.into(),
            items: Box::new(items),
        }
    }

    pub fn is_union(&self) -> bool {
        matches!(self, SchemaNode::Union(_))
    }

    /// Names of every component schema this node points at
    pub fn references(&self) -> Vec<&str> {
        match self {
            SchemaNode::Reference(name) => vec![name.as_str()],
            SchemaNode::Scalar { .. } => Vec::new(),
            SchemaNode::Array { items, .. } => items.references(),
            SchemaNode::Union(members) => members.iter().flat_map(|m| m.references()).collect(),
        }
    }
}

impl Serialize for SchemaNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SchemaNode::Reference(name) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$ref", &component_ref(name))?;
                map.end()
            }
            SchemaNode::Scalar { kind, format } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", kind)?;
                if let Some(format) = format {
                    map.serialize_entry("format", format)?;
                }
                map.end()
            }
            SchemaNode::Array { container, items } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", container)?;
                map.serialize_entry("items", items.as_ref())?;
                map.end()
            }
            SchemaNode::Union(members) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("oneOf", members)?;
                map.serialize_entry("discriminator", &Discriminator::default())?;
                map.end()
            }
        }
    }
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// A schema node plus the metadata attached where it is used
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    #[serde(flatten)]
    pub node: SchemaNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(rename = "readOnly", skip_serializing_if = "is_false")]
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl From<SchemaNode> for Schema {
    fn from(node: SchemaNode) -> Self {
        Self {
            node,
            description: None,
            enum_values: None,
            read_only: false,
            example: None,
        }
    }
}

impl Schema {
    /// Sets the description, ignoring blank text
    pub fn with_description(mut self, description: &str) -> Self {
        let description = description.trim();
        if !description.is_empty() {
            self.description = Some(description.to_string());
        }
        self
    }
}

/// A named, reusable component schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDefinition {
    /// Single-parent inheritance
    #[serde(rename = "allOf", skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<SchemaNode>>,
    /// Required property names, in order of first declaration
    pub required: Vec<String>,
    pub properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
}

impl TypeDefinition {
    pub fn new() -> Self {
        Self {
            all_of: None,
            required: Vec::new(),
            properties: BTreeMap::new(),
            discriminator: None,
        }
    }
}

impl Default for TypeDefinition {
    fn default() -> Self {
        Self::new()
    }
}
