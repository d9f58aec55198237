//! Type descriptor resolution.
//!
//! Resolution is two-tiered. [`resolve_type`] only produces a type *name* and is enough
//! for simple parameters and scalar properties. [`resolve_schema`] builds a full
//! [`SchemaNode`] and is only needed when a descriptor involves a `$ref`, a union or an
//! array; it returns `None` for bare scalars so callers can fall back to the name.

use crate::schema::{is_base_type, is_string_format, SchemaNode};
use crate::tag::TypeDescriptor;
use crate::tag_utils::split_example_marker;
use log::debug;

/// Explicit enum type and its allowed values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    /// Underlying type, `string` unless the example names one
    pub kind: String,
    pub values: Vec<String>,
}

/// Returns the component name of a `Name.model` reference.
pub fn model_name(name: &str) -> Option<&str> {
    let mut segments = name.split('.');
    let first = segments.next()?;
    match segments.next() {
        Some("model") => Some(first),
        _ => None,
    }
}

/// Strips a `.model` suffix when present.
fn component_name(name: &str) -> &str {
    model_name(name).unwrap_or(name)
}

/// Resolves a descriptor to a plain type name.
///
/// - `Pet.model` resolves to `Pet`
/// - any other name is returned as-is
/// - a generic application resolves to its lowercased container (`Array.<Point>` -> `array`)
/// - unions and unrecognized expressions fall back to `string`
///
/// Returns `None` when there is no descriptor at all.
pub fn resolve_type(descriptor: Option<&TypeDescriptor>) -> Option<String> {
    let descriptor = descriptor?;

    let resolved = match descriptor {
        TypeDescriptor::Name(name) => component_name(name).to_string(),
        TypeDescriptor::Application { container, .. } => container.to_lowercase(),
        TypeDescriptor::Union(_) | TypeDescriptor::Any => "string".to_string(),
    };

    Some(resolved)
}

/// Resolves a descriptor to a schema node when a plain type name is not enough.
///
/// Returns `None` for bare scalar and non-model names. A union of two or more members
/// becomes a `oneOf`; a union of exactly one member degenerates to that member. An
/// application with one element becomes `{type: <container>, items: <element>}`, and
/// one with several elements wraps them in a `oneOf` under `items`.
pub fn resolve_schema(descriptor: &TypeDescriptor) -> Option<SchemaNode> {
    match descriptor {
        TypeDescriptor::Name(name) => {
            let model = model_name(name)?;
            debug!("Resolved {} to component reference {}", name, model);
            Some(SchemaNode::reference(model))
        }
        TypeDescriptor::Union(members) => {
            let mut alternatives = union_members(members);
            match alternatives.len() {
                0 => None,
                1 => alternatives.pop(),
                _ => Some(SchemaNode::Union(alternatives)),
            }
        }
        TypeDescriptor::Application {
            container,
            elements,
        } => {
            let items = match elements.as_slice() {
                [] => return None,
                [_] => resolve_items(descriptor)?,
                many => SchemaNode::Union(union_members(many)),
            };
            Some(SchemaNode::array(container.to_lowercase(), items))
        }
        TypeDescriptor::Any => None,
    }
}

/// Resolves the `items` node of an application's first element.
pub fn resolve_items(descriptor: &TypeDescriptor) -> Option<SchemaNode> {
    match descriptor {
        TypeDescriptor::Application { elements, .. } => elements.first().map(member_node),
        _ => None,
    }
}

/// Reads `- eg: <type>:<v1>,<v2>,...` from a description.
///
/// Without a type prefix the enum is a `string` enum. Returns `None` when the
/// description has no example marker.
pub fn resolve_enum(description: &str) -> Option<EnumSpec> {
    let example = split_example_marker(description).example()?;

    let (kind, values) = match example.split_once(':') {
        Some((kind, values)) if !kind.trim().is_empty() => (kind.trim(), values),
        Some((_, values)) => ("string", values),
        None => ("string", example),
    };

    Some(EnumSpec {
        kind: kind.to_string(),
        values: values
            .split(',')
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect(),
    })
}

/// A single union or array alternative named by `name`.
fn alternative(name: &str) -> SchemaNode {
    if is_base_type(name) || is_string_format(name) {
        SchemaNode::scalar(name)
    } else {
        SchemaNode::reference(component_name(name))
    }
}

fn member_node(member: &TypeDescriptor) -> SchemaNode {
    match member {
        TypeDescriptor::Name(name) => alternative(name),
        other => resolve_schema(other).unwrap_or_else(|| SchemaNode::scalar("string")),
    }
}

/// Union alternatives, flattening nested unions.
fn union_members(members: &[TypeDescriptor]) -> Vec<SchemaNode> {
    members
        .iter()
        .flat_map(|member| match member {
            TypeDescriptor::Union(nested) => union_members(nested),
            other => vec![member_node(other)],
        })
        .collect()
}
