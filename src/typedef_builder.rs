//! Builds component schemas from `typedef` blocks.
//!
//! ```text
//! @typedef {Pet} Dog
//! @property {string} woof.required - Bark sound - eg: woof
//! @property {Array.<Toy>} toys - Favourite toys
//! ```
//!
//! The first tag names the definition and optionally its parent, every following
//! `property` tag adds one property.

use crate::error::{Error, Result};
use crate::schema::{
    is_base_type, is_string_format, Discriminator, Schema, SchemaNode, TypeDefinition,
};
use crate::tag::{Tag, TypeDescriptor};
use crate::tag_utils::split_example_marker;
use crate::type_resolver::{model_name, resolve_enum, resolve_schema, resolve_type};
use log::debug;
use serde_json::{Number, Value};

/// Example used for `objectId` properties that declare none
pub const OBJECT_ID_PLACEHOLDER: &str = "507f191e810c19729de860ea";

/// Canonical property name plus the flags encoded as dotted suffixes
#[derive(Debug, Clone, PartialEq, Eq)]
struct PropertyName<'a> {
    name: &'a str,
    required: bool,
    read_only: bool,
}

impl<'a> PropertyName<'a> {
    fn parse(raw: &'a str) -> Self {
        let mut segments = raw.split('.');
        let name = segments.next().unwrap_or("");
        let mut required = false;
        let mut read_only = false;

        for flag in segments {
            match flag {
                "required" => required = true,
                "readOnly" => read_only = true,
                _ => {}
            }
        }

        Self {
            name,
            required,
            read_only,
        }
    }
}

/// Builds a named [`TypeDefinition`] from the tags of a `typedef` block.
///
/// # Errors
///
/// Returns [`Error::MalformedBlock`] when the `typedef` tag has no name, and
/// [`Error::InvalidExample`] when a reference, union or array property carries an
/// example that is not valid JSON.
pub fn build_type_definition(tags: &[Tag]) -> Result<(String, TypeDefinition)> {
    let head = tags
        .first()
        .ok_or_else(|| Error::malformed("empty typedef block"))?;

    let type_name = head
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::malformed("typedef without a name"))?;

    debug!("Building type definition: {}", type_name);

    let mut definition = TypeDefinition::new();

    // Only a plain model name can be a parent
    if let Some(TypeDescriptor::Name(parent)) = &head.type_descriptor {
        let parent = model_name(parent).unwrap_or(parent);
        if is_base_type(parent) || is_string_format(parent) {
            debug!("{} declared as {}, no parent", type_name, parent);
        } else {
            debug!("{} extends {}", type_name, parent);
            definition.all_of = Some(vec![SchemaNode::reference(parent)]);
        }
    }

    for tag in tags.iter().skip(1) {
        if !(tag.is("property") || tag.is("prop")) {
            continue;
        }

        let property = PropertyName::parse(tag.name_or_empty());
        if property.name.is_empty() {
            debug!("Skipping unnamed property in {}", type_name);
            continue;
        }

        if property.required && !definition.required.iter().any(|r| r == property.name) {
            definition.required.push(property.name.to_string());
        }

        let schema = match tag.type_descriptor.as_ref().and_then(resolve_schema) {
            Some(node) => {
                if node.is_union() {
                    definition.discriminator = Some(Discriminator::default());
                }
                structured_property(node, tag)?
            }
            None => scalar_property(tag),
        };

        let schema = Schema {
            read_only: property.read_only,
            ..schema
        };
        definition.properties.insert(property.name.to_string(), schema);
    }

    Ok((type_name.to_string(), definition))
}

/// Reference, union or array property. The example is parsed as JSON.
fn structured_property(node: SchemaNode, tag: &Tag) -> Result<Schema> {
    let marker = split_example_marker(&tag.description);
    let example = match marker.example() {
        Some(raw) => Some(serde_json::from_str(raw).map_err(|e| Error::InvalidExample {
            source_text: raw.to_string(),
            message: e.to_string(),
        })?),
        None => None,
    };

    Ok(Schema {
        example,
        ..Schema::from(node).with_description(marker.text())
    })
}

/// Scalar property. The example is coerced according to the declared type.
fn scalar_property(tag: &Tag) -> Schema {
    let marker = split_example_marker(&tag.description);
    let kind = resolve_type(tag.type_descriptor.as_ref()).unwrap_or_else(|| "string".to_string());

    if kind == "enum" {
        return match resolve_enum(&tag.description) {
            Some(spec) => Schema {
                enum_values: Some(spec.values),
                ..Schema::from(SchemaNode::scalar(&spec.kind)).with_description(marker.text())
            },
            None => Schema::from(SchemaNode::scalar("string")).with_description(marker.text()),
        };
    }

    let node = SchemaNode::scalar(&kind);

    let example = match marker.example() {
        Some(raw) => coerce_example(&kind, raw),
        None if kind == "objectId" => Some(Value::String(OBJECT_ID_PLACEHOLDER.to_string())),
        None => None,
    };

    Schema {
        example,
        ..Schema::from(node).with_description(marker.text())
    }
}

fn coerce_example(kind: &str, raw: &str) -> Option<Value> {
    match kind {
        "boolean" => Some(Value::Bool(raw == "true")),
        "integer" => match raw.parse::<i64>() {
            Ok(n) => Some(Value::Number(n.into())),
            Err(_) => {
                debug!("Ignoring non-integer example '{}'", raw);
                None
            }
        },
        "number" => match raw.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Some(Value::Number(n)),
            None => {
                debug!("Ignoring non-numeric example '{}'", raw);
                None
            }
        },
        _ => Some(Value::String(raw.to_string())),
    }
}
