//! Assembles HTTP operations from the tags of a route block.
//!
//! A block is folded tag by tag into an [`OperationSet`]. A `route` tag opens a new
//! operation; every other operation-level tag applies to the most recently opened one
//! and is ignored when no route has been opened yet. Responses are built once from all
//! `returns` tags after the scan.

use crate::headers::resolve_headers;
use crate::openapi_builder::{MediaType, Operation, Parameter, RequestBody, Response, TagGroup};
use crate::schema::{Schema, SchemaNode};
use crate::tag::{CommentBlock, Tag, TypeDescriptor};
use crate::tag_utils::{
    parse_consumes, parse_field, parse_group, parse_produces, parse_route, parse_status_line,
    GroupDescriptor, RouteDescriptor,
};
use crate::type_resolver::{resolve_enum, resolve_schema, resolve_type};
use log::debug;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Media type used for every request and response body
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Methods that get an empty JSON request body even without a body parameter
const BODY_METHODS: [&str; 3] = ["post", "put", "patch"];

/// An operation together with the route that opened it
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedOperation {
    pub route: RouteDescriptor,
    pub operation: Operation,
}

/// Operations and tag groups derived from one block
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OperationSet {
    pub operations: Vec<RoutedOperation>,
    pub tags: Vec<TagGroup>,
}

/// Fold accumulator
struct Accumulator<'a> {
    block: &'a CommentBlock,
    group: GroupDescriptor,
    set: OperationSet,
}

impl<'a> Accumulator<'a> {
    fn new(block: &'a CommentBlock, tags: &[Tag]) -> Self {
        let group = tags
            .iter()
            .find(|t| t.is("group"))
            .map(|t| parse_group(&t.description))
            .unwrap_or_default();

        Self {
            block,
            group,
            set: OperationSet::default(),
        }
    }

    fn apply(mut self, tag: &Tag) -> Self {
        if tag.is("route") {
            self.open_route(tag);
            return self;
        }

        match self.set.operations.last_mut() {
            Some(routed) => apply_operation_tag(&mut routed.operation, tag),
            None if is_operation_tag(&tag.title) => {
                debug!("Ignoring @{} before any @route", tag.title);
            }
            None => {}
        }

        self
    }

    fn open_route(&mut self, tag: &Tag) {
        let route = parse_route(&tag.description);
        debug!("Opening operation {} {}", route.method, route.uri);

        let request_body = if BODY_METHODS.contains(&route.method.as_str()) {
            Some(RequestBody::empty_json())
        } else {
            None
        };

        let operation = Operation {
            tags: vec![self.group.name.clone()],
            summary: non_empty(self.block.summary()),
            description: non_empty(&self.block.description.replace("/**", "")),
            request_body,
            ..Operation::default()
        };

        self.set.operations.push(RoutedOperation { route, operation });
        self.set.tags.push(TagGroup {
            name: self.group.name.clone(),
            description: self.group.description.clone(),
        });
    }

    fn finish(mut self, tags: &[Tag]) -> OperationSet {
        if self.set.operations.is_empty() {
            return self.set;
        }

        let responses = build_responses(tags);
        for routed in &mut self.set.operations {
            routed.operation.responses = responses.clone();
        }
        self.set
    }
}

fn apply_operation_tag(operation: &mut Operation, tag: &Tag) {
    match tag.title.as_str() {
        "param" => apply_param(operation, tag),
        "operationId" => operation.operation_id = Some(tag.description.trim().to_string()),
        "summary" => operation.summary = non_empty(&tag.description),
        "produces" => operation.produces = Some(parse_produces(&tag.description)),
        "consumes" => operation.consumes = Some(parse_consumes(&tag.description)),
        "security" => operation.security = Some(parse_security(&tag.description)),
        "deprecated" => operation.deprecated = true,
        _ => {}
    }
}

fn is_operation_tag(title: &str) -> bool {
    matches!(
        title,
        "param"
            | "operationId"
            | "summary"
            | "produces"
            | "consumes"
            | "security"
            | "deprecated"
    )
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Builds the operations of a route block.
///
/// `tags` are the block's tags with examples already bound; `block` supplies the
/// free-text description and summary.
pub fn build_operations(block: &CommentBlock, tags: &[Tag]) -> OperationSet {
    tags.iter()
        .fold(Accumulator::new(block, tags), |acc, tag| acc.apply(tag))
        .finish(tags)
}

/// Schema of a parameter or body: a resolved node, an enum, or a plain type.
fn parameter_schema(type_descriptor: Option<&TypeDescriptor>, description: &str) -> Schema {
    if let Some(node) = type_descriptor.and_then(resolve_schema) {
        return Schema::from(node);
    }

    let kind = resolve_type(type_descriptor).unwrap_or_else(|| "string".to_string());
    if kind != "enum" {
        return Schema::from(SchemaNode::scalar(&kind));
    }

    match resolve_enum(description) {
        Some(spec) => Schema {
            enum_values: Some(spec.values),
            ..Schema::from(SchemaNode::scalar(&spec.kind))
        },
        None => Schema::from(SchemaNode::scalar("string")),
    }
}

fn apply_param(operation: &mut Operation, tag: &Tag) {
    let field = parse_field(tag.name_or_empty());
    let schema = parameter_schema(tag.type_descriptor.as_ref(), &tag.description);
    let description = non_empty(&tag.description);

    if field.is_body() {
        let mut content = BTreeMap::new();
        content.insert(
            JSON_MEDIA_TYPE.to_string(),
            MediaType {
                schema: Some(schema),
                examples: tag.examples.clone(),
            },
        );
        operation.request_body = Some(RequestBody {
            description,
            required: field.required,
            content,
        });
    } else {
        operation.parameters.push(Parameter {
            name: field.name,
            location: field.parameter_type,
            description,
            required: field.required,
            schema,
            examples: tag.examples.clone(),
        });
    }
}

/// Parses a `security` tag: JSON when valid, otherwise a single named scheme.
pub fn parse_security(text: &str) -> Value {
    let text = text.trim();
    match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(_) => {
            let mut scheme = Map::new();
            scheme.insert(text.to_string(), Value::Array(Vec::new()));
            Value::Array(vec![Value::Object(scheme)])
        }
    }
}

/// Builds the response map from every `returns` / `return` tag of a block.
pub fn build_responses(tags: &[Tag]) -> BTreeMap<String, Response> {
    let headers = resolve_headers(tags);
    let mut responses = BTreeMap::new();

    for tag in tags.iter().filter(|t| t.is("returns") || t.is("return")) {
        let (key, description) = parse_status_line(&tag.description);

        let mut content = BTreeMap::new();
        if let Some(kind) = resolve_type(tag.type_descriptor.as_ref()) {
            let node = tag
                .type_descriptor
                .as_ref()
                .and_then(resolve_schema)
                .unwrap_or_else(|| SchemaNode::scalar(&kind));
            content.insert(
                JSON_MEDIA_TYPE.to_string(),
                MediaType {
                    schema: Some(Schema::from(node)),
                    examples: tag.examples.clone(),
                },
            );
        }

        let response = Response {
            description,
            headers: headers.get(&key).cloned(),
            content,
        };
        responses.insert(key, response);
    }

    responses
}
