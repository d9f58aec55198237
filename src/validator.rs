//! Document validation hook.
//!
//! A [`DocumentValidator`] receives the assembled document and either accepts it, returns
//! a replacement, or fails. The generator keeps the original document when validation
//! fails.

use crate::error::Result;
use crate::openapi_builder::{MediaType, OpenApiDocument, Operation};
use crate::schema::{SchemaNode, COMPONENTS_PREFIX};
use log::warn;
use std::collections::BTreeSet;

pub trait DocumentValidator {
    /// Returns the document to publish.
    fn validate(&self, document: OpenApiDocument) -> Result<OpenApiDocument>;
}

/// Accepts every document unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl DocumentValidator for Passthrough {
    fn validate(&self, document: OpenApiDocument) -> Result<OpenApiDocument> {
        Ok(document)
    }
}

/// Reports `$ref`s to component schemas that were never defined.
///
/// Dangling references are logged; the document is returned as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceCheck;

impl ReferenceCheck {
    /// Names referenced through `#/components/schemas/` without a matching schema
    pub fn dangling_references(document: &OpenApiDocument) -> Vec<String> {
        let mut referenced = BTreeSet::new();

        for operation in document.paths.values().flat_map(|item| item.values()) {
            collect_operation(operation, &mut referenced);
        }
        for definition in document.components.schemas.values() {
            let parents = definition.all_of.iter().flatten();
            let properties = definition.properties.values().map(|schema| &schema.node);
            collect_nodes(parents.chain(properties), &mut referenced);
        }

        referenced
            .into_iter()
            .filter(|name| !document.components.schemas.contains_key(*name))
            .map(str::to_string)
            .collect()
    }
}

impl DocumentValidator for ReferenceCheck {
    fn validate(&self, document: OpenApiDocument) -> Result<OpenApiDocument> {
        for name in Self::dangling_references(&document) {
            warn!("Reference to undefined component schema: {}{}", COMPONENTS_PREFIX, name);
        }
        Ok(document)
    }
}

fn collect_operation<'a>(operation: &'a Operation, names: &mut BTreeSet<&'a str>) {
    let parameters = operation.parameters.iter().map(|p| &p.schema.node);
    collect_nodes(parameters, names);

    let bodies = operation.request_body.iter().flat_map(|body| body.content.values());
    let responses = operation.responses.values().flat_map(|r| r.content.values());
    collect_nodes(bodies.chain(responses).filter_map(media_node), names);
}

fn media_node(media: &MediaType) -> Option<&SchemaNode> {
    media.schema.as_ref().map(|schema| &schema.node)
}

fn collect_nodes<'a>(nodes: impl Iterator<Item = &'a SchemaNode>, names: &mut BTreeSet<&'a str>) {
    for node in nodes {
        names.extend(node.references());
    }
}
