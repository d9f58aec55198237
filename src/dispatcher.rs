//! Routes one comment block to the type-definition or operation builder.

use crate::error::Result;
use crate::example_binder::bind_examples;
use crate::openapi_builder::{PathItem, TagGroup};
use crate::operation_builder::build_operations;
use crate::schema::TypeDefinition;
use crate::tag::CommentBlock;
use crate::typedef_builder::build_type_definition;
use log::debug;
use std::collections::BTreeMap;

/// Everything one block contributes to the document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    /// uri -> method -> operation
    pub paths: BTreeMap<String, PathItem>,
    /// Tag groups in the order their routes were opened
    pub tags: Vec<TagGroup>,
    /// Component schemas by name
    pub definitions: BTreeMap<String, TypeDefinition>,
}

impl Fragment {
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|item| item.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.definitions.is_empty()
    }
}

/// Turns a block into a [`Fragment`].
///
/// A block whose first tag is `typedef` yields exactly one definition; any other block
/// is scanned for operations after its examples are bound.
///
/// # Errors
///
/// Propagates the block-local errors of the builders (bad example JSON, unnamed
/// typedef). Nothing is produced for a failed block.
pub fn dispatch(block: &CommentBlock) -> Result<Fragment> {
    let mut fragment = Fragment::default();

    if block.is_typedef() {
        let (name, definition) = build_type_definition(&block.tags)?;
        fragment.definitions.insert(name, definition);
        return Ok(fragment);
    }

    let tags = bind_examples(&block.tags)?;
    let set = build_operations(block, &tags);

    for routed in set.operations {
        fragment
            .paths
            .entry(routed.route.uri)
            .or_default()
            .insert(routed.route.method, routed.operation);
    }
    fragment.tags = set.tags;

    debug!(
        "Dispatched block: {} operations, {} definitions",
        fragment.operation_count(),
        fragment.definitions.len()
    );

    Ok(fragment)
}
