use crate::dispatcher::{dispatch, Fragment};
use crate::headers::Header;
use crate::schema::{is_false, Schema, TypeDefinition};
use crate::tag::{BoundExample, CommentBlock};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// OpenAPI document builder
///
/// Folds the fragments of every comment block into one document. Each block is
/// dispatched inside a failure boundary: a block that fails contributes nothing and is
/// recorded as [`BlockOutcome::Skipped`], while everything merged before it stays intact.
pub struct OpenApiBuilder {
    /// OpenAPI version string
    openapi: String,
    /// OpenAPI info section
    info: Info,
    /// Servers copied from the base definition
    servers: Vec<Server>,
    /// Document-level security requirement
    security: Option<Value>,
    /// Paths collection (uri -> method -> operation)
    paths: BTreeMap<String, PathItem>,
    /// Components section (schemas, security schemes)
    components: Components,
    /// Tag groups, unique by name
    tags: Vec<TagGroup>,
    /// One entry per dispatched block
    outcomes: Vec<BlockOutcome>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A document-level tag group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// All operations of a single path, keyed by lowercase method
pub type PathItem = BTreeMap<String, Operation>;

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Operation {
    /// Grouping tags
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Operation summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation ID
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Parameters (path, query, header), in declaration order
    pub parameters: Vec<Parameter>,
    /// Request body
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Responses by status code or `default`
    pub responses: BTreeMap<String, Response>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Value>,
    #[serde(skip_serializing_if = "is_false")]
    pub deprecated: bool,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header)
    #[serde(rename = "in")]
    pub location: String,
    /// Parameter description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter is required
    pub required: bool,
    /// Parameter schema
    pub schema: Schema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<BTreeMap<String, BoundExample>>,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    /// Request body description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the request body is required
    pub required: bool,
    /// Content types and their schemas
    pub content: BTreeMap<String, MediaType>,
}

impl RequestBody {
    /// A body advertising an empty `application/json` shape
    pub fn empty_json() -> Self {
        let mut content = BTreeMap::new();
        content.insert(
            crate::operation_builder::JSON_MEDIA_TYPE.to_string(),
            MediaType::default(),
        );
        Self {
            description: None,
            required: false,
            content,
        }
    }
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MediaType {
    /// Schema for this media type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<BTreeMap<String, BoundExample>>,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Response description
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, Header>>,
    /// Response content
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
}

/// OpenAPI Components object
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Components {
    /// Schema definitions
    pub schemas: BTreeMap<String, TypeDefinition>,
    #[serde(rename = "securitySchemes", skip_serializing_if = "BTreeMap::is_empty")]
    pub security_schemes: BTreeMap<String, Value>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// API paths
    pub paths: BTreeMap<String, PathItem>,
    /// Components (schemas, etc.)
    pub components: Components,
    pub tags: Vec<TagGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Value>,
}

/// Components section accepted in a base definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BaseComponents {
    #[serde(rename = "securitySchemes", default)]
    pub security_schemes: BTreeMap<String, Value>,
}

/// The document skeleton supplied by the user before any file is read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseDefinition {
    #[serde(default = "default_openapi_version")]
    pub openapi: String,
    pub info: Info,
    #[serde(default)]
    pub servers: Vec<Server>,
    /// Tag groups declared up front; they precede annotation groups
    #[serde(default)]
    pub tags: Vec<TagGroup>,
    #[serde(default)]
    pub security: Option<Value>,
    #[serde(default)]
    pub components: BaseComponents,
}

fn default_openapi_version() -> String {
    "3.0.0".to_string()
}

impl BaseDefinition {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            openapi: default_openapi_version(),
            info: Info {
                title: title.into(),
                version: version.into(),
                description: None,
            },
            servers: Vec::new(),
            tags: Vec::new(),
            security: None,
            components: BaseComponents::default(),
        }
    }
}

/// A block that failed dispatch and was left out of the document
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedBlock {
    pub file: PathBuf,
    /// One-line rendering of the block's tags
    pub block: String,
    pub error: String,
}

/// What happened to one dispatched block
#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    Merged {
        file: PathBuf,
        operations: usize,
        definitions: usize,
    },
    Skipped(SkippedBlock),
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        Self::from_definition(&BaseDefinition::new("Generated API", "1.0.0"))
    }

    /// Create a builder seeded with a base definition
    pub fn from_definition(definition: &BaseDefinition) -> Self {
        debug!("Initializing OpenApiBuilder for '{}'", definition.info.title);
        let mut builder = Self {
            openapi: definition.openapi.clone(),
            info: definition.info.clone(),
            servers: definition.servers.clone(),
            security: definition.security.clone(),
            paths: BTreeMap::new(),
            components: Components {
                schemas: BTreeMap::new(),
                security_schemes: definition.components.security_schemes.clone(),
            },
            tags: Vec::new(),
            outcomes: Vec::new(),
        };
        builder.add_tags(definition.tags.iter().cloned());
        builder
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    /// Dispatches every block of one file.
    pub fn add_file(&mut self, file: &Path, blocks: &[CommentBlock]) {
        debug!("Adding {} blocks from {}", blocks.len(), file.display());
        for block in blocks {
            self.add_block(file, block);
        }
    }

    /// Dispatches one block and merges its fragment on success.
    ///
    /// Returns the recorded outcome. A failing block is logged with its file and
    /// content and leaves the document untouched.
    pub fn add_block(&mut self, file: &Path, block: &CommentBlock) -> &BlockOutcome {
        let outcome = match dispatch(block) {
            Ok(fragment) => {
                let outcome = BlockOutcome::Merged {
                    file: file.to_path_buf(),
                    operations: fragment.operation_count(),
                    definitions: fragment.definitions.len(),
                };
                self.merge_fragment(fragment);
                outcome
            }
            Err(e) => {
                let skipped = SkippedBlock {
                    file: file.to_path_buf(),
                    block: block.outline(),
                    error: e.to_string(),
                };
                warn!(
                    "Incorrect comment format, block was not documented.\nFile: {}\nComment: {}\nError: {}",
                    skipped.file.display(),
                    skipped.block,
                    skipped.error
                );
                BlockOutcome::Skipped(skipped)
            }
        };

        self.outcomes.push(outcome);
        &self.outcomes[self.outcomes.len() - 1]
    }

    /// Merges a fragment. Same-named schemas and same (uri, method) operations are
    /// replaced, tag groups are appended when their name is new.
    pub fn merge_fragment(&mut self, fragment: Fragment) {
        for (name, definition) in fragment.definitions {
            if self.components.schemas.insert(name.clone(), definition).is_some() {
                debug!("Replacing component schema {}", name);
            }
        }

        for (uri, methods) in fragment.paths {
            let path_item = self.paths.entry(uri.clone()).or_default();
            for (method, operation) in methods {
                if path_item.insert(method.clone(), operation).is_some() {
                    debug!("Replacing operation {} {}", method, uri);
                }
            }
        }

        self.add_tags(fragment.tags);
    }

    fn add_tags(&mut self, tags: impl IntoIterator<Item = TagGroup>) {
        for tag in tags {
            if !self.tags.iter().any(|t| t.name == tag.name) {
                self.tags.push(tag);
            }
        }
    }

    /// Every block outcome so far, in dispatch order
    pub fn outcomes(&self) -> &[BlockOutcome] {
        &self.outcomes
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SkippedBlock> {
        self.outcomes.iter().filter_map(|o| match o {
            BlockOutcome::Skipped(skipped) => Some(skipped),
            BlockOutcome::Merged { .. } => None,
        })
    }

    /// Build the final OpenAPI document
    pub fn build(self) -> OpenApiDocument {
        debug!(
            "Building final OpenAPI document: {} paths, {} schemas",
            self.paths.len(),
            self.components.schemas.len()
        );

        OpenApiDocument {
            openapi: self.openapi,
            info: self.info,
            servers: self.servers,
            paths: self.paths,
            components: self.components,
            tags: self.tags,
            security: self.security,
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}
