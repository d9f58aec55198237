//! OpenAPI from annotations - Generate OpenAPI documents from annotated source comments.
//!
//! Route, parameter, response and type declarations written as JSDoc-style tags are
//! translated into one OpenAPI 3 document. Translation is best effort: a comment block
//! that cannot be understood is logged and skipped, and everything else is still
//! documented.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Resolves glob patterns to annotated source files
//! 2. [`tokenizer`] - Splits source text into comment blocks of [`tag::Tag`]s
//! 3. [`tag_utils`] - Small parsers for route lines, field paths and example markers
//! 4. [`type_resolver`] - Turns type expressions into type names or [`schema::SchemaNode`]s
//! 5. [`example_binder`] - Attaches `@input` / `@output` examples to their targets
//! 6. [`typedef_builder`] - Builds component schemas from `@typedef` blocks
//! 7. [`operation_builder`] and [`headers`] - Build operations from `@route` blocks
//! 8. [`dispatcher`] - Routes one block to the right builder
//! 9. [`openapi_builder`] - Merges every block into the document
//! 10. [`validator`] - Post-build document checks
//! 11. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_annotations::{
//!     generator::{generate, GeneratorOptions},
//!     openapi_builder::BaseDefinition,
//!     serializer::serialize_yaml,
//!     tokenizer::JsDocTokenizer,
//!     validator::ReferenceCheck,
//! };
//!
//! let options = GeneratorOptions::new("./my-api")
//!     .with_files(["routes/**/*.js"])
//!     .with_definition(BaseDefinition::new("My API", "1.0.0"));
//!
//! let (document, report) = generate(&options, &JsDocTokenizer, &ReferenceCheck).unwrap();
//! println!("{} blocks skipped", report.blocks_skipped);
//! println!("{}", serialize_yaml(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod dispatcher;
pub mod error;
pub mod example_binder;
pub mod generator;
pub mod headers;
pub mod openapi_builder;
pub mod operation_builder;
pub mod scanner;
pub mod schema;
pub mod serializer;
pub mod tag;
pub mod tag_utils;
pub mod tokenizer;
pub mod type_resolver;
pub mod typedef_builder;
pub mod validator;
