//! Decoded annotation tags and the comment blocks that group them.
//!
//! A [`Tag`] is one `@title {type} name description` unit produced by an
//! [`AnnotationTokenizer`](crate::tokenizer::AnnotationTokenizer). Tags are never mutated
//! after tokenization except for the `examples` map, which the
//! [`example_binder`](crate::example_binder) fills in before a block is dispatched.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A type expression taken from the `{...}` part of an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// A plain or dotted name: `string`, `Pet`, `Pet.model`
    Name(String),
    /// A generic application: `Array.<Point>`, `number[]`, `Map.<string, Pet>`
    Application {
        /// The container name as written (`Array`, `Map`, ...)
        container: String,
        /// Type arguments in declaration order
        elements: Vec<TypeDescriptor>,
    },
    /// Pipe-separated alternatives: `Cat|Dog`
    Union(Vec<TypeDescriptor>),
    /// `*` or anything the tokenizer could not classify
    Any,
}

impl TypeDescriptor {
    pub fn name(name: impl Into<String>) -> Self {
        TypeDescriptor::Name(name.into())
    }

    /// `Array.<element>`
    pub fn array_of(element: impl Into<String>) -> Self {
        TypeDescriptor::Application {
            container: "Array".to_string(),
            elements: vec![TypeDescriptor::Name(element.into())],
        }
    }

    pub fn union_of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeDescriptor::Union(names.into_iter().map(|n| TypeDescriptor::Name(n.into())).collect())
    }
}

/// A named example payload attached to a `param` or `returns` tag.
///
/// Label-only examples are legal and carry no value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundExample {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// One decoded annotation unit
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    /// Annotation kind, e.g. `route`, `param`, `returns`, `property`, `typedef`
    pub title: String,
    /// Raw field path, e.g. `id.body.required`
    pub name: Option<String>,
    /// Free text; may embed a `- eg:` example marker
    pub description: String,
    /// The `{...}` type expression, if any
    pub type_descriptor: Option<TypeDescriptor>,
    /// Label -> example, populated by the example binder
    pub examples: Option<BTreeMap<String, BoundExample>>,
}

impl Tag {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            name: None,
            description: String::new(),
            type_descriptor: None,
            examples: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_type(mut self, type_descriptor: TypeDescriptor) -> Self {
        self.type_descriptor = Some(type_descriptor);
        self
    }

    pub fn is(&self, title: &str) -> bool {
        self.title == title
    }

    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// An ordered sequence of tags taken from one source comment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentBlock {
    /// Free text preceding the first tag
    pub description: String,
    /// Tags in source order
    pub tags: Vec<Tag>,
}

impl CommentBlock {
    pub fn new(description: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self {
            description: description.into(),
            tags,
        }
    }

    /// A block whose first tag is `typedef` describes a component schema
    pub fn is_typedef(&self) -> bool {
        self.tags.first().map(|t| t.is("typedef")).unwrap_or(false)
    }

    /// Description of the first `summary` tag, or an empty string
    pub fn summary(&self) -> &str {
        self.tags
            .iter()
            .find(|t| t.is("summary"))
            .map(|t| t.description.as_str())
            .unwrap_or("")
    }

    /// Tag titles joined for log output
    pub fn outline(&self) -> String {
        self.tags
            .iter()
            .map(|t| match &t.name {
                Some(name) => format!("@{} {} {}", t.title, name, t.description),
                None => format!("@{} {}", t.title, t.description),
            })
            .map(|line| line.trim_end().to_string())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
