//! Small parsers for the text grammars embedded in annotation fields.
//!
//! Every parser here is total: missing pieces fall back to documented defaults instead
//! of failing, so callers never have to handle an error from this module.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches the `- eg:` example marker, tolerating any whitespace around it.
static EXAMPLE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-\s*eg:\s*").expect("example marker pattern is valid"));

/// Matches the ` - ` separator between a name and its description.
static DASH_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+-\s+").expect("dash separator pattern is valid"));

/// Group used when a route block has no `group` tag
pub const DEFAULT_GROUP: &str = "default";

/// Method and path declared by a `route` tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteDescriptor {
    /// Lowercase HTTP verb
    pub method: String,
    pub uri: String,
}

/// Decoded `name.location.required` field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    /// `path`, `query`, `body`, `header`, ...
    pub parameter_type: String,
    pub required: bool,
}

impl FieldDescriptor {
    pub fn is_body(&self) -> bool {
        self.parameter_type == "body"
    }
}

/// Result of looking for a `- eg:` marker in a description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExampleMarker<'a> {
    /// No marker; the whole text is description
    Absent(&'a str),
    /// Text before the marker and the raw example after it
    Present { text: &'a str, example: &'a str },
}

impl<'a> ExampleMarker<'a> {
    /// Description part, trimmed
    pub fn text(&self) -> &'a str {
        match self {
            ExampleMarker::Absent(text) => text.trim(),
            ExampleMarker::Present { text, .. } => text.trim(),
        }
    }

    /// Raw example text, `None` when absent or empty
    pub fn example(&self) -> Option<&'a str> {
        match self {
            ExampleMarker::Absent(_) => None,
            ExampleMarker::Present { example, .. } => {
                let example = example.trim();
                if example.is_empty() {
                    None
                } else {
                    Some(example)
                }
            }
        }
    }
}

/// Name and description of a `group` tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDescriptor {
    pub name: String,
    pub description: String,
}

impl Default for GroupDescriptor {
    fn default() -> Self {
        Self {
            name: DEFAULT_GROUP.to_string(),
            description: String::new(),
        }
    }
}

/// Parses `"<METHOD> <path>"`.
///
/// The method defaults to `get` and the path to an empty string.
pub fn parse_route(text: &str) -> RouteDescriptor {
    let mut parts = text.split_whitespace();
    let method = parts
        .next()
        .map(|m| m.to_lowercase())
        .unwrap_or_else(|| "get".to_string());
    let uri = parts.next().unwrap_or("").to_string();

    RouteDescriptor { method, uri }
}

/// Parses a dotted field path such as `id.path.required`.
///
/// The location defaults to `query`; `required` is true only when the third segment is
/// literally `required`.
pub fn parse_field(text: &str) -> FieldDescriptor {
    let mut segments = text.split('.');
    let name = segments.next().unwrap_or("").to_string();
    let parameter_type = segments
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("query")
        .to_string();
    let required = segments.next() == Some("required");

    FieldDescriptor {
        name,
        parameter_type,
        required,
    }
}

pub fn parse_produces(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

pub fn parse_consumes(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Splits a description on the first `- eg:` marker.
pub fn split_example_marker(text: &str) -> ExampleMarker<'_> {
    match EXAMPLE_MARKER.find(text) {
        Some(m) => ExampleMarker::Present {
            text: &text[..m.start()],
            example: &text[m.end()..],
        },
        None => ExampleMarker::Absent(text),
    }
}

/// Parses `"<name> - <description>"` from a `group` tag.
pub fn parse_group(text: &str) -> GroupDescriptor {
    let (name, description) = match DASH_SEPARATOR.find(text) {
        Some(m) => (&text[..m.start()], &text[m.end()..]),
        None => match text.split_once('-') {
            Some((name, description)) => (name, description),
            None => (text, ""),
        },
    };

    let name = name.trim();
    if name.is_empty() {
        return GroupDescriptor::default();
    }

    GroupDescriptor {
        name: name.to_string(),
        description: description.trim().to_string(),
    }
}

/// Splits a `returns` description into its status key and the text after the first `-`.
pub fn parse_status_line(text: &str) -> (String, String) {
    match text.split_once('-') {
        Some((key, description)) => (key.trim().to_string(), description.trim().to_string()),
        None => (text.trim().to_string(), String::new()),
    }
}

/// Splits on the first ` - ` separator, trimming both halves.
pub fn split_dash(text: &str) -> Option<(&str, &str)> {
    DASH_SEPARATOR
        .find(text)
        .map(|m| (text[..m.start()].trim(), text[m.end()..].trim()))
}
