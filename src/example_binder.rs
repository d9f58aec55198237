//! Binds `input` / `output` example payloads onto the tags they describe.
//!
//! An `@input_example` line names a parameter field, an `@output_example` line names a
//! response status:
//!
//! ```text
//! @input_example input - Dog - eg: {"woof": "1"}
//! @output_example 200 - Cat - eg: {"meow": "2"}
//! ```
//!
//! Examples whose key matches no `param` / `returns` tag are dropped.

use crate::error::{Error, Result};
use crate::tag::{BoundExample, Tag};
use crate::tag_utils::{parse_field, parse_status_line, split_example_marker};
use log::debug;
use serde_json::Value;

/// A decoded example line
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExample {
    /// Parameter field name or response status the example belongs to
    pub key: String,
    /// Display name of the example
    pub label: String,
    /// JSON payload; `None` for label-only examples
    pub value: Option<Value>,
}

/// Which kind of tag an example line targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Param,
    Returns,
}

impl Target {
    fn of(tag: &Tag) -> Option<Self> {
        match tag.title.as_str() {
            "input" => Some(Target::Param),
            "output" => Some(Target::Returns),
            _ => None,
        }
    }

    fn matches(self, tag: &Tag, key: &str) -> bool {
        match self {
            Target::Param => tag.is("param") && parse_field(tag.name_or_empty()).name == key,
            Target::Returns => {
                (tag.is("returns") || tag.is("return"))
                    && parse_status_line(&tag.description).0 == key
            }
        }
    }
}

/// Parses `<key> - <Label> - eg: <json>`.
///
/// # Errors
///
/// Returns [`Error::InvalidExample`] when the payload after the marker is not valid JSON.
pub fn parse_example_tag(tag: &Tag) -> Result<ParsedExample> {
    let description = tag.description.trim();
    let (key, rest) = match description.split_once(char::is_whitespace) {
        Some((key, rest)) => (key, rest),
        None => (description, ""),
    };

    let marker = split_example_marker(rest);
    let label = marker.text().trim_start_matches('-').trim();
    let label = if label.is_empty() { key } else { label };

    let value = match marker.example() {
        Some(raw) => Some(serde_json::from_str(raw).map_err(|e| Error::InvalidExample {
            source_text: raw.to_string(),
            message: e.to_string(),
        })?),
        None => None,
    };

    Ok(ParsedExample {
        key: key.to_string(),
        label: label.to_string(),
        value,
    })
}

/// Returns a copy of `tags` with every `input` / `output` example attached to the
/// `param` / `returns` tag whose key it names.
///
/// # Errors
///
/// Fails when an example payload is not valid JSON; the whole block is then skipped
/// by the aggregator.
pub fn bind_examples(tags: &[Tag]) -> Result<Vec<Tag>> {
    let mut bound = tags.to_vec();

    for example_tag in tags {
        let target = match Target::of(example_tag) {
            Some(target) => target,
            None => continue,
        };

        let example = parse_example_tag(example_tag)?;
        let mut matched = false;

        for tag in bound.iter_mut().filter(|t| target.matches(t, &example.key)) {
            tag.examples.get_or_insert_with(Default::default).insert(
                example.label.clone(),
                BoundExample {
                    value: example.value.clone(),
                },
            );
            matched = true;
        }

        if !matched {
            debug!(
                "Dropping {} example '{}': no tag matches key '{}'",
                example_tag.title, example.label, example.key
            );
        }
    }

    Ok(bound)
}
