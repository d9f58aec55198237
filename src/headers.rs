//! Response headers declared with `@headers {type} <status>.<Header-Name> - <description>`.

use crate::tag::Tag;
use crate::tag_utils::split_dash;
use crate::type_resolver::resolve_type;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

static STATUS_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("status code pattern is valid"));

/// A response header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    #[serde(rename = "type")]
    pub header_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Status code -> header name -> header
pub type HeaderMap = BTreeMap<String, BTreeMap<String, Header>>;

/// Collects every `headers` / `header` tag of a block, grouped by status code.
///
/// Entries without a recognizable `<status>.<name>` prefix are skipped; the remaining
/// headers are still collected.
pub fn resolve_headers(tags: &[Tag]) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for tag in tags.iter().filter(|t| t.is("headers") || t.is("header")) {
        match parse_header(tag) {
            Some((status, name, header)) => {
                headers.entry(status).or_default().insert(name, header);
            }
            None => debug!("Skipping malformed header declaration: '{}'", tag.description),
        }
    }

    headers
}

fn parse_header(tag: &Tag) -> Option<(String, String, Header)> {
    let (target, description) = match split_dash(&tag.description) {
        Some((target, description)) => (target, Some(description)),
        None => (tag.description.trim(), None),
    };

    let (status, name) = target.split_once('.')?;
    let status = STATUS_CODE.find(status)?.as_str().to_string();
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let header = Header {
        header_type: resolve_type(tag.type_descriptor.as_ref()).unwrap_or_else(|| "string".to_string()),
        description: description.filter(|d| !d.is_empty()).map(str::to_string),
    };

    Some((status, name.to_string(), header))
}
