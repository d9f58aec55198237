//! Annotation tokenizer.
//!
//! Turns raw source text into [`CommentBlock`]s. The engine only depends on the
//! [`AnnotationTokenizer`] trait; [`JsDocTokenizer`] reads JSDoc-style `/** ... */`
//! comments from any language that uses C-style block comments.

use crate::tag::{CommentBlock, Tag, TypeDescriptor};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static DOC_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*\*(.*?)\*/").expect("doc comment pattern is valid"));

/// Titles whose first word after the type is a field name
const NAMED_TITLES: [&str; 4] = ["param", "property", "prop", "typedef"];

/// Splits source text into comment blocks.
pub trait AnnotationTokenizer {
    /// Returns every annotated block of `source`, in source order.
    fn tokenize(&self, source: &str) -> Vec<CommentBlock>;
}

/// Tokenizer for `/** ... */` comments with `@title {type} name description` lines
#[derive(Debug, Clone, Copy, Default)]
pub struct JsDocTokenizer;

impl AnnotationTokenizer for JsDocTokenizer {
    fn tokenize(&self, source: &str) -> Vec<CommentBlock> {
        DOC_COMMENT
            .captures_iter(source)
            .filter_map(|caps| caps.get(1))
            .filter_map(|body| parse_block(body.as_str()))
            .collect()
    }
}

/// Parses the inside of one doc comment. Blocks without any tag yield `None`.
fn parse_block(body: &str) -> Option<CommentBlock> {
    let mut description: Vec<&str> = Vec::new();
    let mut tags: Vec<Tag> = Vec::new();

    for line in body.lines().map(unwrap_line) {
        if line.starts_with('@') {
            tags.push(parse_tag_line(&line[1..]));
        } else if line.is_empty() {
            continue;
        } else if let Some(tag) = tags.last_mut() {
            if tag.description.is_empty() {
                tag.description = line.to_string();
            } else {
                tag.description.push('\n');
                tag.description.push_str(line);
            }
        } else {
            description.push(line);
        }
    }

    if tags.is_empty() {
        debug!("Dropping comment block without tags");
        return None;
    }

    Some(CommentBlock::new(description.join("\n"), tags))
}

/// Removes the leading `*` decoration of a comment line.
fn unwrap_line(line: &str) -> &str {
    let line = line.trim();
    line.strip_prefix('*').unwrap_or(line).trim()
}

fn normalize_title(title: &str) -> &str {
    match title {
        "input_example" => "input",
        "output_example" => "output",
        other => other,
    }
}

/// Parses `title {type} name description` (the text after `@`).
fn parse_tag_line(line: &str) -> Tag {
    let (title, rest) = match line.split_once(char::is_whitespace) {
        Some((title, rest)) => (title, rest.trim_start()),
        None => (line, ""),
    };
    let title = normalize_title(title);
    let mut tag = Tag::new(title);

    let rest = match split_type_expression(rest) {
        Some((expression, rest)) => {
            tag.type_descriptor = parse_type_expression(expression);
            rest.trim_start()
        }
        None => rest,
    };

    if NAMED_TITLES.contains(&title) {
        let (name, description) = match rest.split_once(char::is_whitespace) {
            Some((name, description)) => (name, description.trim()),
            None => (rest, ""),
        };
        if !name.is_empty() {
            tag.name = Some(name.to_string());
        }
        tag.description = description
            .strip_prefix('-')
            .map(str::trim_start)
            .unwrap_or(description)
            .to_string();
    } else {
        tag.description = rest.trim().to_string();
    }

    tag
}

/// Splits a leading balanced `{...}` from `text`.
fn split_type_expression(text: &str) -> Option<(&str, &str)> {
    if !text.starts_with('{') {
        return None;
    }

    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&text[1..i], &text[i + 1..]));
                }
            }
            _ => {}
        }
    }

    debug!("Unterminated type expression: '{}'", text);
    None
}

/// Parses a type expression such as `Pet.model`, `Cat|Dog`, `number[]` or
/// `Array.<Point>`.
///
/// Returns `None` for an empty expression; anything unparseable becomes
/// [`TypeDescriptor::Any`].
pub fn parse_type_expression(expression: &str) -> Option<TypeDescriptor> {
    let expression = expression.trim();
    if expression.is_empty() {
        return None;
    }

    let mut parser = TypeExpressionParser::new(expression);
    match parser.parse_union() {
        Some(descriptor) if parser.at_end() => Some(descriptor),
        _ => {
            debug!("Could not classify type expression '{}'", expression);
            Some(TypeDescriptor::Any)
        }
    }
}

struct TypeExpressionParser {
    chars: Vec<char>,
    pos: usize,
}

impl TypeExpressionParser {
    fn new(expression: &str) -> Self {
        Self {
            chars: expression.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.pos >= self.chars.len()
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.get(self.pos).map_or(false, |c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// `member ('|' member)*`; a single member is returned as-is
    fn parse_union(&mut self) -> Option<TypeDescriptor> {
        let mut members = vec![self.parse_postfix()?];
        while self.eat('|') {
            members.push(self.parse_postfix()?);
        }

        if members.len() == 1 {
            members.pop()
        } else {
            Some(TypeDescriptor::Union(members))
        }
    }

    /// `primary ('[]')*`
    fn parse_postfix(&mut self) -> Option<TypeDescriptor> {
        let mut descriptor = self.parse_primary()?;
        while self.peek() == Some('[') {
            self.pos += 1;
            if !self.eat(']') {
                return None;
            }
            descriptor = TypeDescriptor::Application {
                container: "Array".to_string(),
                elements: vec![descriptor],
            };
        }
        Some(descriptor)
    }

    fn parse_primary(&mut self) -> Option<TypeDescriptor> {
        match self.peek()? {
            '*' => {
                self.pos += 1;
                Some(TypeDescriptor::Any)
            }
            '(' => {
                self.pos += 1;
                let inner = self.parse_union()?;
                self.eat(')').then_some(inner)
            }
            _ => self.parse_named(),
        }
    }

    /// A name, optionally applied to `<T, ...>` or `.<T, ...>`
    fn parse_named(&mut self) -> Option<TypeDescriptor> {
        let start = self.pos;
        while self
            .chars
            .get(self.pos)
            .map_or(false, |c| c.is_alphanumeric() || matches!(c, '_' | '$' | '.' | '-'))
        {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }

        let raw: String = self.chars[start..self.pos].iter().collect();
        if !self.eat('<') {
            return Some(TypeDescriptor::Name(raw));
        }

        let mut elements = vec![self.parse_union()?];
        while self.eat(',') {
            elements.push(self.parse_union()?);
        }
        if !self.eat('>') {
            return None;
        }

        Some(TypeDescriptor::Application {
            container: raw.trim_end_matches('.').to_string(),
            elements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokenize(source: &str) -> Vec<CommentBlock> {
        JsDocTokenizer.tokenize(source)
    }

    #[test]
    fn test_route_block() {
        let source = r#"
/**
 * This route will respond greetings to name in json request body.
 * @summary greetings to name
 * @route POST /hello/
 * @group hello - Test Demo
 * @param {ReqNameJSON.model} name.body.required - username or email
 * @returns {object} 200 - An object with the key 'msg'
 * @returns {Error}  default - Unexpected error
 * @headers {integer} 200.X-Rate-Limit - calls per hour allowed by the user
 * @produces application/json
 */
router.post("/", function() {});
"#;

        let blocks = tokenize(source);
        assert_eq!(blocks.len(), 1);

        let block = &blocks[0];
        assert_eq!(
            block.description,
            "This route will respond greetings to name in json request body."
        );
        let titles: Vec<&str> = block.tags.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["summary", "route", "group", "param", "returns", "returns", "headers", "produces"]
        );

        let param = &block.tags[3];
        assert_eq!(param.name.as_deref(), Some("name.body.required"));
        assert_eq!(param.description, "username or email");
        assert_eq!(param.type_descriptor, Some(TypeDescriptor::name("ReqNameJSON.model")));

        let default_response = &block.tags[5];
        assert!(default_response.name.is_none());
        assert_eq!(default_response.description, "default - Unexpected error");
        assert_eq!(block.tags[1].description, "POST /hello/");
    }

    #[test]
    fn test_typedef_block() {
        let source = r#"
 /**
  * @typedef {Pet} Dog
  * @property {string} woof - M - eg: woof
  * @property {number[]} numbers - A lot of integers - eg:[0,0,0]
  */
"#;

        let blocks = tokenize(source);
        let tags = &blocks[0].tags;
        assert!(blocks[0].is_typedef());
        assert_eq!(tags[0].name.as_deref(), Some("Dog"));
        assert_eq!(tags[0].type_descriptor, Some(TypeDescriptor::name("Pet")));
        assert_eq!(tags[1].description, "M - eg: woof");
        assert_eq!(tags[2].type_descriptor, Some(TypeDescriptor::array_of("number")));
        assert_eq!(tags[2].description, "A lot of integers - eg:[0,0,0]");
    }

    #[test]
    fn test_example_titles_are_normalized() {
        let source = r#"
/**
 * @route POST /test/union_input
 * @input_example input - Dog - eg: {"a":5}
 * @output_example 200 - Cat - eg: {"a":1}
 */
"#;

        let tags = &tokenize(source)[0].tags;
        assert_eq!(tags[1].title, "input");
        assert_eq!(tags[1].description, r#"input - Dog - eg: {"a":5}"#);
        assert_eq!(tags[2].title, "output");
    }

    #[test]
    fn test_plain_and_tagless_comments_are_dropped() {
        let source = r#"
/* GET users listing. */
/**
 * Just prose, no tags.
 */
/** @route GET /ping */
"#;

        let blocks = tokenize(source);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].tags[0].description, "GET /ping");
    }

    #[test]
    fn test_continuation_lines_extend_description() {
        let source = r#"
/**
 * @route GET /pets
 * @returns {Array.<Pet>} 200 - every pet
 *   in the store
 */
"#;

        let tags = &tokenize(source)[0].tags;
        assert_eq!(tags[1].description, "200 - every pet\nin the store");
    }

    #[test]
    fn test_type_expressions() {
        assert_eq!(parse_type_expression(""), None);
        assert_eq!(parse_type_expression("*"), Some(TypeDescriptor::Any));
        assert_eq!(
            parse_type_expression("Cat|Dog"),
            Some(TypeDescriptor::union_of(["Cat", "Dog"]))
        );
        assert_eq!(
            parse_type_expression("(Cat | Dog)"),
            Some(TypeDescriptor::union_of(["Cat", "Dog"]))
        );
        assert_eq!(
            parse_type_expression("Array.<Point>"),
            Some(TypeDescriptor::array_of("Point"))
        );
        assert_eq!(
            parse_type_expression("Array<Point>"),
            Some(TypeDescriptor::array_of("Point"))
        );
        assert_eq!(
            parse_type_expression("Map.<string, Pet>"),
            Some(TypeDescriptor::Application {
                container: "Map".to_string(),
                elements: vec![TypeDescriptor::name("string"), TypeDescriptor::name("Pet")],
            })
        );
        assert_eq!(
            parse_type_expression("(Cat|Dog)[]"),
            Some(TypeDescriptor::Application {
                container: "Array".to_string(),
                elements: vec![TypeDescriptor::union_of(["Cat", "Dog"])],
            })
        );
    }

    #[test]
    fn test_unparseable_type_is_any() {
        assert_eq!(parse_type_expression("Array.<Point"), Some(TypeDescriptor::Any));
        assert_eq!(parse_type_expression("a b"), Some(TypeDescriptor::Any));
    }
}
