//! Frontmatter parsing.
//!
//! Agent and skill files open with a YAML block delimited by `---` lines. The
//! block is split off line by line and handed to `serde_yaml`; values are
//! flattened to scalars or lists of scalars. Parsing never fails: a document
//! without a complete block has an empty mapping and the whole text as body,
//! and a block that is not a YAML mapping degrades to an empty mapping.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

const DELIMITER: &str = "---";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrontmatterValue {
    Scalar(String),
    List(Vec<String>),
}

impl FrontmatterValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FrontmatterValue::Scalar(s) => Some(s),
            FrontmatterValue::List(_) => None,
        }
    }
}

pub type Frontmatter = BTreeMap<String, FrontmatterValue>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl Document {
    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.frontmatter.get(key)
    }

    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FrontmatterValue::as_scalar)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Split `text` into frontmatter and body.
pub fn parse(text: &str) -> Document {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();

    let opens = lines
        .first()
        .map(|l| strip_eol(l).trim_end() == DELIMITER)
        .unwrap_or(false);
    if !opens {
        return whole_body(text);
    }

    let Some(close) = lines
        .iter()
        .skip(1)
        .position(|l| strip_eol(l).trim_end() == DELIMITER)
        .map(|i| i + 1)
    else {
        return whole_body(text);
    };

    let block: Vec<&str> = lines[1..close].iter().map(|l| strip_eol(l)).collect();
    let body: String = lines[close + 1..].concat();

    Document {
        frontmatter: parse_block(&block.join("\n")),
        body,
    }
}

fn whole_body(text: &str) -> Document {
    Document {
        frontmatter: Frontmatter::new(),
        body: text.to_string(),
    }
}

fn strip_eol(line: &str) -> &str {
    line.trim_end_matches('\n').trim_end_matches('\r')
}

/// Parse the lines between the delimiters. Anything but a mapping is empty.
fn parse_block(block: &str) -> Frontmatter {
    if block.trim().is_empty() {
        return Frontmatter::new();
    }
    let mapping: Mapping = serde_yaml::from_str(block).unwrap_or_default();
    mapping
        .into_iter()
        .filter_map(|(key, value)| Some((scalar_text(&key)?, flatten(value)?)))
        .collect()
}

fn flatten(value: Value) -> Option<FrontmatterValue> {
    match value {
        Value::Sequence(items) => Some(FrontmatterValue::List(
            items.iter().filter_map(scalar_text).collect(),
        )),
        Value::Null => Some(FrontmatterValue::Scalar(String::new())),
        Value::Tagged(tagged) => flatten(tagged.value),
        Value::Mapping(_) => None,
        other => scalar_text(&other).map(FrontmatterValue::Scalar),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
