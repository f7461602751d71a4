//! A JSON grammar in the PEG notation together with a visitor folding the
//! parse tree into a [JsonValue].

use crate::visitor::{HandlerError, NodeVisitor, VisitError};
use crate::{Grammar, GrammarError, ParseNode};

pub const JSON_GRAMMAR: &str = r#"
json       = _ value
value      = object / array / string / number / boolean / null
object     = lbrace pairs? rbrace
pairs      = pair pair_tail*
pair_tail  = comma pair
pair       = string colon value
array      = lbracket items? rbracket
items      = value value_tail*
value_tail = comma value
string     = ~'"[^"\\\\]*(?:\\\\.[^"\\\\]*)*"' _
number     = ~"-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?" _
boolean    = ("true" / "false") _
null       = "null" _
lbrace     = "{" _
rbrace     = "}" _
lbracket   = "[" _
rbracket   = "]" _
comma      = "," _
colon      = ":" _
_          = ~"\s*"
"#;

pub fn json_grammar() -> Result<Grammar, GrammarError> {
    Grammar::new(JSON_GRAMMAR)
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<JsonValue>),
    /// Key/value pairs in document order.
    Object(Vec<(String, JsonValue)>),
}

#[derive(Debug)]
pub struct JsonError {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
/// Intermediate folding value: punctuation folds to [Nothing](JsonFold::Nothing)
/// and list rules fold to [Many](JsonFold::Many) until a parent collects them.
pub enum JsonFold {
    Nothing,
    Val(JsonValue),
    Pair(String, JsonValue),
    Many(Vec<JsonFold>),
}

fn collect_values(fold: JsonFold, out: &mut Vec<JsonValue>) {
    match fold {
        JsonFold::Val(value) => out.push(value),
        JsonFold::Many(items) => {
            for item in items {
                collect_values(item, out);
            }
        }
        _ => {}
    }
}

fn collect_pairs(fold: JsonFold, out: &mut Vec<(String, JsonValue)>) {
    match fold {
        JsonFold::Pair(key, value) => out.push((key, value)),
        JsonFold::Many(items) => {
            for item in items {
                collect_pairs(item, out);
            }
        }
        _ => {}
    }
}

fn unescape_json(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() < 2 {
        return String::new();
    }
    let body = &chars[1..chars.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut i = 0;
    while i < body.len() {
        let c = body[i];
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }
        match body.get(i + 1) {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let digits: String = body.iter().skip(i + 2).take(4).collect();
                let scalar = (digits.len() == 4)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                if let Some(c) = scalar {
                    out.push(c);
                    i += 6;
                    continue;
                }
                out.push('\\');
                out.push('u');
            }
            Some(other) => {
                out.push('\\');
                out.push(*other);
            }
            None => out.push('\\'),
        }
        i += 2;
    }
    out
}

/// Folds JSON parse trees into [JsonValue]s.
pub struct JsonVisitor {
    grammar: Grammar,
}

impl JsonVisitor {
    pub fn new() -> Result<Self, GrammarError> {
        Ok(Self {
            grammar: json_grammar()?,
        })
    }

    /// Parse and fold a JSON document in one step.
    pub fn evaluate(&mut self, text: &str) -> Result<JsonValue, VisitError<JsonError>> {
        match self.parse(text)? {
            JsonFold::Val(value) => Ok(value),
            other => Err(VisitError::Unwrapped(JsonError {
                message: format!("The document folded to {:?} instead of a value.", other),
            })),
        }
    }

    fn leaf_text<'n>(node: &'n ParseNode) -> &'n str {
        node.children
            .first()
            .and_then(|child| child.text())
            .unwrap_or("")
    }
}

impl NodeVisitor for JsonVisitor {
    type Value = JsonFold;
    type Error = JsonError;

    fn grammar(&self) -> Option<&Grammar> {
        Some(&self.grammar)
    }

    fn visit_rule(
        &mut self,
        rule: &str,
        node: &ParseNode,
        children: Vec<JsonFold>,
    ) -> Result<JsonFold, HandlerError<JsonError>> {
        match rule {
            "json" => {
                let mut values = Vec::new();
                for child in children {
                    collect_values(child, &mut values);
                }
                match values.into_iter().next() {
                    Some(value) => Ok(JsonFold::Val(value)),
                    None => Err(HandlerError::Raised(JsonError {
                        message: "The document contains no value.".to_string(),
                    })),
                }
            }
            "object" => {
                let mut pairs = Vec::new();
                for child in children {
                    collect_pairs(child, &mut pairs);
                }
                Ok(JsonFold::Val(JsonValue::Object(pairs)))
            }
            "pair" => {
                let mut values = Vec::new();
                for child in children {
                    collect_values(child, &mut values);
                }
                let mut values = values.into_iter();
                match (values.next(), values.next()) {
                    (Some(JsonValue::String(key)), Some(value)) => Ok(JsonFold::Pair(key, value)),
                    _ => Err(HandlerError::Raised(JsonError {
                        message: "An object pair without a key and a value.".to_string(),
                    })),
                }
            }
            "array" => {
                let mut values = Vec::new();
                for child in children {
                    collect_values(child, &mut values);
                }
                Ok(JsonFold::Val(JsonValue::Array(values)))
            }
            "string" => Ok(JsonFold::Val(JsonValue::String(unescape_json(
                Self::leaf_text(node),
            )))),
            "number" => {
                let text = Self::leaf_text(node);
                match text.parse::<f64>() {
                    Ok(number) => Ok(JsonFold::Val(JsonValue::Number(number))),
                    Err(err) => Err(HandlerError::Raised(JsonError {
                        message: format!("Bad number literal '{}': {}", text, err),
                    })),
                }
            }
            "boolean" => Ok(JsonFold::Val(JsonValue::Bool(
                Self::leaf_text(node).starts_with("true"),
            ))),
            "null" => Ok(JsonFold::Val(JsonValue::Null)),
            "lbrace" | "rbrace" | "lbracket" | "rbracket" | "comma" | "colon" | "_" => {
                Ok(JsonFold::Nothing)
            }
            _ => self.generic_visit(node, children),
        }
    }

    fn generic_visit(
        &mut self,
        _node: &ParseNode,
        mut children: Vec<JsonFold>,
    ) -> Result<JsonFold, HandlerError<JsonError>> {
        Ok(match children.len() {
            0 => JsonFold::Nothing,
            1 => children.remove(0),
            _ => JsonFold::Many(children),
        })
    }
}
