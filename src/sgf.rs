//! Game-record text parser.
//!
//! Turns bracket-value collection text (`(;GM[1]SZ[19];B[pd](;W[dp])(;W[dd]))`)
//! into the property tree consumed by [`GameTree::load_json`]:
//!
//! ```text
//! { "_children": [ { "GM": "1", "SZ": "19", "_children": [ ... ] } ] }
//! ```
//!
//! The returned value is the collection itself; each game is one of its
//! children. A property with one value maps to a string, several values
//! map to an array. Repeating a code within one node appends to it.
//!
//! The parser keeps an explicit stack of open variations and never recurses,
//! so arbitrarily deep records are fine. The result nests once per node;
//! free it with [`release_json`] rather than a plain drop.
//!
//! [`GameTree::load_json`]: crate::tree::GameTree::load_json
//! [`release_json`]: crate::tree::release_json

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::constants::CHILDREN_KEY;

/// Why a record could not be parsed. Positions are byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SgfError {
    #[error("unexpected character {ch:?} at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("value starting at offset {pos} is never closed")]
    UnterminatedValue { pos: usize },

    #[error("unbalanced parentheses at offset {pos}")]
    UnbalancedParens { pos: usize },

    #[error("property at offset {pos} is not inside a node")]
    MissingNode { pos: usize },
}

#[derive(Default)]
struct RawNode {
    props: Vec<(String, Vec<String>)>,
    children: Vec<usize>,
}

impl RawNode {
    fn add(&mut self, code: String, values: Vec<String>) {
        match self.props.iter_mut().find(|(c, _)| *c == code) {
            Some((_, existing)) => existing.extend(values),
            None => self.props.push((code, values)),
        }
    }
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Upper-case letters form the code; lower-case letters are ignored
    /// (`AddBlack` reads as `AB`).
    fn identifier(&mut self) -> String {
        let mut code = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_uppercase() {
                code.push(ch);
            } else if !ch.is_ascii_lowercase() {
                break;
            }
            self.bump();
        }
        code
    }

    /// One bracketed value, positioned on the opening `[`.
    fn value(&mut self) -> Result<String, SgfError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(SgfError::UnterminatedValue { pos: start }),
                Some(']') => return Ok(out),
                Some('\\') => match self.bump() {
                    None => return Err(SgfError::UnterminatedValue { pos: start }),
                    // soft line break
                    Some('\n') => {
                        if self.peek() == Some('\r') {
                            self.bump();
                        }
                    }
                    Some('\r') => {
                        if self.peek() == Some('\n') {
                            self.bump();
                        }
                    }
                    Some(ch) => out.push(ch),
                },
                Some(ch) => out.push(ch),
            }
        }
    }

    fn values(&mut self) -> Result<Vec<String>, SgfError> {
        let mut values = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() != Some('[') {
                break;
            }
            values.push(self.value()?);
        }
        if values.is_empty() {
            return Err(match self.peek() {
                Some(ch) => SgfError::UnexpectedChar { ch, pos: self.pos },
                None => SgfError::UnterminatedValue { pos: self.pos },
            });
        }
        Ok(values)
    }
}

/// Parse record text into a property tree.
///
/// Anything before the first `(` is skipped.
pub fn parse(text: &str) -> Result<Value, SgfError> {
    let mut p = Parser {
        text,
        pos: text.find('(').unwrap_or(text.len()),
    };
    // Node 0 is the collection.
    let mut nodes = vec![RawNode::default()];
    let mut open: Vec<usize> = Vec::new();
    let mut current = 0;

    loop {
        p.skip_whitespace();
        let pos = p.pos;
        let Some(ch) = p.peek() else { break };
        // Text between or after games is not part of the record.
        if open.is_empty() && ch != '(' && ch != ')' {
            p.bump();
            continue;
        }
        match ch {
            '(' => {
                p.bump();
                open.push(current);
            }
            ')' => {
                p.bump();
                current = open.pop().ok_or(SgfError::UnbalancedParens { pos })?;
            }
            ';' => {
                p.bump();
                let id = nodes.len();
                nodes.push(RawNode::default());
                nodes[current].children.push(id);
                current = id;
            }
            c if c.is_ascii_uppercase() => {
                if current == 0 {
                    return Err(SgfError::MissingNode { pos });
                }
                let code = p.identifier();
                let values = p.values()?;
                nodes[current].add(code, values);
            }
            _ => return Err(SgfError::UnexpectedChar { ch, pos }),
        }
    }
    if !open.is_empty() {
        return Err(SgfError::UnbalancedParens { pos: text.len() });
    }
    debug!(nodes = nodes.len() - 1, "parsed record");
    Ok(into_value(nodes))
}

/// Children are always created after their parent, so building in reverse
/// creation order finds every child already built.
fn into_value(nodes: Vec<RawNode>) -> Value {
    let mut built: Vec<Option<Value>> = Vec::with_capacity(nodes.len());
    built.resize_with(nodes.len(), || None);
    for (id, node) in nodes.into_iter().enumerate().rev() {
        let mut map = Map::new();
        for (code, mut values) in node.props {
            let value = if values.len() == 1 {
                Value::String(values.remove(0))
            } else {
                Value::Array(values.into_iter().map(Value::String).collect())
            };
            map.insert(code, value);
        }
        if !node.children.is_empty() {
            let children = node
                .children
                .iter()
                .map(|&c| built[c].take().unwrap_or(Value::Null))
                .collect();
            map.insert(CHILDREN_KEY.to_string(), Value::Array(children));
        }
        built[id] = Some(Value::Object(map));
    }
    built
        .into_iter()
        .next()
        .flatten()
        .unwrap_or_else(|| Value::Object(Map::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::release_json;
    use serde_json::json;

    #[test]
    fn test_single_game() {
        let v = parse("(;GM[1]SZ[19];B[pd];W[dp])").unwrap();
        assert_eq!(
            v,
            json!({"_children": [{
                "GM": "1", "SZ": "19",
                "_children": [{"B": "pd", "_children": [{"W": "dp"}]}]
            }]})
        );
    }

    #[test]
    fn test_variations() {
        let v = parse("(;SZ[9];B[cc](;W[gg])(;W[gc];B[cg]))").unwrap();
        let b = &v["_children"][0]["_children"][0];
        assert_eq!(b["B"], "cc");
        assert_eq!(b["_children"][0]["W"], "gg");
        assert_eq!(b["_children"][1]["W"], "gc");
        assert_eq!(b["_children"][1]["_children"][0]["B"], "cg");
    }

    #[test]
    fn test_multiple_values_and_merge() {
        let v = parse("(;AB[aa][bb] AB[cc]C[x])").unwrap();
        assert_eq!(v["_children"][0]["AB"], json!(["aa", "bb", "cc"]));
        assert_eq!(v["_children"][0]["C"], "x");
    }

    #[test]
    fn test_escapes() {
        let v = parse("(;C[a\\]b\\\\c\\\nd])").unwrap();
        assert_eq!(v["_children"][0]["C"], "a]b\\cd");
    }

    #[test]
    fn test_lowercase_in_identifier() {
        let v = parse("(;AddBlack[aa])").unwrap();
        assert_eq!(v["_children"][0]["AB"], "aa");
    }

    #[test]
    fn test_several_games_and_junk() {
        let v = parse("header text (;GN[one]) between (;GN[two]) trailer").unwrap();
        let games = v["_children"].as_array().unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[1]["GN"], "two");
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse("(;B[aa]"),
            Err(SgfError::UnbalancedParens { pos: 7 })
        );
        assert_eq!(
            parse("(;C[open"),
            Err(SgfError::UnterminatedValue { pos: 3 })
        );
        assert_eq!(parse("(B[aa])"), Err(SgfError::MissingNode { pos: 1 }));
        assert_eq!(
            parse("(;B;W[aa])"),
            Err(SgfError::UnexpectedChar { ch: ';', pos: 3 })
        );
        assert_eq!(
            parse("(;B[aa]))"),
            Err(SgfError::UnbalancedParens { pos: 8 })
        );
    }

    #[test]
    fn test_deep_record() {
        let mut text = String::from("(;SZ[19]");
        for i in 0..50_000 {
            text.push_str(if i % 2 == 0 { ";B[aa]" } else { ";W[bb]" });
        }
        text.push(')');
        let v = parse(&text).unwrap();
        let mut depth = 0;
        let mut node = &v["_children"][0];
        while let Some(next) = node.get("_children") {
            node = &next[0];
            depth += 1;
        }
        assert_eq!(depth, 50_000);
        release_json(v);
    }
}
