//! Reader and writer for the brace-delimited configuration text format.
//!
//! ```text
//! // comments run to the end of the line
//! Body
//! {
//!     name = Kerbin
//!     Template { name = Kerbin }
//! }
//! ```
//!
//! Values run to the end of the line or to the next brace, so a value can
//! never contain `{` or `}`.

use std::path::Path;

use crate::error::ParseError;
use crate::node::ConfigNode;

enum Token<'a> {
    Text(&'a str),
    Open,
    Close,
}

fn tokenize_line(line: &str) -> Vec<Token<'_>> {
    let line = match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    };
    let mut tokens = Vec::new();
    let mut rest = line;
    while let Some(idx) = rest.find(['{', '}']) {
        let text = rest[..idx].trim();
        if !text.is_empty() {
            tokens.push(Token::Text(text));
        }
        tokens.push(if rest.as_bytes()[idx] == b'{' {
            Token::Open
        } else {
            Token::Close
        });
        rest = &rest[idx + 1..];
    }
    let text = rest.trim();
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    tokens
}

/// Parses configuration text into a node called `root_name` holding the
/// top-level entries.
///
/// # Errors
///
/// Returns a [`ParseError`] naming the offending line for unbalanced braces,
/// nameless nodes, stray words and keyless values.
pub fn parse_str(text: &str, root_name: &str) -> Result<ConfigNode, ParseError> {
    let mut stack: Vec<(ConfigNode, usize)> = vec![(ConfigNode::new(root_name), 0)];
    let mut pending: Option<(String, usize)> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line = idx + 1;
        for token in tokenize_line(raw_line) {
            match token {
                Token::Text(text) => {
                    if let Some((word, at)) = pending.take() {
                        return Err(ParseError::DanglingWord { word, line: at });
                    }
                    match text.split_once('=') {
                        Some((key, value)) => {
                            let key = key.trim();
                            if key.is_empty() {
                                return Err(ParseError::MissingKey { line });
                            }
                            if let Some((top, _)) = stack.last_mut() {
                                top.add_value(key, value.trim());
                            }
                        }
                        None => pending = Some((text.to_owned(), line)),
                    }
                }
                Token::Open => {
                    let Some((name, _)) = pending.take() else {
                        return Err(ParseError::MissingNodeName { line });
                    };
                    stack.push((ConfigNode::new(name), line));
                }
                Token::Close => {
                    if let Some((word, at)) = pending.take() {
                        return Err(ParseError::DanglingWord { word, line: at });
                    }
                    if stack.len() == 1 {
                        return Err(ParseError::UnmatchedClose { line });
                    }
                    if let Some((done, _)) = stack.pop()
                        && let Some((parent, _)) = stack.last_mut()
                    {
                        parent.add_node(done);
                    }
                }
            }
        }
    }

    if let Some((word, line)) = pending {
        return Err(ParseError::DanglingWord { word, line });
    }
    if stack.len() > 1
        && let Some((open, line)) = stack.pop()
    {
        return Err(ParseError::UnterminatedNode {
            name: open.name().to_owned(),
            line,
        });
    }
    Ok(stack
        .pop()
        .map(|(root, _)| root)
        .unwrap_or_else(|| ConfigNode::new(root_name)))
}

/// Reads and parses a configuration file. The root node is named after the file.
///
/// # Errors
///
/// Returns [`ParseError::Io`] if the file cannot be read, otherwise the
/// errors of [`parse_str`].
pub fn parse_file(path: &Path) -> Result<ConfigNode, ParseError> {
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let root = parse_str(&text, &name)?;
    tracing::debug!(
        path = %path.display(),
        values = root.values().count(),
        nodes = root.nodes().len(),
        "parsed configuration file"
    );
    Ok(root)
}

pub(crate) fn write_node(node: &ConfigNode) -> String {
    let mut out = String::new();
    write_into(node, 0, &mut out);
    out
}

fn write_into(node: &ConfigNode, depth: usize, out: &mut String) {
    let indent = "\t".repeat(depth);
    out.push_str(&indent);
    out.push_str(node.name());
    out.push('\n');
    out.push_str(&indent);
    out.push_str("{\n");
    for (key, value) in node.values() {
        out.push_str(&indent);
        out.push('\t');
        out.push_str(key);
        out.push_str(" = ");
        out.push_str(value);
        out.push('\n');
    }
    for child in node.nodes() {
        write_into(child, depth + 1, out);
    }
    out.push_str(&indent);
    out.push_str("}\n");
}
