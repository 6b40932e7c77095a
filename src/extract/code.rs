//! Docstring extraction using tree-sitter
//!
//! Parses Python source and reports the docstring attached to:
//! - The module itself
//! - Every function definition, nested or not
//! - Every class definition, nested or not
//!
//! A docstring is the first statement of a body when that statement is a
//! bare string literal. Names are never qualified, so a class and one of its
//! methods may share a `symbol_name`.

use super::read_text;
use crate::config::Traversal;
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::io::Write;
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;
use tree_sitter::Node;

/// Symbol name reported for a module-level docstring
pub const MODULE_SYMBOL: &str = "<module>";

const TAB_SIZE: usize = 8;

/// Kind of syntax node a docstring was attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Module,
    Function,
    Class,
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Module => write!(f, "module"),
            SymbolKind::Function => write!(f, "function"),
            SymbolKind::Class => write!(f, "class"),
        }
    }
}

/// One docstring found in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRecord {
    /// Path of the file, as it was given to the extractor
    pub source_path: PathBuf,
    /// `<module>`, or the unqualified function/class name
    pub symbol_name: String,
    /// Cleaned docstring value, never empty
    pub docstring_text: String,
    /// What the docstring belongs to
    pub kind: SymbolKind,
    /// 1-based line of the owning definition
    pub line: usize,
}

impl DocRecord {
    /// Write the `File:` / `Function/Class:` / `Docstring:` block
    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "File: {}", self.source_path.display())?;
        writeln!(out, "Function/Class: {}", self.symbol_name)?;
        writeln!(out, "Docstring:")?;
        writeln!(out, "{}", self.docstring_text)?;
        writeln!(out)
    }
}

/// The syntax nodes able to carry a docstring
#[derive(Clone, Copy)]
enum DocNode<'tree> {
    Module(Node<'tree>),
    Function(Node<'tree>),
    Class(Node<'tree>),
}

impl<'tree> DocNode<'tree> {
    fn classify(node: Node<'tree>) -> Option<Self> {
        match node.kind() {
            "module" => Some(DocNode::Module(node)),
            "function_definition" => Some(DocNode::Function(node)),
            "class_definition" => Some(DocNode::Class(node)),
            _ => None,
        }
    }

    fn node(&self) -> Node<'tree> {
        match self {
            DocNode::Module(n) | DocNode::Function(n) | DocNode::Class(n) => *n,
        }
    }

    fn kind(&self) -> SymbolKind {
        match self {
            DocNode::Module(_) => SymbolKind::Module,
            DocNode::Function(_) => SymbolKind::Function,
            DocNode::Class(_) => SymbolKind::Class,
        }
    }

    fn body(&self) -> Option<Node<'tree>> {
        match self {
            DocNode::Module(n) => Some(*n),
            DocNode::Function(n) | DocNode::Class(n) => n.child_by_field_name("body"),
        }
    }

    fn symbol_name(&self, source: &str) -> Option<String> {
        match self {
            DocNode::Module(_) => Some(MODULE_SYMBOL.to_string()),
            DocNode::Function(n) | DocNode::Class(n) => n
                .child_by_field_name("name")
                .and_then(|name| name.utf8_text(source.as_bytes()).ok())
                .map(str::to_string),
        }
    }

    fn docstring(&self, source: &str) -> Option<String> {
        let body = self.body()?;

        // Comments are extras and never count as the first statement
        let mut cursor = body.walk();
        let first = body.named_children(&mut cursor).find(|n| !n.is_extra())?;

        if first.kind() != "expression_statement" || first.named_child_count() != 1 {
            return None;
        }

        let value = literal_value(first.named_child(0)?, source)?;
        let cleaned = clean_docstring(&value);
        (!cleaned.is_empty()).then_some(cleaned)
    }
}

/// Extracts docstrings from Python source files
pub struct DocstringExtractor {
    parser: tree_sitter::Parser,
    traversal: Traversal,
}

impl DocstringExtractor {
    /// Create an extractor visiting nodes breadth-first
    pub fn new() -> Result<Self> {
        Self::with_traversal(Traversal::default())
    }

    /// Create an extractor with an explicit traversal order
    pub fn with_traversal(traversal: Traversal) -> Result<Self> {
        let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&language)?;

        Ok(Self { parser, traversal })
    }

    /// Read and extract a file
    pub fn extract(&mut self, path: &Path) -> Result<Vec<DocRecord>> {
        let source = read_text(path)?;
        self.extract_source(path, &source)
    }

    /// Extract docstrings from already loaded source, in traversal order
    pub fn extract_source(&mut self, path: &Path, source: &str) -> Result<Vec<DocRecord>> {
        let syntax_error = |line, column| Error::Syntax {
            path: path.to_path_buf(),
            line,
            column,
        };

        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| syntax_error(1, 1))?;
        let root = tree.root_node();

        if root.has_error() {
            let (line, column) = first_error(root)
                .map(|n| (n.start_position().row + 1, n.start_position().column + 1))
                .unwrap_or((1, 1));
            return Err(syntax_error(line, column));
        }

        // The grammar accepts a block with no statements, Python does not
        if let Some(block) = first_empty_block(root) {
            let position = block.start_position();
            return Err(syntax_error(position.row + 1, position.column + 1));
        }

        let mut records = Vec::new();

        for node in visit_order(root, self.traversal) {
            let Some(doc_node) = DocNode::classify(node) else {
                continue;
            };
            let Some(docstring_text) = doc_node.docstring(source) else {
                continue;
            };
            let Some(symbol_name) = doc_node.symbol_name(source) else {
                continue;
            };

            records.push(DocRecord {
                source_path: path.to_path_buf(),
                symbol_name,
                docstring_text,
                kind: doc_node.kind(),
                line: doc_node.node().start_position().row + 1,
            });
        }

        Ok(records)
    }
}

/// Every named node of the tree in the requested order
fn visit_order(root: Node<'_>, traversal: Traversal) -> Vec<Node<'_>> {
    let mut order = Vec::new();

    match traversal {
        Traversal::BreadthFirst => {
            let mut queue = VecDeque::from([root]);
            while let Some(node) = queue.pop_front() {
                order.push(node);
                let mut cursor = node.walk();
                queue.extend(node.named_children(&mut cursor));
            }
        }
        Traversal::DepthFirst => {
            let mut stack = vec![root];
            while let Some(node) = stack.pop() {
                order.push(node);
                let mut cursor = node.walk();
                let children: Vec<_> = node.named_children(&mut cursor).collect();
                stack.extend(children.into_iter().rev());
            }
        }
    }

    order
}

/// The first error or missing node under `node`, in source order
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

/// The first `block` holding no statement, in source order
fn first_empty_block(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let children: Vec<_> = node.named_children(&mut cursor).collect();

    if node.kind() == "block" && children.iter().all(|child| child.is_extra()) {
        return Some(node);
    }
    children.into_iter().find_map(first_empty_block)
}

/// Value of a string literal expression, if it evaluates to `str`
fn literal_value(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "string" => string_value(node.utf8_text(source.as_bytes()).ok()?),
        "parenthesized_expression" => {
            let mut cursor = node.walk();
            let inner = node.named_children(&mut cursor).find(|n| !n.is_extra())?;
            literal_value(inner, source)
        }
        "concatenated_string" => {
            let mut value = String::new();
            let mut cursor = node.walk();
            for part in node.named_children(&mut cursor) {
                if part.is_extra() {
                    continue;
                }
                value.push_str(&string_value(part.utf8_text(source.as_bytes()).ok()?)?);
            }
            Some(value)
        }
        _ => None,
    }
}

/// Decode a single literal token such as `r'''...'''` or `"a\tb"`.
///
/// Bytes and f-strings yield `None`.
fn string_value(text: &str) -> Option<String> {
    let prefix_len = text.find(['"', '\''])?;
    let prefix = text[..prefix_len].to_ascii_lowercase();
    if prefix.chars().any(|c| !matches!(c, 'r' | 'u')) {
        return None;
    }

    let quoted = &text[prefix_len..];
    let quote_len = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        3
    } else {
        1
    };
    let quote = &quoted[..quote_len];
    if quoted.len() < 2 * quote_len || !quoted.ends_with(quote) {
        return None;
    }

    let body = quoted[quote_len..quoted.len() - quote_len]
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    if prefix.contains('r') {
        Some(body)
    } else {
        Some(unescape(&body))
    }
}

/// Decode backslash escapes. Unknown escapes and `\N{...}` stay verbatim.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };

        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut value = next as u32 - '0' as u32;
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.extend(char::from_u32(value));
            }
            'x' => push_hex_escape(&mut out, &mut chars, 2, "\\x"),
            'u' => push_hex_escape(&mut out, &mut chars, 4, "\\u"),
            'U' => push_hex_escape(&mut out, &mut chars, 8, "\\U"),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

fn push_hex_escape(out: &mut String, chars: &mut Peekable<Chars<'_>>, width: usize, escape: &str) {
    let mut digits = String::with_capacity(width);
    while digits.len() < width {
        match chars.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                digits.push(*c);
                chars.next();
            }
            _ => break,
        }
    }

    let decoded = if digits.len() == width {
        u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
    } else {
        None
    };

    match decoded {
        Some(c) => out.push(c),
        None => {
            out.push_str(escape);
            out.push_str(&digits);
        }
    }
}

/// Normalize docstring indentation the way Python's `inspect.cleandoc` does
fn clean_docstring(doc: &str) -> String {
    let lines: Vec<String> = doc.split('\n').map(expand_tabs).collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter_map(|line| {
            let content = line.trim_start();
            (!content.is_empty()).then(|| line.chars().count() - content.chars().count())
        })
        .min();

    let mut cleaned: Vec<String> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| match (i, margin) {
            (0, _) => line.trim_start().to_string(),
            (_, Some(margin)) => line.chars().skip(margin).collect(),
            (_, None) => line.clone(),
        })
        .collect();

    while cleaned.last().is_some_and(|line| line.is_empty()) {
        cleaned.pop();
    }
    let start = cleaned
        .iter()
        .position(|line| !line.is_empty())
        .unwrap_or(cleaned.len());

    cleaned[start..].join("\n")
}

fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            let pad = TAB_SIZE - column % TAB_SIZE;
            out.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}
