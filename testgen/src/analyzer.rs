//! Structural analysis of submitted source code.
//!
//! Only Python is parsed. The analyzer collects every function and method
//! definition (at any nesting depth) with its positional parameters and
//! whether a `return` statement appears anywhere in its body. Other languages
//! yield an empty analysis; they are forwarded to the model unanalyzed.
//!
//! `async def` functions are collected alongside plain ones, and positional-only
//! parameters (those before `/`) are reported in `args`.
//!
//! tree-sitter recovers from some input that the Python compiler rejects, so a
//! clean parse tree is also checked for Python 2 `print`/`exec` statements and
//! for statements that do not line up with their siblings.

use crate::types::Language;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tree_sitter::{Node, Parser};

/// Errors produced while analyzing code
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Invalid Python syntax: {reason}")]
    Syntax { reason: String },
    #[error("Python parser unavailable: {message}")]
    Parser { message: String },
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// A function or method found in the source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionInfo {
    pub name: String,
    pub args: Vec<String>,
    pub has_return: bool,
}

/// Structural summary of one code snippet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeAnalysis {
    pub functions: Vec<FunctionInfo>,
    /// Number of collected functions. Not a cyclomatic measure.
    pub complexity: usize,
}

impl CodeAnalysis {
    pub fn from_functions(functions: Vec<FunctionInfo>) -> Self {
        let complexity = functions.len();
        Self {
            functions,
            complexity,
        }
    }

    pub fn function_names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Node kinds that add a level of nesting around the definitions they contain.
const NESTING_KINDS: &[&str] = &[
    "function_definition",
    "class_definition",
    "if_statement",
    "elif_clause",
    "for_statement",
    "while_statement",
    "try_statement",
    "except_clause",
    "except_group_clause",
    "with_statement",
    "match_statement",
    "case_clause",
];

/// Longest snippet of offending source quoted in a syntax error.
const SNIPPET_LIMIT: usize = 30;

#[derive(Debug, Clone, Copy, Default)]
pub struct CodeAnalyzer;

impl CodeAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, code: &str, language: Language) -> AnalysisResult<CodeAnalysis> {
        match language {
            Language::Python => self.analyze_python(code),
            Language::JavaScript | Language::CSharp => Ok(CodeAnalysis::default()),
        }
    }

    pub fn analyze_python(&self, code: &str) -> AnalysisResult<CodeAnalysis> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| AnalysisError::Parser {
                message: e.to_string(),
            })?;

        let tree = parser
            .parse(code, None)
            .ok_or_else(|| AnalysisError::Parser {
                message: "parse did not produce a tree".to_string(),
            })?;

        let root = tree.root_node();
        if root.has_error() {
            let reason = find_error(root, code)
                .unwrap_or_else(|| "invalid syntax".to_string());
            return Err(AnalysisError::Syntax { reason });
        }
        if let Some(reason) = find_layout_error(root) {
            return Err(AnalysisError::Syntax { reason });
        }

        let mut found = Vec::new();
        collect_functions(root, code, 0, &mut found);

        // Stable sort keeps source order within a level.
        found.sort_by_key(|(depth, _)| *depth);

        Ok(CodeAnalysis::from_functions(
            found.into_iter().map(|(_, function)| function).collect(),
        ))
    }
}

fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    source.get(node.byte_range()).unwrap_or("")
}

fn collect_functions(
    node: Node<'_>,
    source: &str,
    depth: usize,
    out: &mut Vec<(usize, FunctionInfo)>,
) {
    if node.kind() == "function_definition" {
        if let Some(function) = describe_function(node, source) {
            out.push((depth, function));
        }
    }

    let child_depth = if NESTING_KINDS.contains(&node.kind()) {
        depth + 1
    } else {
        depth
    };

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_functions(child, source, child_depth, out);
    }
}

fn describe_function(node: Node<'_>, source: &str) -> Option<FunctionInfo> {
    let name = node_text(node.child_by_field_name("name")?, source).to_string();

    let args = node
        .child_by_field_name("parameters")
        .map(|params| positional_parameters(params, source))
        .unwrap_or_default();

    let has_return = node
        .child_by_field_name("body")
        .is_some_and(contains_return);

    Some(FunctionInfo {
        name,
        args,
        has_return,
    })
}

/// Parameter names up to the first `*`, `*args` or `**kwargs`.
fn positional_parameters(params: Node<'_>, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = params.walk();

    for param in params.named_children(&mut cursor) {
        let name = match param.kind() {
            "identifier" => Some(param),
            "default_parameter" | "typed_default_parameter" => param.child_by_field_name("name"),
            "typed_parameter" => {
                let mut inner = param.walk();
                let first = param.named_children(&mut inner).next();
                match first {
                    Some(n) if n.kind() == "identifier" => Some(n),
                    _ => break,
                }
            }
            "list_splat_pattern" | "dictionary_splat_pattern" | "keyword_separator" => break,
            _ => None,
        };

        if let Some(name) = name {
            names.push(node_text(name, source).to_string());
        }
    }

    names
}

fn contains_return(node: Node<'_>) -> bool {
    if node.kind() == "return_statement" {
        return true;
    }

    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).any(contains_return);
    found
}

/// Describes the first error or missing node in document order.
fn find_error(node: Node<'_>, source: &str) -> Option<String> {
    let position = node.start_position();
    let (line, column) = (position.row + 1, position.column + 1);

    if node.is_missing() {
        return Some(format!(
            "missing `{}` at line {}, column {}",
            node.kind(),
            line,
            column
        ));
    }

    if node.is_error() {
        let snippet: String = node_text(node, source)
            .lines()
            .next()
            .unwrap_or("")
            .trim()
            .chars()
            .take(SNIPPET_LIMIT)
            .collect();

        if snippet.is_empty() {
            return Some(format!("unexpected input at line {}, column {}", line, column));
        }
        return Some(format!(
            "unexpected `{}` at line {}, column {}",
            snippet, line, column
        ));
    }

    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find_map(|child| find_error(child, source))
}

/// Finds statements tree-sitter accepts but the Python compiler does not.
fn find_layout_error(node: Node<'_>) -> Option<String> {
    let position = node.start_position();
    let (line, column) = (position.row + 1, position.column + 1);

    match node.kind() {
        "print_statement" | "exec_statement" => {
            let keyword = node.kind().trim_end_matches("_statement");
            return Some(format!(
                "Python 2 `{}` statement at line {}, column {}",
                keyword, line, column
            ));
        }
        "module" => {
            if let Some(reason) = misaligned_statement(node, 0) {
                return Some(reason);
            }
        }
        "block" => {
            if let Some(first) = statements(node).first() {
                if let Some(reason) = misaligned_statement(node, first.start_position().column) {
                    return Some(reason);
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
    children.into_iter().find_map(find_layout_error)
}

/// Statements of a module or block. Comments may sit at any indentation.
fn statements(container: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = container.walk();
    let found = container
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect();
    found
}

/// First statement that opens a line at a column other than `expected`.
///
/// Statements after a `;` share a line with their predecessor and are skipped.
fn misaligned_statement(container: Node<'_>, expected: usize) -> Option<String> {
    let mut previous_end_row = None;

    for statement in statements(container) {
        let start = statement.start_position();
        let opens_line = previous_end_row != Some(start.row);
        previous_end_row = Some(statement.end_position().row);

        if opens_line && start.column != expected {
            let problem = if start.column > expected {
                "unexpected indent"
            } else {
                "unindent does not match any outer indentation level"
            };
            return Some(format!(
                "{} at line {}, column {}",
                problem,
                start.row + 1,
                start.column + 1
            ));
        }
    }

    None
}
