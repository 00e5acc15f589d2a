//! Comment and docstring stripping for Python sources.
//!
//! The source is parsed into a concrete syntax tree (tree-sitter), the
//! designated spans are rewritten, and the remaining text is spliced back
//! together untouched:
//!
//! - a leading string-literal statement of a `def`/`class` body is removed
//!   (replaced with `pass` when it is the whole body),
//! - every other bare string-expression statement is blanked to `''`,
//! - `#` comments are deleted.
//!
//! The pass is idempotent: stripped output contains nothing the pass acts
//! on. It also fails open — any parse problem keeps the original content and
//! logs a warning; normalization must never abort the run.
//!
//! Only Python has a structural grammar here; every other language passes
//! through unchanged.

use tracing::warn;
use tree_sitter::{Node, Parser};

use crate::config::Language;

/// Normalize `content` for the given language.
pub fn normalize(content: &str, language: Language) -> String {
    match language {
        Language::Python => strip_python(content),
        _ => content.to_string(),
    }
}

/// One source rewrite: replace `range` with `replacement`.
struct Edit {
    start: usize,
    end: usize,
    replacement: String,
}

fn strip_python(source: &str) -> String {
    let mut parser = Parser::new();
    if parser.set_language(&tree_sitter_python::language()).is_err() {
        warn!("Python grammar unavailable, keeping content unchanged");
        return source.to_string();
    }

    let tree = match parser.parse(source, None) {
        Some(tree) => tree,
        None => {
            warn!("Parser returned no tree, keeping content unchanged");
            return source.to_string();
        }
    };
    if tree.root_node().has_error() {
        warn!("Syntax error in source, keeping content unchanged");
        return source.to_string();
    }

    let mut edits = Vec::new();
    collect_edits(tree.root_node(), source, &mut edits);

    // Comment edits nested inside a removed docstring line are redundant.
    edits.sort_by_key(|e| (e.start, std::cmp::Reverse(e.end)));
    let mut kept: Vec<Edit> = Vec::with_capacity(edits.len());
    for edit in edits {
        if let Some(last) = kept.last() {
            if edit.start < last.end {
                continue;
            }
        }
        kept.push(edit);
    }

    let mut result = source.to_string();
    for edit in kept.iter().rev() {
        result.replace_range(edit.start..edit.end, &edit.replacement);
    }
    result
}

fn collect_edits(node: Node, source: &str, edits: &mut Vec<Edit>) {
    match node.kind() {
        "comment" => {
            edits.push(comment_edit(node, source));
            return;
        }
        "function_definition" | "class_definition" => {
            if let Some(body) = node.child_by_field_name("body") {
                if let Some(doc) = leading_docstring(body) {
                    edits.push(docstring_edit(doc, body, source));
                    // The docstring is handled; recurse into the remaining
                    // statements only.
                    let mut cursor = body.walk();
                    for child in body.named_children(&mut cursor) {
                        if child.id() != doc.id() {
                            collect_edits(child, source, edits);
                        }
                    }
                    let mut cursor = node.walk();
                    for child in node.children(&mut cursor) {
                        if child.id() != body.id() {
                            collect_edits(child, source, edits);
                        }
                    }
                    return;
                }
            }
        }
        "expression_statement" => {
            if let Some(string) = bare_string(node) {
                edits.push(Edit {
                    start: string.start_byte(),
                    end: string.end_byte(),
                    replacement: "''".to_string(),
                });
                return;
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_edits(child, source, edits);
    }
}

/// The body's first statement, when it is a bare string literal.
fn leading_docstring(body: Node) -> Option<Node> {
    let first = body.named_child(0)?;
    if first.kind() == "expression_statement" && bare_string(first).is_some() {
        Some(first)
    } else {
        None
    }
}

/// The string node of `stmt` when the statement is nothing but one string.
fn bare_string(stmt: Node) -> Option<Node> {
    if stmt.named_child_count() != 1 {
        return None;
    }
    let child = stmt.named_child(0)?;
    (child.kind() == "string").then_some(child)
}

/// Body statements that are not comments. Comments are deleted separately,
/// so they cannot be what keeps a block non-empty.
fn statement_count(body: Node) -> usize {
    let mut cursor = body.walk();
    body.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .count()
}

/// Remove a leading docstring statement. When the docstring is the whole
/// body (comments aside), or shares its line with other code, it becomes
/// `pass` instead so the block stays syntactically valid.
fn docstring_edit(doc: Node, body: Node, source: &str) -> Edit {
    let start = doc.start_byte();
    let end = doc.end_byte();
    let own_line = statement_count(body) > 1 && occupies_own_lines(source, start, end);
    if own_line {
        let (line_start, line_end) = expand_to_lines(source, start, end);
        Edit {
            start: line_start,
            end: line_end,
            replacement: String::new(),
        }
    } else {
        Edit {
            start,
            end,
            replacement: "pass".to_string(),
        }
    }
}

fn comment_edit(node: Node, source: &str) -> Edit {
    let start = node.start_byte();
    let end = node.end_byte();
    if occupies_own_lines(source, start, end) {
        let (line_start, line_end) = expand_to_lines(source, start, end);
        Edit {
            start: line_start,
            end: line_end,
            replacement: String::new(),
        }
    } else {
        // Trailing comment: also eat the spacing that separated it from code.
        let bytes = source.as_bytes();
        let mut ws_start = start;
        while ws_start > 0 && (bytes[ws_start - 1] == b' ' || bytes[ws_start - 1] == b'\t') {
            ws_start -= 1;
        }
        Edit {
            start: ws_start,
            end,
            replacement: String::new(),
        }
    }
}

/// True when only whitespace precedes `start` on its line and only
/// whitespace (or end of input) follows `end` on its line.
fn occupies_own_lines(source: &str, start: usize, end: usize) -> bool {
    let bytes = source.as_bytes();
    let mut i = start;
    while i > 0 && bytes[i - 1] != b'\n' {
        if bytes[i - 1] != b' ' && bytes[i - 1] != b'\t' {
            return false;
        }
        i -= 1;
    }
    let mut j = end;
    while j < bytes.len() && bytes[j] != b'\n' {
        if bytes[j] != b' ' && bytes[j] != b'\t' {
            return false;
        }
        j += 1;
    }
    true
}

/// Widen a span to whole lines, including the trailing newline.
fn expand_to_lines(source: &str, start: usize, end: usize) -> (usize, usize) {
    let bytes = source.as_bytes();
    let mut line_start = start;
    while line_start > 0 && bytes[line_start - 1] != b'\n' {
        line_start -= 1;
    }
    let mut line_end = end;
    while line_end < bytes.len() && bytes[line_end] != b'\n' {
        line_end += 1;
    }
    if line_end < bytes.len() {
        line_end += 1;
    }
    (line_start, line_end)
}
