//! The Starlark sub-checker.
//!
//! Statement lists are serialized to a canonical form with comments and
//! docstrings removed, then compared byte-for-byte. A docstring is a bare
//! string literal appearing as the first statement of a module or a
//! function body.

use crate::canon;
use crate::syntax::parse_raw;
use anyhow::Result;
use log::trace;
use semdiff_core::{Checker, FilePair, LightContext, util};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::LazyLock;
use tree_sitter::{Language, Node};

static LANGUAGE: LazyLock<Language> = LazyLock::new(|| tree_sitter_python::LANGUAGE.into());

#[derive(Debug)]
pub struct Starlark;

impl Starlark {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for Starlark {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for Starlark {
    fn claims(&self, path: &Path) -> bool {
        util::has_suffix(path, ".star")
    }

    fn compare(&mut self, _context: &LightContext, files: &[FilePair]) -> Result<bool> {
        for pair in files {
            if pair.byte_equal() {
                continue;
            }
            let equal = match (pair.base_text()?, pair.last_text()?) {
                (Some(base), Some(last)) => {
                    canonical(&pair.path, base)? == canonical(&pair.path, last)?
                }
                (Some(only), None) | (None, Some(only)) => {
                    canonical(&pair.path, only)? == "(module)"
                }
                (None, None) => true,
            };
            trace!("`{}`: equal = {equal}", pair.path.display());
            if !equal {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn canonical(path: &Path, text: &str) -> Result<String> {
    let tree = parse_raw(&LANGUAGE, path, text)?;
    let mut out = String::new();
    write_node(&mut out, tree.root_node(), text);
    Ok(out)
}

fn write_node(out: &mut String, node: Node, source: &str) {
    if canon::is_trivia(node) {
        return;
    }
    let mut cursor = node.walk();
    let children = node.children(&mut cursor).collect::<Vec<_>>();
    if children.is_empty() {
        let _ = write!(out, "({} {:?})", node.kind(), &source[node.byte_range()]);
        return;
    }
    out.push('(');
    out.push_str(node.kind());
    let strip_docstring = matches!(node.kind(), "module" | "block");
    let mut leading = true;
    for child in children {
        if canon::is_trivia(child) {
            continue;
        }
        if strip_docstring && leading {
            leading = false;
            if is_docstring(child) {
                continue;
            }
        }
        write_node(out, child, source);
    }
    out.push(')');
}

fn is_docstring(node: Node) -> bool {
    node.kind() == "expression_statement"
        && node.named_child_count() == 1
        && node
            .named_child(0)
            .is_some_and(|child| child.kind() == "string")
}
