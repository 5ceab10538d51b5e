//! The Bazel BUILD sub-checker.
//!
//! BUILD files are Starlark, a Python subset, so the Python grammar parses
//! them. Top-level statements are compared in order after dropping
//! comments and test-rule calls. For approved rules the `deps` argument is
//! compared as a string set: removals are always tolerated, additions only
//! on approved rules; everything else about the call must match exactly.

use crate::canon;
use crate::syntax::parse_raw;
use anyhow::Result;
use log::trace;
use semdiff_core::{Checker, FilePair, LightContext, util};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;
use tree_sitter::{Language, Node};

static LANGUAGE: LazyLock<Language> = LazyLock::new(|| tree_sitter_python::LANGUAGE.into());

const APPROVED_RULES: &[&str] = &[
    "go_binary",
    "go_library",
    "go_test",
    "java_binary",
    "java_library",
    "java_test",
    "starlark_library",
];

const TEST_RULES: &[&str] = &["go_test", "java_test"];

#[derive(Debug)]
pub struct Bazel {
    basename: String,
}

impl Bazel {
    #[must_use]
    pub fn new(basename: impl Into<String>) -> Self {
        Self {
            basename: basename.into(),
        }
    }
}

impl Checker for Bazel {
    fn claims(&self, path: &Path) -> bool {
        util::has_suffix(path, &self.basename)
    }

    fn compare(&mut self, _context: &LightContext, files: &[FilePair]) -> Result<bool> {
        for pair in files {
            if pair.byte_equal() {
                continue;
            }
            let equal = match (pair.base_text()?, pair.last_text()?) {
                (Some(base), Some(last)) => build_files_equal(&pair.path, base, last)?,
                (Some(only), None) | (None, Some(only)) => {
                    effective_statement_count(&pair.path, only)? == 0
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

fn build_files_equal(path: &Path, base: &str, last: &str) -> Result<bool> {
    let base_tree = parse_raw(&LANGUAGE, path, base)?;
    let last_tree = parse_raw(&LANGUAGE, path, last)?;
    let base_stmts = statements(base_tree.root_node(), base);
    let last_stmts = statements(last_tree.root_node(), last);

    if base_stmts.len() != last_stmts.len() {
        return Ok(false);
    }

    for (&a, &b) in base_stmts.iter().zip(&last_stmts) {
        if !statement_equal(a, base, b, last) {
            return Ok(false);
        }
    }
    Ok(true)
}

fn effective_statement_count(path: &Path, text: &str) -> Result<usize> {
    let tree = parse_raw(&LANGUAGE, path, text)?;
    Ok(statements(tree.root_node(), text).len())
}

/// Top-level statements, minus comments and test-rule calls.
fn statements<'t>(root: Node<'t>, text: &str) -> Vec<Node<'t>> {
    let mut cursor = root.walk();
    root.named_children(&mut cursor)
        .filter(|node| !canon::is_trivia(*node))
        .filter(|node| {
            rule_call(*node, text).is_none_or(|(rule, _)| !TEST_RULES.contains(&rule))
        })
        .collect()
}

/// `rule(...)` at statement level: the rule name and the call node.
fn rule_call<'t, 's>(stmt: Node<'t>, text: &'s str) -> Option<(&'s str, Node<'t>)> {
    if stmt.kind() != "expression_statement" || stmt.named_child_count() != 1 {
        return None;
    }
    let call = stmt.named_child(0)?;
    if call.kind() != "call" {
        return None;
    }
    let function = call.child_by_field_name("function")?;
    if function.kind() != "identifier" {
        return None;
    }
    Some((&text[function.byte_range()], call))
}

fn statement_equal(a: Node, a_text: &str, b: Node, b_text: &str) -> bool {
    match (rule_call(a, a_text), rule_call(b, b_text)) {
        (Some((rule_a, call_a)), Some((rule_b, call_b))) if rule_a == rule_b => {
            if !APPROVED_RULES.contains(&rule_a) {
                // Any change to a non-approved rule rejects, no matter
                // which arguments differ.
                return canon::serialize(a, a_text) == canon::serialize(b, b_text);
            }
            rule_equal(call_a, a_text, call_b, b_text)
        }
        _ => canon::serialize(a, a_text) == canon::serialize(b, b_text),
    }
}

fn rule_equal(call_a: Node, a_text: &str, call_b: Node, b_text: &str) -> bool {
    let deps_a = deps_argument(call_a, a_text);
    let deps_b = deps_argument(call_b, b_text);

    let stripped_a = canon::serialize_skipping(call_a, a_text, deps_a.map(|node| node.id()));
    let stripped_b = canon::serialize_skipping(call_b, b_text, deps_b.map(|node| node.id()));
    if stripped_a != stripped_b {
        return false;
    }

    let (Some(set_a), Some(set_b)) = (
        string_set(deps_a, a_text),
        string_set(deps_b, b_text),
    ) else {
        // A non-string element makes the lists incomparable.
        return false;
    };

    // Equal sets, or a strict removal, or a strict addition on this
    // (already known approved) rule.
    set_a == set_b || set_b.is_subset(&set_a) || set_a.is_subset(&set_b)
}

/// The `deps = [...]` keyword argument of a call, if present.
fn deps_argument<'t>(call: Node<'t>, text: &str) -> Option<Node<'t>> {
    let arguments = call.child_by_field_name("arguments")?;
    let mut cursor = arguments.walk();
    let result = arguments.named_children(&mut cursor).find(|argument| {
        argument.kind() == "keyword_argument"
            && argument
                .child_by_field_name("name")
                .is_some_and(|name| &text[name.byte_range()] == "deps")
    });
    result
}

/// The elements of a `deps` list as unquoted strings. `None` when the
/// value is not a list of string literals (or when there is no `deps` at
/// all on one side only — an absent list is the empty set).
fn string_set(deps: Option<Node>, text: &str) -> Option<BTreeSet<String>> {
    let Some(deps) = deps else {
        return Some(BTreeSet::new());
    };
    let value = deps.child_by_field_name("value")?;
    if value.kind() != "list" {
        return None;
    }
    let mut set = BTreeSet::new();
    let mut cursor = value.walk();
    for element in value.named_children(&mut cursor) {
        if canon::is_trivia(element) {
            continue;
        }
        if element.kind() != "string" {
            return None;
        }
        set.insert(string_content(element, text));
    }
    Some(set)
}

/// The unquoted content of a Python string node.
fn string_content(node: Node, text: &str) -> String {
    let mut cursor = node.walk();
    let content = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "string_content")
        .map(|child| &text[child.byte_range()])
        .collect::<String>();
    if content.is_empty() && node.named_child_count() == 0 {
        text[node.byte_range()]
            .trim_matches(|c| c == '"' || c == '\'')
            .to_owned()
    } else {
        content
    }
}
