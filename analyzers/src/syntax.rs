//! Concrete-tree adapter.
//!
//! This is the only module that touches tree-sitter for Go and Java. It
//! converts a parsed tree into an owned uniform tree with typed node kinds,
//! leaf text, and field-labeled children, keeping unnamed tokens only where
//! they are semantically significant (operators, `chan`/`<-`, `:=` vs `=`,
//! Java modifier keywords, and so on).

use anyhow::Result;
use semdiff_core::Error;
use std::path::Path;
use tree_sitter::{Language, Node, Parser};

/// How a grammar maps onto the uniform tree.
pub struct Grammar {
    /// Language name used in diagnostics.
    pub name: &'static str,
    pub language: Language,
    /// Which unnamed tokens to keep, given the parent node's kind.
    pub keep_token: fn(parent_kind: &str, token: &str) -> bool,
    /// Node kinds captured as leaves even when the grammar gives them
    /// children (string literals, whose escape-sequence sub-nodes are
    /// dropped in favor of the exact source text).
    pub leaf_kinds: &'static [&'static str],
}

/// One node of the uniform concrete tree.
#[derive(Clone, Debug)]
pub struct SyntaxNode {
    kind: &'static str,
    field: Option<&'static str>,
    text: Option<String>,
    children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    #[must_use]
    pub fn kind(&self) -> &str {
        self.kind
    }

    /// The grammar field this node fills in its parent, if any.
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        self.field
    }

    /// Leaf text. Empty for interior nodes.
    #[must_use]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    #[must_use]
    pub fn children(&self) -> &[SyntaxNode] {
        &self.children
    }

    /// The first child labeled `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&SyntaxNode> {
        self.children
            .iter()
            .find(|child| child.field == Some(name))
    }

    /// All children labeled `name`, in order.
    pub fn fields<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SyntaxNode> {
        self.children
            .iter()
            .filter(move |child| child.field.as_deref() == Some(name))
    }

    /// Children of the given kind, in order.
    pub fn children_of_kind<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = &'a SyntaxNode> {
        self.children.iter().filter(move |child| child.kind == kind)
    }

    /// Whether any kept child token has exactly this kind.
    #[must_use]
    pub fn has_token(&self, token: &str) -> bool {
        self.children.iter().any(|child| child.kind == token)
    }
}

/// Parses `text` and converts the result.
///
/// An ERROR or MISSING node anywhere in the parse is fatal: the caller gets
/// an [`Error::Parse`] naming the first offending position, never a verdict.
pub fn parse(grammar: &Grammar, path: &Path, text: &str) -> Result<SyntaxNode> {
    let mut parser = Parser::new();
    parser
        .set_language(&grammar.language)
        .map_err(|error| Error::parse(path, format!("failed to load grammar: {error}")))?;
    let tree = parser
        .parse(text, None)
        .ok_or_else(|| Error::parse(path, "parser returned no tree"))?;

    let root = tree.root_node();
    if root.has_error() {
        let message = first_error(root).map_or_else(
            || "syntax error".to_owned(),
            |node| {
                let point = node.start_position();
                format!(
                    "syntax error at {}:{}",
                    point.row + 1,
                    point.column + 1
                )
            },
        );
        return Err(Error::parse(path, message).into());
    }

    Ok(convert(grammar, root, text, None))
}

/// Parses without converting, for checkers that walk the tree-sitter tree
/// directly. The same ERROR/MISSING policy applies.
pub fn parse_raw(language: &Language, path: &Path, text: &str) -> Result<tree_sitter::Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(language)
        .map_err(|error| Error::parse(path, format!("failed to load grammar: {error}")))?;
    let tree = parser
        .parse(text, None)
        .ok_or_else(|| Error::parse(path, "parser returned no tree"))?;
    if tree.root_node().has_error() {
        let message = first_error(tree.root_node()).map_or_else(
            || "syntax error".to_owned(),
            |node| {
                let point = node.start_position();
                format!("syntax error at {}:{}", point.row + 1, point.column + 1)
            },
        );
        return Err(Error::parse(path, message).into());
    }
    Ok(tree)
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children = node.children(&mut cursor).collect::<Vec<_>>();
    children.into_iter().find_map(first_error)
}

const DROPPED_KINDS: &[&str] = &[
    "comment",
    "line_comment",
    "block_comment",
    "empty_statement",
];

fn convert(
    grammar: &Grammar,
    node: Node,
    text: &str,
    field: Option<&'static str>,
) -> SyntaxNode {
    let kind = node.kind();

    if grammar.leaf_kinds.contains(&kind) {
        return leaf(node, text, field);
    }

    let mut children = Vec::new();
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            let child_field = cursor.field_name();
            let child_kind = child.kind();

            let keep = if child.is_extra() || DROPPED_KINDS.contains(&child_kind) {
                false
            } else if child.is_named() {
                true
            } else {
                child_field == Some("operator") || (grammar.keep_token)(kind, child_kind)
            };

            if keep {
                children.push(convert(grammar, child, text, child_field));
            }

            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    if children.is_empty() {
        leaf(node, text, field)
    } else {
        SyntaxNode {
            kind,
            field,
            text: None,
            children,
        }
    }
}

fn leaf(node: Node, text: &str, field: Option<&'static str>) -> SyntaxNode {
    SyntaxNode {
        kind: node.kind(),
        field,
        text: Some(text[node.byte_range()].to_owned()),
        children: Vec::new(),
    }
}

#[cfg(test)]
mod test {
    use super::{Grammar, parse};
    use std::path::Path;

    fn go_grammar() -> Grammar {
        Grammar {
            name: "go",
            language: tree_sitter_go::LANGUAGE.into(),
            keep_token: |_, _| false,
            leaf_kinds: &["interpreted_string_literal", "raw_string_literal"],
        }
    }

    #[test]
    fn fields_are_indexed() {
        let tree = parse(
            &go_grammar(),
            Path::new("a.go"),
            "package p\n\nfunc f() int { return 1 }\n",
        )
        .unwrap();
        let func = tree
            .children_of_kind("function_declaration")
            .next()
            .unwrap();
        assert_eq!("f", func.field("name").unwrap().text());
    }

    #[test]
    fn comments_are_dropped() {
        let with = parse(
            &go_grammar(),
            Path::new("a.go"),
            "package p\n\n// comment\nfunc f() {}\n",
        )
        .unwrap();
        let without = parse(&go_grammar(), Path::new("a.go"), "package p\n\nfunc f() {}\n")
            .unwrap();
        assert_eq!(format!("{with:?}"), format!("{without:?}"));
    }

    #[test]
    fn error_nodes_are_fatal() {
        let result = parse(&go_grammar(), Path::new("a.go"), "package p\n\nfunc f( {\n");
        assert!(result.is_err());
    }
}
