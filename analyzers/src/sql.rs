//! The SQL sub-checker.
//!
//! Statements are compared pairwise for structural equality after comments
//! and marginalia are dropped; differing statement counts reject.

use crate::canon;
use crate::syntax::parse_raw;
use anyhow::Result;
use log::trace;
use semdiff_core::{Checker, FilePair, LightContext, util};
use std::path::Path;
use std::sync::LazyLock;
use tree_sitter::{Language, Node};

static LANGUAGE: LazyLock<Language> = LazyLock::new(|| tree_sitter_sequel::LANGUAGE.into());

#[derive(Debug)]
pub struct Sql;

impl Sql {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for Sql {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for Sql {
    fn claims(&self, path: &Path) -> bool {
        util::has_suffix(path, ".sql")
    }

    fn compare(&mut self, _context: &LightContext, files: &[FilePair]) -> Result<bool> {
        for pair in files {
            if pair.byte_equal() {
                continue;
            }
            let equal = match (pair.base_text()?, pair.last_text()?) {
                (Some(base), Some(last)) => files_equal(&pair.path, base, last)?,
                (Some(only), None) | (None, Some(only)) => {
                    statement_forms(&pair.path, only)?.is_empty()
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

fn files_equal(path: &Path, base: &str, last: &str) -> Result<bool> {
    let base_stmts = statement_forms(path, base)?;
    let last_stmts = statement_forms(path, last)?;
    Ok(base_stmts.len() == last_stmts.len()
        && base_stmts
            .iter()
            .zip(&last_stmts)
            .all(|(a, b)| a == b))
}

fn statement_forms(path: &Path, text: &str) -> Result<Vec<String>> {
    let tree = parse_raw(&LANGUAGE, path, text)?;
    let root = tree.root_node();
    let mut cursor = root.walk();
    Ok(root
        .named_children(&mut cursor)
        .filter(|node: &Node<'_>| !canon::is_trivia(*node))
        .map(|node| canon::serialize(node, text))
        .collect())
}
