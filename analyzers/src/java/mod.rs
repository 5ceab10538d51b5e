//! The Java sub-checker.

mod builder;
pub(crate) mod scope;

use crate::mast::Lang;
use crate::pipeline::{self, LangOps};
use crate::syntax::Grammar;
use anyhow::Result;
use semdiff_core::{Checker, FilePair, LightContext, util};
use std::path::Path;
use std::sync::LazyLock;
use tree_sitter::Language;

static LANGUAGE: LazyLock<Language> = LazyLock::new(|| tree_sitter_java::LANGUAGE.into());

/// Modifier keywords, module keywords, dimension brackets, and the update
/// operators are semantically significant unnamed tokens.
fn keep_token(parent: &str, token: &str) -> bool {
    match parent {
        "modifiers" => true,
        "import_declaration" => token == "static",
        "module_declaration" => token == "open",
        "update_expression" => matches!(token, "++" | "--"),
        "method_reference" => token == "new",
        "wildcard" => matches!(token, "extends" | "super"),
        "dimensions" => token == "[",
        _ => false,
    }
}

fn grammar() -> Grammar {
    Grammar {
        name: "java",
        language: LANGUAGE.clone(),
        keep_token,
        leaf_kinds: &["string_literal", "character_literal", "text_block"],
    }
}

const OPS: LangOps = LangOps {
    lang: Lang::Java,
    grammar,
    build: builder::build,
    symbolicate: scope::symbolicate,
};

#[derive(Debug)]
pub struct Java;

impl Java {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for Java {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for Java {
    fn claims(&self, path: &Path) -> bool {
        util::has_suffix(path, ".java")
    }

    fn compare(&mut self, context: &LightContext, files: &[FilePair]) -> Result<bool> {
        pipeline::compare(context, files, &OPS)
    }
}
