//! The Go sub-checker.

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

static LANGUAGE: LazyLock<Language> = LazyLock::new(|| tree_sitter_go::LANGUAGE.into());

/// Unnamed tokens that change meaning: declaration vs assignment in range
/// and receive clauses, channel direction markers, the variadic spread,
/// and the update operators.
fn keep_token(parent: &str, token: &str) -> bool {
    matches!(
        (parent, token),
        ("range_clause", "=" | ":=")
            | ("receive_statement", "=" | ":=")
            | ("channel_type", "chan" | "<-")
            | ("argument_list", "...")
            | ("inc_statement", "++")
            | ("dec_statement", "--")
            | ("type_switch_statement", ":=")
    )
}

fn grammar() -> Grammar {
    Grammar {
        name: "go",
        language: LANGUAGE.clone(),
        keep_token,
        leaf_kinds: &[
            "interpreted_string_literal",
            "raw_string_literal",
            "rune_literal",
        ],
    }
}

const OPS: LangOps = LangOps {
    lang: Lang::Go,
    grammar,
    build: builder::build,
    symbolicate: scope::symbolicate,
};

#[derive(Debug)]
pub struct Go;

impl Go {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for Go {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for Go {
    fn claims(&self, path: &Path) -> bool {
        util::has_suffix(path, ".go")
    }

    fn compare(&mut self, context: &LightContext, files: &[FilePair]) -> Result<bool> {
        pipeline::compare(context, files, &OPS)
    }
}
