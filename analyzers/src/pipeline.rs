//! The shared Go/Java pipeline: parse, build, symbolicate, rename,
//! compare.
//!
//! Files are grouped by parent directory so that all files of a package
//! share one symbol table, and both revisions of a group are prepared
//! before any comparison runs. Group order and in-group file order follow
//! the order the driver supplied.

use crate::code_eq::CodeEq;
use crate::mast::{Lang, Root};
use crate::rename::rename;
use crate::symbols::SymbolTable;
use crate::syntax::{Grammar, SyntaxNode, parse};
use anyhow::Result;
use log::{debug, trace};
use semdiff_core::{FilePair, LightContext};
use std::path::{Path, PathBuf};

pub(crate) struct LangOps {
    pub lang: Lang,
    pub grammar: fn() -> Grammar,
    pub build: fn(&SyntaxNode) -> Result<Root>,
    pub symbolicate: fn(&mut [Root], &mut SymbolTable) -> Result<()>,
}

pub(crate) fn compare(
    context: &LightContext,
    files: &[FilePair],
    ops: &LangOps,
) -> Result<bool> {
    let mut groups: Vec<(PathBuf, Vec<&FilePair>)> = Vec::new();
    for pair in files {
        let dir = pair
            .path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .to_path_buf();
        match groups.iter_mut().find(|(existing, _)| *existing == dir) {
            Some((_, group)) => group.push(pair),
            None => groups.push((dir, vec![pair])),
        }
    }
    for (dir, group) in &groups {
        if !compare_package(context, group, ops)? {
            debug!("package `{}` is not equivalent", dir.display());
            return Ok(false);
        }
    }
    Ok(true)
}

fn compare_package(
    context: &LightContext,
    group: &[&FilePair],
    ops: &LangOps,
) -> Result<bool> {
    if group.iter().all(|pair| pair.byte_equal()) {
        return Ok(true);
    }

    let grammar = (ops.grammar)();
    let mut base_roots = Vec::new();
    let mut last_roots = Vec::new();
    for pair in group {
        base_roots.push(build_side(&grammar, ops, &pair.path, pair.base_text()?)?);
        last_roots.push(build_side(&grammar, ops, &pair.path, pair.last_text()?)?);
    }

    let mut base_table = SymbolTable::new();
    (ops.symbolicate)(&mut base_roots, &mut base_table)?;
    let mut last_table = SymbolTable::new();
    (ops.symbolicate)(&mut last_roots, &mut last_table)?;

    if context.opts.renaming {
        rename(&mut base_table, &mut base_roots);
        rename(&mut last_table, &mut last_roots);
    }

    let eq = CodeEq {
        base: &base_table,
        last: &last_table,
        lang: ops.lang,
        logging: context.opts.logging,
    };
    for ((pair, base), last) in group.iter().zip(&base_roots).zip(&last_roots) {
        let equal = eq.roots(base, last);
        trace!("`{}`: equal = {equal}", pair.path.display());
        if !equal {
            return Ok(false);
        }
    }
    Ok(true)
}

fn build_side(
    grammar: &Grammar,
    ops: &LangOps,
    path: &Path,
    contents: Option<&str>,
) -> Result<Root> {
    match contents {
        None => Ok(Root::empty(ops.lang)),
        Some(text) => {
            let tree = parse(grammar, path, text)?;
            (ops.build)(&tree)
        }
    }
}
