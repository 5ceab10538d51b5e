//! The go.mod sub-checker.
//!
//! Comment-only changes are approved; formatting-only changes are not.
//! Line comments are stripped (string-aware), each line is right-trimmed,
//! lines left empty by comment removal disappear entirely, and the result
//! must match byte for byte.

use anyhow::Result;
use log::trace;
use semdiff_core::{Checker, FilePair, LightContext, util};
use std::path::Path;

#[derive(Debug)]
pub struct GoMod;

impl GoMod {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for GoMod {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for GoMod {
    fn claims(&self, path: &Path) -> bool {
        util::has_suffix(path, "go.mod")
    }

    fn compare(&mut self, _context: &LightContext, files: &[FilePair]) -> Result<bool> {
        for pair in files {
            if pair.byte_equal() {
                continue;
            }
            let equal = match (pair.base_text()?, pair.last_text()?) {
                (Some(base), Some(last)) => strip_comments(base) == strip_comments(last),
                (Some(only), None) | (None, Some(only)) => strip_comments(only).is_empty(),
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

fn strip_comments(text: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        let (stripped, had_comment) = strip_line(line);
        if had_comment && stripped.is_empty() {
            continue;
        }
        out.push_str(stripped);
        out.push('\n');
    }
    out
}

/// `line` minus any `//` comment (quotes and backquotes respected),
/// right-trimmed, plus whether a comment was removed.
fn strip_line(line: &str) -> (&str, bool) {
    let mut in_quote = false;
    let mut in_backquote = false;
    let mut cut = line.len();
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' if !in_backquote => in_quote = !in_quote,
            b'`' if !in_quote => in_backquote = !in_backquote,
            b'\\' if in_quote => i += 1,
            b'/' if !in_quote && !in_backquote && bytes.get(i + 1) == Some(&b'/') => {
                cut = i;
                break;
            }
            _ => {}
        }
        i += 1;
    }
    (line[..cut].trim_end(), cut < line.len())
}

#[cfg(test)]
mod test {
    use super::strip_comments;

    #[test]
    fn comment_only_changes_vanish() {
        const BASE: &str = "module example.com/m\n\ngo 1.22\n\nrequire a.b/c v1.0.0 // indirect\n";
        const LAST: &str = "module example.com/m\n\ngo 1.22\n\nrequire a.b/c v1.0.0\n";
        assert_eq!(strip_comments(BASE), strip_comments(LAST));
    }

    #[test]
    fn full_line_comments_vanish_entirely() {
        const BASE: &str = "module m\n// note\ngo 1.22\n";
        const LAST: &str = "module m\ngo 1.22\n";
        assert_eq!(strip_comments(BASE), strip_comments(LAST));
    }

    #[test]
    fn formatting_changes_remain_visible() {
        assert_ne!(
            strip_comments("module m\n\ngo 1.22\n"),
            strip_comments("module m\ngo 1.22\n")
        );
    }
}
