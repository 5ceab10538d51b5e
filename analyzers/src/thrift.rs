//! The thrift sub-checker.
//!
//! No IDL parser is carried for thrift; the checker tokenizes both sides,
//! which strips comments and layout, and compares the token streams. That
//! is equivalent to comparing a canonical serialization with positions and
//! comments removed.

use anyhow::Result;
use log::trace;
use semdiff_core::{Checker, Error, FilePair, LightContext, util};
use std::path::Path;

#[derive(Debug)]
pub struct Thrift;

impl Thrift {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for Thrift {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for Thrift {
    fn claims(&self, path: &Path) -> bool {
        util::has_suffix(path, ".thrift")
    }

    fn compare(&mut self, _context: &LightContext, files: &[FilePair]) -> Result<bool> {
        for pair in files {
            if pair.byte_equal() {
                continue;
            }
            let equal = match (pair.base_text()?, pair.last_text()?) {
                (Some(base), Some(last)) => {
                    tokens(&pair.path, base)? == tokens(&pair.path, last)?
                }
                (Some(only), None) | (None, Some(only)) => tokens(&pair.path, only)?.is_empty(),
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

/// Tokenizes thrift IDL. Comments (`//`, `#`, `/* */`) disappear; string
/// literals keep their quotes; everything else splits into identifiers,
/// numbers, and single punctuation characters.
fn tokens(path: &Path, text: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            _ if c.is_whitespace() => i += 1,
            '#' => i = skip_line(bytes, i),
            '/' if bytes.get(i + 1) == Some(&b'/') => i = skip_line(bytes, i),
            '/' if bytes.get(i + 1) == Some(&b'*') => {
                let mut j = i + 2;
                while j + 1 < bytes.len() && !(bytes[j] == b'*' && bytes[j + 1] == b'/') {
                    j += 1;
                }
                if j + 1 >= bytes.len() {
                    return Err(Error::parse(path, "unterminated block comment").into());
                }
                i = j + 2;
            }
            '"' | '\'' => {
                let quote = bytes[i];
                let mut j = i + 1;
                while j < bytes.len() && bytes[j] != quote {
                    if bytes[j] == b'\\' {
                        j += 1;
                    }
                    j += 1;
                }
                if j >= bytes.len() {
                    return Err(Error::parse(path, "unterminated string literal").into());
                }
                tokens.push(text[i..=j].to_owned());
                i = j + 1;
            }
            _ if c.is_ascii_alphabetic() || c == '_' => {
                let mut j = i + 1;
                while j < bytes.len()
                    && ((bytes[j] as char).is_ascii_alphanumeric()
                        || bytes[j] == b'_'
                        || bytes[j] == b'.')
                {
                    j += 1;
                }
                tokens.push(text[i..j].to_owned());
                i = j;
            }
            _ if c.is_ascii_digit()
                || (c == '-' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)) =>
            {
                let mut j = i + 1;
                while j < bytes.len()
                    && ((bytes[j] as char).is_ascii_hexdigit()
                        || matches!(bytes[j], b'.' | b'x' | b'X' | b'e' | b'E' | b'+' | b'-'))
                {
                    j += 1;
                }
                tokens.push(text[i..j].to_owned());
                i = j;
            }
            _ => {
                tokens.push(c.to_string());
                i += c.len_utf8();
            }
        }
    }
    Ok(tokens)
}

fn skip_line(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
    }
    i
}

#[cfg(test)]
mod test {
    use super::tokens;
    use std::path::Path;

    #[test]
    fn comments_and_layout_are_invisible() {
        const IDL: &str = "struct User {\n  1: required string name // the name\n}\n";
        const REFORMATTED: &str = "# header\nstruct User { 1: required string name }";
        let path = Path::new("a.thrift");
        assert_eq!(
            tokens(path, IDL).unwrap(),
            tokens(path, REFORMATTED).unwrap()
        );
    }

    #[test]
    fn token_changes_are_visible() {
        let path = Path::new("a.thrift");
        assert_ne!(
            tokens(path, "const i32 N = 1").unwrap(),
            tokens(path, "const i32 N = 2").unwrap()
        );
    }

    #[test]
    fn strings_keep_their_quoting() {
        let path = Path::new("a.thrift");
        assert_ne!(
            tokens(path, r#"const string S = "a""#).unwrap(),
            tokens(path, "const string S = 'a'").unwrap()
        );
    }

    #[test]
    fn unterminated_comment_is_fatal() {
        assert!(tokens(Path::new("a.thrift"), "/* open").is_err());
    }
}
