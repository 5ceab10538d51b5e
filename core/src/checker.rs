use crate::{Error, LightContext};
use anyhow::Result;
use heck::ToKebabCase;
use std::{
    any::type_name,
    path::{Path, PathBuf},
};

/// One changed file, with its raw contents in each revision.
///
/// `None` means the file is absent from that revision. The driver reads both
/// sides up front so that checkers stay free of filesystem concerns. Contents
/// are bytes, not text: only a checker that parses text pays for (and may
/// fail) UTF-8 decoding, so binary files still reach the byte-equality
/// fallback.
#[derive(Clone, Debug)]
pub struct FilePair {
    /// Path relative to both revision roots.
    pub path: PathBuf,
    pub base: Option<Vec<u8>>,
    pub last: Option<Vec<u8>>,
}

impl FilePair {
    #[must_use]
    pub fn byte_equal(&self) -> bool {
        self.base == self.last
    }

    /// UTF-8 view of the base side, for checkers that parse text.
    pub fn base_text(&self) -> Result<Option<&str>> {
        self.text(self.base.as_deref())
    }

    /// UTF-8 view of the last side, for checkers that parse text.
    pub fn last_text(&self) -> Result<Option<&str>> {
        self.text(self.last.as_deref())
    }

    /// A claimed file that a text-mode checker cannot decode is a fatal
    /// parse error, not a verdict.
    fn text<'a>(&self, side: Option<&'a [u8]>) -> Result<Option<&'a str>> {
        let Some(bytes) = side else {
            return Ok(None);
        };
        let text = std::str::from_utf8(bytes)
            .map_err(|_| Error::parse(&self.path, "source is not valid UTF-8"))?;
        Ok(Some(text))
    }
}

/// A format-aware sub-checker.
///
/// The driver asks each checker in registry order whether it claims a file;
/// the first claimer wins. A checker then receives every file it claimed, in
/// the order the driver was given them, and reports whether the two
/// revisions are equivalent under its domain rules.
pub trait Checker {
    #[allow(clippy::unwrap_used)]
    fn name(&self) -> String {
        let (_, type_name) = type_name::<Self>().rsplit_once("::").unwrap();
        type_name.to_kebab_case()
    }

    /// Whether this checker is responsible for `path`.
    fn claims(&self, path: &Path) -> bool;

    /// Compares all claimed files. `Ok(true)` means every pair is equivalent.
    fn compare(&mut self, context: &LightContext, files: &[FilePair]) -> Result<bool>;
}

/// Conversion from a checker identifier to a boxed implementation.
pub trait ToChecker {
    fn to_checker(&self, context: &LightContext) -> Result<Box<dyn Checker>>;
}
