//! Checkers of last resort.

use anyhow::Result;
use log::trace;
use semdiff_core::{Checker, FilePair, LightContext, util};
use std::path::Path;

/// Markdown files are trivially approved.
#[derive(Debug)]
pub struct Markdown;

impl Markdown {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for Markdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for Markdown {
    fn claims(&self, path: &Path) -> bool {
        util::has_suffix(path, ".md")
    }

    fn compare(&mut self, _context: &LightContext, _files: &[FilePair]) -> Result<bool> {
        Ok(true)
    }
}

/// Raw byte equality for files no format-aware checker claims. Registered
/// last; claims everything.
#[derive(Debug)]
pub struct Fallback;

impl Fallback {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for Fallback {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for Fallback {
    fn claims(&self, _path: &Path) -> bool {
        true
    }

    fn compare(&mut self, _context: &LightContext, files: &[FilePair]) -> Result<bool> {
        for pair in files {
            if !pair.byte_equal() {
                trace!("`{}` differs", pair.path.display());
                return Ok(false);
            }
        }
        Ok(true)
    }
}
