//! The protobuf sub-checker.
//!
//! Each side parses to a `FileDescriptorProto`. Comments and positions
//! live exclusively in `source_code_info`, so clearing that field and
//! comparing descriptors is the canonical comparison the format needs.

use anyhow::Result;
use log::trace;
use prost_types::FileDescriptorProto;
use semdiff_core::{Checker, Error, FilePair, LightContext, util};
use std::path::Path;

#[derive(Debug)]
pub struct Protobuf;

impl Protobuf {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for Protobuf {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for Protobuf {
    fn claims(&self, path: &Path) -> bool {
        util::has_suffix(path, ".proto")
    }

    fn compare(&mut self, _context: &LightContext, files: &[FilePair]) -> Result<bool> {
        for pair in files {
            if pair.byte_equal() {
                continue;
            }
            let equal = match (pair.base_text()?, pair.last_text()?) {
                (Some(base), Some(last)) => {
                    descriptor(&pair.path, base)? == descriptor(&pair.path, last)?
                }
                // A descriptor is never empty (it carries at least the file
                // name), so an added or removed proto file always rejects.
                (Some(_), None) | (None, Some(_)) => false,
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

fn descriptor(path: &Path, text: &str) -> Result<FileDescriptorProto> {
    let name = path.to_string_lossy();
    let mut descriptor = protox_parse::parse(&name, text)
        .map_err(|error| Error::parse(path, error.to_string()))?;
    descriptor.source_code_info = None;
    Ok(descriptor)
}
