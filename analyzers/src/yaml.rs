//! The YAML sub-checker.
//!
//! Documents are parsed to plain values, which drops comments, anchors'
//! positions, and layout by construction; the value trees are then
//! compared document by document.

use anyhow::Result;
use log::trace;
use semdiff_core::{Checker, Error, FilePair, LightContext, util};
use serde::Deserialize;
use serde_yaml_ng::Value;
use std::path::Path;

#[derive(Debug)]
pub struct Yaml;

impl Yaml {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for Yaml {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker for Yaml {
    fn claims(&self, path: &Path) -> bool {
        util::has_suffix(path, ".yaml")
    }

    fn compare(&mut self, _context: &LightContext, files: &[FilePair]) -> Result<bool> {
        for pair in files {
            if pair.byte_equal() {
                continue;
            }
            let equal = match (pair.base_text()?, pair.last_text()?) {
                (Some(base), Some(last)) => {
                    documents(&pair.path, base)? == documents(&pair.path, last)?
                }
                (Some(only), None) | (None, Some(only)) => documents(&pair.path, only)?
                    .iter()
                    .all(Value::is_null),
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

fn documents(path: &Path, text: &str) -> Result<Vec<Value>> {
    let mut documents = Vec::new();
    for document in serde_yaml_ng::Deserializer::from_str(text) {
        let value = Value::deserialize(document)
            .map_err(|error| Error::parse(path, error.to_string()))?;
        documents.push(value);
    }
    Ok(documents)
}
