use crate::{Checker, Error, FilePair, Verdict};
use anyhow::{Context as _, Result, ensure};
use log::debug;
use std::{io::ErrorKind, path::Path, path::PathBuf};

/// Options controlling a single run.
#[derive(Clone, Debug)]
pub struct Semdiff {
    /// Root directory of the base revision.
    pub base: PathBuf,
    /// Root directory of the last revision.
    pub last: PathBuf,
    /// Changed file paths, relative to both roots, in review order.
    pub files: Vec<PathBuf>,
    /// Enables the logging-remix tolerance.
    pub logging: bool,
    /// Enables canonical renaming. On in practice; off only as a debugging aid.
    pub renaming: bool,
    /// Basename of analyzable Bazel build files.
    pub bazel_file: String,
}

impl Default for Semdiff {
    fn default() -> Self {
        Self {
            base: PathBuf::new(),
            last: PathBuf::new(),
            files: Vec::new(),
            logging: false,
            renaming: true,
            bazel_file: "BUILD.bazel".to_owned(),
        }
    }
}

pub struct LightContext<'a> {
    pub opts: &'a Semdiff,
}

/// Main entrypoint: dispatches each changed file to exactly one sub-checker
/// and aggregates the verdicts.
///
/// The verdict is `Approve` iff every checker reports equal. Checkers are
/// consulted in registry order and the first claimer wins, so the fallback
/// byte-equality checker must be registered last.
pub fn analyze(opts: &Semdiff, mut checkers: Vec<Box<dyn Checker>>) -> Result<Verdict> {
    ensure!(!checkers.is_empty(), "no checkers were registered");

    let context = LightContext { opts };

    let mut assignments: Vec<Vec<FilePair>> = checkers.iter().map(|_| Vec::new()).collect();

    for path in &opts.files {
        let base = read_revision(&opts.base, path)?;
        let last = read_revision(&opts.last, path)?;

        let index = checkers
            .iter()
            .position(|checker| checker.claims(path))
            .ok_or_else(|| {
                Error::invariant(format!("no checker claimed `{}`", path.display()))
            })?;

        debug!("`{}` -> {}", path.display(), checkers[index].name());

        assignments[index].push(FilePair {
            path: path.clone(),
            base,
            last,
        });
    }

    for (checker, files) in checkers.iter_mut().zip(assignments) {
        if files.is_empty() {
            continue;
        }

        let equal = checker
            .compare(&context, &files)
            .with_context(|| format!("checker {} failed", checker.name()))?;

        debug!("{}: equal = {}", checker.name(), equal);

        if !equal {
            return Ok(Verdict::Reject);
        }
    }

    Ok(Verdict::Approve)
}

fn read_revision(root: &Path, path: &Path) -> Result<Option<Vec<u8>>> {
    let joined = root.join(path);
    match std::fs::read(&joined) {
        Ok(contents) => Ok(Some(contents)),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
        Err(error) => Err(Error::Io(error))
            .with_context(|| format!("failed to read `{}`", joined.display())),
    }
}
