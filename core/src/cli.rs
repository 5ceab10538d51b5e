use crate::Semdiff;
use clap::{Parser, crate_version};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(
    version = crate_version!(),
    about = "Decides whether two revisions of a set of files are semantically \
             equivalent for the purpose of auto-approving review diffs"
)]
#[remain::sorted]
pub struct Opts {
    #[clap(long, value_name = "DIR", help = "Root directory of the base revision")]
    base: PathBuf,
    #[clap(
        long,
        value_name = "NAME",
        default_value = "BUILD.bazel",
        help = "Basename of analyzable Bazel build files"
    )]
    bazel_file: String,
    #[clap(long, value_name = "DIR", help = "Root directory of the last revision")]
    last: PathBuf,
    #[clap(long, help = "Tolerate logging-call remixes")]
    logging: bool,
    #[clap(long, help = "Do not canonicalize identifier names (debugging aid)")]
    no_renaming: bool,
    #[clap(
        value_name = "FILES",
        required = true,
        help = "Changed file paths, relative to both roots"
    )]
    zfiles: Vec<PathBuf>,
}

impl From<Opts> for Semdiff {
    fn from(opts: Opts) -> Self {
        let Opts {
            base,
            bazel_file,
            last,
            logging,
            no_renaming,
            zfiles,
        } = opts;
        Self {
            base,
            last,
            files: zfiles,
            logging,
            renaming: !no_renaming,
            bazel_file,
        }
    }
}
