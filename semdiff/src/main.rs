#![warn(clippy::expect_used)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::panic)]

use anyhow::Result;
use clap::Parser;
use log::debug;
use semdiff_core::{LightContext, Semdiff, Verdict, analyze, cli};
use std::process::exit;

fn main() {
    env_logger::init();

    let opts: Semdiff = cli::Opts::parse().into();

    match run(&opts) {
        Ok(verdict) => {
            println!("{verdict}");
            exit(verdict.exit_code());
        }
        Err(error) => {
            eprintln!("Error: {error:?}");
            exit(2);
        }
    }
}

fn run(opts: &Semdiff) -> Result<Verdict> {
    debug!(
        "comparing {} files ({} -> {})",
        opts.files.len(),
        opts.base.display(),
        opts.last.display()
    );
    let context = LightContext { opts };
    let checkers = semdiff_analyzers::checkers(&context)?;
    analyze(opts, checkers)
}
