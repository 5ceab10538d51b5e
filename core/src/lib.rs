#![warn(clippy::expect_used)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::panic)]

#[cfg(feature = "clap")]
pub mod cli;

mod checker;
pub use checker::{Checker, FilePair, ToChecker};

mod core;
pub use crate::core::{LightContext, Semdiff, analyze};

mod error;
pub use error::Error;

mod verdict;
pub use verdict::Verdict;

pub mod util;
