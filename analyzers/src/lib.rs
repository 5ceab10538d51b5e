#![warn(clippy::expect_used)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::panic)]

use anyhow::Result;
use heck::ToKebabCase;
use semdiff_core::{Checker, LightContext, ToChecker};
use strum_macros::EnumIter;

// Sub-checker modules

mod bazel;
use bazel::Bazel;

mod fallback;
use fallback::{Fallback, Markdown};

mod go;
use go::Go;

mod gomod;
use gomod::GoMod;

mod java;
use java::Java;

mod proto;
use proto::Protobuf;

mod sql;
use sql::Sql;

mod starlark;
use starlark::Starlark;

mod thrift;
use thrift::Thrift;

mod yaml;
use yaml::Yaml;

// Engine modules

mod canon;
mod code_eq;
mod mast;
mod pipeline;
mod rename;
mod symbols;
mod syntax;

#[derive(Debug, Clone, Copy, EnumIter, Eq, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
#[remain::sorted]
pub enum Identifier {
    Bazel,
    Fallback,
    Go,
    GoMod,
    Java,
    Markdown,
    Protobuf,
    Sql,
    Starlark,
    Thrift,
    Yaml,
}

impl ToChecker for Identifier {
    fn to_checker(&self, context: &LightContext) -> Result<Box<dyn Checker>> {
        Ok(match *self {
            Self::Bazel => Box::new(Bazel::new(context.opts.bazel_file.clone())),
            Self::Fallback => Box::new(Fallback::new()),
            Self::Go => Box::new(Go::new()),
            Self::GoMod => Box::new(GoMod::new()),
            Self::Java => Box::new(Java::new()),
            Self::Markdown => Box::new(Markdown::new()),
            Self::Protobuf => Box::new(Protobuf::new()),
            Self::Sql => Box::new(Sql::new()),
            Self::Starlark => Box::new(Starlark::new()),
            Self::Thrift => Box::new(Thrift::new()),
            Self::Yaml => Box::new(Yaml::new()),
        })
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format!("{self:?}").to_kebab_case())
    }
}

/// Dispatch order. First claimer wins, so the configurable Bazel basename
/// comes before the suffix checkers and the byte-equality fallback is
/// last.
const DISPATCH_ORDER: &[Identifier] = &[
    Identifier::Bazel,
    Identifier::Starlark,
    Identifier::Protobuf,
    Identifier::Thrift,
    Identifier::Sql,
    Identifier::Yaml,
    Identifier::GoMod,
    Identifier::Go,
    Identifier::Java,
    Identifier::Markdown,
    Identifier::Fallback,
];

/// The full checker registry, in dispatch order.
pub fn checkers(context: &LightContext) -> Result<Vec<Box<dyn Checker>>> {
    DISPATCH_ORDER
        .iter()
        .map(|identifier| identifier.to_checker(context))
        .collect()
}

#[cfg(test)]
mod test {
    use super::{DISPATCH_ORDER, Identifier};
    use strum::IntoEnumIterator;

    #[test]
    fn dispatch_covers_every_identifier() {
        for identifier in Identifier::iter() {
            assert!(
                DISPATCH_ORDER.contains(&identifier),
                "{identifier} is not dispatched"
            );
        }
    }

    #[test]
    fn fallback_is_last() {
        assert_eq!(Some(&Identifier::Fallback), DISPATCH_ORDER.last());
    }
}
