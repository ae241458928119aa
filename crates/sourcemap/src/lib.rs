#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Sourcemap handling for crumbs
//!
//! Parsing of published `.map` files and the validator adapter that checks
//! whether a map's positions resolve against plausible original sources.

mod raw;
mod text;
mod validate;

pub use raw::{parse_sourcemap, RawSourceMap};
pub use validate::{validate_guarded, SourcemapValidator, StructuralValidator};
