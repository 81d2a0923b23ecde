//! csdoc: extract type declarations and their XML documentation from C# sources.
//!
//! The pipeline is scanner → extractor → renderer:
//!
//! - [`scanner`] splits text into comment and code tokens, skipping literals.
//! - [`parser`] finds `class`/`struct`/`interface`/`enum` declarations and
//!   attaches the preceding `///` run as a [`model::DocBlock`].
//! - [`render`] turns the results into table, json, markdown or template output.

pub mod discover;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod scanner;
pub mod toc;

pub use error::{Error, Result};
pub use parser::{parse, parse_file};
