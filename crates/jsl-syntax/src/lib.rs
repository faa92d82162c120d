//! Parser for the JSL shading language.
//!
//! This crate turns JSL source text into an untyped parse tree:
//! - Type keywords (float3, int2, sampler, ...)
//! - Expressions with C-like precedence
//! - Statements and declarations
//! - Function definitions and glue blocks
//!
//! Name resolution and type checking happen later, in `jslc`.

#![no_std]

extern crate alloc;

mod parser;
pub mod syntax;

pub use parser::{parse_expression, parse_translation_unit, ParseError};
