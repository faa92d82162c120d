//! Parser for JSL source text.

mod decl;
mod error;
mod expr;
mod primitives;
mod stmt;
mod whitespace;

use alloc::format;

use nom::{combinator::all_consuming, multi::many0, sequence::terminated};

use error::parse_error;
pub use error::ParseError;
use whitespace::blank;

use crate::syntax::{Expr, TranslationUnit};

/// Turn a nom failure into a positioned error against `original`.
fn nom_error(original: &str, e: nom::Err<nom::error::Error<&str>>) -> ParseError {
    match e {
        nom::Err::Error(inner) | nom::Err::Failure(inner) => parse_error(
            original,
            inner.input,
            &format!("unexpected input ({:?})", inner.code),
        ),
        nom::Err::Incomplete(_) => parse_error(original, "", "unexpected end of input"),
    }
}

/// Parse a complete source file.
pub fn parse_translation_unit(input: &str) -> Result<TranslationUnit, ParseError> {
    match terminated(many0(decl::external_declaration), blank)(input) {
        Ok(("", decls)) => Ok(TranslationUnit { decls }),
        Ok((remaining, _)) => {
            // Re-run the failing declaration to report where it stopped.
            match decl::external_declaration(remaining) {
                Err(e) => Err(nom_error(input, e)),
                Ok(_) => Err(parse_error(
                    input,
                    remaining,
                    &format!("unexpected input remaining: {}", remaining),
                )),
            }
        }
        Err(e) => Err(nom_error(input, e)),
    }
}

/// Parse a single expression, e.g. for tests and tooling.
pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
    all_consuming(terminated(expr::expr, blank))(input)
        .map(|(_, e)| e)
        .map_err(|e| nom_error(input, e))
}
