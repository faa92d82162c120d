//! Primitive parsers for words, symbols, type names and literals.

use alloc::string::{String, ToString};

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, digit0, digit1, one_of, satisfy},
    combinator::{map, map_res, not, opt, recognize, verify},
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use super::whitespace::blank;
use crate::syntax::{StorageQualifier, TypeName};

/// Words that can never be used as identifiers.
const RESERVED: &[&str] = &[
    "const", "param", "if", "else", "while", "do", "for", "return", "break", "continue",
    "discard", "true", "false",
];

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Any identifier-shaped word, reserved or not.
fn word(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(is_ident_start), take_while(is_ident_char)))(input)
}

pub(crate) fn is_reserved(w: &str) -> bool {
    RESERVED.contains(&w) || TypeName::from_keyword(w).is_some()
}

/// Parse a punctuation symbol, skipping leading blanks.
pub(crate) fn symbol<'a>(sym: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(blank, tag(sym))
}

/// Parse a keyword, skipping leading blanks. The keyword must not be the
/// prefix of a longer word.
pub(crate) fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    preceded(blank, terminated(tag(kw), not(satisfy(is_ident_char))))
}

/// Parse a non-reserved identifier.
pub(crate) fn identifier(input: &str) -> IResult<&str, String> {
    map(
        preceded(blank, verify(word, |w: &str| !is_reserved(w))),
        |w: &str| w.to_string(),
    )(input)
}

/// Parse a type keyword.
pub(crate) fn type_name(input: &str) -> IResult<&str, TypeName> {
    map_res(preceded(blank, word), |w: &str| {
        TypeName::from_keyword(w).ok_or(())
    })(input)
}

/// Parse a storage qualifier (`const` or `param`).
pub(crate) fn storage_qualifier(input: &str) -> IResult<&str, StorageQualifier> {
    alt((
        map(keyword("const"), |_| StorageQualifier::Const),
        map(keyword("param"), |_| StorageQualifier::Param),
    ))(input)
}

fn exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

/// Parse a float literal: `1.0`, `1.`, `.5`, `2e3`, `1.5e-2`.
///
/// Values that do not fit a finite f32 are rejected.
pub(crate) fn float_literal(input: &str) -> IResult<&str, f32> {
    let text = alt((
        recognize(tuple((digit1, char('.'), digit0, opt(exponent)))),
        recognize(tuple((char('.'), digit1, opt(exponent)))),
        recognize(pair(digit1, exponent)),
    ));
    map_res(
        preceded(blank, terminated(text, not(satisfy(is_ident_char)))),
        |s: &str| match s.parse::<f32>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(()),
        },
    )(input)
}

/// Parse a decimal integer literal.
pub(crate) fn int_literal(input: &str) -> IResult<&str, i32> {
    map_res(
        preceded(
            blank,
            terminated(digit1, not(satisfy(|c| is_ident_char(c) || c == '.'))),
        ),
        |s: &str| s.parse::<i32>(),
    )(input)
}

/// Parse `true` or `false`.
pub(crate) fn bool_literal(input: &str) -> IResult<&str, bool> {
    alt((map(keyword("true"), |_| true), map(keyword("false"), |_| false)))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("foo"), Ok(("", "foo".to_string())));
        assert_eq!(identifier("  _a1 "), Ok((" ", "_a1".to_string())));
        assert!(identifier("1abc").is_err());
        assert!(identifier("while").is_err());
        assert!(identifier("float3").is_err());
    }

    #[test]
    fn test_identifier_with_keyword_prefix() {
        assert_eq!(identifier("iffy"), Ok(("", "iffy".to_string())));
        assert_eq!(identifier("float3x"), Ok(("", "float3x".to_string())));
    }

    #[test]
    fn test_type_name() {
        assert_eq!(type_name("float3 x"), Ok((" x", TypeName::Float3)));
        assert_eq!(type_name("lsampler"), Ok(("", TypeName::LSampler)));
        assert!(type_name("floaty").is_err());
    }

    #[test]
    fn test_keyword() {
        assert!(keyword("if")(" if (").is_ok());
        assert!(keyword("if")("iffy").is_err());
    }

    #[test]
    fn test_float_literal() {
        assert_eq!(float_literal("1.5"), Ok(("", 1.5)));
        assert_eq!(float_literal("1."), Ok(("", 1.0)));
        assert_eq!(float_literal(".25"), Ok(("", 0.25)));
        assert_eq!(float_literal("2e3"), Ok(("", 2000.0)));
        assert_eq!(float_literal("1.5e-1"), Ok(("", 0.15)));
        assert!(float_literal("42").is_err());
    }

    #[test]
    fn test_float_literal_overflow() {
        assert!(float_literal("1e99").is_err());
    }

    #[test]
    fn test_int_literal() {
        assert_eq!(int_literal("42"), Ok(("", 42)));
        assert_eq!(int_literal("7;"), Ok((";", 7)));
        assert!(int_literal("1.0").is_err());
        assert!(int_literal("99999999999").is_err());
    }

    #[test]
    fn test_bool_literal() {
        assert_eq!(bool_literal("true"), Ok(("", true)));
        assert_eq!(bool_literal(" false)"), Ok((")", false)));
        assert!(bool_literal("trueish").is_err());
    }
}
