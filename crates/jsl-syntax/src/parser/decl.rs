//! Declarations, function definitions and glue blocks.

use alloc::{string::ToString, vec::Vec};

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    combinator::{map, opt},
    multi::{separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use super::{
    expr::expr,
    primitives::{identifier, keyword, storage_qualifier, symbol, type_name},
    stmt::compound_statement,
    whitespace::blank,
};
use crate::syntax::{
    Declaration, Declarator, ExternalDeclaration, FunctionDefinition, ParamDeclaration, TypeName,
};

fn declarator(input: &str) -> IResult<&str, Declarator> {
    map(
        tuple((
            identifier,
            opt(delimited(symbol("["), expr, symbol("]"))),
            opt(preceded(symbol("="), expr)),
        )),
        |(name, array_len, initializer)| Declarator {
            name,
            array_len,
            initializer,
        },
    )(input)
}

/// `[const|param] type name [ '[' len ']' ] [= init] {, ...} ;`
pub(crate) fn declaration(input: &str) -> IResult<&str, Declaration> {
    map(
        terminated(
            tuple((
                opt(storage_qualifier),
                type_name,
                separated_list1(symbol(","), declarator),
            )),
            symbol(";"),
        ),
        |(qualifier, ty, declarators)| Declaration {
            qualifier,
            ty,
            declarators,
        },
    )(input)
}

fn param_declaration(input: &str) -> IResult<&str, ParamDeclaration> {
    map(pair(type_name, identifier), |(ty, name)| ParamDeclaration {
        ty,
        name,
    })(input)
}

fn param_list(input: &str) -> IResult<&str, Vec<ParamDeclaration>> {
    delimited(
        symbol("("),
        alt((
            // `f(void)` is the same as `f()`
            map(keyword(TypeName::Void.keyword()), |_| Vec::new()),
            separated_list0(symbol(","), param_declaration),
        )),
        symbol(")"),
    )(input)
}

pub(crate) fn function_definition(input: &str) -> IResult<&str, FunctionDefinition> {
    map(
        tuple((type_name, identifier, param_list, compound_statement)),
        |(return_type, name, params, body)| FunctionDefinition {
            return_type,
            name,
            params,
            body,
        },
    )(input)
}

/// `{% raw text %}`
fn glue_block(input: &str) -> IResult<&str, &str> {
    preceded(blank, delimited(tag("{%"), take_until("%}"), tag("%}")))(input)
}

pub(crate) fn external_declaration(input: &str) -> IResult<&str, ExternalDeclaration> {
    alt((
        map(glue_block, |text| ExternalDeclaration::Glue(text.to_string())),
        map(function_definition, ExternalDeclaration::Function),
        map(declaration, ExternalDeclaration::Declaration),
    ))(input)
}
