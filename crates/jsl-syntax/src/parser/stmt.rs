//! Statement parsers.

use alloc::boxed::Box;

use nom::{
    branch::alt,
    combinator::{map, opt},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use super::{
    decl::declaration,
    expr::expr,
    primitives::{keyword, symbol},
};
use crate::syntax::{CompoundStatement, Statement};

pub(crate) fn compound_statement(input: &str) -> IResult<&str, CompoundStatement> {
    map(
        delimited(symbol("{"), many0(statement), symbol("}")),
        |statements| CompoundStatement { statements },
    )(input)
}

fn paren_expr(input: &str) -> IResult<&str, crate::syntax::Expr> {
    delimited(symbol("("), expr, symbol(")"))(input)
}

fn expression_statement(input: &str) -> IResult<&str, Statement> {
    map(terminated(opt(expr), symbol(";")), Statement::Expression)(input)
}

fn if_statement(input: &str) -> IResult<&str, Statement> {
    map(
        tuple((
            preceded(keyword("if"), paren_expr),
            statement,
            opt(preceded(keyword("else"), statement)),
        )),
        |(cond, then_branch, else_branch)| Statement::If {
            cond,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        },
    )(input)
}

fn while_statement(input: &str) -> IResult<&str, Statement> {
    map(
        pair(preceded(keyword("while"), paren_expr), statement),
        |(cond, body)| Statement::While {
            cond,
            body: Box::new(body),
        },
    )(input)
}

fn do_while_statement(input: &str) -> IResult<&str, Statement> {
    map(
        tuple((
            preceded(keyword("do"), statement),
            preceded(keyword("while"), paren_expr),
            symbol(";"),
        )),
        |(body, cond, _)| Statement::DoWhile {
            body: Box::new(body),
            cond,
        },
    )(input)
}

fn for_statement(input: &str) -> IResult<&str, Statement> {
    map(
        tuple((
            preceded(keyword("for"), symbol("(")),
            alt((map(declaration, Statement::Declaration), expression_statement)),
            terminated(opt(expr), symbol(";")),
            terminated(opt(expr), symbol(")")),
            statement,
        )),
        |(_, init, cond, update, body)| Statement::For {
            init: Box::new(init),
            cond,
            update,
            body: Box::new(body),
        },
    )(input)
}

fn jump_statement(input: &str) -> IResult<&str, Statement> {
    alt((
        map(
            delimited(keyword("return"), opt(expr), symbol(";")),
            Statement::Return,
        ),
        map(pair(keyword("break"), symbol(";")), |_| Statement::Break),
        map(pair(keyword("continue"), symbol(";")), |_| {
            Statement::Continue
        }),
        map(pair(keyword("discard"), symbol(";")), |_| Statement::Discard),
    ))(input)
}

pub(crate) fn statement(input: &str) -> IResult<&str, Statement> {
    alt((
        map(compound_statement, Statement::Compound),
        if_statement,
        while_statement,
        do_while_statement,
        for_statement,
        jump_statement,
        // A declaration needs `type name`, so `float3(...)` falls through to
        // the expression statement.
        map(declaration, Statement::Declaration),
        expression_statement,
    ))(input)
}
