//! Expression parsers, one function per precedence level.

use alloc::{boxed::Box, vec::Vec};

use nom::{
    branch::alt,
    character::complete::{char, one_of},
    combinator::{map, not, opt},
    multi::separated_list0,
    sequence::{delimited, preceded, terminated},
    IResult,
};

use super::primitives::{
    bool_literal, float_literal, identifier, int_literal, symbol, type_name,
};
use crate::syntax::{AssignmentOp, BinaryOp, Expr, UnaryOp};

type ExprParser = fn(&str) -> IResult<&str, Expr>;
type OpParser = fn(&str) -> IResult<&str, BinaryOp>;

/// Parse a full expression (assignment level).
pub(crate) fn expr(input: &str) -> IResult<&str, Expr> {
    assignment(input)
}

fn assignment_op(input: &str) -> IResult<&str, AssignmentOp> {
    alt((
        map(terminated(symbol("="), not(char('='))), |_| {
            AssignmentOp::Equal
        }),
        map(symbol("+="), |_| AssignmentOp::Add),
        map(symbol("-="), |_| AssignmentOp::Sub),
        map(symbol("*="), |_| AssignmentOp::Mult),
        map(symbol("/="), |_| AssignmentOp::Div),
    ))(input)
}

/// Assignment is right associative. The left side is parsed as any
/// higher-precedence expression; lvalue rules are checked later.
fn assignment(input: &str) -> IResult<&str, Expr> {
    let (rest, lhs) = logical_or(input)?;
    match assignment_op(rest) {
        Ok((rest, op)) => {
            let (rest, rhs) = assignment(rest)?;
            Ok((rest, Expr::Assignment(op, Box::new(lhs), Box::new(rhs))))
        }
        Err(nom::Err::Error(_)) => Ok((rest, lhs)),
        Err(e) => Err(e),
    }
}

/// Parse a left-associative chain of `operand (op operand)*`.
fn binary_chain(input: &str, operand: ExprParser, op: OpParser) -> IResult<&str, Expr> {
    let (mut input, mut lhs) = operand(input)?;
    loop {
        match op(input) {
            Ok((rest, o)) => {
                let (rest, rhs) = operand(rest)?;
                lhs = Expr::Binary(o, Box::new(lhs), Box::new(rhs));
                input = rest;
            }
            Err(nom::Err::Error(_)) => return Ok((input, lhs)),
            Err(e) => return Err(e),
        }
    }
}

fn logical_or(input: &str) -> IResult<&str, Expr> {
    binary_chain(input, logical_xor, |i| map(symbol("||"), |_| BinaryOp::Or)(i))
}

fn logical_xor(input: &str) -> IResult<&str, Expr> {
    binary_chain(input, logical_and, |i| map(symbol("^^"), |_| BinaryOp::Xor)(i))
}

fn logical_and(input: &str) -> IResult<&str, Expr> {
    binary_chain(input, equality, |i| map(symbol("&&"), |_| BinaryOp::And)(i))
}

fn equality(input: &str) -> IResult<&str, Expr> {
    binary_chain(input, relational, |i| {
        alt((
            map(symbol("=="), |_| BinaryOp::Equal),
            map(symbol("!="), |_| BinaryOp::NonEqual),
        ))(i)
    })
}

fn relational(input: &str) -> IResult<&str, Expr> {
    binary_chain(input, additive, |i| {
        alt((
            map(symbol("<="), |_| BinaryOp::Lte),
            map(symbol(">="), |_| BinaryOp::Gte),
            map(symbol("<"), |_| BinaryOp::Lt),
            map(symbol(">"), |_| BinaryOp::Gt),
        ))(i)
    })
}

fn additive(input: &str) -> IResult<&str, Expr> {
    binary_chain(input, multiplicative, |i| {
        alt((
            map(terminated(symbol("+"), not(one_of("+="))), |_| {
                BinaryOp::Add
            }),
            map(terminated(symbol("-"), not(one_of("-="))), |_| {
                BinaryOp::Sub
            }),
        ))(i)
    })
}

fn multiplicative(input: &str) -> IResult<&str, Expr> {
    binary_chain(input, unary, |i| {
        alt((
            map(terminated(symbol("*"), not(char('='))), |_| BinaryOp::Mult),
            map(terminated(symbol("/"), not(char('='))), |_| BinaryOp::Div),
        ))(i)
    })
}

fn unary_op(input: &str) -> IResult<&str, UnaryOp> {
    alt((
        map(symbol("++"), |_| UnaryOp::Inc),
        map(symbol("--"), |_| UnaryOp::Dec),
        map(symbol("+"), |_| UnaryOp::Plus),
        map(symbol("-"), |_| UnaryOp::Minus),
        map(terminated(symbol("!"), not(char('='))), |_| UnaryOp::Not),
    ))(input)
}

fn unary(input: &str) -> IResult<&str, Expr> {
    alt((
        map(preceded_unary, |(op, e)| Expr::Unary(op, Box::new(e))),
        postfix,
    ))(input)
}

fn preceded_unary(input: &str) -> IResult<&str, (UnaryOp, Expr)> {
    let (rest, op) = unary_op(input)?;
    let (rest, operand) = unary(rest)?;
    Ok((rest, (op, operand)))
}

/// Postfix chain: field selection, indexing, `++` and `--`.
fn postfix(input: &str) -> IResult<&str, Expr> {
    let (mut input, mut e) = primary(input)?;
    loop {
        if let Ok((rest, field)) = preceded(symbol("."), identifier)(input) {
            e = Expr::Dot(Box::new(e), field);
            input = rest;
        } else if let Ok((rest, index)) = delimited(symbol("["), expr, symbol("]"))(input) {
            e = Expr::Bracket(Box::new(e), Box::new(index));
            input = rest;
        } else if let Ok((rest, _)) = symbol("++")(input) {
            e = Expr::PostInc(Box::new(e));
            input = rest;
        } else if let Ok((rest, _)) = symbol("--")(input) {
            e = Expr::PostDec(Box::new(e));
            input = rest;
        } else {
            return Ok((input, e));
        }
    }
}

fn call_args(input: &str) -> IResult<&str, Vec<Expr>> {
    delimited(symbol("("), separated_list0(symbol(","), expr), symbol(")"))(input)
}

fn primary(input: &str) -> IResult<&str, Expr> {
    alt((
        map(float_literal, Expr::FloatConst),
        map(int_literal, Expr::IntConst),
        map(bool_literal, Expr::BoolConst),
        map(
            nom::sequence::pair(type_name, call_args),
            |(ty, args)| Expr::Constructor(ty, args),
        ),
        map(
            nom::sequence::pair(identifier, opt(call_args)),
            |(name, args)| match args {
                Some(args) => Expr::FunCall(name, args),
                None => Expr::Variable(name),
            },
        ),
        map(delimited(symbol("("), expr, symbol(")")), |e| {
            Expr::Paren(Box::new(e))
        }),
    ))(input)
}
