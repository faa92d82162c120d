//! Whitespace and comment skipping.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::{multispace1, not_line_ending},
    combinator::{map, recognize},
    multi::many0,
    sequence::{delimited, preceded},
    IResult,
};

fn line_comment(input: &str) -> IResult<&str, &str> {
    recognize(preceded(tag("//"), not_line_ending))(input)
}

fn block_comment(input: &str) -> IResult<&str, &str> {
    recognize(delimited(tag("/*"), take_until("*/"), tag("*/")))(input)
}

/// Skip any mix of whitespace and comments.
pub(crate) fn blank(input: &str) -> IResult<&str, ()> {
    map(
        many0(alt((multispace1, line_comment, block_comment))),
        |_| (),
    )(input)
}
