//! Parser for the textual form of state expressions.
//!
//! ```text
//! expr   := term ( '|' term )*
//! term   := factor ( '&' factor )*
//! factor := '!' factor | '(' expr ')' | 'true' | 'false' | name
//! ```

use nom::{
    IResult,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    multi::separated_list1,
    sequence::{delimited, preceded},
};

use super::state::StateExpression;

fn ws<'a, O>(
    inner: impl FnMut(&'a str) -> IResult<&'a str, O>,
) -> impl FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(multispace0, inner, multispace0)
}

/// Parses a state name: letters, digits, `-` and `_`.
pub fn parse_state_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_')(input)
}

fn parse_factor(input: &str) -> IResult<&str, StateExpression> {
    ws(alt((
        map(preceded(char('!'), parse_factor), |inner| !inner),
        delimited(char('('), parse_state_expression, char(')')),
        map(parse_state_name, |name| match name {
            "true" => StateExpression::always(),
            "false" => StateExpression::never(),
            _ => StateExpression::state(name),
        }),
    )))(input)
}

fn parse_term(input: &str) -> IResult<&str, StateExpression> {
    let (input, factors) = separated_list1(char('&'), parse_factor)(input)?;
    Ok((input, fold(factors, |a, b| a & b)))
}

/// Parses a full expression, leaving any trailing input unconsumed.
pub fn parse_state_expression(input: &str) -> IResult<&str, StateExpression> {
    let (input, terms) = separated_list1(char('|'), parse_term)(input)?;
    Ok((input, fold(terms, |a, b| a | b)))
}

fn fold(
    items: Vec<StateExpression>,
    join: impl Fn(StateExpression, StateExpression) -> StateExpression,
) -> StateExpression {
    let mut items = items.into_iter();
    // separated_list1 guarantees at least one item.
    let first = items.next().unwrap_or_else(StateExpression::always);
    items.fold(first, join)
}
