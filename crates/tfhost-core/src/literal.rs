//! Structured literal parser for host variable values
//!
//! Accepts both JSON and Python literal syntax, since values reach the
//! host-vars template output either way:
//!
//! ```text
//! [1, 2, 3]   ['a', "b"]   {'k': True, "n": None}   {1, 2}   [1, 2,]
//! ```
//!
//! Sets become lists. Map keys that are not strings are stringified.

use std::str::CharIndices;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, map, opt, recognize, value},
    error::{ErrorKind, ParseError, VerboseError, context, convert_error},
    multi::{separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, separated_pair, terminated, tuple},
};
use serde_json::{Map, Number, Value};

type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

// ============================================================================
// Public API
// ============================================================================

/// Parse a complete structured literal
///
/// # Errors
/// Returns a human-readable diagnostic if the input is not a single valid
/// literal.
pub fn parse_literal(input: &str) -> Result<Value, String> {
    match all_consuming(literal)(input) {
        Ok((_, value)) => Ok(value),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(convert_error(input, e)),
        Err(nom::Err::Incomplete(_)) => Err("incomplete literal".to_string()),
    }
}

// ============================================================================
// Internal Parsers
// ============================================================================

fn literal(input: &str) -> Res<'_, Value> {
    delimited(
        multispace0,
        alt((list, dict, set, string, number, keyword)),
        multispace0,
    )(input)
}

/// Comma-separated literals with an optional trailing comma
fn elements(input: &str) -> Res<'_, Vec<Value>> {
    terminated(
        separated_list0(char(','), literal),
        opt(pair(char(','), multispace0)),
    )(input)
}

fn list(input: &str) -> Res<'_, Value> {
    context(
        "list",
        map(
            delimited(char('['), preceded(multispace0, elements), char(']')),
            Value::Array,
        ),
    )(input)
}

fn dict(input: &str) -> Res<'_, Value> {
    let entry = separated_pair(literal, char(':'), literal);
    let entries = terminated(
        separated_list0(char(','), entry),
        opt(pair(char(','), multispace0)),
    );

    context(
        "dict",
        map(
            delimited(char('{'), preceded(multispace0, entries), char('}')),
            |pairs: Vec<(Value, Value)>| {
                let map: Map<String, Value> = pairs
                    .into_iter()
                    .map(|(k, v)| (key_string(k), v))
                    .collect();
                Value::Object(map)
            },
        ),
    )(input)
}

fn set(input: &str) -> Res<'_, Value> {
    let members = terminated(
        separated_list1(char(','), literal),
        opt(pair(char(','), multispace0)),
    );

    context(
        "set",
        map(delimited(char('{'), members, char('}')), Value::Array),
    )(input)
}

fn string(input: &str) -> Res<'_, Value> {
    map(alt((quoted('"'), quoted('\''))), Value::String)(input)
}

/// Quoted string with backslash escapes
fn quoted(quote: char) -> impl Fn(&str) -> Res<'_, String> {
    move |input: &str| {
        let Some(rest) = input.strip_prefix(quote) else {
            return Err(nom::Err::Error(VerboseError::from_error_kind(
                input,
                ErrorKind::Char,
            )));
        };

        let mut out = String::new();
        let mut chars = rest.char_indices();
        while let Some((idx, c)) = chars.next() {
            match c {
                c if c == quote => return Ok((&rest[idx + c.len_utf8()..], out)),
                '\\' => match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, '0')) => out.push('\0'),
                    Some((_, 'b')) => out.push('\u{8}'),
                    Some((_, 'f')) => out.push('\u{c}'),
                    Some((_, kind @ ('x' | 'u' | 'U'))) => match code_point(&mut chars, kind) {
                        Some(decoded) => out.push(decoded),
                        None => {
                            return Err(nom::Err::Failure(VerboseError::from_error_kind(
                                &rest[idx..],
                                ErrorKind::Escaped,
                            )));
                        }
                    },
                    Some((_, other)) => out.push(other),
                    None => break,
                },
                c => out.push(c),
            }
        }

        Err(nom::Err::Failure(VerboseError::from_error_kind(
            input,
            ErrorKind::Eof,
        )))
    }
}

/// Decode `\xNN`, `\uNNNN` (with surrogate pairs), `\UNNNNNNNN` and `\u{N..}`
fn code_point(chars: &mut CharIndices<'_>, kind: char) -> Option<char> {
    let code = match kind {
        'x' => hex_digits(chars, 2)?,
        'U' => hex_digits(chars, 8)?,
        _ if chars.clone().next().map(|(_, c)| c) == Some('{') => {
            chars.next();
            let mut digits = String::new();
            loop {
                match chars.next()? {
                    (_, '}') => break,
                    (_, c) if c.is_ascii_hexdigit() && digits.len() < 6 => digits.push(c),
                    _ => return None,
                }
            }
            u32::from_str_radix(&digits, 16).ok()?
        }
        _ => {
            let high = hex_digits(chars, 4)?;
            if (0xD800..0xDC00).contains(&high) {
                let mut lookahead = chars.clone();
                if !matches!(
                    (lookahead.next(), lookahead.next()),
                    (Some((_, '\\')), Some((_, 'u')))
                ) {
                    return None;
                }
                let low = hex_digits(&mut lookahead, 4)?;
                if !(0xDC00..0xE000).contains(&low) {
                    return None;
                }
                *chars = lookahead;
                0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
            } else {
                high
            }
        }
    };
    char::from_u32(code)
}

fn hex_digits(chars: &mut CharIndices<'_>, count: usize) -> Option<u32> {
    let mut code = 0;
    for _ in 0..count {
        let digit = chars.next()?.1.to_digit(16)?;
        code = code * 16 + digit;
    }
    Some(code)
}

fn number(input: &str) -> Res<'_, Value> {
    let (rest, text) = recognize(tuple((
        opt(one_of("+-")),
        digit1,
        opt(pair(char('.'), digit0)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)?;

    let parsed = if text.contains(['.', 'e', 'E']) {
        text.parse::<f64>().ok().and_then(Number::from_f64)
    } else {
        text.parse::<i64>().ok().map(Number::from)
    };

    match parsed {
        Some(n) => Ok((rest, Value::Number(n))),
        None => Err(nom::Err::Error(VerboseError::from_error_kind(
            input,
            ErrorKind::Float,
        ))),
    }
}

fn keyword(input: &str) -> Res<'_, Value> {
    alt((
        value(Value::Bool(true), alt((tag("True"), tag("true")))),
        value(Value::Bool(false), alt((tag("False"), tag("false")))),
        value(Value::Null, alt((tag("None"), tag("null")))),
    ))(input)
}

fn key_string(key: Value) -> String {
    match key {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
