//! # Type Expression Parser
//!
//! Parses the string form of the schema DSL:
//!
//! ```text
//! type-expr := ws* ident ws* ( '|' option )*
//! option    := ws* ident ws* ':' literal
//! ident     := [A-Za-z_$] [A-Za-z0-9_$]*
//! literal   := any JSON literal, surrounding whitespace allowed
//! ```
//!
//! A literal extends to the next `|` that is not inside a JSON string, so
//! `string|default:"a|b"` keeps the pipe inside the default value. The
//! grammar, literal boundaries included, is parsed with `nom` combinators;
//! the recognized literal text is then decoded by `serde_json`.

use ijs_core::SchemaError;
use nom::{
    branch::alt,
    bytes::complete::{escaped, is_not, tag, take_while},
    character::complete::{anychar, char, multispace0, satisfy},
    combinator::{all_consuming, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded, separated_pair},
    IResult,
};
use serde_json::Value;

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    /// The leading type name, trimmed.
    pub type_name: String,
    /// `key:literal` options in source order.
    pub options: Vec<(String, Value)>,
}

/// Parse a `type[|key:literal]*` expression.
///
/// # Errors
///
/// Returns `SchemaError::MalformedSchemaSyntax` with the byte offset of the
/// first unparseable character, or with the offending segment when a
/// literal is not valid JSON.
pub fn parse_type_expr(input: &str) -> Result<TypeExpr, SchemaError> {
    let (_, (type_name, segments)) = type_expr(input).map_err(|e| {
        let remaining = match &e {
            nom::Err::Error(err) | nom::Err::Failure(err) => err.input,
            nom::Err::Incomplete(_) => "",
        };
        let offset = input.len() - remaining.len();
        SchemaError::malformed(format!(
            "invalid type expression {input:?} at byte {offset}: expected `type` followed by `|key:literal` segments"
        ))
    })?;

    let mut options = Vec::with_capacity(segments.len());
    for (key, literal) in segments {
        let value: Value = serde_json::from_str(literal.trim()).map_err(|e| {
            SchemaError::malformed(format!(
                "invalid literal for option `{key}` in {input:?}: {e}"
            ))
        })?;
        options.push((key.to_string(), value));
    }

    Ok(TypeExpr {
        type_name: type_name.to_string(),
        options,
    })
}

fn type_expr(input: &str) -> IResult<&str, (&str, Vec<(&str, &str)>)> {
    all_consuming(pair(
        delimited(multispace0, identifier, multispace0),
        many0(preceded(char('|'), option_segment)),
    ))(input)
}

fn option_segment(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        delimited(multispace0, identifier, multispace0),
        char(':'),
        literal_text,
    )(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((
            recognize(satisfy(|c| c.is_ascii_alphabetic())),
            tag("_"),
            tag("$"),
        )),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$'),
    ))(input)
}

/// Everything up to the next `|` outside a JSON string literal.
fn literal_text(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((json_string, is_not("\"|")))))(input)
}

/// A double-quoted JSON string, escapes included.
fn json_string(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('"'),
        opt(escaped(is_not("\"\\"), '\\', anychar)),
        char('"'),
    ))(input)
}
