//! # Value Literal Parsing
//!
//! nom parsers for the evaluator's value syntax as it appears in `ECHO:` lines:
//!
//! * numbers: `5`, `-0.25`, `1e-05`, `inf`, `-inf`, `nan`
//! * strings: `"text"` with `\"`, `\\`, `\n`, `\t`, `\r` escapes
//! * vectors: `[1, "a", [2, 3]]`, possibly empty or nested
//!
//! These are the inverse of [`Value`]'s `Display` rendering.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, opt, value},
    error::context,
    multi::separated_list0,
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated},
};

use super::ParserResult;
use crate::statement::Statement;
use crate::value::Value;

#[tracing::instrument(level = "debug", skip(input))]
fn parse_special_number(input: &str) -> ParserResult<f64> {
    context(
        "special number",
        alt((
            value(f64::NEG_INFINITY, tag("-inf")),
            value(f64::INFINITY, tag("inf")),
            value(f64::NAN, tag("nan")),
        )),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_number(input: &str) -> ParserResult<Value> {
    context(
        "number",
        map(alt((parse_special_number, double)), Value::Number),
    )(input)
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_string(input: &str) -> ParserResult<Value> {
    context(
        "string",
        map(
            delimited(
                char('"'),
                opt(escaped_transform(
                    is_not("\\\""),
                    '\\',
                    alt((
                        value("\\", tag("\\")),
                        value("\"", tag("\"")),
                        value("\n", tag("n")),
                        value("\t", tag("t")),
                        value("\r", tag("r")),
                    )),
                )),
                char('"'),
            ),
            |content: Option<String>| Value::String(content.unwrap_or_default()),
        ),
    )(input)
}

fn separator(input: &str) -> ParserResult<char> {
    delimited(multispace0, char(','), multispace0)(input)
}

#[tracing::instrument(level = "debug", skip(input))]
fn parse_vector(input: &str) -> ParserResult<Value> {
    context(
        "vector",
        map(
            delimited(
                pair(char('['), multispace0),
                separated_list0(separator, parse_value),
                pair(multispace0, char(']')),
            ),
            Value::Vector,
        ),
    )(input)
}

/// Parses one value literal.
pub fn parse_value(input: &str) -> ParserResult<Value> {
    context("value", alt((parse_string, parse_vector, parse_number)))(input)
}

/// Parses the payload of an `ECHO:` line: zero or more values separated by commas.
pub fn parse_statement(input: &str) -> ParserResult<Statement> {
    context(
        "statement",
        all_consuming(map(
            delimited(
                multispace0,
                separated_list0(separator, parse_value),
                multispace0,
            ),
            Statement::new,
        )),
    )(input)
}

/// Parses a complete value literal with nothing left over.
pub fn parse_value_literal(input: &str) -> ParserResult<Value> {
    all_consuming(preceded(multispace0, terminated(parse_value, multispace0)))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numbers() {
        let cases = [
            ("5", 5.0),
            ("-0.25", -0.25),
            ("1e-05", 1e-5),
            ("2.5E3", 2500.0),
            ("inf", f64::INFINITY),
            ("-inf", f64::NEG_INFINITY),
        ];
        for (input, expected) in cases {
            let (rest, parsed) = parse_value(input).unwrap();
            assert_eq!(rest, "");
            assert_eq!(parsed, Value::Number(expected), "input {}", input);
        }
        let (_, nan) = parse_value("nan").unwrap();
        assert!(nan.as_number().unwrap().is_nan());
    }

    #[test]
    fn test_strings() {
        let (rest, parsed) = parse_value("\"hello world\"").unwrap();
        assert_eq!(rest, "");
        assert_eq!(parsed, Value::from("hello world"));

        let (_, parsed) = parse_value("\"\"").unwrap();
        assert_eq!(parsed, Value::from(""));

        let (_, parsed) = parse_value(r#""a \"quoted\" \\ path\n""#).unwrap();
        assert_eq!(parsed, Value::from("a \"quoted\" \\ path\n"));
    }

    #[test]
    fn test_vectors() {
        let (rest, parsed) = parse_value("[1, \"a\", [2, 3], []]").unwrap();
        assert_eq!(rest, "");
        assert_eq!(
            parsed,
            Value::Vector(vec![
                Value::Number(1.0),
                Value::from("a"),
                Value::from(vec![2.0, 3.0]),
                Value::Vector(vec![]),
            ])
        );

        let (_, parsed) = parse_value("[ 1 ,2 ]").unwrap();
        assert_eq!(parsed, Value::from(vec![1.0, 2.0]));
    }

    #[test]
    fn test_statement() {
        let (_, statement) =
            parse_statement(r#""__openscad2calculix", "load_volume_directive", "L1", "block", -5"#)
                .unwrap();
        assert_eq!(statement.len(), 5);
        assert_eq!(statement.values()[4], Value::Number(-5.0));

        let (_, empty) = parse_statement("").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_statement_rejects_unknown_syntax() {
        assert!(parse_statement("undef").is_err());
        assert!(parse_statement("\"unterminated").is_err());
        assert!(parse_statement("[1, 2").is_err());
        assert!(parse_statement("a = 1").is_err());
    }

    #[test]
    fn test_render_then_parse_is_identity() {
        let values = [
            Value::Number(42.0),
            Value::Number(-1.0e-7),
            Value::from("with \"quotes\" and \\"),
            Value::from(vec![0.0, 0.5, -3.0]),
        ];
        for original in values {
            let rendered = original.to_string();
            let (_, parsed) = parse_value_literal(&rendered).unwrap();
            assert_eq!(parsed, original, "rendered as {}", rendered);
        }
    }
}
