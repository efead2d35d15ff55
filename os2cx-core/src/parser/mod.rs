//! # Diagnostic Channel Parsing
//!
//! The evaluator reports everything it has to say on standard error, one
//! message per line, each prefixed with a severity tag:
//!
//! ```text
//! ECHO: "__openscad2calculix", "mesh_directive", "block"
//! WARNING: Ignoring unknown variable 'x' in file part.scad, line 3
//! ```
//!
//! [`parse_diagnostics`] splits that text into [`Statement`]s (one per `ECHO:`
//! line, values parsed by [`literal`]) and warning strings. Lines with any
//! other tag are ignored. A malformed `ECHO:` payload is an error: the stream
//! cannot be trusted if one of its statements is lost.

pub mod literal;

use lazy_static::lazy_static;
use nom::{
    IResult,
    error::{VerboseError, convert_error},
};
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::statement::Statement;

pub type ParserResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

lazy_static! {
    static ref DIAGNOSTIC_LINE: Regex =
        Regex::new(r"^(ECHO|WARNING|DEPRECATED|ERROR|TRACE):\s?(.*)$").unwrap();
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("unparsable echo on line {line_number}: {line}\n{message}")]
pub struct DiagnosticParseError {
    pub line_number: usize,
    pub line: String,
    pub message: String,
}

/// Statements and warnings read from one evaluator run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub statements: Vec<Statement>,
    pub warnings: Vec<String>,
}

#[tracing::instrument(level = "debug", skip(text))]
pub fn parse_diagnostics(text: &str) -> Result<Diagnostics, DiagnosticParseError> {
    let mut diagnostics = Diagnostics::default();

    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        let Some(captures) = DIAGNOSTIC_LINE.captures(line) else {
            continue;
        };
        let payload = captures.get(2).map_or("", |m| m.as_str());
        match &captures[1] {
            "ECHO" => {
                let statement = parse_echo_payload(payload).map_err(|message| {
                    DiagnosticParseError {
                        line_number: index + 1,
                        line: line.to_string(),
                        message,
                    }
                })?;
                debug!("echo: {}", statement);
                diagnostics.statements.push(statement);
            }
            "WARNING" | "DEPRECATED" => diagnostics.warnings.push(payload.to_string()),
            _ => {}
        }
    }

    Ok(diagnostics)
}

fn parse_echo_payload(payload: &str) -> Result<Statement, String> {
    match literal::parse_statement(payload) {
        Ok((_, statement)) => Ok(statement),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(convert_error(payload, e)),
        Err(nom::Err::Incomplete(needed)) => Err(format!("Incomplete input, {:?}", needed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_echo_and_warnings() {
        let text = "Parsing design (AST generation)...\n\
            ECHO: \"__openscad2calculix\", \"mesh_directive\", \"block\"\n\
            WARNING: Ignoring unknown variable 'x'\n\
            ECHO: 1, [2, 3]\r\n\
            DEPRECATED: The assign() module will be removed\n\
            Total rendering time: 0:00:00.012\n";

        let diagnostics = parse_diagnostics(text).unwrap();
        assert_eq!(diagnostics.statements.len(), 2);
        assert_eq!(
            diagnostics.statements[0].values()[2],
            Value::from("block")
        );
        assert_eq!(
            diagnostics.statements[1],
            Statement::new(vec![Value::Number(1.0), Value::from(vec![2.0, 3.0])])
        );
        assert_eq!(
            diagnostics.warnings,
            vec![
                "Ignoring unknown variable 'x'".to_string(),
                "The assign() module will be removed".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_echo_is_empty_statement() {
        let diagnostics = parse_diagnostics("ECHO: \n").unwrap();
        assert_eq!(diagnostics.statements, vec![Statement::default()]);
    }

    #[test]
    fn test_unparsable_echo_reports_line() {
        let err = parse_diagnostics("ECHO: 1\nECHO: undef\n").unwrap_err();
        assert_eq!(err.line_number, 2);
        assert_eq!(err.line, "ECHO: undef");
    }

    #[test]
    fn test_no_diagnostics() {
        assert_eq!(parse_diagnostics("").unwrap(), Diagnostics::default());
    }
}
