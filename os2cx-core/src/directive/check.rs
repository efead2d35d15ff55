//! Argument checks shared by all directive handlers.

use lazy_static::lazy_static;
use regex::Regex;

use super::error::{ConfigurationError, DirectiveResult, StatementError};
use crate::geometry::Vector;
use crate::project::{Namespace, Project};
use crate::value::Value;

lazy_static! {
    /// Object names end up as geometry file stems and solver set names.
    static ref OBJECT_NAME: Regex = Regex::new(r"^[A-Za-z0-9_]+$").unwrap();
}

pub fn check_arg_count(
    args: &[Value],
    expected: usize,
    directive: &'static str,
) -> Result<(), StatementError> {
    if args.len() != expected {
        return Err(StatementError::WrongArgumentCount {
            directive,
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn unexpected(expected: &'static str, found: &Value) -> StatementError {
    StatementError::UnexpectedType {
        expected,
        found: found.type_name(),
    }
}

pub fn check_string(value: &Value) -> Result<&str, StatementError> {
    value.as_str().ok_or_else(|| unexpected("string", value))
}

pub fn check_number(value: &Value) -> Result<f64, StatementError> {
    value.as_number().ok_or_else(|| unexpected("number", value))
}

/// Checks that `value` is a vector and converts every element with `inner`.
pub fn check_vector<'a, T>(
    value: &'a Value,
    inner: impl Fn(&'a Value) -> Result<T, StatementError>,
) -> Result<Vec<T>, StatementError> {
    value
        .as_vector()
        .ok_or_else(|| unexpected("vector", value))?
        .iter()
        .map(inner)
        .collect()
}

pub fn check_vector_3(value: &Value) -> Result<Vector, StatementError> {
    match check_vector(value, check_number)?.as_slice() {
        [x, y, z] => Ok(Vector::new(*x, *y, *z)),
        parts => Err(StatementError::WrongVectorLength {
            expected: 3,
            found: parts.len(),
        }),
    }
}

/// Checks that `value` is a string made of letters, digits and underscores.
pub fn check_name(value: &Value) -> Result<&str, StatementError> {
    let name = check_string(value)?;
    if !OBJECT_NAME.is_match(name) {
        return Err(StatementError::InvalidName(name.to_string()));
    }
    Ok(name)
}

/// Checks that `value` is a valid name for an object not yet declared in
/// any namespace.
pub fn check_name_new(
    value: &Value,
    kind: Namespace,
    project: &Project,
) -> DirectiveResult<String> {
    let name = check_name(value)?;
    if let Some(existing) = project.namespace_of(name) {
        return Err(ConfigurationError::NameInUse {
            kind,
            existing,
            name: name.to_string(),
        }
        .into());
    }
    Ok(name.to_string())
}
