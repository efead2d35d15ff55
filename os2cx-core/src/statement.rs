//! Statements and the stream one evaluator invocation produces.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Poly3;
use crate::value::Value;

/// One `ECHO:` line of evaluator output, as an ordered list of values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statement(pub Vec<Value>);

impl Statement {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn first(&self) -> Option<&Value> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Value>> for Statement {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

/// Renders the statement the way the evaluator printed it: values joined by `, `.
impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}

/// Everything one evaluator invocation yields.
#[derive(Debug, Clone, Default)]
pub struct StatementStream {
    /// Present only when the evaluator's top-level output was non-empty.
    pub geometry: Option<Poly3>,
    pub warnings: Vec<String>,
    /// In emission order.
    pub statements: Vec<Statement>,
}

impl StatementStream {
    pub fn has_geometry(&self) -> bool {
        self.geometry.is_some()
    }
}
