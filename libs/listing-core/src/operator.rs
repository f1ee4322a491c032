//! Closed set of filter operators and the value shape each one expects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, FilterPredicate};

/// Separator for operators that take more than one value (`between`, `in`).
pub const VALUE_SEPARATOR: char = ',';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    /// Implicit operator of a 2-segment `where__<field>` key.
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    /// Case-insensitive LIKE; the value is wrapped as `%value%`.
    ILike,
    /// Inclusive range over two comma-separated values.
    Between,
    In,
}

/// How many values an operator consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    One,
    Exactly(usize),
    AtLeastOne,
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::One => count == 1,
            Arity::Exactly(n) => count == n,
            Arity::AtLeastOne => count >= 1,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::One => f.write_str("1"),
            Arity::Exactly(n) => write!(f, "{n}"),
            Arity::AtLeastOne => f.write_str("at least 1"),
        }
    }
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 9] = [
        OperatorKind::Eq,
        OperatorKind::Ne,
        OperatorKind::Gt,
        OperatorKind::Ge,
        OperatorKind::Lt,
        OperatorKind::Le,
        OperatorKind::ILike,
        OperatorKind::Between,
        OperatorKind::In,
    ];

    /// Resolve the third segment of a `where__<field>__<operator>` key.
    pub fn from_token(token: &str) -> Result<Self, Error> {
        match token {
            "more_than" => Ok(OperatorKind::Gt),
            "less_than" => Ok(OperatorKind::Lt),
            "same_or_more_than" => Ok(OperatorKind::Ge),
            "same_or_less_than" => Ok(OperatorKind::Le),
            "i_like" => Ok(OperatorKind::ILike),
            "between" => Ok(OperatorKind::Between),
            "not" => Ok(OperatorKind::Ne),
            "in" => Ok(OperatorKind::In),
            other => Err(Error::UnknownOperator(other.to_string())),
        }
    }

    /// Token used in request keys; `None` for implicit equality.
    pub fn token(self) -> Option<&'static str> {
        match self {
            OperatorKind::Eq => None,
            OperatorKind::Ne => Some("not"),
            OperatorKind::Gt => Some("more_than"),
            OperatorKind::Ge => Some("same_or_more_than"),
            OperatorKind::Lt => Some("less_than"),
            OperatorKind::Le => Some("same_or_less_than"),
            OperatorKind::ILike => Some("i_like"),
            OperatorKind::Between => Some("between"),
            OperatorKind::In => Some("in"),
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            OperatorKind::Between => Arity::Exactly(2),
            OperatorKind::In => Arity::AtLeastOne,
            OperatorKind::Eq
            | OperatorKind::Ne
            | OperatorKind::Gt
            | OperatorKind::Ge
            | OperatorKind::Lt
            | OperatorKind::Le
            | OperatorKind::ILike => Arity::One,
        }
    }

    /// Shape `raw` into the predicate values this operator expects.
    ///
    /// Single-value operators keep `raw` verbatim, commas included.
    /// Multi-value operators split on [`VALUE_SEPARATOR`] and drop empty
    /// pieces before the count is checked.
    pub fn build(self, field: &str, raw: &str) -> Result<FilterPredicate, Error> {
        let arity = self.arity();
        let values: Vec<String> = match arity {
            Arity::One => vec![raw.to_string()],
            Arity::Exactly(_) | Arity::AtLeastOne => raw
                .split(VALUE_SEPARATOR)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
        };

        if !arity.accepts(values.len()) {
            return Err(Error::InvalidValueShape {
                operator: self,
                expected: arity,
                got: values.len(),
            });
        }

        let values = match self {
            OperatorKind::ILike => values.into_iter().map(|v| format!("%{v}%")).collect(),
            _ => values,
        };

        Ok(FilterPredicate {
            field: field.to_string(),
            operator: self,
            values,
        })
    }
}

impl FromStr for OperatorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token().unwrap_or("eq"))
    }
}
