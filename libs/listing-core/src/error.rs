use thiserror::Error;

use crate::operator::{Arity, OperatorKind};

/// Errors raised while turning list parameters into a query or a link.
///
/// Everything except [`Error::InvalidLinkBase`] is caused by the request
/// itself and should be reported to the client as a 400.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("malformed filter key: {0} (expected 2 or 3 '__'-separated segments)")]
    MalformedFilterKey(String),

    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    #[error("operator {operator} expects {expected} value(s), got {got}")]
    InvalidValueShape {
        operator: OperatorKind,
        expected: Arity,
        got: usize,
    },

    #[error("invalid order direction: {0} (expected ASC or DESC)")]
    InvalidOrderDirection(String),

    #[error("invalid take: {0} (expected a positive integer)")]
    InvalidTake(String),

    #[error("invalid page: {0} (expected a positive integer)")]
    InvalidPage(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("type mismatch on {field}: {value:?} is not a valid {expected}")]
    TypeMismatch {
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("invalid link base: {0}")]
    InvalidLinkBase(String),
}

impl Error {
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Error::InvalidLinkBase(_))
    }

    /// Stable machine-readable code, used as the problem `code`.
    pub fn code(&self) -> &'static str {
        match self {
            Error::MalformedFilterKey(_) => "MALFORMED_FILTER_KEY",
            Error::UnknownOperator(_) => "UNKNOWN_OPERATOR",
            Error::InvalidValueShape { .. } => "INVALID_VALUE_SHAPE",
            Error::InvalidOrderDirection(_) => "INVALID_ORDER_DIRECTION",
            Error::InvalidTake(_) => "INVALID_TAKE",
            Error::InvalidPage(_) => "INVALID_PAGE",
            Error::UnknownField(_) => "UNKNOWN_FIELD",
            Error::TypeMismatch { .. } => "TYPE_MISMATCH",
            Error::InvalidLinkBase(_) => "INVALID_LINK_BASE",
        }
    }
}
