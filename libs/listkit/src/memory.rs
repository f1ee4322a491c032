//! `Vec`-backed [`Repository`] for tests and the mock server.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use listing_core::{Error, FilterPredicate, OperatorKind, QuerySpec, SortDir, CREATED_AT_FIELD};

use crate::{Listable, Repository};

const TIEBREAKER: &str = "id";

/// A column value as seen by the in-memory evaluator.
///
/// Only values of the same variant are compared; request literals are
/// coerced to the variant of the row value first.
#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub enum FieldValue {
    Null,
    Bool(bool),
    I64(i64),
    Text(String),
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::I64(_) => "integer",
            FieldValue::Text(_) => "string",
            FieldValue::DateTime(_) => "RFC 3339 datetime",
        }
    }
}

/// Named field lookup for filtering and sorting.
///
/// `createdAt` is answered from [`Listable::created_at`] and need not be
/// handled here. Return `None` for names the row does not have.
pub trait FieldAccess: Listable {
    fn field(&self, name: &str) -> Option<FieldValue>;
}

fn lookup<T: FieldAccess>(row: &T, name: &str) -> Result<FieldValue, Error> {
    if name.eq_ignore_ascii_case(CREATED_AT_FIELD) {
        return Ok(FieldValue::DateTime(row.created_at()));
    }
    row.field(name)
        .ok_or_else(|| Error::UnknownField(name.to_string()))
}

/// Parse `raw` as the same kind as `like`.
fn coerce_like(like: &FieldValue, field: &str, raw: &str) -> Result<FieldValue, Error> {
    let mismatch = || Error::TypeMismatch {
        field: field.to_string(),
        value: raw.to_string(),
        expected: like.kind(),
    };
    let trimmed = raw.trim();
    match like {
        FieldValue::Null => Ok(FieldValue::Null),
        FieldValue::Bool(_) => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(FieldValue::Bool(true)),
            "false" | "0" => Ok(FieldValue::Bool(false)),
            _ => Err(mismatch()),
        },
        FieldValue::I64(_) => trimmed
            .parse::<i64>()
            .map(FieldValue::I64)
            .map_err(|_| mismatch()),
        FieldValue::Text(_) => Ok(FieldValue::Text(raw.to_string())),
        FieldValue::DateTime(_) => DateTime::parse_from_rfc3339(trimmed)
            .map(|dt| FieldValue::DateTime(dt.with_timezone(&Utc)))
            .map_err(|_| mismatch()),
    }
}

/// SQL `LIKE` with `%` and `_` wildcards, no escape character.
pub(crate) fn like_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '_' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '%' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if let Some((bp, bt)) = backtrack {
            pi = bp + 1;
            ti = bt + 1;
            backtrack = Some((bp, bt + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '%')
}

fn matches<T: FieldAccess>(row: &T, predicate: &FilterPredicate) -> Result<bool, Error> {
    let field = predicate.field.as_str();
    let actual = lookup(row, field)?;

    if predicate.operator == OperatorKind::ILike {
        let pattern = predicate.value().unwrap_or_default();
        return match &actual {
            FieldValue::Null => Ok(false),
            FieldValue::Text(text) => Ok(like_match(&pattern.to_lowercase(), &text.to_lowercase())),
            _ => Err(Error::TypeMismatch {
                field: field.to_string(),
                value: pattern.to_string(),
                expected: actual.kind(),
            }),
        };
    }

    let literals = predicate
        .values
        .iter()
        .map(|raw| coerce_like(&actual, field, raw))
        .collect::<Result<Vec<_>, _>>()?;
    if actual == FieldValue::Null {
        return Ok(false);
    }

    let cmp = |i: usize| literals.get(i).and_then(|lit| actual.partial_cmp(lit));
    let hit = match predicate.operator {
        OperatorKind::Eq => cmp(0) == Some(Ordering::Equal),
        OperatorKind::Ne => cmp(0).is_some_and(Ordering::is_ne),
        OperatorKind::Gt => cmp(0) == Some(Ordering::Greater),
        OperatorKind::Ge => cmp(0).is_some_and(Ordering::is_ge),
        OperatorKind::Lt => cmp(0) == Some(Ordering::Less),
        OperatorKind::Le => cmp(0).is_some_and(Ordering::is_le),
        OperatorKind::Between => {
            cmp(0).is_some_and(Ordering::is_ge) && cmp(1).is_some_and(Ordering::is_le)
        }
        OperatorKind::In => literals.iter().any(|lit| &actual == lit),
        OperatorKind::ILike => false,
    };
    Ok(hit)
}

/// In-memory [`Repository`] evaluating every operator over a fixed row set.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRepository<T> {
    rows: Vec<T>,
}

impl<T> InMemoryRepository<T>
where
    T: FieldAccess + Clone,
{
    pub fn new(rows: Vec<T>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Filter, sort and slice; the second value is the pre-slice count.
    fn select(&self, spec: &QuerySpec) -> Result<(Vec<T>, u64), Error> {
        let mut matched = Vec::new();
        'rows: for row in &self.rows {
            for predicate in spec.filters.values() {
                if !matches(row, predicate)? {
                    continue 'rows;
                }
            }
            matched.push(row);
        }
        let total = matched.len() as u64;

        let order = spec
            .order
            .clone()
            .ensure_tiebreaker(TIEBREAKER, spec.order.primary_dir());
        let mut keyed = matched
            .into_iter()
            .map(|row| {
                let keys = order
                    .iter()
                    .map(|k| lookup(row, &k.field))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((keys, row))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        keyed.sort_by(|(a, _), (b, _)| {
            order
                .iter()
                .zip(a.iter().zip(b.iter()))
                .map(|(key, (x, y))| {
                    let ord = x.partial_cmp(y).unwrap_or(Ordering::Equal);
                    match key.dir {
                        SortDir::Asc => ord,
                        SortDir::Desc => ord.reverse(),
                    }
                })
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        let offset = usize::try_from(spec.offset.unwrap_or(0)).unwrap_or(usize::MAX);
        let limit = usize::try_from(spec.limit).unwrap_or(usize::MAX);
        let page = keyed
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, row)| row.clone())
            .collect();
        Ok((page, total))
    }
}

#[async_trait]
impl<T> Repository<T> for InMemoryRepository<T>
where
    T: FieldAccess + Clone + Send + Sync,
{
    async fn find(&self, spec: &QuerySpec) -> anyhow::Result<Vec<T>> {
        let (rows, _) = self.select(spec)?;
        Ok(rows)
    }

    async fn find_and_count(&self, spec: &QuerySpec) -> anyhow::Result<(Vec<T>, u64)> {
        Ok(self.select(spec)?)
    }
}
