use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, OperatorKind};

/// One parsed `where__*` entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicate {
    pub field: String,
    pub operator: OperatorKind,
    /// Textual values; adapters coerce them by column kind.
    pub values: Vec<String>,
}

impl FilterPredicate {
    /// Equality predicate, e.g. for pinning `authorId = <current user>`.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: OperatorKind::Eq,
            values: vec![value.into()],
        }
    }

    /// The comparison value of a single-value operator.
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDir {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDir {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }

    /// Case-insensitive `ASC` / `DESC`.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("asc") {
            Ok(SortDir::Asc)
        } else if trimmed.eq_ignore_ascii_case("desc") {
            Ok(SortDir::Desc)
        } else {
            Err(Error::InvalidOrderDirection(raw.to_string()))
        }
    }
}

impl FromStr for SortDir {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderKey {
    pub field: String,
    pub dir: SortDir,
}

/// Ordered sort keys; each field appears at most once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderBy(pub Vec<OrderKey>);

impl OrderBy {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrderKey> {
        self.0.iter()
    }

    pub fn get(&self, field: &str) -> Option<SortDir> {
        self.0.iter().find(|k| k.field == field).map(|k| k.dir)
    }

    /// Direction of the first key, `ASC` when empty.
    pub fn primary_dir(&self) -> SortDir {
        self.0.first().map(|k| k.dir).unwrap_or_default()
    }

    /// Replace the direction of `field` in place, or append it.
    pub fn set(&mut self, field: &str, dir: SortDir) {
        match self.0.iter_mut().find(|k| k.field == field) {
            Some(key) => key.dir = dir,
            None => self.0.push(OrderKey {
                field: field.to_string(),
                dir,
            }),
        }
    }

    /// Append `tiebreaker` unless it is already a sort key.
    pub fn ensure_tiebreaker(mut self, tiebreaker: &str, dir: SortDir) -> Self {
        if self.get(tiebreaker).is_none() {
            self.0.push(OrderKey {
                field: tiebreaker.to_string(),
                dir,
            });
        }
        self
    }

    /// Compact form for logs, e.g. `+createdAt,-id`.
    pub fn to_signed_tokens(&self) -> String {
        self.0
            .iter()
            .map(|k| match k.dir {
                SortDir::Asc => format!("+{}", k.field),
                SortDir::Desc => format!("-{}", k.field),
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Everything a repository needs to run one list query.
///
/// Built fresh for each request and never shared between requests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuerySpec {
    /// The `where` mapping: field -> predicate, one predicate per field.
    pub filters: BTreeMap<String, FilterPredicate>,
    pub order: OrderBy,
    pub limit: u64,
    pub offset: Option<u64>,
}

impl QuerySpec {
    pub fn filter(&self, field: &str) -> Option<&FilterPredicate> {
        self.filters.get(field)
    }
}
