use std::collections::BTreeMap;

use crate::{Error, SortDir};

pub const PAGE_KEY: &str = "page";
pub const TAKE_KEY: &str = "take";
pub const ORDER_CREATED_AT_KEY: &str = "order__createdAt";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const DEFAULT_TAKE: u64 = 20;
/// Largest `take` and largest computed offset; SQL backends bind both as
/// signed 64-bit integers.
pub const MAX_TAKE: u64 = i64::MAX as u64;
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Inbound list parameters.
///
/// `page`, `take` and `order__createdAt` are parsed eagerly; every raw pair
/// (structural ones included) is also kept verbatim so the next-page link
/// can carry it forward. A present `page` selects offset pagination,
/// otherwise the request is in cursor mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationRequest {
    page: Option<u64>,
    take: u64,
    order_created_at: SortDir,
    params: BTreeMap<String, String>,
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self {
            page: None,
            take: DEFAULT_TAKE,
            order_created_at: SortDir::Asc,
            params: BTreeMap::new(),
        }
    }
}

impl PaginationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw query pairs. A repeated key keeps its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut request = Self::new();
        for (key, value) in pairs {
            request.set(key, value)?;
        }
        Ok(request)
    }

    /// Record one raw parameter, parsing it when it is structural.
    ///
    /// An empty value for a structural key counts as absent.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<(), Error> {
        let key = key.into();
        let value = value.into();
        let trimmed = value.trim();

        match key.as_str() {
            PAGE_KEY => {
                self.page = if trimmed.is_empty() {
                    None
                } else {
                    Some(parse_positive(trimmed).ok_or_else(|| Error::InvalidPage(value.clone()))?)
                };
                self.check_offset()?;
            }
            TAKE_KEY => {
                self.take = if trimmed.is_empty() {
                    DEFAULT_TAKE
                } else {
                    parse_positive(trimmed)
                        .filter(|take| *take <= MAX_TAKE)
                        .ok_or_else(|| Error::InvalidTake(value.clone()))?
                };
                self.check_offset()?;
            }
            ORDER_CREATED_AT_KEY => {
                self.order_created_at = if trimmed.is_empty() {
                    SortDir::Asc
                } else {
                    SortDir::parse(trimmed)?
                };
            }
            _ => {}
        }

        self.params.insert(key, value);
        Ok(())
    }

    /// `take * (page - 1)` must stay within [`MAX_OFFSET`], whichever of the
    /// two keys arrives last.
    fn check_offset(&self) -> Result<(), Error> {
        match self.page {
            Some(page) if checked_offset(page, self.take).is_none() => {
                Err(Error::InvalidPage(page.to_string()))
            }
            _ => Ok(()),
        }
    }

    pub fn with_page(mut self, page: u64) -> Self {
        let page = page.max(1);
        self.page = Some(page);
        self.params.insert(PAGE_KEY.to_string(), page.to_string());
        self
    }

    /// `take` is clamped to `1..=MAX_TAKE`.
    pub fn with_take(mut self, take: u64) -> Self {
        let take = take.clamp(1, MAX_TAKE);
        self.take = take;
        self.params.insert(TAKE_KEY.to_string(), take.to_string());
        self
    }

    pub fn with_order_created_at(mut self, dir: SortDir) -> Self {
        self.order_created_at = dir;
        self.params
            .insert(ORDER_CREATED_AT_KEY.to_string(), dir.as_str().to_string());
        self
    }

    /// Add a free-form parameter such as `where__title__i_like`.
    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Result<Self, Error> {
        self.set(key, value)?;
        Ok(self)
    }

    pub fn page(&self) -> Option<u64> {
        self.page
    }

    pub fn take(&self) -> u64 {
        self.take
    }

    pub fn order_created_at(&self) -> SortDir {
        self.order_created_at
    }

    pub fn is_cursor_mode(&self) -> bool {
        self.page.is_none()
    }

    /// `take * (page - 1)` in offset mode, capped at [`MAX_OFFSET`] for
    /// pages set through [`Self::with_page`].
    pub fn offset(&self) -> Option<u64> {
        self.page
            .map(|page| checked_offset(page, self.take).unwrap_or(MAX_OFFSET))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Raw parameters in key order.
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

fn checked_offset(page: u64, take: u64) -> Option<u64> {
    take.checked_mul(page.saturating_sub(1))
        .filter(|offset| *offset <= MAX_OFFSET)
}

fn parse_positive(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok().filter(|n| *n > 0)
}
