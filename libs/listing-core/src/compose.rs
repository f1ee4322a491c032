use std::collections::BTreeMap;

use crate::key::parse_filter_key;
use crate::{
    Error, FilterPredicate, OperatorKind, OrderBy, PaginationRequest, QuerySpec, SortDir,
    CREATED_AT_FIELD, PAGE_KEY, TAKE_KEY,
};

pub const WHERE_PREFIX: &str = "where__";
pub const ORDER_PREFIX: &str = "order__";

/// Caller-pinned predicates and sort entries.
///
/// Applied after the request parameters, so on a field collision the pinned
/// entry replaces whatever the client sent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryOverride {
    pub filters: BTreeMap<String, FilterPredicate>,
    pub order: OrderBy,
}

impl QueryOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pin(mut self, predicate: FilterPredicate) -> Self {
        self.filters.insert(predicate.field.clone(), predicate);
        self
    }

    pub fn order_by(mut self, field: &str, dir: SortDir) -> Self {
        self.order.set(field, dir);
        self
    }
}

/// Turn a request into a [`QuerySpec`].
///
/// The first invalid parameter aborts composition.
pub fn compose_query(
    request: &PaginationRequest,
    overrides: &QueryOverride,
) -> Result<QuerySpec, Error> {
    let mut filters = BTreeMap::new();
    let mut order = OrderBy::empty();
    order.set(CREATED_AT_FIELD, request.order_created_at());

    for (key, value) in request.params() {
        if key == PAGE_KEY || key == TAKE_KEY {
            continue;
        }

        if key.starts_with(WHERE_PREFIX) {
            let parsed = parse_filter_key(key)?;
            let operator = match parsed.operator {
                Some(token) => OperatorKind::from_token(token)?,
                None => OperatorKind::Eq,
            };
            let predicate = operator.build(parsed.field, value)?;
            filters.insert(predicate.field.clone(), predicate);
        } else if key.starts_with(ORDER_PREFIX) {
            let parsed = parse_filter_key(key)?;
            if parsed.operator.is_some() {
                return Err(Error::MalformedFilterKey(key.clone()));
            }
            // empty order__createdAt already fell back to the default
            if parsed.field == CREATED_AT_FIELD && value.trim().is_empty() {
                continue;
            }
            order.set(parsed.field, SortDir::parse(value)?);
        }
    }

    for (field, predicate) in &overrides.filters {
        filters.insert(field.clone(), predicate.clone());
    }
    for key in overrides.order.iter() {
        order.set(&key.field, key.dir);
    }

    Ok(QuerySpec {
        filters,
        order,
        limit: request.take(),
        offset: request.offset(),
    })
}
