use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use listing_core::QuerySpec;
use serde::Serialize;

/// A row that can appear in a list response.
///
/// The id drives the cursor boundary, so it must grow monotonically with
/// insertion order for cursor pagination to be stable.
pub trait Listable {
    type Id: Clone + Display + Serialize + Send + Sync;

    fn id(&self) -> Self::Id;
    fn created_at(&self) -> DateTime<Utc>;
}

/// Storage capability the paginator calls.
///
/// Implementations must honour every predicate, the order, `limit` and
/// `offset` of the [`QuerySpec`]. Errors are returned as-is to the caller.
#[async_trait]
pub trait Repository<T: Send>: Send + Sync {
    /// Rows matching `spec`, at most `spec.limit`.
    async fn find(&self, spec: &QuerySpec) -> anyhow::Result<Vec<T>>;

    /// Rows matching `spec` plus the total number of matches ignoring
    /// limit and offset.
    async fn find_and_count(&self, spec: &QuerySpec) -> anyhow::Result<(Vec<T>, u64)>;
}

#[async_trait]
impl<T, R> Repository<T> for Arc<R>
where
    T: Send + 'static,
    R: Repository<T> + ?Sized,
{
    async fn find(&self, spec: &QuerySpec) -> anyhow::Result<Vec<T>> {
        (**self).find(spec).await
    }

    async fn find_and_count(&self, spec: &QuerySpec) -> anyhow::Result<(Vec<T>, u64)> {
        (**self).find_and_count(spec).await
    }
}
