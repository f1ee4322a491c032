use anyhow::Context;
use async_trait::async_trait;
use listing_core::QuerySpec;
use listkit::Repository;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QuerySelect, QueryTrait, Select,
};

use crate::{FieldMap, QuerySpecExt};

/// [`Repository`] over one sea-orm entity.
///
/// Every composed order gets `id` appended in the direction of the first
/// key, matching the id boundary of cursor links.
pub struct SeaOrmRepository<E: sea_orm::EntityTrait, C> {
    conn: C,
    fields: FieldMap<E>,
}

const TIEBREAKER: &str = "id";

impl<E, C> SeaOrmRepository<E, C>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
    C: ConnectionTrait,
{
    pub fn new(conn: C, fields: FieldMap<E>) -> Self {
        Self { conn, fields }
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    fn filtered(&self, spec: &QuerySpec) -> Result<Select<E>, listing_core::Error> {
        E::find().apply_filters(spec.filters.values(), &self.fields)
    }

    fn ordered(&self, select: Select<E>, spec: &QuerySpec) -> Result<Select<E>, listing_core::Error> {
        let order = spec
            .order
            .clone()
            .ensure_tiebreaker(TIEBREAKER, spec.order.primary_dir());
        let select = select
            .apply_order(&order, &self.fields)?
            .limit(spec.limit)
            .offset(spec.offset);
        tracing::trace!(
            sql = %select.build(self.conn.get_database_backend()),
            "list query"
        );
        Ok(select)
    }
}

#[async_trait]
impl<E, C> Repository<E::Model> for SeaOrmRepository<E, C>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    E::Column: ColumnTrait + Copy,
    C: ConnectionTrait + Send + Sync,
{
    async fn find(&self, spec: &QuerySpec) -> anyhow::Result<Vec<E::Model>> {
        let select = self.ordered(self.filtered(spec)?, spec)?;
        let rows = select.all(&self.conn).await.context("list query failed")?;
        Ok(rows)
    }

    async fn find_and_count(&self, spec: &QuerySpec) -> anyhow::Result<(Vec<E::Model>, u64)> {
        let filtered = self.filtered(spec)?;
        let total = filtered
            .clone()
            .count(&self.conn)
            .await
            .context("list count failed")?;
        let rows = self
            .ordered(filtered, spec)?
            .all(&self.conn)
            .await
            .context("list query failed")?;
        Ok((rows, total))
    }
}
