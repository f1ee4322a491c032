use listing_core::{
    compose_query, Cursor, CursorResult, LinkConfig, PageResult, Paginated, PaginationRequest,
    QueryOverride,
};
use tracing::{debug, field::Empty, instrument, Span};

use crate::{Error, Listable, Repository};

/// Offset/cursor strategy selection for list requests.
///
/// Holds only immutable link configuration; share it behind an `Arc`.
#[derive(Clone, Debug)]
pub struct Paginator {
    links: LinkConfig,
}

impl Paginator {
    pub fn new(links: LinkConfig) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &LinkConfig {
        &self.links
    }

    /// Run one list request against `repo`.
    ///
    /// A `page` in the request selects offset mode and yields a
    /// [`PageResult`] with the total match count. Otherwise the request is
    /// served in cursor mode: a single `find` with `limit = take`, and a
    /// `next` link built from the last row when the page came back full.
    ///
    /// `resource_path` is the path of the list endpoint relative to the
    /// link host, e.g. `posts`.
    #[instrument(
        name = "listkit.paginate",
        skip_all,
        fields(path = %resource_path, mode = Empty, take = request.take())
    )]
    pub async fn paginate<T, R>(
        &self,
        request: &PaginationRequest,
        repo: &R,
        overrides: &QueryOverride,
        resource_path: &str,
    ) -> Result<Paginated<T, T::Id>, Error>
    where
        T: Listable + Send,
        R: Repository<T> + ?Sized,
    {
        let spec = compose_query(request, overrides)?;
        debug!(
            filters = spec.filters.len(),
            order = %spec.order.to_signed_tokens(),
            offset = ?spec.offset,
            "composed list query"
        );

        if request.page().is_some() {
            Span::current().record("mode", "offset");
            let (data, total) = repo
                .find_and_count(&spec)
                .await
                .map_err(Error::Repository)?;
            debug!(rows = data.len(), total, "offset page loaded");
            return Ok(Paginated::Page(PageResult::new(data, total)));
        }

        Span::current().record("mode", "cursor");
        let data = repo.find(&spec).await.map_err(Error::Repository)?;
        let after = last_item_id(&data, request.take());
        let next = self.links.next_link(
            request,
            resource_path,
            request.order_created_at(),
            after.as_ref(),
        )?;
        debug!(rows = data.len(), has_next = next.is_some(), "cursor page loaded");

        Ok(Paginated::Cursor(CursorResult {
            count: data.len(),
            cursor: Cursor { after },
            data,
            next,
        }))
    }
}

/// Id of the last row when the page is full.
///
/// A full page is taken to mean more rows may follow. When the final page
/// happens to be exactly full, the link it produces leads to one empty page.
fn last_item_id<T: Listable>(data: &[T], take: u64) -> Option<T::Id> {
    let full = take > 0 && u64::try_from(data.len()).is_ok_and(|len| len == take);
    if full {
        data.last().map(Listable::id)
    } else {
        None
    }
}
