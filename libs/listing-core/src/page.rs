use serde::{Deserialize, Serialize};

/// Offset-mode envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub data: Vec<T>,
    /// Matching rows ignoring limit/offset.
    pub total: u64,
}

impl<T> PageResult<T> {
    pub fn new(data: Vec<T>, total: u64) -> Self {
        Self { data, total }
    }

    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor<I> {
    pub after: Option<I>,
}

/// Cursor-mode envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorResult<T, I> {
    pub data: Vec<T>,
    pub cursor: Cursor<I>,
    /// Rows in this page, not the total.
    pub count: usize,
    pub next: Option<String>,
}

impl<T, I> CursorResult<T, I> {
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> CursorResult<U, I> {
        CursorResult {
            data: self.data.into_iter().map(f).collect(),
            cursor: self.cursor,
            count: self.count,
            next: self.next,
        }
    }
}

/// Exactly one of the two envelopes; serialized without a tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Paginated<T, I> {
    Cursor(CursorResult<T, I>),
    Page(PageResult<T>),
}

impl<T, I> Paginated<T, I> {
    pub fn data(&self) -> &[T] {
        match self {
            Paginated::Page(page) => &page.data,
            Paginated::Cursor(cursor) => &cursor.data,
        }
    }

    /// Next-page URL; always `None` in offset mode.
    pub fn next(&self) -> Option<&str> {
        match self {
            Paginated::Page(_) => None,
            Paginated::Cursor(cursor) => cursor.next.as_deref(),
        }
    }

    pub fn into_page(self) -> Option<PageResult<T>> {
        match self {
            Paginated::Page(page) => Some(page),
            Paginated::Cursor(_) => None,
        }
    }

    pub fn into_cursor(self) -> Option<CursorResult<T, I>> {
        match self {
            Paginated::Cursor(cursor) => Some(cursor),
            Paginated::Page(_) => None,
        }
    }

    /// Domain -> DTO mapping that keeps the envelope intact.
    pub fn map_items<U>(self, f: impl FnMut(T) -> U) -> Paginated<U, I> {
        match self {
            Paginated::Page(page) => Paginated::Page(page.map_items(f)),
            Paginated::Cursor(cursor) => Paginated::Cursor(cursor.map_items(f)),
        }
    }
}
