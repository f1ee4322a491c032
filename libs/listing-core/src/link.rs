use std::fmt::Display;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, PaginationRequest, SortDir};

/// Boundary key appended for ascending cursors.
pub const CURSOR_AFTER_KEY: &str = "where__id__more_than";
/// Boundary key appended for descending cursors.
pub const CURSOR_BEFORE_KEY: &str = "where__id__less_than";

/// Public base of emitted next-page links, e.g. `https` + `api.example.com`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub protocol: String,
    pub host: String,
}

impl LinkConfig {
    pub fn new(protocol: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            host: host.into(),
        }
    }

    /// `{protocol}://{host}/{path}` without a query.
    pub fn base_url(&self, path: &str) -> Result<Url, Error> {
        let raw = format!(
            "{}://{}/{}",
            self.protocol,
            self.host,
            path.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| Error::InvalidLinkBase(format!("{raw}: {e}")))
    }

    /// Build the URL of the page after `last_id`.
    ///
    /// Returns `Ok(None)` when there is no last id. Every non-empty request
    /// parameter is carried over in key order, minus any previous id
    /// boundary, and a single boundary matching `direction` is appended.
    pub fn next_link<I>(
        &self,
        request: &PaginationRequest,
        path: &str,
        direction: SortDir,
        last_id: Option<&I>,
    ) -> Result<Option<String>, Error>
    where
        I: Display + ?Sized,
    {
        let Some(last_id) = last_id else {
            return Ok(None);
        };

        let mut url = self.base_url(path)?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in request.params() {
                if value.is_empty() || key == CURSOR_AFTER_KEY || key == CURSOR_BEFORE_KEY {
                    continue;
                }
                query.append_pair(key, value);
            }
            let boundary = match direction {
                SortDir::Asc => CURSOR_AFTER_KEY,
                SortDir::Desc => CURSOR_BEFORE_KEY,
            };
            query.append_pair(boundary, &last_id.to_string());
        }
        Ok(Some(String::from(url)))
    }
}
