use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The request could not be turned into a query or link.
    #[error(transparent)]
    Query(#[from] listing_core::Error),

    /// The repository call failed.
    #[error(transparent)]
    Repository(anyhow::Error),
}

impl Error {
    /// The request-level cause, if any.
    ///
    /// Adapters report unknown fields and bad literals as a
    /// `listing_core::Error` inside their `anyhow` error; those count too.
    pub fn client_error(&self) -> Option<&listing_core::Error> {
        let core = match self {
            Error::Query(e) => Some(e),
            Error::Repository(e) => e.downcast_ref::<listing_core::Error>(),
        };
        core.filter(|e| e.is_client_error())
    }
}
