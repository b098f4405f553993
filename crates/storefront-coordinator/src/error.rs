use storefront_client::ClientError;
use thiserror::Error;

/// Errors a catalog view shows in place of its content.
///
/// `Clone` so it can live inside published coordinator state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// Network or server failure.
    #[error("catalog retrieval failed: {0}")]
    Retrieval(String),

    #[error("{entity} \"{slug}\" not found")]
    NotFound { entity: &'static str, slug: String },

    /// Missing or malformed request parameter.
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("catalog request timed out")]
    Timeout,
}

impl ViewError {
    /// Message suitable for showing to a shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ViewError::Retrieval(_) => {
                "We couldn't load this content right now. Please try again later.".to_owned()
            }
            ViewError::NotFound { entity, .. } => {
                format!("The {entity} you are looking for does not exist.")
            }
            ViewError::Validation(reason) => format!("This page can't be shown: {reason}."),
            ViewError::Timeout => {
                "The catalog is taking too long to respond. Please try again.".to_owned()
            }
        }
    }
}

impl From<ClientError> for ViewError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Validation(reason) => ViewError::Validation(reason),
            ClientError::Timeout { .. } => ViewError::Timeout,
            other => ViewError::Retrieval(other.to_string()),
        }
    }
}
