pub mod client;
pub mod error;
pub mod pagination;
pub mod query;
pub mod source;

pub use client::CommerceClient;
pub use error::ClientError;
pub use query::{OrderBy, ProductFilters, ProductQuery, SortOrder};
pub use source::CatalogSource;
