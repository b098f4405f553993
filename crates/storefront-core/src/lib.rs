pub mod app_config;
pub mod brands;
pub mod categories;
pub mod category_tree;
pub mod config;
pub mod markup;
pub mod pagination;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, CredentialPlacement, Credentials, Environment, TotalsSource};
pub use brands::{Brand, BrandImage};
pub use categories::{Category, HierarchicalCategory, UNCATEGORIZED_SLUG};
pub use category_tree::{build_category_tree, find_by_slug, walk};
pub use config::{load_app_config, load_app_config_from_env};
pub use markup::strip_markup;
pub use pagination::{page_window, total_pages, PagedResult};
pub use products::{
    EntityRef, Product, ProductAttribute, ProductImage, ProductKind, StockStatus,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
