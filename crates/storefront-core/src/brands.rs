use serde::{Deserialize, Serialize};

/// A brand as returned by the commerce API's `/brands` endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: i64,
    pub name: String,
    pub slug: String,
    /// Raw HTML description. May be `null` or absent.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<BrandImage>,
    /// Number of published products carrying this brand.
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandImage {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}
