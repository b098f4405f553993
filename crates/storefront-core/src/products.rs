use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// A product as returned by the commerce API's `/products` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// URL slug for the product page, e.g. `"pistola-de-agua"`.
    pub slug: String,
    /// Current selling price. The API sends prices as decimal strings and
    /// uses `""` for "no price"; both absent and empty decode to `None`.
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub regular_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub on_sale: bool,
    #[serde(default)]
    pub featured: bool,
    /// Raw HTML summary. May be `null` or absent.
    #[serde(default)]
    pub short_description: Option<String>,
    /// Raw HTML body. May be `null` or absent.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock_status: StockStatus,
    /// Gallery images in display order; the first one is the primary image.
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(rename = "type", default)]
    pub kind: ProductKind,
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
    /// Variation ids for `variable` products.
    #[serde(default)]
    pub variations: Vec<i64>,
    #[serde(default)]
    pub categories: Vec<EntityRef>,
    #[serde(default)]
    pub brands: Vec<EntityRef>,
}

impl Product {
    /// Returns `true` when a sale price is set and strictly below the regular price.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        matches!(
            (self.sale_price, self.regular_price),
            (Some(sale), Some(regular)) if sale < regular
        )
    }

    #[must_use]
    pub fn is_in_stock(&self) -> bool {
        self.stock_status == StockStatus::InStock
    }

    /// The price a shopper pays right now: the sale price when discounted,
    /// otherwise `price`, falling back to `regular_price`.
    #[must_use]
    pub fn effective_price(&self) -> Option<Decimal> {
        if self.is_discounted() {
            return self.sale_price;
        }
        self.price.or(self.regular_price)
    }

    #[must_use]
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images.first()
    }

    /// Attributes that select a variation (size, colour, ...).
    pub fn variation_attributes(&self) -> impl Iterator<Item = &ProductAttribute> {
        self.attributes.iter().filter(|a| a.variation)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    InStock,
    OutOfStock,
    OnBackorder,
    #[default]
    #[serde(other)]
    Other,
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockStatus::InStock => write!(f, "in stock"),
            StockStatus::OutOfStock => write!(f, "out of stock"),
            StockStatus::OnBackorder => write!(f, "on backorder"),
            StockStatus::Other => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    #[default]
    Simple,
    Variable,
    Grouped,
    External,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(default)]
    pub id: i64,
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttribute {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// `true` when the attribute is used to pick a variation.
    #[serde(default)]
    pub variation: bool,
}

/// Lightweight `{id, name, slug}` reference embedded in a product payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Int(i64),
    Float(f64),
    Text(String),
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawPrice>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(RawPrice::Int(n)) => Ok(Some(Decimal::from(n))),
        Some(RawPrice::Float(n)) => Decimal::try_from(n)
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(RawPrice::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            Decimal::from_str(trimmed)
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
    }
}
