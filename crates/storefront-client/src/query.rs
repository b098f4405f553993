//! Query composition for `GET /products`.
//!
//! A [`ProductQuery`] is a plain value: two queries that compare equal
//! produce the same request, which is what the listing coordinator relies on
//! to decide whether a re-run is needed.

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Sort key accepted by the API's `orderby` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    Date,
    Id,
    Include,
    Title,
    Slug,
    Price,
    Popularity,
    Rating,
    MenuOrder,
}

impl OrderBy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OrderBy::Date => "date",
            OrderBy::Id => "id",
            OrderBy::Include => "include",
            OrderBy::Title => "title",
            OrderBy::Slug => "slug",
            OrderBy::Price => "price",
            OrderBy::Popularity => "popularity",
            OrderBy::Rating => "rating",
            OrderBy::MenuOrder => "menu_order",
        }
    }
}

impl std::str::FromStr for OrderBy {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(OrderBy::Date),
            "id" => Ok(OrderBy::Id),
            "include" => Ok(OrderBy::Include),
            "title" => Ok(OrderBy::Title),
            "slug" => Ok(OrderBy::Slug),
            "price" => Ok(OrderBy::Price),
            "popularity" => Ok(OrderBy::Popularity),
            "rating" => Ok(OrderBy::Rating),
            "menu_order" => Ok(OrderBy::MenuOrder),
            other => Err(ClientError::Validation(format!(
                "unknown sort key \"{other}\""
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ClientError::Validation(format!(
                "unknown sort order \"{other}\""
            ))),
        }
    }
}

/// Optional narrowing applied to a product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductFilters {
    pub category: Option<i64>,
    pub search: Option<String>,
    pub order_by: Option<OrderBy>,
    pub order: Option<SortOrder>,
    pub on_sale: Option<bool>,
    pub featured: Option<bool>,
    /// Restrict to these product ids (related products, hand-picked rails).
    pub include_ids: Vec<i64>,
    pub brand: Option<i64>,
}

/// One page of `GET /products`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
    pub filters: ProductFilters,
}

impl ProductQuery {
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            filters: ProductFilters::default(),
        }
    }

    #[must_use]
    pub fn with_filters(mut self, filters: ProductFilters) -> Self {
        self.filters = filters;
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub fn with_category(mut self, category_id: i64) -> Self {
        self.filters.category = Some(category_id);
        self
    }

    #[must_use]
    pub fn with_brand(mut self, brand_id: i64) -> Self {
        self.filters.brand = Some(brand_id);
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.filters.search = Some(search.into());
        self
    }

    #[must_use]
    pub fn with_order(mut self, order_by: OrderBy, order: SortOrder) -> Self {
        self.filters.order_by = Some(order_by);
        self.filters.order = Some(order);
        self
    }

    #[must_use]
    pub fn on_sale(mut self, on_sale: bool) -> Self {
        self.filters.on_sale = Some(on_sale);
        self
    }

    #[must_use]
    pub fn featured(mut self, featured: bool) -> Self {
        self.filters.featured = Some(featured);
        self
    }

    #[must_use]
    pub fn with_include_ids(mut self, ids: impl Into<Vec<i64>>) -> Self {
        self.filters.include_ids = ids.into();
        self
    }

    /// Checks the parts of the query the API would otherwise reject or
    /// silently reinterpret.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when `page` or `per_page` is zero.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.page == 0 {
            return Err(ClientError::Validation(
                "page must be at least 1".to_owned(),
            ));
        }
        if self.per_page == 0 {
            return Err(ClientError::Validation(
                "per_page must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Query parameters in the API's naming. Unset filters and blank search
    /// terms are omitted.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let f = &self.filters;
        let mut params = vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ];
        if let Some(category) = f.category {
            params.push(("category", category.to_string()));
        }
        if let Some(search) = f.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                params.push(("search", search.to_owned()));
            }
        }
        if let Some(order_by) = f.order_by {
            params.push(("orderby", order_by.as_str().to_owned()));
        }
        if let Some(order) = f.order {
            params.push(("order", order.as_str().to_owned()));
        }
        if let Some(on_sale) = f.on_sale {
            params.push(("on_sale", on_sale.to_string()));
        }
        if let Some(featured) = f.featured {
            params.push(("featured", featured.to_string()));
        }
        if !f.include_ids.is_empty() {
            let joined = f
                .include_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            params.push(("include", joined));
        }
        if let Some(brand) = f.brand {
            params.push(("brand", brand.to_string()));
        }
        params
    }
}
