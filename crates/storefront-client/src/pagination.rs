//! Page totals for list endpoints.
//!
//! The commerce API reports how many items match a listing in one of two
//! places, depending on how it is deployed:
//!
//! ## Headers
//! ```text
//! X-WP-Total: 23
//! X-WP-TotalPages: 3
//! ```
//! with the body being a bare JSON array of items.
//!
//! ## Enveloped body
//! ```json
//! { "products": [ ... ], "total": 23, "totalPages": 3 }
//! ```
//!
//! [`TotalsSource`] picks the preferred place; the other one is used as a
//! fallback. `total_pages` is always recomputed from `total` and `per_page`
//! so the two can never disagree.

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use storefront_core::{PagedResult, TotalsSource};

use crate::error::ClientError;

pub const TOTAL_HEADER: &str = "x-wp-total";
pub const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

/// Totals reported by one source (headers or body). Either may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportedTotals {
    pub total: Option<u64>,
    pub total_pages: Option<u64>,
}

/// Items of a list response plus whatever totals its body carried.
#[derive(Debug)]
pub struct ListingBody<T> {
    pub items: Vec<T>,
    pub totals: ReportedTotals,
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(alias = "products", alias = "categories", alias = "brands")]
    items: Vec<T>,
    #[serde(default, deserialize_with = "deserialize_count")]
    total: Option<u64>,
    #[serde(
        default,
        rename = "totalPages",
        alias = "total_pages",
        deserialize_with = "deserialize_count"
    )]
    total_pages: Option<u64>,
}

/// Reads `X-WP-Total` / `X-WP-TotalPages`. Unparseable values count as absent.
#[must_use]
pub fn totals_from_headers(headers: &HeaderMap) -> ReportedTotals {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
    };
    ReportedTotals {
        total: read(TOTAL_HEADER),
        total_pages: read(TOTAL_PAGES_HEADER),
    }
}

/// Splits a list response body into items and body-reported totals.
///
/// Accepts a bare array or an object whose item list is under `items`,
/// `products`, `categories` or `brands`.
///
/// # Errors
///
/// Returns [`ClientError::Deserialize`] if the body has neither shape or an
/// item does not decode.
pub fn parse_listing_body<T: DeserializeOwned>(
    body: serde_json::Value,
    context: &str,
) -> Result<ListingBody<T>, ClientError> {
    let to_err = |source| ClientError::Deserialize {
        context: context.to_owned(),
        source,
    };
    if body.is_array() {
        let items = serde_json::from_value::<Vec<T>>(body).map_err(to_err)?;
        return Ok(ListingBody {
            items,
            totals: ReportedTotals::default(),
        });
    }
    let envelope = serde_json::from_value::<Envelope<T>>(body).map_err(to_err)?;
    Ok(ListingBody {
        items: envelope.items,
        totals: ReportedTotals {
            total: envelope.total,
            total_pages: envelope.total_pages,
        },
    })
}

/// Combines a page of items with the reported totals into a [`PagedResult`].
///
/// When neither source reports a total, a non-empty page counts the items up
/// to and including itself, so the pager never offers pages the API did not
/// confirm. An empty page confirms nothing about earlier pages and reports a
/// total of zero. Items beyond `per_page` are dropped.
#[must_use]
pub fn assemble_page<T>(
    mut items: Vec<T>,
    page: u32,
    per_page: u32,
    preferred: TotalsSource,
    from_headers: ReportedTotals,
    from_body: ReportedTotals,
) -> PagedResult<T> {
    let (first, second) = match preferred {
        TotalsSource::Headers => (from_headers, from_body),
        TotalsSource::Body => (from_body, from_headers),
    };

    let limit = per_page as usize;
    if items.len() > limit {
        tracing::warn!(
            returned = items.len(),
            per_page,
            "API returned more items than requested; truncating"
        );
        items.truncate(limit);
    }

    let total = first.total.or(second.total).unwrap_or_else(|| {
        let before = if items.is_empty() {
            0
        } else {
            u64::from(page.saturating_sub(1)) * u64::from(per_page)
        };
        let fallback = before + items.len() as u64;
        tracing::warn!(page, fallback, "no page total reported; using items seen so far");
        fallback
    });

    let result = PagedResult::new(items, total, per_page);
    if let Some(reported) = first.total_pages.or(second.total_pages) {
        if reported != result.total_pages {
            tracing::debug!(
                reported,
                derived = result.total_pages,
                total,
                per_page,
                "reported page count differs from derived page count"
            );
        }
    }
    result
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCount {
    Number(u64),
    Text(String),
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawCount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawCount::Number(n)) => Ok(Some(n)),
        Some(RawCount::Text(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
