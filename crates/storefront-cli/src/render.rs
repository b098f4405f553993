//! Plain-text rendering of catalog data for the terminal.
//!
//! Every function returns the text instead of printing it so the output can
//! be asserted in tests.

use std::fmt::Write as _;

use storefront_core::{
    page_window, strip_markup, walk, Brand, HierarchicalCategory, PagedResult, Product,
};

/// How many page numbers the pager shows at once.
const PAGER_WIDTH: u64 = 5;

/// Renders the category tree, two spaces of indent per level.
pub(crate) fn category_tree(tree: &[HierarchicalCategory]) -> String {
    let mut out = String::new();
    walk(tree, &mut |depth, node| {
        let _ = writeln!(
            out,
            "{:indent$}{} ({}) [{}]",
            "",
            node.category.name,
            node.total_count(),
            node.category.slug,
            indent = depth * 2
        );
    });
    out
}

pub(crate) fn price(product: &Product) -> String {
    match (product.effective_price(), product.regular_price) {
        (Some(now), Some(was)) if product.is_discounted() => format!("{now} (was {was})"),
        (Some(now), _) => now.to_string(),
        (None, _) => "n/a".to_owned(),
    }
}

pub(crate) fn product_line(product: &Product) -> String {
    let mut line = format!("#{:<6} {:<40} {}", product.id, product.name, price(product));
    if product.on_sale {
        line.push_str("  SALE");
    }
    if !product.is_in_stock() {
        let _ = write!(line, "  ({})", product.stock_status);
    }
    line
}

/// `Page 2 of 3  1 [2] 3`, or nothing when there is a single page.
pub(crate) fn pager(page: u32, total_pages: u64) -> Option<String> {
    if total_pages <= 1 {
        return None;
    }
    let current = u64::from(page);
    let numbers: Vec<String> = page_window(current, total_pages, PAGER_WIDTH)
        .into_iter()
        .map(|n| {
            if n == current {
                format!("[{n}]")
            } else {
                n.to_string()
            }
        })
        .collect();
    Some(format!(
        "Page {page} of {total_pages}  {}",
        numbers.join(" ")
    ))
}

pub(crate) fn product_page(result: &PagedResult<Product>, page: u32) -> String {
    if result.items.is_empty() {
        return format!("No products on page {page} ({} in total).\n", result.total);
    }
    let mut out = String::new();
    for product in &result.items {
        let _ = writeln!(out, "{}", product_line(product));
    }
    let _ = writeln!(out, "{} products", result.total);
    if let Some(pager) = pager(page, result.total_pages) {
        let _ = writeln!(out, "{pager}");
    }
    out
}

pub(crate) fn product_detail(product: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", product.name, product.slug);
    let _ = writeln!(out, "Price: {}", price(product));
    let _ = writeln!(out, "Stock: {}", product.stock_status);
    if !product.categories.is_empty() {
        let names: Vec<&str> = product.categories.iter().map(|c| c.name.as_str()).collect();
        let _ = writeln!(out, "Categories: {}", names.join(", "));
    }
    for attribute in product.variation_attributes() {
        let _ = writeln!(out, "{}: {}", attribute.name, attribute.options.join(" / "));
    }
    if let Some(image) = product.primary_image() {
        let _ = writeln!(out, "Image: {}", image.src);
    }
    let summary = product
        .short_description
        .as_deref()
        .or(product.description.as_deref())
        .map(strip_markup)
        .filter(|s| !s.is_empty());
    if let Some(summary) = summary {
        let _ = writeln!(out, "\n{summary}");
    }
    out
}

pub(crate) fn brand_header(brand: &Brand) -> String {
    let mut out = format!("{} [{}] - {} products\n", brand.name, brand.slug, brand.count);
    if let Some(description) = brand.description.as_deref().map(strip_markup) {
        if !description.is_empty() {
            let _ = writeln!(out, "{description}");
        }
    }
    out
}

pub(crate) fn brand_list(brands: &[Brand]) -> String {
    let mut out = String::new();
    for brand in brands {
        let _ = writeln!(out, "{:<30} {:<24} {:>5}", brand.name, brand.slug, brand.count);
    }
    out
}
