//! In-memory catalog used by the coordinator tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use storefront_client::{CatalogSource, ClientError, ProductQuery};
use storefront_core::{Brand, Category, EntityRef, PagedResult, Product};
use tokio::sync::Notify;

#[derive(Default)]
pub struct FakeCatalog {
    products: Vec<Product>,
    brands: Vec<Brand>,
    categories: Vec<Category>,
    product_calls: Mutex<Vec<ProductQuery>>,
    brand_calls: AtomicUsize,
    category_calls: AtomicUsize,
    fail_products: AtomicBool,
    fail_lookups: AtomicBool,
    page_gates: Mutex<HashMap<u32, Arc<Notify>>>,
    slug_gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl FakeCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }

    pub fn with_brands(mut self, brands: Vec<Brand>) -> Self {
        self.brands = brands;
        self
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    /// Holds product requests for `page` until the returned handle is notified.
    pub fn gate_page(&self, page: u32) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.page_gates
            .lock()
            .unwrap()
            .insert(page, Arc::clone(&gate));
        gate
    }

    /// Holds parent lookups for `slug` until the returned handle is notified.
    pub fn gate_slug(&self, slug: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.slug_gates
            .lock()
            .unwrap()
            .insert(slug.to_owned(), Arc::clone(&gate));
        gate
    }

    pub fn fail_products(&self, fail: bool) {
        self.fail_products.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    pub fn product_calls(&self) -> Vec<ProductQuery> {
        self.product_calls.lock().unwrap().clone()
    }

    pub fn brand_calls(&self) -> usize {
        self.brand_calls.load(Ordering::SeqCst)
    }

    pub fn category_calls(&self) -> usize {
        self.category_calls.load(Ordering::SeqCst)
    }

    async fn wait_for_slug(&self, slug: &str) {
        let gate = self.slug_gates.lock().unwrap().get(slug).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn lookup_error() -> ClientError {
        ClientError::UnexpectedStatus {
            status: 500,
            path: "/lookup".to_owned(),
        }
    }
}

impl CatalogSource for FakeCatalog {
    async fn fetch_products(
        &self,
        query: &ProductQuery,
    ) -> Result<PagedResult<Product>, ClientError> {
        self.product_calls.lock().unwrap().push(query.clone());
        let gate = self.page_gates.lock().unwrap().get(&query.page).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_products.load(Ordering::SeqCst) {
            return Err(ClientError::UnexpectedStatus {
                status: 503,
                path: "/products".to_owned(),
            });
        }

        let filters = &query.filters;
        let matching: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| filters.on_sale.is_none_or(|on_sale| p.on_sale == on_sale))
            .filter(|p| filters.brand.is_none_or(|id| p.brands.iter().any(|b| b.id == id)))
            .filter(|p| {
                filters
                    .category
                    .is_none_or(|id| p.categories.iter().any(|c| c.id == id))
            })
            .collect();

        let per_page = query.per_page as usize;
        let start = (query.page as usize - 1) * per_page;
        let items = matching
            .iter()
            .skip(start)
            .take(per_page)
            .map(|p| (*p).clone())
            .collect();
        Ok(PagedResult::new(
            items,
            matching.len() as u64,
            query.per_page,
        ))
    }

    async fn find_brand(&self, slug: &str) -> Result<Option<Brand>, ClientError> {
        self.brand_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for_slug(slug).await;
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(Self::lookup_error());
        }
        Ok(self.brands.iter().find(|b| b.slug == slug).cloned())
    }

    async fn find_category(&self, slug: &str) -> Result<Option<Category>, ClientError> {
        self.category_calls.fetch_add(1, Ordering::SeqCst);
        self.wait_for_slug(slug).await;
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(Self::lookup_error());
        }
        Ok(self.categories.iter().find(|c| c.slug == slug).cloned())
    }
}

pub fn product(id: i64, on_sale: bool) -> Product {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "name": format!("Product {id}"),
        "slug": format!("product-{id}"),
        "price": "10.00",
        "on_sale": on_sale,
    }))
    .unwrap()
}

pub fn branded(id: i64, brand_id: i64) -> Product {
    let mut p = product(id, false);
    p.brands.push(EntityRef {
        id: brand_id,
        name: format!("Brand {brand_id}"),
        slug: format!("brand-{brand_id}"),
    });
    p
}

pub fn in_category(id: i64, category_id: i64) -> Product {
    let mut p = product(id, false);
    p.categories.push(EntityRef {
        id: category_id,
        name: format!("Category {category_id}"),
        slug: format!("category-{category_id}"),
    });
    p
}

pub fn brand(id: i64, slug: &str) -> Brand {
    Brand {
        id,
        name: slug.to_uppercase(),
        slug: slug.to_owned(),
        description: None,
        image: None,
        count: 0,
    }
}

pub fn category(id: i64, slug: &str) -> Category {
    Category {
        id,
        name: slug.to_owned(),
        slug: slug.to_owned(),
        parent: 0,
        count: 0,
        description: None,
    }
}
