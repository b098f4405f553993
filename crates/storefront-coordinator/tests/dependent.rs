mod support;

use std::sync::Arc;
use std::time::Duration;

use storefront_coordinator::{
    BrandProductsCoordinator, CategoryProductsCoordinator, DependentState, LoadOutcome, ViewError,
};
use support::{brand, branded, category, in_category, FakeCatalog};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Brand 7 ("acme") has 15 products, brand 8 ("globex") has 2.
fn brand_catalog() -> Arc<FakeCatalog> {
    let mut products: Vec<_> = (1..=15).map(|id| branded(id, 7)).collect();
    products.extend((16..=17).map(|id| branded(id, 8)));
    Arc::new(
        FakeCatalog::new(products).with_brands(vec![brand(7, "acme"), brand(8, "globex")]),
    )
}

#[tokio::test]
async fn open_resolves_brand_then_loads_first_page() {
    let catalog = brand_catalog();
    let coordinator = BrandProductsCoordinator::new(Arc::clone(&catalog), 12, TIMEOUT);

    assert_eq!(coordinator.open("acme").await, LoadOutcome::Committed);

    match coordinator.snapshot() {
        DependentState::ChildrenLoaded {
            parent,
            page,
            products,
        } => {
            assert_eq!(parent.id, 7);
            assert_eq!(page, 1);
            assert_eq!(products.items.len(), 12);
            assert_eq!(products.total, 15);
            assert_eq!(products.total_pages, 2);
        }
        other => panic!("expected ChildrenLoaded, got {other:?}"),
    }

    let calls = catalog.product_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].filters.brand, Some(7));
    assert_eq!(calls[0].page, 1);
    assert_eq!(calls[0].per_page, 12);
}

#[tokio::test]
async fn unknown_brand_never_requests_products() {
    let catalog = brand_catalog();
    let coordinator = BrandProductsCoordinator::new(Arc::clone(&catalog), 12, TIMEOUT);

    coordinator.open("initech").await;

    assert_eq!(
        coordinator.snapshot(),
        DependentState::ParentNotFound {
            slug: "initech".to_owned()
        }
    );
    assert_eq!(catalog.brand_calls(), 1);
    assert!(catalog.product_calls().is_empty());
}

#[tokio::test]
async fn failed_lookup_never_requests_products() {
    let catalog = brand_catalog();
    catalog.fail_lookups(true);
    let coordinator = BrandProductsCoordinator::new(Arc::clone(&catalog), 12, TIMEOUT);

    coordinator.open("acme").await;

    let state = coordinator.snapshot();
    assert!(matches!(
        state,
        DependentState::ParentError {
            error: ViewError::Retrieval(_),
            ..
        }
    ));
    assert!(state.parent().is_none());
    assert!(catalog.product_calls().is_empty());
}

#[tokio::test]
async fn blank_slug_is_a_validation_error() {
    let catalog = brand_catalog();
    let coordinator = BrandProductsCoordinator::new(Arc::clone(&catalog), 12, TIMEOUT);

    coordinator.open("   ").await;

    assert!(matches!(
        coordinator.snapshot().error(),
        Some(ViewError::Validation(_))
    ));
    assert_eq!(catalog.brand_calls(), 0);
    assert!(catalog.product_calls().is_empty());
}

#[tokio::test]
async fn no_product_request_while_brand_is_resolving() {
    let catalog = brand_catalog();
    let gate = catalog.gate_slug("acme");
    let coordinator = BrandProductsCoordinator::new(Arc::clone(&catalog), 12, TIMEOUT);

    let open = coordinator.open("acme");
    let observe = async {
        tokio::task::yield_now().await;
        let during = coordinator.snapshot();
        let calls_during = catalog.product_calls().len();
        gate.notify_one();
        (during, calls_during)
    };
    let (outcome, (during, calls_during)) = tokio::join!(open, observe);

    assert_eq!(
        during,
        DependentState::ResolvingParent {
            slug: "acme".to_owned()
        }
    );
    assert!(during.is_loading());
    assert_eq!(calls_during, 0);
    assert_eq!(outcome, LoadOutcome::Committed);
    assert_eq!(catalog.product_calls().len(), 1);
}

#[tokio::test]
async fn set_page_reuses_resolved_brand() {
    let catalog = brand_catalog();
    let coordinator = BrandProductsCoordinator::new(Arc::clone(&catalog), 12, TIMEOUT);
    coordinator.open("acme").await;

    assert_eq!(coordinator.set_page(2).await, LoadOutcome::Committed);

    match coordinator.snapshot() {
        DependentState::ChildrenLoaded { page, products, .. } => {
            assert_eq!(page, 2);
            assert_eq!(products.items.len(), 3);
        }
        other => panic!("expected ChildrenLoaded, got {other:?}"),
    }
    assert_eq!(catalog.brand_calls(), 1);
    assert_eq!(catalog.product_calls().len(), 2);
    assert_eq!(catalog.product_calls()[1].filters.brand, Some(7));
}

#[tokio::test]
async fn set_page_before_resolution_is_not_ready() {
    let catalog = brand_catalog();
    let coordinator = BrandProductsCoordinator::new(Arc::clone(&catalog), 12, TIMEOUT);

    assert_eq!(coordinator.set_page(2).await, LoadOutcome::NotReady);
    coordinator.open("initech").await;
    assert_eq!(coordinator.set_page(2).await, LoadOutcome::NotReady);
    assert!(catalog.product_calls().is_empty());
}

#[tokio::test]
async fn reopening_same_slug_is_unchanged() {
    let catalog = brand_catalog();
    let coordinator = BrandProductsCoordinator::new(Arc::clone(&catalog), 12, TIMEOUT);
    coordinator.open("acme").await;

    assert_eq!(coordinator.open(" acme ").await, LoadOutcome::Unchanged);
    assert_eq!(coordinator.set_page(1).await, LoadOutcome::Unchanged);
    assert_eq!(catalog.brand_calls(), 1);
    assert_eq!(catalog.product_calls().len(), 1);
}

#[tokio::test]
async fn reopening_after_not_found_resolves_again() {
    let catalog = brand_catalog();
    let coordinator = BrandProductsCoordinator::new(Arc::clone(&catalog), 12, TIMEOUT);

    coordinator.open("initech").await;
    coordinator.open("initech").await;

    assert_eq!(catalog.brand_calls(), 2);
}

#[tokio::test]
async fn changing_slug_resets_and_resolves_new_brand() {
    let catalog = brand_catalog();
    let coordinator = BrandProductsCoordinator::new(Arc::clone(&catalog), 12, TIMEOUT);
    coordinator.open("acme").await;
    coordinator.set_page(2).await;

    coordinator.open("globex").await;

    match coordinator.snapshot() {
        DependentState::ChildrenLoaded {
            parent,
            page,
            products,
        } => {
            assert_eq!(parent.slug, "globex");
            assert_eq!(page, 1);
            assert_eq!(products.total, 2);
        }
        other => panic!("expected ChildrenLoaded, got {other:?}"),
    }
    assert_eq!(catalog.brand_calls(), 2);
}

#[tokio::test]
async fn stale_brand_resolution_is_discarded() {
    let catalog = brand_catalog();
    let gate = catalog.gate_slug("acme");
    let coordinator = BrandProductsCoordinator::new(Arc::clone(&catalog), 12, TIMEOUT);

    let older = coordinator.open("acme");
    let newer = async {
        tokio::task::yield_now().await;
        let outcome = coordinator.open("globex").await;
        gate.notify_one();
        outcome
    };
    let (older_outcome, newer_outcome) = tokio::join!(older, newer);

    assert_eq!(newer_outcome, LoadOutcome::Committed);
    assert_eq!(older_outcome, LoadOutcome::Superseded);
    assert_eq!(
        coordinator.snapshot().parent().map(|b| b.slug.clone()),
        Some("globex".to_owned())
    );

    let calls = catalog.product_calls();
    assert_eq!(calls.len(), 1, "no products requested for the stale brand");
    assert_eq!(calls[0].filters.brand, Some(8));
}

#[tokio::test]
async fn stale_page_response_is_discarded() {
    let catalog = brand_catalog();
    let coordinator = BrandProductsCoordinator::new(Arc::clone(&catalog), 5, TIMEOUT);
    coordinator.open("acme").await;

    let gate = catalog.gate_page(2);
    let older = coordinator.set_page(2);
    let newer = async {
        tokio::task::yield_now().await;
        let outcome = coordinator.set_page(3).await;
        gate.notify_one();
        outcome
    };
    let (older_outcome, newer_outcome) = tokio::join!(older, newer);

    assert_eq!(newer_outcome, LoadOutcome::Committed);
    assert_eq!(older_outcome, LoadOutcome::Superseded);
    assert_eq!(coordinator.snapshot().page(), Some(3));
}

#[tokio::test]
async fn product_failure_keeps_parent() {
    let catalog = brand_catalog();
    catalog.fail_products(true);
    let coordinator = BrandProductsCoordinator::new(Arc::clone(&catalog), 12, TIMEOUT);

    coordinator.open("acme").await;

    let state = coordinator.snapshot();
    assert!(matches!(
        state,
        DependentState::ChildrenError {
            page: 1,
            error: ViewError::Retrieval(_),
            ..
        }
    ));
    assert_eq!(state.parent().map(|b| b.id), Some(7));

    catalog.fail_products(false);
    assert_eq!(coordinator.reload().await, LoadOutcome::Committed);
    assert!(matches!(
        coordinator.snapshot(),
        DependentState::ChildrenLoaded { .. }
    ));
    assert_eq!(catalog.brand_calls(), 1);
}

#[tokio::test]
async fn slow_lookup_times_out() {
    let catalog = brand_catalog();
    let _gate = catalog.gate_slug("acme");
    let coordinator =
        BrandProductsCoordinator::new(Arc::clone(&catalog), 12, Duration::from_millis(50));

    coordinator.open("acme").await;

    assert!(matches!(
        coordinator.snapshot(),
        DependentState::ParentError {
            error: ViewError::Timeout,
            ..
        }
    ));
    assert!(catalog.product_calls().is_empty());
}

#[tokio::test]
async fn category_scope_filters_by_category() {
    let products = vec![in_category(1, 40), in_category(2, 40), in_category(3, 41)];
    let catalog = Arc::new(
        FakeCatalog::new(products)
            .with_categories(vec![category(40, "pistolas"), category(41, "globos")]),
    );
    let coordinator = CategoryProductsCoordinator::new(Arc::clone(&catalog), 12, TIMEOUT);

    coordinator.open("pistolas").await;

    match coordinator.snapshot() {
        DependentState::ChildrenLoaded { products, .. } => {
            let ids: Vec<i64> = products.items.iter().map(|p| p.id).collect();
            assert_eq!(ids, vec![1, 2]);
        }
        other => panic!("expected ChildrenLoaded, got {other:?}"),
    }
    assert_eq!(catalog.category_calls(), 1);
    assert_eq!(catalog.product_calls()[0].filters.category, Some(40));
}

#[tokio::test]
async fn open_at_lands_on_requested_page() {
    let catalog = brand_catalog();
    let coordinator = BrandProductsCoordinator::new(Arc::clone(&catalog), 12, TIMEOUT);

    assert_eq!(coordinator.open_at("acme", 2).await, LoadOutcome::Committed);

    assert_eq!(coordinator.snapshot().page(), Some(2));
    let calls = catalog.product_calls();
    assert_eq!(calls.len(), 1, "page 1 is not fetched first");
    assert_eq!(calls[0].page, 2);

    assert_eq!(coordinator.open_at("acme", 1).await, LoadOutcome::Committed);
    assert_eq!(catalog.brand_calls(), 1);
}

#[tokio::test]
async fn open_at_page_zero_is_a_listing_validation_error() {
    let catalog = brand_catalog();
    let coordinator = BrandProductsCoordinator::new(Arc::clone(&catalog), 12, TIMEOUT);

    coordinator.open_at("acme", 0).await;

    assert!(matches!(
        coordinator.snapshot(),
        DependentState::ChildrenError {
            error: ViewError::Validation(_),
            ..
        }
    ));
    assert!(catalog.product_calls().is_empty());
}
