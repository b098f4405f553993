//! Retrieval coordinators for catalog views.
//!
//! A coordinator owns the state of one logical query: it issues requests,
//! tracks loading and errors, and publishes every committed state through a
//! `tokio::sync::watch` channel. Only the most recently issued request may
//! commit; anything it supersedes is dropped on arrival.

pub mod dependent;
pub mod error;
pub mod listing;

pub use dependent::{
    BrandProductsCoordinator, BrandScope, CategoryProductsCoordinator, CategoryScope,
    DependentCoordinator, DependentState, ParentScope,
};
pub use error::ViewError;
pub use listing::{ListingCoordinator, ListingState};

/// What happened to a request issued through a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result was committed to the coordinator's state.
    Committed,
    /// A newer request started first; this result was discarded.
    Superseded,
    /// The requested state is already current; nothing was issued.
    Unchanged,
    /// The coordinator is not in a state that accepts this request.
    NotReady,
}
