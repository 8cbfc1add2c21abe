//! # Hastane Web
//!
//! HTTP surface for the hastane backend.
//!
//! Handles:
//! - The view registry: template sources compiled once at startup
//! - The route dispatcher: one axum route per entry of the route table
//! - Rendering statement outcomes (rows or store errors) into HTML
//!
//! Uses `hastane-core` for the route table, statements and the query executor.

#![warn(rust_2018_idioms)]

pub mod health;
pub mod router;
pub mod views;

pub use router::{build_router, required_views, AppState};
pub use views::{ViewContext, ViewError, ViewRegistry};

use std::path::Path;

/// Compile the views in `dir` and verify every dispatched view is present.
///
/// # Errors
/// Returns a `ViewError` if a template fails to compile or a view the router needs is missing.
pub fn load_views(dir: &Path) -> Result<ViewRegistry, ViewError> {
    let views = ViewRegistry::load(dir)?;
    views.ensure_complete(required_views())?;
    Ok(views)
}
