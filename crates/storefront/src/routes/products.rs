//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::catalog::types::{Product, ProductPage, ProductSortKey};
use crate::error::Result;
use crate::state::AppState;

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub first: Option<u32>,
    pub after: Option<String>,
    pub query: Option<String>,
    pub sort: Option<ProductSortKey>,
    pub reverse: Option<bool>,
}

/// Default page size for listings.
const DEFAULT_PAGE_SIZE: u32 = 24;

/// Product listing (paginated).
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ProductPage>> {
    let page = state
        .catalog()
        .get_products(
            Some(query.first.unwrap_or(DEFAULT_PAGE_SIZE)),
            query.after,
            query.query,
            query.sort,
            query.reverse,
        )
        .await?;

    Ok(Json(page))
}

/// Product detail by slug.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Product>> {
    let product = state.catalog().get_product_by_slug(&slug).await?;
    Ok(Json(product))
}
