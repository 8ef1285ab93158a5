//! Collection route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::catalog::types::{Collection, CollectionPage};
use crate::error::Result;
use crate::state::AppState;

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub first: Option<u32>,
    pub after: Option<String>,
}

/// Collection listing (paginated).
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<CollectionPage>> {
    let page = state
        .catalog()
        .get_collections(query.first, query.after)
        .await?;
    Ok(Json(page))
}

/// Collection detail by slug.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Collection>> {
    let collection = state.catalog().get_collection_by_slug(&slug).await?;
    Ok(Json(collection))
}
