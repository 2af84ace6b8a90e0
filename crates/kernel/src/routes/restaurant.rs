//! Restaurant page routes.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::response::{Html, Redirect};
use axum::routing::get;
use serde::Deserialize;
use tower_sessions::Session;

use super::helpers::{current_user, parse_restaurant_id, render_page};
use crate::error::AppResult;
use crate::listing::ListingQuery;
use crate::state::AppState;

/// Raw listing query string. Values stay strings so that junk falls back
/// to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
struct ListingParams {
    #[serde(rename = "categoryId")]
    category_id: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

/// Create the restaurant router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(front))
        .route("/restaurants", get(list_restaurants))
        .route("/restaurants/feeds", get(feeds))
        .route("/restaurants/top", get(top_restaurants))
        .route("/restaurants/{id}", get(show_restaurant))
        .route("/restaurants/{id}/dashboard", get(dashboard))
}

async fn front() -> Redirect {
    Redirect::to("/restaurants")
}

/// Paginated listing, optionally filtered by category.
async fn list_restaurants(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListingParams>,
) -> AppResult<Html<String>> {
    let user = current_user(&state, &session).await?;
    let query = ListingQuery::from_params(
        params.category_id.as_deref(),
        params.page.as_deref(),
        params.limit.as_deref(),
    );

    let page = state.listings().restaurants(user.as_ref(), query).await?;
    render_page(&state, &page, user.as_ref())
}

/// Restaurant detail; counts a view once the page has rendered.
async fn show_restaurant(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let id = parse_restaurant_id(&id)?;
    let user = current_user(&state, &session).await?;

    let page = state.listings().restaurant(user.as_ref(), id).await?;
    let html = render_page(&state, &page, user.as_ref())?;

    state.listings().count_view(id);

    Ok(html)
}

async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let id = parse_restaurant_id(&id)?;
    let user = current_user(&state, &session).await?;

    let page = state.listings().dashboard(id).await?;
    render_page(&state, &page, user.as_ref())
}

async fn feeds(State(state): State<AppState>, session: Session) -> AppResult<Html<String>> {
    let user = current_user(&state, &session).await?;

    let page = state.listings().feeds().await?;
    render_page(&state, &page, user.as_ref())
}

async fn top_restaurants(
    State(state): State<AppState>,
    session: Session,
) -> AppResult<Html<String>> {
    let user = current_user(&state, &session).await?;

    let page = state.listings().top_restaurants(user.as_ref()).await?;
    render_page(&state, &page, user.as_ref())
}
