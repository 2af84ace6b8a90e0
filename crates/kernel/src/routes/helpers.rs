//! Shared route helpers for page rendering.

use axum::response::Html;
use tower_sessions::Session;
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::listing::View;
use crate::models::CurrentUser;
use crate::session::SESSION_USER_ID;
use crate::state::AppState;

/// Resolve the signed-in user for this request, if any.
///
/// An unreadable session counts as anonymous. A user id whose record is
/// gone also counts as anonymous; a store failure while loading it does not.
pub async fn current_user(state: &AppState, session: &Session) -> AppResult<Option<CurrentUser>> {
    let user_id: Option<i64> = match session.get(SESSION_USER_ID).await {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "failed to read session, treating request as anonymous");
            None
        }
    };

    let Some(id) = user_id else {
        return Ok(None);
    };

    state
        .store()
        .current_user(id)
        .await
        .map_err(AppError::DataStore)
}

/// Render a view model through the theme engine.
pub fn render_page<V: View>(
    state: &AppState,
    view: &V,
    user: Option<&CurrentUser>,
) -> AppResult<Html<String>> {
    let html = state.theme().render_view(view, user)?;
    Ok(Html(html))
}

/// Parse a restaurant id from the path. Anything that is not an id is
/// reported the same way as an id with no restaurant behind it.
pub fn parse_restaurant_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>().map_err(|_| AppError::NotFound)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn restaurant_id_parsing() {
        assert_eq!(parse_restaurant_id("42").unwrap(), 42);
        assert!(matches!(parse_restaurant_id("abc"), Err(AppError::NotFound)));
        assert!(matches!(parse_restaurant_id(""), Err(AppError::NotFound)));
    }
}
