#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`TestApp`] wires the real kernel routes, listing service and templates
//! over a [`MemoryRestaurantStore`], with an in-memory session store in place
//! of Redis. Each test builds its own app from its own seeded store.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::Path;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum::routing::get;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};

use tavola_kernel::AppState;
use tavola_kernel::session::SESSION_USER_ID;
use tavola_kernel::store::{MemoryRestaurantStore, RestaurantStore};
use tavola_kernel::theme::ThemeEngine;

/// Path to the project `templates/` directory.
pub fn templates_dir() -> std::path::PathBuf {
    // Tests run from crates/kernel/, so go up two levels
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../templates")
        .canonicalize()
        .expect("templates directory missing")
}

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryRestaurantStore>,
    pub state: AppState,
}

impl TestApp {
    /// Build the app around a seeded store.
    pub fn new(store: MemoryRestaurantStore) -> Self {
        let theme = ThemeEngine::new(&templates_dir()).expect("Failed to load templates");
        Self::with_theme(store, theme)
    }

    /// Build the app with a custom theme, e.g. one missing templates.
    pub fn with_theme(store: MemoryRestaurantStore, theme: ThemeEngine) -> Self {
        let store = Arc::new(store);
        let dyn_store: Arc<dyn RestaurantStore> = store.clone();
        let state = AppState::with_store(dyn_store, theme);

        let session_layer = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);

        // Must match main.rs, plus a sign-in shortcut
        let router = tavola_kernel::routes::app(&state)
            .route("/test/login/{id}", get(test_login))
            .layer(session_layer)
            .layer(tower_http::trace::TraceLayer::new_for_http())
            .with_state(state.clone());

        Self {
            router,
            store,
            state,
        }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// GET a path anonymously.
    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    /// GET a path with session cookies from [`login`](Self::login).
    pub async fn get_with_cookies(&self, uri: &str, cookies: &str) -> Response {
        self.request(
            Request::get(uri)
                .header(header::COOKIE, cookies)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Sign in as `user_id` and return the session cookie.
    pub async fn login(&self, user_id: i64) -> String {
        let response = self.get(&format!("/test/login/{user_id}")).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        extract_cookies(&response)
    }
}

async fn test_login(session: Session, Path(id): Path<i64>) -> StatusCode {
    session
        .insert(SESSION_USER_ID, id)
        .await
        .expect("Failed to write session");
    StatusCode::NO_CONTENT
}

/// Collect `Set-Cookie` name=value pairs into a `Cookie` header value.
pub fn extract_cookies(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Read a response body as text.
pub async fn response_text(response: Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&body).to_string()
}
