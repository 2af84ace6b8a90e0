#![allow(clippy::unwrap_used, clippy::expect_used)]
//! HTTP-level tests through the real router.

mod common;

use axum::http::{StatusCode, header};
use std::collections::HashSet;

use tavola_kernel::store::{MemoryRestaurantStore, StoreOperation};
use tavola_kernel::theme::ThemeEngine;
use tavola_test_utils::{assert, seeded_store, test_comment, test_user};

use common::{TestApp, response_text};

fn app() -> TestApp {
    let store = seeded_store(2, 12);
    store.insert_user(test_user(1, "alice"));
    store.insert_comment(test_comment(1, 1, 1, "Lovely terrace"));
    store.add_favorite(1, 1);
    TestApp::new(store)
}

#[tokio::test]
async fn root_redirects_to_listing() {
    let app = app();

    let response = app.get("/").await;

    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/restaurants"
    );
}

#[tokio::test]
async fn listing_renders_cards_and_filter() {
    let app = app();

    let response = app.get("/restaurants?categoryId=2&page=1&limit=3").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = response_text(response).await;
    assert::contains(&html, "Restaurant 2");
    assert::contains(&html, "Restaurant 6");
    assert::not_contains(&html, "Restaurant 1<");
    assert::contains(&html, r#"data-total-pages="2""#);
    assert::contains(&html, "categoryId=2");
}

#[tokio::test]
async fn listing_tolerates_garbage_params() {
    let app = app();

    let response = app
        .get("/restaurants?categoryId=abc&page=-1&limit=zero")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = response_text(response).await;
    assert::contains(&html, "Restaurant 9");
    assert::not_contains(&html, "Restaurant 10<");
}

#[tokio::test]
async fn listing_marks_favorites_for_signed_in_user() {
    let app = app();
    let cookies = app.login(1).await;

    let html = response_text(app.get_with_cookies("/restaurants", &cookies).await).await;

    assert::contains(&html, r#"data-id="1" data-favorited="true""#);
    assert::contains(&html, r#"data-id="2" data-favorited="false""#);
    assert::contains(&html, r#"class="current-user">alice<"#);
}

#[tokio::test]
async fn detail_page_renders_and_counts_view() {
    let app = app();

    let response = app.get("/restaurants/1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = response_text(response).await;
    assert::contains(&html, "Restaurant 1");
    assert::contains(&html, "Lovely terrace");
    assert::contains(&html, "2024-01-01 00:01");
    assert::contains(&html, r#"data-favorited="false""#);

    app.state.listings().drain().await;
    assert_eq!(app.store.restaurant(1).unwrap().views_count, 1);
}

#[tokio::test]
async fn failed_render_does_not_count_view() {
    let store = seeded_store(1, 3);
    let app = TestApp::with_theme(store, ThemeEngine::empty());

    let response = app.get("/restaurants/1").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    app.state.listings().drain().await;
    assert_eq!(app.store.increment_count(), 0);
    assert_eq!(app.store.restaurant(1).unwrap().views_count, 0);
    assert_eq!(app.state.metrics().view_increments.get(), 0);
}

#[tokio::test]
async fn detail_page_flags_signed_in_user() {
    let app = app();
    let cookies = app.login(1).await;

    let html = response_text(app.get_with_cookies("/restaurants/1", &cookies).await).await;

    assert::contains(&html, r#"data-favorited="true" data-liked="false""#);
}

#[tokio::test]
async fn unknown_restaurant_is_404() {
    let app = app();

    let response = app.get("/restaurants/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_text(response).await, "Restaurant didn't exist!");

    app.state.listings().drain().await;
    assert_eq!(app.store.increment_count(), 0);
}

#[tokio::test]
async fn non_numeric_id_is_404() {
    let app = app();

    for path in ["/restaurants/abc", "/restaurants/abc/dashboard"] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn dashboard_page_does_not_count_view() {
    let app = app();

    let response = app.get("/restaurants/1/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = response_text(response).await;
    assert::contains(&html, r#"<span class="comment-count">1</span>"#);
    assert::contains(&html, r#"<span class="views-count">0</span>"#);

    app.state.listings().drain().await;
    assert_eq!(app.store.restaurant(1).unwrap().views_count, 0);
}

#[tokio::test]
async fn feeds_and_top_render() {
    let app = app();

    let response = app.get("/restaurants/feeds").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = response_text(response).await;
    assert::contains(&html, "Restaurant 12");
    assert::contains(&html, "Lovely terrace");

    let response = app.get("/restaurants/top").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = response_text(response).await;
    assert::contains(&html, r#"<span class="favorited-count">1</span>"#);
}

#[tokio::test]
async fn store_failure_is_500() {
    let app = app();
    app.store.fail(StoreOperation::ListCategories);

    let response = app.get("/restaurants").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    // No partial page leaks out
    let body = response_text(response).await;
    assert::not_contains(&body, "Restaurant 1");
}

#[tokio::test]
async fn failing_user_lookup_is_500() {
    let app = app();
    let cookies = app.login(1).await;
    app.store.fail(StoreOperation::CurrentUser);

    let response = app.get_with_cookies("/restaurants/top", &cookies).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn unknown_session_user_is_anonymous() {
    let app = app();
    let cookies = app.login(77).await;

    let response = app.get_with_cookies("/restaurants/1", &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = response_text(response).await;
    assert::not_contains(&html, "current-user");
}

#[tokio::test]
async fn health_reports_store() {
    let app = TestApp::new(MemoryRestaurantStore::new());

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&response_text(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], true);
    assert!(body["redis"].is_null());
}

#[tokio::test]
async fn metrics_count_requests_by_route() {
    let app = app();

    app.get("/restaurants/1").await;
    app.get("/restaurants/2").await;
    app.state.listings().drain().await;

    let response = app.get("/metrics").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );

    let text = response_text(response).await;
    assert::contains(&text, r#"path="/restaurants/{id}""#);
    assert::contains(&text, "view_increments_total 2");
    assert::not_contains(&text, r#"path="/metrics""#);
}

#[tokio::test]
async fn metrics_collapse_unknown_paths() {
    let app = app();

    for i in 0..5 {
        assert_eq!(app.get(&format!("/junk-{i}")).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            app.get(&format!("/restaurants/x{i}")).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    let text = response_text(app.get("/metrics").await).await;
    let series: HashSet<&str> = text
        .lines()
        .filter(|l| l.starts_with("http_requests_total{"))
        .filter_map(|l| l.rsplit_once(' ').map(|(labels, _)| labels))
        .collect();

    assert_eq!(series.len(), 2, "{series:?}");
    assert::contains(&text, r#"path="unmatched",status="404"} 5"#);
    assert::contains(&text, r#"path="/restaurants/{id}",status="404"} 5"#);
    assert::not_contains(&text, "junk");
    assert::not_contains(&text, "/restaurants/x");
}
