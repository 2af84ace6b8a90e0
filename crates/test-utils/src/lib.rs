//! Tavola test utilities.
//!
//! Fixture builders for restaurants, categories, users and comments, a
//! seeded in-memory store, and assertion helpers for rendered pages.

use chrono::{DateTime, TimeDelta, Utc};
use tavola_kernel::models::{Category, Comment, Restaurant, User};
use tavola_kernel::store::MemoryRestaurantStore;

/// 2024-01-01T00:00:00Z; every fixture timestamp is an offset from here.
const BASE_TIMESTAMP: i64 = 1_704_067_200;

/// A description long enough to be cut on listing cards.
pub const LONG_DESCRIPTION: &str = "A family-run trattoria serving hand-rolled pasta, wood-fired \
     pizza and a rotating list of regional wines from the north of Italy.";

/// Fixture time `minutes` after the base instant.
pub fn at(minutes: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(BASE_TIMESTAMP, 0).unwrap_or_default()
        + TimeDelta::minutes(minutes)
}

/// Create a test category.
pub fn test_category(id: i64, name: &str) -> Category {
    Category {
        id,
        name: name.to_string(),
        created_at: at(0),
        updated_at: at(0),
    }
}

/// Create a test user (not an admin).
pub fn test_user(id: i64, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{name}@example.com"),
        image: None,
        is_admin: false,
    }
}

/// Create a test restaurant in the given category.
///
/// Created `id` minutes after the base instant, so higher ids are newer.
pub fn test_restaurant(id: i64, name: &str, category_id: i64) -> TestRestaurant {
    TestRestaurant {
        restaurant: Restaurant {
            id,
            name: name.to_string(),
            tel: "02-2345-6789".to_string(),
            address: format!("{id} Via Roma"),
            opening_hours: "11:00-21:00".to_string(),
            description: String::new(),
            image: None,
            views_count: 0,
            category_id,
            created_at: at(id),
            updated_at: at(id),
        },
    }
}

/// A restaurant fixture builder.
#[derive(Debug, Clone)]
pub struct TestRestaurant {
    restaurant: Restaurant,
}

impl TestRestaurant {
    /// Set the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.restaurant.description = description.to_string();
        self
    }

    /// Set the view count.
    pub fn with_views(mut self, views: i64) -> Self {
        self.restaurant.views_count = views;
        self
    }

    /// Set the image URL.
    pub fn with_image(mut self, url: &str) -> Self {
        self.restaurant.image = Some(url.to_string());
        self
    }

    /// Set the creation time, in minutes after the base instant.
    pub fn created_at(mut self, minutes: i64) -> Self {
        self.restaurant.created_at = at(minutes);
        self.restaurant.updated_at = at(minutes);
        self
    }

    pub fn build(self) -> Restaurant {
        self.restaurant
    }
}

/// Create a test comment.
///
/// Created `id` minutes after the base instant, so higher ids are newer.
pub fn test_comment(id: i64, user_id: i64, restaurant_id: i64, text: &str) -> Comment {
    Comment {
        id,
        text: text.to_string(),
        user_id,
        restaurant_id,
        created_at: at(id),
        updated_at: at(id),
    }
}

/// A store with `category_count` categories and `restaurant_count`
/// restaurants assigned to them round-robin.
///
/// Categories get ids `1..=category_count`; restaurant `i` lands in category
/// `(i - 1) % category_count + 1` and carries [`LONG_DESCRIPTION`].
pub fn seeded_store(category_count: i64, restaurant_count: i64) -> MemoryRestaurantStore {
    let store = MemoryRestaurantStore::new();

    for id in 1..=category_count {
        store.insert_category(test_category(id, &format!("Category {id}")));
    }

    for id in 1..=restaurant_count {
        let category_id = (id - 1) % category_count.max(1) + 1;
        store.insert_restaurant(
            test_restaurant(id, &format!("Restaurant {id}"), category_id)
                .with_description(LONG_DESCRIPTION)
                .build(),
        );
    }

    store
}

/// Assertion helpers for rendered pages and ordered results.
pub mod assert {
    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{}'\nActual: {}",
            needle,
            haystack
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{}'\nActual: {}",
            needle,
            haystack
        );
    }

    /// Assert that values never increase from one element to the next.
    pub fn non_increasing<T: PartialOrd + std::fmt::Debug>(values: &[T]) {
        for pair in values.windows(2) {
            assert!(
                pair[0] >= pair[1],
                "Expected non-increasing order, found {:?} before {:?} in {:?}",
                pair[0],
                pair[1],
                values
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn fixture_times_follow_ids() {
        let older = test_restaurant(1, "Old", 1).build();
        let newer = test_restaurant(2, "New", 1).build();
        assert!(newer.created_at > older.created_at);
        assert_eq!(at(0).to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn restaurant_builder() {
        let r = test_restaurant(3, "Trattoria", 2)
            .with_description("Pasta")
            .with_views(7)
            .with_image("/img/3.png")
            .created_at(120)
            .build();

        assert_eq!(r.category_id, 2);
        assert_eq!(r.description, "Pasta");
        assert_eq!(r.views_count, 7);
        assert_eq!(r.image.as_deref(), Some("/img/3.png"));
        assert_eq!(r.created_at, at(120));
    }

    #[test]
    fn seeded_store_round_robins_categories() {
        let store = seeded_store(3, 7);
        assert_eq!(store.restaurant(1).unwrap().category_id, 1);
        assert_eq!(store.restaurant(3).unwrap().category_id, 3);
        assert_eq!(store.restaurant(4).unwrap().category_id, 1);
        assert!(store.restaurant(8).is_none());
    }

    #[test]
    fn test_assertions() {
        assert::contains("hello world", "world");
        assert::not_contains("hello world", "foo");
        assert::non_increasing(&[5, 3, 3, 0]);
    }

    #[test]
    #[should_panic(expected = "non-increasing")]
    fn non_increasing_rejects_rise() {
        assert::non_increasing(&[1, 2]);
    }
}
