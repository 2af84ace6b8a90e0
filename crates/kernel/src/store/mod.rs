//! Restaurant data store abstraction.
//!
//! Every read the listing pages perform, plus the single write (the view
//! counter), goes through [`RestaurantStore`]. Production uses
//! [`PgRestaurantStore`]; tests and local demos use
//! [`MemoryRestaurantStore`].

mod memory;
mod postgres;

use anyhow::Result;
use async_trait::async_trait;

pub use memory::{MemoryRestaurantStore, StoreOperation};
pub use postgres::PgRestaurantStore;

use crate::models::{
    Category, CommentWithContext, CurrentUser, RestaurantDetail, RestaurantFavorites,
    RestaurantSummary, RestaurantWithCategory,
};

/// One page of rows plus the size of the whole matching set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountedPage<T> {
    pub rows: Vec<T>,
    /// Matching rows before limit/offset were applied.
    pub count: i64,
}

/// Query capability the listing service consumes.
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    /// One page of restaurants with categories, plus the pre-paging count.
    ///
    /// `category_id = None` matches every restaurant.
    async fn list_restaurants(
        &self,
        category_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<CountedPage<RestaurantWithCategory>>;

    /// Every category.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Restaurant with category, comments with authors, favoriting and liking users.
    async fn find_restaurant(&self, id: i64) -> Result<Option<RestaurantDetail>>;

    /// Restaurant with category and comments.
    async fn find_restaurant_summary(&self, id: i64) -> Result<Option<RestaurantSummary>>;

    /// Newest restaurants first.
    async fn recent_restaurants(&self, limit: i64) -> Result<Vec<RestaurantWithCategory>>;

    /// Newest comments first, with author and restaurant.
    async fn recent_comments(&self, limit: i64) -> Result<Vec<CommentWithContext>>;

    /// Every restaurant with the ids of the users who favorited it.
    async fn restaurants_with_favorites(&self) -> Result<Vec<RestaurantFavorites>>;

    /// Add exactly one to a restaurant's view counter.
    async fn increment_views(&self, id: i64) -> Result<()>;

    /// Load the current-user context for a user id.
    async fn current_user(&self, user_id: i64) -> Result<Option<CurrentUser>>;

    /// Whether the backing store is reachable.
    async fn check_health(&self) -> bool;
}
