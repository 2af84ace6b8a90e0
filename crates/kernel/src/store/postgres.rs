//! PostgreSQL implementation of RestaurantStore.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use super::{CountedPage, RestaurantStore};
use crate::db;
use crate::metrics::Metrics;
use crate::models::{
    Category, Comment, CommentWithContext, CurrentUser, Restaurant, RestaurantDetail,
    RestaurantFavorites, RestaurantSummary, RestaurantWithCategory, User,
};

/// Store backed by the `restaurants`, `categories`, `comments`, `users`,
/// `favorites` and `likes` tables.
#[derive(Clone)]
pub struct PgRestaurantStore {
    pool: PgPool,
    metrics: Arc<Metrics>,
}

impl PgRestaurantStore {
    /// Create a new store over a connection pool.
    pub fn new(pool: PgPool, metrics: Arc<Metrics>) -> Self {
        Self { pool, metrics }
    }

    /// Run a query future and record its duration.
    async fn timed<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let started = Instant::now();
        let result = fut.await;
        self.metrics
            .record_db_query(started.elapsed().as_secs_f64());
        result
    }
}

#[async_trait]
impl RestaurantStore for PgRestaurantStore {
    async fn list_restaurants(
        &self,
        category_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<CountedPage<RestaurantWithCategory>> {
        let (rows, count) = tokio::try_join!(
            self.timed(Restaurant::list_with_category(
                &self.pool,
                category_id,
                limit,
                offset
            )),
            self.timed(Restaurant::count(&self.pool, category_id)),
        )?;

        Ok(CountedPage { rows, count })
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.timed(Category::list(&self.pool)).await
    }

    async fn find_restaurant(&self, id: i64) -> Result<Option<RestaurantDetail>> {
        let Some(found) = self
            .timed(Restaurant::find_with_category(&self.pool, id))
            .await?
        else {
            return Ok(None);
        };

        let (comments, favorited_by, liked_by) = tokio::try_join!(
            self.timed(Comment::list_with_authors(&self.pool, id)),
            self.timed(Restaurant::favorited_by(&self.pool, id)),
            self.timed(Restaurant::liked_by(&self.pool, id)),
        )?;

        Ok(Some(RestaurantDetail {
            restaurant: found.restaurant,
            category: found.category,
            comments,
            favorited_by: favorited_by.into_iter().collect(),
            liked_by: liked_by.into_iter().collect(),
        }))
    }

    async fn find_restaurant_summary(&self, id: i64) -> Result<Option<RestaurantSummary>> {
        let Some(found) = self
            .timed(Restaurant::find_with_category(&self.pool, id))
            .await?
        else {
            return Ok(None);
        };

        let comments = self
            .timed(Comment::list_for_restaurant(&self.pool, id))
            .await?;

        Ok(Some(RestaurantSummary {
            restaurant: found.restaurant,
            category: found.category,
            comments,
        }))
    }

    async fn recent_restaurants(&self, limit: i64) -> Result<Vec<RestaurantWithCategory>> {
        self.timed(Restaurant::list_recent(&self.pool, limit)).await
    }

    async fn recent_comments(&self, limit: i64) -> Result<Vec<CommentWithContext>> {
        self.timed(Comment::list_recent(&self.pool, limit)).await
    }

    async fn restaurants_with_favorites(&self) -> Result<Vec<RestaurantFavorites>> {
        self.timed(Restaurant::list_with_favorites(&self.pool)).await
    }

    async fn increment_views(&self, id: i64) -> Result<()> {
        self.timed(Restaurant::increment_views(&self.pool, id)).await
    }

    async fn current_user(&self, user_id: i64) -> Result<Option<CurrentUser>> {
        self.timed(User::load_context(&self.pool, user_id)).await
    }

    async fn check_health(&self) -> bool {
        db::check_health(&self.pool).await
    }
}
