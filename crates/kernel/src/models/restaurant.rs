//! Restaurant model and the joined shapes the listing pages read.

use std::collections::HashSet;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::category::Category;
use super::comment::{Comment, CommentWithAuthor};

/// Restaurant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub tel: String,
    pub address: String,
    pub opening_hours: String,
    pub description: String,

    /// Optional image URL.
    pub image: Option<String>,

    /// Detail page views; only ever incremented.
    pub views_count: i64,

    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Restaurant joined with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestaurantWithCategory {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub category: Category,
}

/// Everything the detail page needs about one restaurant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantDetail {
    pub restaurant: Restaurant,
    pub category: Category,
    /// Newest first.
    pub comments: Vec<CommentWithAuthor>,
    /// Ids of the users who favorited the restaurant.
    pub favorited_by: HashSet<i64>,
    /// Ids of the users who liked the restaurant.
    pub liked_by: HashSet<i64>,
}

/// Restaurant with category and bare comments (owner dashboard).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantSummary {
    pub restaurant: Restaurant,
    pub category: Category,
    pub comments: Vec<Comment>,
}

/// Restaurant with the ids of every user who favorited it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantFavorites {
    pub restaurant: Restaurant,
    pub favorited_by: Vec<i64>,
}

/// Joined restaurant/category row.
#[derive(sqlx::FromRow)]
struct RestaurantCategoryRow {
    #[sqlx(flatten)]
    restaurant: Restaurant,
    category_name: String,
    category_created_at: DateTime<Utc>,
    category_updated_at: DateTime<Utc>,
}

impl From<RestaurantCategoryRow> for RestaurantWithCategory {
    fn from(row: RestaurantCategoryRow) -> Self {
        let category = Category {
            id: row.restaurant.category_id,
            name: row.category_name,
            created_at: row.category_created_at,
            updated_at: row.category_updated_at,
        };
        Self {
            restaurant: row.restaurant,
            category,
        }
    }
}

/// Restaurant row with aggregated favoriting user ids.
#[derive(sqlx::FromRow)]
struct RestaurantFavoritesRow {
    #[sqlx(flatten)]
    restaurant: Restaurant,
    favorited_by: Vec<i64>,
}

impl Restaurant {
    /// Find restaurants by ID, in no particular order.
    pub async fn find_many(pool: &PgPool, ids: &[i64]) -> Result<Vec<Self>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let restaurants = sqlx::query_as::<_, Self>(
            r#"
            SELECT id, name, tel, address, opening_hours, description, image,
                   views_count, category_id, created_at, updated_at
            FROM restaurants
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await
        .context("failed to fetch restaurants by id")?;

        Ok(restaurants)
    }

    /// Find a restaurant with its category.
    pub async fn find_with_category(
        pool: &PgPool,
        id: i64,
    ) -> Result<Option<RestaurantWithCategory>> {
        let row = sqlx::query_as::<_, RestaurantCategoryRow>(
            r#"
            SELECT r.id, r.name, r.tel, r.address, r.opening_hours, r.description, r.image,
                   r.views_count, r.category_id, r.created_at, r.updated_at,
                   c.name AS category_name, c.created_at AS category_created_at,
                   c.updated_at AS category_updated_at
            FROM restaurants r
            JOIN categories c ON c.id = r.category_id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch restaurant")?;

        Ok(row.map(Into::into))
    }

    /// One page of restaurants with categories, optionally restricted to a category.
    pub async fn list_with_category(
        pool: &PgPool,
        category_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RestaurantWithCategory>> {
        let rows = sqlx::query_as::<_, RestaurantCategoryRow>(
            r#"
            SELECT r.id, r.name, r.tel, r.address, r.opening_hours, r.description, r.image,
                   r.views_count, r.category_id, r.created_at, r.updated_at,
                   c.name AS category_name, c.created_at AS category_created_at,
                   c.updated_at AS category_updated_at
            FROM restaurants r
            JOIN categories c ON c.id = r.category_id
            WHERE ($1::BIGINT IS NULL OR r.category_id = $1)
            ORDER BY r.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(category_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .context("failed to list restaurants")?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Count restaurants, optionally restricted to a category.
    pub async fn count(pool: &PgPool, category_id: Option<i64>) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM restaurants WHERE ($1::BIGINT IS NULL OR category_id = $1)",
        )
        .bind(category_id)
        .fetch_one(pool)
        .await
        .context("failed to count restaurants")?;

        Ok(count)
    }

    /// The most recently created restaurants with categories.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<RestaurantWithCategory>> {
        let rows = sqlx::query_as::<_, RestaurantCategoryRow>(
            r#"
            SELECT r.id, r.name, r.tel, r.address, r.opening_hours, r.description, r.image,
                   r.views_count, r.category_id, r.created_at, r.updated_at,
                   c.name AS category_name, c.created_at AS category_created_at,
                   c.updated_at AS category_updated_at
            FROM restaurants r
            JOIN categories c ON c.id = r.category_id
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("failed to list recent restaurants")?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Every restaurant with its favoriting users.
    ///
    /// Scans the whole table; the ranking sorts and truncates in memory.
    pub async fn list_with_favorites(pool: &PgPool) -> Result<Vec<RestaurantFavorites>> {
        let rows = sqlx::query_as::<_, RestaurantFavoritesRow>(
            r#"
            SELECT r.id, r.name, r.tel, r.address, r.opening_hours, r.description, r.image,
                   r.views_count, r.category_id, r.created_at, r.updated_at,
                   COALESCE(
                       ARRAY_AGG(f.user_id) FILTER (WHERE f.user_id IS NOT NULL),
                       '{}'
                   ) AS favorited_by
            FROM restaurants r
            LEFT JOIN favorites f ON f.restaurant_id = r.id
            GROUP BY r.id
            ORDER BY r.id
            "#,
        )
        .fetch_all(pool)
        .await
        .context("failed to list restaurants with favorites")?;

        Ok(rows
            .into_iter()
            .map(|row| RestaurantFavorites {
                restaurant: row.restaurant,
                favorited_by: row.favorited_by,
            })
            .collect())
    }

    /// Ids of the users who favorited a restaurant.
    pub async fn favorited_by(pool: &PgPool, id: i64) -> Result<Vec<i64>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT user_id FROM favorites WHERE restaurant_id = $1")
                .bind(id)
                .fetch_all(pool)
                .await
                .context("failed to list favoriting users")?;

        Ok(ids)
    }

    /// Ids of the users who liked a restaurant.
    pub async fn liked_by(pool: &PgPool, id: i64) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT user_id FROM likes WHERE restaurant_id = $1")
            .bind(id)
            .fetch_all(pool)
            .await
            .context("failed to list liking users")?;

        Ok(ids)
    }

    /// Atomically add one to the view counter.
    pub async fn increment_views(pool: &PgPool, id: i64) -> Result<()> {
        let result =
            sqlx::query("UPDATE restaurants SET views_count = views_count + 1 WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await
                .context("failed to increment restaurant views")?;

        if result.rows_affected() == 0 {
            bail!("restaurant {id} disappeared before its view count was incremented");
        }

        Ok(())
    }
}
