//! Comment model: user reviews left on restaurants.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use super::restaurant::Restaurant;
use super::user::User;

/// Comment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,

    /// Comment body.
    pub text: String,

    /// Author user ID.
    pub user_id: i64,

    /// Restaurant the comment is about.
    pub restaurant_id: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A comment together with its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: User,
}

/// A comment with its author and the restaurant it belongs to (feed entries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentWithContext {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: User,
    pub restaurant: Restaurant,
}

/// Joined comment/author row.
#[derive(sqlx::FromRow)]
struct CommentAuthorRow {
    #[sqlx(flatten)]
    comment: Comment,
    author_name: String,
    author_email: String,
    author_image: Option<String>,
    author_is_admin: bool,
}

impl From<CommentAuthorRow> for CommentWithAuthor {
    fn from(row: CommentAuthorRow) -> Self {
        let user = User {
            id: row.comment.user_id,
            name: row.author_name,
            email: row.author_email,
            image: row.author_image,
            is_admin: row.author_is_admin,
        };
        Self {
            comment: row.comment,
            user,
        }
    }
}

impl Comment {
    /// List comments for a restaurant, newest first.
    pub async fn list_for_restaurant(pool: &PgPool, restaurant_id: i64) -> Result<Vec<Self>> {
        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, text, user_id, restaurant_id, created_at, updated_at
            FROM comments
            WHERE restaurant_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(restaurant_id)
        .fetch_all(pool)
        .await
        .context("failed to list comments for restaurant")?;

        Ok(comments)
    }

    /// List comments for a restaurant with their authors, newest first.
    pub async fn list_with_authors(
        pool: &PgPool,
        restaurant_id: i64,
    ) -> Result<Vec<CommentWithAuthor>> {
        let rows = sqlx::query_as::<_, CommentAuthorRow>(
            r#"
            SELECT c.id, c.text, c.user_id, c.restaurant_id, c.created_at, c.updated_at,
                   u.name AS author_name, u.email AS author_email,
                   u.image AS author_image, u.is_admin AS author_is_admin
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.restaurant_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(restaurant_id)
        .fetch_all(pool)
        .await
        .context("failed to list comments with authors")?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// The most recent comments across all restaurants, with author and restaurant.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<CommentWithContext>> {
        let rows = sqlx::query_as::<_, CommentAuthorRow>(
            r#"
            SELECT c.id, c.text, c.user_id, c.restaurant_id, c.created_at, c.updated_at,
                   u.name AS author_name, u.email AS author_email,
                   u.image AS author_image, u.is_admin AS author_is_admin
            FROM comments c
            JOIN users u ON u.id = c.user_id
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("failed to list recent comments")?;

        let restaurant_ids: Vec<i64> = rows.iter().map(|r| r.comment.restaurant_id).collect();
        let restaurants: HashMap<i64, Restaurant> = Restaurant::find_many(pool, &restaurant_ids)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        rows.into_iter()
            .map(|row| {
                let with_author = CommentWithAuthor::from(row);
                let restaurant = restaurants
                    .get(&with_author.comment.restaurant_id)
                    .cloned()
                    .with_context(|| {
                        format!(
                            "comment {} references missing restaurant {}",
                            with_author.comment.id, with_author.comment.restaurant_id
                        )
                    })?;
                Ok(CommentWithContext {
                    comment: with_author.comment,
                    user: with_author.user,
                    restaurant,
                })
            })
            .collect()
    }
}
