//! User model and the per-request current-user context.

use std::collections::HashSet;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// User record as exposed to views.
///
/// Credentials stay in the `users` table and are never selected here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
    pub is_admin: bool,
}

/// The authenticated user for the active request.
///
/// Carries the ids of the restaurants the user favorited and liked, which is
/// all the listing pages need to flag cards. Anonymous requests have no
/// `CurrentUser` at all; operations take `Option<&CurrentUser>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub favorited_restaurant_ids: HashSet<i64>,
    pub liked_restaurant_ids: HashSet<i64>,
}

impl CurrentUser {
    /// Create a context with empty favorite and like sets.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Mark restaurants as favorited.
    pub fn with_favorites(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.favorited_restaurant_ids.extend(ids);
        self
    }

    /// Mark restaurants as liked.
    pub fn with_likes(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.liked_restaurant_ids.extend(ids);
        self
    }

    /// Check if the user favorited a restaurant.
    pub fn has_favorited(&self, restaurant_id: i64) -> bool {
        self.favorited_restaurant_ids.contains(&restaurant_id)
    }

    /// Check if the user liked a restaurant.
    pub fn has_liked(&self, restaurant_id: i64) -> bool {
        self.liked_restaurant_ids.contains(&restaurant_id)
    }
}

impl User {
    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, Self>(
            "SELECT id, name, email, image, is_admin FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch user by id")?;

        Ok(user)
    }

    /// Ids of the restaurants a user favorited.
    pub async fn favorited_restaurant_ids(pool: &PgPool, id: i64) -> Result<Vec<i64>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT restaurant_id FROM favorites WHERE user_id = $1")
                .bind(id)
                .fetch_all(pool)
                .await
                .context("failed to list favorited restaurants")?;

        Ok(ids)
    }

    /// Ids of the restaurants a user liked.
    pub async fn liked_restaurant_ids(pool: &PgPool, id: i64) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT restaurant_id FROM likes WHERE user_id = $1")
            .bind(id)
            .fetch_all(pool)
            .await
            .context("failed to list liked restaurants")?;

        Ok(ids)
    }

    /// Load the current-user context for a session's user id.
    pub async fn load_context(pool: &PgPool, id: i64) -> Result<Option<CurrentUser>> {
        let Some(user) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let (favorites, likes) = tokio::try_join!(
            Self::favorited_restaurant_ids(pool, id),
            Self::liked_restaurant_ids(pool, id),
        )?;

        Ok(Some(
            CurrentUser::new(user.id, user.name)
                .with_favorites(favorites)
                .with_likes(likes),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn current_user_membership() {
        let user = CurrentUser::new(1, "root")
            .with_favorites([3, 5])
            .with_likes([5]);

        assert!(user.has_favorited(3));
        assert!(user.has_favorited(5));
        assert!(!user.has_favorited(4));
        assert!(user.has_liked(5));
        assert!(!user.has_liked(3));
    }

    #[test]
    fn user_serialization_has_no_credentials() {
        let user = User {
            id: 1,
            name: "user1".to_string(),
            email: "user1@example.com".to_string(),
            image: None,
            is_admin: false,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["name"], "user1");
    }
}
