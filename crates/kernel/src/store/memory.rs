//! In-memory implementation of RestaurantStore.
//!
//! Mirrors the ordering rules of the PostgreSQL queries so the listing
//! service behaves the same against either store. Individual operations can
//! be made to fail, which is how tests exercise error propagation.

use std::collections::HashSet;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use parking_lot::RwLock;

use super::{CountedPage, RestaurantStore};
use crate::models::{
    Category, Comment, CommentWithAuthor, CommentWithContext, CurrentUser, Restaurant,
    RestaurantDetail, RestaurantFavorites, RestaurantSummary, RestaurantWithCategory, User,
};

/// Store operations that can be switched to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    ListRestaurants,
    ListCategories,
    FindRestaurant,
    FindRestaurantSummary,
    RecentRestaurants,
    RecentComments,
    RestaurantsWithFavorites,
    IncrementViews,
    CurrentUser,
}

#[derive(Default)]
struct MemoryData {
    categories: Vec<Category>,
    restaurants: Vec<Restaurant>,
    comments: Vec<Comment>,
    users: Vec<User>,
    /// (user_id, restaurant_id)
    favorites: Vec<(i64, i64)>,
    /// (user_id, restaurant_id)
    likes: Vec<(i64, i64)>,
    failing: HashSet<StoreOperation>,
    increments: u64,
}

impl MemoryData {
    fn check(&self, op: StoreOperation) -> Result<()> {
        if self.failing.contains(&op) {
            bail!("injected failure for {op:?}");
        }
        Ok(())
    }

    fn category(&self, id: i64) -> Result<Category> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("category {id} does not exist"))
    }

    fn user(&self, id: i64) -> Result<User> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("user {id} does not exist"))
    }

    fn restaurant(&self, id: i64) -> Option<&Restaurant> {
        self.restaurants.iter().find(|r| r.id == id)
    }

    fn with_category(&self, restaurant: &Restaurant) -> Result<RestaurantWithCategory> {
        let category = self
            .category(restaurant.category_id)
            .with_context(|| format!("restaurant {} has a dangling category", restaurant.id))?;
        Ok(RestaurantWithCategory {
            restaurant: restaurant.clone(),
            category,
        })
    }

    /// Comments for a restaurant, newest first.
    fn comments_for(&self, restaurant_id: i64) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.restaurant_id == restaurant_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        comments
    }
}

/// Store holding every table in process memory.
#[derive(Default)]
pub struct MemoryRestaurantStore {
    data: RwLock<MemoryData>,
}

impl MemoryRestaurantStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_category(&self, category: Category) {
        self.data.write().categories.push(category);
    }

    pub fn insert_restaurant(&self, restaurant: Restaurant) {
        self.data.write().restaurants.push(restaurant);
    }

    pub fn insert_user(&self, user: User) {
        self.data.write().users.push(user);
    }

    pub fn insert_comment(&self, comment: Comment) {
        self.data.write().comments.push(comment);
    }

    /// Record that `user_id` favorited `restaurant_id`.
    pub fn add_favorite(&self, user_id: i64, restaurant_id: i64) {
        self.data.write().favorites.push((user_id, restaurant_id));
    }

    /// Record that `user_id` liked `restaurant_id`.
    pub fn add_like(&self, user_id: i64, restaurant_id: i64) {
        self.data.write().likes.push((user_id, restaurant_id));
    }

    /// Snapshot of a stored restaurant.
    pub fn restaurant(&self, id: i64) -> Option<Restaurant> {
        self.data.read().restaurant(id).cloned()
    }

    /// Number of successful view-counter increments so far.
    pub fn increment_count(&self) -> u64 {
        self.data.read().increments
    }

    /// Make an operation fail until [`recover`](Self::recover) is called.
    pub fn fail(&self, op: StoreOperation) {
        self.data.write().failing.insert(op);
    }

    /// Stop failing an operation.
    pub fn recover(&self, op: StoreOperation) {
        self.data.write().failing.remove(&op);
    }
}

#[async_trait]
impl RestaurantStore for MemoryRestaurantStore {
    async fn list_restaurants(
        &self,
        category_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> Result<CountedPage<RestaurantWithCategory>> {
        let data = self.data.read();
        data.check(StoreOperation::ListRestaurants)?;

        let mut matching: Vec<&Restaurant> = data
            .restaurants
            .iter()
            .filter(|r| category_id.is_none_or(|id| r.category_id == id))
            .collect();
        matching.sort_by_key(|r| r.id);

        let count = i64::try_from(matching.len()).context("restaurant count overflow")?;
        let skip = usize::try_from(offset.max(0)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);

        let rows = matching
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|r| data.with_category(r))
            .collect::<Result<Vec<_>>>()?;

        Ok(CountedPage { rows, count })
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let data = self.data.read();
        data.check(StoreOperation::ListCategories)?;

        let mut categories = data.categories.clone();
        categories.sort_by_key(|c| c.id);
        Ok(categories)
    }

    async fn find_restaurant(&self, id: i64) -> Result<Option<RestaurantDetail>> {
        let data = self.data.read();
        data.check(StoreOperation::FindRestaurant)?;

        let Some(restaurant) = data.restaurant(id) else {
            return Ok(None);
        };
        let found = data.with_category(restaurant)?;

        let comments = data
            .comments_for(id)
            .into_iter()
            .map(|comment| {
                let user = data.user(comment.user_id)?;
                Ok(CommentWithAuthor { comment, user })
            })
            .collect::<Result<Vec<_>>>()?;

        let favorited_by = data
            .favorites
            .iter()
            .filter(|(_, rid)| *rid == id)
            .map(|(uid, _)| *uid)
            .collect();
        let liked_by = data
            .likes
            .iter()
            .filter(|(_, rid)| *rid == id)
            .map(|(uid, _)| *uid)
            .collect();

        Ok(Some(RestaurantDetail {
            restaurant: found.restaurant,
            category: found.category,
            comments,
            favorited_by,
            liked_by,
        }))
    }

    async fn find_restaurant_summary(&self, id: i64) -> Result<Option<RestaurantSummary>> {
        let data = self.data.read();
        data.check(StoreOperation::FindRestaurantSummary)?;

        let Some(restaurant) = data.restaurant(id) else {
            return Ok(None);
        };
        let found = data.with_category(restaurant)?;

        Ok(Some(RestaurantSummary {
            restaurant: found.restaurant,
            category: found.category,
            comments: data.comments_for(id),
        }))
    }

    async fn recent_restaurants(&self, limit: i64) -> Result<Vec<RestaurantWithCategory>> {
        let data = self.data.read();
        data.check(StoreOperation::RecentRestaurants)?;

        let mut restaurants: Vec<&Restaurant> = data.restaurants.iter().collect();
        restaurants.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        restaurants
            .into_iter()
            .take(usize::try_from(limit.max(0)).unwrap_or(usize::MAX))
            .map(|r| data.with_category(r))
            .collect()
    }

    async fn recent_comments(&self, limit: i64) -> Result<Vec<CommentWithContext>> {
        let data = self.data.read();
        data.check(StoreOperation::RecentComments)?;

        let mut comments: Vec<&Comment> = data.comments.iter().collect();
        comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        comments
            .into_iter()
            .take(usize::try_from(limit.max(0)).unwrap_or(usize::MAX))
            .map(|comment| {
                let user = data.user(comment.user_id)?;
                let restaurant = data
                    .restaurant(comment.restaurant_id)
                    .cloned()
                    .ok_or_else(|| {
                        anyhow!(
                            "comment {} references missing restaurant {}",
                            comment.id,
                            comment.restaurant_id
                        )
                    })?;
                Ok(CommentWithContext {
                    comment: comment.clone(),
                    user,
                    restaurant,
                })
            })
            .collect()
    }

    async fn restaurants_with_favorites(&self) -> Result<Vec<RestaurantFavorites>> {
        let data = self.data.read();
        data.check(StoreOperation::RestaurantsWithFavorites)?;

        let mut restaurants = data.restaurants.clone();
        restaurants.sort_by_key(|r| r.id);

        Ok(restaurants
            .into_iter()
            .map(|restaurant| {
                let favorited_by = data
                    .favorites
                    .iter()
                    .filter(|(_, rid)| *rid == restaurant.id)
                    .map(|(uid, _)| *uid)
                    .collect();
                RestaurantFavorites {
                    restaurant,
                    favorited_by,
                }
            })
            .collect())
    }

    async fn increment_views(&self, id: i64) -> Result<()> {
        let mut data = self.data.write();
        data.check(StoreOperation::IncrementViews)?;

        let Some(restaurant) = data.restaurants.iter_mut().find(|r| r.id == id) else {
            bail!("restaurant {id} disappeared before its view count was incremented");
        };
        restaurant.views_count += 1;
        data.increments += 1;
        Ok(())
    }

    async fn current_user(&self, user_id: i64) -> Result<Option<CurrentUser>> {
        let data = self.data.read();
        data.check(StoreOperation::CurrentUser)?;

        let Some(user) = data.users.iter().find(|u| u.id == user_id) else {
            return Ok(None);
        };

        let favorites = data
            .favorites
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, rid)| *rid);
        let likes = data
            .likes
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, rid)| *rid);

        Ok(Some(
            CurrentUser::new(user.id, user.name.clone())
                .with_favorites(favorites)
                .with_likes(likes),
        ))
    }

    async fn check_health(&self) -> bool {
        true
    }
}
