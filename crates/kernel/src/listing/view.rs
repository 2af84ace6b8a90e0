//! View models handed to templates.
//!
//! Each page type names the template it renders through [`View::NAME`].

use serde::Serialize;

use crate::models::{
    Category, Comment, CommentWithAuthor, CommentWithContext, Restaurant, RestaurantWithCategory,
};
use crate::pagination::Pagination;

/// Maximum characters of description shown on cards.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 50;

/// A view model bound to a template.
pub trait View: Serialize {
    /// Template name without extension.
    const NAME: &'static str;
}

/// Cut a description down to [`DESCRIPTION_PREVIEW_CHARS`] characters.
///
/// Counts Unicode scalar values so multi-byte text is never split mid-char.
/// No ellipsis is appended.
pub fn truncate_description(text: &str) -> String {
    text.chars().take(DESCRIPTION_PREVIEW_CHARS).collect()
}

/// Restaurant card on the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestaurantCard {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub category: Category,
    pub is_favorited: bool,
    pub is_liked: bool,
}

/// `restaurants` view: one page of cards plus the category filter menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestaurantsPage {
    pub restaurants: Vec<RestaurantCard>,
    pub categories: Vec<Category>,
    /// Active category filter, `None` for "all".
    pub category_id: Option<i64>,
    pub pagination: Pagination,
}

impl View for RestaurantsPage {
    const NAME: &'static str = "restaurants";
}

/// `restaurant` view: the detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestaurantPage {
    pub restaurant: Restaurant,
    pub category: Category,
    pub comments: Vec<CommentWithAuthor>,
    pub favorited_count: usize,
    pub liked_count: usize,
    pub is_favorited: bool,
    pub is_liked: bool,
}

impl View for RestaurantPage {
    const NAME: &'static str = "restaurant";
}

/// `dashboard` view: owner-facing numbers for one restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardPage {
    pub restaurant: Restaurant,
    pub category: Category,
    pub comments: Vec<Comment>,
    pub comment_count: usize,
    pub views_count: i64,
}

impl View for DashboardPage {
    const NAME: &'static str = "dashboard";
}

/// `feeds` view: latest restaurants and latest comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedsPage {
    pub restaurants: Vec<RestaurantWithCategory>,
    pub comments: Vec<CommentWithContext>,
}

impl View for FeedsPage {
    const NAME: &'static str = "feeds";
}

/// Entry in the top-restaurants ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopRestaurant {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub favorited_count: usize,
    pub is_favorited: bool,
}

/// `top-restaurants` view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopRestaurantsPage {
    pub restaurants: Vec<TopRestaurant>,
}

impl View for TopRestaurantsPage {
    const NAME: &'static str = "top-restaurants";
}
