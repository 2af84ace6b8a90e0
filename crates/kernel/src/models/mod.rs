//! Database models.

pub mod category;
pub mod comment;
pub mod restaurant;
pub mod user;

pub use category::Category;
pub use comment::{Comment, CommentWithAuthor, CommentWithContext};
pub use restaurant::{
    Restaurant, RestaurantDetail, RestaurantFavorites, RestaurantSummary, RestaurantWithCategory,
};
pub use user::{CurrentUser, User};
