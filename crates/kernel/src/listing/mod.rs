//! Restaurant listing pages.
//!
//! - Listing: paginated cards with category filter
//! - Detail: one restaurant with comments, counts the view
//! - Dashboard: owner-facing numbers
//! - Feeds: latest restaurants and comments
//! - Top: ranking by favorite count

mod service;
mod view;

pub use service::{FEED_SIZE, ListingQuery, ListingService, TOP_RESTAURANTS};
pub use view::{
    DESCRIPTION_PREVIEW_CHARS, DashboardPage, FeedsPage, RestaurantCard, RestaurantPage,
    RestaurantsPage, TopRestaurant, TopRestaurantsPage, View, truncate_description,
};
