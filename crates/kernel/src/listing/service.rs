//! Listing query service: the five read paths behind the restaurant pages.

use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use super::view::{
    DashboardPage, FeedsPage, RestaurantCard, RestaurantPage, RestaurantsPage, TopRestaurant,
    TopRestaurantsPage, truncate_description,
};
use crate::error::{AppError, AppResult};
use crate::metrics::Metrics;
use crate::models::CurrentUser;
use crate::pagination::{PageRequest, Pagination, parse_positive};
use crate::store::RestaurantStore;

/// Entries in each half of the activity feed.
pub const FEED_SIZE: i64 = 10;

/// Entries in the top-restaurants ranking.
pub const TOP_RESTAURANTS: usize = 10;

/// Filters and paging for the listing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingQuery {
    /// Restrict to one category; `None` lists every restaurant.
    pub category_id: Option<i64>,
    pub page: PageRequest,
}

impl ListingQuery {
    /// Parse raw `categoryId`, `page` and `limit` query values.
    ///
    /// A missing or unusable category id means "no filter".
    pub fn from_params(
        category_id: Option<&str>,
        page: Option<&str>,
        limit: Option<&str>,
    ) -> Self {
        Self {
            category_id: parse_positive(category_id),
            page: PageRequest::from_query(page, limit),
        }
    }
}

/// Builds the listing view models from a [`RestaurantStore`].
pub struct ListingService {
    store: Arc<dyn RestaurantStore>,
    metrics: Arc<Metrics>,
    /// Background view-counter increments.
    tasks: TaskTracker,
}

impl ListingService {
    /// Create a new listing service.
    pub fn new(store: Arc<dyn RestaurantStore>, metrics: Arc<Metrics>) -> Arc<Self> {
        Arc::new(Self {
            store,
            metrics,
            tasks: TaskTracker::new(),
        })
    }

    /// The store this service reads from.
    pub fn store(&self) -> &Arc<dyn RestaurantStore> {
        &self.store
    }

    /// Paginated restaurant listing with the category filter menu.
    pub async fn restaurants(
        &self,
        user: Option<&CurrentUser>,
        query: ListingQuery,
    ) -> AppResult<RestaurantsPage> {
        let PageRequest { page, limit } = query.page;

        let (listing, categories) = tokio::try_join!(
            self.store
                .list_restaurants(query.category_id, limit, query.page.offset()),
            self.store.list_categories(),
        )
        .map_err(AppError::DataStore)?;

        let restaurants: Vec<RestaurantCard> = listing
            .rows
            .into_iter()
            .map(|row| {
                let id = row.restaurant.id;
                let mut restaurant = row.restaurant;
                restaurant.description = truncate_description(&restaurant.description);
                RestaurantCard {
                    restaurant,
                    category: row.category,
                    is_favorited: user.is_some_and(|u| u.has_favorited(id)),
                    is_liked: user.is_some_and(|u| u.has_liked(id)),
                }
            })
            .collect();

        debug!(
            category_id = ?query.category_id,
            page,
            limit,
            total = listing.count,
            returned = restaurants.len(),
            "restaurant listing assembled"
        );

        Ok(RestaurantsPage {
            restaurants,
            categories,
            category_id: query.category_id,
            pagination: Pagination::new(limit, page, listing.count),
        })
    }

    /// Detail page for one restaurant.
    ///
    /// Does not count the view: callers call [`count_view`](Self::count_view)
    /// once the page has actually been delivered. The returned `views_count`
    /// is the value read before that increment.
    pub async fn restaurant(&self, user: Option<&CurrentUser>, id: i64) -> AppResult<RestaurantPage> {
        let detail = self
            .store
            .find_restaurant(id)
            .await
            .map_err(AppError::DataStore)?
            .ok_or(AppError::NotFound)?;

        // Anonymous visitors see both flags off
        let (is_favorited, is_liked) = match user {
            Some(u) => (
                detail.favorited_by.contains(&u.id),
                detail.liked_by.contains(&u.id),
            ),
            None => (false, false),
        };

        let page = RestaurantPage {
            favorited_count: detail.favorited_by.len(),
            liked_count: detail.liked_by.len(),
            restaurant: detail.restaurant,
            category: detail.category,
            comments: detail.comments,
            is_favorited,
            is_liked,
        };

        Ok(page)
    }

    /// Owner dashboard for one restaurant. Does not count as a view.
    pub async fn dashboard(&self, id: i64) -> AppResult<DashboardPage> {
        let summary = self
            .store
            .find_restaurant_summary(id)
            .await
            .map_err(AppError::DataStore)?
            .ok_or(AppError::NotFound)?;

        Ok(DashboardPage {
            comment_count: summary.comments.len(),
            views_count: summary.restaurant.views_count,
            restaurant: summary.restaurant,
            category: summary.category,
            comments: summary.comments,
        })
    }

    /// Latest restaurants and latest comments.
    pub async fn feeds(&self) -> AppResult<FeedsPage> {
        let (mut restaurants, comments) = tokio::try_join!(
            self.store.recent_restaurants(FEED_SIZE),
            self.store.recent_comments(FEED_SIZE),
        )
        .map_err(AppError::DataStore)?;

        for r in &mut restaurants {
            r.restaurant.description = truncate_description(&r.restaurant.description);
        }

        Ok(FeedsPage {
            restaurants,
            comments,
        })
    }

    /// The ten most favorited restaurants.
    ///
    /// Loads every restaurant and ranks in memory. Ties on the favorite count
    /// come out in unspecified order.
    pub async fn top_restaurants(&self, user: Option<&CurrentUser>) -> AppResult<TopRestaurantsPage> {
        let all = self
            .store
            .restaurants_with_favorites()
            .await
            .map_err(AppError::DataStore)?;

        let mut ranked: Vec<TopRestaurant> = all
            .into_iter()
            .map(|entry| {
                let mut restaurant = entry.restaurant;
                restaurant.description = truncate_description(&restaurant.description);
                TopRestaurant {
                    is_favorited: user.is_some_and(|u| u.has_favorited(restaurant.id)),
                    favorited_count: entry.favorited_by.len(),
                    restaurant,
                }
            })
            .collect();

        ranked.sort_unstable_by(|a, b| b.favorited_count.cmp(&a.favorited_count));
        ranked.truncate(TOP_RESTAURANTS);

        Ok(TopRestaurantsPage {
            restaurants: ranked,
        })
    }

    /// Wait for every background increment dispatched so far.
    pub async fn drain(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Increment the view counter without holding up the response.
    ///
    /// Failures are logged and counted, never surfaced to the caller.
    pub fn count_view(&self, id: i64) {
        let store = Arc::clone(&self.store);
        let metrics = Arc::clone(&self.metrics);

        self.tasks.spawn(async move {
            match store.increment_views(id).await {
                Ok(()) => metrics.record_view_increment(),
                Err(e) => {
                    metrics.record_view_increment_failure();
                    warn!(restaurant_id = id, error = %e, "failed to increment restaurant views");
                }
            }
        });
    }
}
