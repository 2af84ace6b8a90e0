//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use redis::Client as RedisClient;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::listing::ListingService;
use crate::metrics::Metrics;
use crate::store::{PgRestaurantStore, RestaurantStore};
use crate::theme::ThemeEngine;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Restaurant data store.
    store: Arc<dyn RestaurantStore>,

    /// Listing page service.
    listings: Arc<ListingService>,

    /// Theme engine for template rendering.
    theme: Arc<ThemeEngine>,

    /// Prometheus metrics.
    metrics: Arc<Metrics>,

    /// Redis client backing sessions; only used for health checks here.
    /// Absent when the state is built without Redis (tests, demos).
    redis: Option<RedisClient>,
}

impl AppState {
    /// Create new application state with database and Redis connections.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;

        let redis = RedisClient::open(config.redis_url.as_str())
            .context("failed to create Redis client")?;

        let mut conn = redis
            .get_multiplexed_async_connection()
            .await
            .context("failed to connect to Redis")?;

        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .context("Redis PING failed")?;

        let theme = ThemeEngine::new(&config.templates_dir).with_context(|| {
            format!(
                "failed to load templates from {}",
                config.templates_dir.display()
            )
        })?;

        let metrics = Arc::new(Metrics::new());
        let store: Arc<dyn RestaurantStore> =
            Arc::new(PgRestaurantStore::new(pool, Arc::clone(&metrics)));

        info!("Restaurant store ready");

        Ok(Self::assemble(store, theme, metrics, Some(redis)))
    }

    /// Build state around an existing store, without Redis.
    pub fn with_store(store: Arc<dyn RestaurantStore>, theme: ThemeEngine) -> Self {
        Self::assemble(store, theme, Arc::new(Metrics::new()), None)
    }

    fn assemble(
        store: Arc<dyn RestaurantStore>,
        theme: ThemeEngine,
        metrics: Arc<Metrics>,
        redis: Option<RedisClient>,
    ) -> Self {
        let listings = ListingService::new(Arc::clone(&store), Arc::clone(&metrics));

        Self {
            inner: Arc::new(AppStateInner {
                store,
                listings,
                theme: Arc::new(theme),
                metrics,
                redis,
            }),
        }
    }

    /// Get the restaurant store.
    pub fn store(&self) -> &Arc<dyn RestaurantStore> {
        &self.inner.store
    }

    /// Get the listing service.
    pub fn listings(&self) -> &Arc<ListingService> {
        &self.inner.listings
    }

    /// Get the theme engine.
    pub fn theme(&self) -> &Arc<ThemeEngine> {
        &self.inner.theme
    }

    /// Get the metrics registry.
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.inner.metrics
    }

    /// Check if the data store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.inner.store.check_health().await
    }

    /// Check if Redis is reachable. `None` when no Redis is configured.
    pub async fn redis_healthy(&self) -> Option<bool> {
        let redis = self.inner.redis.as_ref()?;

        let Ok(mut conn) = redis.get_multiplexed_async_connection().await else {
            return Some(false);
        };

        Some(
            redis::cmd("PING")
                .query_async::<String>(&mut conn)
                .await
                .is_ok(),
        )
    }
}
