//! Database operations for storefront `PostgreSQL`.
//!
//! # Database: `hearthside_storefront`
//!
//! The hosted data API owns all domain data (products, artisans, users,
//! orders). The local database exists for exactly one thing:
//!
//! ## Tables
//!
//! - `tower_sessions` - session records, created by the session store's own
//!   migration at startup. Each record also carries the shopper's persisted
//!   cart line items.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
