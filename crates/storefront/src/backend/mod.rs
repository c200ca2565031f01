//! Hosted data API clients.
//!
//! # Architecture
//!
//! - The hosted backend is the source of truth - NO local sync, direct
//!   REST/JSON calls with `reqwest`
//! - In-memory caching via `moka` for catalog responses (5 minute TTL)
//! - Orders and auth are never cached
//!
//! # Request conventions
//!
//! Every request carries the service key in an `apikey` header. Requests
//! made on behalf of a signed-in shopper (order history) additionally send
//! their access token as `Authorization: Bearer <token>`.
//!
//! # Example
//!
//! ```rust,ignore
//! use hearthside_storefront::backend::{BackendClient, ProductQuery};
//!
//! let client = BackendClient::new(&config.backend);
//!
//! // Get a product
//! let product = client.get_product(ProductId::new(7)).await?;
//!
//! // List a category's products
//! let products = client
//!     .get_products(ProductQuery::default().category(category.id))
//!     .await?;
//! ```

pub mod auth;
mod client;
pub mod types;

pub use auth::{AuthClient, AuthError};
pub use client::{BackendClient, ProductQuery};

use thiserror::Error;

/// Errors that can occur when talking to the hosted data API.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the hosted API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The API returned a non-success status with an error payload.
    #[error("API error: {0}")]
    Api(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = BackendError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_api_error_display() {
        let err = BackendError::Api("HTTP 500: upstream exploded".to_string());
        assert_eq!(err.to_string(), "API error: HTTP 500: upstream exploded");
    }
}
