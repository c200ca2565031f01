//! Domain types for the hosted data API.
//!
//! These mirror the rows the hosted backend serves. Deserialization must
//! tolerate unknown fields - the hosted schema evolves independently of
//! this binary - so nothing here uses `deny_unknown_fields`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use hearthside_core::{ArtisanId, CategoryId, OrderId, OrderStatus, ProductId, UserId};

/// A product listed on the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long description, may contain plain-text paragraphs.
    #[serde(default)]
    pub description: String,
    /// Price in the store currency, serialized as a decimal string.
    pub price: Decimal,
    /// Primary image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Category this product is filed under.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// The artisan who makes this product.
    #[serde(default)]
    pub artisan_id: Option<ArtisanId>,
    /// Denormalized artisan name for cards and cart attribution.
    #[serde(default)]
    pub artisan_name: Option<String>,
    /// Whether to feature on the home page.
    #[serde(default)]
    pub featured: bool,
    /// Whether the product can currently be added to the cart.
    #[serde(default = "default_true")]
    pub in_stock: bool,
}

/// A browsing category (ceramics, textiles, woodwork, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// URL-safe identifier used in routes.
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A maker with a public profile page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artisan {
    pub id: ArtisanId,
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Short craft description ("Hand-thrown stoneware").
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

/// An order as reported by the hosted backend.
///
/// Orders are created outside this codebase; the storefront only reads them
/// for the account pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(default)]
    pub status: OrderStatus,
    /// Order total, serialized as a decimal string.
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// One line of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserialize_minimal() {
        let json = r#"{"id": 7, "name": "Walnut Serving Board", "price": "48.00"}"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.id, ProductId::new(7));
        assert_eq!(product.price, Decimal::new(4800, 2));
        assert!(product.in_stock);
        assert!(!product.featured);
        assert_eq!(product.image_url, None);
    }

    #[test]
    fn test_product_deserialize_tolerates_unknown_fields() {
        let json = r#"{
            "id": 7,
            "name": "Walnut Serving Board",
            "price": "48.00",
            "sku": "WB-007",
            "warehouse_bin": 14
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.name, "Walnut Serving Board");
    }

    #[test]
    fn test_order_deserialize() {
        let json = r#"{
            "id": 101,
            "user_id": 5,
            "status": "shipped",
            "total": "63.50",
            "created_at": "2025-11-02T14:30:00Z",
            "items": [
                {"product_id": 7, "name": "Walnut Serving Board", "quantity": 1, "unit_price": "48.00"}
            ]
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();

        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total, Decimal::new(6350, 2));
    }

    #[test]
    fn test_order_status_defaults_to_pending() {
        let json = r#"{"id": 101, "user_id": 5, "total": "10.00", "created_at": "2025-11-02T14:30:00Z"}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.items.is_empty());
    }
}
