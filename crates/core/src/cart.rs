//! Shopping cart state machine.
//!
//! The cart is the only real state this workspace owns; everything else is
//! fetched from the hosted data API on demand. Transitions here are pure:
//! they mutate an in-memory [`Cart`] and report what happened as a
//! [`CartEvent`]. Persisting the line items and rendering notifications are
//! the storefront crate's job, which applies a transition and then writes
//! the full collection back to the session store.
//!
//! Invariants:
//! - at most one line item per product id (adding an existing product merges
//!   into its line item)
//! - every stored quantity is >= 1; a transition that would take a quantity
//!   to zero or below removes the line item instead
//! - `item_count` and `total_price` are recomputed from the line items on
//!   every call; there are no stored counters that can drift

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// A single line in the cart.
///
/// `name`, `unit_price`, `image`, and `artisan_label` are copied from the
/// catalog when the product is added and are not re-synced afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Product this line refers to; the merge key for repeated adds.
    pub id: ProductId,
    /// Display name, captured at add-time.
    pub name: String,
    /// Price per unit, captured at add-time.
    pub unit_price: Decimal,
    /// How many units of the product are in the cart. Always >= 1.
    pub quantity: u32,
    /// Thumbnail reference for display.
    #[serde(default)]
    pub image: Option<String>,
    /// Display-only attribution ("by Rosewood Pottery").
    #[serde(default)]
    pub artisan_label: Option<String>,
}

impl CartLineItem {
    /// Line subtotal (`unit_price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Catalog data captured when a product is added to the cart.
///
/// There is deliberately no quantity field: repeated adds of the same
/// product bump the existing line item by exactly one.
#[derive(Debug, Clone)]
pub struct LineItemDraft {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub image: Option<String>,
    pub artisan_label: Option<String>,
}

/// What a cart transition did.
///
/// The storefront's presentation layer subscribes to these to render toast
/// notifications; the cart itself never talks to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// A product was added for the first time.
    ItemAdded { id: ProductId, name: String },
    /// An already-present product had its quantity bumped by one.
    ItemIncremented {
        id: ProductId,
        name: String,
        quantity: u32,
    },
    /// A line item was removed entirely.
    ItemRemoved { id: ProductId, name: String },
    /// A line item's quantity was replaced with a new value.
    QuantityUpdated {
        id: ProductId,
        name: String,
        quantity: u32,
    },
    /// All line items were dropped.
    Cleared,
}

/// The shopper's pending purchase list.
///
/// Serializes transparently as a JSON array of line items, which is exactly
/// what the session store persists. Unknown fields in stored line items are
/// ignored on load so old carts survive schema additions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Rebuild a cart from previously persisted line items.
    #[must_use]
    pub const fn from_items(items: Vec<CartLineItem>) -> Self {
        Self { items }
    }

    /// The line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all line items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Total price across all line items.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Look up a line item by product id.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Add a product to the cart.
    ///
    /// If a line item with the same product id already exists its quantity
    /// is incremented by exactly one; otherwise a new line item with
    /// `quantity = 1` is appended. Drafts are accepted as-is, with no
    /// validation beyond what the types enforce.
    pub fn add_item(&mut self, draft: LineItemDraft) -> CartEvent {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == draft.id) {
            existing.quantity = existing.quantity.saturating_add(1);
            return CartEvent::ItemIncremented {
                id: existing.id,
                name: existing.name.clone(),
                quantity: existing.quantity,
            };
        }

        let event = CartEvent::ItemAdded {
            id: draft.id,
            name: draft.name.clone(),
        };
        self.items.push(CartLineItem {
            id: draft.id,
            name: draft.name,
            unit_price: draft.unit_price,
            quantity: 1,
            image: draft.image,
            artisan_label: draft.artisan_label,
        });
        event
    }

    /// Remove the line item with the given product id.
    ///
    /// Returns `None` (a silent no-op, not an error) if no such line item
    /// exists.
    pub fn remove_item(&mut self, id: ProductId) -> Option<CartEvent> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        let removed = self.items.remove(pos);
        Some(CartEvent::ItemRemoved {
            id,
            name: removed.name,
        })
    }

    /// Replace a line item's quantity.
    ///
    /// A quantity of zero or below removes the line item, matching
    /// [`Cart::remove_item`]. Returns `None` if the product is not in the
    /// cart.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) -> Option<CartEvent> {
        if quantity <= 0 {
            return self.remove_item(id);
        }

        let item = self.items.iter_mut().find(|i| i.id == id)?;
        item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        Some(CartEvent::QuantityUpdated {
            id,
            name: item.name.clone(),
            quantity: item.quantity,
        })
    }

    /// Drop all line items.
    pub fn clear(&mut self) -> CartEvent {
        self.items.clear();
        CartEvent::Cleared
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft(id: i32, name: &str, price: i64) -> LineItemDraft {
        LineItemDraft {
            id: ProductId::new(id),
            name: name.to_string(),
            unit_price: Decimal::from(price),
            image: None,
            artisan_label: None,
        }
    }

    #[test]
    fn test_add_new_item() {
        let mut cart = Cart::default();
        let event = cart.add_item(draft(1, "Mug", 10));

        assert_eq!(
            event,
            CartEvent::ItemAdded {
                id: ProductId::new(1),
                name: "Mug".to_string(),
            }
        );
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.total_price(), Decimal::from(10));
    }

    #[test]
    fn test_add_same_item_merges_into_one_line() {
        let mut cart = Cart::default();
        cart.add_item(draft(1, "Mug", 10));
        let event = cart.add_item(draft(1, "Mug", 10));

        assert_eq!(
            event,
            CartEvent::ItemIncremented {
                id: ProductId::new(1),
                name: "Mug".to_string(),
                quantity: 2,
            }
        );
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total_price(), Decimal::from(20));
    }

    #[test]
    fn test_repeated_adds_quantity_equals_add_count() {
        let mut cart = Cart::default();
        for _ in 0..5 {
            cart.add_item(draft(1, "Mug", 10));
        }

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.line(ProductId::new(1)).unwrap().quantity, 5);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::default();
        cart.add_item(draft(1, "Mug", 10));
        cart.add_item(draft(2, "Bowl", 5));

        let event = cart.remove_item(ProductId::new(1));
        assert_eq!(
            event,
            Some(CartEvent::ItemRemoved {
                id: ProductId::new(1),
                name: "Mug".to_string(),
            })
        );
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.line(ProductId::new(2)).unwrap().name, "Bowl");
        assert_eq!(cart.total_price(), Decimal::from(5));
    }

    #[test]
    fn test_remove_absent_item_is_noop() {
        let mut cart = Cart::default();
        cart.add_item(draft(1, "Mug", 10));

        assert_eq!(cart.remove_item(ProductId::new(99)), None);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_update_quantity_replaces_value() {
        let mut cart = Cart::default();
        cart.add_item(draft(1, "Mug", 10));

        let event = cart.update_quantity(ProductId::new(1), 4);
        assert_eq!(
            event,
            Some(CartEvent::QuantityUpdated {
                id: ProductId::new(1),
                name: "Mug".to_string(),
                quantity: 4,
            })
        );
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.total_price(), Decimal::from(40));
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::default();
        cart.add_item(draft(1, "Mug", 10));

        let event = cart.update_quantity(ProductId::new(1), 0);
        assert_eq!(
            event,
            Some(CartEvent::ItemRemoved {
                id: ProductId::new(1),
                name: "Mug".to_string(),
            })
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_negative_removes() {
        let mut cart = Cart::default();
        cart.add_item(draft(1, "Mug", 10));

        cart.update_quantity(ProductId::new(1), -1);
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_update_quantity_unknown_id_is_noop() {
        let mut cart = Cart::default();
        cart.add_item(draft(1, "Mug", 10));

        assert_eq!(cart.update_quantity(ProductId::new(99), 3), None);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::default();
        cart.add_item(draft(1, "Mug", 10));
        cart.add_item(draft(2, "Bowl", 5));

        let event = cart.clear();
        assert_eq!(event, CartEvent::Cleared);
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_totals_recomputed_from_items() {
        let mut cart = Cart::default();
        cart.add_item(draft(1, "Mug", 10));
        cart.add_item(draft(1, "Mug", 10));
        cart.add_item(draft(2, "Bowl", 5));

        // 2 x 10 + 1 x 5
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total_price(), Decimal::from(25));

        cart.update_quantity(ProductId::new(2), 3);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.total_price(), Decimal::from(35));
    }

    #[test]
    fn test_from_items_restores_state() {
        let mut original = Cart::default();
        original.add_item(draft(1, "Mug", 10));
        original.add_item(draft(1, "Mug", 10));

        let restored = Cart::from_items(original.items().to_vec());
        assert_eq!(restored, original);
        assert_eq!(restored.item_count(), 2);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut cart = Cart::default();
        cart.add_item(LineItemDraft {
            id: ProductId::new(1),
            name: "Mug".to_string(),
            unit_price: Decimal::new(1050, 2),
            image: Some("/images/mug.jpg".to_string()),
            artisan_label: Some("Rosewood Pottery".to_string()),
        });
        cart.add_item(draft(2, "Bowl", 5));

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_serde_is_a_plain_array() {
        let mut cart = Cart::default();
        cart.add_item(draft(1, "Mug", 10));

        let value: serde_json::Value = serde_json::to_value(&cart).unwrap();
        assert!(value.is_array());
    }

    #[test]
    fn test_deserialize_tolerates_unknown_fields() {
        let json = r#"[{
            "id": 1,
            "name": "Mug",
            "unit_price": "10",
            "quantity": 2,
            "legacy_discount": true
        }]"#;

        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total_price(), Decimal::from(20));
        assert_eq!(cart.line(ProductId::new(1)).unwrap().image, None);
    }
}
