//! Cart persistence adapter.
//!
//! The cart state machine in `hearthside-core` is pure; this module is the
//! I/O half of the contract. Route handlers load the cart, apply a
//! transition, and hand the result back here to be written to the durable
//! per-browser store (the session record behind the `hs_session` cookie)
//! under a fixed namespaced key.
//!
//! The persisted value is a JSON-serialized array of line items, stored as a
//! string so a corrupt value is detected at parse time rather than deep in
//! the session layer. Both directions are best-effort:
//!
//! - a missing, unreadable, or unparseable value loads as an empty cart
//!   (logged, never surfaced)
//! - a failed write is logged and swallowed; the in-memory cart stays
//!   authoritative for the request that mutated it

use tower_sessions::Session;

use hearthside_core::cart::Cart;

use crate::models::session_keys;

/// Load the persisted cart, falling back to an empty one.
pub async fn load_cart(session: &Session) -> Cart {
    let raw = match session.get::<String>(session_keys::CART).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::default(),
        Err(e) => {
            tracing::warn!("failed to read cart from session store: {e}");
            return Cart::default();
        }
    };

    match serde_json::from_str::<Cart>(&raw) {
        Ok(cart) => cart,
        Err(e) => {
            // A bad value is discarded, not repaired; the next save replaces it.
            tracing::warn!("discarding unparseable persisted cart: {e}");
            Cart::default()
        }
    }
}

/// Persist the full cart after a mutation.
pub async fn save_cart(session: &Session, cart: &Cart) {
    let serialized = match serde_json::to_string(cart) {
        Ok(serialized) => serialized,
        Err(e) => {
            tracing::error!("failed to serialize cart: {e}");
            return;
        }
    };

    if let Err(e) = session.insert(session_keys::CART, serialized).await {
        tracing::error!("failed to persist cart to session store: {e}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use tower_sessions::{MemoryStore, Session};

    use hearthside_core::ProductId;
    use hearthside_core::cart::LineItemDraft;

    use super::*;

    fn test_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn draft(id: i32, name: &str, price: i64) -> LineItemDraft {
        LineItemDraft {
            id: ProductId::new(id),
            name: name.to_string(),
            unit_price: Decimal::from(price),
            image: None,
            artisan_label: None,
        }
    }

    #[tokio::test]
    async fn test_load_from_fresh_session_is_empty() {
        let session = test_session();
        let cart = load_cart(&session).await;
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let session = test_session();

        let mut cart = Cart::default();
        cart.add_item(LineItemDraft {
            id: ProductId::new(1),
            name: "Stoneware Mug".to_string(),
            unit_price: Decimal::new(2400, 2),
            image: Some("/images/mug.jpg".to_string()),
            artisan_label: Some("Rosewood Pottery".to_string()),
        });
        cart.add_item(draft(2, "Linen Napkin Set", 32));
        save_cart(&session, &cart).await;

        let restored = load_cart(&session).await;
        assert_eq!(restored, cart);
        assert_eq!(restored.item_count(), 2);
    }

    #[tokio::test]
    async fn test_corrupted_value_loads_as_empty_cart() {
        let session = test_session();
        session
            .insert(session_keys::CART, "{not valid json]".to_string())
            .await
            .unwrap();

        let cart = load_cart(&session).await;
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_corrupted_value_is_replaced_on_next_save() {
        let session = test_session();
        session
            .insert(session_keys::CART, "garbage".to_string())
            .await
            .unwrap();

        let mut cart = load_cart(&session).await;
        cart.add_item(draft(1, "Mug", 10));
        save_cart(&session, &cart).await;

        let restored = load_cart(&session).await;
        assert_eq!(restored.item_count(), 1);
    }

    #[tokio::test]
    async fn test_clear_persists_empty_array() {
        let session = test_session();

        let mut cart = Cart::default();
        cart.add_item(draft(1, "Mug", 10));
        save_cart(&session, &cart).await;

        cart.clear();
        save_cart(&session, &cart).await;

        let raw: String = session.get(session_keys::CART).await.unwrap().unwrap();
        assert_eq!(raw, "[]");
        assert!(load_cart(&session).await.is_empty());
    }

    #[tokio::test]
    async fn test_persisted_value_is_a_json_array_string() {
        let session = test_session();

        let mut cart = Cart::default();
        cart.add_item(draft(1, "Mug", 10));
        save_cart(&session, &cart).await;

        let raw: String = session.get(session_keys::CART).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
        assert_eq!(value.as_array().unwrap().len(), 1);
    }
}
