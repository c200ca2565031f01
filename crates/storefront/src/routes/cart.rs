//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every handler follows the same two-step contract: load the cart from the
//! session, apply a pure transition from `hearthside-core`, persist the
//! result, and render the returned [`CartEvent`] as a toast. The handlers
//! never mutate line items directly.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use hearthside_core::ProductId;
use hearthside_core::cart::{Cart, CartEvent, CartLineItem, LineItemDraft};

use crate::cart::{load_cart, save_cart};
use crate::error::add_breadcrumb;
use crate::filters;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: i32,
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_price: String,
    pub image: Option<String>,
    pub artisan_label: Option<String>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }
}

// =============================================================================
// Type Conversions
// =============================================================================

/// Format a decimal amount as a price string.
fn format_price(amount: &Decimal) -> String {
    format!("${amount:.2}")
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: format_price(&cart.total_price()),
            item_count: cart.item_count(),
        }
    }
}

impl From<&CartLineItem> for CartItemView {
    fn from(line: &CartLineItem) -> Self {
        Self {
            id: line.id.as_i32(),
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: format_price(&line.unit_price),
            line_price: format_price(&line.line_total()),
            image: line.image.clone(),
            artisan_label: line.artisan_label.clone(),
        }
    }
}

/// Map a cart event to the toast message shown to the shopper.
///
/// Quantity updates are visible in the fragment itself, so they get no
/// toast.
fn toast_message(event: &CartEvent) -> Option<String> {
    match event {
        CartEvent::ItemAdded { name, .. } => Some(format!("{name} added to your cart")),
        CartEvent::ItemIncremented { name, .. } => Some(format!("Added another {name}")),
        CartEvent::ItemRemoved { name, .. } => Some(format!("{name} removed from your cart")),
        CartEvent::QuantityUpdated { .. } => None,
        CartEvent::Cleared => Some("Cart cleared".to_string()),
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
///
/// There is no quantity field: adding the same product again bumps its line
/// item by one.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i32,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i32,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    /// Always `None` on a full page load; present so the shared cart items
    /// partial renders.
    pub toast: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
    pub toast: Option<String>,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Standalone toast fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/toast.html")]
pub struct ToastTemplate {
    pub message: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;

    CartShowTemplate {
        cart: CartView::from(&cart),
        toast: None,
    }
}

/// Add a product to the cart (HTMX).
///
/// Fetches the product from the hosted API so the name, price, and
/// attribution are captured at add-time, then merges it into the cart.
/// Returns a toast fragment with an HTMX trigger to refresh the badge.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let product_id = ProductId::new(form.product_id);

    let product = match state.backend().get_product(product_id).await {
        Ok(product) => product,
        Err(e) => {
            tracing::error!("Failed to fetch product for cart add: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<span class=\"toast toast-error\">Error adding to cart</span>"),
            )
                .into_response();
        }
    };

    let mut cart = load_cart(&session).await;
    let event = cart.add_item(LineItemDraft {
        id: product.id,
        name: product.name,
        unit_price: product.price,
        image: product.image_url,
        artisan_label: product.artisan_name,
    });
    save_cart(&session, &cart).await;

    add_breadcrumb(
        "cart",
        "Added item to cart",
        Some(&[("product_id", &form.product_id.to_string())]),
    );

    let message =
        toast_message(&event).unwrap_or_else(|| "Cart updated".to_string());

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        ToastTemplate { message },
    )
        .into_response()
}

/// Update cart item quantity (HTMX).
///
/// A quantity of zero or below removes the line item.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Response {
    let mut cart = load_cart(&session).await;
    let event = cart.update_quantity(ProductId::new(form.product_id), form.quantity);
    save_cart(&session, &cart).await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
            toast: event.as_ref().and_then(toast_message),
        },
    )
        .into_response()
}

/// Remove an item from the cart (HTMX).
///
/// Removing a product that is not in the cart is a silent no-op.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Response {
    let mut cart = load_cart(&session).await;
    let event = cart.remove_item(ProductId::new(form.product_id));
    save_cart(&session, &cart).await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
            toast: event.as_ref().and_then(toast_message),
        },
    )
        .into_response()
}

/// Empty the cart (HTMX).
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Response {
    let mut cart = load_cart(&session).await;
    let event = cart.clear();
    save_cart(&session, &cart).await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
            toast: toast_message(&event),
        },
    )
        .into_response()
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = load_cart(&session).await;

    CartCountTemplate {
        count: cart.item_count(),
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
    fn test_format_price_two_decimals() {
        assert_eq!(format_price(&Decimal::new(2450, 2)), "$24.50");
        assert_eq!(format_price(&Decimal::from(10)), "$10.00");
    }

    #[test]
    fn test_cart_view_from_cart() {
        let mut cart = Cart::default();
        cart.add_item(draft(1, "Mug", 10));
        cart.add_item(draft(1, "Mug", 10));
        cart.add_item(draft(2, "Bowl", 5));

        let view = CartView::from(&cart);
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, "$25.00");
        assert_eq!(view.items.first().unwrap().line_price, "$20.00");
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::empty();
        assert_eq!(view.item_count, 0);
        assert_eq!(view.subtotal, "$0.00");
    }

    #[test]
    fn test_toast_messages_distinguish_new_from_repeat() {
        let mut cart = Cart::default();

        let first = cart.add_item(draft(1, "Mug", 10));
        assert_eq!(
            toast_message(&first).unwrap(),
            "Mug added to your cart"
        );

        let second = cart.add_item(draft(1, "Mug", 10));
        assert_eq!(toast_message(&second).unwrap(), "Added another Mug");
    }

    #[test]
    fn test_toast_message_for_remove_and_clear() {
        let mut cart = Cart::default();
        cart.add_item(draft(1, "Mug", 10));

        let removed = cart.remove_item(ProductId::new(1)).unwrap();
        assert_eq!(
            toast_message(&removed).unwrap(),
            "Mug removed from your cart"
        );

        assert_eq!(toast_message(&cart.clear()).unwrap(), "Cart cleared");
    }

    #[test]
    fn test_quantity_update_has_no_toast() {
        let mut cart = Cart::default();
        cart.add_item(draft(1, "Mug", 10));

        let event = cart.update_quantity(ProductId::new(1), 3).unwrap();
        assert_eq!(toast_message(&event), None);
    }
}
