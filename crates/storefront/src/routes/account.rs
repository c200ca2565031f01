//! Account route handlers.
//!
//! These routes require authentication. Order data comes straight from the
//! hosted API, scoped by the shopper's access token.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::types::Order;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::auth::RequireAuth;
use crate::middleware::get_access_token;
use crate::state::AppState;

/// Number of orders shown on the account overview.
const RECENT_ORDER_COUNT: usize = 3;

/// User display data for templates.
#[derive(Clone)]
pub struct UserView {
    pub email: String,
    pub name: Option<String>,
}

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub number: String,
    pub placed_on: String,
    pub status: String,
    pub total: String,
    pub item_count: usize,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            number: format!("#{}", order.id),
            placed_on: order.created_at.format("%B %-d, %Y").to_string(),
            status: order.status.label().to_string(),
            total: format!("${:.2}", order.total),
            item_count: order.items.len(),
        }
    }
}

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountIndexTemplate {
    pub user: UserView,
    pub recent_orders: Vec<OrderView>,
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub user: UserView,
    pub orders: Vec<OrderView>,
}

/// Display account overview page.
///
/// Order fetch failures degrade to an empty list; the overview is still
/// useful without them.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current_user): RequireAuth,
) -> impl IntoResponse {
    let recent_orders = match get_access_token(&session).await {
        Some(token) => state.backend().get_orders(&token).await.map_or_else(
            |e| {
                tracing::warn!("Failed to fetch orders for account overview: {e}");
                Vec::new()
            },
            |orders| {
                orders
                    .iter()
                    .take(RECENT_ORDER_COUNT)
                    .map(OrderView::from)
                    .collect()
            },
        ),
        None => Vec::new(),
    };

    AccountIndexTemplate {
        user: UserView {
            email: current_user.email.to_string(),
            name: current_user.name,
        },
        recent_orders,
    }
}

/// Display order history page.
///
/// # Errors
///
/// Returns an error if the hosted API rejects the request.
#[instrument(skip(state, session))]
pub async fn orders(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current_user): RequireAuth,
) -> Result<impl IntoResponse> {
    let token = get_access_token(&session)
        .await
        .ok_or_else(|| AppError::Unauthorized("missing access token".to_string()))?;

    let orders = state.backend().get_orders(&token).await?;

    Ok(OrdersTemplate {
        user: UserView {
            email: current_user.email.to_string(),
            name: current_user.name,
        },
        orders: orders.iter().map(OrderView::from).collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use hearthside_core::{OrderId, OrderStatus, ProductId, UserId};

    use crate::backend::types::OrderItem;

    use super::*;

    #[test]
    fn test_order_view_formatting() {
        let order = Order {
            id: OrderId::new(101),
            user_id: UserId::new(5),
            status: OrderStatus::Shipped,
            total: Decimal::new(6350, 2),
            created_at: chrono::Utc.with_ymd_and_hms(2025, 11, 2, 14, 30, 0).unwrap(),
            items: vec![OrderItem {
                product_id: ProductId::new(7),
                name: "Walnut Serving Board".to_string(),
                quantity: 1,
                unit_price: Decimal::new(4800, 2),
            }],
        };

        let view = OrderView::from(&order);
        assert_eq!(view.number, "#101");
        assert_eq!(view.status, "Shipped");
        assert_eq!(view.total, "$63.50");
        assert_eq!(view.item_count, 1);
        assert_eq!(view.placed_on, "November 2, 2025");
    }
}
