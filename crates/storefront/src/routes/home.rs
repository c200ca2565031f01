//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::backend::ProductQuery;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::artisans::ArtisanView;
use crate::routes::categories::CategoryView;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Number of featured products on the home page.
const FEATURED_PRODUCT_COUNT: i64 = 8;

/// Number of featured artisans on the home page.
const FEATURED_ARTISAN_COUNT: usize = 4;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Short name to greet a signed-in shopper with.
    pub greeting: Option<String>,
    /// Featured products for the main grid.
    pub featured_products: Vec<ProductView>,
    /// All categories for the browse strip.
    pub categories: Vec<CategoryView>,
    /// Featured artisans for the "meet the makers" section.
    pub featured_artisans: Vec<ArtisanView>,
}

/// Display the home page.
///
/// Each section degrades to empty on a backend failure rather than taking
/// the whole page down.
#[instrument(skip(state, user))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let greeting =
        user.map(|u| u.name.unwrap_or_else(|| u.email.local_part().to_string()));

    let featured_products = state
        .backend()
        .get_products(
            ProductQuery::default()
                .featured()
                .limit(FEATURED_PRODUCT_COUNT),
        )
        .await
        .map_or_else(
            |e| {
                tracing::error!("Failed to fetch featured products: {e}");
                Vec::new()
            },
            |products| products.iter().map(ProductView::from).collect(),
        );

    let categories = state.backend().get_categories().await.map_or_else(
        |e| {
            tracing::error!("Failed to fetch categories: {e}");
            Vec::new()
        },
        |categories| categories.iter().map(CategoryView::from).collect(),
    );

    let featured_artisans = state.backend().get_artisans().await.map_or_else(
        |e| {
            tracing::error!("Failed to fetch artisans: {e}");
            Vec::new()
        },
        |artisans| {
            artisans
                .iter()
                .filter(|a| a.featured)
                .take(FEATURED_ARTISAN_COUNT)
                .map(ArtisanView::from)
                .collect()
        },
    );

    HomeTemplate {
        greeting,
        featured_products,
        categories,
        featured_artisans,
    }
}
