//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use hearthside_core::ProductId;

use crate::backend::types::Product;
use crate::backend::{BackendError, ProductQuery};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Number of related products shown on the detail page.
const RELATED_PRODUCT_COUNT: usize = 4;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub image_url: Option<String>,
    pub artisan_name: Option<String>,
    pub in_stock: bool,
}

/// Product detail display data for templates.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: Option<String>,
    pub artisan_id: Option<i32>,
    pub artisan_name: Option<String>,
    pub in_stock: bool,
}

/// Category link for the filter navigation.
#[derive(Clone)]
pub struct CategoryLink {
    pub name: String,
    pub slug: String,
    /// Whether this category is the active filter.
    pub active: bool,
}

/// Format a decimal amount as a price string.
fn format_price(amount: &Decimal) -> String {
    format!("${amount:.2}")
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            price: format_price(&product.price),
            image_url: product.image_url.clone(),
            artisan_name: product.artisan_name.clone(),
            in_stock: product.in_stock,
        }
    }
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: format_price(&product.price),
            image_url: product.image_url.clone(),
            artisan_id: product.artisan_id.map(|id| id.as_i32()),
            artisan_name: product.artisan_name.clone(),
            in_stock: product.in_stock,
        }
    }
}

/// Catalog listing query parameters, passed through to the hosted API.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Category slug to filter by.
    pub category: Option<String>,
    /// Free-text search term.
    pub q: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryLink>,
    pub active_category: Option<String>,
    pub search: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
    pub related_products: Vec<ProductView>,
}

/// Display product listing page.
///
/// # Errors
///
/// Returns an error if the hosted API is unreachable.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<impl IntoResponse> {
    let mut product_query = ProductQuery::default();

    // Resolve the category slug from the query string, ignoring unknown ones
    // rather than failing the whole listing.
    let active_category = match &query.category {
        Some(slug) => match state.backend().get_category_by_slug(slug).await {
            Ok(category) => {
                product_query = product_query.category(category.id);
                Some(category.slug)
            }
            Err(BackendError::NotFound(_)) => None,
            Err(e) => return Err(AppError::Backend(e)),
        },
        None => None,
    };

    if let Some(term) = &query.q {
        if !term.trim().is_empty() {
            product_query = product_query.search(term.trim());
        }
    }

    let products = state.backend().get_products(product_query).await?;
    let categories = state.backend().get_categories().await?;

    Ok(ProductsIndexTemplate {
        products: products.iter().map(ProductView::from).collect(),
        categories: categories
            .into_iter()
            .map(|c| CategoryLink {
                active: active_category.as_deref() == Some(c.slug.as_str()),
                name: c.name,
                slug: c.slug,
            })
            .collect(),
        active_category,
        search: query.q,
    })
}

/// Display product detail page.
///
/// # Errors
///
/// Returns a 404 if the product does not exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let product_id = ProductId::new(id);

    let product = match state.backend().get_product(product_id).await {
        Ok(product) => product,
        Err(BackendError::NotFound(_)) => {
            return Err(AppError::NotFound(format!("product {id}")));
        }
        Err(e) => return Err(AppError::Backend(e)),
    };

    // Related products come from the same category; failures here degrade to
    // an empty strip rather than breaking the page.
    let related_products = match product.category_id {
        Some(category_id) => state
            .backend()
            .get_products(ProductQuery::default().category(category_id))
            .await
            .map_or_else(
                |e| {
                    tracing::warn!("Failed to fetch related products: {e}");
                    Vec::new()
                },
                |products| {
                    products
                        .iter()
                        .filter(|p| p.id != product_id)
                        .take(RELATED_PRODUCT_COUNT)
                        .map(ProductView::from)
                        .collect()
                },
            ),
        None => Vec::new(),
    };

    Ok(ProductShowTemplate {
        product: ProductDetailView::from(&product),
        related_products,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: ProductId::new(7),
            name: "Walnut Serving Board".to_string(),
            description: "Hand-finished walnut.".to_string(),
            price: Decimal::new(4800, 2),
            image_url: Some("/images/board.jpg".to_string()),
            category_id: None,
            artisan_id: None,
            artisan_name: Some("Hollow Oak Woodworks".to_string()),
            featured: false,
            in_stock: true,
        }
    }

    #[test]
    fn test_product_view_formats_price() {
        let view = ProductView::from(&sample_product());
        assert_eq!(view.price, "$48.00");
        assert_eq!(view.artisan_name.as_deref(), Some("Hollow Oak Woodworks"));
    }

    #[test]
    fn test_detail_view_carries_description() {
        let view = ProductDetailView::from(&sample_product());
        assert_eq!(view.description, "Hand-finished walnut.");
        assert!(view.in_stock);
    }
}
