//! Category route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::backend::types::Category;
use crate::backend::{BackendError, ProductQuery};
use crate::error::{AppError, Result};
use crate::filters;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Category display data for templates.
#[derive(Clone)]
pub struct CategoryView {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            image_url: category.image_url.clone(),
        }
    }
}

/// Category listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub categories: Vec<CategoryView>,
}

/// Category detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub category: CategoryView,
    pub products: Vec<ProductView>,
}

/// Display category listing page.
///
/// # Errors
///
/// Returns an error if the hosted API is unreachable.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = state.backend().get_categories().await?;

    Ok(CategoriesIndexTemplate {
        categories: categories.iter().map(CategoryView::from).collect(),
    })
}

/// Display category detail page with its products.
///
/// # Errors
///
/// Returns a 404 if the category does not exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let category = match state.backend().get_category_by_slug(&slug).await {
        Ok(category) => category,
        Err(BackendError::NotFound(_)) => {
            return Err(AppError::NotFound(format!("category {slug}")));
        }
        Err(e) => return Err(AppError::Backend(e)),
    };

    let products = state
        .backend()
        .get_products(ProductQuery::default().category(category.id))
        .await?;

    Ok(CategoryShowTemplate {
        category: CategoryView::from(&category),
        products: products.iter().map(ProductView::from).collect(),
    })
}
