//! Artisan profile route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use hearthside_core::ArtisanId;

use crate::backend::types::Artisan;
use crate::backend::{BackendError, ProductQuery};
use crate::error::{AppError, Result};
use crate::filters;
use crate::routes::products::ProductView;
use crate::state::AppState;

/// Artisan display data for templates.
#[derive(Clone)]
pub struct ArtisanView {
    pub id: i32,
    pub name: String,
    pub bio: String,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub specialty: Option<String>,
}

impl From<&Artisan> for ArtisanView {
    fn from(artisan: &Artisan) -> Self {
        Self {
            id: artisan.id.as_i32(),
            name: artisan.name.clone(),
            bio: artisan.bio.clone(),
            location: artisan.location.clone(),
            avatar_url: artisan.avatar_url.clone(),
            specialty: artisan.specialty.clone(),
        }
    }
}

/// Artisan listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "artisans/index.html")]
pub struct ArtisansIndexTemplate {
    pub artisans: Vec<ArtisanView>,
}

/// Artisan profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "artisans/show.html")]
pub struct ArtisanShowTemplate {
    pub artisan: ArtisanView,
    pub products: Vec<ProductView>,
}

/// Display artisan listing page.
///
/// # Errors
///
/// Returns an error if the hosted API is unreachable.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let artisans = state.backend().get_artisans().await?;

    Ok(ArtisansIndexTemplate {
        artisans: artisans.iter().map(ArtisanView::from).collect(),
    })
}

/// Display an artisan's profile with their products.
///
/// # Errors
///
/// Returns a 404 if the artisan does not exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let artisan_id = ArtisanId::new(id);

    let artisan = match state.backend().get_artisan(artisan_id).await {
        Ok(artisan) => artisan,
        Err(BackendError::NotFound(_)) => {
            return Err(AppError::NotFound(format!("artisan {id}")));
        }
        Err(e) => return Err(AppError::Backend(e)),
    };

    let products = state
        .backend()
        .get_products(ProductQuery::default().artisan(artisan_id))
        .await?;

    Ok(ArtisanShowTemplate {
        artisan: ArtisanView::from(&artisan),
        products: products.iter().map(ProductView::from).collect(),
    })
}
