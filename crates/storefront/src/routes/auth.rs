//! Authentication route handlers.
//!
//! All credential handling is delegated to the hosted auth service; these
//! handlers forward form input, then store the returned identity and access
//! token in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::AuthError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, get_access_token, set_access_token, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub name: Option<String>,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Message Codes
// =============================================================================

/// Map a login error code (from the redirect query string) to display text.
fn login_error_message(code: &str) -> String {
    match code {
        "invalid" => "Invalid email or password.".to_string(),
        "session" => "Could not save your session. Please try again.".to_string(),
        _ => "Sign-in is temporarily unavailable. Please try again.".to_string(),
    }
}

/// Map a register error code to display text.
fn register_error_message(code: &str) -> String {
    match code {
        "mismatch" => "Passwords do not match.".to_string(),
        "taken" => "An account with this email already exists.".to_string(),
        "weak" => "Password does not meet the minimum requirements.".to_string(),
        "email" => "Enter a valid email address.".to_string(),
        "session" => "Could not save your session. Please try again.".to_string(),
        _ => "Registration is temporarily unavailable. Please try again.".to_string(),
    }
}

/// Map a success code to display text.
fn success_message(code: &str) -> String {
    match code {
        "logged_out" => "You have been signed out.".to_string(),
        _ => code.to_string(),
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().map(login_error_message),
        success: query.success.as_deref().map(success_message),
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth_session = match state.auth().sign_in(&form.email, &form.password).await {
        Ok(auth_session) => auth_session,
        Err(AuthError::InvalidCredentials) => {
            return Redirect::to("/auth/login?error=invalid").into_response();
        }
        Err(e) => {
            tracing::error!("Sign-in failed: {e}");
            return Redirect::to("/auth/login?error=unavailable").into_response();
        }
    };

    let user = CurrentUser::from(auth_session.user);

    if let Err(e) = set_current_user(&session, &user).await {
        tracing::error!("Failed to set session: {e}");
        return Redirect::to("/auth/login?error=session").into_response();
    }
    if let Err(e) = set_access_token(&session, &auth_session.access_token).await {
        tracing::error!("Failed to store access token: {e}");
        return Redirect::to("/auth/login?error=session").into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));

    Redirect::to("/account").into_response()
}

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        error: query.error.as_deref().map(register_error_message),
    }
}

/// Handle registration form submission.
///
/// A successful registration signs the shopper in directly.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.password != form.password_confirm {
        return Redirect::to("/auth/register?error=mismatch").into_response();
    }

    let name = form
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let auth_session = match state.auth().sign_up(&form.email, &form.password, name).await {
        Ok(auth_session) => auth_session,
        Err(AuthError::EmailTaken) => {
            return Redirect::to("/auth/register?error=taken").into_response();
        }
        Err(AuthError::WeakPassword(_)) => {
            return Redirect::to("/auth/register?error=weak").into_response();
        }
        Err(AuthError::InvalidEmail(_)) => {
            return Redirect::to("/auth/register?error=email").into_response();
        }
        Err(e) => {
            tracing::error!("Sign-up failed: {e}");
            return Redirect::to("/auth/register?error=unavailable").into_response();
        }
    };

    let user = CurrentUser::from(auth_session.user);

    if let Err(e) = set_current_user(&session, &user).await {
        tracing::error!("Failed to set session: {e}");
        return Redirect::to("/auth/register?error=session").into_response();
    }
    if let Err(e) = set_access_token(&session, &auth_session.access_token).await {
        tracing::error!("Failed to store access token: {e}");
        return Redirect::to("/auth/register?error=session").into_response();
    }

    set_sentry_user(&user.id, Some(user.email.as_str()));

    Redirect::to("/account").into_response()
}

/// Handle logout.
///
/// The session identity is cleared first; token revocation at the auth
/// service is best-effort. The cart stays in the session.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    let token = get_access_token(&session).await;

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session on logout: {e}");
    }
    clear_sentry_user();

    if let Some(token) = token
        && let Err(e) = state.auth().sign_out(&token).await
    {
        tracing::warn!("Token revocation failed: {e}");
    }

    Redirect::to("/auth/login?success=logged_out").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_messages() {
        assert_eq!(login_error_message("invalid"), "Invalid email or password.");
        assert!(login_error_message("anything-else").contains("temporarily unavailable"));
    }

    #[test]
    fn test_register_error_messages() {
        assert_eq!(register_error_message("mismatch"), "Passwords do not match.");
        assert_eq!(
            register_error_message("taken"),
            "An account with this email already exists."
        );
        assert!(register_error_message("weak").contains("minimum requirements"));
    }

    #[test]
    fn test_success_message() {
        assert_eq!(success_message("logged_out"), "You have been signed out.");
    }
}
