//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};

use hearthside_core::{Email, UserId};

use crate::backend::auth::AuthUser;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in shopper.
/// The access token lives under its own key so it never rides along when
/// only the identity is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's id at the hosted auth service.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name, if the shopper provided one.
    #[serde(default)]
    pub name: Option<String>,
}

impl From<AuthUser> for CurrentUser {
    fn from(user: AuthUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in shopper.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the shopper's access token at the hosted API.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Key for the persisted cart line items (JSON-serialized array).
    pub const CART: &str = "hearthside.cart.v1";
}
