//! Authentication models and constants.

use serde::{Deserialize, Serialize};

/// Cookie carrying the session token for browser requests.
pub const TOKEN_COOKIE: &str = "magpie_token";
/// Header carrying the session token for API clients.
pub const ACCESS_TOKEN_HEADER: &str = "accessToken";
pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const TOKEN_PREFIX: &str = "Bearer ";

/// JWT claims for a logged-in session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MagpieJwtPayload {
    pub sub: String,
    pub exp: i64,
}

/// Authenticated identity attached to the request after token validation.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub username: String,
}
