//! Request authentication.
//!
//! Every route except the public ones requires a valid session token,
//! taken from the session cookie or, for API clients, from a header.
//! Unauthenticated API calls get a JSON 401; page requests are redirected
//! to the login form with the original path preserved.

use actix_service::forward_ready;
use actix_utils::future::{Ready, ok};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::{Method, header},
    web::Data,
};
use futures::future::LocalBoxFuture;
use magpie_api::ApiError;

use crate::{
    auth::{
        model::{ACCESS_TOKEN_HEADER, AUTHORIZATION_HEADER, AuthContext, TOKEN_COOKIE, TOKEN_PREFIX},
        service,
    },
    model::AppState,
};

/// Routes reachable without a session.
const PUBLIC_PATHS: [&str; 3] = ["/login", "/logout", "/health"];

/// Routes that answer JSON and must never redirect to the login page.
const API_PATHS: [&str; 3] = ["/start", "/progress", "/download_final"];

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|p| path == *p)
}

fn is_api(path: &str) -> bool {
    API_PATHS
        .iter()
        .any(|p| path == *p || path.strip_prefix(p).is_some_and(|rest| rest.starts_with('/')))
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    if let Some(header_value) = req.headers().get(ACCESS_TOKEN_HEADER)
        && let Ok(value) = header_value.to_str()
    {
        let value = value.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    if let Some(header_value) = req.headers().get(AUTHORIZATION_HEADER)
        && let Ok(value) = header_value.to_str()
        && let Some(token) = value.trim().strip_prefix(TOKEN_PREFIX)
    {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    None
}

pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthenticationMiddleware { service })
    }
}

pub struct AuthenticationMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let path = req.path().to_string();

        let mut authenticate_pass = false;
        if Method::OPTIONS == *req.method() || is_public(&path) {
            authenticate_pass = true;
        }

        if !authenticate_pass
            && let Some(state) = req.app_data::<Data<AppState>>()
            && let Some(token) = extract_token(&req)
            && let Ok(token_data) = service::decode_jwt_token_cached(&token, &state.token_secret)
        {
            req.extensions_mut().insert(AuthContext {
                username: token_data.claims.sub,
            });
            authenticate_pass = true;
        }

        if !authenticate_pass {
            let response = if is_api(&path) {
                HttpResponse::Unauthorized().json(ApiError::new("unauthorized"))
            } else {
                let query =
                    serde_urlencoded::to_string([("next", path.as_str())]).unwrap_or_default();
                HttpResponse::Found()
                    .insert_header((header::LOCATION, format!("/login?{}", query)))
                    .finish()
            };
            return Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) });
        }

        let res = self.service.call(req);

        Box::pin(async move { res.await.map(ServiceResponse::map_into_left_body) })
    }
}
