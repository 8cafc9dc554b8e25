//! Login and logout endpoints.
//!
//! `POST /login` serves both the browser form flow (cookie plus redirect)
//! and API clients (`Accept: application/json` gets the token in the body
//! and the `Authorization` header). Attempts are rate limited per client
//! address before credentials are checked.

use actix_web::{
    HttpRequest, HttpResponse, Responder,
    cookie::{Cookie, SameSite, time},
    get,
    http::header,
    post, web,
};
use serde::Deserialize;
use tracing::{info, warn};

use magpie_api::{ApiError, LoginForm, LoginResult, validate_password, validate_username};

use crate::{
    auth::{
        model::{AUTHORIZATION_HEADER, TOKEN_COOKIE, TOKEN_PREFIX},
        service::{encode_jwt_token, invalidate_token, verify_password},
    },
    middleware::rate_limit::{check_login_rate_limit, record_login_attempt, record_login_success},
    model::AppState,
    ui,
};

const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";
const LOCKED_OUT_MESSAGE: &str = "Too many login attempts, try again later";

#[derive(Debug, Deserialize)]
struct NextQuery {
    next: Option<String>,
}

/// Rejects redirect targets that would leave the site.
fn sanitize_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") {
        next
    } else {
        "/"
    }
}

fn client_identifier(req: &HttpRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

fn wants_json(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"))
}

fn login_page_response(error: Option<&str>, next: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(ui::render_login_page(error, next))
}

#[get("/login")]
async fn login_page(query: web::Query<NextQuery>) -> impl Responder {
    let next = query.next.as_deref().unwrap_or("/");
    login_page_response(None, sanitize_next(next))
}

#[post("/login")]
async fn login(
    data: web::Data<AppState>,
    form: Option<web::Form<LoginForm>>,
    query: Option<web::Query<NextQuery>>,
    req: HttpRequest,
) -> impl Responder {
    let mut username = String::new();
    let mut password = String::new();
    let mut next = String::new();

    if let Some(form_data) = &form {
        if let Some(v) = &form_data.username {
            username = v.trim().to_string();
        }
        if let Some(v) = &form_data.password {
            password = v.trim().to_string();
        }
        if let Some(v) = &form_data.next {
            next = v.to_string();
        }
    }

    // The form target may carry the original path as a query parameter,
    // which wins over the hidden form field.
    if let Some(query_data) = &query
        && let Some(v) = &query_data.next
        && !v.is_empty()
    {
        next = v.to_string();
    }

    let next = if next.is_empty() { "/".to_string() } else { next };
    let next = sanitize_next(&next).to_string();

    let identifier = client_identifier(&req);
    let json_client = wants_json(&req);

    if let Err(remaining) = check_login_rate_limit(&identifier) {
        warn!(
            "login blocked for {}, locked out for another {}s",
            identifier,
            remaining.as_secs()
        );
        if json_client {
            return HttpResponse::Forbidden().json(ApiError::new(LOCKED_OUT_MESSAGE));
        }
        return login_page_response(Some(LOCKED_OUT_MESSAGE), &next);
    }

    // Count the attempt before checking credentials so guesses against
    // wrong passwords consume the quota.
    record_login_attempt(&identifier);

    // Length checks run before bcrypt so oversized input never reaches it.
    let credentials_ok = validate_username(&username).is_ok()
        && validate_password(&password).is_ok()
        && username == data.configuration.app_username()
        && verify_password(&password, &data.password_hash);

    if !credentials_ok {
        warn!(username = %username, "failed login from {}", identifier);
        if json_client {
            return HttpResponse::Forbidden().json(ApiError::new(INVALID_CREDENTIALS_MESSAGE));
        }
        return login_page_response(Some(INVALID_CREDENTIALS_MESSAGE), &next);
    }

    record_login_success(&identifier);

    let token_ttl = data.configuration.token_ttl_seconds();
    let access_token = match encode_jwt_token(&username, &data.token_secret, token_ttl) {
        Ok(token) => token,
        Err(err) => {
            tracing::error!("failed to generate session token: {}", err);
            return HttpResponse::InternalServerError().body("Failed to generate token");
        }
    };

    info!(username = %username, "login succeeded");

    if json_client {
        let login_result = LoginResult {
            access_token: access_token.clone(),
            token_ttl,
            username: username.clone(),
        };
        return HttpResponse::Ok()
            .append_header((
                AUTHORIZATION_HEADER,
                format!("{}{}", TOKEN_PREFIX, access_token),
            ))
            .json(login_result);
    }

    let cookie = Cookie::build(TOKEN_COOKIE, access_token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(token_ttl))
        .finish();

    HttpResponse::Found()
        .insert_header((header::LOCATION, next))
        .cookie(cookie)
        .finish()
}

#[get("/logout")]
async fn logout(req: HttpRequest) -> impl Responder {
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        invalidate_token(cookie.value());
    }

    let mut removal = Cookie::new(TOKEN_COOKIE, "");
    removal.set_path("/");
    removal.make_removal();

    HttpResponse::Found()
        .insert_header((header::LOCATION, "/login"))
        .cookie(removal)
        .finish()
}
