//! HTTP endpoint handlers.

use actix_web::{Scope, web};

pub mod auth;
pub mod health;
pub mod pages;
pub mod task;

pub fn routes() -> Scope {
    web::scope("")
        .service(pages::index)
        .service(health::health)
        .service(auth::login_page)
        .service(auth::login)
        .service(auth::logout)
        .service(task::start)
        .service(task::progress)
        .service(task::download_final)
}
