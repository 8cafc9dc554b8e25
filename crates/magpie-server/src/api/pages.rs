//! Embedded UI pages.

use actix_web::{HttpResponse, Responder, get};

use crate::ui;

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(ui::INDEX_PAGE)
}
