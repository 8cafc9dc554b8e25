//! Task endpoints: batch submission, live progress, archive download.

use actix_web::{HttpResponse, Responder, get, http::header, post, web};
use bytes::Bytes;
use futures::{StreamExt, stream};
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use magpie_api::{
    ApiError, StartTaskRequest, StartTaskResponse, parse_url_list, validate_url_batch,
};
use magpie_common::error;
use magpie_core::snapshot_stream;

use crate::model::AppState;

fn sse_frame<T: Serialize>(payload: &T) -> Bytes {
    let json = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
    Bytes::from(format!("data: {}\n\n", json))
}

#[post("/start")]
async fn start(data: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    // Malformed or missing JSON falls through to the empty-list error
    // instead of a plain 400, so clients always get the same body shape.
    let request = serde_json::from_slice::<StartTaskRequest>(&body)
        .unwrap_or_else(|_| StartTaskRequest {
            urls: String::new(),
        });

    let urls = parse_url_list(&request.urls);

    if let Err(err) = validate_url_batch(&urls, data.configuration.max_urls_per_task()) {
        let message = match err.code.as_ref() {
            "too_many_urls" => error::OVER_URL_QUOTA.message,
            "url_too_long" => error::URL_TOO_LONG.message,
            _ => error::NO_URLS.message,
        };
        return HttpResponse::BadRequest().json(ApiError::new(message));
    }

    let task_id = data.engine.start(urls);

    HttpResponse::Ok().json(StartTaskResponse {
        task_id: task_id.to_string(),
    })
}

#[get("/progress/{task_id}")]
async fn progress(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let task_id = path.into_inner();

    let receiver = Uuid::parse_str(&task_id)
        .ok()
        .and_then(|id| data.registry.subscribe(id));

    let Some(receiver) = receiver else {
        let frame = sse_frame(&ApiError::new(error::TASK_NOT_FOUND.message));
        let body = stream::once(async move { Ok::<_, actix_web::Error>(frame) });
        return HttpResponse::Ok()
            .content_type("text/event-stream")
            .insert_header((header::CACHE_CONTROL, "no-cache"))
            .streaming(body);
    };

    let frames =
        snapshot_stream(receiver).map(|snapshot| Ok::<_, actix_web::Error>(sse_frame(&snapshot)));

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(frames)
}

#[get("/download_final/{task_id}")]
async fn download_final(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let task_id = path.into_inner();

    let archive = match Uuid::parse_str(&task_id) {
        Ok(id) => data.store.read(id).await,
        Err(_) => Ok(None),
    };

    match archive {
        Ok(Some(bytes)) => HttpResponse::Ok()
            .content_type("application/zip")
            .insert_header((
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"images.zip\"",
            ))
            .body(bytes),
        Ok(None) => HttpResponse::NotFound().body("File not found"),
        Err(err) => {
            error!("failed to read archive {}: {}", task_id, err);
            HttpResponse::InternalServerError().body("Failed to read archive")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpie_api::{DownloadItem, TaskSnapshot};

    #[test]
    fn test_sse_frame_shape() {
        let snapshot = TaskSnapshot {
            items: vec![DownloadItem::pending("a.jpg")],
            done: false,
        };
        let frame = sse_frame(&snapshot);
        let text = std::str::from_utf8(&frame).unwrap();
        assert!(text.starts_with("data: {"));
        assert!(text.ends_with("\n\n"));
        assert!(text.contains("\"a.jpg\""));
    }
}
