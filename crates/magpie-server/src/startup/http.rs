//! HTTP server setup.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpServer, dev::Server, middleware::Logger, web};

use crate::{api, middleware::auth::Authentication, model::AppState};

/// Creates and binds the HTTP server.
///
/// The server carries the authentication middleware, the request logger
/// and the full route set, with worker count and client request timeout
/// taken from the configuration.
pub fn app_server(app_state: Arc<AppState>) -> Result<Server, std::io::Error> {
    let configuration = &app_state.configuration;
    let address = configuration.server_address();
    let port = configuration.server_port();
    let workers = configuration.server_workers();
    let request_timeout = Duration::from_secs(configuration.request_timeout_secs());

    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Authentication)
            .app_data(web::Data::from(app_state.clone()))
            .service(api::routes())
    })
    .client_request_timeout(request_timeout)
    .workers(workers)
    .bind((address, port))?
    .run())
}
