use std::net::TcpListener;
use std::time::Duration;

use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
use tracing::Dispatch;

use crate::categories::{
    create_category, delete_category, get_category, list_categories, update_category,
};
use crate::error::AppError;
use crate::middleware::{Cors, Recovery, RequestLogger};
use crate::AppState;

const READ_TIMEOUT: Duration = Duration::from_secs(15);
const WRITE_TIMEOUT: Duration = Duration::from_secs(15);
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Bodies are decoded as JSON whatever `Content-Type` says.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err, _req| AppError::Validation(format!("Invalid JSON: {}", err)).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).app_data(query_config()).service(
        web::scope("/api")
            .route("/categories", web::get().to(list_categories))
            .route("/categories", web::post().to(create_category))
            .route("/categories/{categoryId}", web::get().to(get_category))
            .route("/categories/{categoryId}", web::put().to(update_category))
            .route("/categories/{categoryId}", web::delete().to(delete_category)),
    );
}

/// The application with its middleware chain. `wrap` nests outward, so the
/// last stage registered (`Recovery`) is the first to see a request.
pub fn build_app(
    state: AppState,
    dispatch: Dispatch,
    cors: Cors,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(configure)
        .wrap(cors)
        .wrap(RequestLogger)
        .wrap(Recovery::new(dispatch))
}

pub fn build_server(
    listener: TcpListener,
    state: AppState,
    dispatch: Dispatch,
    allowed_origins: Vec<String>,
    workers: usize,
) -> std::io::Result<Server> {
    let cors = Cors::new(allowed_origins);

    let server = HttpServer::new(move || build_app(state.clone(), dispatch.clone(), cors.clone()))
        .client_request_timeout(READ_TIMEOUT)
        .client_disconnect_timeout(WRITE_TIMEOUT)
        .keep_alive(IDLE_TIMEOUT)
        .workers(workers.max(1))
        .listen(listener)?
        .run();

    Ok(server)
}
