pub mod health;
pub mod links;
pub mod redirect;

use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::web;

pub use health::{AppStartTime, HealthService};
pub use links::LinkApiService;
pub use redirect::RedirectService;

use crate::api::response::{ErrorCode, error_response};

/// 注册全部路由；固定路径必须先于 `/{short}`
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let resp = error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, "Invalid JSON syntax.");
        InternalError::from_response(err, resp).into()
    }))
    .app_data(web::FormConfig::default().error_handler(|err, _req| {
        let resp = error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, "Invalid form data.");
        InternalError::from_response(err, resp).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let resp = error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, "Invalid query string.");
        InternalError::from_response(err, resp).into()
    }))
    .route("/", web::get().to(HealthService::instance))
    .route("/", web::post().to(LinkApiService::create_json))
    .route("/status", web::get().to(HealthService::status))
    .route("/error", web::get().to(HealthService::error))
    .route("/add", web::post().to(LinkApiService::create_form))
    .route("/access", web::post().to(LinkApiService::access))
    .route("/{short}", web::get().to(RedirectService::handle_redirect));
}
