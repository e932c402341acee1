use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{error, trace};

use crate::api::InstanceContext;
use crate::api::response::{ErrorCode, error_response, json_response, success_response};
use crate::services::LinkService;

// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<u64>,
    pub uptime: i64,
}

pub struct HealthService;

impl HealthService {
    /// GET /status
    ///
    /// 直接读存储的 count，不经过链接业务逻辑
    pub async fn status(
        service: web::Data<LinkService>,
        app_start_time: web::Data<AppStartTime>,
    ) -> HttpResponse {
        trace!("Received status request");
        let store = service.store();
        let uptime = (chrono::Utc::now() - app_start_time.start_datetime).num_seconds();

        match tokio::time::timeout(Duration::from_secs(5), store.count()).await {
            Ok(Ok(count)) => success_response(
                StatusCode::OK,
                StatusResponse {
                    status: "Alive.".to_string(),
                    backend: store.backend_name().to_string(),
                    links: Some(count),
                    uptime,
                },
            ),
            outcome => {
                match outcome {
                    Ok(Err(e)) => error!("Status check failed: {}", e),
                    _ => error!("Status check timed out"),
                }
                json_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorCode::InternalServerError,
                    "Storage unavailable",
                    Some(StatusResponse {
                        status: "Unavailable.".to_string(),
                        backend: store.backend_name().to_string(),
                        links: None,
                        uptime,
                    }),
                )
            }
        }
    }

    /// GET /error
    pub async fn error() -> HttpResponse {
        error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, "Bad request.")
    }

    /// GET /
    pub async fn instance(instance: web::Data<InstanceContext>) -> HttpResponse {
        success_response(StatusCode::OK, instance.get_ref().clone())
    }
}
