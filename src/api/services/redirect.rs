use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::api::response::{ErrorCode, error_from_shortpath, json_response, success_response};
use crate::errors::ShortpathError;
use crate::services::resolver::pick_password;
use crate::services::{LinkResolver, Resolution};

#[derive(Debug, Deserialize)]
pub struct PassQuery {
    #[serde(default)]
    pub pass: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PasswordPayload {
    #[serde(default)]
    password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChallengeData {
    pub challenge: String,
    pub short: String,
}

/// 把解析结果转换为 HTTP 响应
pub fn resolution_response(resolution: Resolution) -> HttpResponse {
    match resolution {
        Resolution::Redirect { url } => HttpResponse::SeeOther()
            .insert_header((header::LOCATION, url))
            .finish(),
        Resolution::Info(info) => success_response(StatusCode::OK, info),
        Resolution::Challenge { short } => {
            let mut resp = json_response(
                StatusCode::UNAUTHORIZED,
                ErrorCode::PasswordRequired,
                "This link requires a password to access it.",
                Some(ChallengeData {
                    challenge: "password".to_string(),
                    short,
                }),
            );
            resp.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Password"),
            );
            resp
        }
    }
}

/// JSON 请求体中的密码；不是 JSON 或为空时返回 None
fn password_from_body(req: &HttpRequest, body: &[u8]) -> Result<Option<String>, ShortpathError> {
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    if !is_json || body.is_empty() {
        return Ok(None);
    }

    serde_json::from_slice::<PasswordPayload>(body)
        .map(|payload| payload.password)
        .map_err(|_| ShortpathError::validation("Invalid JSON syntax."))
}

pub struct RedirectService;

impl RedirectService {
    /// GET /{short}
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        query: web::Query<PassQuery>,
        body: web::Bytes,
        resolver: web::Data<LinkResolver>,
    ) -> HttpResponse {
        let raw_short = path.into_inner();
        trace!("Resolving path: {}", raw_short);

        let payload_password = match password_from_body(&req, &body) {
            Ok(password) => password,
            Err(e) => return error_from_shortpath(&e),
        };
        let password = pick_password(payload_password, query.into_inner().pass);

        match resolver.resolve(&raw_short, password).await {
            Ok(resolution) => resolution_response(resolution),
            Err(e) => error_from_shortpath(&e),
        }
    }
}
