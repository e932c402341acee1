//! Link creation and password-form access

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::redirect::resolution_response;
use crate::api::InstanceContext;
use crate::api::response::{error_from_shortpath, success_response};
use crate::errors::ShortpathError;
use crate::services::resolver::pick_password;
use crate::services::{
    CreateLinkRequest, ExpiryInput, LinkCreateResult, LinkResolver, LinkService,
};

const LENGTH_CHANGED_NOTICE: &str = "The length of your auto-generated path had to be changed due to space limitations in the database.";

/// `expireAfter` 可以是分钟数（-1 永不过期）或相对时长表达式
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ExpireAfter {
    Minutes(i64),
    Expression(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkBody {
    pub url: String,
    #[serde(default)]
    pub length: i64,
    #[serde(default, alias = "custom_path")]
    pub custom_path: Option<String>,
    #[serde(default, alias = "expire_after")]
    pub expire_after: Option<ExpireAfter>,
    #[serde(default, alias = "expire_date")]
    pub expire_date: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl CreateLinkBody {
    pub fn into_request(self) -> CreateLinkRequest {
        let expiry = match (self.expire_date, self.expire_after) {
            (date, Some(ExpireAfter::Expression(expr))) => ExpiryInput::Fields {
                expire_date: date,
                expire_after: Some(expr),
            },
            // 显式日期优先于分钟数
            (Some(date), _) if !date.trim().is_empty() => ExpiryInput::Fields {
                expire_date: Some(date),
                expire_after: None,
            },
            (_, Some(ExpireAfter::Minutes(minutes))) => ExpiryInput::Minutes(minutes),
            (date, None) => ExpiryInput::Fields {
                expire_date: date,
                expire_after: None,
            },
        };

        CreateLinkRequest {
            url: self.url,
            custom_path: self.custom_path,
            length: self.length,
            expiry,
            password: self.password,
        }
    }
}

/// 表单字段全部按字符串接收
#[derive(Debug, Deserialize)]
pub struct CreateLinkForm {
    pub url: String,
    #[serde(default)]
    pub length: Option<String>,
    #[serde(default)]
    pub short: Option<String>,
    #[serde(default)]
    pub expire_after: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn parse_form_number(field: &str, value: Option<&str>) -> Result<i64, ShortpathError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(0),
        Some(v) => v
            .parse()
            .map_err(|_| ShortpathError::validation(format!("The field '{}' must be a number.", field))),
    }
}

impl CreateLinkForm {
    pub fn into_request(self) -> Result<CreateLinkRequest, ShortpathError> {
        let length = parse_form_number("length", self.length.as_deref())?;
        let expire_after = parse_form_number("expire_after", self.expire_after.as_deref())?;

        Ok(CreateLinkRequest {
            url: self.url,
            custom_path: self.short,
            length,
            expiry: ExpiryInput::Minutes(expire_after),
            password: self.password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AccessForm {
    pub short: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedLinkResponse {
    pub short: String,
    pub url: String,
    pub expire_at: DateTime<Utc>,
    pub shortened_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information: Option<String>,
}

impl CreatedLinkResponse {
    fn new(result: LinkCreateResult, instance: &InstanceContext) -> Self {
        Self {
            shortened_link: instance.shortened_link(&result.link.short),
            short: result.link.short,
            url: result.link.url,
            expire_at: result.link.expire_at,
            information: result
                .length_changed
                .then(|| LENGTH_CHANGED_NOTICE.to_string()),
        }
    }
}

pub struct LinkApiService;

impl LinkApiService {
    /// POST /
    pub async fn create_json(
        body: web::Json<CreateLinkBody>,
        service: web::Data<LinkService>,
        instance: web::Data<InstanceContext>,
    ) -> HttpResponse {
        Self::create(body.into_inner().into_request(), &service, &instance).await
    }

    /// POST /add
    pub async fn create_form(
        form: web::Form<CreateLinkForm>,
        service: web::Data<LinkService>,
        instance: web::Data<InstanceContext>,
    ) -> HttpResponse {
        match form.into_inner().into_request() {
            Ok(request) => Self::create(request, &service, &instance).await,
            Err(e) => error_from_shortpath(&e),
        }
    }

    async fn create(
        request: CreateLinkRequest,
        service: &LinkService,
        instance: &InstanceContext,
    ) -> HttpResponse {
        match service.create_link(request).await {
            Ok(result) => {
                success_response(StatusCode::CREATED, CreatedLinkResponse::new(result, instance))
            }
            Err(e) => {
                debug!("Link creation rejected: {}", e);
                error_from_shortpath(&e)
            }
        }
    }

    /// POST /access
    pub async fn access(
        form: web::Form<AccessForm>,
        resolver: web::Data<LinkResolver>,
    ) -> HttpResponse {
        let form = form.into_inner();
        let password = pick_password(None, form.password);

        match resolver.resolve(&form.short, password).await {
            Ok(resolution) => resolution_response(resolution),
            Err(e) => error_from_shortpath(&e),
        }
    }
}
