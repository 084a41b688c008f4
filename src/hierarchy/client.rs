use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::error::ValidationError;
use crate::models::Module;
use crate::session::{SessionHandle, bearer_token};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("module API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("module API rejected the document: {0}")]
    Validation(ValidationError),

    #[error("failed to parse module API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Which listing to fetch: published content only, or everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Student,
    Admin,
}

#[derive(Debug, Deserialize)]
pub struct ModuleList {
    #[serde(default)]
    pub modules: Vec<Module>,
}

/// The backend that persists module documents.
#[async_trait]
pub trait ModuleApi: Send + Sync {
    async fn fetch_modules(&self, course_id: &str, audience: Audience) -> Result<Vec<Module>, ApiError>;
    async fn create_module(&self, module: &Module) -> Result<Module, ApiError>;
    async fn update_module(&self, object_id: &str, module: &Module) -> Result<Module, ApiError>;
    async fn delete_module(&self, object_id: &str) -> Result<(), ApiError>;
}

pub struct ModuleHttpClient {
    client: Client,
    base_url: String,
    session: SessionHandle,
}

impl ModuleHttpClient {
    pub fn new(base_url: impl Into<String>, session: SessionHandle) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match bearer_token(&self.session) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Turns non-2xx responses into errors, recognising the validation
    /// payload `{ error, fields? }`.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::BAD_REQUEST {
            if let Ok(validation) = serde_json::from_str::<ValidationError>(&body) {
                return Err(ApiError::Validation(validation));
            }
        }
        Err(ApiError::Status { status, body })
    }

    async fn read_module(response: Response) -> Result<Module, ApiError> {
        let body = Self::check(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ModuleApi for ModuleHttpClient {
    async fn fetch_modules(&self, course_id: &str, audience: Audience) -> Result<Vec<Module>, ApiError> {
        let path = match audience {
            Audience::Student => format!("/api/modules/course/{}", course_id),
            Audience::Admin => format!("/api/modules/course/{}/admin", course_id),
        };
        let mut request = self.client.get(self.url(&path));
        if audience == Audience::Admin {
            request = self.authorized(request);
        }

        let body = Self::check(request.send().await?).await?.text().await?;
        let list: ModuleList = serde_json::from_str(&body)?;
        Ok(list.modules)
    }

    async fn create_module(&self, module: &Module) -> Result<Module, ApiError> {
        let request = self.authorized(self.client.post(self.url("/api/modules")).json(module));
        Self::read_module(request.send().await?).await
    }

    async fn update_module(&self, object_id: &str, module: &Module) -> Result<Module, ApiError> {
        let url = self.url(&format!("/api/modules/{}", object_id));
        let request = self.authorized(self.client.put(url).json(module));
        Self::read_module(request.send().await?).await
    }

    async fn delete_module(&self, object_id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/api/modules/{}", object_id));
        let request = self.authorized(self.client.delete(url));
        Self::check(request.send().await?).await?;
        Ok(())
    }
}
