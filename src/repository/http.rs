use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{is_duplicate_response, CategoryRepository, CreateOutcome, RepositoryError};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{CategoryKind, NewCategory, UserCategory};

/// `{ success, data, message }` wrapper used by every category endpoint.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl<T> ApiEnvelope<T> {
    fn reason(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_default()
    }
}

/// Decoded outcome of one API call.
enum ApiReply<T> {
    Ok(T),
    Err { status: u16, message: String },
}

#[derive(Clone)]
pub struct HttpCategoryRepository {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCategoryRepository {
    pub fn new(client: Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::new(client, &config.api_url, config.api_token.clone()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/categories{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<ApiReply<T>, RepositoryError> {
        let status = response.status();
        let body = response.text().await?;

        let envelope: ApiEnvelope<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(RepositoryError::Decode(e.to_string()));
            }
            Err(_) => {
                return Ok(ApiReply::Err {
                    status: status.as_u16(),
                    message: body,
                });
            }
        };

        if !status.is_success() || !envelope.success {
            return Ok(ApiReply::Err {
                status: status.as_u16(),
                message: envelope.reason(),
            });
        }

        match envelope.data {
            Some(data) => Ok(ApiReply::Ok(data)),
            None => Err(RepositoryError::Decode("response has no data".into())),
        }
    }

    fn into_error(status: u16, message: String) -> RepositoryError {
        if (200..300).contains(&status) {
            RepositoryError::Rejected(message)
        } else {
            RepositoryError::Status { status, message }
        }
    }
}

#[async_trait]
impl CategoryRepository for HttpCategoryRepository {
    async fn list(&self, kind: Option<CategoryKind>) -> Result<Vec<UserCategory>, RepositoryError> {
        let mut request = self.client.get(self.url(""));
        if let Some(kind) = kind {
            request = request.query(&[("tipo", kind.as_str())]);
        }

        let response = self.authorized(request).send().await?;
        match Self::decode::<Vec<UserCategory>>(response).await? {
            ApiReply::Ok(categories) => {
                debug!(count = categories.len(), kind = ?kind, "Listed remote categories");
                Ok(categories)
            }
            ApiReply::Err { status, message } => Err(Self::into_error(status, message)),
        }
    }

    async fn create(&self, category: &NewCategory) -> Result<CreateOutcome, RepositoryError> {
        let request = self.client.post(self.url("")).json(category);
        let response = self.authorized(request).send().await?;

        match Self::decode::<UserCategory>(response).await? {
            ApiReply::Ok(created) => {
                debug!(category_id = %created.id, name = %created.name, "Created remote category");
                Ok(CreateOutcome::Created(created))
            }
            ApiReply::Err { status, message } if is_duplicate_response(status, &message) => {
                debug!(name = %category.name, kind = %category.kind, "Category already exists");
                Ok(CreateOutcome::AlreadyExists)
            }
            ApiReply::Err { status, message } => {
                warn!(name = %category.name, status, message = %message, "Create category failed");
                Err(Self::into_error(status, message))
            }
        }
    }

    async fn update(
        &self,
        id: &str,
        category: &NewCategory,
    ) -> Result<UserCategory, RepositoryError> {
        let request = self.client.put(self.url(&format!("/{}", id))).json(category);
        let response = self.authorized(request).send().await?;

        match Self::decode::<UserCategory>(response).await? {
            ApiReply::Ok(updated) => Ok(updated),
            ApiReply::Err { status, message } => Err(Self::into_error(status, message)),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let request = self.client.delete(self.url(&format!("/{}", id)));
        let response = self.authorized(request).send().await?;

        match Self::decode::<serde_json::Value>(response).await? {
            ApiReply::Ok(_) => Ok(()),
            ApiReply::Err { status, message } => Err(Self::into_error(status, message)),
        }
    }
}
