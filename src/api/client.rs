use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::error::ApiError;
use crate::config::ApiConfig;
use crate::utils::http_helpers::{body_excerpt, error_message_from_body, join_url};

/// Supplies the bearer token for outgoing requests.
///
/// The client asks on every request, so a login or logout is visible to the
/// very next call without any shared default header.
pub trait CredentialSource: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// JSON client for the marketplace backend.
///
/// Cloning is cheap; clones share the connection pool and credential source.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, credentials: Arc<dyn CredentialSource>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.timeout_in_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let http = builder.build().map_err(ApiError::Client)?;

        Ok(ApiClient {
            http,
            base_url: config.base_url.clone(),
            credentials,
        })
    }

    fn anonymous(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let url = join_url(&self.base_url, path);
        debug!("Preparing {} {}", method, url);
        let builder = self.http.request(method, &url);
        (url, builder)
    }

    /// Builds a request carrying the current session's bearer token, if any.
    fn authorized(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let (url, builder) = self.anonymous(method, path);
        match self.credentials.access_token() {
            Some(token) => (url, builder.bearer_auth(token)),
            None => (url, builder),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let (url, builder) = self.authorized(Method::GET, path);
        let response = send(&url, builder).await?;
        handle_json_response(&url, response).await
    }

    /// GET with an explicit token instead of the session's, for calls made
    /// before a session exists (login, rehydration).
    pub async fn get_json_with_token<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
    ) -> Result<T, ApiError> {
        let (url, builder) = self.anonymous(Method::GET, path);
        let builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        let response = send(&url, builder).await?;
        handle_json_response(&url, response).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (url, builder) = self.authorized(Method::POST, path);
        let response = send(&url, builder.json(body)).await?;
        handle_json_response(&url, response).await
    }

    /// POST without any credentials, for registration and login.
    pub async fn post_json_anonymous<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (url, builder) = self.anonymous(Method::POST, path);
        let response = send(&url, builder.json(body)).await?;
        handle_json_response(&url, response).await
    }

    /// POST with an explicit token, ignoring the response body.
    pub async fn post_json_with_token<B>(
        &self,
        path: &str,
        body: &B,
        token: &str,
    ) -> Result<(), ApiError>
    where
        B: Serialize + ?Sized,
    {
        let (url, builder) = self.anonymous(Method::POST, path);
        let builder = builder
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .json(body);
        let response = send(&url, builder).await?;
        handle_empty_response(&url, response).await
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (url, builder) = self.authorized(Method::PATCH, path);
        let response = send(&url, builder.json(body)).await?;
        handle_json_response(&url, response).await
    }

    /// POST with no body, ignoring the response body.
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let (url, builder) = self.authorized(Method::POST, path);
        let response = send(&url, builder).await?;
        handle_empty_response(&url, response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let (url, builder) = self.authorized(Method::DELETE, path);
        let response = send(&url, builder).await?;
        handle_empty_response(&url, response).await
    }
}

async fn send(url: &str, builder: RequestBuilder) -> Result<Response, ApiError> {
    builder.send().await.map_err(|source| ApiError::Network {
        url: url.to_string(),
        source,
    })
}

/// Parses JSON responses and surfaces HTTP errors with the server's message.
async fn handle_json_response<T: DeserializeOwned>(
    url: &str,
    response: Response,
) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        debug!("{} answered {}", url, status);
        response.json::<T>().await.map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    } else {
        Err(http_error(url, response).await)
    }
}

async fn handle_empty_response(url: &str, response: Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        debug!("{} answered {}", url, status);
        Ok(())
    } else {
        Err(http_error(url, response).await)
    }
}

async fn http_error(url: &str, response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    debug!("{} answered {}: {}", url, status, body_excerpt(&body));
    ApiError::Http {
        url: url.to_string(),
        status,
        message: error_message_from_body(&body),
    }
}
