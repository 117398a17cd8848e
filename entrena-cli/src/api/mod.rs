use anyhow::{anyhow, Context, Result};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::Config;

mod error;
mod query;

pub use error::{is_not_found, ApiError, NO_ROWS_CODE};
pub use query::Query;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Password grant payload
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Refresh grant payload
#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Token response from the auth endpoint
#[derive(Debug, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub user: AuthUser,
}

/// Authenticated user as seen by the auth endpoint
#[derive(Debug, Deserialize, Clone)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Client for the hosted backend: auth, REST tables and object storage
pub struct BackendClient {
    client: Client,
    base_url: String,
    anon_key: String,
    bucket: String,
    config: Arc<Mutex<Config>>,
}

impl BackendClient {
    /// Create a new backend client
    pub fn new(config: Config) -> Result<Self> {
        let backend = config.backend.effective();
        let timeout = Duration::from_secs(backend.timeout_seconds);
        let base_url = backend.url.trim_end_matches('/').to_string();
        let anon_key = backend.anon_key;
        let bucket = config.storage.bucket.clone();

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            anon_key,
            bucket,
            config: Arc::new(Mutex::new(config)),
        })
    }

    fn config(&self) -> Result<MutexGuard<'_, Config>> {
        self.config
            .lock()
            .map_err(|_| anyhow!("Config lock poisoned"))
    }

    /// Id of the logged-in user
    pub fn current_user_id(&self) -> Result<String> {
        let config = self.config()?;
        if !config.is_authenticated() {
            return Err(anyhow!("Not logged in"));
        }
        Ok(config.auth.user_id.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.config()
            .map(|config| config.is_authenticated())
            .unwrap_or(false)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(ApiError::from_response(status, &error_text).into())
        }
    }

    /// Sign in with email and password and persist the session
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);

        tracing::debug!("Logging in as {}", email);

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .request(Method::POST, &url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = match ApiError::from_response(status, &error_text) {
                ApiError::BadRequest(msg) | ApiError::Unauthorized(msg) => msg,
                other => return Err(other.into()),
            };
            return Err(ApiError::AuthenticationFailed(message).into());
        }

        let session: AuthSession = response
            .json()
            .await
            .context("Failed to parse login response")?;

        {
            let mut config = self.config()?;
            config.set_session(
                session.access_token.clone(),
                session.refresh_token.clone(),
                session.user.id.clone(),
            );
            config.save()?;
        }

        tracing::info!("Successfully logged in as {}", email);
        Ok(session)
    }

    /// Exchange a refresh token for a new session
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<AuthSession> {
        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.base_url);

        let request = RefreshTokenRequest {
            refresh_token: refresh_token.to_string(),
        };

        tracing::debug!("Refreshing access token");

        let response = self
            .request(Method::POST, &url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        let session: AuthSession = Self::check(response)
            .await?
            .json()
            .await
            .context("Failed to parse refresh response")?;

        tracing::info!("Successfully refreshed access token");
        Ok(session)
    }

    /// Refresh access token and save to config
    async fn try_refresh_token(&self) -> Result<String> {
        let refresh_token = {
            let config = self.config()?;
            if config.auth.refresh_token.is_empty() {
                return Err(anyhow!("No refresh token available"));
            }
            config.auth.refresh_token.clone()
        };

        let session = self.refresh_token(&refresh_token).await?;

        {
            let mut config = self.config()?;
            config.set_tokens(session.access_token.clone(), session.refresh_token.clone());
            config.save()?;
        }

        Ok(session.access_token)
    }

    /// Send an authenticated request; on 401 refresh the session once and replay
    async fn send_authorized<F>(&self, build: F) -> Result<Response>
    where
        F: Fn(&str) -> RequestBuilder,
    {
        let token = {
            let config = self.config()?;
            if !config.is_authenticated() {
                return Err(anyhow!("Not logged in"));
            }
            config.auth.access_token.clone()
        };

        let response = build(&token)
            .send()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::debug!("Received 401, attempting token refresh");

            let new_token = self.try_refresh_token().await?;

            let response = build(&new_token)
                .send()
                .await
                .map_err(|e| ApiError::NetworkError(e.to_string()))?;

            return Self::check(response).await;
        }

        Self::check(response).await
    }

    /// Get the user behind the current access token
    pub async fn current_user(&self) -> Result<AuthUser> {
        let url = format!("{}/auth/v1/user", self.base_url);

        tracing::debug!("Fetching current auth user");

        let response = self
            .send_authorized(|token| self.request(Method::GET, &url).bearer_auth(token))
            .await?;

        response
            .json()
            .await
            .context("Failed to parse user response")
    }

    /// Read all rows matching the query
    pub async fn select<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>> {
        if query.matches_nothing() {
            tracing::debug!("Skipping {} lookup with empty id list", query.table_name());
            return Ok(Vec::new());
        }

        let url = self.rest_url(query.table_name());
        tracing::debug!("GET {} {:?}", query.table_name(), query.params());

        let response = self
            .send_authorized(|token| {
                self.request(Method::GET, &url)
                    .bearer_auth(token)
                    .query(query.params())
            })
            .await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} rows", query.table_name()))
    }

    /// Read exactly one row; zero rows is `ApiError::NotFound`
    pub async fn select_single<T: DeserializeOwned>(&self, query: &Query) -> Result<T> {
        if query.matches_nothing() {
            return Err(ApiError::NotFound(format!("{}: empty id list", query.table_name())).into());
        }

        let url = self.rest_url(query.table_name());
        tracing::debug!("GET single {} {:?}", query.table_name(), query.params());

        let response = self
            .send_authorized(|token| {
                self.request(Method::GET, &url)
                    .bearer_auth(token)
                    .header(header::ACCEPT, SINGLE_OBJECT)
                    .query(query.params())
            })
            .await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} row", query.table_name()))
    }

    /// Insert one object or an array of objects and return the stored rows
    pub async fn insert<B, T>(&self, table: &str, body: &B) -> Result<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.rest_url(table);
        tracing::debug!("POST {}", table);

        let response = self
            .send_authorized(|token| {
                self.request(Method::POST, &url)
                    .bearer_auth(token)
                    .header("Prefer", RETURN_REPRESENTATION)
                    .json(body)
            })
            .await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse inserted {} rows", table))
    }

    /// Patch all rows matching the query and return them
    pub async fn update<B, T>(&self, query: &Query, body: &B) -> Result<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        if !query.has_filters() {
            return Err(anyhow!("Refusing to update {} without filters", query.table_name()));
        }

        let url = self.rest_url(query.table_name());
        tracing::debug!("PATCH {} {:?}", query.table_name(), query.params());

        let response = self
            .send_authorized(|token| {
                self.request(Method::PATCH, &url)
                    .bearer_auth(token)
                    .header("Prefer", RETURN_REPRESENTATION)
                    .query(query.params())
                    .json(body)
            })
            .await?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse updated {} rows", query.table_name()))
    }

    /// Delete all rows matching the query
    pub async fn delete(&self, query: &Query) -> Result<()> {
        if !query.has_filters() {
            return Err(anyhow!("Refusing to delete from {} without filters", query.table_name()));
        }
        if query.matches_nothing() {
            return Ok(());
        }

        let url = self.rest_url(query.table_name());
        tracing::debug!("DELETE {} {:?}", query.table_name(), query.params());

        self.send_authorized(|token| {
            self.request(Method::DELETE, &url)
                .bearer_auth(token)
                .query(query.params())
        })
        .await?;

        Ok(())
    }

    /// Upload an object to the configured bucket and return its public URL
    pub async fn upload(&self, object_path: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, object_path
        );
        tracing::debug!("Uploading {} bytes to {}", bytes.len(), object_path);

        self.send_authorized(|token| {
            self.request(Method::POST, &url)
                .bearer_auth(token)
                .header(header::CONTENT_TYPE, content_type)
                .body(bytes.clone())
        })
        .await?;

        Ok(self.public_url(object_path))
    }

    pub fn public_url(&self, object_path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, object_path
        )
    }
}
