use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::config::{Config, API_KEY_HEADER};
use crate::error::{NetworkError, Result};

pub struct RelayHttpClient {
    client: Client,
    config: Config,
}

impl RelayHttpClient {
    pub fn new(config: Config) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));

        if !config.verify_tls {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| NetworkError::Config(format!("Failed to build client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = self.config.url(path);
        debug!("GET {}", url);
        let response = self.authorized(self.client.get(&url)).send().await?;
        Self::check_status(response).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.get(path).await?;
        response
            .json()
            .await
            .map_err(|e| NetworkError::Decode(format!("JSON parse failed: {}", e)))
    }

    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Response> {
        let url = self.config.url(path);
        debug!("POST {}", url);
        let response = self.authorized(self.client.post(&url)).json(body).send().await?;
        Self::check_status(response).await
    }

    pub async fn post_json<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R> {
        let response = self.post(path, body).await?;
        response
            .json()
            .await
            .map_err(|e| NetworkError::Decode(format!("JSON parse failed: {}", e)))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    /// Non-2xx responses become `NetworkError::Http` carrying the raw body
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(NetworkError::Http {
            status: status.as_u16(),
            body,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
