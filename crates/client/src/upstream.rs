use std::time::Duration;

use common::types::SetValueBody;
use configs::ClientConfig;
use reqwest::{Method, RequestBuilder, Url};
use serde_json::Value;
use tracing::debug;

use crate::errors::UpstreamError;
use crate::retry::{retry_with_policy, RetryPolicy};

/// Status and decoded JSON body of a kv service reply.
/// Bodies that are not JSON come back as `Value::Null`.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200 || self.status == 201
    }

    /// `value` field of the body, empty when absent.
    pub fn value(&self) -> String {
        self.body.get("value").and_then(Value::as_str).unwrap_or_default().to_string()
    }

    /// `error` field of the body, empty when absent.
    pub fn error(&self) -> String {
        self.body.get("error").and_then(Value::as_str).unwrap_or_default().to_string()
    }
}

/// HTTP client for the kv service's `/kv/{key}` endpoints.
#[derive(Clone, Debug)]
pub struct KvServiceClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
}

impl KvServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, retry: RetryPolicy) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(UpstreamError::Build)?;
        let base_url = base_url.into();
        let base_url = match Url::parse(&base_url) {
            Ok(url) if !url.cannot_be_a_base() => url,
            _ => return Err(UpstreamError::BaseUrl(base_url)),
        };
        Ok(Self { http, base_url, retry })
    }

    pub fn from_config(cfg: &ClientConfig) -> Result<Self, UpstreamError> {
        Self::new(cfg.upstream_url.clone(), cfg.request_timeout(), RetryPolicy::from_config(&cfg.retry))
    }

    /// `{base}/kv/{key}` with the key percent-encoded as a single path segment.
    /// `.` and `..` cannot survive URL normalization, so they are refused.
    fn url(&self, key: &str) -> Result<Url, UpstreamError> {
        if key == "." || key == ".." {
            return Err(UpstreamError::UnroutableKey(key.to_string()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("kv")
            .push(key);
        Ok(url)
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<UpstreamResponse, UpstreamError> {
        let body = SetValueBody { value: value.to_string() };
        self.send(Method::PATCH, key, |req| req.json(&body)).await
    }

    pub async fn get(&self, key: &str) -> Result<UpstreamResponse, UpstreamError> {
        self.send(Method::GET, key, |req| req).await
    }

    pub async fn delete(&self, key: &str) -> Result<UpstreamResponse, UpstreamError> {
        self.send(Method::DELETE, key, |req| req).await
    }

    async fn send<F>(&self, method: Method, key: &str, decorate: F) -> Result<UpstreamResponse, UpstreamError>
    where
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let url = self.url(key)?;
        retry_with_policy(&self.retry, || {
            let req = decorate(self.http.request(method.clone(), url.clone()));
            let method = method.clone();
            let url = url.clone();
            async move {
                let resp = req.send().await.map_err(UpstreamError::Transport)?;
                let status = resp.status().as_u16();
                let bytes = resp.bytes().await.map_err(UpstreamError::Transport)?;
                let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
                debug!(%method, %url, status, "upstream replied");
                Ok(UpstreamResponse { status, body })
            }
        })
        .await
    }
}
