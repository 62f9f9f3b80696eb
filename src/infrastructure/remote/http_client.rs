use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::core::constants::api;
use crate::error::ServiceError;

/// HTTP 客户端包装器
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// 创建新的 HTTP 客户端
    pub fn new(base_url: &str, token: &str, timeout_secs: u64) -> Result<Self, NetworkError> {
        // 保证 join 相对路径时不丢失 base 的最后一段
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(api::ACCEPT_HEADER));
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| NetworkError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(api::USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET 请求并返回 JSON
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, NetworkError> {
        let response = self.send(Method::GET, path, None::<&()>).await?;
        Ok(response.json().await?)
    }

    /// PATCH 请求并返回 JSON
    pub async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, NetworkError> {
        let response = self.send(Method::PATCH, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, NetworkError> {
        let url = self.base_url.join(path)?;
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(NetworkError::from_status(status, &body))
    }
}

/// 平台 API 的错误响应体
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// 网络错误类型
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("API token contains invalid characters")]
    InvalidToken,

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Server error ({status}): {message}")]
    ServerError { status: StatusCode, message: String },
}

impl NetworkError {
    /// 从 HTTP 状态码和响应体创建错误；400 与 422 视为请求内容被拒绝
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(ApiErrorBody {
                message: Some(message),
                ..
            }) => message,
            Ok(ApiErrorBody { id: Some(id), .. }) => id,
            _ if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string(),
            _ => body.trim().to_string(),
        };

        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Rejected { status, message }
            }
            _ => Self::ServerError { status, message },
        }
    }
}

impl From<NetworkError> for ServiceError {
    fn from(e: NetworkError) -> Self {
        match e {
            NetworkError::Rejected { message, .. } => ServiceError::request_failed(message),
            other => ServiceError::unknown(error_chain(&other)),
        }
    }
}

/// 拼接错误及其 source 链，避免丢失底层原因
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
