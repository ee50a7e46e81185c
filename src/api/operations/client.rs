use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::models::common::{ApiResponse, Paginated};
use crate::error::ServiceError;

/// 管理后台 REST 客户端，负责请求发送和错误转换
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ServiceError> {
        self.send(self.http.get(self.url(path))).await
    }

    pub async fn get_with_query<T, Q>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<ApiResponse<T>, ServiceError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(self.http.get(self.url(path)).query(query)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ServiceError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ServiceError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.http.put(self.url(path)).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ServiceError> {
        self.send(self.http.delete(self.url(path))).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, ServiceError> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&bytes)
                .map_err(|e| ServiceError::Decode(e.to_string()));
        }

        let message = serde_json::from_slice::<ApiResponse<serde_json::Value>>(&bytes)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        tracing::warn!("Request failed with {}: {}", status, message);

        Err(error_for_status(status, message))
    }
}

/// 按状态码划分错误：404 单独处理，408/429 和 5xx 可以重试，其余 4xx 是校验错误
pub fn error_for_status(status: StatusCode, message: String) -> ServiceError {
    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            ServiceError::Transport(format!("{status}: {message}"))
        }
        s if s.is_client_error() => ServiceError::validation(s.as_u16(), message),
        s => ServiceError::Transport(format!("{s}: {message}")),
    }
}

/// 取出响应中的数据
pub fn into_data<T>(response: ApiResponse<T>) -> Result<T, ServiceError> {
    response
        .data
        .ok_or_else(|| ServiceError::Decode("response has no data".to_string()))
}

/// 列表接口返回 {data, pagination}
pub fn into_page<T>(response: ApiResponse<Vec<T>>) -> Result<Paginated<T>, ServiceError> {
    let pagination = response
        .pagination
        .ok_or_else(|| ServiceError::Decode("list response has no pagination".to_string()))?;
    Ok(Paginated {
        data: response.data.unwrap_or_default(),
        pagination,
    })
}
