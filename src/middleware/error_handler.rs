use axum::{
    body::{Body, to_bytes},
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};

/// 记录 4xx 和 5xx 响应的内容，响应本身原样返回
pub async fn log_errors(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, 4096).await {
        Ok(b) => b,
        Err(e) => {
            error!("Failed to read error response body: {}", e);
            return Response::from_parts(parts, Body::empty());
        }
    };
    let body_str = String::from_utf8_lossy(&bytes);

    if status.is_server_error() {
        error!("Server error on {} {} - Status: {}, Body: {}", method, uri, status, body_str);
    } else {
        warn!("Rejected {} {} - Status: {}, Body: {}", method, uri, status, body_str);
    }

    // 重置body以便重新构建响应
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
