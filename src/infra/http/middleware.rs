use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Per-request identifiers, available to handlers and echoed on the response.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    /// Reuse a well-formed incoming `x-request-id`, otherwise mint a UUID.
    fn from_request(request: &Request<Body>) -> Self {
        let request_id = request
            .headers()
            .get(&REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty() && value.len() <= 64)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self { request_id }
    }
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext::from_request(&request);
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value);
    }
    response.extensions_mut().insert(ctx);
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let line = ResponseLine {
        method: request.method().clone(),
        path: request.uri().path().to_string(),
        query: request.uri().query().unwrap_or("").to_string(),
        request_id: request
            .extensions()
            .get::<RequestContext>()
            .map(|ctx| ctx.request_id.clone())
            .unwrap_or_default(),
    };

    let mut response = next.run(request).await;
    let report = response.extensions_mut().remove::<ErrorReport>();
    line.emit(response.status(), started.elapsed().as_millis(), report);
    response
}

struct ResponseLine {
    method: Method,
    path: String,
    query: String,
    request_id: String,
}

impl ResponseLine {
    fn emit(&self, status: StatusCode, elapsed_ms: u128, report: Option<ErrorReport>) {
        if !(status.is_client_error() || status.is_server_error()) {
            debug!(
                target = "quire::http::response",
                status = status.as_u16(),
                method = %self.method,
                path = %self.path,
                elapsed_ms,
                request_id = %self.request_id,
                "request served",
            );
            return;
        }

        let (source, chain) = report
            .map(|report| (report.source, report.messages))
            .unwrap_or(("unknown", Vec::new()));
        let detail = chain
            .first()
            .map(String::as_str)
            .unwrap_or("no diagnostic available");

        if status.is_server_error() {
            error!(
                target = "quire::http::response",
                status = status.as_u16(),
                method = %self.method,
                path = %self.path,
                query = %self.query,
                elapsed_ms,
                source,
                detail,
                chain = ?chain,
                request_id = %self.request_id,
                "request failed",
            );
        } else {
            warn!(
                target = "quire::http::response",
                status = status.as_u16(),
                method = %self.method,
                path = %self.path,
                query = %self.query,
                elapsed_ms,
                source,
                detail,
                request_id = %self.request_id,
                "client request error",
            );
        }
    }
}
