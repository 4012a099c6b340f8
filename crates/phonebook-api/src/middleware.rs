//! Request correlation middleware

use std::time::Instant;

use axum::extract::Request;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use phonebook_core::errors::ExError;
use phonebook_core::log_op_error;
use phonebook_core_types::schema::HEADER_REQUEST_ID;
use phonebook_core_types::{RequestContext, RequestId};
use tracing::Instrument;

/// Tag the request with a `RequestId`, run it inside a span carrying that id,
/// and echo the id back in the `x-request-id` response header
///
/// Error responses carry their `ExError` in the response extensions; it is
/// stamped with the request id and logged here, once per request.
pub async fn request_id(req: Request, next: Next) -> Response {
    let header = req
        .headers()
        .get(HEADER_REQUEST_ID)
        .and_then(|v| v.to_str().ok());
    let ctx = RequestContext::new(
        RequestId::from_header(header),
        req.method().as_str(),
        req.uri().path(),
    );

    let span = tracing::info_span!(
        "request",
        request_id = %ctx.request_id,
        method = %ctx.method,
        path = %ctx.path,
    );
    let start = Instant::now();

    let mut response = next.run(req).instrument(span).await;
    if let Some(detail) = response.extensions_mut().remove::<ExError>() {
        let detail = detail.with_request_id(ctx.request_id.clone());
        log_request_error(
            &detail,
            &ctx,
            response.status(),
            start.elapsed().as_millis() as u64,
        );
    }
    if let Ok(value) = HeaderValue::from_str(ctx.request_id.as_str()) {
        response.headers_mut().insert(HEADER_REQUEST_ID, value);
    }
    response
}

fn log_request_error(err: &ExError, ctx: &RequestContext, status: StatusCode, duration_ms: u64) {
    let request_id = err.request_id().map(RequestId::as_str).unwrap_or_default();
    log_op_error!(
        "http_request",
        err.clone(),
        duration_ms = duration_ms,
        request_id = request_id,
        method = ctx.method.as_str(),
        path = ctx.path.as_str(),
        status = status.as_u16(),
    );
}
