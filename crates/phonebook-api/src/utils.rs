//! Shared helpers for handlers: error responses, blocking dispatch and JSON
//! shapes.

use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use phonebook_core::errors::{ExError, ExErrorKind, PhonebookError};
use phonebook_core::queries::DEFAULT_PAGE_SIZE;
use phonebook_core::{Contact, ContactId, Page, PageRequest, Sort, SortDirection, SortField};
use phonebook_engine::ContactService;
use serde::Deserialize;

use crate::state::SharedState;

/// Build a standard JSON error response.
pub fn api_error(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": code, "message": message.into() });
    (status, axum::Json(body)).into_response()
}

/// HTTP status for each error kind
pub fn status_for(kind: ExErrorKind) -> StatusCode {
    match kind {
        ExErrorKind::Validation => StatusCode::BAD_REQUEST,
        ExErrorKind::DuplicatePhoneNumber | ExErrorKind::DuplicateEmail => StatusCode::CONFLICT,
        ExErrorKind::NotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error returned by handlers; renders as `{"error": code, "message": text}`
///
/// The structured `ExError` behind the response travels in the response
/// extensions so the request middleware can log it with the request id.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    detail: ExError,
}

impl ApiError {
    pub fn not_found(id: ContactId) -> Self {
        PhonebookError::NotFound { id }.into()
    }

    /// 404 for lookups keyed by something other than an id
    pub fn missing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: StatusCode::NOT_FOUND,
            detail: ExError::new(ExErrorKind::NotFound).with_message(message.clone()),
            message,
        }
    }

    /// 500 whose detail is kept out of the response body
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: INTERNAL_ERROR_MESSAGE.to_string(),
            detail: ExError::new(ExErrorKind::Internal).with_message(detail),
        }
    }

    /// Request the extractors could not decode (body, path or query string)
    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status,
            detail: ExError::new(ExErrorKind::Validation)
                .with_op("extract_request")
                .with_message(message.clone()),
            message,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.detail.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

impl From<PhonebookError> for ApiError {
    fn from(err: PhonebookError) -> Self {
        let status = status_for(err.kind());
        // Server-side detail stays in the logs
        let message = if status.is_server_error() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            err.to_string()
        };
        Self {
            status,
            message,
            detail: ExError::from(&err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = api_error(self.status, self.detail.code(), self.message);
        response.extensions_mut().insert(self.detail);
        response
    }
}

/// Run a service call on the blocking pool, inside the caller's span
pub async fn run_blocking<T, F>(state: &SharedState, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&ContactService) -> phonebook_core::Result<T> + Send + 'static,
{
    let service = state.service.clone();
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || span.in_scope(|| f(service.as_ref())))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "blocking task failed");
            ApiError::internal(e.to_string())
        })?
        .map_err(ApiError::from)
}

/// Client cache lifetime for the contact listing
pub const LIST_MAX_AGE_SECS: u64 = 300;
/// Client cache lifetime for a single contact
pub const CONTACT_MAX_AGE_SECS: u64 = 600;
/// Client cache lifetime for the statistics summary
pub const STATISTICS_MAX_AGE_SECS: u64 = 3600;

/// `Cache-Control: max-age=N, public` response header
pub fn cache_control(max_age_secs: u64) -> [(HeaderName, String); 1] {
    [(
        header::CACHE_CONTROL,
        format!("max-age={}, public", max_age_secs),
    )]
}

/// `page`, `size`, `sortBy`, `sortDir` query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<usize>,
    pub size: Option<usize>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl PageParams {
    /// Page request for the main listing: unpaged when neither `page` nor
    /// `size` is given
    pub fn listing_request(&self) -> Result<PageRequest, ApiError> {
        if self.page.is_none() && self.size.is_none() {
            return Ok(PageRequest::Unpaged);
        }
        self.paged_request()
    }

    /// Always-paged request, defaulting to page 0 of 10
    pub fn paged_request(&self) -> Result<PageRequest, ApiError> {
        let field = match self.sort_by.as_deref() {
            Some(s) => s.parse::<SortField>()?,
            None => SortField::Name,
        };
        let direction = match self.sort_dir.as_deref() {
            Some(s) => s.parse::<SortDirection>()?,
            None => SortDirection::Asc,
        };
        Ok(PageRequest::sorted(
            self.page.unwrap_or(0),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
            Sort::new(field, direction),
        )?)
    }
}

/// Full page object returned by the listing endpoint
pub fn page_to_json(page: &Page<Contact>) -> serde_json::Value {
    serde_json::json!({
        "content": page.content,
        "totalElements": page.total_elements,
        "totalPages": page.total_pages(),
        "number": page.number,
        "size": page.size,
        "first": page.is_first(),
        "last": page.is_last(),
        "numberOfElements": page.number_of_elements(),
        "empty": page.is_empty(),
    })
}
