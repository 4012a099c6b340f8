//! Contact CRUD, query and lookup endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use phonebook_core::queries::DEFAULT_PAGE_SIZE;
use phonebook_core::{ContactId, ContactInput, PageRequest};
use serde::Deserialize;

use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::SharedState;
use crate::utils::{
    cache_control, page_to_json, run_blocking, ApiError, PageParams, CONTACT_MAX_AGE_SECS,
    LIST_MAX_AGE_SECS, STATISTICS_MAX_AGE_SECS,
};

const DEFAULT_RECENT_LIMIT: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub keyword: String,
    pub page: Option<usize>,
    pub size: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckPhoneParams {
    pub phone_number: String,
    pub exclude_id: Option<ContactId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckEmailParams {
    pub email: String,
    pub exclude_id: Option<ContactId>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentParams {
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

pub async fn create_contact_handler(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<ContactInput>,
) -> Result<impl IntoResponse, ApiError> {
    let contact = run_blocking(&state, move |service| service.create(input)).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn get_contact_handler(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<ContactId>,
) -> Result<impl IntoResponse, ApiError> {
    let contact = run_blocking(&state, move |service| service.get(id))
        .await?
        .ok_or_else(|| ApiError::not_found(id))?;
    Ok((cache_control(CONTACT_MAX_AGE_SECS), Json(contact)))
}

pub async fn list_contacts_handler(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let request = params.listing_request()?;
    let page = run_blocking(&state, move |service| service.list(&request)).await?;
    Ok((cache_control(LIST_MAX_AGE_SECS), Json(page_to_json(&page))))
}

pub async fn update_contact_handler(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<ContactId>,
    ApiJson(input): ApiJson<ContactInput>,
) -> Result<impl IntoResponse, ApiError> {
    let contact = run_blocking(&state, move |service| service.update(id, input)).await?;
    Ok(Json(contact))
}

pub async fn delete_contact_handler(
    State(state): State<SharedState>,
    ApiPath(id): ApiPath<ContactId>,
) -> Result<impl IntoResponse, ApiError> {
    run_blocking(&state, move |service| service.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unknown ids in the batch are skipped; the response reports how many
/// records were actually removed
pub async fn delete_contacts_batch_handler(
    State(state): State<SharedState>,
    ApiJson(ids): ApiJson<Vec<ContactId>>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = run_blocking(&state, move |service| service.delete_batch(&ids)).await?;
    let body = serde_json::json!({
        "message": format!("Deleted {} contacts", deleted),
        "deleted": deleted,
    });
    Ok(Json(body))
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

pub async fn search_contacts_handler(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let request = PageRequest::of(
        params.page.unwrap_or(0),
        params.size.unwrap_or(DEFAULT_PAGE_SIZE),
    )?;
    let keyword = params.keyword;
    let lookup = keyword.clone();
    let page = run_blocking(&state, move |service| service.search(&lookup, &request)).await?;

    let body = serde_json::json!({
        "contacts": page.content,
        "currentPage": page.number,
        "totalItems": page.total_elements,
        "totalPages": page.total_pages(),
        "keyword": keyword,
    });
    Ok(Json(body))
}

pub async fn list_by_category_handler(
    State(state): State<SharedState>,
    ApiPath(category): ApiPath<String>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let request = PageRequest::of(
        params.page.unwrap_or(0),
        params.size.unwrap_or(DEFAULT_PAGE_SIZE),
    )?;
    let lookup = category.clone();
    let page = run_blocking(&state, move |service| {
        service.list_by_category(&lookup, &request)
    })
    .await?;

    let body = serde_json::json!({
        "contacts": page.content,
        "currentPage": page.number,
        "totalItems": page.total_elements,
        "totalPages": page.total_pages(),
        "hasNext": page.has_next(),
        "hasPrevious": page.has_previous(),
        "category": category,
    });
    Ok(Json(body))
}

pub async fn statistics_handler(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = run_blocking(&state, |service| service.statistics()).await?;
    Ok((cache_control(STATISTICS_MAX_AGE_SECS), Json(stats)))
}

pub async fn recent_contacts_handler(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<RecentParams>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let contacts = run_blocking(&state, move |service| service.recent(limit)).await?;
    Ok(Json(contacts))
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

pub async fn get_by_phone_handler(
    State(state): State<SharedState>,
    ApiPath(phone_number): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let contact = run_blocking(&state, move |service| {
        service.find_by_phone_number(&phone_number)
    })
    .await?
    .ok_or_else(|| ApiError::missing("Contact not found"))?;
    Ok(Json(contact))
}

pub async fn check_phone_handler(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<CheckPhoneParams>,
) -> Result<impl IntoResponse, ApiError> {
    let exists = run_blocking(&state, move |service| {
        service.exists_by_phone_number(&params.phone_number, params.exclude_id)
    })
    .await?;
    Ok(Json(serde_json::json!({ "exists": exists })))
}

pub async fn check_email_handler(
    State(state): State<SharedState>,
    ApiQuery(params): ApiQuery<CheckEmailParams>,
) -> Result<impl IntoResponse, ApiError> {
    let exists = run_blocking(&state, move |service| {
        service.exists_by_email(&params.email, params.exclude_id)
    })
    .await?;
    Ok(Json(serde_json::json!({ "exists": exists })))
}
