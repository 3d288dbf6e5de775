use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::models::{validate_service, CreateServiceInput, Service, UpdateServiceInput};
use crate::error::ApiError;
use crate::filter::{
    filter::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, DEFAULT_SORT},
    validate_filters, Filters, TitleSearch, SERVICE_SORT_SAFELIST,
};
use crate::middleware::{ApiResponse, ApiResult};
use crate::routes::AppState;
use crate::validator::Validator;

use super::utils::{bad_json, read_id_param, read_int, read_string};

/// POST /v1/services
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateServiceInput>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(input) = payload.map_err(bad_json)?;
    let mut service = Service::from(input);

    let mut v = Validator::new();
    validate_service(&mut v, &service);
    if !v.valid() {
        return Err(ApiError::failed_validation(v.into_errors()));
    }

    state.services.insert(&mut service).await?;

    let location = format!("/v1/services/{}", service.id);
    Ok(ApiResponse::created(json!({ "service": service })).with_location(&location))
}

/// GET /v1/services/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = read_id_param(&id)?;
    let service = state.services.get(id).await?;
    Ok(ApiResponse::success(json!({ "service": service })))
}

/// PATCH /v1/services/:id - absent fields keep their stored value
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateServiceInput>, JsonRejection>,
) -> ApiResult<Value> {
    let id = read_id_param(&id)?;
    let mut service = state.services.get(id).await?;

    let Json(input) = payload.map_err(bad_json)?;
    service.apply(input);

    let mut v = Validator::new();
    validate_service(&mut v, &service);
    if !v.valid() {
        return Err(ApiError::failed_validation(v.into_errors()));
    }

    state.services.update(&mut service).await?;
    Ok(ApiResponse::success(json!({ "service": service })))
}

/// DELETE /v1/services/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let id = read_id_param(&id)?;
    state.services.delete(id).await?;
    Ok(ApiResponse::success(json!({ "message": "service successfully deleted" })))
}

/// GET /v1/services?title=&page=&page_size=&sort=
pub async fn list(
    State(state): State<AppState>,
    Query(qs): Query<HashMap<String, String>>,
) -> ApiResult<Value> {
    let mut v = Validator::new();

    let title = TitleSearch::new(&read_string(&qs, "title", ""));
    let filters = Filters {
        page: read_int(&qs, "page", DEFAULT_PAGE, &mut v),
        page_size: read_int(&qs, "page_size", DEFAULT_PAGE_SIZE, &mut v),
        sort: read_string(&qs, "sort", DEFAULT_SORT),
        sort_safelist: SERVICE_SORT_SAFELIST,
    };

    validate_filters(&mut v, &filters);
    if !v.valid() {
        return Err(ApiError::failed_validation(v.into_errors()));
    }

    let (services, metadata) = state.services.list(title, &filters).await?;
    Ok(ApiResponse::success(json!({
        "service": services,
        "metadata": metadata
    })))
}
