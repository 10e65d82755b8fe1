use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use super::{check_auth, parse_id, AppJson, AppQuery};
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{NewService, Page, PageRequest, Service, ServiceChanges, ServiceDetail, ServiceQuery};
use crate::services::catalog;
use crate::state::AppState;

// GET /api/services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<ServiceQuery>,
) -> Result<Json<Page<Service>>, AppError> {
    let page = PageRequest::new(query.page, query.size)?;

    let (data, total) = {
        let db = state.conn()?;
        queries::list_services(&db, &query, page)?
    };

    Ok(Json(Page::new(data, total, page)))
}

// GET /api/services/:id
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<ServiceDetail>, AppError> {
    let id = parse_id(&raw_id)?;
    let detail = {
        let db = state.conn()?;
        catalog::load_service(&db, id)?
    };
    Ok(Json(detail))
}

// POST /api/services
pub async fn create_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppJson(input): AppJson<NewService>,
) -> Result<(StatusCode, Json<ServiceDetail>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let detail = {
        let mut db = state.conn()?;
        catalog::create_service(&mut db, &input)?
    };
    Ok((StatusCode::CREATED, Json(detail)))
}

// PUT /api/services/:id
pub async fn update_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    AppJson(changes): AppJson<ServiceChanges>,
) -> Result<Json<ServiceDetail>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let id = parse_id(&raw_id)?;

    let detail = {
        let mut db = state.conn()?;
        catalog::update_service(&mut db, id, &changes)?
    };
    Ok(Json(detail))
}

// DELETE /api/services/:id
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let id = parse_id(&raw_id)?;

    {
        let db = state.conn()?;
        catalog::delete_service(&db, id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}
