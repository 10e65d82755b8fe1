use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use super::{check_auth, parse_id, AppJson, AppQuery};
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{HairStyle, HairStyleChanges, HairStyleQuery, NewHairStyle, Page, PageRequest};
use crate::state::AppState;

fn require_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    Ok(())
}

// GET /api/hair-styles
pub async fn list_hair_styles(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<HairStyleQuery>,
) -> Result<Json<Page<HairStyle>>, AppError> {
    let page = PageRequest::new(query.page, query.size)?;

    let (data, total) = {
        let db = state.conn()?;
        queries::list_hair_styles(&db, &query, page)?
    };

    Ok(Json(Page::new(data, total, page)))
}

// GET /api/hair-styles/:id
pub async fn get_hair_style(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<HairStyle>, AppError> {
    let id = parse_id(&raw_id)?;
    let style = {
        let db = state.conn()?;
        queries::get_hair_style(&db, id)?
    };
    style
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("hair style {id}")))
}

// POST /api/hair-styles
pub async fn create_hair_style(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppJson(input): AppJson<NewHairStyle>,
) -> Result<(StatusCode, Json<HairStyle>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    require_name(&input.name)?;

    let style = {
        let db = state.conn()?;
        let id = queries::insert_hair_style(&db, &input)?;
        queries::get_hair_style(&db, id)?
    };
    let style = style.ok_or_else(|| AppError::Internal(anyhow::anyhow!("hair style vanished after insert")))?;

    tracing::info!(hair_style_id = style.id, "hair style created");
    Ok((StatusCode::CREATED, Json(style)))
}

// PUT /api/hair-styles/:id
pub async fn update_hair_style(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    AppJson(changes): AppJson<HairStyleChanges>,
) -> Result<Json<HairStyle>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let id = parse_id(&raw_id)?;
    if let Some(name) = &changes.name {
        require_name(name)?;
    }

    let style = {
        let db = state.conn()?;
        if !queries::update_hair_style(&db, id, &changes)? {
            return Err(AppError::NotFound(format!("hair style {id}")));
        }
        queries::get_hair_style(&db, id)?
    };
    style
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("hair style {id}")))
}

// DELETE /api/hair-styles/:id
pub async fn delete_hair_style(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let id = parse_id(&raw_id)?;

    let deleted = {
        let db = state.conn()?;
        queries::delete_hair_style(&db, id)?
    };
    if !deleted {
        return Err(AppError::NotFound(format!("hair style {id}")));
    }

    tracing::info!(hair_style_id = id, "hair style deleted");
    Ok(StatusCode::NO_CONTENT)
}
