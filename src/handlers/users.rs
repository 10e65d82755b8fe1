use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use super::{check_auth, parse_id, AppJson, AppQuery};
use crate::dates;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{NewUser, Page, PageRequest, Role, User, UserChanges, UserQuery};
use crate::state::AppState;

fn require_phone(phone: &str) -> Result<&str, AppError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(AppError::BadRequest("phone is required".to_string()));
    }
    Ok(phone)
}

// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppQuery(query): AppQuery<UserQuery>,
) -> Result<Json<Page<User>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let page = PageRequest::new(query.page, query.size)?;

    let (data, total) = {
        let db = state.conn()?;
        queries::list_users(&db, &query, page)?
    };

    Ok(Json(Page::new(data, total, page)))
}

// GET /api/users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Json<User>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let id = parse_id(&raw_id)?;

    let user = {
        let db = state.conn()?;
        queries::get_user(&db, id)?
    };
    user.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))
}

// POST /api/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppJson(input): AppJson<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let phone = require_phone(&input.phone)?;
    let role = input.role.unwrap_or(Role::Customer);

    let user = {
        let db = state.conn()?;
        if queries::find_user_by_phone(&db, phone)?.is_some() {
            return Err(AppError::Conflict(format!("phone {phone} is already registered")));
        }
        let id = queries::insert_user(
            &db,
            input.full_name.as_deref(),
            phone,
            input.email.as_deref(),
            role,
        )?;
        queries::get_user(&db, id)?
    };
    let user = user.ok_or_else(|| AppError::Internal(anyhow::anyhow!("user vanished after insert")))?;

    tracing::info!(user_id = user.id, role = role.as_str(), "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

// PATCH /api/users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    AppJson(changes): AppJson<UserChanges>,
) -> Result<Json<User>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let id = parse_id(&raw_id)?;

    let user = {
        let db = state.conn()?;
        let mut user = queries::get_user(&db, id)?
            .ok_or_else(|| AppError::NotFound(format!("user {id}")))?;

        if let Some(phone) = &changes.phone {
            user.phone = require_phone(phone)?.to_string();
        }
        if let Some(full_name) = &changes.full_name {
            user.full_name = Some(full_name.clone());
        }
        if let Some(email) = &changes.email {
            user.email = Some(email.clone());
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = dates::now();

        // a phone already owned by someone else trips the UNIQUE constraint (409)
        queries::update_user(&db, &user)?;
        user
    };

    Ok(Json(user))
}

// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let id = parse_id(&raw_id)?;

    let deleted = {
        let db = state.conn()?;
        queries::delete_user(&db, id)?
    };
    if !deleted {
        return Err(AppError::NotFound(format!("user {id}")));
    }

    tracing::info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
