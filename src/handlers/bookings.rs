use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use super::{check_auth, parse_id, AppJson, AppQuery};
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{
    Booking, BookingChanges, BookingDetail, BookingQuery, NewBooking, Page, PageRequest,
    StatusChange,
};
use crate::services::{bookings, workflow};
use crate::state::AppState;

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    AppJson(input): AppJson<NewBooking>,
) -> Result<(StatusCode, Json<BookingDetail>), AppError> {
    let detail = {
        let mut db = state.conn()?;
        bookings::create_booking(&mut db, &input)?
    };

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppQuery(query): AppQuery<BookingQuery>,
) -> Result<Json<Page<BookingDetail>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let page = PageRequest::new(query.page, query.size)?;

    let (data, total) = {
        let db = state.conn()?;
        let (rows, total) = queries::list_bookings(&db, &query, page)?;
        let data = rows
            .into_iter()
            .map(|b| queries::expand_booking(&db, b))
            .collect::<anyhow::Result<Vec<_>>>()?;
        (data, total)
    };

    Ok(Json(Page::new(data, total, page)))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Json<BookingDetail>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let id = parse_id(&raw_id)?;

    let detail = {
        let db = state.conn()?;
        queries::get_booking_detail(&db, id)?
    };
    detail
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

// PATCH /api/bookings/:id
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    AppJson(changes): AppJson<BookingChanges>,
) -> Result<Json<BookingDetail>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let id = parse_id(&raw_id)?;

    let detail = {
        let mut db = state.conn()?;
        bookings::update_booking(&mut db, id, &changes, state.config.strict_status_transitions)?
    };

    tracing::info!(booking_id = id, status = %detail.booking.status, "booking updated");
    Ok(Json(detail))
}

// PATCH /api/bookings/:id/status
pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    AppJson(change): AppJson<StatusChange>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let id = parse_id(&raw_id)?;

    let booking = {
        let mut db = state.conn()?;
        workflow::change_booking_status(
            &mut db,
            id,
            change.status,
            state.config.strict_status_transitions,
        )?
    };

    Ok(Json(booking))
}

// DELETE /api/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let id = parse_id(&raw_id)?;

    {
        let db = state.conn()?;
        bookings::delete_booking(&db, id)?;
    }

    Ok(StatusCode::NO_CONTENT)
}
