use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::{check_auth, parse_id, AppJson, AppQuery};
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Invoice, InvoiceDetail, InvoiceQuery, NewInvoice, Page, PageRequest, StatusChange};
use crate::services::receipt::generate_receipt;
use crate::services::{invoices, workflow};
use crate::state::AppState;

// GET /api/invoices
pub async fn list_invoices(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppQuery(query): AppQuery<InvoiceQuery>,
) -> Result<Json<Page<InvoiceDetail>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let page = PageRequest::new(query.page, query.size)?;

    let (data, total) = {
        let db = state.conn()?;
        let (rows, total) = queries::list_invoices(&db, &query, page)?;
        let data = rows
            .into_iter()
            .map(|i| invoices::expand(&db, i))
            .collect::<Result<Vec<_>, _>>()?;
        (data, total)
    };

    Ok(Json(Page::new(data, total, page)))
}

// POST /api/invoices
pub async fn create_invoice(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppJson(input): AppJson<NewInvoice>,
) -> Result<(StatusCode, Json<InvoiceDetail>), AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let detail = {
        let mut db = state.conn()?;
        invoices::create_invoice(&mut db, &input, state.config.strict_status_transitions)?
    };

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/invoices/:id
pub async fn get_invoice(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Json<InvoiceDetail>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let id = parse_id(&raw_id)?;

    let detail = {
        let db = state.conn()?;
        invoices::load_detail(&db, id)?
    };
    Ok(Json(detail))
}

// PATCH /api/invoices/:id/status
pub async fn update_invoice_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
    AppJson(change): AppJson<StatusChange>,
) -> Result<Json<Invoice>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let id = parse_id(&raw_id)?;

    let invoice = {
        let db = state.conn()?;
        workflow::change_invoice_status(&db, id, change.status, state.config.strict_status_transitions)?
    };
    Ok(Json(invoice))
}

// DELETE /api/invoices/:id
pub async fn delete_invoice(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let id = parse_id(&raw_id)?;

    {
        let db = state.conn()?;
        invoices::delete_invoice(&db, id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/invoices/:id/receipt
pub async fn download_receipt(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let id = parse_id(&raw_id)?;

    let detail = {
        let db = state.conn()?;
        invoices::load_detail(&db, id)?
    };

    let body = generate_receipt(&detail, &state.config.business_name);
    let filename = format!("invoice-{id}.txt");

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response())
}
