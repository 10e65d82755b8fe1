use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use super::{check_auth, AppQuery};
use crate::errors::AppError;
use crate::models::{MonthlyRevenue, ReportFilter, ServiceRevenue};
use crate::services::reports;
use crate::state::AppState;

// GET /api/reports/monthly-revenue
pub async fn monthly_revenue(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppQuery(filter): AppQuery<ReportFilter>,
) -> Result<Json<Vec<MonthlyRevenue>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let invoices = {
        let db = state.conn()?;
        reports::load_successful_invoices(&db, &filter)?
    };

    Ok(Json(reports::monthly_revenue(&invoices)))
}

// GET /api/reports/service-revenue
pub async fn service_revenue(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppQuery(filter): AppQuery<ReportFilter>,
) -> Result<Json<Vec<ServiceRevenue>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let invoices = {
        let db = state.conn()?;
        reports::load_successful_invoices(&db, &filter)?
    };

    Ok(Json(reports::service_revenue(&invoices, filter.service_id)))
}
