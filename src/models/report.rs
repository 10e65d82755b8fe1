use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    /// Takes precedence over `from`/`to`.
    pub year: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub employee_id: Option<i64>,
    /// Restricts the per-service table to one service.
    pub service_id: Option<i64>,
}

/// A successful invoice reduced to what the revenue tables need.
#[derive(Debug, Clone)]
pub struct RevenueInvoice {
    pub invoice_date: NaiveDateTime,
    pub total_amount: f64,
    /// Distinct `(service id, service name)` pairs of the underlying booking.
    pub services: Vec<(i64, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`
    pub month: String,
    pub count: i64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRevenue {
    pub service_id: i64,
    pub service: String,
    pub count: i64,
    pub total: f64,
}
