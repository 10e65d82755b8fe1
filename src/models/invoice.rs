use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::page::SortDirection;
use super::{BookingDetail, NewBooking, Status};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: i64,
    pub booking_id: Option<i64>,
    pub invoice_date: NaiveDateTime,
    pub total_amount: f64,
    pub status: Status,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub booking: Option<BookingDetail>,
}

/// Either `booking_id` or an inline `booking` must be given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvoice {
    pub booking_id: Option<i64>,
    pub invoice_date: Option<String>,
    /// Used only when the booking's own total is zero.
    pub total_amount: Option<f64>,
    pub booking: Option<NewBooking>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvoiceSort {
    #[default]
    Id,
    Status,
    TotalAmount,
    InvoiceDate,
}

impl InvoiceSort {
    pub fn column(&self) -> &'static str {
        match self {
            InvoiceSort::Id => "i.id",
            InvoiceSort::Status => "i.status",
            InvoiceSort::TotalAmount => "i.total_amount",
            InvoiceSort::InvoiceDate => "i.invoice_date",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceQuery {
    /// Matches the booking customer's phone or full name.
    pub keyword: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
    #[serde(default)]
    pub sort_by: InvoiceSort,
    pub sort_direction: Option<SortDirection>,
    pub status: Option<Status>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}
