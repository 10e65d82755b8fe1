use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::page::SortDirection;
use super::{Service, Status, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub customer_id: i64,
    pub employee_id: Option<i64>,
    pub appointment_date: NaiveDateTime,
    pub status: Status,
    /// Sum of the selected services' prices at the time of selection.
    pub total_price: f64,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A booking with its customer, employee and selected services resolved.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: Booking,
    pub customer: Option<User>,
    pub employee: Option<User>,
    pub services: Vec<Service>,
}

/// Booking request as placed by a customer. The customer is looked up by
/// phone number and created when unknown.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub phone_number: String,
    pub full_name: Option<String>,
    pub appointment_date: String,
    pub service_ids: Vec<i64>,
    pub notes: Option<String>,
    pub employee_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingChanges {
    pub phone_number: Option<String>,
    pub full_name: Option<String>,
    pub appointment_date: Option<String>,
    /// Replaces the whole selection and recomputes the total when present.
    pub service_ids: Option<Vec<i64>>,
    pub notes: Option<String>,
    pub employee_id: Option<i64>,
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange {
    pub status: Status,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookingSort {
    Id,
    AppointmentDate,
    Status,
    TotalPrice,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl BookingSort {
    pub fn column(&self) -> &'static str {
        match self {
            BookingSort::Id => "b.id",
            BookingSort::AppointmentDate => "b.appointment_date",
            BookingSort::Status => "b.status",
            BookingSort::TotalPrice => "b.total_price",
            BookingSort::CreatedAt => "b.created_at",
            BookingSort::UpdatedAt => "b.updated_at",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingQuery {
    /// Matches the customer's phone or full name.
    pub keyword: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
    #[serde(default)]
    pub sort_by: BookingSort,
    pub sort_direction: Option<SortDirection>,
    pub employee_id: Option<i64>,
    pub status: Option<Status>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}
