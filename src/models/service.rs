use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::page::SortDirection;

/// An entry in the salon's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i64,
    pub service_name: String,
    pub price: f64,
    /// Minutes.
    pub estimated_time: i64,
    pub description: Option<String>,
    pub banner_image_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStep {
    pub step_order: i64,
    pub step_title: String,
    pub step_description: Option<String>,
    pub step_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetail {
    #[serde(flatten)]
    pub service: Service,
    pub steps: Vec<ServiceStep>,
}

/// Step as submitted by a client; order comes from position in the list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInput {
    pub step_title: String,
    pub step_description: Option<String>,
    pub step_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub service_name: String,
    pub price: f64,
    pub estimated_time: Option<i64>,
    pub description: Option<String>,
    pub banner_image_url: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceChanges {
    pub service_name: Option<String>,
    pub price: Option<f64>,
    pub estimated_time: Option<i64>,
    pub description: Option<String>,
    pub banner_image_url: Option<String>,
    /// Replaces every step when present.
    pub steps: Option<Vec<StepInput>>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceSort {
    #[default]
    Id,
    ServiceName,
    Price,
    EstimatedTime,
    CreatedAt,
}

impl ServiceSort {
    pub fn column(&self) -> &'static str {
        match self {
            ServiceSort::Id => "id",
            ServiceSort::ServiceName => "service_name",
            ServiceSort::Price => "price",
            ServiceSort::EstimatedTime => "estimated_time",
            ServiceSort::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceQuery {
    pub keyword: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
    #[serde(default)]
    pub sort_by: ServiceSort,
    pub sort_direction: Option<SortDirection>,
}
