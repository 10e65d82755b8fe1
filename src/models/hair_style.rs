use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::page::SortDirection;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HairStyle {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHairStyle {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HairStyleChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HairStyleSort {
    #[default]
    Name,
    CreatedAt,
}

impl HairStyleSort {
    pub fn column(&self) -> &'static str {
        match self {
            HairStyleSort::Name => "name",
            HairStyleSort::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HairStyleQuery {
    pub keyword: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
    #[serde(default)]
    pub sort_by: HairStyleSort,
    pub sort_direction: Option<SortDirection>,
}
