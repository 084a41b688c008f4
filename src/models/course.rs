use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog entry. `published_modules` is derived from the stored modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub object_id: String,
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration: String,
    pub price: f64,
    #[serde(default)]
    pub published_modules: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourseRequest {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub price: f64,
}
