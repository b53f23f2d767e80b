use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{activity::ActivityView, double_option};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StopNew {
    pub city_name: String,
    pub country: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub order_index: Option<i32>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// IANA timezone name, e.g. `Europe/Rome`.
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub accommodation_name: Option<String>,
    #[serde(default)]
    pub accommodation_address: Option<String>,
    #[serde(default)]
    pub accommodation_cost_minor: Option<i64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StopUpdate {
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub order_index: Option<i32>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub latitude: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub longitude: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timezone: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub accommodation_name: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub accommodation_address: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub accommodation_cost_minor: Option<Option<i64>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StopView {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub city_name: String,
    pub country: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i64,
    pub order_index: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub notes: Option<String>,
    pub accommodation_name: Option<String>,
    pub accommodation_address: Option<String>,
    pub accommodation_cost_minor: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stop with its activities.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StopDetail {
    #[serde(flatten)]
    pub stop: StopView,
    pub activities: Vec<ActivityView>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StopsBulkNew {
    pub stops: Vec<StopNew>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct StopOrder {
    pub stop_id: Uuid,
    pub order_index: i32,
}

/// Request body for `POST /trips/{id}/stops/reorder`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StopsReorder {
    pub stops: Vec<StopOrder>,
}
