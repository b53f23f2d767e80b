use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, budget::BudgetView, double_option, stop::StopDetail};

string_enum! {
    /// Lifecycle of a trip.
    #[derive(Default)]
    pub enum TripStatus("trip status") {
        #[default]
        Planning => "planning",
        Upcoming => "upcoming",
        Ongoing => "ongoing",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

/// Request body for creating a trip.
///
/// A budget in the trip currency is created together with the trip.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TripNew {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub status: Option<TripStatus>,
    #[serde(default)]
    pub estimated_budget_minor: Option<i64>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub collaborators_can_edit: Option<bool>,
    #[serde(default)]
    pub auto_calculate_budget: Option<bool>,
}

/// Partial update of a trip. Absent fields are left untouched, `null` clears
/// nullable fields.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TripUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub cover_image_url: Option<Option<String>>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub status: Option<TripStatus>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_budget_minor: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub actual_budget_minor: Option<Option<i64>>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub collaborators_can_edit: Option<bool>,
    #[serde(default)]
    pub auto_calculate_budget: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripView {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Inclusive number of days between start and end date.
    pub duration_days: i64,
    pub cover_image_url: Option<String>,
    pub is_public: bool,
    pub status: TripStatus,
    pub estimated_budget_minor: Option<i64>,
    pub actual_budget_minor: Option<i64>,
    pub currency: Currency,
    pub collaborators_can_edit: bool,
    pub auto_calculate_budget: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trip row of a listing, with child counts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TripSummary {
    #[serde(flatten)]
    pub trip: TripView,
    pub stop_count: u64,
    pub activity_count: u64,
}

/// Query string accepted by `GET /trips`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TripListQuery {
    pub status: Option<TripStatus>,
    pub is_public: Option<bool>,
}

/// A trip with its stops, their activities and the budget.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TripDetail {
    #[serde(flatten)]
    pub trip: TripView,
    pub stops: Vec<StopDetail>,
    pub budget: BudgetView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in TripStatus::ALL {
            assert_eq!(TripStatus::try_from(status.as_str()).unwrap(), *status);
        }
        assert!(TripStatus::try_from("archived").is_err());
    }

    #[test]
    fn update_keeps_explicit_null() {
        let update: TripUpdate =
            serde_json::from_str(r#"{"description":null,"name":"Rome"}"#).unwrap();
        assert_eq!(update.description, Some(None));
        assert_eq!(update.cover_image_url, None);
        assert_eq!(update.name.as_deref(), Some("Rome"));
    }
}
