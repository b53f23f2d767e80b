use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, double_option};

string_enum! {
    /// Kind of an activity, shared by trip activities and the catalog.
    #[derive(Default)]
    pub enum ActivityCategory("activity category") {
        Sightseeing => "sightseeing",
        Food => "food",
        Adventure => "adventure",
        Culture => "culture",
        Nightlife => "nightlife",
        Shopping => "shopping",
        Nature => "nature",
        Transport => "transport",
        Accommodation => "accommodation",
        Relaxation => "relaxation",
        Sports => "sports",
        Business => "business",
        Education => "education",
        Entertainment => "entertainment",
        Tours => "tours",
        #[default]
        Other => "other",
    }
}

impl ActivityCategory {
    /// Human readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sightseeing => "Sightseeing",
            Self::Food => "Food & Dining",
            Self::Adventure => "Adventure",
            Self::Culture => "Culture & Arts",
            Self::Nightlife => "Nightlife",
            Self::Shopping => "Shopping",
            Self::Nature => "Nature & Outdoors",
            Self::Transport => "Transportation",
            Self::Accommodation => "Accommodation",
            Self::Relaxation => "Relaxation",
            Self::Sports => "Sports",
            Self::Business => "Business",
            Self::Education => "Education",
            Self::Entertainment => "Entertainment",
            Self::Tours => "Tours",
            Self::Other => "Other",
        }
    }
}

/// Priority of an activity, 1 (low) to 4 (must do).
pub const PRIORITY_MIN: u8 = 1;
pub const PRIORITY_MAX: u8 = 4;
pub const PRIORITY_DEFAULT: u8 = 2;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityNew {
    pub name: String,
    #[serde(default)]
    pub category: Option<ActivityCategory>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub cost_minor: Option<i64>,
    #[serde(default)]
    pub is_paid: Option<bool>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub is_booked: Option<bool>,
    #[serde(default)]
    pub booking_reference: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub weather_dependent: Option<bool>,
    #[serde(default)]
    pub indoor_activity: Option<bool>,
}

impl ActivityNew {
    /// Minimal activity with only a name, everything else defaulted.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            description: None,
            notes: None,
            location_name: None,
            address: None,
            start_time: None,
            end_time: None,
            duration_minutes: None,
            cost_minor: None,
            is_paid: None,
            priority: None,
            is_booked: None,
            booking_reference: None,
            website_url: None,
            phone_number: None,
            image_url: None,
            weather_dependent: None,
            indoor_activity: None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActivityUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<ActivityCategory>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
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
    pub location_name: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<Option<NaiveTime>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<Option<NaiveTime>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_minutes: Option<Option<u32>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub cost_minor: Option<Option<i64>>,
    #[serde(default)]
    pub is_paid: Option<bool>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub is_booked: Option<bool>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub booking_reference: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub website_url: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone_number: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<Option<String>>,
    #[serde(default)]
    pub weather_dependent: Option<bool>,
    #[serde(default)]
    pub indoor_activity: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityView {
    pub id: Uuid,
    pub stop_id: Uuid,
    pub name: String,
    pub category: ActivityCategory,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub location_name: Option<String>,
    pub address: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub duration_minutes: Option<u32>,
    pub cost_minor: Option<i64>,
    /// Always the currency of the owning trip.
    pub currency: Currency,
    pub is_paid: bool,
    pub priority: u8,
    pub is_booked: bool,
    pub booking_reference: Option<String>,
    pub website_url: Option<String>,
    pub phone_number: Option<String>,
    pub image_url: Option<String>,
    pub weather_dependent: bool,
    pub indoor_activity: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivitiesBulkNew {
    pub activities: Vec<ActivityNew>,
}

/// Query string accepted by `GET /trips/{id}/activities`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActivityListQuery {
    pub category: Option<ActivityCategory>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActivityBook {
    #[serde(default)]
    pub booking_reference: Option<String>,
}

/// Activities of one calendar day of a trip.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityDay {
    pub date: NaiveDate,
    pub activities: Vec<DayActivity>,
}

/// Compact activity row used by the per-day agenda.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DayActivity {
    pub id: Uuid,
    pub name: String,
    pub category: ActivityCategory,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub cost_minor: Option<i64>,
    /// `"{city}, {country}"` of the stop.
    pub location: String,
    pub is_booked: bool,
    pub is_paid: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryView {
    pub value: ActivityCategory,
    pub label: String,
}

impl From<ActivityCategory> for CategoryView {
    fn from(value: ActivityCategory) -> Self {
        Self {
            value,
            label: value.label().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_defaults_to_other() {
        assert_eq!(ActivityCategory::default(), ActivityCategory::Other);
        assert_eq!(ActivityCategory::ALL.len(), 16);
    }

    #[test]
    fn category_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&ActivityCategory::Sightseeing).unwrap();
        assert_eq!(json, r#""sightseeing""#);
        let parsed: ActivityCategory = serde_json::from_str(r#""nightlife""#).unwrap();
        assert_eq!(parsed, ActivityCategory::Nightlife);
    }

    #[test]
    fn clearing_cost_is_explicit() {
        let update: ActivityUpdate = serde_json::from_str(r#"{"cost_minor":null}"#).unwrap();
        assert_eq!(update.cost_minor, Some(None));
    }
}
