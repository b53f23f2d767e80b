use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, double_option, stats::UserStats};

string_enum! {
    #[derive(Default)]
    pub enum BudgetRange("budget range") {
        Budget => "budget",
        #[default]
        MidRange => "mid_range",
        Luxury => "luxury",
        Flexible => "flexible",
    }
}

string_enum! {
    #[derive(Default)]
    pub enum TravelStyle("travel style") {
        Adventure => "adventure",
        Relaxation => "relaxation",
        #[default]
        Culture => "culture",
        Business => "business",
        Family => "family",
        Solo => "solo",
        Group => "group",
    }
}

string_enum! {
    #[derive(Default)]
    pub enum ProfileVisibility("profile visibility") {
        Public => "public",
        Friends => "friends",
        #[default]
        Private => "private",
    }
}

string_enum! {
    #[derive(Default)]
    pub enum TripSharingDefault("trip sharing default") {
        Public => "public",
        Unlisted => "unlisted",
        #[default]
        Private => "private",
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub additional_info: Option<String>,
    pub photo_url: Option<String>,
    pub language_preference: String,
    pub date_joined: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
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
    pub city: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub country: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_info: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub photo_url: Option<Option<String>>,
    #[serde(default)]
    pub language_preference: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileView {
    pub bio: Option<String>,
    pub website: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Free-form travel style tags, a JSON object.
    pub travel_style: serde_json::Value,
    pub notification_preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub bio: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub website: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub travel_style: Option<serde_json::Value>,
    #[serde(default)]
    pub notification_preferences: Option<serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesView {
    pub default_currency: Currency,
    pub budget_range: BudgetRange,
    pub travel_style: TravelStyle,
    pub email_notifications: bool,
    pub trip_reminders: bool,
    pub budget_alerts: bool,
    pub marketing_emails: bool,
    pub profile_visibility: ProfileVisibility,
    pub trip_sharing_default: TripSharingDefault,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PreferencesUpdate {
    #[serde(default)]
    pub default_currency: Option<Currency>,
    #[serde(default)]
    pub budget_range: Option<BudgetRange>,
    #[serde(default)]
    pub travel_style: Option<TravelStyle>,
    #[serde(default)]
    pub email_notifications: Option<bool>,
    #[serde(default)]
    pub trip_reminders: Option<bool>,
    #[serde(default)]
    pub budget_alerts: Option<bool>,
    #[serde(default)]
    pub marketing_emails: Option<bool>,
    #[serde(default)]
    pub profile_visibility: Option<ProfileVisibility>,
    #[serde(default)]
    pub trip_sharing_default: Option<TripSharingDefault>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedDestinationNew {
    pub city_name: String,
    pub country: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub priority: Option<u8>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SavedDestinationUpdate {
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
    #[serde(default)]
    pub priority: Option<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedDestinationView {
    pub id: Uuid,
    pub city_name: String,
    pub country: String,
    pub notes: Option<String>,
    pub priority: u8,
    pub saved_at: DateTime<Utc>,
}

/// Everything about the requesting user in one payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompleteProfile {
    pub user: UserView,
    pub profile: ProfileView,
    pub preferences: PreferencesView,
    pub saved_destinations: Vec<SavedDestinationView>,
    pub stats: UserStats,
}
