use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{double_option, stop::StopDetail, trip::TripView};

/// Settings applied when sharing a trip. Absent fields keep their value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShareSettings {
    #[serde(default)]
    pub allow_comments: Option<bool>,
    #[serde(default)]
    pub allow_copying: Option<bool>,
    /// `Some(Some(pw))` protects the link, `Some(None)` removes protection.
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub password: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShareView {
    /// Relative URL of the public page, `/public/{slug}`.
    pub public_url: String,
    pub slug: String,
    pub allow_comments: bool,
    pub allow_copying: bool,
    pub password_protected: bool,
    pub view_count: i64,
    pub copy_count: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Query string of `GET /public/{slug}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PublicTripQuery {
    pub password: Option<String>,
}

/// Read-only view of a shared trip.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublicTrip {
    pub trip: TripView,
    pub stops: Vec<StopDetail>,
    pub owner_name: String,
    pub allow_comments: bool,
    pub allow_copying: bool,
    pub view_count: i64,
}

/// Body of `POST /public/{slug}/copy`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CopyTrip {
    #[serde(default)]
    pub password: Option<String>,
}
