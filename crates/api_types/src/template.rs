use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, activity::ActivityCategory};

string_enum! {
    #[derive(Default)]
    pub enum Difficulty("difficulty") {
        Easy => "easy",
        #[default]
        Moderate => "moderate",
        Challenging => "challenging",
        Expert => "expert",
    }
}

/// Itinerary skeleton stored in a template.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateData {
    #[serde(default)]
    pub stops: Vec<TemplateStop>,
}

/// A stop relative to the trip start: it begins `day_offset` days after the
/// start date and lasts `nights` nights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateStop {
    pub city_name: String,
    pub country: String,
    #[serde(default)]
    pub day_offset: u32,
    #[serde(default)]
    pub nights: u32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub accommodation_name: Option<String>,
    #[serde(default)]
    pub accommodation_cost_minor: Option<i64>,
    #[serde(default)]
    pub activities: Vec<TemplateActivity>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateActivity {
    pub name: String,
    #[serde(default)]
    pub category: ActivityCategory,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cost_minor: Option<i64>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub priority: Option<u8>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateNew {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub template_data: TemplateData,
    pub duration_days: u32,
    #[serde(default)]
    pub estimated_budget_minor: Option<i64>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

/// Body of `POST /trips/{id}/template`: snapshot a trip into a template.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TemplateFromTrip {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub is_public: Option<bool>,
}

/// Body of `POST /templates/{id}/use`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateUse {
    #[serde(default)]
    pub name: Option<String>,
    pub start_date: NaiveDate,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TemplateView {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub template_data: TemplateData,
    pub duration_days: u32,
    pub estimated_budget_minor: Option<i64>,
    pub currency: Currency,
    pub difficulty: Difficulty,
    pub is_public: bool,
    pub use_count: i64,
    pub created_at: DateTime<Utc>,
}
