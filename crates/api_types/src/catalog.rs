//! Reference catalog of cities and bookable activities.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{activity::ActivityCategory, template::Difficulty};

string_enum! {
    pub enum CostLevel("cost level") {
        Budget => "budget",
        Moderate => "moderate",
        Expensive => "expensive",
        Luxury => "luxury",
    }
}

/// Query string of `GET /search/cities`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CitySearch {
    pub query: Option<String>,
    pub limit: Option<u64>,
}

/// Query string of `GET /search/activities`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActivitySearch {
    pub query: Option<String>,
    pub city: Option<String>,
    pub category: Option<ActivityCategory>,
    pub min_cost_minor: Option<i64>,
    pub max_cost_minor: Option<i64>,
    pub limit: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CityView {
    pub id: Uuid,
    pub name: String,
    pub country: String,
    pub country_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub population: Option<i64>,
    pub currency: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub best_time_to_visit: Option<String>,
    pub average_temperature: Option<f64>,
    pub popular_attractions: Vec<String>,
    pub travel_tips: Vec<String>,
    pub safety_rating: Option<u8>,
    pub cost_level: Option<CostLevel>,
    pub image_url: Option<String>,
}

/// A city to insert into the catalog.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CityNew {
    pub name: String,
    pub country: String,
    pub country_code: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub population: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub best_time_to_visit: Option<String>,
    #[serde(default)]
    pub average_temperature: Option<f64>,
    #[serde(default)]
    pub popular_attractions: Vec<String>,
    #[serde(default)]
    pub travel_tips: Vec<String>,
    #[serde(default)]
    pub safety_rating: Option<u8>,
    #[serde(default)]
    pub cost_level: Option<CostLevel>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogActivityView {
    pub id: Uuid,
    pub name: String,
    pub category: ActivityCategory,
    pub description: Option<String>,
    pub city_name: String,
    pub country: String,
    pub location_name: Option<String>,
    pub address: Option<String>,
    pub average_cost_minor: Option<i64>,
    pub cost_range_min_minor: Option<i64>,
    pub cost_range_max_minor: Option<i64>,
    pub currency: String,
    pub estimated_duration_minutes: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub booking_required: bool,
    pub rating: Option<f64>,
    pub review_count: i64,
    pub image_urls: Vec<String>,
    pub tags: Vec<String>,
    pub is_verified: bool,
}

/// A catalog activity to insert.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogActivityNew {
    pub name: String,
    pub category: ActivityCategory,
    #[serde(default)]
    pub description: Option<String>,
    pub city_name: String,
    pub country: String,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub average_cost_minor: Option<i64>,
    #[serde(default)]
    pub cost_range_min_minor: Option<i64>,
    #[serde(default)]
    pub cost_range_max_minor: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub estimated_duration_minutes: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub booking_required: bool,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: i64,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_verified: bool,
}
