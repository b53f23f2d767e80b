//! The module contains the read-only city catalog.

use api_types::catalog::{CityView, CostLevel};
use sea_orm::entity::prelude::*;

use crate::{ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
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
    pub popular_attractions: Json,
    pub travel_tips: Json,
    pub safety_rating: Option<i32>,
    pub cost_level: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Reads a JSON array of strings, skipping anything else.
pub(crate) fn string_list(value: &Json) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

impl Model {
    pub(crate) fn to_view(&self) -> ResultEngine<CityView> {
        Ok(CityView {
            id: parse_uuid(&self.id, "city")?,
            name: self.name.clone(),
            country: self.country.clone(),
            country_code: self.country_code.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            timezone: self.timezone.clone(),
            population: self.population,
            currency: self.currency.clone(),
            language: self.language.clone(),
            description: self.description.clone(),
            best_time_to_visit: self.best_time_to_visit.clone(),
            average_temperature: self.average_temperature,
            popular_attractions: string_list(&self.popular_attractions),
            travel_tips: string_list(&self.travel_tips),
            safety_rating: self.safety_rating.and_then(|r| u8::try_from(r).ok()),
            cost_level: self
                .cost_level
                .as_deref()
                .map(CostLevel::try_from)
                .transpose()?,
            image_url: self.image_url.clone(),
        })
    }
}
