use api_types::{
    activity::ActivityCategory,
    catalog::CatalogActivityView,
    template::Difficulty,
};
use sea_orm::entity::prelude::*;

use crate::{ResultEngine, cities::string_list, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "activity_catalog")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub city_name: String,
    pub country: String,
    pub location_name: Option<String>,
    pub address: Option<String>,
    pub average_cost_minor: Option<i64>,
    pub cost_range_min_minor: Option<i64>,
    pub cost_range_max_minor: Option<i64>,
    pub currency: String,
    pub estimated_duration_minutes: Option<i32>,
    pub difficulty: Option<String>,
    pub booking_required: bool,
    pub rating: Option<f64>,
    pub review_count: i64,
    pub image_urls: Json,
    pub tags: Json,
    pub is_verified: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub(crate) fn to_view(&self) -> ResultEngine<CatalogActivityView> {
        Ok(CatalogActivityView {
            id: parse_uuid(&self.id, "activity")?,
            name: self.name.clone(),
            category: ActivityCategory::try_from(self.category.as_str())?,
            description: self.description.clone(),
            city_name: self.city_name.clone(),
            country: self.country.clone(),
            location_name: self.location_name.clone(),
            address: self.address.clone(),
            average_cost_minor: self.average_cost_minor,
            cost_range_min_minor: self.cost_range_min_minor,
            cost_range_max_minor: self.cost_range_max_minor,
            currency: self.currency.clone(),
            estimated_duration_minutes: self
                .estimated_duration_minutes
                .and_then(|m| u32::try_from(m).ok()),
            difficulty: self
                .difficulty
                .as_deref()
                .map(Difficulty::try_from)
                .transpose()?,
            booking_required: self.booking_required,
            rating: self.rating,
            review_count: self.review_count,
            image_urls: string_list(&self.image_urls),
            tags: string_list(&self.tags),
            is_verified: self.is_verified,
        })
    }
}
