use api_types::{
    Currency,
    activity::{ActivityCategory, ActivityView},
};
use sea_orm::entity::prelude::*;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub stop_id: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub location_name: Option<String>,
    pub address: Option<String>,
    pub start_time: Option<Time>,
    pub end_time: Option<Time>,
    pub duration_minutes: Option<i32>,
    pub cost_minor: Option<i64>,
    pub is_paid: bool,
    pub priority: i32,
    pub is_booked: bool,
    pub booking_reference: Option<String>,
    pub website_url: Option<String>,
    pub phone_number: Option<String>,
    pub image_url: Option<String>,
    pub weather_dependent: bool,
    pub indoor_activity: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stops::Entity",
        from = "Column::StopId",
        to = "super::stops::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Stop,
}

impl Related<super::stops::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stop.def()
    }
}

/// The trip of an activity, through its stop.
impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        super::stops::Relation::Trip.def()
    }

    fn via() -> Option<RelationDef> {
        Some(Relation::Stop.def())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn category(&self) -> ResultEngine<ActivityCategory> {
        ActivityCategory::try_from(self.category.as_str()).map_err(Into::into)
    }

    /// Activities are priced in the currency of their trip.
    pub(crate) fn to_view(&self, currency: Currency) -> ResultEngine<ActivityView> {
        Ok(ActivityView {
            id: parse_uuid(&self.id, "activity")?,
            stop_id: parse_uuid(&self.stop_id, "stop")?,
            name: self.name.clone(),
            category: self.category()?,
            description: self.description.clone(),
            notes: self.notes.clone(),
            location_name: self.location_name.clone(),
            address: self.address.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            duration_minutes: self
                .duration_minutes
                .map(u32::try_from)
                .transpose()
                .map_err(|_| EngineError::invalid("duration_minutes", "out of range"))?,
            cost_minor: self.cost_minor,
            currency,
            is_paid: self.is_paid,
            priority: u8::try_from(self.priority)
                .map_err(|_| EngineError::invalid("priority", "out of range"))?,
            is_booked: self.is_booked,
            booking_reference: self.booking_reference.clone(),
            website_url: self.website_url.clone(),
            phone_number: self.phone_number.clone(),
            image_url: self.image_url.clone(),
            weather_dependent: self.weather_dependent,
            indoor_activity: self.indoor_activity,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
