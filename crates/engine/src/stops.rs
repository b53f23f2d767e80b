use api_types::stop::StopView;
use sea_orm::entity::prelude::*;

use crate::{
    ResultEngine,
    util::{duration_days, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stops")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub trip_id: String,
    pub city_name: String,
    pub country: String,
    pub start_date: Date,
    pub end_date: Date,
    pub order_index: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub notes: Option<String>,
    pub accommodation_name: Option<String>,
    pub accommodation_address: Option<String>,
    pub accommodation_cost_minor: Option<i64>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trips::Entity",
        from = "Column::TripId",
        to = "super::trips::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Trip,
    #[sea_orm(has_many = "super::activities::Entity")]
    Activities,
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl Related<super::activities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activities.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub(crate) fn to_view(&self) -> ResultEngine<StopView> {
        Ok(StopView {
            id: parse_uuid(&self.id, "stop")?,
            trip_id: parse_uuid(&self.trip_id, "trip")?,
            city_name: self.city_name.clone(),
            country: self.country.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            duration_days: duration_days(self.start_date, self.end_date),
            order_index: self.order_index,
            latitude: self.latitude,
            longitude: self.longitude,
            timezone: self.timezone.clone(),
            notes: self.notes.clone(),
            accommodation_name: self.accommodation_name.clone(),
            accommodation_address: self.accommodation_address.clone(),
            accommodation_cost_minor: self.accommodation_cost_minor,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
