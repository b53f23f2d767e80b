//! The module contains the trips table and its conversion into the API view.

use api_types::trip::{TripStatus, TripView};
use sea_orm::entity::prelude::*;

use crate::{
    ResultEngine,
    util::{duration_days, model_currency, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "trips")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owner.
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Date,
    pub end_date: Date,
    pub cover_image_url: Option<String>,
    pub is_public: bool,
    pub status: String,
    pub estimated_budget_minor: Option<i64>,
    pub actual_budget_minor: Option<i64>,
    pub currency: String,
    pub collaborators_can_edit: bool,
    pub auto_calculate_budget: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Owner,
    #[sea_orm(has_many = "super::stops::Entity")]
    Stops,
    #[sea_orm(has_one = "super::budgets::Entity")]
    Budget,
    #[sea_orm(has_one = "super::shared_itineraries::Entity")]
    Share,
    #[sea_orm(has_many = "super::trip_collaborators::Entity")]
    Collaborators,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::stops::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stops.def()
    }
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl Related<super::shared_itineraries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Share.def()
    }
}

impl Related<super::trip_collaborators::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collaborators.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> ResultEngine<TripStatus> {
        TripStatus::try_from(self.status.as_str()).map_err(Into::into)
    }

    pub fn duration_days(&self) -> i64 {
        duration_days(self.start_date, self.end_date)
    }

    pub(crate) fn to_view(&self) -> ResultEngine<TripView> {
        Ok(TripView {
            id: parse_uuid(&self.id, "trip")?,
            owner_id: parse_uuid(&self.user_id, "user")?,
            name: self.name.clone(),
            description: self.description.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            duration_days: self.duration_days(),
            cover_image_url: self.cover_image_url.clone(),
            is_public: self.is_public,
            status: self.status()?,
            estimated_budget_minor: self.estimated_budget_minor,
            actual_budget_minor: self.actual_budget_minor,
            currency: model_currency(&self.currency)?,
            collaborators_can_edit: self.collaborators_can_edit,
            auto_calculate_budget: self.auto_calculate_budget,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
