//! Users table.
//!
//! Every other table references users by `id`, a UUID string.

use api_types::user::UserView;
use sea_orm::entity::prelude::*;

use crate::{ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub additional_info: Option<String>,
    pub photo_url: Option<String>,
    pub language_preference: String,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::trips::Entity")]
    Trips,
    #[sea_orm(has_one = "super::user_profiles::Entity")]
    Profile,
    #[sea_orm(has_one = "super::user_preferences::Entity")]
    Preferences,
    #[sea_orm(has_many = "super::saved_destinations::Entity")]
    SavedDestinations,
    #[sea_orm(has_many = "super::trip_collaborators::Entity")]
    Collaborations,
    #[sea_orm(has_many = "super::trip_templates::Entity")]
    Templates,
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl Related<super::user_profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::user_preferences::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Preferences.def()
    }
}

impl Related<super::saved_destinations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavedDestinations.def()
    }
}

impl Related<super::trip_collaborators::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Collaborations.def()
    }
}

impl Related<super::trip_templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Templates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub(crate) fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub(crate) fn to_view(&self) -> ResultEngine<UserView> {
        Ok(UserView {
            id: parse_uuid(&self.id, "user")?,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone_number: self.phone_number.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
            additional_info: self.additional_info.clone(),
            photo_url: self.photo_url.clone(),
            language_preference: self.language_preference.clone(),
            date_joined: self.created_at,
        })
    }
}
