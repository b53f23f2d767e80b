//! The module contains the public share link of a trip.

use api_types::share::ShareView;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "shared_itineraries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub trip_id: String,
    #[sea_orm(unique)]
    pub public_slug: String,
    pub allow_comments: bool,
    pub allow_copying: bool,
    pub password_protected: bool,
    /// Argon2 hash, present iff `password_protected`.
    pub access_password_hash: Option<String>,
    pub view_count: i64,
    pub copy_count: i64,
    pub created_at: DateTimeUtc,
    pub expires_at: Option<DateTimeUtc>,
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
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_expired(&self, now: DateTimeUtc) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }

    pub(crate) fn to_view(&self) -> ShareView {
        ShareView {
            public_url: format!("/public/{}", self.public_slug),
            slug: self.public_slug.clone(),
            allow_comments: self.allow_comments,
            allow_copying: self.allow_copying,
            password_protected: self.password_protected,
            view_count: self.view_count,
            copy_count: self.copy_count,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}
