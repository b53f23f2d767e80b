use api_types::collaborator::{InvitationStatus, PermissionLevel};
use sea_orm::entity::prelude::*;

use crate::ResultEngine;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "trip_collaborators")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub trip_id: String,
    pub user_id: String,
    pub invited_by: String,
    pub permission_level: String,
    pub status: String,
    pub invited_at: DateTimeUtc,
    pub responded_at: Option<DateTimeUtc>,
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
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    User,
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn permission_level(&self) -> ResultEngine<PermissionLevel> {
        PermissionLevel::try_from(self.permission_level.as_str()).map_err(Into::into)
    }

    pub fn status(&self) -> ResultEngine<InvitationStatus> {
        InvitationStatus::try_from(self.status.as_str()).map_err(Into::into)
    }
}
