use api_types::user::SavedDestinationView;
use sea_orm::entity::prelude::*;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "saved_destinations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub city_name: String,
    pub country: String,
    pub notes: Option<String>,
    pub priority: i32,
    pub saved_at: DateTimeUtc,
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
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub(crate) fn to_view(&self) -> ResultEngine<SavedDestinationView> {
        Ok(SavedDestinationView {
            id: parse_uuid(&self.id, "saved destination")?,
            city_name: self.city_name.clone(),
            country: self.country.clone(),
            notes: self.notes.clone(),
            priority: u8::try_from(self.priority)
                .map_err(|_| EngineError::invalid("priority", "out of range"))?,
            saved_at: self.saved_at,
        })
    }
}
