use api_types::user::ProfileView;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub birth_date: Option<Date>,
    pub travel_style: Json,
    pub notification_preferences: Json,
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
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for ProfileView {
    fn from(model: &Model) -> Self {
        ProfileView {
            bio: model.bio.clone(),
            website: model.website.clone(),
            birth_date: model.birth_date,
            travel_style: model.travel_style.clone(),
            notification_preferences: model.notification_preferences.clone(),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
