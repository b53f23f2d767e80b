use api_types::user::{
    BudgetRange, PreferencesView, ProfileVisibility, TravelStyle, TripSharingDefault,
};
use sea_orm::entity::prelude::*;

use crate::{ResultEngine, util::model_currency};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_preferences")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub default_currency: String,
    pub budget_range: String,
    pub travel_style: String,
    pub email_notifications: bool,
    pub trip_reminders: bool,
    pub budget_alerts: bool,
    pub marketing_emails: bool,
    pub profile_visibility: String,
    pub trip_sharing_default: String,
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

impl Model {
    pub(crate) fn to_view(&self) -> ResultEngine<PreferencesView> {
        Ok(PreferencesView {
            default_currency: model_currency(&self.default_currency)?,
            budget_range: BudgetRange::try_from(self.budget_range.as_str())?,
            travel_style: TravelStyle::try_from(self.travel_style.as_str())?,
            email_notifications: self.email_notifications,
            trip_reminders: self.trip_reminders,
            budget_alerts: self.budget_alerts,
            marketing_emails: self.marketing_emails,
            profile_visibility: ProfileVisibility::try_from(self.profile_visibility.as_str())?,
            trip_sharing_default: TripSharingDefault::try_from(
                self.trip_sharing_default.as_str(),
            )?,
            updated_at: self.updated_at,
        })
    }
}
