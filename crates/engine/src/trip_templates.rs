//! The module contains reusable itinerary templates.
//!
//! `template_data` is a JSON document deserialized into
//! [`TemplateData`](api_types::template::TemplateData).

use api_types::template::{Difficulty, TemplateData, TemplateView};
use sea_orm::entity::prelude::*;

use crate::{
    EngineError, ResultEngine,
    util::{model_currency, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "trip_templates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub created_by: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub template_data: Json,
    pub duration_days: i32,
    pub estimated_budget_minor: Option<i64>,
    pub currency: String,
    pub difficulty: String,
    pub is_public: bool,
    pub use_count: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Creator,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn data(&self) -> ResultEngine<TemplateData> {
        serde_json::from_value(self.template_data.clone())
            .map_err(|err| EngineError::invalid("template_data", err.to_string()))
    }

    pub(crate) fn to_view(&self) -> ResultEngine<TemplateView> {
        Ok(TemplateView {
            id: parse_uuid(&self.id, "template")?,
            creator_id: parse_uuid(&self.created_by, "user")?,
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            template_data: self.data()?,
            duration_days: u32::try_from(self.duration_days)
                .map_err(|_| EngineError::invalid("duration_days", "must not be negative"))?,
            estimated_budget_minor: self.estimated_budget_minor,
            currency: model_currency(&self.currency)?,
            difficulty: Difficulty::try_from(self.difficulty.as_str())?,
            is_public: self.is_public,
            use_count: self.use_count,
            created_at: self.created_at,
        })
    }
}
