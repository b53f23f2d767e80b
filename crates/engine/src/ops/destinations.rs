use api_types::user::{SavedDestinationNew, SavedDestinationUpdate, SavedDestinationView};
use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, saved_destinations,
    util::validate_priority,
};

use super::{Engine, normalize_optional_text, normalize_required_name, patch_text, set_if, with_tx};

const DESTINATION_PRIORITY_DEFAULT: u8 = 1;

fn destination_not_found() -> EngineError {
    EngineError::KeyNotFound("saved destination not exists".to_string())
}

impl Engine {
    /// Saved destinations of a user, highest priority first, then newest.
    pub(super) async fn destination_views(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Vec<SavedDestinationView>> {
        saved_destinations::Entity::find()
            .filter(saved_destinations::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(saved_destinations::Column::Priority)
            .order_by_desc(saved_destinations::Column::SavedAt)
            .all(db)
            .await?
            .iter()
            .map(saved_destinations::Model::to_view)
            .collect()
    }

    async fn require_destination(
        &self,
        db: &DatabaseTransaction,
        destination_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<saved_destinations::Model> {
        saved_destinations::Entity::find_by_id(destination_id.to_string())
            .filter(saved_destinations::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(destination_not_found)
    }

    pub async fn list_saved_destinations(
        &self,
        user_id: &str,
    ) -> ResultEngine<Vec<SavedDestinationView>> {
        with_tx!(self, |db_tx| self.destination_views(&db_tx, user_id).await)
    }

    /// Save a destination. A user can save the same city and country once.
    pub async fn new_saved_destination(
        &self,
        user_id: &str,
        new: SavedDestinationNew,
    ) -> ResultEngine<SavedDestinationView> {
        let city_name = normalize_required_name(&new.city_name, "city_name")?;
        let country = normalize_required_name(&new.country, "country")?;
        let priority = validate_priority(new.priority.unwrap_or(DESTINATION_PRIORITY_DEFAULT))?;

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let duplicate = saved_destinations::Entity::find()
                .filter(saved_destinations::Column::UserId.eq(user_id.to_string()))
                .filter(saved_destinations::Column::CityName.eq(city_name.clone()))
                .filter(saved_destinations::Column::Country.eq(country.clone()))
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::ExistingKey(format!("{city_name}, {country}")));
            }
            let model = saved_destinations::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                city_name: ActiveValue::Set(city_name),
                country: ActiveValue::Set(country),
                notes: ActiveValue::Set(normalize_optional_text(new.notes.as_deref())),
                priority: ActiveValue::Set(i32::from(priority)),
                saved_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            model.to_view()
        })
    }

    pub async fn saved_destination(
        &self,
        destination_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<SavedDestinationView> {
        with_tx!(self, |db_tx| {
            self.require_destination(&db_tx, destination_id, user_id)
                .await?
                .to_view()
        })
    }

    pub async fn update_saved_destination(
        &self,
        destination_id: Uuid,
        user_id: &str,
        update: SavedDestinationUpdate,
    ) -> ResultEngine<SavedDestinationView> {
        let priority = update
            .priority
            .map(validate_priority)
            .transpose()?
            .map(i32::from);
        with_tx!(self, |db_tx| {
            let current = self
                .require_destination(&db_tx, destination_id, user_id)
                .await?;
            let active = saved_destinations::ActiveModel {
                id: ActiveValue::Unchanged(current.id.clone()),
                notes: set_if(patch_text(update.notes)),
                priority: set_if(priority),
                ..Default::default()
            };
            if !active.is_changed() {
                return current.to_view();
            }
            active.update(&db_tx).await?.to_view()
        })
    }

    pub async fn delete_saved_destination(
        &self,
        destination_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let current = self
                .require_destination(&db_tx, destination_id, user_id)
                .await?;
            saved_destinations::Entity::delete_by_id(current.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
