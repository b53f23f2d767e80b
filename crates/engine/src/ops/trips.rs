use std::collections::HashMap;

use api_types::trip::{TripDetail, TripListQuery, TripNew, TripSummary, TripUpdate, TripView};
use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, QueryTrait,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, activities, budgets, shared_itineraries, stops,
    trip_collaborators, trips,
    util::{validate_date_range, validate_money},
};

use super::{
    Engine, access::TripAccess, normalize_optional_text, normalize_required_name, patch_text,
    set_if, with_tx,
};

pub(super) fn trip_model(user_id: &str, new: TripNew) -> ResultEngine<trips::ActiveModel> {
    let name = normalize_required_name(&new.name, "name")?;
    validate_date_range(new.start_date, new.end_date)?;
    let estimated = validate_money("estimated_budget_minor", new.estimated_budget_minor)?;
    let now = Utc::now();
    Ok(trips::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        user_id: ActiveValue::Set(user_id.to_string()),
        name: ActiveValue::Set(name),
        description: ActiveValue::Set(normalize_optional_text(new.description.as_deref())),
        start_date: ActiveValue::Set(new.start_date),
        end_date: ActiveValue::Set(new.end_date),
        cover_image_url: ActiveValue::Set(normalize_optional_text(new.cover_image_url.as_deref())),
        is_public: ActiveValue::Set(new.is_public.unwrap_or(false)),
        status: ActiveValue::Set(new.status.unwrap_or_default().as_str().to_string()),
        estimated_budget_minor: ActiveValue::Set(estimated),
        actual_budget_minor: ActiveValue::Set(None),
        currency: ActiveValue::Set(new.currency.unwrap_or_default().code().to_string()),
        collaborators_can_edit: ActiveValue::Set(new.collaborators_can_edit.unwrap_or(false)),
        auto_calculate_budget: ActiveValue::Set(new.auto_calculate_budget.unwrap_or(true)),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    })
}

impl Engine {
    /// Insert a trip together with its empty budget.
    pub(super) async fn insert_trip(
        &self,
        db: &DatabaseTransaction,
        trip: trips::ActiveModel,
    ) -> ResultEngine<trips::Model> {
        let model = trip.insert(db).await?;
        Self::new_budget(&model.id, &model.currency)
            .insert(db)
            .await?;
        Ok(model)
    }

    /// Stop and activity counts per trip id.
    async fn trip_counts(
        &self,
        db: &DatabaseTransaction,
        trip_ids: Vec<String>,
    ) -> ResultEngine<HashMap<String, (u64, u64)>> {
        let mut counts: HashMap<String, (u64, u64)> = HashMap::new();
        if trip_ids.is_empty() {
            return Ok(counts);
        }
        let trip_stops = stops::Entity::find()
            .filter(stops::Column::TripId.is_in(trip_ids))
            .find_with_related(activities::Entity)
            .all(db)
            .await?;
        for (stop, activities) in trip_stops {
            let entry = counts.entry(stop.trip_id).or_default();
            entry.0 += 1;
            entry.1 += activities.len() as u64;
        }
        Ok(counts)
    }

    async fn summaries(
        &self,
        db: &DatabaseTransaction,
        models: Vec<trips::Model>,
    ) -> ResultEngine<Vec<TripSummary>> {
        let counts = self
            .trip_counts(db, models.iter().map(|t| t.id.clone()).collect())
            .await?;
        models
            .iter()
            .map(|trip| {
                let (stop_count, activity_count) =
                    counts.get(&trip.id).copied().unwrap_or_default();
                Ok(TripSummary {
                    trip: trip.to_view()?,
                    stop_count,
                    activity_count,
                })
            })
            .collect()
    }

    /// Removes a trip and everything it owns.
    pub(super) async fn delete_trip_rows(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
    ) -> ResultEngine<()> {
        let trip_stops = stops::Entity::find()
            .select_only()
            .column(stops::Column::Id)
            .filter(stops::Column::TripId.eq(trip_id.to_string()))
            .into_query();
        activities::Entity::delete_many()
            .filter(activities::Column::StopId.in_subquery(trip_stops))
            .exec(db)
            .await?;
        stops::Entity::delete_many()
            .filter(stops::Column::TripId.eq(trip_id.to_string()))
            .exec(db)
            .await?;
        budgets::Entity::delete_many()
            .filter(budgets::Column::TripId.eq(trip_id.to_string()))
            .exec(db)
            .await?;
        shared_itineraries::Entity::delete_many()
            .filter(shared_itineraries::Column::TripId.eq(trip_id.to_string()))
            .exec(db)
            .await?;
        trip_collaborators::Entity::delete_many()
            .filter(trip_collaborators::Column::TripId.eq(trip_id.to_string()))
            .exec(db)
            .await?;
        trips::Entity::delete_by_id(trip_id.to_string())
            .exec(db)
            .await?;
        Ok(())
    }

    /// Create a trip owned by `user_id`.
    pub async fn new_trip(&self, user_id: &str, new: TripNew) -> ResultEngine<TripView> {
        let trip = trip_model(user_id, new)?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let model = self.insert_trip(&db_tx, trip).await?;
            model.to_view()
        })
    }

    /// List the trips owned by `user_id`, newest first.
    pub async fn list_trips(
        &self,
        user_id: &str,
        query: TripListQuery,
    ) -> ResultEngine<Vec<TripSummary>> {
        with_tx!(self, |db_tx| {
            let mut select = trips::Entity::find()
                .filter(trips::Column::UserId.eq(user_id.to_string()));
            if let Some(status) = query.status {
                select = select.filter(trips::Column::Status.eq(status.as_str()));
            }
            if let Some(is_public) = query.is_public {
                select = select.filter(trips::Column::IsPublic.eq(is_public));
            }
            let models = select
                .order_by_desc(trips::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            self.summaries(&db_tx, models).await
        })
    }

    /// Every trip marked public, newest first. Needs no account.
    pub async fn public_trips(&self) -> ResultEngine<Vec<TripSummary>> {
        with_tx!(self, |db_tx| {
            let models = trips::Entity::find()
                .filter(trips::Column::IsPublic.eq(true))
                .order_by_desc(trips::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            self.summaries(&db_tx, models).await
        })
    }

    /// Trips where `user_id` is an accepted collaborator.
    pub async fn shared_trips(&self, user_id: &str) -> ResultEngine<Vec<TripSummary>> {
        with_tx!(self, |db_tx| {
            let models = trips::Entity::find()
                .inner_join(trip_collaborators::Entity)
                .filter(trip_collaborators::Column::UserId.eq(user_id.to_string()))
                .filter(trip_collaborators::Column::Status.eq("accepted"))
                .order_by_desc(trips::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            self.summaries(&db_tx, models).await
        })
    }

    /// Return a trip.
    pub async fn trip(&self, trip_id: Uuid, user_id: &str) -> ResultEngine<TripView> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_read(&db_tx, trip_id, user_id).await?;
            trip.to_view()
        })
    }

    /// Return a trip with its stops, their activities and the budget.
    pub async fn trip_detail(&self, trip_id: Uuid, user_id: &str) -> ResultEngine<TripDetail> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_read(&db_tx, trip_id, user_id).await?;
            let stops = self.stop_details(&db_tx, &trip).await?;
            let budget = self.budget_or_create(&db_tx, &trip).await?;
            Ok(TripDetail {
                trip: trip.to_view()?,
                stops,
                budget: budget.to_view()?,
            })
        })
    }

    /// Partially update a trip.
    ///
    /// `is_public` and `collaborators_can_edit` can only be changed by the
    /// owner.
    pub async fn update_trip(
        &self,
        trip_id: Uuid,
        user_id: &str,
        update: TripUpdate,
    ) -> ResultEngine<TripView> {
        let name = update
            .name
            .as_deref()
            .map(|n| normalize_required_name(n, "name"))
            .transpose()?;
        let estimated = update
            .estimated_budget_minor
            .map(|v| validate_money("estimated_budget_minor", v))
            .transpose()?;
        let actual = update
            .actual_budget_minor
            .map(|v| validate_money("actual_budget_minor", v))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let (trip, access) = self.require_trip_access(&db_tx, trip_id, user_id).await?;
            if !access.can_write(&trip) {
                return Err(EngineError::Forbidden(
                    "no write permission on trip".to_string(),
                ));
            }
            let owner_fields =
                update.is_public.is_some() || update.collaborators_can_edit.is_some();
            if owner_fields && access != TripAccess::Owner {
                return Err(EngineError::Forbidden(
                    "only the trip owner can change sharing settings".to_string(),
                ));
            }
            validate_date_range(
                update.start_date.unwrap_or(trip.start_date),
                update.end_date.unwrap_or(trip.end_date),
            )?;

            let currency = update.currency.map(|c| c.code().to_string());
            let active = trips::ActiveModel {
                id: ActiveValue::Set(trip.id.clone()),
                name: set_if(name),
                description: set_if(patch_text(update.description)),
                start_date: set_if(update.start_date),
                end_date: set_if(update.end_date),
                cover_image_url: set_if(patch_text(update.cover_image_url)),
                is_public: set_if(update.is_public),
                status: set_if(update.status.map(|s| s.as_str().to_string())),
                estimated_budget_minor: set_if(estimated),
                actual_budget_minor: set_if(actual),
                currency: set_if(currency.clone()),
                collaborators_can_edit: set_if(update.collaborators_can_edit),
                auto_calculate_budget: set_if(update.auto_calculate_budget),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            let updated = active.update(&db_tx).await?;

            if let Some(code) = currency
                && code != trip.currency
            {
                let budget = self.budget_or_create(&db_tx, &updated).await?;
                let changes = budgets::ActiveModel {
                    currency: ActiveValue::Set(code),
                    ..Default::default()
                };
                self.save_budget(&db_tx, &budget, changes).await?;
            }
            if updated.auto_calculate_budget && !trip.auto_calculate_budget {
                self.sync_trip_budget(&db_tx, &updated, false).await?;
            }
            updated.to_view()
        })
    }

    /// Delete a trip with its stops, activities, budget, share link and
    /// collaborators. Owner only.
    pub async fn delete_trip(&self, trip_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_owner(&db_tx, trip_id, user_id).await?;
            self.delete_trip_rows(&db_tx, &trip.id).await
        })
    }
}
