use api_types::budget::{BudgetSummary, BudgetUpdate, BudgetView};
use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, activities, aggregate_costs, budgets, stops, trips,
    util::validate_money,
};

use super::{Engine, set_if, with_tx};

fn cost(field: &str, value: Option<i64>) -> ResultEngine<ActiveValue<i64>> {
    Ok(set_if(validate_money(field, value)?))
}

fn limit(field: &str, value: Option<Option<i64>>) -> ResultEngine<ActiveValue<Option<i64>>> {
    Ok(match value {
        Some(inner) => ActiveValue::Set(validate_money(field, inner)?),
        None => ActiveValue::NotSet,
    })
}

impl Engine {
    pub(super) fn new_budget(trip_id: &str, currency: &str) -> budgets::ActiveModel {
        budgets::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            trip_id: ActiveValue::Set(trip_id.to_string()),
            currency: ActiveValue::Set(currency.to_string()),
            transport_cost_minor: ActiveValue::Set(0),
            stay_cost_minor: ActiveValue::Set(0),
            activity_cost_minor: ActiveValue::Set(0),
            meal_cost_minor: ActiveValue::Set(0),
            shopping_cost_minor: ActiveValue::Set(0),
            miscellaneous_cost_minor: ActiveValue::Set(0),
            transport_limit_minor: ActiveValue::Set(None),
            stay_limit_minor: ActiveValue::Set(None),
            activity_limit_minor: ActiveValue::Set(None),
            meal_limit_minor: ActiveValue::Set(None),
            shopping_limit_minor: ActiveValue::Set(None),
            miscellaneous_limit_minor: ActiveValue::Set(None),
            updated_at: ActiveValue::Set(Utc::now()),
            version: ActiveValue::Set(0),
        }
    }

    async fn find_budget(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
    ) -> ResultEngine<Option<budgets::Model>> {
        budgets::Entity::find()
            .filter(budgets::Column::TripId.eq(trip_id.to_string()))
            .one(db)
            .await
            .map_err(Into::into)
    }

    pub(super) async fn require_budget(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
    ) -> ResultEngine<budgets::Model> {
        self.find_budget(db, trip_id)
            .await?
            .ok_or_else(|| EngineError::MissingRelation(format!("budget of trip {trip_id}")))
    }

    /// Budget of a trip, created on the spot for trips that lost theirs.
    pub(super) async fn budget_or_create(
        &self,
        db: &DatabaseTransaction,
        trip: &trips::Model,
    ) -> ResultEngine<budgets::Model> {
        if let Some(budget) = self.find_budget(db, &trip.id).await? {
            return Ok(budget);
        }
        Self::new_budget(&trip.id, &trip.currency)
            .insert(db)
            .await
            .map_err(Into::into)
    }

    /// Compare-and-swap write of the columns set in `changes`.
    ///
    /// Fails with [`EngineError::Conflict`] when the row version moved since
    /// `current` was read.
    pub(super) async fn save_budget(
        &self,
        db: &DatabaseTransaction,
        current: &budgets::Model,
        mut changes: budgets::ActiveModel,
    ) -> ResultEngine<budgets::Model> {
        changes.version = ActiveValue::Set(current.version + 1);
        changes.updated_at = ActiveValue::Set(Utc::now());
        let result = budgets::Entity::update_many()
            .set(changes)
            .filter(budgets::Column::Id.eq(current.id.clone()))
            .filter(budgets::Column::Version.eq(current.version))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::Conflict(
                "budget was modified concurrently".to_string(),
            ));
        }
        budgets::Entity::find_by_id(current.id.clone())
            .one(db)
            .await?
            .ok_or_else(|| {
                EngineError::MissingRelation(format!("budget of trip {}", current.trip_id))
            })
    }

    /// Recomputes `stay_cost_minor` and `activity_cost_minor` from the live
    /// stops and activities of `trip`.
    ///
    /// Runs when the trip has `auto_calculate_budget` or when `force` is set,
    /// and must be called after every stop or activity write in the same
    /// transaction.
    pub(super) async fn sync_trip_budget(
        &self,
        db: &DatabaseTransaction,
        trip: &trips::Model,
        force: bool,
    ) -> ResultEngine<Option<budgets::Model>> {
        if !(trip.auto_calculate_budget || force) {
            return Ok(None);
        }
        let budget = self.require_budget(db, &trip.id).await?;

        let trip_stops = trip
            .find_related(stops::Entity)
            .find_with_related(activities::Entity)
            .all(db)
            .await?;
        let totals = aggregate_costs(
            trip_stops.iter().map(|(stop, _)| stop.accommodation_cost_minor),
            trip_stops
                .iter()
                .flat_map(|(_, activities)| activities.iter().map(|a| a.cost_minor)),
        )?;

        if budget.stay_cost_minor == totals.stay.minor()
            && budget.activity_cost_minor == totals.activity.minor()
        {
            return Ok(Some(budget));
        }
        let changes = budgets::ActiveModel {
            stay_cost_minor: ActiveValue::Set(totals.stay.minor()),
            activity_cost_minor: ActiveValue::Set(totals.activity.minor()),
            ..Default::default()
        };
        self.save_budget(db, &budget, changes).await.map(Some)
    }

    /// Return the budget of a trip.
    pub async fn trip_budget(&self, trip_id: Uuid, user_id: &str) -> ResultEngine<BudgetView> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_read(&db_tx, trip_id, user_id).await?;
            let budget = self.budget_or_create(&db_tx, &trip).await?;
            budget.to_view()
        })
    }

    /// Update costs and limits of a trip budget.
    ///
    /// When `version` is sent it must match the stored one.
    pub async fn update_budget(
        &self,
        trip_id: Uuid,
        user_id: &str,
        update: BudgetUpdate,
    ) -> ResultEngine<BudgetView> {
        let changes = budgets::ActiveModel {
            transport_cost_minor: cost("transport_cost_minor", update.transport_cost_minor)?,
            stay_cost_minor: cost("stay_cost_minor", update.stay_cost_minor)?,
            activity_cost_minor: cost("activity_cost_minor", update.activity_cost_minor)?,
            meal_cost_minor: cost("meal_cost_minor", update.meal_cost_minor)?,
            shopping_cost_minor: cost("shopping_cost_minor", update.shopping_cost_minor)?,
            miscellaneous_cost_minor: cost(
                "miscellaneous_cost_minor",
                update.miscellaneous_cost_minor,
            )?,
            transport_limit_minor: limit("transport_limit_minor", update.transport_limit_minor)?,
            stay_limit_minor: limit("stay_limit_minor", update.stay_limit_minor)?,
            activity_limit_minor: limit("activity_limit_minor", update.activity_limit_minor)?,
            meal_limit_minor: limit("meal_limit_minor", update.meal_limit_minor)?,
            shopping_limit_minor: limit("shopping_limit_minor", update.shopping_limit_minor)?,
            miscellaneous_limit_minor: limit(
                "miscellaneous_limit_minor",
                update.miscellaneous_limit_minor,
            )?,
            ..Default::default()
        };

        with_tx!(self, |db_tx| {
            let trip = self.require_trip_write(&db_tx, trip_id, user_id).await?;
            let budget = self.budget_or_create(&db_tx, &trip).await?;
            if let Some(expected) = update.version
                && expected != budget.version
            {
                return Err(EngineError::Conflict(format!(
                    "budget version is {}, not {expected}",
                    budget.version
                )));
            }
            let saved = self.save_budget(&db_tx, &budget, changes).await?;
            saved.to_view()
        })
    }

    /// Breakdown by category with alerts.
    pub async fn budget_summary(
        &self,
        trip_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<BudgetSummary> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_read(&db_tx, trip_id, user_id).await?;
            let budget = self.budget_or_create(&db_tx, &trip).await?;
            budget.summary()
        })
    }

    /// Recompute stay and activity costs regardless of `auto_calculate_budget`.
    pub async fn recalculate_budget(
        &self,
        trip_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<BudgetView> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_write(&db_tx, trip_id, user_id).await?;
            let budget = self.budget_or_create(&db_tx, &trip).await?;
            let synced = self.sync_trip_budget(&db_tx, &trip, true).await?;
            synced.unwrap_or(budget).to_view()
        })
    }
}
