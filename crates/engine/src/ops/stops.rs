use std::collections::HashMap;

use api_types::{
    Currency,
    activity::ActivityView,
    stop::{StopDetail, StopNew, StopOrder, StopUpdate, StopView},
};
use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, LoaderTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    ResultEngine, activities, stops, trips,
    util::{
        model_currency, normalize_timezone, validate_coordinates, validate_money,
        validate_stop_dates,
    },
};

use super::{Engine, normalize_optional_text, normalize_required_name, patch_text, set_if, with_tx};

pub(super) fn stop_model(trip_id: &str, new: StopNew) -> ResultEngine<stops::ActiveModel> {
    let city_name = normalize_required_name(&new.city_name, "city_name")?;
    let country = normalize_required_name(&new.country, "country")?;
    validate_stop_dates(new.start_date, new.end_date)?;
    validate_coordinates(new.latitude, new.longitude)?;
    let timezone = normalize_timezone(new.timezone.as_deref())?;
    let cost = validate_money("accommodation_cost_minor", new.accommodation_cost_minor)?;
    let now = Utc::now();
    Ok(stops::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        trip_id: ActiveValue::Set(trip_id.to_string()),
        city_name: ActiveValue::Set(city_name),
        country: ActiveValue::Set(country),
        start_date: ActiveValue::Set(new.start_date),
        end_date: ActiveValue::Set(new.end_date),
        order_index: ActiveValue::Set(new.order_index.unwrap_or(0)),
        latitude: ActiveValue::Set(new.latitude),
        longitude: ActiveValue::Set(new.longitude),
        timezone: ActiveValue::Set(timezone),
        notes: ActiveValue::Set(normalize_optional_text(new.notes.as_deref())),
        accommodation_name: ActiveValue::Set(normalize_optional_text(
            new.accommodation_name.as_deref(),
        )),
        accommodation_address: ActiveValue::Set(normalize_optional_text(
            new.accommodation_address.as_deref(),
        )),
        accommodation_cost_minor: ActiveValue::Set(cost),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    })
}

impl Engine {
    /// Stops of a trip in itinerary order.
    pub(super) async fn ordered_stops(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
    ) -> ResultEngine<Vec<stops::Model>> {
        stops::Entity::find()
            .filter(stops::Column::TripId.eq(trip_id.to_string()))
            .order_by_asc(stops::Column::OrderIndex)
            .order_by_asc(stops::Column::StartDate)
            .all(db)
            .await
            .map_err(Into::into)
    }

    /// Activities of the given stops, grouped by stop id, each group ordered
    /// by start time, priority and name.
    pub(super) async fn activities_by_stop(
        &self,
        db: &DatabaseTransaction,
        parents: &[stops::Model],
    ) -> ResultEngine<HashMap<String, Vec<activities::Model>>> {
        if parents.is_empty() {
            return Ok(HashMap::new());
        }
        let grouped = parents
            .load_many(
                activities::Entity::find()
                    .order_by_asc(activities::Column::StartTime)
                    .order_by_asc(activities::Column::Priority)
                    .order_by_asc(activities::Column::Name),
                db,
            )
            .await?;
        Ok(parents
            .iter()
            .map(|stop| stop.id.clone())
            .zip(grouped)
            .collect())
    }

    pub(super) async fn stop_details(
        &self,
        db: &DatabaseTransaction,
        trip: &trips::Model,
    ) -> ResultEngine<Vec<StopDetail>> {
        let currency = model_currency(&trip.currency)?;
        let trip_stops = self.ordered_stops(db, &trip.id).await?;
        let mut grouped = self
            .activities_by_stop(db, &trip_stops)
            .await?;
        trip_stops
            .iter()
            .map(|stop| {
                let activities = grouped
                    .remove(&stop.id)
                    .unwrap_or_default()
                    .iter()
                    .map(|a| a.to_view(currency))
                    .collect::<ResultEngine<Vec<ActivityView>>>()?;
                Ok(StopDetail {
                    stop: stop.to_view()?,
                    activities,
                })
            })
            .collect()
    }

    /// List the stops of a trip in itinerary order.
    pub async fn list_stops(&self, trip_id: Uuid, user_id: &str) -> ResultEngine<Vec<StopView>> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_read(&db_tx, trip_id, user_id).await?;
            self.ordered_stops(&db_tx, &trip.id)
                .await?
                .iter()
                .map(stops::Model::to_view)
                .collect()
        })
    }

    /// Add a stop to a trip.
    pub async fn new_stop(
        &self,
        trip_id: Uuid,
        user_id: &str,
        new: StopNew,
    ) -> ResultEngine<StopView> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_write(&db_tx, trip_id, user_id).await?;
            let model = stop_model(&trip.id, new)?.insert(&db_tx).await?;
            self.sync_trip_budget(&db_tx, &trip, false).await?;
            model.to_view()
        })
    }

    /// Add several stops at once. Either all are created or none.
    pub async fn new_stops(
        &self,
        trip_id: Uuid,
        user_id: &str,
        batch: Vec<StopNew>,
    ) -> ResultEngine<Vec<StopView>> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_write(&db_tx, trip_id, user_id).await?;
            let mut out = Vec::with_capacity(batch.len());
            for new in batch {
                let model = stop_model(&trip.id, new)?.insert(&db_tx).await?;
                out.push(model.to_view()?);
            }
            self.sync_trip_budget(&db_tx, &trip, false).await?;
            Ok(out)
        })
    }

    /// Return a stop with its activities.
    pub async fn stop(&self, stop_id: Uuid, user_id: &str) -> ResultEngine<StopDetail> {
        with_tx!(self, |db_tx| {
            let (stop, trip) = self.require_stop_read(&db_tx, stop_id, user_id).await?;
            let currency: Currency = model_currency(&trip.currency)?;
            let activities = self
                .activities_by_stop(&db_tx, std::slice::from_ref(&stop))
                .await?
                .remove(&stop.id)
                .unwrap_or_default()
                .iter()
                .map(|a| a.to_view(currency))
                .collect::<ResultEngine<Vec<ActivityView>>>()?;
            Ok(StopDetail {
                stop: stop.to_view()?,
                activities,
            })
        })
    }

    /// Partially update a stop.
    pub async fn update_stop(
        &self,
        stop_id: Uuid,
        user_id: &str,
        update: StopUpdate,
    ) -> ResultEngine<StopView> {
        let city_name = update
            .city_name
            .as_deref()
            .map(|v| normalize_required_name(v, "city_name"))
            .transpose()?;
        let country = update
            .country
            .as_deref()
            .map(|v| normalize_required_name(v, "country"))
            .transpose()?;
        let timezone = update
            .timezone
            .map(|tz| normalize_timezone(tz.as_deref()))
            .transpose()?;
        let cost = update
            .accommodation_cost_minor
            .map(|v| validate_money("accommodation_cost_minor", v))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let (stop, trip) = self.require_stop_write(&db_tx, stop_id, user_id).await?;
            validate_stop_dates(
                update.start_date.unwrap_or(stop.start_date),
                update.end_date.unwrap_or(stop.end_date),
            )?;
            validate_coordinates(
                update.latitude.unwrap_or(stop.latitude),
                update.longitude.unwrap_or(stop.longitude),
            )?;
            let active = stops::ActiveModel {
                id: ActiveValue::Set(stop.id.clone()),
                city_name: set_if(city_name),
                country: set_if(country),
                start_date: set_if(update.start_date),
                end_date: set_if(update.end_date),
                order_index: set_if(update.order_index),
                latitude: set_if(update.latitude),
                longitude: set_if(update.longitude),
                timezone: set_if(timezone),
                notes: set_if(patch_text(update.notes)),
                accommodation_name: set_if(patch_text(update.accommodation_name)),
                accommodation_address: set_if(patch_text(update.accommodation_address)),
                accommodation_cost_minor: set_if(cost),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            self.sync_trip_budget(&db_tx, &trip, false).await?;
            model.to_view()
        })
    }

    /// Delete a stop and its activities.
    pub async fn delete_stop(&self, stop_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (stop, trip) = self.require_stop_write(&db_tx, stop_id, user_id).await?;
            activities::Entity::delete_many()
                .filter(activities::Column::StopId.eq(stop.id.clone()))
                .exec(&db_tx)
                .await?;
            stops::Entity::delete_by_id(stop.id).exec(&db_tx).await?;
            self.sync_trip_budget(&db_tx, &trip, false).await?;
            Ok(())
        })
    }

    /// Assign new order indexes. Ids that are not stops of the trip are
    /// ignored. Returns the stops in their new order.
    pub async fn reorder_stops(
        &self,
        trip_id: Uuid,
        user_id: &str,
        order: Vec<StopOrder>,
    ) -> ResultEngine<Vec<StopView>> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_write(&db_tx, trip_id, user_id).await?;
            let now = Utc::now();
            for item in order {
                stops::Entity::update_many()
                    .col_expr(stops::Column::OrderIndex, Expr::value(item.order_index))
                    .col_expr(stops::Column::UpdatedAt, Expr::value(now))
                    .filter(stops::Column::Id.eq(item.stop_id.to_string()))
                    .filter(stops::Column::TripId.eq(trip.id.clone()))
                    .exec(&db_tx)
                    .await?;
            }
            self.ordered_stops(&db_tx, &trip.id)
                .await?
                .iter()
                .map(stops::Model::to_view)
                .collect()
        })
    }
}
