use std::collections::BTreeMap;

use api_types::activity::{
    ActivityBook, ActivityCategory, ActivityDay, ActivityListQuery, ActivityNew, ActivityUpdate,
    ActivityView, CategoryView, DayActivity, PRIORITY_DEFAULT,
};
use chrono::{Days, Utc};
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, activities,
    util::{model_currency, parse_uuid, validate_money, validate_priority},
};

use super::{Engine, normalize_optional_text, normalize_required_name, patch_text, set_if, with_tx};

fn minutes(value: u32) -> ResultEngine<i32> {
    i32::try_from(value).map_err(|_| EngineError::invalid("duration_minutes", "too large"))
}

pub(super) fn activity_model(
    stop_id: &str,
    new: ActivityNew,
) -> ResultEngine<activities::ActiveModel> {
    let name = normalize_required_name(&new.name, "name")?;
    let priority = validate_priority(new.priority.unwrap_or(PRIORITY_DEFAULT))?;
    let cost = validate_money("cost_minor", new.cost_minor)?;
    let duration = new.duration_minutes.map(minutes).transpose()?;
    let text = |value: Option<String>| normalize_optional_text(value.as_deref());
    let now = Utc::now();
    Ok(activities::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        stop_id: ActiveValue::Set(stop_id.to_string()),
        name: ActiveValue::Set(name),
        category: ActiveValue::Set(new.category.unwrap_or_default().as_str().to_string()),
        description: ActiveValue::Set(text(new.description)),
        notes: ActiveValue::Set(text(new.notes)),
        location_name: ActiveValue::Set(text(new.location_name)),
        address: ActiveValue::Set(text(new.address)),
        start_time: ActiveValue::Set(new.start_time),
        end_time: ActiveValue::Set(new.end_time),
        duration_minutes: ActiveValue::Set(duration),
        cost_minor: ActiveValue::Set(cost),
        is_paid: ActiveValue::Set(new.is_paid.unwrap_or(false)),
        priority: ActiveValue::Set(i32::from(priority)),
        is_booked: ActiveValue::Set(new.is_booked.unwrap_or(false)),
        booking_reference: ActiveValue::Set(text(new.booking_reference)),
        website_url: ActiveValue::Set(text(new.website_url)),
        phone_number: ActiveValue::Set(text(new.phone_number)),
        image_url: ActiveValue::Set(text(new.image_url)),
        weather_dependent: ActiveValue::Set(new.weather_dependent.unwrap_or(false)),
        indoor_activity: ActiveValue::Set(new.indoor_activity.unwrap_or(false)),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
    })
}

impl Engine {
    /// Closed list of activity categories with their labels.
    pub fn activity_categories() -> Vec<CategoryView> {
        ActivityCategory::ALL
            .iter()
            .copied()
            .map(CategoryView::from)
            .collect()
    }

    /// List the activities of a stop.
    pub async fn list_stop_activities(
        &self,
        stop_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<ActivityView>> {
        self.stop(stop_id, user_id)
            .await
            .map(|detail| detail.activities)
    }

    /// Add an activity to a stop.
    pub async fn new_activity(
        &self,
        stop_id: Uuid,
        user_id: &str,
        new: ActivityNew,
    ) -> ResultEngine<ActivityView> {
        with_tx!(self, |db_tx| {
            let (stop, trip) = self.require_stop_write(&db_tx, stop_id, user_id).await?;
            let model = activity_model(&stop.id, new)?.insert(&db_tx).await?;
            self.sync_trip_budget(&db_tx, &trip, false).await?;
            model.to_view(model_currency(&trip.currency)?)
        })
    }

    /// Add several activities to a stop. Either all are created or none.
    pub async fn new_activities(
        &self,
        stop_id: Uuid,
        user_id: &str,
        batch: Vec<ActivityNew>,
    ) -> ResultEngine<Vec<ActivityView>> {
        with_tx!(self, |db_tx| {
            let (stop, trip) = self.require_stop_write(&db_tx, stop_id, user_id).await?;
            let currency = model_currency(&trip.currency)?;
            let mut out = Vec::with_capacity(batch.len());
            for new in batch {
                let model = activity_model(&stop.id, new)?.insert(&db_tx).await?;
                out.push(model.to_view(currency)?);
            }
            self.sync_trip_budget(&db_tx, &trip, false).await?;
            Ok(out)
        })
    }

    /// All activities of a trip in itinerary order, optionally filtered by
    /// category.
    pub async fn trip_activities(
        &self,
        trip_id: Uuid,
        user_id: &str,
        query: ActivityListQuery,
    ) -> ResultEngine<Vec<ActivityView>> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_read(&db_tx, trip_id, user_id).await?;
            let currency = model_currency(&trip.currency)?;
            let trip_stops = self.ordered_stops(&db_tx, &trip.id).await?;
            let mut grouped = self
                .activities_by_stop(&db_tx, &trip_stops)
                .await?;
            let category = query.category.map(ActivityCategory::as_str);
            let mut out = Vec::new();
            for stop in &trip_stops {
                for activity in grouped.remove(&stop.id).unwrap_or_default() {
                    if category.is_some_and(|c| c != activity.category) {
                        continue;
                    }
                    out.push(activity.to_view(currency)?);
                }
            }
            Ok(out)
        })
    }

    /// Activities grouped by day.
    ///
    /// Each activity sits on the start date of its stop; every day covered by
    /// a stop is present, even without activities.
    pub async fn activities_by_date(
        &self,
        trip_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<ActivityDay>> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_read(&db_tx, trip_id, user_id).await?;
            let trip_stops = self.ordered_stops(&db_tx, &trip.id).await?;
            let mut grouped = self
                .activities_by_stop(&db_tx, &trip_stops)
                .await?;

            let mut days: BTreeMap<_, Vec<DayActivity>> = BTreeMap::new();
            for stop in &trip_stops {
                let location = format!("{}, {}", stop.city_name, stop.country);
                let bucket = days.entry(stop.start_date).or_default();
                for activity in grouped.remove(&stop.id).unwrap_or_default() {
                    bucket.push(DayActivity {
                        id: parse_uuid(&activity.id, "activity")?,
                        category: activity.category()?,
                        name: activity.name,
                        start_time: activity.start_time,
                        end_time: activity.end_time,
                        cost_minor: activity.cost_minor,
                        location: location.clone(),
                        is_booked: activity.is_booked,
                        is_paid: activity.is_paid,
                    });
                }
                let mut day = stop.start_date;
                while day <= stop.end_date {
                    days.entry(day).or_default();
                    match day.checked_add_days(Days::new(1)) {
                        Some(next) => day = next,
                        None => break,
                    }
                }
            }
            Ok(days
                .into_iter()
                .map(|(date, activities)| ActivityDay { date, activities })
                .collect())
        })
    }

    /// Return an activity.
    pub async fn activity(&self, activity_id: Uuid, user_id: &str) -> ResultEngine<ActivityView> {
        with_tx!(self, |db_tx| {
            let (activity, trip) = self
                .require_activity_read(&db_tx, activity_id, user_id)
                .await?;
            activity.to_view(model_currency(&trip.currency)?)
        })
    }

    /// Partially update an activity.
    pub async fn update_activity(
        &self,
        activity_id: Uuid,
        user_id: &str,
        update: ActivityUpdate,
    ) -> ResultEngine<ActivityView> {
        let name = update
            .name
            .as_deref()
            .map(|n| normalize_required_name(n, "name"))
            .transpose()?;
        let priority = update
            .priority
            .map(validate_priority)
            .transpose()?
            .map(i32::from);
        let cost = update
            .cost_minor
            .map(|v| validate_money("cost_minor", v))
            .transpose()?;
        let duration = update
            .duration_minutes
            .map(|v| v.map(minutes).transpose())
            .transpose()?;

        let active = activities::ActiveModel {
            name: set_if(name),
            category: set_if(update.category.map(|c| c.as_str().to_string())),
            description: set_if(patch_text(update.description)),
            notes: set_if(patch_text(update.notes)),
            location_name: set_if(patch_text(update.location_name)),
            address: set_if(patch_text(update.address)),
            start_time: set_if(update.start_time),
            end_time: set_if(update.end_time),
            duration_minutes: set_if(duration),
            cost_minor: set_if(cost),
            is_paid: set_if(update.is_paid),
            priority: set_if(priority),
            is_booked: set_if(update.is_booked),
            booking_reference: set_if(patch_text(update.booking_reference)),
            website_url: set_if(patch_text(update.website_url)),
            phone_number: set_if(patch_text(update.phone_number)),
            image_url: set_if(patch_text(update.image_url)),
            weather_dependent: set_if(update.weather_dependent),
            indoor_activity: set_if(update.indoor_activity),
            ..Default::default()
        };
        self.write_activity(activity_id, user_id, active).await
    }

    /// Mark an activity booked, optionally storing the booking reference.
    pub async fn book_activity(
        &self,
        activity_id: Uuid,
        user_id: &str,
        book: ActivityBook,
    ) -> ResultEngine<ActivityView> {
        let active = activities::ActiveModel {
            is_booked: ActiveValue::Set(true),
            booking_reference: set_if(
                normalize_optional_text(book.booking_reference.as_deref()).map(Some),
            ),
            ..Default::default()
        };
        self.write_activity(activity_id, user_id, active).await
    }

    /// Mark an activity paid.
    pub async fn pay_activity(
        &self,
        activity_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<ActivityView> {
        let active = activities::ActiveModel {
            is_paid: ActiveValue::Set(true),
            ..Default::default()
        };
        self.write_activity(activity_id, user_id, active).await
    }

    async fn write_activity(
        &self,
        activity_id: Uuid,
        user_id: &str,
        mut active: activities::ActiveModel,
    ) -> ResultEngine<ActivityView> {
        with_tx!(self, |db_tx| {
            let (activity, trip) = self
                .require_activity_write(&db_tx, activity_id, user_id)
                .await?;
            active.id = ActiveValue::Set(activity.id);
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            self.sync_trip_budget(&db_tx, &trip, false).await?;
            model.to_view(model_currency(&trip.currency)?)
        })
    }

    /// Delete an activity.
    pub async fn delete_activity(&self, activity_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (activity, trip) = self
                .require_activity_write(&db_tx, activity_id, user_id)
                .await?;
            activities::Entity::delete_by_id(activity.id)
                .exec(&db_tx)
                .await?;
            self.sync_trip_budget(&db_tx, &trip, false).await?;
            Ok(())
        })
    }
}
