use api_types::{
    activity::ActivityNew,
    stop::StopNew,
    template::{
        TemplateActivity, TemplateData, TemplateFromTrip, TemplateNew, TemplateStop,
        TemplateUse, TemplateView,
    },
    trip::{TripNew, TripStatus, TripView},
};
use chrono::{Days, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, trip_templates,
    util::{model_currency, validate_money},
};

use super::{
    Engine, activities::activity_model, normalize_optional_text, normalize_required_name,
    stops::stop_model, trips::trip_model, with_tx,
};

fn template_not_found() -> EngineError {
    EngineError::KeyNotFound("template not exists".to_string())
}

fn to_i32(field: &str, value: u32) -> ResultEngine<i32> {
    i32::try_from(value).map_err(|_| EngineError::invalid(field, "too large"))
}

fn shift(date: NaiveDate, days: u32, field: &str) -> ResultEngine<NaiveDate> {
    date.checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| EngineError::invalid(field, "date out of range"))
}

/// Last day of a trip that starts on `start` and lasts `duration_days`.
fn end_date(start: NaiveDate, duration_days: u32) -> ResultEngine<NaiveDate> {
    shift(start, duration_days.saturating_sub(1), "duration_days")
}

fn validate_template_data(data: &TemplateData) -> ResultEngine<()> {
    for stop in &data.stops {
        normalize_required_name(&stop.city_name, "city_name")?;
        normalize_required_name(&stop.country, "country")?;
        validate_money("accommodation_cost_minor", stop.accommodation_cost_minor)?;
        for activity in &stop.activities {
            normalize_required_name(&activity.name, "name")?;
            validate_money("cost_minor", activity.cost_minor)?;
        }
    }
    Ok(())
}

impl Engine {
    /// Template visible to `user_id`: its own or a public one.
    async fn require_template_visible(
        &self,
        db: &DatabaseTransaction,
        template_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<trip_templates::Model> {
        trip_templates::Entity::find_by_id(template_id.to_string())
            .one(db)
            .await?
            .filter(|t| t.is_public || t.created_by == user_id)
            .ok_or_else(template_not_found)
    }

    /// Own and public templates, most used first.
    pub async fn list_templates(&self, user_id: &str) -> ResultEngine<Vec<TemplateView>> {
        with_tx!(self, |db_tx| {
            trip_templates::Entity::find()
                .filter(
                    Condition::any()
                        .add(trip_templates::Column::CreatedBy.eq(user_id.to_string()))
                        .add(trip_templates::Column::IsPublic.eq(true)),
                )
                .order_by_desc(trip_templates::Column::UseCount)
                .order_by_desc(trip_templates::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .iter()
                .map(trip_templates::Model::to_view)
                .collect()
        })
    }

    pub async fn new_template(
        &self,
        user_id: &str,
        new: TemplateNew,
    ) -> ResultEngine<TemplateView> {
        let name = normalize_required_name(&new.name, "name")?;
        validate_template_data(&new.template_data)?;
        let estimated = validate_money("estimated_budget_minor", new.estimated_budget_minor)?;
        let duration = to_i32("duration_days", new.duration_days)?;
        let data = serde_json::to_value(&new.template_data)
            .map_err(|err| EngineError::invalid("template_data", err.to_string()))?;
        let now = Utc::now();
        let template = trip_templates::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            created_by: ActiveValue::Set(user_id.to_string()),
            name: ActiveValue::Set(name),
            description: ActiveValue::Set(normalize_optional_text(new.description.as_deref())),
            category: ActiveValue::Set(normalize_optional_text(new.category.as_deref())),
            template_data: ActiveValue::Set(data),
            duration_days: ActiveValue::Set(duration),
            estimated_budget_minor: ActiveValue::Set(estimated),
            currency: ActiveValue::Set(new.currency.unwrap_or_default().code().to_string()),
            difficulty: ActiveValue::Set(new.difficulty.unwrap_or_default().as_str().to_string()),
            is_public: ActiveValue::Set(new.is_public.unwrap_or(false)),
            use_count: ActiveValue::Set(0),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            template.insert(&db_tx).await?.to_view()
        })
    }

    /// Snapshot a trip into a template. Stop dates become offsets from the
    /// trip start; booking state is not kept.
    pub async fn template_from_trip(
        &self,
        trip_id: Uuid,
        user_id: &str,
        request: TemplateFromTrip,
    ) -> ResultEngine<TemplateView> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_read(&db_tx, trip_id, user_id).await?;
            let trip_stops = self.ordered_stops(&db_tx, &trip.id).await?;
            let mut grouped = self
                .activities_by_stop(&db_tx, &trip_stops)
                .await?;

            let mut stops = Vec::with_capacity(trip_stops.len());
            for stop in trip_stops {
                let day_offset = (stop.start_date - trip.start_date).num_days().max(0);
                let nights = (stop.end_date - stop.start_date).num_days().max(0);
                let activities = grouped
                    .remove(&stop.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|a| {
                        Ok(TemplateActivity {
                            category: a.category()?,
                            name: a.name,
                            description: a.description,
                            cost_minor: a.cost_minor,
                            duration_minutes: a
                                .duration_minutes
                                .and_then(|m| u32::try_from(m).ok()),
                            priority: u8::try_from(a.priority).ok(),
                        })
                    })
                    .collect::<ResultEngine<Vec<_>>>()?;
                stops.push(TemplateStop {
                    city_name: stop.city_name,
                    country: stop.country,
                    day_offset: u32::try_from(day_offset).unwrap_or(u32::MAX),
                    nights: u32::try_from(nights).unwrap_or(u32::MAX),
                    notes: stop.notes,
                    accommodation_name: stop.accommodation_name,
                    accommodation_cost_minor: stop.accommodation_cost_minor,
                    activities,
                });
            }
            let data = serde_json::to_value(TemplateData { stops })
                .map_err(|err| EngineError::invalid("template_data", err.to_string()))?;

            let name = match request.name.as_deref() {
                Some(name) => normalize_required_name(name, "name")?,
                None => trip.name.clone(),
            };
            let budget = self.budget_or_create(&db_tx, &trip).await?;
            let total = budget.total_cost()?;
            let estimated = if total.is_zero() {
                trip.estimated_budget_minor
            } else {
                Some(total.minor())
            };
            let duration = i32::try_from(trip.duration_days())
                .map_err(|_| EngineError::invalid("duration_days", "too large"))?;
            let now = Utc::now();
            let template = trip_templates::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                created_by: ActiveValue::Set(user_id.to_string()),
                name: ActiveValue::Set(name),
                description: ActiveValue::Set(
                    normalize_optional_text(request.description.as_deref())
                        .or(trip.description.clone()),
                ),
                category: ActiveValue::Set(normalize_optional_text(request.category.as_deref())),
                template_data: ActiveValue::Set(data),
                duration_days: ActiveValue::Set(duration),
                estimated_budget_minor: ActiveValue::Set(estimated),
                currency: ActiveValue::Set(trip.currency.clone()),
                difficulty: ActiveValue::Set(
                    request.difficulty.unwrap_or_default().as_str().to_string(),
                ),
                is_public: ActiveValue::Set(request.is_public.unwrap_or(false)),
                use_count: ActiveValue::Set(0),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            template.insert(&db_tx).await?.to_view()
        })
    }

    pub async fn template(&self, template_id: Uuid, user_id: &str) -> ResultEngine<TemplateView> {
        with_tx!(self, |db_tx| {
            self.require_template_visible(&db_tx, template_id, user_id)
                .await?
                .to_view()
        })
    }

    /// Delete a template. Creator only.
    pub async fn delete_template(&self, template_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let template = self
                .require_template_visible(&db_tx, template_id, user_id)
                .await?;
            if template.created_by != user_id {
                return Err(EngineError::Forbidden(
                    "only the creator can delete a template".to_string(),
                ));
            }
            trip_templates::Entity::delete_by_id(template.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Create a trip from a template starting on `request.start_date`.
    pub async fn use_template(
        &self,
        template_id: Uuid,
        user_id: &str,
        request: TemplateUse,
    ) -> ResultEngine<TripView> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let template = self
                .require_template_visible(&db_tx, template_id, user_id)
                .await?;
            let data = template.data()?;
            let duration = u32::try_from(template.duration_days).unwrap_or(0);
            let name = request.name.clone().unwrap_or_else(|| template.name.clone());

            let trip = trip_model(
                user_id,
                TripNew {
                    name,
                    description: template.description.clone(),
                    start_date: request.start_date,
                    end_date: end_date(request.start_date, duration)?,
                    cover_image_url: None,
                    is_public: Some(false),
                    status: Some(TripStatus::Planning),
                    estimated_budget_minor: template.estimated_budget_minor,
                    currency: Some(model_currency(&template.currency)?),
                    collaborators_can_edit: Some(false),
                    auto_calculate_budget: Some(true),
                },
            )?;
            let trip = self.insert_trip(&db_tx, trip).await?;

            for (index, stop) in data.stops.into_iter().enumerate() {
                let start_date = shift(request.start_date, stop.day_offset, "day_offset")?;
                let new_stop = StopNew {
                    city_name: stop.city_name,
                    country: stop.country,
                    start_date,
                    end_date: shift(start_date, stop.nights, "nights")?,
                    order_index: Some(i32::try_from(index).unwrap_or(i32::MAX)),
                    latitude: None,
                    longitude: None,
                    timezone: None,
                    notes: stop.notes,
                    accommodation_name: stop.accommodation_name,
                    accommodation_address: None,
                    accommodation_cost_minor: stop.accommodation_cost_minor,
                };
                let saved = stop_model(&trip.id, new_stop)?.insert(&db_tx).await?;
                for activity in stop.activities {
                    let new_activity = ActivityNew {
                        category: Some(activity.category),
                        description: activity.description,
                        cost_minor: activity.cost_minor,
                        duration_minutes: activity.duration_minutes,
                        priority: activity.priority,
                        ..ActivityNew::named(activity.name)
                    };
                    activity_model(&saved.id, new_activity)?
                        .insert(&db_tx)
                        .await?;
                }
            }
            self.sync_trip_budget(&db_tx, &trip, true).await?;

            trip_templates::Entity::update_many()
                .col_expr(
                    trip_templates::Column::UseCount,
                    Expr::col(trip_templates::Column::UseCount).add(1),
                )
                .filter(trip_templates::Column::Id.eq(template.id))
                .exec(&db_tx)
                .await?;
            trip.to_view()
        })
    }
}

#[cfg(test)]
mod tests {
    use api_types::activity::ActivityCategory;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn end_date_counts_the_start_day() {
        assert_eq!(end_date(date("2024-05-01"), 3).unwrap(), date("2024-05-03"));
        assert_eq!(end_date(date("2024-05-01"), 1).unwrap(), date("2024-05-01"));
        assert_eq!(end_date(date("2024-05-01"), 0).unwrap(), date("2024-05-01"));
    }

    #[test]
    fn template_data_rejects_blank_names() {
        let data = TemplateData {
            stops: vec![TemplateStop {
                city_name: "Lisbon".to_string(),
                country: "Portugal".to_string(),
                day_offset: 0,
                nights: 2,
                notes: None,
                accommodation_name: None,
                accommodation_cost_minor: Some(10_000),
                activities: vec![TemplateActivity {
                    name: "  ".to_string(),
                    category: ActivityCategory::Food,
                    description: None,
                    cost_minor: None,
                    duration_minutes: None,
                    priority: None,
                }],
            }],
        };
        assert_eq!(
            validate_template_data(&data),
            Err(EngineError::invalid("name", "must not be empty"))
        );
    }
}
