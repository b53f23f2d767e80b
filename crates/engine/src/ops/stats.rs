use std::collections::{BTreeMap, HashMap};

use api_types::{
    stats::{CategoryCost, DayCost, StopCost, TripStats, UserStats},
    trip::TripStatus,
};
use chrono::NaiveDate;
use sea_orm::{
    DatabaseTransaction, LoaderTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Money, ResultEngine, activities, budgets, budgets::percentage, stops, trips,
    util::{model_currency, parse_uuid},
};

use super::{Engine, with_tx};

/// Most frequent value; ties go to the value seen first.
fn most_frequent<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, value) in values.into_iter().enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(_, (ca, pa)), (_, (cb, pb))| ca.cmp(cb).then(pb.cmp(pa)))
        .map(|(value, _)| value.to_string())
}

/// Most expensive day; the earliest one wins a tie.
fn most_expensive_day(days: &BTreeMap<NaiveDate, Money>) -> Option<DayCost> {
    let mut best: Option<(NaiveDate, Money)> = None;
    for (date, cost) in days {
        if best.is_none_or(|(_, top)| *cost > top) {
            best = Some((*date, *cost));
        }
    }
    best.map(|(date, cost)| DayCost {
        date,
        cost_minor: cost.minor(),
    })
}

impl Engine {
    pub(super) async fn compute_user_stats(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<UserStats> {
        let all_trips = trips::Entity::find()
            .filter(trips::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(trips::Column::StartDate)
            .order_by_asc(trips::Column::CreatedAt)
            .all(db)
            .await?;

        let mut stats = UserStats {
            total_trips: all_trips.len() as u64,
            ..Default::default()
        };
        let mut completed = Vec::new();
        for trip in all_trips {
            match trip.status()? {
                TripStatus::Completed => completed.push(trip),
                TripStatus::Upcoming => stats.upcoming_trips += 1,
                _ => {}
            }
        }
        stats.completed_trips = completed.len() as u64;
        if completed.is_empty() {
            return Ok(stats);
        }

        let trip_ids: Vec<String> = completed.iter().map(|t| t.id.clone()).collect();
        let stops_by_trip = completed
            .load_many(
                stops::Entity::find()
                    .order_by_asc(stops::Column::OrderIndex)
                    .order_by_asc(stops::Column::StartDate),
                db,
            )
            .await?;
        stats.total_destinations = stops_by_trip.iter().map(Vec::len).sum::<usize>() as u64;
        stats.total_activities = activities::Entity::find()
            .inner_join(stops::Entity)
            .filter(stops::Column::TripId.is_in(trip_ids))
            .count(db)
            .await?;

        let totals = completed
            .load_one(budgets::Entity, db)
            .await?
            .into_iter()
            .map(|budget| budget.map_or(Ok(Money::ZERO), |b| b.total_cost()))
            .collect::<ResultEngine<Vec<Money>>>()?;

        let spent = Money::try_sum(totals.iter().copied())?;
        stats.total_spent_minor = spent.minor();

        let total_days: i64 = completed.iter().map(trips::Model::duration_days).sum();
        stats.average_trip_duration_days = total_days as f64 / completed.len() as f64;

        stats.favorite_destination = most_frequent(
            stops_by_trip
                .iter()
                .flatten()
                .map(|s| s.country.as_str()),
        );

        let mut top: Option<(&trips::Model, Money)> = None;
        for (trip, &total) in completed.iter().zip(&totals) {
            if total > Money::ZERO && top.is_none_or(|(_, best)| total > best) {
                top = Some((trip, total));
            }
        }
        stats.most_expensive_trip = top.map(|(trip, _)| trip.name.clone());

        Ok(stats)
    }

    /// Travel statistics of `user_id` across the trips they own.
    pub async fn user_stats(&self, user_id: &str) -> ResultEngine<UserStats> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            self.compute_user_stats(&db_tx, user_id).await
        })
    }

    /// Cost breakdown of a trip by category, stop and day.
    pub async fn trip_stats(&self, trip_id: Uuid, user_id: &str) -> ResultEngine<TripStats> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_read(&db_tx, trip_id, user_id).await?;
            let budget = self.budget_or_create(&db_tx, &trip).await?;
            let total = budget.total_cost()?;

            let cost_by_category = budget
                .lines()
                .iter()
                .map(|line| CategoryCost {
                    category: line.category,
                    label: line.category.label().to_string(),
                    cost_minor: line.cost.minor(),
                })
                .collect();

            let trip_stops = self.ordered_stops(&db_tx, &trip.id).await?;
            let mut grouped = self
                .activities_by_stop(&db_tx, &trip_stops)
                .await?;
            let mut cost_by_stop = Vec::with_capacity(trip_stops.len());
            let mut days: BTreeMap<NaiveDate, Money> = BTreeMap::new();
            for stop in &trip_stops {
                let stop_activities = grouped.remove(&stop.id).unwrap_or_default();
                let stop_total = Money::try_sum(
                    stop.accommodation_cost_minor
                        .into_iter()
                        .chain(stop_activities.iter().filter_map(|a| a.cost_minor))
                        .map(Money::new),
                )?;
                let day = days.entry(stop.start_date).or_default();
                *day = Money::try_sum([*day, stop_total])?;
                cost_by_stop.push(StopCost {
                    stop_id: parse_uuid(&stop.id, "stop")?,
                    city_name: stop.city_name.clone(),
                    country: stop.country.clone(),
                    cost_minor: stop_total.minor(),
                });
            }

            let duration_days = trip.duration_days();
            let budget_utilization = budget
                .total_limit()?
                .filter(|limit| !limit.is_zero())
                .map(|limit| percentage(total, limit));

            Ok(TripStats {
                trip_id: parse_uuid(&trip.id, "trip")?,
                currency: model_currency(&trip.currency)?,
                total_cost_minor: total.minor(),
                cost_by_category,
                cost_by_stop,
                duration_days,
                daily_average_minor: if duration_days > 0 {
                    total.minor() / duration_days
                } else {
                    0
                },
                most_expensive_day: most_expensive_day(&days),
                budget_utilization,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_frequent_breaks_ties_by_first_seen() {
        assert_eq!(
            most_frequent(["Italy", "France", "France", "Italy"]),
            Some("Italy".to_string())
        );
        assert_eq!(
            most_frequent(["Spain", "Italy", "Italy"]),
            Some("Italy".to_string())
        );
        assert_eq!(most_frequent(Vec::<&str>::new()), None);
    }

    #[test]
    fn earliest_day_wins_a_tie() {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let days = BTreeMap::from([(d1, Money::new(300)), (d2, Money::new(300))]);
        assert_eq!(
            most_expensive_day(&days),
            Some(DayCost {
                date: d1,
                cost_minor: 300
            })
        );
        assert_eq!(most_expensive_day(&BTreeMap::new()), None);
    }
}
