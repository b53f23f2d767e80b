use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, budget::BudgetCategory};

/// Travel statistics of the requesting user.
///
/// Destination, activity, spending and duration figures only consider
/// completed trips. `total_spent_minor` adds budget totals as stored, without
/// currency conversion.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_trips: u64,
    pub completed_trips: u64,
    pub upcoming_trips: u64,
    pub total_destinations: u64,
    pub total_activities: u64,
    pub total_spent_minor: i64,
    pub average_trip_duration_days: f64,
    /// Most visited country among completed trips.
    pub favorite_destination: Option<String>,
    pub most_expensive_trip: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryCost {
    pub category: BudgetCategory,
    pub label: String,
    pub cost_minor: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StopCost {
    pub stop_id: Uuid,
    pub city_name: String,
    pub country: String,
    /// Accommodation plus activities of the stop.
    pub cost_minor: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCost {
    pub date: NaiveDate,
    pub cost_minor: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripStats {
    pub trip_id: Uuid,
    pub currency: Currency,
    pub total_cost_minor: i64,
    pub cost_by_category: Vec<CategoryCost>,
    pub cost_by_stop: Vec<StopCost>,
    pub duration_days: i64,
    pub daily_average_minor: i64,
    pub most_expensive_day: Option<DayCost>,
    /// Total cost as a percentage of the total limit, when limits are set.
    pub budget_utilization: Option<f64>,
}
