use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, double_option};

string_enum! {
    /// The six cost categories tracked by a budget.
    pub enum BudgetCategory("budget category") {
        Transport => "transport",
        Stay => "stay",
        Activity => "activity",
        Meal => "meal",
        Shopping => "shopping",
        Miscellaneous => "miscellaneous",
    }
}

impl BudgetCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Transport => "Transport",
            Self::Stay => "Accommodation",
            Self::Activity => "Activities",
            Self::Meal => "Meals",
            Self::Shopping => "Shopping",
            Self::Miscellaneous => "Miscellaneous",
        }
    }
}

string_enum! {
    pub enum AlertLevel("alert level") {
        Danger => "danger",
        Warning => "warning",
        Info => "info",
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetView {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub currency: Currency,
    pub transport_cost_minor: i64,
    pub stay_cost_minor: i64,
    pub activity_cost_minor: i64,
    pub meal_cost_minor: i64,
    pub shopping_cost_minor: i64,
    pub miscellaneous_cost_minor: i64,
    pub transport_limit_minor: Option<i64>,
    pub stay_limit_minor: Option<i64>,
    pub activity_limit_minor: Option<i64>,
    pub meal_limit_minor: Option<i64>,
    pub shopping_limit_minor: Option<i64>,
    pub miscellaneous_limit_minor: Option<i64>,
    /// Sum of the six category costs.
    pub total_cost_minor: i64,
    /// Sum of the non-null limits, `None` when no limit is set.
    pub total_limit_minor: Option<i64>,
    pub is_over_budget: bool,
    /// Row version; send it back in [`BudgetUpdate::version`] to detect
    /// concurrent edits.
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

/// Partial budget update.
///
/// `stay_cost_minor` and `activity_cost_minor` are overwritten by the next
/// recalculation when the trip has automatic budget calculation enabled.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BudgetUpdate {
    #[serde(default)]
    pub transport_cost_minor: Option<i64>,
    #[serde(default)]
    pub stay_cost_minor: Option<i64>,
    #[serde(default)]
    pub activity_cost_minor: Option<i64>,
    #[serde(default)]
    pub meal_cost_minor: Option<i64>,
    #[serde(default)]
    pub shopping_cost_minor: Option<i64>,
    #[serde(default)]
    pub miscellaneous_cost_minor: Option<i64>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub transport_limit_minor: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub stay_limit_minor: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_limit_minor: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub meal_limit_minor: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub shopping_limit_minor: Option<Option<i64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub miscellaneous_limit_minor: Option<Option<i64>>,
    /// Expected current version; a mismatch is rejected as a conflict.
    #[serde(default)]
    pub version: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: BudgetCategory,
    pub label: String,
    pub cost_minor: i64,
    pub limit_minor: Option<i64>,
    /// Share of the total cost, in percent.
    pub percentage: f64,
    pub is_over_limit: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetAlert {
    pub level: AlertLevel,
    pub category: Option<BudgetCategory>,
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub budget: BudgetView,
    pub breakdown: Vec<CategoryBreakdown>,
    pub alerts: Vec<BudgetAlert>,
    /// `total_limit - total_cost`, negative when over budget.
    pub remaining_minor: Option<i64>,
    /// Total cost as a percentage of the total limit.
    pub utilization: Option<f64>,
}
