//! The module contains the budget table and the pure budget arithmetic.
//!
//! A budget holds six category costs and six optional limits. The totals are
//! derived, never stored:
//!
//! - `total_cost` is the sum of the six costs
//! - `total_limit` is the sum of the non-null limits, `None` when all limits
//!   are null
//! - the budget is over when a total limit exists and `total_cost` exceeds it
//!
//! `stay_cost_minor` and `activity_cost_minor` are denormalised from the
//! stops and activities of the trip, see [`aggregate_costs`].

use api_types::budget::{
    AlertLevel, BudgetAlert, BudgetCategory, BudgetSummary, BudgetView, CategoryBreakdown,
};
use sea_orm::entity::prelude::*;

use crate::{
    EngineError, Money, ResultEngine,
    util::{model_currency, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub trip_id: String,
    pub currency: String,
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
    pub updated_at: DateTimeUtc,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trips::Entity",
        from = "Column::TripId",
        to = "super::trips::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Trip,
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Cost and optional limit of one budget category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryLine {
    pub category: BudgetCategory,
    pub cost: Money,
    pub limit: Option<Money>,
}

impl Model {
    /// The six categories in display order.
    pub fn lines(&self) -> [CategoryLine; 6] {
        let line = |category, cost: i64, limit: Option<i64>| CategoryLine {
            category,
            cost: Money::new(cost),
            limit: limit.map(Money::new),
        };
        [
            line(
                BudgetCategory::Transport,
                self.transport_cost_minor,
                self.transport_limit_minor,
            ),
            line(
                BudgetCategory::Stay,
                self.stay_cost_minor,
                self.stay_limit_minor,
            ),
            line(
                BudgetCategory::Activity,
                self.activity_cost_minor,
                self.activity_limit_minor,
            ),
            line(
                BudgetCategory::Meal,
                self.meal_cost_minor,
                self.meal_limit_minor,
            ),
            line(
                BudgetCategory::Shopping,
                self.shopping_cost_minor,
                self.shopping_limit_minor,
            ),
            line(
                BudgetCategory::Miscellaneous,
                self.miscellaneous_cost_minor,
                self.miscellaneous_limit_minor,
            ),
        ]
    }

    pub fn total_cost(&self) -> ResultEngine<Money> {
        Money::try_sum(self.lines().iter().map(|l| l.cost))
    }

    pub fn total_limit(&self) -> ResultEngine<Option<Money>> {
        let limits: Vec<Money> = self.lines().iter().filter_map(|l| l.limit).collect();
        if limits.is_empty() {
            return Ok(None);
        }
        Money::try_sum(limits).map(Some)
    }

    pub fn is_over_budget(&self) -> ResultEngine<bool> {
        let total = self.total_cost()?;
        Ok(self.total_limit()?.is_some_and(|limit| total > limit))
    }

    pub(crate) fn to_view(&self) -> ResultEngine<BudgetView> {
        let total_cost = self.total_cost()?;
        let total_limit = self.total_limit()?;
        Ok(BudgetView {
            id: parse_uuid(&self.id, "budget")?,
            trip_id: parse_uuid(&self.trip_id, "trip")?,
            currency: model_currency(&self.currency)?,
            transport_cost_minor: self.transport_cost_minor,
            stay_cost_minor: self.stay_cost_minor,
            activity_cost_minor: self.activity_cost_minor,
            meal_cost_minor: self.meal_cost_minor,
            shopping_cost_minor: self.shopping_cost_minor,
            miscellaneous_cost_minor: self.miscellaneous_cost_minor,
            transport_limit_minor: self.transport_limit_minor,
            stay_limit_minor: self.stay_limit_minor,
            activity_limit_minor: self.activity_limit_minor,
            meal_limit_minor: self.meal_limit_minor,
            shopping_limit_minor: self.shopping_limit_minor,
            miscellaneous_limit_minor: self.miscellaneous_limit_minor,
            total_cost_minor: total_cost.minor(),
            total_limit_minor: total_limit.map(Money::minor),
            is_over_budget: total_limit.is_some_and(|limit| total_cost > limit),
            version: self.version,
            updated_at: self.updated_at,
        })
    }

    /// Breakdown with percentages and the alert list.
    pub(crate) fn summary(&self) -> ResultEngine<BudgetSummary> {
        let view = self.to_view()?;
        let currency = view.currency;
        let total_cost = Money::new(view.total_cost_minor);
        let total_limit = view.total_limit_minor.map(Money::new);

        let mut alerts = Vec::new();
        if let Some(limit) = total_limit
            && total_cost > limit
        {
            let over = total_cost
                .checked_sub(limit)
                .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;
            alerts.push(BudgetAlert {
                level: AlertLevel::Danger,
                category: None,
                message: format!("Budget exceeded by {}", over.display(currency)),
            });
        }

        let mut breakdown = Vec::with_capacity(6);
        for line in self.lines() {
            let is_over_limit = line.limit.is_some_and(|limit| line.cost > limit);
            breakdown.push(CategoryBreakdown {
                category: line.category,
                label: line.category.label().to_string(),
                cost_minor: line.cost.minor(),
                limit_minor: line.limit.map(Money::minor),
                percentage: percentage(line.cost, total_cost),
                is_over_limit,
            });

            let Some(limit) = line.limit.filter(|l| !l.is_zero()) else {
                if is_over_limit {
                    alerts.push(category_exceeded(line, line.cost, currency));
                }
                continue;
            };
            if is_over_limit {
                let over = line
                    .cost
                    .checked_sub(limit)
                    .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))?;
                alerts.push(category_exceeded(line, over, currency));
            } else if above_warning_threshold(line.cost, limit) {
                alerts.push(BudgetAlert {
                    level: AlertLevel::Info,
                    category: Some(line.category),
                    message: format!(
                        "{} budget at {:.1}% of limit",
                        line.category.label(),
                        percentage(line.cost, limit)
                    ),
                });
            }
        }

        let remaining_minor = total_limit
            .map(|limit| {
                limit
                    .checked_sub(total_cost)
                    .map(Money::minor)
                    .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))
            })
            .transpose()?;
        let utilization = total_limit
            .filter(|l| !l.is_zero())
            .map(|limit| percentage(total_cost, limit));

        Ok(BudgetSummary {
            budget: view,
            breakdown,
            alerts,
            remaining_minor,
            utilization,
        })
    }
}

fn category_exceeded(line: CategoryLine, over: Money, currency: api_types::Currency) -> BudgetAlert {
    BudgetAlert {
        level: AlertLevel::Warning,
        category: Some(line.category),
        message: format!(
            "{} budget exceeded by {}",
            line.category.label(),
            over.display(currency)
        ),
    }
}

/// `cost > 80% of limit`, computed without floats.
fn above_warning_threshold(cost: Money, limit: Money) -> bool {
    i128::from(cost.minor()) * 5 > i128::from(limit.minor()) * 4
}

/// `part / whole * 100`, 0 when `whole` is 0.
pub(crate) fn percentage(part: Money, whole: Money) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    part.minor() as f64 / whole.minor() as f64 * 100.0
}

/// Stay and activity totals derived from a trip's stops and activities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CostTotals {
    pub stay: Money,
    pub activity: Money,
}

/// Sums accommodation costs into `stay` and activity costs into `activity`;
/// missing costs count as zero.
pub fn aggregate_costs<S, A>(accommodation_costs: S, activity_costs: A) -> ResultEngine<CostTotals>
where
    S: IntoIterator<Item = Option<i64>>,
    A: IntoIterator<Item = Option<i64>>,
{
    Ok(CostTotals {
        stay: Money::try_sum(accommodation_costs.into_iter().flatten().map(Money::new))?,
        activity: Money::try_sum(activity_costs.into_iter().flatten().map(Money::new))?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn budget() -> Model {
        Model {
            id: "7a0c1d3e-8f4b-4a26-9d0e-2b5c6f7a8e91".to_string(),
            trip_id: "1b2c3d4e-5f60-4718-8a9b-0c1d2e3f4a5b".to_string(),
            currency: "USD".to_string(),
            transport_cost_minor: 0,
            stay_cost_minor: 0,
            activity_cost_minor: 0,
            meal_cost_minor: 0,
            shopping_cost_minor: 0,
            miscellaneous_cost_minor: 0,
            transport_limit_minor: None,
            stay_limit_minor: None,
            activity_limit_minor: None,
            meal_limit_minor: None,
            shopping_limit_minor: None,
            miscellaneous_limit_minor: None,
            updated_at: Utc::now(),
            version: 0,
        }
    }

    #[test]
    fn total_cost_sums_all_categories() {
        let model = Model {
            transport_cost_minor: 100,
            stay_cost_minor: 20_000,
            activity_cost_minor: 5_000,
            meal_cost_minor: 300,
            shopping_cost_minor: 40,
            miscellaneous_cost_minor: 5,
            ..budget()
        };
        assert_eq!(model.total_cost().unwrap().minor(), 25_445);
    }

    #[test]
    fn total_limit_is_none_without_limits() {
        let model = budget();
        assert_eq!(model.total_limit().unwrap(), None);
        assert!(!model.is_over_budget().unwrap());
    }

    #[test]
    fn over_budget_requires_strictly_greater_total() {
        let at_limit = Model {
            stay_cost_minor: 1_000,
            stay_limit_minor: Some(600),
            meal_limit_minor: Some(400),
            ..budget()
        };
        assert_eq!(at_limit.total_limit().unwrap(), Some(Money::new(1_000)));
        assert!(!at_limit.is_over_budget().unwrap());

        let over = Model {
            stay_cost_minor: 1_001,
            ..at_limit
        };
        assert!(over.is_over_budget().unwrap());
    }

    #[test]
    fn summary_raises_alerts_per_threshold() {
        let model = Model {
            transport_cost_minor: 1_500,
            transport_limit_minor: Some(1_000),
            meal_cost_minor: 850,
            meal_limit_minor: Some(1_000),
            shopping_cost_minor: 800,
            shopping_limit_minor: Some(1_000),
            ..budget()
        };
        let summary = model.summary().unwrap();

        // total 3150 > limit 3000
        assert_eq!(summary.alerts[0].level, AlertLevel::Danger);
        assert_eq!(summary.alerts[0].message, "Budget exceeded by 1.50 USD");

        let transport = &summary.alerts[1];
        assert_eq!(transport.level, AlertLevel::Warning);
        assert_eq!(transport.category, Some(BudgetCategory::Transport));
        assert_eq!(transport.message, "Transport budget exceeded by 5.00 USD");

        let meal = &summary.alerts[2];
        assert_eq!(meal.level, AlertLevel::Info);
        assert_eq!(meal.message, "Meals budget at 85.0% of limit");

        // exactly 80% does not warn
        assert_eq!(summary.alerts.len(), 3);
        assert_eq!(summary.remaining_minor, Some(-150));
    }

    #[test]
    fn breakdown_percentages_sum_to_hundred() {
        let model = Model {
            transport_cost_minor: 250,
            stay_cost_minor: 750,
            ..budget()
        };
        let summary = model.summary().unwrap();
        let total: f64 = summary.breakdown.iter().map(|b| b.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(summary.breakdown[1].percentage, 75.0);
        assert_eq!(summary.utilization, None);
    }

    #[test]
    fn aggregate_ignores_missing_costs() {
        let totals =
            aggregate_costs([Some(20_000), None, Some(5)], [Some(5_000), None]).unwrap();
        assert_eq!(totals.stay.minor(), 20_005);
        assert_eq!(totals.activity.minor(), 5_000);

        let empty = aggregate_costs([], []).unwrap();
        assert_eq!(empty, CostTotals::default());
    }
}
