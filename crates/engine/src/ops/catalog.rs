use api_types::catalog::{
    ActivitySearch, CatalogActivityNew, CatalogActivityView, CitySearch, CityNew, CityView,
};
use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
    sea_query::{Expr, Func, SimpleExpr},
};
use uuid::Uuid;

use crate::{
    Currency, EngineError, ResultEngine, activity_catalog, cities,
    util::{normalize_timezone, validate_coordinates, validate_money},
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

const CITY_SEARCH_LIMIT: u64 = 10;
const ACTIVITY_SEARCH_LIMIT: u64 = 20;
const SEARCH_LIMIT_MAX: u64 = 100;
const ATTRACTIONS_SHOWN: usize = 3;

/// `LOWER(column) LIKE '%needle%'` with `needle` already lowercased.
fn contains<C: ColumnTrait>(column: C, needle: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{needle}%"))
}

fn search_term(value: Option<&str>) -> Option<String> {
    normalize_optional_text(value).map(|s| s.to_lowercase())
}

fn effective_limit(requested: Option<u64>, default: u64) -> u64 {
    requested
        .filter(|l| *l > 0)
        .unwrap_or(default)
        .min(SEARCH_LIMIT_MAX)
}

fn string_array(values: Vec<String>) -> Json {
    Json::Array(
        values
            .into_iter()
            .filter_map(|v| normalize_optional_text(Some(&v)))
            .map(Json::String)
            .collect(),
    )
}

impl Engine {
    /// Catalog cities whose name or country contains `query`.
    pub async fn search_cities(&self, search: CitySearch) -> ResultEngine<Vec<CityView>> {
        let limit = effective_limit(search.limit, CITY_SEARCH_LIMIT);
        with_tx!(self, |db_tx| {
            let mut select = cities::Entity::find();
            if let Some(term) = search_term(search.query.as_deref()) {
                select = select.filter(
                    Condition::any()
                        .add(contains(cities::Column::Name, &term))
                        .add(contains(cities::Column::Country, &term)),
                );
            }
            select
                .order_by_asc(cities::Column::Country)
                .order_by_asc(cities::Column::Name)
                .limit(limit)
                .all(&db_tx)
                .await?
                .iter()
                .map(|city| {
                    let mut view = city.to_view()?;
                    view.popular_attractions.truncate(ATTRACTIONS_SHOWN);
                    Ok(view)
                })
                .collect()
        })
    }

    /// Verified catalog activities, best rated first.
    pub async fn search_activities(
        &self,
        search: ActivitySearch,
    ) -> ResultEngine<Vec<CatalogActivityView>> {
        let limit = effective_limit(search.limit, ACTIVITY_SEARCH_LIMIT);
        with_tx!(self, |db_tx| {
            let mut select = activity_catalog::Entity::find()
                .filter(activity_catalog::Column::IsVerified.eq(true));
            if let Some(term) = search_term(search.query.as_deref()) {
                select = select.filter(
                    Condition::any()
                        .add(contains(activity_catalog::Column::Name, &term))
                        .add(contains(activity_catalog::Column::Description, &term)),
                );
            }
            if let Some(city) = search_term(search.city.as_deref()) {
                select = select.filter(contains(activity_catalog::Column::CityName, &city));
            }
            if let Some(category) = search.category {
                select = select.filter(activity_catalog::Column::Category.eq(category.as_str()));
            }
            if let Some(min) = search.min_cost_minor {
                select = select.filter(activity_catalog::Column::AverageCostMinor.gte(min));
            }
            if let Some(max) = search.max_cost_minor {
                select = select.filter(activity_catalog::Column::AverageCostMinor.lte(max));
            }
            select
                .order_by_desc(activity_catalog::Column::Rating)
                .order_by_desc(activity_catalog::Column::ReviewCount)
                .order_by_asc(activity_catalog::Column::Name)
                .limit(limit)
                .all(&db_tx)
                .await?
                .iter()
                .map(activity_catalog::Model::to_view)
                .collect()
        })
    }

    /// Add a city to the catalog. Name and country are unique together.
    pub async fn insert_city(&self, new: CityNew) -> ResultEngine<CityView> {
        let name = normalize_required_name(&new.name, "name")?;
        let country = normalize_required_name(&new.country, "country")?;
        let country_code = normalize_required_name(&new.country_code, "country_code")?;
        validate_coordinates(new.latitude, new.longitude)?;
        let timezone = normalize_timezone(new.timezone.as_deref())?;
        if let Some(rating) = new.safety_rating
            && !(1..=10).contains(&rating)
        {
            return Err(EngineError::invalid(
                "safety_rating",
                "must be between 1 and 10",
            ));
        }

        with_tx!(self, |db_tx| {
            let duplicate = cities::Entity::find()
                .filter(cities::Column::Name.eq(name.clone()))
                .filter(cities::Column::Country.eq(country.clone()))
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::ExistingKey(format!("{name}, {country}")));
            }
            let model = cities::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                name: ActiveValue::Set(name),
                country: ActiveValue::Set(country),
                country_code: ActiveValue::Set(country_code.to_uppercase()),
                latitude: ActiveValue::Set(new.latitude),
                longitude: ActiveValue::Set(new.longitude),
                timezone: ActiveValue::Set(timezone),
                population: ActiveValue::Set(new.population),
                currency: ActiveValue::Set(normalize_optional_text(new.currency.as_deref())),
                language: ActiveValue::Set(normalize_optional_text(new.language.as_deref())),
                description: ActiveValue::Set(normalize_optional_text(new.description.as_deref())),
                best_time_to_visit: ActiveValue::Set(normalize_optional_text(
                    new.best_time_to_visit.as_deref(),
                )),
                average_temperature: ActiveValue::Set(new.average_temperature),
                popular_attractions: ActiveValue::Set(string_array(new.popular_attractions)),
                travel_tips: ActiveValue::Set(string_array(new.travel_tips)),
                safety_rating: ActiveValue::Set(new.safety_rating.map(i32::from)),
                cost_level: ActiveValue::Set(new.cost_level.map(|c| c.as_str().to_string())),
                image_url: ActiveValue::Set(normalize_optional_text(new.image_url.as_deref())),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            model.to_view()
        })
    }

    /// Add a bookable activity to the catalog.
    pub async fn insert_catalog_activity(
        &self,
        new: CatalogActivityNew,
    ) -> ResultEngine<CatalogActivityView> {
        let name = normalize_required_name(&new.name, "name")?;
        let city_name = normalize_required_name(&new.city_name, "city_name")?;
        let country = normalize_required_name(&new.country, "country")?;
        let average = validate_money("average_cost_minor", new.average_cost_minor)?;
        let range_min = validate_money("cost_range_min_minor", new.cost_range_min_minor)?;
        let range_max = validate_money("cost_range_max_minor", new.cost_range_max_minor)?;
        if let (Some(min), Some(max)) = (range_min, range_max)
            && min > max
        {
            return Err(EngineError::invalid(
                "cost_range_max_minor",
                "must not be below the minimum",
            ));
        }
        if let Some(rating) = new.rating
            && !(0.0..=5.0).contains(&rating)
        {
            return Err(EngineError::invalid("rating", "must be between 0 and 5"));
        }
        let duration = new
            .estimated_duration_minutes
            .map(|m| {
                i32::try_from(m)
                    .map_err(|_| EngineError::invalid("estimated_duration_minutes", "too large"))
            })
            .transpose()?;
        let currency = normalize_optional_text(new.currency.as_deref())
            .map(|c| c.to_uppercase())
            .unwrap_or_else(|| Currency::default().code().to_string());

        with_tx!(self, |db_tx| {
            let model = activity_catalog::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                name: ActiveValue::Set(name),
                category: ActiveValue::Set(new.category.as_str().to_string()),
                description: ActiveValue::Set(normalize_optional_text(new.description.as_deref())),
                city_name: ActiveValue::Set(city_name),
                country: ActiveValue::Set(country),
                location_name: ActiveValue::Set(normalize_optional_text(
                    new.location_name.as_deref(),
                )),
                address: ActiveValue::Set(normalize_optional_text(new.address.as_deref())),
                average_cost_minor: ActiveValue::Set(average),
                cost_range_min_minor: ActiveValue::Set(range_min),
                cost_range_max_minor: ActiveValue::Set(range_max),
                currency: ActiveValue::Set(currency),
                estimated_duration_minutes: ActiveValue::Set(duration),
                difficulty: ActiveValue::Set(new.difficulty.map(|d| d.as_str().to_string())),
                booking_required: ActiveValue::Set(new.booking_required),
                rating: ActiveValue::Set(new.rating),
                review_count: ActiveValue::Set(new.review_count.max(0)),
                image_urls: ActiveValue::Set(string_array(new.image_urls)),
                tags: ActiveValue::Set(string_array(new.tags)),
                is_verified: ActiveValue::Set(new.is_verified),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            model.to_view()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_falls_back_and_is_capped() {
        assert_eq!(effective_limit(None, CITY_SEARCH_LIMIT), 10);
        assert_eq!(effective_limit(Some(0), ACTIVITY_SEARCH_LIMIT), 20);
        assert_eq!(effective_limit(Some(5), CITY_SEARCH_LIMIT), 5);
        assert_eq!(effective_limit(Some(10_000), CITY_SEARCH_LIMIT), SEARCH_LIMIT_MAX);
    }

    #[test]
    fn search_term_is_trimmed_and_lowercased() {
        assert_eq!(search_term(Some("  PaRis ")), Some("paris".to_string()));
        assert_eq!(search_term(Some("   ")), None);
    }

    #[test]
    fn string_array_drops_blank_entries() {
        let json = string_array(vec!["Louvre".to_string(), " ".to_string()]);
        assert_eq!(json, serde_json::json!(["Louvre"]));
    }
}
