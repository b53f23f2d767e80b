use api_types::{
    activity::{ActivityNew, ActivityUpdate},
    auth::Signup,
    budget::BudgetUpdate,
    stop::{StopNew, StopOrder, StopUpdate},
    trip::{TripListQuery, TripNew, TripStatus, TripUpdate},
};
use chrono::NaiveDate;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, ModelTrait, Statement,
};

use engine::{Currency, Engine, EngineError, activities, budgets, stops, trips};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn signup(engine: &Engine, email: &str) -> String {
    engine
        .signup(Signup {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
            password_confirm: "correct horse".to_string(),
            phone_number: None,
            city: None,
            country: None,
            additional_info: None,
            language_preference: None,
        })
        .await
        .unwrap()
        .id
        .to_string()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn trip(name: &str) -> TripNew {
    TripNew {
        name: name.to_string(),
        description: None,
        start_date: date("2024-01-01"),
        end_date: date("2024-01-05"),
        cover_image_url: None,
        is_public: None,
        status: None,
        estimated_budget_minor: None,
        currency: Some(Currency::Usd),
        collaborators_can_edit: None,
        auto_calculate_budget: None,
    }
}

fn stop(city: &str, start: &str, end: &str, accommodation: Option<i64>) -> StopNew {
    StopNew {
        city_name: city.to_string(),
        country: "Italy".to_string(),
        start_date: date(start),
        end_date: date(end),
        order_index: None,
        latitude: None,
        longitude: None,
        timezone: None,
        notes: None,
        accommodation_name: None,
        accommodation_address: None,
        accommodation_cost_minor: accommodation,
    }
}

fn activity(name: &str, cost: Option<i64>) -> ActivityNew {
    ActivityNew {
        cost_minor: cost,
        ..ActivityNew::named(name)
    }
}

async fn count(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_string(
            backend,
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}

#[tokio::test]
async fn new_trip_starts_with_an_empty_budget() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;

    let created = engine.new_trip(&alice, trip("Italy")).await.unwrap();
    assert_eq!(created.status, TripStatus::Planning);
    assert_eq!(created.duration_days, 5);
    assert!(created.auto_calculate_budget);

    let budget = engine.trip_budget(created.id, &alice).await.unwrap();
    assert_eq!(budget.total_cost_minor, 0);
    assert_eq!(budget.total_limit_minor, None);
    assert!(!budget.is_over_budget);
}

#[tokio::test]
async fn inverted_trip_dates_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;

    let mut new = trip("Backwards");
    new.end_date = date("2023-12-31");
    let err = engine.new_trip(&alice, new).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { ref field, .. } if field == "end_date"));
}

#[tokio::test]
async fn budget_follows_stops_and_activities() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;
    let trip = engine.new_trip(&alice, trip("Italy")).await.unwrap();

    let rome = engine
        .new_stop(trip.id, &alice, stop("Rome", "2024-01-01", "2024-01-03", Some(200)))
        .await
        .unwrap();
    let colosseum = engine
        .new_activity(rome.id, &alice, activity("Colosseum", Some(50)))
        .await
        .unwrap();

    let budget = engine.trip_budget(trip.id, &alice).await.unwrap();
    assert_eq!(budget.stay_cost_minor, 200);
    assert_eq!(budget.activity_cost_minor, 50);
    assert_eq!(budget.total_cost_minor, 250);

    engine
        .update_activity(
            colosseum.id,
            &alice,
            ActivityUpdate {
                cost_minor: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let budget = engine.trip_budget(trip.id, &alice).await.unwrap();
    assert_eq!(budget.activity_cost_minor, 0);

    engine
        .update_activity(
            colosseum.id,
            &alice,
            ActivityUpdate {
                cost_minor: Some(Some(50)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    engine.delete_activity(colosseum.id, &alice).await.unwrap();
    let budget = engine.trip_budget(trip.id, &alice).await.unwrap();
    assert_eq!(budget.activity_cost_minor, 0);
    assert_eq!(budget.stay_cost_minor, 200);

    engine
        .update_stop(
            rome.id,
            &alice,
            StopUpdate {
                accommodation_cost_minor: Some(Some(120)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let budget = engine.trip_budget(trip.id, &alice).await.unwrap();
    assert_eq!(budget.stay_cost_minor, 120);

    engine.delete_stop(rome.id, &alice).await.unwrap();
    let budget = engine.trip_budget(trip.id, &alice).await.unwrap();
    assert_eq!(budget.total_cost_minor, 0);
}

#[tokio::test]
async fn bulk_activities_are_summed_once() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;
    let trip = engine.new_trip(&alice, trip("Italy")).await.unwrap();
    let stops = engine
        .new_stops(
            trip.id,
            &alice,
            vec![
                stop("Rome", "2024-01-01", "2024-01-02", Some(100)),
                stop("Florence", "2024-01-03", "2024-01-05", Some(300)),
            ],
        )
        .await
        .unwrap();
    engine
        .new_activities(
            stops[1].id,
            &alice,
            vec![activity("Uffizi", Some(25)), activity("Walk", None)],
        )
        .await
        .unwrap();

    let budget = engine.trip_budget(trip.id, &alice).await.unwrap();
    assert_eq!(budget.stay_cost_minor, 400);
    assert_eq!(budget.activity_cost_minor, 25);
}

#[tokio::test]
async fn manual_budget_is_left_alone_until_recalculated() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;
    let mut new = trip("Manual");
    new.auto_calculate_budget = Some(false);
    let trip = engine.new_trip(&alice, new).await.unwrap();

    engine
        .new_stop(trip.id, &alice, stop("Rome", "2024-01-01", "2024-01-02", Some(900)))
        .await
        .unwrap();
    let budget = engine.trip_budget(trip.id, &alice).await.unwrap();
    assert_eq!(budget.stay_cost_minor, 0);

    let budget = engine.recalculate_budget(trip.id, &alice).await.unwrap();
    assert_eq!(budget.stay_cost_minor, 900);
}

#[tokio::test]
async fn stale_budget_version_is_a_conflict() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;
    let trip = engine.new_trip(&alice, trip("Italy")).await.unwrap();
    let read = engine.trip_budget(trip.id, &alice).await.unwrap();

    let first = engine
        .update_budget(
            trip.id,
            &alice,
            BudgetUpdate {
                meal_cost_minor: Some(3_000),
                version: Some(read.version),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(first.version, read.version + 1);
    assert_eq!(first.meal_cost_minor, 3_000);

    let err = engine
        .update_budget(
            trip.id,
            &alice,
            BudgetUpdate {
                meal_cost_minor: Some(10),
                version: Some(read.version),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let current = engine.trip_budget(trip.id, &alice).await.unwrap();
    assert_eq!(current.meal_cost_minor, 3_000);
}

#[tokio::test]
async fn summary_warns_about_limits() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;
    let trip = engine.new_trip(&alice, trip("Italy")).await.unwrap();
    engine
        .update_budget(
            trip.id,
            &alice,
            BudgetUpdate {
                transport_cost_minor: Some(12_000),
                transport_limit_minor: Some(Some(10_000)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let summary = engine.budget_summary(trip.id, &alice).await.unwrap();
    assert!(summary.budget.is_over_budget);
    assert_eq!(summary.remaining_minor, Some(-2_000));
    assert!(!summary.alerts.is_empty());
}

#[tokio::test]
async fn other_users_cannot_see_a_trip() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;
    let bob = signup(&engine, "bob@example.com").await;
    let trip = engine.new_trip(&alice, trip("Private")).await.unwrap();
    let rome = engine
        .new_stop(trip.id, &alice, stop("Rome", "2024-01-01", "2024-01-02", None))
        .await
        .unwrap();
    let walk = engine
        .new_activity(rome.id, &alice, activity("Walk", None))
        .await
        .unwrap();

    let not_found = EngineError::KeyNotFound("trip not exists".to_string());
    assert_eq!(engine.trip(trip.id, &bob).await.unwrap_err(), not_found);
    assert_eq!(
        engine
            .update_trip(trip.id, &bob, TripUpdate::default())
            .await
            .unwrap_err(),
        not_found
    );
    assert_eq!(engine.delete_trip(trip.id, &bob).await.unwrap_err(), not_found);
    assert_eq!(
        engine.stop(rome.id, &bob).await.unwrap_err(),
        EngineError::KeyNotFound("stop not exists".to_string())
    );
    assert_eq!(
        engine.delete_activity(walk.id, &bob).await.unwrap_err(),
        EngineError::KeyNotFound("activity not exists".to_string())
    );
    assert!(
        engine
            .list_trips(&bob, TripListQuery::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn trip_rows_are_linked_to_their_children() {
    let (engine, db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;
    let trip = engine.new_trip(&alice, trip("Italy")).await.unwrap();
    let rome = engine
        .new_stop(trip.id, &alice, stop("Rome", "2024-01-01", "2024-01-03", Some(300)))
        .await
        .unwrap();
    engine
        .new_stop(trip.id, &alice, stop("Milan", "2024-01-04", "2024-01-05", None))
        .await
        .unwrap();
    for name in ["Colosseum", "Pantheon"] {
        engine
            .new_activity(rome.id, &alice, activity(name, Some(10)))
            .await
            .unwrap();
    }

    let row = trips::Entity::find_by_id(trip.id.to_string())
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut tree = row
        .find_related(stops::Entity)
        .find_with_related(activities::Entity)
        .all(&db)
        .await
        .unwrap();
    tree.sort_by_key(|(stop, _)| stop.start_date);
    let shape: Vec<_> = tree
        .iter()
        .map(|(stop, children)| (stop.city_name.as_str(), children.len()))
        .collect();
    assert_eq!(shape, [("Rome", 2), ("Milan", 0)]);

    let budget = row
        .find_related(budgets::Entity)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(budget.stay_cost_minor, 300);
    assert_eq!(budget.activity_cost_minor, 20);

    let (_, parent) = activities::Entity::find()
        .find_also_related(trips::Entity)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(parent.unwrap().id, trip.id.to_string());
}

#[tokio::test]
async fn deleting_a_trip_removes_everything_it_owns() {
    let (engine, db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;
    let trip = engine.new_trip(&alice, trip("Italy")).await.unwrap();
    let rome = engine
        .new_stop(trip.id, &alice, stop("Rome", "2024-01-01", "2024-01-02", Some(10)))
        .await
        .unwrap();
    engine
        .new_activity(rome.id, &alice, activity("Walk", Some(5)))
        .await
        .unwrap();
    engine
        .share_trip(trip.id, &alice, Default::default())
        .await
        .unwrap();

    engine.delete_trip(trip.id, &alice).await.unwrap();

    for table in ["trips", "stops", "activities", "budgets", "shared_itineraries"] {
        assert_eq!(count(&db, table).await, 0, "{table} not emptied");
    }
}

#[tokio::test]
async fn listing_filters_and_counts() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;
    let italy = engine.new_trip(&alice, trip("Italy")).await.unwrap();
    let mut done = trip("Done");
    done.status = Some(TripStatus::Completed);
    engine.new_trip(&alice, done).await.unwrap();
    let rome = engine
        .new_stop(italy.id, &alice, stop("Rome", "2024-01-01", "2024-01-02", None))
        .await
        .unwrap();
    engine
        .new_activity(rome.id, &alice, activity("Walk", None))
        .await
        .unwrap();

    let planning = engine
        .list_trips(
            &alice,
            TripListQuery {
                status: Some(TripStatus::Planning),
                is_public: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(planning.len(), 1);
    assert_eq!(planning[0].trip.name, "Italy");
    assert_eq!(planning[0].stop_count, 1);
    assert_eq!(planning[0].activity_count, 1);

    let all = engine
        .list_trips(&alice, TripListQuery::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn reorder_ignores_foreign_stops() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;
    let italy = engine.new_trip(&alice, trip("Italy")).await.unwrap();
    let other = engine.new_trip(&alice, trip("Other")).await.unwrap();
    let stops = engine
        .new_stops(
            italy.id,
            &alice,
            vec![
                stop("Rome", "2024-01-01", "2024-01-02", None),
                stop("Milan", "2024-01-03", "2024-01-05", None),
            ],
        )
        .await
        .unwrap();
    let foreign = engine
        .new_stop(other.id, &alice, stop("Paris", "2024-01-01", "2024-01-02", None))
        .await
        .unwrap();

    let ordered = engine
        .reorder_stops(
            italy.id,
            &alice,
            vec![
                StopOrder {
                    stop_id: stops[0].id,
                    order_index: 2,
                },
                StopOrder {
                    stop_id: stops[1].id,
                    order_index: 1,
                },
                StopOrder {
                    stop_id: foreign.id,
                    order_index: 0,
                },
            ],
        )
        .await
        .unwrap();
    let cities: Vec<_> = ordered.iter().map(|s| s.city_name.as_str()).collect();
    assert_eq!(cities, ["Milan", "Rome"]);

    let untouched = engine.stop(foreign.id, &alice).await.unwrap();
    assert_eq!(untouched.stop.order_index, 0);
}

#[tokio::test]
async fn activities_grouped_by_day_cover_every_stop_day() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;
    let trip = engine.new_trip(&alice, trip("Italy")).await.unwrap();
    let rome = engine
        .new_stop(trip.id, &alice, stop("Rome", "2024-01-01", "2024-01-03", None))
        .await
        .unwrap();
    engine
        .new_activity(rome.id, &alice, activity("Colosseum", Some(50)))
        .await
        .unwrap();

    let days = engine.activities_by_date(trip.id, &alice).await.unwrap();
    let dates: Vec<_> = days.iter().map(|d| d.date).collect();
    assert_eq!(
        dates,
        [date("2024-01-01"), date("2024-01-02"), date("2024-01-03")]
    );
    assert_eq!(days[0].activities.len(), 1);
    assert_eq!(days[0].activities[0].location, "Rome, Italy");
    assert!(days[1].activities.is_empty());
}

#[tokio::test]
async fn stops_longer_than_a_year_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;
    let trip = engine.new_trip(&alice, trip("Italy")).await.unwrap();

    let err = engine
        .new_stop(trip.id, &alice, stop("Rome", "0001-01-01", "9999-12-31", None))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { ref field, .. } if field == "end_date"));

    let rome = engine
        .new_stop(trip.id, &alice, stop("Rome", "2024-01-01", "2024-01-03", None))
        .await
        .unwrap();
    let err = engine
        .update_stop(
            rome.id,
            &alice,
            StopUpdate {
                end_date: Some(date("2026-01-01")),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { ref field, .. } if field == "end_date"));

    let days = engine.activities_by_date(trip.id, &alice).await.unwrap();
    assert_eq!(days.len(), 3);
}

#[tokio::test]
async fn trip_stats_attribute_costs_to_stops_and_days() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;
    let trip = engine.new_trip(&alice, trip("Italy")).await.unwrap();
    let stops = engine
        .new_stops(
            trip.id,
            &alice,
            vec![
                stop("Rome", "2024-01-01", "2024-01-02", Some(200)),
                stop("Milan", "2024-01-03", "2024-01-05", Some(100)),
            ],
        )
        .await
        .unwrap();
    engine
        .new_activity(stops[1].id, &alice, activity("Duomo", Some(150)))
        .await
        .unwrap();

    let stats = engine.trip_stats(trip.id, &alice).await.unwrap();
    assert_eq!(stats.total_cost_minor, 450);
    assert_eq!(stats.duration_days, 5);
    assert_eq!(stats.daily_average_minor, 90);
    assert_eq!(stats.cost_by_stop[0].cost_minor, 200);
    assert_eq!(stats.cost_by_stop[1].cost_minor, 250);
    let day = stats.most_expensive_day.unwrap();
    assert_eq!(day.date, date("2024-01-03"));
    assert_eq!(day.cost_minor, 250);
    assert_eq!(stats.budget_utilization, None);
}

#[tokio::test]
async fn user_stats_only_count_completed_trips() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "alice@example.com").await;
    let mut done = trip("Done");
    done.status = Some(TripStatus::Completed);
    let done = engine.new_trip(&alice, done).await.unwrap();
    let mut soon = trip("Soon");
    soon.status = Some(TripStatus::Upcoming);
    engine.new_trip(&alice, soon).await.unwrap();

    let rome = engine
        .new_stop(done.id, &alice, stop("Rome", "2024-01-01", "2024-01-02", Some(300)))
        .await
        .unwrap();
    engine
        .new_activity(rome.id, &alice, activity("Walk", None))
        .await
        .unwrap();

    let stats = engine.user_stats(&alice).await.unwrap();
    assert_eq!(stats.total_trips, 2);
    assert_eq!(stats.completed_trips, 1);
    assert_eq!(stats.upcoming_trips, 1);
    assert_eq!(stats.total_destinations, 1);
    assert_eq!(stats.total_activities, 1);
    assert_eq!(stats.total_spent_minor, 300);
    assert_eq!(stats.average_trip_duration_days, 5.0);
    assert_eq!(stats.favorite_destination.as_deref(), Some("Italy"));
    assert_eq!(stats.most_expensive_trip.as_deref(), Some("Done"));
}
