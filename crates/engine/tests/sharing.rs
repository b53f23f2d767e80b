use api_types::{
    activity::{ActivityCategory, ActivityNew},
    auth::{ChangePassword, Signup},
    catalog::{ActivitySearch, CatalogActivityNew, CityNew, CitySearch},
    collaborator::{
        CollaboratorInvite, CollaboratorUpdate, InvitationResponse, InvitationStatus,
        PermissionLevel,
    },
    share::ShareSettings,
    stop::StopNew,
    template::{TemplateFromTrip, TemplateUse},
    trip::{TripNew, TripStatus, TripUpdate},
    user::SavedDestinationNew,
};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{Currency, Engine, EngineError};
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

async fn signup(engine: &Engine, first_name: &str, email: &str) -> String {
    engine
        .signup(Signup {
            first_name: first_name.to_string(),
            last_name: "Traveller".to_string(),
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
        start_date: date("2024-06-01"),
        end_date: date("2024-06-05"),
        cover_image_url: None,
        is_public: None,
        status: None,
        estimated_budget_minor: None,
        currency: Some(Currency::Eur),
        collaborators_can_edit: None,
        auto_calculate_budget: None,
    }
}

fn stop(city: &str, start: &str, end: &str, accommodation: Option<i64>) -> StopNew {
    StopNew {
        city_name: city.to_string(),
        country: "France".to_string(),
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

/// Trip with one stop in Paris (accommodation 400) and one booked activity.
async fn planned_trip(engine: &Engine, user: &str) -> uuid::Uuid {
    let trip = engine.new_trip(user, trip("Paris")).await.unwrap();
    let paris = engine
        .new_stop(trip.id, user, stop("Paris", "2024-06-01", "2024-06-03", Some(400)))
        .await
        .unwrap();
    let louvre = engine
        .new_activity(
            paris.id,
            user,
            ActivityNew {
                cost_minor: Some(60),
                category: Some(ActivityCategory::Culture),
                ..ActivityNew::named("Louvre")
            },
        )
        .await
        .unwrap();
    engine
        .book_activity(louvre.id, user, Default::default())
        .await
        .unwrap();
    trip.id
}

#[tokio::test]
async fn shared_trip_counts_views() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let trip_id = planned_trip(&engine, &alice).await;

    let share = engine
        .share_trip(trip_id, &alice, ShareSettings::default())
        .await
        .unwrap();
    assert_eq!(share.public_url, format!("/public/{}", share.slug));
    assert_eq!(share.view_count, 0);
    let before = engine.trip(trip_id, &alice).await.unwrap();
    assert!(before.is_public);

    let first = engine.public_trip(&share.slug, None).await.unwrap();
    assert_eq!(first.view_count, 1);
    assert_eq!(first.owner_name, "Alice Traveller");
    assert_eq!(first.stops.len(), 1);
    let second = engine.public_trip(&share.slug, None).await.unwrap();
    assert_eq!(second.view_count, 2);

    let again = engine
        .share_trip(trip_id, &alice, ShareSettings::default())
        .await
        .unwrap();
    assert_eq!(again.slug, share.slug);
    assert_eq!(again.view_count, 2);
    assert_eq!(again.copy_count, 0);
    assert_eq!(engine.trip(trip_id, &alice).await.unwrap(), before);
}

#[tokio::test]
async fn trips_with_the_same_name_get_distinct_slugs() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let first = planned_trip(&engine, &alice).await;
    let second = planned_trip(&engine, &alice).await;

    let a = engine
        .share_trip(first, &alice, ShareSettings::default())
        .await
        .unwrap();
    let b = engine
        .share_trip(second, &alice, ShareSettings::default())
        .await
        .unwrap();
    assert_ne!(a.slug, b.slug);
    assert!(a.slug.starts_with("paris-"));
    assert!(b.slug.starts_with("paris-"));

    let shown = engine.public_trip(&b.slug, None).await.unwrap();
    assert_eq!(shown.trip.id, second);
}

#[tokio::test]
async fn unshared_or_expired_trip_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let trip_id = planned_trip(&engine, &alice).await;
    let share = engine
        .share_trip(trip_id, &alice, ShareSettings::default())
        .await
        .unwrap();

    let not_found = EngineError::KeyNotFound("shared trip not exists".to_string());
    engine.unshare_trip(trip_id, &alice).await.unwrap();
    assert_eq!(
        engine.public_trip(&share.slug, None).await.unwrap_err(),
        not_found
    );

    engine
        .share_trip(
            trip_id,
            &alice,
            ShareSettings {
                expires_at: Some(Some(Utc::now() - Duration::hours(1))),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        engine.public_trip(&share.slug, None).await.unwrap_err(),
        not_found
    );
    assert_eq!(
        engine.public_trip("no-such-slug", None).await.unwrap_err(),
        not_found
    );
}

#[tokio::test]
async fn password_protected_share() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let trip_id = planned_trip(&engine, &alice).await;
    let share = engine
        .share_trip(
            trip_id,
            &alice,
            ShareSettings {
                password: Some(Some("letmein".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(share.password_protected);

    assert!(matches!(
        engine.public_trip(&share.slug, None).await.unwrap_err(),
        EngineError::Forbidden(_)
    ));
    assert!(matches!(
        engine
            .public_trip(&share.slug, Some("wrong"))
            .await
            .unwrap_err(),
        EngineError::Forbidden(_)
    ));
    engine
        .public_trip(&share.slug, Some("letmein"))
        .await
        .unwrap();
}

#[tokio::test]
async fn copying_a_shared_trip_resets_booking_state() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let bob = signup(&engine, "Bob", "bob@example.com").await;
    let trip_id = planned_trip(&engine, &alice).await;
    let share = engine
        .share_trip(trip_id, &alice, ShareSettings::default())
        .await
        .unwrap();

    let copy = engine
        .copy_public_trip(&share.slug, &bob, None)
        .await
        .unwrap();
    assert_eq!(copy.name, "Paris (copy)");
    assert_eq!(copy.status, TripStatus::Planning);
    assert!(!copy.is_public);

    let detail = engine.trip_detail(copy.id, &bob).await.unwrap();
    assert_eq!(detail.stops.len(), 1);
    let louvre = &detail.stops[0].activities[0];
    assert_eq!(louvre.name, "Louvre");
    assert!(!louvre.is_booked);

    let budget = engine.trip_budget(copy.id, &bob).await.unwrap();
    assert_eq!(budget.total_cost_minor, 460);

    let share = engine
        .share_trip(trip_id, &alice, ShareSettings::default())
        .await
        .unwrap();
    assert_eq!(share.copy_count, 1);

    engine
        .share_trip(
            trip_id,
            &alice,
            ShareSettings {
                allow_copying: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        engine
            .copy_public_trip(&share.slug, &bob, None)
            .await
            .unwrap_err(),
        EngineError::Forbidden(_)
    ));
}

#[tokio::test]
async fn invited_editor_can_change_the_itinerary() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let bob = signup(&engine, "Bob", "bob@example.com").await;
    let trip_id = planned_trip(&engine, &alice).await;

    let invite = engine
        .invite_collaborator(
            trip_id,
            &alice,
            CollaboratorInvite {
                email: "BOB@example.com".to_string(),
                permission_level: Some(PermissionLevel::Edit),
            },
        )
        .await
        .unwrap();
    assert_eq!(invite.status, InvitationStatus::Pending);
    assert_eq!(invite.trip_name, "Paris");

    // Pending invitations grant nothing.
    assert!(matches!(
        engine.trip(trip_id, &bob).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));

    let pending = engine.my_invitations(&bob).await.unwrap();
    assert_eq!(pending.len(), 1);
    let accepted = engine
        .respond_invitation(pending[0].id, &bob, InvitationResponse { accept: true })
        .await
        .unwrap();
    assert_eq!(accepted.status, InvitationStatus::Accepted);
    assert!(accepted.responded_at.is_some());

    engine
        .new_stop(trip_id, &bob, stop("Lyon", "2024-06-04", "2024-06-05", Some(100)))
        .await
        .unwrap();
    let budget = engine.trip_budget(trip_id, &alice).await.unwrap();
    assert_eq!(budget.stay_cost_minor, 500);

    let shared = engine.shared_trips(&bob).await.unwrap();
    assert_eq!(shared.len(), 1);

    // Editors cannot touch owner-only settings.
    assert!(matches!(
        engine
            .update_trip(
                trip_id,
                &bob,
                TripUpdate {
                    is_public: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err(),
        EngineError::Forbidden(_)
    ));
    assert!(matches!(
        engine.delete_trip(trip_id, &bob).await.unwrap_err(),
        EngineError::Forbidden(_)
    ));
}

#[tokio::test]
async fn viewer_cannot_write_and_revoked_loses_access() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let bob = signup(&engine, "Bob", "bob@example.com").await;
    let trip_id = planned_trip(&engine, &alice).await;

    let invite = engine
        .invite_collaborator(
            trip_id,
            &alice,
            CollaboratorInvite {
                email: "bob@example.com".to_string(),
                permission_level: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(invite.permission_level, PermissionLevel::View);
    engine
        .respond_invitation(invite.id, &bob, InvitationResponse { accept: true })
        .await
        .unwrap();

    engine.trip(trip_id, &bob).await.unwrap();
    assert!(matches!(
        engine
            .new_stop(trip_id, &bob, stop("Nice", "2024-06-04", "2024-06-05", None))
            .await
            .unwrap_err(),
        EngineError::Forbidden(_)
    ));

    let revoked = engine
        .update_collaborator(
            invite.id,
            &alice,
            CollaboratorUpdate {
                permission_level: None,
                status: Some(InvitationStatus::Revoked),
            },
        )
        .await
        .unwrap();
    assert_eq!(revoked.status, InvitationStatus::Revoked);
    assert!(matches!(
        engine.trip(trip_id, &bob).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));

    // Revoked is terminal for responses.
    assert!(matches!(
        engine
            .respond_invitation(invite.id, &bob, InvitationResponse { accept: true })
            .await
            .unwrap_err(),
        EngineError::Conflict(_)
    ));
}

#[tokio::test]
async fn invitation_rules() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let bob = signup(&engine, "Bob", "bob@example.com").await;
    let carol = signup(&engine, "Carol", "carol@example.com").await;
    let trip_id = planned_trip(&engine, &alice).await;
    let invite = |email: &str| CollaboratorInvite {
        email: email.to_string(),
        permission_level: None,
    };

    assert!(matches!(
        engine
            .invite_collaborator(trip_id, &alice, invite("alice@example.com"))
            .await
            .unwrap_err(),
        EngineError::InvalidField { .. }
    ));
    assert_eq!(
        engine
            .invite_collaborator(trip_id, &alice, invite("nobody@example.com"))
            .await
            .unwrap_err(),
        EngineError::KeyNotFound("user not exists".to_string())
    );

    let pending = engine
        .invite_collaborator(trip_id, &alice, invite("bob@example.com"))
        .await
        .unwrap();
    assert_eq!(
        engine
            .invite_collaborator(trip_id, &alice, invite("bob@example.com"))
            .await
            .unwrap_err(),
        EngineError::ExistingKey("bob@example.com".to_string())
    );

    // Only the invitee answers.
    assert_eq!(
        engine
            .respond_invitation(pending.id, &carol, InvitationResponse { accept: true })
            .await
            .unwrap_err(),
        EngineError::KeyNotFound("collaborator not exists".to_string())
    );

    engine
        .respond_invitation(pending.id, &bob, InvitationResponse { accept: false })
        .await
        .unwrap();
    let reopened = engine
        .invite_collaborator(trip_id, &alice, invite("bob@example.com"))
        .await
        .unwrap();
    assert_eq!(reopened.id, pending.id);
    assert_eq!(reopened.status, InvitationStatus::Pending);

    let listed = engine.list_collaborators(trip_id, &alice).await.unwrap();
    assert_eq!(listed.len(), 1);
    engine.remove_collaborator(pending.id, &alice).await.unwrap();
    assert!(
        engine
            .list_collaborators(trip_id, &alice)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn template_round_trip_builds_a_new_trip() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let bob = signup(&engine, "Bob", "bob@example.com").await;
    let trip_id = planned_trip(&engine, &alice).await;

    let template = engine
        .template_from_trip(
            trip_id,
            &alice,
            TemplateFromTrip {
                name: Some("Paris long weekend".to_string()),
                description: None,
                category: None,
                difficulty: None,
                is_public: Some(true),
            },
        )
        .await
        .unwrap();
    assert_eq!(template.duration_days, 5);
    assert_eq!(template.estimated_budget_minor, Some(460));
    assert_eq!(template.currency, Currency::Eur);
    let stop = &template.template_data.stops[0];
    assert_eq!((stop.day_offset, stop.nights), (0, 2));
    assert_eq!(stop.activities[0].name, "Louvre");

    let listed = engine.list_templates(&bob).await.unwrap();
    assert_eq!(listed.len(), 1);

    let created = engine
        .use_template(
            template.id,
            &bob,
            TemplateUse {
                name: None,
                start_date: date("2025-03-10"),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.name, "Paris long weekend");
    assert_eq!(created.start_date, date("2025-03-10"));
    assert_eq!(created.end_date, date("2025-03-14"));

    let detail = engine.trip_detail(created.id, &bob).await.unwrap();
    assert_eq!(detail.stops[0].stop.start_date, date("2025-03-10"));
    assert_eq!(detail.stops[0].stop.end_date, date("2025-03-12"));
    let budget = engine.trip_budget(created.id, &bob).await.unwrap();
    assert_eq!(budget.total_cost_minor, 460);

    assert_eq!(engine.template(template.id, &bob).await.unwrap().use_count, 1);
    assert!(matches!(
        engine.delete_template(template.id, &bob).await.unwrap_err(),
        EngineError::Forbidden(_)
    ));
    engine.delete_template(template.id, &alice).await.unwrap();
}

#[tokio::test]
async fn signup_and_login() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "Alice@Example.com").await;

    let user = engine.login("alice@example.com", "correct horse").await.unwrap();
    assert_eq!(user.id.to_string(), alice);
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(
        engine
            .login("alice@example.com", "wrong horse")
            .await
            .unwrap_err(),
        EngineError::InvalidCredentials
    );
    assert_eq!(
        engine
            .login("nobody@example.com", "correct horse")
            .await
            .unwrap_err(),
        EngineError::InvalidCredentials
    );

    let duplicate = engine
        .signup(Signup {
            first_name: "Other".to_string(),
            last_name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "another password".to_string(),
            password_confirm: "another password".to_string(),
            phone_number: None,
            city: None,
            country: None,
            additional_info: None,
            language_preference: None,
        })
        .await
        .unwrap_err();
    assert_eq!(
        duplicate,
        EngineError::ExistingKey("alice@example.com".to_string())
    );

    engine
        .change_password(
            &alice,
            ChangePassword {
                current_password: "correct horse".to_string(),
                new_password: "battery staple".to_string(),
                new_password_confirm: "battery staple".to_string(),
            },
        )
        .await
        .unwrap();
    engine
        .login("alice@example.com", "battery staple")
        .await
        .unwrap();
}

#[tokio::test]
async fn complete_profile_gathers_everything() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    engine
        .new_saved_destination(
            &alice,
            SavedDestinationNew {
                city_name: "Kyoto".to_string(),
                country: "Japan".to_string(),
                notes: None,
                priority: None,
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        engine
            .new_saved_destination(
                &alice,
                SavedDestinationNew {
                    city_name: "Kyoto".to_string(),
                    country: "Japan".to_string(),
                    notes: None,
                    priority: Some(3),
                },
            )
            .await
            .unwrap_err(),
        EngineError::ExistingKey(_)
    ));

    let profile = engine.complete_profile(&alice).await.unwrap();
    assert_eq!(profile.user.first_name, "Alice");
    assert_eq!(profile.preferences.default_currency, Currency::Usd);
    assert_eq!(profile.saved_destinations.len(), 1);
    assert_eq!(profile.saved_destinations[0].priority, 1);
    assert_eq!(profile.stats.total_trips, 0);
}

#[tokio::test]
async fn catalog_search() {
    let (engine, _db) = engine_with_db().await;
    engine
        .insert_city(CityNew {
            name: "Paris".to_string(),
            country: "France".to_string(),
            country_code: "fr".to_string(),
            latitude: Some(48.8566),
            longitude: Some(2.3522),
            timezone: Some("Europe/Paris".to_string()),
            population: None,
            currency: None,
            language: None,
            description: None,
            best_time_to_visit: None,
            average_temperature: None,
            popular_attractions: vec![
                "Louvre".to_string(),
                "Eiffel Tower".to_string(),
                "Orsay".to_string(),
                "Montmartre".to_string(),
            ],
            travel_tips: Vec::new(),
            safety_rating: Some(8),
            cost_level: None,
            image_url: None,
        })
        .await
        .unwrap();

    let found = engine
        .search_cities(CitySearch {
            query: Some("PAR".to_string()),
            limit: None,
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].country_code, "FR");
    assert_eq!(found[0].popular_attractions.len(), 3);

    let activity = |name: &str, rating: f64, verified: bool| CatalogActivityNew {
        name: name.to_string(),
        category: ActivityCategory::Culture,
        description: None,
        city_name: "Paris".to_string(),
        country: "France".to_string(),
        location_name: None,
        address: None,
        average_cost_minor: Some(2_000),
        cost_range_min_minor: None,
        cost_range_max_minor: None,
        currency: None,
        estimated_duration_minutes: None,
        difficulty: None,
        booking_required: false,
        rating: Some(rating),
        review_count: 0,
        image_urls: Vec::new(),
        tags: Vec::new(),
        is_verified: verified,
    };
    engine
        .insert_catalog_activity(activity("Orsay museum", 4.5, true))
        .await
        .unwrap();
    engine
        .insert_catalog_activity(activity("Louvre museum", 4.8, true))
        .await
        .unwrap();
    engine
        .insert_catalog_activity(activity("Unverified museum", 5.0, false))
        .await
        .unwrap();

    let results = engine
        .search_activities(ActivitySearch {
            query: Some("museum".to_string()),
            city: Some("paris".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    let names: Vec<_> = results.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Louvre museum", "Orsay museum"]);
    assert_eq!(results[0].currency, "USD");

    let too_cheap = engine
        .search_activities(ActivitySearch {
            max_cost_minor: Some(1_000),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(too_cheap.is_empty());
}
