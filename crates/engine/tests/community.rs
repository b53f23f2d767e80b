use api_types::{
    auth::Signup,
    community::{CommentNew, PageQuery, PostCategory, PostListQuery, PostNew, PostUpdate},
    trip::{TripNew, TripUpdate},
};
use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

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

fn tagged(title: &str, category: PostCategory, tags: &[&str]) -> PostNew {
    PostNew {
        category: Some(category),
        tags: tags.iter().map(ToString::to_string).collect(),
        ..PostNew::new(title, "Some words about the trip.")
    }
}

#[tokio::test]
async fn new_post_is_normalized() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;

    let post = engine
        .new_post(
            &alice,
            PostNew {
                destination: Some("  Kyoto ".to_string()),
                tags: vec![" Food".to_string(), "food".to_string(), "  ".to_string()],
                ..PostNew::new("  Ramen crawl ", " Best bowls in town. ")
            },
        )
        .await
        .unwrap();
    assert_eq!(post.title, "Ramen crawl");
    assert_eq!(post.content, "Best bowls in town.");
    assert_eq!(post.category, PostCategory::General);
    assert_eq!(post.destination.as_deref(), Some("Kyoto"));
    assert_eq!(post.tags, ["food"]);
    assert_eq!(post.author.first_name, "Alice");
    assert_eq!((post.like_count, post.comment_count, post.view_count), (0, 0, 0));
}

#[tokio::test]
async fn post_fields_are_length_checked() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;

    let err = engine
        .new_post(&alice, PostNew::new("x".repeat(201), "fine"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { ref field, .. } if field == "title"));

    let err = engine
        .new_post(&alice, PostNew::new("Title", "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { ref field, .. } if field == "content"));

    let err = engine
        .new_post(
            &alice,
            PostNew {
                destination: Some("d".repeat(101)),
                ..PostNew::new("Title", "Body")
            },
        )
        .await
        .unwrap_err();
    assert!(
        matches!(err, EngineError::InvalidField { ref field, .. } if field == "destination")
    );
}

#[tokio::test]
async fn listing_filters_and_paginates_published_posts() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;

    engine
        .new_post(&alice, tagged("Cheap eats in Lisbon", PostCategory::Budget, &["food"]))
        .await
        .unwrap();
    engine
        .new_post(&alice, tagged("Hiking alone", PostCategory::Solo, &["hiking", "alps"]))
        .await
        .unwrap();
    let hidden = engine
        .new_post(&alice, tagged("Draft", PostCategory::Tips, &["food"]))
        .await
        .unwrap();
    engine
        .update_post(
            hidden.id,
            &alice,
            PostUpdate {
                is_published: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let all = engine.list_posts(PostListQuery::default()).await.unwrap();
    let titles: Vec<_> = all.posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, ["Hiking alone", "Cheap eats in Lisbon"]);
    assert_eq!(all.pagination.total_posts, 2);
    assert_eq!(all.pagination.total_pages, 1);

    let solo = engine
        .list_posts(PostListQuery {
            category: Some("solo".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(solo.posts.len(), 1);
    assert_eq!(solo.posts[0].title, "Hiking alone");

    let food = engine
        .list_posts(PostListQuery {
            tags: Some("FOOD, beach".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(food.posts.len(), 1);
    assert_eq!(food.posts[0].title, "Cheap eats in Lisbon");

    let searched = engine
        .list_posts(PostListQuery {
            search: Some("LISBON".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(searched.posts.len(), 1);

    let second = engine
        .list_posts(PostListQuery {
            page: Some(2),
            limit: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(second.posts[0].title, "Cheap eats in Lisbon");
    assert_eq!(second.pagination.current_page, 2);
    assert!(second.pagination.has_prev_page);
    assert!(!second.pagination.has_next_page);

    let err = engine
        .list_posts(PostListQuery {
            category: Some("gossip".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { .. }));

    let mine = engine
        .my_posts(&alice, PageQuery::default())
        .await
        .unwrap();
    assert_eq!(mine.pagination.total_posts, 3);
}

#[tokio::test]
async fn viewing_a_post_counts_views() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let post = engine
        .new_post(&alice, PostNew::new("Hello", "World"))
        .await
        .unwrap();

    assert_eq!(engine.post(post.id).await.unwrap().view_count, 1);
    assert_eq!(engine.post(post.id).await.unwrap().view_count, 2);

    let err = engine.post(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn only_the_author_edits_or_deletes() {
    let (engine, db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let bob = signup(&engine, "Bob", "bob@example.com").await;
    let post = engine
        .new_post(&alice, PostNew::new("Hello", "World"))
        .await
        .unwrap();

    let err = engine
        .update_post(
            post.id,
            &bob,
            PostUpdate {
                title: Some("Mine now".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
    let err = engine.delete_post(post.id, &bob).await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let updated = engine
        .update_post(
            post.id,
            &alice,
            PostUpdate {
                category: Some(PostCategory::Photos),
                tags: Some(vec!["Sunset".to_string()]),
                destination: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Hello");
    assert_eq!(updated.category, PostCategory::Photos);
    assert_eq!(updated.tags, ["sunset"]);

    engine.toggle_like(post.id, &bob).await.unwrap();
    engine
        .add_comment(
            post.id,
            &bob,
            CommentNew {
                content: "Nice".to_string(),
            },
        )
        .await
        .unwrap();
    engine.delete_post(post.id, &alice).await.unwrap();
    assert_eq!(count(&db, "community_posts").await, 0);
    assert_eq!(count(&db, "post_likes").await, 0);
    assert_eq!(count(&db, "post_comments").await, 0);
}

#[tokio::test]
async fn likes_toggle_per_user() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let bob = signup(&engine, "Bob", "bob@example.com").await;
    let post = engine
        .new_post(&alice, PostNew::new("Hello", "World"))
        .await
        .unwrap();

    let first = engine.toggle_like(post.id, &bob).await.unwrap();
    assert!(first.liked);
    assert_eq!(first.like_count, 1);
    assert_eq!(first.likes[0].user_name, "Bob Traveller");

    let both = engine.toggle_like(post.id, &alice).await.unwrap();
    assert_eq!(both.like_count, 2);

    let undone = engine.toggle_like(post.id, &bob).await.unwrap();
    assert!(!undone.liked);
    assert_eq!(undone.like_count, 1);
    assert_eq!(undone.likes[0].user_id.to_string(), alice);
}

#[tokio::test]
async fn comments_are_validated_and_listed_oldest_first() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let bob = signup(&engine, "Bob", "bob@example.com").await;
    let post = engine
        .new_post(&alice, PostNew::new("Hello", "World"))
        .await
        .unwrap();

    let err = engine
        .add_comment(
            post.id,
            &bob,
            CommentNew {
                content: "  ".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { ref field, .. } if field == "content"));
    let err = engine
        .add_comment(
            post.id,
            &bob,
            CommentNew {
                content: "x".repeat(1001),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidField { ref field, .. } if field == "content"));

    for (who, text) in [(&bob, " First! "), (&alice, "Thanks")] {
        engine
            .add_comment(
                post.id,
                who,
                CommentNew {
                    content: text.to_string(),
                },
            )
            .await
            .unwrap();
    }
    let added = engine
        .add_comment(
            post.id,
            &bob,
            CommentNew {
                content: "Third".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(added.comment_count, 3);
    assert_eq!(added.comment.author.first_name, "Bob");

    let view = engine.post(post.id).await.unwrap();
    let texts: Vec<_> = view.comments.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(texts, ["First!", "Thanks", "Third"]);
    assert_eq!(view.comment_count, 3);
}

#[tokio::test]
async fn public_trips_need_the_public_flag() {
    let (engine, _db) = engine_with_db().await;
    let alice = signup(&engine, "Alice", "alice@example.com").await;
    let new_trip = |name: &str| TripNew {
        name: name.to_string(),
        description: None,
        start_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(),
        cover_image_url: None,
        is_public: None,
        status: None,
        estimated_budget_minor: None,
        currency: Some(Currency::Eur),
        collaborators_can_edit: None,
        auto_calculate_budget: None,
    };
    engine.new_trip(&alice, new_trip("Private")).await.unwrap();
    let open = engine.new_trip(&alice, new_trip("Open")).await.unwrap();
    engine
        .update_trip(
            open.id,
            &alice,
            TripUpdate {
                is_public: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let listed = engine.public_trips().await.unwrap();
    let names: Vec<_> = listed.iter().map(|t| t.trip.name.as_str()).collect();
    assert_eq!(names, ["Open"]);
    assert_eq!(listed[0].stop_count, 0);
}
