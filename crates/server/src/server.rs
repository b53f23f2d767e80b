use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use std::sync::Arc;

use crate::{
    AuthError, AuthSettings, ServerError, TokenType, account, activities, budget, catalog,
    collaborators, community, sharing, stops, templates, trips, users,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub auth: Arc<AuthSettings>,
}

/// Resolves the bearer access token to an active user and stores its
/// [`api_types::user::UserView`] in the request extensions.
async fn auth(
    State(state): State<ServerState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AuthError::MissingToken)?;
    let claims = state.auth.decode(bearer.token(), TokenType::Access)?;
    let user = state.engine.active_user(&claims.sub).await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn public_routes() -> Router<ServerState> {
    Router::new()
        .route("/auth/signup", post(account::signup))
        .route("/auth/login", post(account::login))
        .route("/auth/token/refresh", post(account::refresh))
        .route("/public/{slug}", get(sharing::public_trip))
        .route("/search/cities", get(catalog::search_cities))
        .route("/search/activities", get(catalog::search_activities))
        .route("/activities/categories", get(activities::categories))
        .route("/trips/public", get(trips::public))
        .route("/community", get(community::list))
        .route("/community/posts/{id}", get(community::get))
}

fn protected_routes() -> Router<ServerState> {
    Router::new()
        .route("/auth/me", get(account::me).put(account::update_me))
        .route("/auth/change-password", post(account::change_password))
        .route("/users/profile", get(users::profile).put(users::update_profile))
        .route(
            "/users/preferences",
            get(users::preferences).put(users::update_preferences),
        )
        .route("/users/complete-profile", get(users::complete_profile))
        .route("/users/stats", get(users::stats))
        .route(
            "/users/saved-destinations",
            get(users::list_destinations).post(users::destination_new),
        )
        .route(
            "/users/saved-destinations/{id}",
            get(users::destination)
                .put(users::destination_update)
                .delete(users::destination_delete),
        )
        .route("/trips", get(trips::list).post(trips::trip_new))
        .route("/trips/shared", get(trips::shared))
        .route(
            "/trips/{id}",
            get(trips::get).put(trips::update).delete(trips::delete),
        )
        .route("/trips/{id}/full", get(trips::detail))
        .route("/trips/{id}/stats", get(trips::stats))
        .route(
            "/trips/{id}/stops",
            get(stops::list).post(stops::stop_new),
        )
        .route("/trips/{id}/stops/bulk", post(stops::bulk_new))
        .route("/trips/{id}/stops/reorder", post(stops::reorder))
        .route("/trips/{id}/activities", get(activities::trip_list))
        .route("/trips/{id}/activities/by-date", get(activities::by_date))
        .route(
            "/trips/{id}/budget",
            get(budget::get).put(budget::update),
        )
        .route("/trips/{id}/budget/summary", get(budget::summary))
        .route("/trips/{id}/budget/recalculate", post(budget::recalculate))
        .route(
            "/trips/{id}/share",
            post(sharing::share).delete(sharing::unshare),
        )
        .route(
            "/trips/{id}/collaborators",
            get(collaborators::list).post(collaborators::invite),
        )
        .route("/trips/{id}/template", post(templates::from_trip))
        .route(
            "/stops/{id}",
            get(stops::get).put(stops::update).delete(stops::delete),
        )
        .route(
            "/stops/{id}/activities",
            get(activities::stop_list).post(activities::activity_new),
        )
        .route("/stops/{id}/activities/bulk", post(activities::bulk_new))
        .route(
            "/activities/{id}",
            get(activities::get)
                .put(activities::update)
                .delete(activities::delete),
        )
        .route("/activities/{id}/book", post(activities::book))
        .route("/activities/{id}/pay", post(activities::pay))
        .route("/public/{slug}/copy", post(sharing::copy))
        .route(
            "/collaborators/{id}",
            put(collaborators::update).delete(collaborators::remove),
        )
        .route("/collaborations", get(collaborators::invitations))
        .route("/collaborations/{id}/respond", post(collaborators::respond))
        .route("/templates", get(templates::list).post(templates::template_new))
        .route(
            "/templates/{id}",
            get(templates::get).delete(templates::delete),
        )
        .route("/templates/{id}/use", post(templates::use_template))
        .route("/community", post(community::post_new))
        .route("/community/my-posts", get(community::my_posts))
        .route(
            "/community/posts/{id}",
            put(community::update).delete(community::delete),
        )
        .route("/community/posts/{id}/like", post(community::toggle_like))
        .route("/community/posts/{id}/comments", post(community::comment))
}

fn router(state: ServerState) -> Router {
    protected_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .merge(public_routes())
        .with_state(state)
}

/// The full API router, ready to be served or driven in tests.
pub fn app(engine: Engine, auth: AuthSettings) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
        auth: Arc::new(auth),
    })
}

pub async fn run_with_listener(
    engine: Engine,
    auth: AuthSettings,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine, auth)).await
}
