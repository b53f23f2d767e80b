//! Storage and business rules of the travel planner.
//!
//! [`Engine`] is the single entry point: every public method authorizes the
//! requester against the trip, opens one database transaction, applies the
//! change and, when stops or activities move, re-aggregates the trip budget
//! before committing.

pub use api_types::Currency;
pub use budgets::{CostTotals, aggregate_costs};
pub use error::EngineError;
pub use money::{MAX_AMOUNT_MINOR, Money};
pub use ops::{Engine, EngineBuilder};

pub mod activities;
pub mod activity_catalog;
pub mod budgets;
pub mod cities;
pub mod community_posts;
pub mod post_comments;
pub mod post_likes;
pub mod saved_destinations;
pub mod shared_itineraries;
pub mod stops;
pub mod trip_collaborators;
pub mod trip_templates;
pub mod trips;
pub mod user_preferences;
pub mod user_profiles;
pub mod users;

mod credentials;
mod error;
mod money;
mod ops;
mod slug;
mod util;

pub use credentials::MIN_PASSWORD_LEN;

type ResultEngine<T> = Result<T, EngineError>;
