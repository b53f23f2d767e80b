use api_types::{
    share::{PublicTrip, ShareSettings, ShareView},
    trip::{TripStatus, TripView},
};
use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, activities,
    credentials::{hash_password, verify_password},
    shared_itineraries, slug, stops, trips,
};

use super::{Engine, with_tx};

/// Attempts at drawing a slug that is not taken yet.
const SLUG_ATTEMPTS: usize = 5;

fn share_not_found() -> EngineError {
    EngineError::KeyNotFound("shared trip not exists".to_string())
}

impl Engine {
    async fn unused_slug(&self, db: &DatabaseTransaction, name: &str) -> ResultEngine<String> {
        for _ in 0..SLUG_ATTEMPTS {
            let candidate = slug::public_slug(name);
            let taken = shared_itineraries::Entity::find()
                .filter(shared_itineraries::Column::PublicSlug.eq(candidate.clone()))
                .one(db)
                .await?
                .is_some();
            if !taken {
                return Ok(candidate);
            }
        }
        Err(EngineError::Conflict(
            "could not generate a unique public slug".to_string(),
        ))
    }

    /// Shared trip behind `slug`, if it is public, not expired and the
    /// password (when required) matches.
    async fn resolve_share(
        &self,
        db: &DatabaseTransaction,
        slug: &str,
        password: Option<&str>,
    ) -> ResultEngine<(shared_itineraries::Model, trips::Model)> {
        let share = shared_itineraries::Entity::find()
            .filter(shared_itineraries::Column::PublicSlug.eq(slug.to_string()))
            .one(db)
            .await?
            .ok_or_else(share_not_found)?;
        let trip = trips::Entity::find_by_id(share.trip_id.clone())
            .one(db)
            .await?
            .ok_or_else(share_not_found)?;
        if !trip.is_public || share.is_expired(Utc::now()) {
            return Err(share_not_found());
        }
        if share.password_protected {
            let hash = share.access_password_hash.as_deref().unwrap_or_default();
            let matches = match password {
                Some(pw) => verify_password(pw, hash, self.pepper())?,
                None => false,
            };
            if !matches {
                return Err(EngineError::Forbidden(
                    "a valid share password is required".to_string(),
                ));
            }
        }
        Ok((share, trip))
    }

    /// Publish a trip: create its share link on first use, apply `settings`
    /// and mark the trip public. Owner only.
    pub async fn share_trip(
        &self,
        trip_id: Uuid,
        user_id: &str,
        settings: ShareSettings,
    ) -> ResultEngine<ShareView> {
        let password_hash = match &settings.password {
            Some(Some(pw)) if !pw.is_empty() => Some(Some(hash_password(pw, self.pepper())?)),
            Some(_) => Some(None),
            None => None,
        };

        with_tx!(self, |db_tx| {
            let trip = self.require_trip_owner(&db_tx, trip_id, user_id).await?;
            let existing = shared_itineraries::Entity::find()
                .filter(shared_itineraries::Column::TripId.eq(trip.id.clone()))
                .one(&db_tx)
                .await?;
            let share = match existing {
                Some(share) => share,
                None => {
                    let slug = self.unused_slug(&db_tx, &trip.name).await?;
                    shared_itineraries::ActiveModel {
                        id: ActiveValue::Set(Uuid::new_v4().to_string()),
                        trip_id: ActiveValue::Set(trip.id.clone()),
                        public_slug: ActiveValue::Set(slug),
                        allow_comments: ActiveValue::Set(true),
                        allow_copying: ActiveValue::Set(true),
                        password_protected: ActiveValue::Set(false),
                        access_password_hash: ActiveValue::Set(None),
                        view_count: ActiveValue::Set(0),
                        copy_count: ActiveValue::Set(0),
                        created_at: ActiveValue::Set(Utc::now()),
                        expires_at: ActiveValue::Set(None),
                    }
                    .insert(&db_tx)
                    .await?
                }
            };

            let mut active = shared_itineraries::ActiveModel {
                id: ActiveValue::Unchanged(share.id.clone()),
                ..Default::default()
            };
            if let Some(allow) = settings.allow_comments {
                active.allow_comments = ActiveValue::Set(allow);
            }
            if let Some(allow) = settings.allow_copying {
                active.allow_copying = ActiveValue::Set(allow);
            }
            if let Some(hash) = password_hash {
                active.password_protected = ActiveValue::Set(hash.is_some());
                active.access_password_hash = ActiveValue::Set(hash);
            }
            if let Some(expires_at) = settings.expires_at {
                active.expires_at = ActiveValue::Set(expires_at);
            }
            let share = if active.is_changed() {
                active.update(&db_tx).await?
            } else {
                share
            };

            if !trip.is_public {
                trips::ActiveModel {
                    id: ActiveValue::Set(trip.id.clone()),
                    is_public: ActiveValue::Set(true),
                    updated_at: ActiveValue::Set(Utc::now()),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
            }
            Ok(share.to_view())
        })
    }

    /// Make a trip private again. The slug is kept for a later share.
    pub async fn unshare_trip(&self, trip_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_owner(&db_tx, trip_id, user_id).await?;
            trips::ActiveModel {
                id: ActiveValue::Set(trip.id),
                is_public: ActiveValue::Set(false),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Read-only view of a shared trip. Counts one view.
    pub async fn public_trip(&self, slug: &str, password: Option<&str>) -> ResultEngine<PublicTrip> {
        with_tx!(self, |db_tx| {
            let (share, trip) = self.resolve_share(&db_tx, slug, password).await?;
            shared_itineraries::Entity::update_many()
                .col_expr(
                    shared_itineraries::Column::ViewCount,
                    Expr::col(shared_itineraries::Column::ViewCount).add(1),
                )
                .filter(shared_itineraries::Column::Id.eq(share.id.clone()))
                .exec(&db_tx)
                .await?;
            let owner = self.require_user(&db_tx, &trip.user_id).await?;
            let stops = self.stop_details(&db_tx, &trip).await?;
            Ok(PublicTrip {
                trip: trip.to_view()?,
                stops,
                owner_name: owner.full_name(),
                allow_comments: share.allow_comments,
                allow_copying: share.allow_copying,
                view_count: share.view_count + 1,
            })
        })
    }

    /// Copy a shared trip into the requester's account as a private trip in
    /// planning. Counts one copy.
    pub async fn copy_public_trip(
        &self,
        slug: &str,
        user_id: &str,
        password: Option<&str>,
    ) -> ResultEngine<TripView> {
        with_tx!(self, |db_tx| {
            let (share, source) = self.resolve_share(&db_tx, slug, password).await?;
            if !share.allow_copying {
                return Err(EngineError::Forbidden(
                    "copying is not allowed for this trip".to_string(),
                ));
            }
            self.require_user(&db_tx, user_id).await?;

            let now = Utc::now();
            let copy = self
                .insert_trip(
                    &db_tx,
                    trips::ActiveModel {
                        id: ActiveValue::Set(Uuid::new_v4().to_string()),
                        user_id: ActiveValue::Set(user_id.to_string()),
                        name: ActiveValue::Set(format!("{} (copy)", source.name)),
                        description: ActiveValue::Set(source.description.clone()),
                        start_date: ActiveValue::Set(source.start_date),
                        end_date: ActiveValue::Set(source.end_date),
                        cover_image_url: ActiveValue::Set(source.cover_image_url.clone()),
                        is_public: ActiveValue::Set(false),
                        status: ActiveValue::Set(TripStatus::Planning.as_str().to_string()),
                        estimated_budget_minor: ActiveValue::Set(source.estimated_budget_minor),
                        actual_budget_minor: ActiveValue::Set(None),
                        currency: ActiveValue::Set(source.currency.clone()),
                        collaborators_can_edit: ActiveValue::Set(false),
                        auto_calculate_budget: ActiveValue::Set(true),
                        created_at: ActiveValue::Set(now),
                        updated_at: ActiveValue::Set(now),
                    },
                )
                .await?;
            self.copy_itinerary(&db_tx, &source.id, &copy.id).await?;
            self.sync_trip_budget(&db_tx, &copy, true).await?;

            shared_itineraries::Entity::update_many()
                .col_expr(
                    shared_itineraries::Column::CopyCount,
                    Expr::col(shared_itineraries::Column::CopyCount).add(1),
                )
                .filter(shared_itineraries::Column::Id.eq(share.id))
                .exec(&db_tx)
                .await?;
            copy.to_view()
        })
    }

    /// Duplicate stops and activities of one trip into another. Booking and
    /// payment state is not carried over.
    async fn copy_itinerary(
        &self,
        db: &DatabaseTransaction,
        source_trip_id: &str,
        target_trip_id: &str,
    ) -> ResultEngine<()> {
        let source_stops = self.ordered_stops(db, source_trip_id).await?;
        let mut grouped = self
            .activities_by_stop(db, &source_stops)
            .await?;
        let now = Utc::now();
        for stop in source_stops {
            let stop_activities = grouped.remove(&stop.id).unwrap_or_default();
            let mut new_stop: stops::ActiveModel = stop.into();
            new_stop.id = ActiveValue::Set(Uuid::new_v4().to_string());
            new_stop.trip_id = ActiveValue::Set(target_trip_id.to_string());
            new_stop.created_at = ActiveValue::Set(now);
            new_stop.updated_at = ActiveValue::Set(now);
            let new_stop = new_stop.reset_all().insert(db).await?;

            for activity in stop_activities {
                let mut copy: activities::ActiveModel = activity.into();
                copy.id = ActiveValue::Set(Uuid::new_v4().to_string());
                copy.stop_id = ActiveValue::Set(new_stop.id.clone());
                copy.is_booked = ActiveValue::Set(false);
                copy.is_paid = ActiveValue::Set(false);
                copy.booking_reference = ActiveValue::Set(None);
                copy.created_at = ActiveValue::Set(now);
                copy.updated_at = ActiveValue::Set(now);
                copy.reset_all().insert(db).await?;
            }
        }
        Ok(())
    }
}
