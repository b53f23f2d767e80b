use api_types::collaborator::{InvitationStatus, PermissionLevel};
use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, activities, stops, trip_collaborators, trips, users};

use super::Engine;

/// How the requester reaches a trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum TripAccess {
    Owner,
    /// Accepted collaborator.
    Collaborator(PermissionLevel),
}

impl TripAccess {
    pub(super) fn can_write(self, trip: &trips::Model) -> bool {
        match self {
            Self::Owner | Self::Collaborator(PermissionLevel::Admin) => true,
            Self::Collaborator(PermissionLevel::Edit) => trip.collaborators_can_edit,
            Self::Collaborator(_) => false,
        }
    }

    pub(super) fn can_manage_collaborators(self) -> bool {
        matches!(self, Self::Owner | Self::Collaborator(PermissionLevel::Admin))
    }
}

fn trip_not_found() -> EngineError {
    EngineError::KeyNotFound("trip not exists".to_string())
}

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Accepted collaboration of `user_id` on `trip_id`, if any.
    pub(super) async fn accepted_permission(
        &self,
        db: &DatabaseTransaction,
        trip_id: &str,
        user_id: &str,
    ) -> ResultEngine<Option<PermissionLevel>> {
        let row = trip_collaborators::Entity::find()
            .filter(trip_collaborators::Column::TripId.eq(trip_id.to_string()))
            .filter(trip_collaborators::Column::UserId.eq(user_id.to_string()))
            .filter(trip_collaborators::Column::Status.eq(InvitationStatus::Accepted.as_str()))
            .one(db)
            .await?;
        row.as_ref().map(|m| m.permission_level()).transpose()
    }

    pub(super) async fn trip_access(
        &self,
        db: &DatabaseTransaction,
        trip: &trips::Model,
        user_id: &str,
    ) -> ResultEngine<Option<TripAccess>> {
        if trip.user_id == user_id {
            return Ok(Some(TripAccess::Owner));
        }
        Ok(self
            .accepted_permission(db, &trip.id, user_id)
            .await?
            .map(TripAccess::Collaborator))
    }

    /// Trip visible to the requester, with the way it is reached.
    pub(super) async fn require_trip_access(
        &self,
        db: &DatabaseTransaction,
        trip_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(trips::Model, TripAccess)> {
        let trip = trips::Entity::find_by_id(trip_id.to_string())
            .one(db)
            .await?
            .ok_or_else(trip_not_found)?;
        let access = self
            .trip_access(db, &trip, user_id)
            .await?
            .ok_or_else(trip_not_found)?;
        Ok((trip, access))
    }

    pub(super) async fn require_trip_read(
        &self,
        db: &DatabaseTransaction,
        trip_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<trips::Model> {
        self.require_trip_access(db, trip_id, user_id)
            .await
            .map(|(trip, _)| trip)
    }

    pub(super) async fn require_trip_write(
        &self,
        db: &DatabaseTransaction,
        trip_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<trips::Model> {
        let (trip, access) = self.require_trip_access(db, trip_id, user_id).await?;
        if !access.can_write(&trip) {
            return Err(EngineError::Forbidden(
                "no write permission on trip".to_string(),
            ));
        }
        Ok(trip)
    }

    pub(super) async fn require_trip_owner(
        &self,
        db: &DatabaseTransaction,
        trip_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<trips::Model> {
        let (trip, access) = self.require_trip_access(db, trip_id, user_id).await?;
        if access != TripAccess::Owner {
            return Err(EngineError::Forbidden(
                "only the trip owner can do this".to_string(),
            ));
        }
        Ok(trip)
    }

    pub(super) async fn require_trip_manager(
        &self,
        db: &DatabaseTransaction,
        trip_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<trips::Model> {
        let (trip, access) = self.require_trip_access(db, trip_id, user_id).await?;
        if !access.can_manage_collaborators() {
            return Err(EngineError::Forbidden(
                "only the owner or an admin can manage collaborators".to_string(),
            ));
        }
        Ok(trip)
    }

    async fn stop_with_trip(
        &self,
        db: &DatabaseTransaction,
        stop_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(stops::Model, trips::Model, TripAccess)> {
        let not_found = || EngineError::KeyNotFound("stop not exists".to_string());
        let (stop, trip) = stops::Entity::find_by_id(stop_id.to_string())
            .find_also_related(trips::Entity)
            .one(db)
            .await?
            .ok_or_else(not_found)?;
        let trip = trip.ok_or_else(not_found)?;
        let access = self
            .trip_access(db, &trip, user_id)
            .await?
            .ok_or_else(not_found)?;
        Ok((stop, trip, access))
    }

    pub(super) async fn require_stop_read(
        &self,
        db: &DatabaseTransaction,
        stop_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(stops::Model, trips::Model)> {
        let (stop, trip, _) = self.stop_with_trip(db, stop_id, user_id).await?;
        Ok((stop, trip))
    }

    pub(super) async fn require_stop_write(
        &self,
        db: &DatabaseTransaction,
        stop_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(stops::Model, trips::Model)> {
        let (stop, trip, access) = self.stop_with_trip(db, stop_id, user_id).await?;
        if !access.can_write(&trip) {
            return Err(EngineError::Forbidden(
                "no write permission on trip".to_string(),
            ));
        }
        Ok((stop, trip))
    }

    async fn activity_with_trip(
        &self,
        db: &DatabaseTransaction,
        activity_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(activities::Model, trips::Model, TripAccess)> {
        let not_found = || EngineError::KeyNotFound("activity not exists".to_string());
        let (activity, trip) = activities::Entity::find_by_id(activity_id.to_string())
            .find_also_related(trips::Entity)
            .one(db)
            .await?
            .ok_or_else(not_found)?;
        let trip = trip.ok_or_else(not_found)?;
        let access = self
            .trip_access(db, &trip, user_id)
            .await?
            .ok_or_else(not_found)?;
        Ok((activity, trip, access))
    }

    pub(super) async fn require_activity_read(
        &self,
        db: &DatabaseTransaction,
        activity_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(activities::Model, trips::Model)> {
        let (activity, trip, _) = self.activity_with_trip(db, activity_id, user_id).await?;
        Ok((activity, trip))
    }

    pub(super) async fn require_activity_write(
        &self,
        db: &DatabaseTransaction,
        activity_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(activities::Model, trips::Model)> {
        let (activity, trip, access) = self.activity_with_trip(db, activity_id, user_id).await?;
        if !access.can_write(&trip) {
            return Err(EngineError::Forbidden(
                "no write permission on trip".to_string(),
            ));
        }
        Ok((activity, trip))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;

    fn trip(collaborators_can_edit: bool) -> trips::Model {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        trips::Model {
            id: Uuid::new_v4().to_string(),
            user_id: Uuid::new_v4().to_string(),
            name: "Rome".to_string(),
            description: None,
            start_date: day,
            end_date: day,
            cover_image_url: None,
            is_public: false,
            status: "planning".to_string(),
            estimated_budget_minor: None,
            actual_budget_minor: None,
            currency: "USD".to_string(),
            collaborators_can_edit,
            auto_calculate_budget: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn edit_permission_follows_trip_flag() {
        let edit = TripAccess::Collaborator(PermissionLevel::Edit);
        assert!(!edit.can_write(&trip(false)));
        assert!(edit.can_write(&trip(true)));
    }

    #[test]
    fn admin_and_owner_always_write() {
        for access in [
            TripAccess::Owner,
            TripAccess::Collaborator(PermissionLevel::Admin),
        ] {
            assert!(access.can_write(&trip(false)));
            assert!(access.can_manage_collaborators());
        }
    }

    #[test]
    fn view_and_comment_are_read_only() {
        for level in [PermissionLevel::View, PermissionLevel::Comment] {
            let access = TripAccess::Collaborator(level);
            assert!(!access.can_write(&trip(true)));
            assert!(!access.can_manage_collaborators());
        }
    }
}
