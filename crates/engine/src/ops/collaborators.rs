use api_types::collaborator::{
    CollaboratorInvite, CollaboratorUpdate, CollaboratorUser, CollaboratorView, InvitationResponse,
    InvitationStatus,
};
use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, LoaderTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, trip_collaborators, trips, users,
    util::{normalize_email, parse_uuid},
};

use super::{Engine, with_tx};

fn collaborator_not_found() -> EngineError {
    EngineError::KeyNotFound("collaborator not exists".to_string())
}

fn check_transition(from: InvitationStatus, to: InvitationStatus) -> ResultEngine<()> {
    if !from.can_transition_to(to) {
        return Err(EngineError::Conflict(format!(
            "invitation cannot move from {from} to {to}"
        )));
    }
    Ok(())
}

impl Engine {
    async fn collaborator_views(
        &self,
        db: &DatabaseTransaction,
        rows: Vec<trip_collaborators::Model>,
    ) -> ResultEngine<Vec<CollaboratorView>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let people = rows.load_one(users::Entity, db).await?;
        let parents = rows.load_one(trips::Entity, db).await?;

        rows.iter()
            .zip(people)
            .zip(parents)
            .map(|((row, user), trip)| {
                let user = user.ok_or_else(|| {
                    EngineError::MissingRelation(format!("user of collaborator {}", row.id))
                })?;
                Ok(CollaboratorView {
                    id: parse_uuid(&row.id, "collaborator")?,
                    trip_id: parse_uuid(&row.trip_id, "trip")?,
                    trip_name: trip.map(|t| t.name).unwrap_or_default(),
                    user: CollaboratorUser {
                        id: parse_uuid(&user.id, "user")?,
                        email: user.email,
                        first_name: user.first_name,
                        last_name: user.last_name,
                    },
                    invited_by: parse_uuid(&row.invited_by, "user")?,
                    permission_level: row.permission_level()?,
                    status: row.status()?,
                    invited_at: row.invited_at,
                    responded_at: row.responded_at,
                })
            })
            .collect()
    }

    async fn collaborator_view(
        &self,
        db: &DatabaseTransaction,
        row: trip_collaborators::Model,
    ) -> ResultEngine<CollaboratorView> {
        self.collaborator_views(db, vec![row])
            .await?
            .pop()
            .ok_or_else(collaborator_not_found)
    }

    /// Collaborator row together with its trip, checked for owner or admin
    /// access of `user_id`.
    async fn require_managed_collaborator(
        &self,
        db: &DatabaseTransaction,
        collaborator_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(trip_collaborators::Model, trips::Model)> {
        let row = trip_collaborators::Entity::find_by_id(collaborator_id.to_string())
            .one(db)
            .await?
            .ok_or_else(collaborator_not_found)?;
        let trip_id = parse_uuid(&row.trip_id, "trip")?;
        let (trip, access) = self
            .require_trip_access(db, trip_id, user_id)
            .await
            .map_err(|err| match err {
                EngineError::KeyNotFound(_) => collaborator_not_found(),
                other => other,
            })?;
        if !access.can_manage_collaborators() {
            return Err(EngineError::Forbidden(
                "only the owner or an admin can manage collaborators".to_string(),
            ));
        }
        Ok((row, trip))
    }

    /// Collaborators of a trip, newest invitation first.
    pub async fn list_collaborators(
        &self,
        trip_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<CollaboratorView>> {
        with_tx!(self, |db_tx| {
            let trip = self.require_trip_read(&db_tx, trip_id, user_id).await?;
            let rows = trip_collaborators::Entity::find()
                .filter(trip_collaborators::Column::TripId.eq(trip.id))
                .order_by_desc(trip_collaborators::Column::InvitedAt)
                .all(&db_tx)
                .await?;
            self.collaborator_views(&db_tx, rows).await
        })
    }

    /// Invite a registered user by email.
    ///
    /// A declined or revoked invitation is reopened as pending; a pending or
    /// accepted one is a duplicate.
    pub async fn invite_collaborator(
        &self,
        trip_id: Uuid,
        user_id: &str,
        invite: CollaboratorInvite,
    ) -> ResultEngine<CollaboratorView> {
        let email = normalize_email(&invite.email)?;
        let level = invite.permission_level.unwrap_or_default();

        with_tx!(self, |db_tx| {
            let trip = self.require_trip_manager(&db_tx, trip_id, user_id).await?;
            let invitee = self
                .user_by_email(&db_tx, &email)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;
            if invitee.id == trip.user_id {
                return Err(EngineError::invalid(
                    "email",
                    "the trip owner cannot be invited",
                ));
            }

            let existing = trip_collaborators::Entity::find()
                .filter(trip_collaborators::Column::TripId.eq(trip.id.clone()))
                .filter(trip_collaborators::Column::UserId.eq(invitee.id.clone()))
                .one(&db_tx)
                .await?;
            let now = Utc::now();
            let row = match existing {
                Some(row) => {
                    let status = row.status()?;
                    if matches!(status, InvitationStatus::Pending | InvitationStatus::Accepted) {
                        return Err(EngineError::ExistingKey(email));
                    }
                    trip_collaborators::ActiveModel {
                        id: ActiveValue::Set(row.id),
                        invited_by: ActiveValue::Set(user_id.to_string()),
                        permission_level: ActiveValue::Set(level.as_str().to_string()),
                        status: ActiveValue::Set(InvitationStatus::Pending.as_str().to_string()),
                        invited_at: ActiveValue::Set(now),
                        responded_at: ActiveValue::Set(None),
                        ..Default::default()
                    }
                    .update(&db_tx)
                    .await?
                }
                None => {
                    trip_collaborators::ActiveModel {
                        id: ActiveValue::Set(Uuid::new_v4().to_string()),
                        trip_id: ActiveValue::Set(trip.id.clone()),
                        user_id: ActiveValue::Set(invitee.id.clone()),
                        invited_by: ActiveValue::Set(user_id.to_string()),
                        permission_level: ActiveValue::Set(level.as_str().to_string()),
                        status: ActiveValue::Set(InvitationStatus::Pending.as_str().to_string()),
                        invited_at: ActiveValue::Set(now),
                        responded_at: ActiveValue::Set(None),
                    }
                    .insert(&db_tx)
                    .await?
                }
            };
            self.collaborator_view(&db_tx, row).await
        })
    }

    /// Change the permission level of a collaborator or revoke it.
    ///
    /// Accepting and declining belong to the invitee, see
    /// [`Engine::respond_invitation`].
    pub async fn update_collaborator(
        &self,
        collaborator_id: Uuid,
        user_id: &str,
        update: CollaboratorUpdate,
    ) -> ResultEngine<CollaboratorView> {
        with_tx!(self, |db_tx| {
            let (row, _) = self
                .require_managed_collaborator(&db_tx, collaborator_id, user_id)
                .await?;
            let mut active = trip_collaborators::ActiveModel {
                id: ActiveValue::Unchanged(row.id.clone()),
                ..Default::default()
            };
            if let Some(level) = update.permission_level {
                active.permission_level = ActiveValue::Set(level.as_str().to_string());
            }
            if let Some(status) = update.status {
                if status != InvitationStatus::Revoked {
                    return Err(EngineError::Forbidden(
                        "only the invitee can accept or decline an invitation".to_string(),
                    ));
                }
                check_transition(row.status()?, status)?;
                active.status = ActiveValue::Set(status.as_str().to_string());
            }
            let row = if active.is_changed() {
                active.update(&db_tx).await?
            } else {
                row
            };
            self.collaborator_view(&db_tx, row).await
        })
    }

    pub async fn remove_collaborator(
        &self,
        collaborator_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (row, _) = self
                .require_managed_collaborator(&db_tx, collaborator_id, user_id)
                .await?;
            trip_collaborators::Entity::delete_by_id(row.id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Invitations addressed to `user_id`, newest first.
    pub async fn my_invitations(&self, user_id: &str) -> ResultEngine<Vec<CollaboratorView>> {
        with_tx!(self, |db_tx| {
            let rows = trip_collaborators::Entity::find()
                .filter(trip_collaborators::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(trip_collaborators::Column::InvitedAt)
                .all(&db_tx)
                .await?;
            self.collaborator_views(&db_tx, rows).await
        })
    }

    /// Accept or decline an invitation. Only the invitee can answer.
    pub async fn respond_invitation(
        &self,
        collaborator_id: Uuid,
        user_id: &str,
        response: InvitationResponse,
    ) -> ResultEngine<CollaboratorView> {
        let next = if response.accept {
            InvitationStatus::Accepted
        } else {
            InvitationStatus::Declined
        };
        with_tx!(self, |db_tx| {
            let row = trip_collaborators::Entity::find_by_id(collaborator_id.to_string())
                .filter(trip_collaborators::Column::UserId.eq(user_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(collaborator_not_found)?;
            check_transition(row.status()?, next)?;
            let row = trip_collaborators::ActiveModel {
                id: ActiveValue::Set(row.id),
                status: ActiveValue::Set(next.as_str().to_string()),
                responded_at: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            self.collaborator_view(&db_tx, row).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_is_a_conflict() {
        assert!(check_transition(InvitationStatus::Pending, InvitationStatus::Accepted).is_ok());
        assert_eq!(
            check_transition(InvitationStatus::Declined, InvitationStatus::Accepted),
            Err(EngineError::Conflict(
                "invitation cannot move from declined to accepted".to_string()
            ))
        );
    }
}
