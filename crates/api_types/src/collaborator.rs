use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

string_enum! {
    /// What an accepted collaborator may do on a trip.
    #[derive(Default)]
    pub enum PermissionLevel("permission level") {
        #[default]
        View => "view",
        Comment => "comment",
        Edit => "edit",
        Admin => "admin",
    }
}

string_enum! {
    #[derive(Default)]
    pub enum InvitationStatus("invitation status") {
        #[default]
        Pending => "pending",
        Accepted => "accepted",
        Declined => "declined",
        Revoked => "revoked",
    }
}

impl InvitationStatus {
    /// Allowed transitions: pending → accepted/declined/revoked and
    /// accepted → revoked. Declined and revoked are terminal.
    pub const fn can_transition_to(self, next: InvitationStatus) -> bool {
        matches!(
            (self, next),
            (
                Self::Pending,
                Self::Accepted | Self::Declined | Self::Revoked
            ) | (Self::Accepted, Self::Revoked)
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CollaboratorInvite {
    pub email: String,
    #[serde(default)]
    pub permission_level: Option<PermissionLevel>,
}

/// Owner/admin update of a collaborator: change permission or revoke.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CollaboratorUpdate {
    #[serde(default)]
    pub permission_level: Option<PermissionLevel>,
    #[serde(default)]
    pub status: Option<InvitationStatus>,
}

/// Invitee answer to an invitation.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct InvitationResponse {
    pub accept: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CollaboratorView {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub trip_name: String,
    pub user: CollaboratorUser,
    pub invited_by: Uuid,
    pub permission_level: PermissionLevel,
    pub status: InvitationStatus,
    pub invited_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}
