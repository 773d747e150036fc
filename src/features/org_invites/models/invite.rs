use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::types::CollaboratorRole;

/// Invite row with the organization's name and the inviter's username
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationInvite {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub organization_name: String,
    pub invited_user_id: Uuid,
    pub invited_by: Uuid,
    pub invited_by_username: String,
    pub role: String,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteStatus::Pending => "pending",
            InviteStatus::Accepted => "accepted",
            InviteStatus::Rejected => "rejected",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value {
            "accepted" => InviteStatus::Accepted,
            "rejected" => InviteStatus::Rejected,
            _ => InviteStatus::Pending,
        }
    }
}

/// Message used when the inviter does not write one
pub fn default_invite_message(role: CollaboratorRole) -> String {
    format!(
        "You have been invited to join an organization as a {}.",
        role
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_invite_message() {
        assert_eq!(
            default_invite_message(CollaboratorRole::Reviewer),
            "You have been invited to join an organization as a reviewer."
        );
    }

    #[test]
    fn test_invite_status_round_trips_db_values() {
        for status in [
            InviteStatus::Pending,
            InviteStatus::Accepted,
            InviteStatus::Rejected,
        ] {
            assert_eq!(InviteStatus::from_db(status.as_str()), status);
        }
    }
}
