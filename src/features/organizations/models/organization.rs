use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::types::CollaboratorRole;

#[derive(Debug, Clone, FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Organization as listed for one user, with that user's role
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationSummary {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub role: String,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct OrganizationMember {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

/// A user's standing in an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationRole {
    Owner,
    Reviewer,
    Viewer,
}

impl OrganizationRole {
    pub fn from_db(value: &str) -> Self {
        match value {
            "owner" => OrganizationRole::Owner,
            other => CollaboratorRole::from_db(other).into(),
        }
    }
}

impl From<CollaboratorRole> for OrganizationRole {
    fn from(role: CollaboratorRole) -> Self {
        match role {
            CollaboratorRole::Viewer => OrganizationRole::Viewer,
            CollaboratorRole::Reviewer => OrganizationRole::Reviewer,
        }
    }
}

/// Name given to the organization created implicitly for an inviter
pub fn default_organization_name(username: &str) -> String {
    format!("{}'s Organization", username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_role_from_db() {
        assert_eq!(OrganizationRole::from_db("owner"), OrganizationRole::Owner);
        assert_eq!(OrganizationRole::from_db("reviewer"), OrganizationRole::Reviewer);
        assert_eq!(OrganizationRole::from_db("viewer"), OrganizationRole::Viewer);
    }

    #[test]
    fn test_default_organization_name() {
        assert_eq!(default_organization_name("maya"), "maya's Organization");
    }
}
