use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::organizations::models::{
    default_organization_name, Organization, OrganizationMember, OrganizationRole,
    OrganizationSummary,
};
use crate::features::users::models::User;
use crate::shared::types::CollaboratorRole;

/// Service for organizations and their members
pub struct OrganizationService {
    pool: PgPool,
}

impl OrganizationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Organization> {
        sqlx::query_as::<_, Organization>(
            "SELECT id, name, owner_id, created_at FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Organization {} not found", id)))
    }

    /// `None` when the user neither owns nor belongs to the organization
    pub async fn membership(
        &self,
        organization: &Organization,
        user_id: Uuid,
    ) -> Result<Option<OrganizationRole>> {
        if organization.owner_id == user_id {
            return Ok(Some(OrganizationRole::Owner));
        }

        let role = sqlx::query_scalar::<_, String>(
            "SELECT role FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization.id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(role.map(|r| OrganizationRole::from_db(&r)))
    }

    /// Load an organization and require that the caller owns it
    pub async fn require_owner(&self, id: Uuid, user_id: Uuid) -> Result<Organization> {
        let organization = self.get(id).await?;
        if organization.owner_id != user_id {
            return Err(AppError::Forbidden(
                "Only the organization owner can do this".to_string(),
            ));
        }
        Ok(organization)
    }

    /// Organizations the user owns or belongs to
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrganizationSummary>> {
        let organizations = sqlx::query_as::<_, OrganizationSummary>(
            r#"
            SELECT o.id, o.name, o.owner_id,
                   CASE WHEN o.owner_id = $1 THEN 'owner' ELSE m.role END AS role,
                   (SELECT COUNT(*) FROM organization_members mm WHERE mm.organization_id = o.id) AS member_count,
                   o.created_at
            FROM organizations o
            LEFT JOIN organization_members m ON m.organization_id = o.id AND m.user_id = $1
            WHERE o.owner_id = $1 OR m.user_id IS NOT NULL
            ORDER BY o.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(organizations)
    }

    pub async fn create(&self, name: &str, owner_id: Uuid) -> Result<Organization> {
        let organization = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (name, owner_id)
            VALUES ($1, $2)
            RETURNING id, name, owner_id, created_at
            "#,
        )
        .bind(name.trim())
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Organization created: id={}, name={}, owner={}",
            organization.id, organization.name, owner_id
        );
        Ok(organization)
    }

    /// The user's first owned organization, created if they own none.
    ///
    /// Lookup and insert run under a per-owner advisory lock so concurrent
    /// callers end up with the same organization.
    pub async fn find_or_create_owned(&self, owner: &User) -> Result<Organization> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(owned_organization_lock_key(owner.id))
            .execute(&mut *tx)
            .await?;

        let existing = sqlx::query_as::<_, Organization>(
            r#"
            SELECT id, name, owner_id, created_at
            FROM organizations
            WHERE owner_id = $1
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(owner.id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(organization) = existing {
            tx.commit().await?;
            return Ok(organization);
        }

        let organization = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (name, owner_id)
            VALUES ($1, $2)
            RETURNING id, name, owner_id, created_at
            "#,
        )
        .bind(default_organization_name(&owner.username))
        .bind(owner.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Organization created: id={}, name={}, owner={}",
            organization.id, organization.name, owner.id
        );
        Ok(organization)
    }

    pub async fn members(&self, organization_id: Uuid) -> Result<Vec<OrganizationMember>> {
        let members = sqlx::query_as::<_, OrganizationMember>(
            r#"
            SELECT m.user_id, u.username, u.email, m.role, m.joined_at
            FROM organization_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.organization_id = $1
            ORDER BY m.joined_at ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    /// Organization with members; the caller must own or belong to it
    pub async fn get_detail(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<(Organization, OrganizationRole, Vec<OrganizationMember>)> {
        let organization = self.get(id).await?;
        let role = self
            .membership(&organization, user_id)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("You are not a member of this organization".to_string())
            })?;
        let members = self.members(id).await?;
        Ok((organization, role, members))
    }

    pub async fn update_member_role(
        &self,
        organization_id: Uuid,
        member_id: Uuid,
        role: CollaboratorRole,
        caller_id: Uuid,
    ) -> Result<OrganizationMember> {
        self.require_owner(organization_id, caller_id).await?;

        let member = sqlx::query_as::<_, OrganizationMember>(
            r#"
            WITH m AS (
                UPDATE organization_members SET role = $1
                WHERE organization_id = $2 AND user_id = $3
                RETURNING *
            )
            SELECT m.user_id, u.username, u.email, m.role, m.joined_at
            FROM m
            JOIN users u ON u.id = m.user_id
            "#,
        )
        .bind(role.as_str())
        .bind(organization_id)
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} is not a member", member_id)))?;

        info!(
            "Member role updated: organization={}, user={}, role={}",
            organization_id, member_id, role
        );
        Ok(member)
    }

    /// Remove a member; the owner may remove anyone, a member may leave
    pub async fn remove_member(
        &self,
        organization_id: Uuid,
        member_id: Uuid,
        caller_id: Uuid,
    ) -> Result<()> {
        let organization = self.get(organization_id).await?;
        if organization.owner_id != caller_id && member_id != caller_id {
            return Err(AppError::Forbidden(
                "Only the owner can remove other members".to_string(),
            ));
        }
        if member_id == organization.owner_id {
            return Err(AppError::BadRequest(
                "The owner cannot be removed from their organization".to_string(),
            ));
        }

        let result = sqlx::query(
            "DELETE FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(member_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "User {} is not a member",
                member_id
            )));
        }

        info!(
            "Member removed: organization={}, user={}, by={}",
            organization_id, member_id, caller_id
        );
        Ok(())
    }
}

/// Advisory lock key guarding creation of a user's default organization
fn owned_organization_lock_key(owner_id: Uuid) -> i64 {
    let (high, low) = owner_id.as_u64_pair();
    (high ^ low) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_organization_lock_key_is_stable_per_owner() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert_eq!(
            owned_organization_lock_key(owner),
            owned_organization_lock_key(owner)
        );
        assert_ne!(
            owned_organization_lock_key(owner),
            owned_organization_lock_key(other)
        );
    }
}
