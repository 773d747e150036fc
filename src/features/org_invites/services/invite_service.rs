use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::database::map_constraint_error;
use crate::core::error::{AppError, Result};
use crate::features::org_invites::dtos::SendInviteDto;
use crate::features::org_invites::models::{default_invite_message, InviteStatus, OrganizationInvite};
use crate::features::organizations::OrganizationService;
use crate::features::users::models::User;
use crate::features::users::UserService;

/// Select list for an invite `i` joined with organization `o` and inviter `u`
const INVITE_SELECT: &str = "i.id, i.organization_id, o.name AS organization_name, \
     i.invited_user_id, i.invited_by, u.username AS invited_by_username, i.role, i.message, \
     i.status, i.created_at, i.responded_at";

/// Service for organization invites
pub struct InviteService {
    pool: PgPool,
    users: Arc<UserService>,
    organizations: Arc<OrganizationService>,
}

impl InviteService {
    pub fn new(
        pool: PgPool,
        users: Arc<UserService>,
        organizations: Arc<OrganizationService>,
    ) -> Self {
        Self {
            pool,
            users,
            organizations,
        }
    }

    pub async fn send(&self, dto: SendInviteDto, inviter: &User) -> Result<OrganizationInvite> {
        let invitee = self.users.find_by_reference(dto.invited_user_id.trim()).await?;
        if invitee.id == inviter.id {
            return Err(AppError::BadRequest("You cannot invite yourself".to_string()));
        }

        let organization = match dto.organization_id {
            Some(id) => self.organizations.require_owner(id, inviter.id).await?,
            None => self.organizations.find_or_create_owned(inviter).await?,
        };

        if self
            .organizations
            .membership(&organization, invitee.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "{} is already a member of {}",
                invitee.username, organization.name
            )));
        }

        let message = dto
            .message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default_invite_message(dto.role));

        let query = format!(
            r#"
            WITH i AS (
                INSERT INTO organization_invites (organization_id, invited_user_id, invited_by, role, message)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            SELECT {}
            FROM i
            JOIN organizations o ON o.id = i.organization_id
            JOIN users u ON u.id = i.invited_by
            "#,
            INVITE_SELECT
        );
        let invite = sqlx::query_as::<_, OrganizationInvite>(&query)
            .bind(organization.id)
            .bind(invitee.id)
            .bind(inviter.id)
            .bind(dto.role.as_str())
            .bind(&message)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                map_constraint_error(e, "A pending invite already exists for this user")
            })?;

        info!(
            "Invite sent: id={}, organization={}, invitee={}, role={}",
            invite.id, organization.id, invitee.id, invite.role
        );
        Ok(invite)
    }

    /// Pending invites addressed to `user_id`; only that user may ask
    pub async fn pending_for(&self, user_id: Uuid, caller_id: Uuid) -> Result<Vec<OrganizationInvite>> {
        if user_id != caller_id {
            return Err(AppError::Forbidden(
                "You can only list your own invites".to_string(),
            ));
        }

        let query = format!(
            r#"
            SELECT {}
            FROM organization_invites i
            JOIN organizations o ON o.id = i.organization_id
            JOIN users u ON u.id = i.invited_by
            WHERE i.invited_user_id = $1 AND i.status = $2
            ORDER BY i.created_at DESC
            "#,
            INVITE_SELECT
        );
        let invites = sqlx::query_as::<_, OrganizationInvite>(&query)
            .bind(user_id)
            .bind(InviteStatus::Pending.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(invites)
    }

    /// Mark the invite accepted and add the membership in one transaction
    pub async fn accept(&self, invite_id: Uuid, caller_id: Uuid) -> Result<OrganizationInvite> {
        let mut tx = self.pool.begin().await?;
        let invite = respond(&mut tx, invite_id, caller_id, InviteStatus::Accepted).await?;

        sqlx::query(
            r#"
            INSERT INTO organization_members (organization_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (organization_id, user_id) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(invite.organization_id)
        .bind(invite.invited_user_id)
        .bind(&invite.role)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Invite accepted: id={}, organization={}, user={}, role={}",
            invite.id, invite.organization_id, caller_id, invite.role
        );
        Ok(invite)
    }

    pub async fn reject(&self, invite_id: Uuid, caller_id: Uuid) -> Result<OrganizationInvite> {
        let mut tx = self.pool.begin().await?;
        let invite = respond(&mut tx, invite_id, caller_id, InviteStatus::Rejected).await?;
        tx.commit().await?;

        info!("Invite rejected: id={}, user={}", invite.id, caller_id);
        Ok(invite)
    }
}

/// Lock the invite row, check the caller may respond, and record `status`
async fn respond(
    tx: &mut Transaction<'_, Postgres>,
    invite_id: Uuid,
    caller_id: Uuid,
    status: InviteStatus,
) -> Result<OrganizationInvite> {
    let row = sqlx::query_as::<_, (Uuid, String)>(
        "SELECT invited_user_id, status FROM organization_invites WHERE id = $1 FOR UPDATE",
    )
    .bind(invite_id)
    .fetch_optional(&mut **tx)
    .await?;
    check_respondable(row, invite_id, caller_id)?;

    let query = format!(
        r#"
        WITH i AS (
            UPDATE organization_invites
            SET status = $1, responded_at = NOW()
            WHERE id = $2
            RETURNING *
        )
        SELECT {}
        FROM i
        JOIN organizations o ON o.id = i.organization_id
        JOIN users u ON u.id = i.invited_by
        "#,
        INVITE_SELECT
    );
    let invite = sqlx::query_as::<_, OrganizationInvite>(&query)
        .bind(status.as_str())
        .bind(invite_id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(invite)
}

/// Only the invitee may respond, and only once
fn check_respondable(
    row: Option<(Uuid, String)>,
    invite_id: Uuid,
    caller_id: Uuid,
) -> Result<()> {
    let (invitee_id, status) =
        row.ok_or_else(|| AppError::NotFound(format!("Invite {} not found", invite_id)))?;

    if invitee_id != caller_id {
        return Err(AppError::Forbidden(
            "This invite is addressed to another user".to_string(),
        ));
    }

    match InviteStatus::from_db(&status) {
        InviteStatus::Pending => Ok(()),
        other => Err(AppError::Conflict(format!(
            "Invite has already been {}",
            other.as_str()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_respondable() {
        let invite_id = Uuid::new_v4();
        let invitee = Uuid::new_v4();

        assert!(check_respondable(Some((invitee, "pending".into())), invite_id, invitee).is_ok());
        assert!(matches!(
            check_respondable(None, invite_id, invitee),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            check_respondable(Some((invitee, "pending".into())), invite_id, Uuid::new_v4()),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            check_respondable(Some((invitee, "accepted".into())), invite_id, invitee),
            Err(AppError::Conflict(msg)) if msg == "Invite has already been accepted"
        ));
    }
}
