use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::types::CollaboratorRole;

/// Effective permission of a user on a media item.
///
/// Variants are ordered so that `permission >= MediaPermission::Reviewer`
/// reads as "at least reviewer".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaPermission {
    Viewer,
    Reviewer,
    Owner,
}

impl MediaPermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaPermission::Viewer => "viewer",
            MediaPermission::Reviewer => "reviewer",
            MediaPermission::Owner => "owner",
        }
    }
}

impl From<CollaboratorRole> for MediaPermission {
    fn from(role: CollaboratorRole) -> Self {
        match role {
            CollaboratorRole::Viewer => MediaPermission::Viewer,
            CollaboratorRole::Reviewer => MediaPermission::Reviewer,
        }
    }
}

impl std::fmt::Display for MediaPermission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_ordering() {
        assert!(MediaPermission::Owner > MediaPermission::Reviewer);
        assert!(MediaPermission::Reviewer > MediaPermission::Viewer);
        assert!(MediaPermission::from(CollaboratorRole::Reviewer) >= MediaPermission::Reviewer);
        assert!(MediaPermission::from(CollaboratorRole::Viewer) < MediaPermission::Reviewer);
    }
}
