use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

// =============================================================================
// COLLABORATOR ROLES
// =============================================================================

/// Role granted to a collaborator, either as an organization member or on a
/// media share. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorRole {
    /// Can view media, read comments and annotations, join the media room
    Viewer,
    /// Viewer rights plus creating comments and annotations
    Reviewer,
}

impl CollaboratorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaboratorRole::Viewer => "viewer",
            CollaboratorRole::Reviewer => "reviewer",
        }
    }

    /// Parse a stored value; unknown values degrade to `Viewer`
    pub fn from_db(value: &str) -> Self {
        match value {
            "reviewer" => CollaboratorRole::Reviewer,
            _ => CollaboratorRole::Viewer,
        }
    }
}

impl std::fmt::Display for CollaboratorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_role_serde_and_db_values() {
        assert_eq!(
            serde_json::to_value(CollaboratorRole::Reviewer).unwrap(),
            serde_json::json!("reviewer")
        );
        let parsed: CollaboratorRole = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(parsed, CollaboratorRole::Viewer);
        assert!(serde_json::from_str::<CollaboratorRole>("\"owner\"").is_err());

        assert_eq!(CollaboratorRole::from_db("reviewer"), CollaboratorRole::Reviewer);
        assert_eq!(CollaboratorRole::from_db("garbage"), CollaboratorRole::Viewer);
    }
}
