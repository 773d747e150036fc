use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::annotations::{
    dtos as annotations_dtos, handlers as annotations_handlers, models as annotations_models,
};
use crate::features::auth;
use crate::features::comments::{dtos as comments_dtos, handlers as comments_handlers};
use crate::features::media::{
    dtos as media_dtos, handlers as media_handlers, models as media_models,
};
use crate::features::org_invites::{
    dtos as invites_dtos, handlers as invites_handlers, models as invites_models,
};
use crate::features::organizations::{
    dtos as organizations_dtos, handlers as organizations_handlers,
    models as organizations_models,
};
use crate::features::shares::{dtos as shares_dtos, handlers as shares_handlers};
use crate::features::system::{dtos as system_dtos, handlers as system_handlers};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::types::{ApiResponse, CollaboratorRole, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // System
        system_handlers::service_info,
        system_handlers::health_check,
        system_handlers::db_health,
        // Users
        users_handlers::get_me,
        users_handlers::list_users,
        users_handlers::create_user,
        users_handlers::get_user,
        // Media
        media_handlers::upload_media,
        media_handlers::list_media,
        media_handlers::get_media,
        media_handlers::update_media,
        media_handlers::delete_media,
        // Comments
        comments_handlers::list_comments,
        comments_handlers::create_comment,
        comments_handlers::update_comment,
        comments_handlers::delete_comment,
        // Annotations
        annotations_handlers::list_annotations,
        annotations_handlers::create_annotation,
        annotations_handlers::delete_annotation,
        // Shares
        shares_handlers::list_shared_with_user,
        shares_handlers::create_share,
        shares_handlers::list_media_shares,
        shares_handlers::delete_share,
        // Organizations
        organizations_handlers::list_organizations,
        organizations_handlers::create_organization,
        organizations_handlers::get_organization,
        organizations_handlers::update_member_role,
        organizations_handlers::remove_member,
        // Organization invites
        invites_handlers::send_invite,
        invites_handlers::list_pending_invites,
        invites_handlers::accept_invite,
        invites_handlers::reject_invite,
    ),
    components(
        schemas(
            // Shared
            Meta,
            CollaboratorRole,
            auth::model::AuthenticatedUser,
            // System
            system_dtos::ServiceInfoDto,
            system_dtos::PostgresStatusDto,
            system_dtos::RealtimeStatusDto,
            system_dtos::DbHealthDto,
            // Users
            users_dtos::UserResponseDto,
            users_dtos::CreateUserDto,
            ApiResponse<users_dtos::UserResponseDto>,
            ApiResponse<Vec<users_dtos::UserResponseDto>>,
            // Media
            media_models::MediaType,
            media_models::MediaPermission,
            media_dtos::UploadMediaDto,
            media_dtos::MediaResponseDto,
            media_dtos::MediaDetailResponseDto,
            media_dtos::UpdateMediaDto,
            media_dtos::MediaTypeFilter,
            media_dtos::MediaSort,
            media_dtos::DeleteMediaResponseDto,
            ApiResponse<media_dtos::MediaResponseDto>,
            ApiResponse<Vec<media_dtos::MediaResponseDto>>,
            ApiResponse<media_dtos::MediaDetailResponseDto>,
            ApiResponse<media_dtos::DeleteMediaResponseDto>,
            // Comments
            comments_dtos::CommentResponseDto,
            comments_dtos::CreateCommentDto,
            comments_dtos::UpdateCommentDto,
            comments_dtos::DeleteCommentResponseDto,
            ApiResponse<comments_dtos::CommentResponseDto>,
            ApiResponse<Vec<comments_dtos::CommentResponseDto>>,
            ApiResponse<comments_dtos::DeleteCommentResponseDto>,
            // Annotations
            annotations_models::Point,
            annotations_models::AnnotationShape,
            annotations_dtos::AnnotationResponseDto,
            annotations_dtos::CreateAnnotationDto,
            annotations_dtos::DeleteAnnotationResponseDto,
            ApiResponse<annotations_dtos::AnnotationResponseDto>,
            ApiResponse<Vec<annotations_dtos::AnnotationResponseDto>>,
            ApiResponse<annotations_dtos::DeleteAnnotationResponseDto>,
            // Shares
            shares_dtos::ShareResponseDto,
            shares_dtos::SharedMediaResponseDto,
            shares_dtos::CreateShareDto,
            shares_dtos::DeleteShareResponseDto,
            ApiResponse<Vec<shares_dtos::ShareResponseDto>>,
            ApiResponse<Vec<shares_dtos::SharedMediaResponseDto>>,
            ApiResponse<shares_dtos::DeleteShareResponseDto>,
            // Organizations
            organizations_models::OrganizationRole,
            organizations_dtos::OrganizationResponseDto,
            organizations_dtos::MemberResponseDto,
            organizations_dtos::OrganizationDetailResponseDto,
            organizations_dtos::CreateOrganizationDto,
            organizations_dtos::UpdateMemberRoleDto,
            organizations_dtos::RemoveMemberResponseDto,
            ApiResponse<organizations_dtos::OrganizationResponseDto>,
            ApiResponse<Vec<organizations_dtos::OrganizationResponseDto>>,
            ApiResponse<organizations_dtos::OrganizationDetailResponseDto>,
            ApiResponse<organizations_dtos::MemberResponseDto>,
            ApiResponse<organizations_dtos::RemoveMemberResponseDto>,
            // Organization invites
            invites_models::InviteStatus,
            invites_dtos::InviteResponseDto,
            invites_dtos::SendInviteDto,
            ApiResponse<invites_dtos::InviteResponseDto>,
            ApiResponse<Vec<invites_dtos::InviteResponseDto>>,
        )
    ),
    tags(
        (name = "system", description = "Service banner and health probes"),
        (name = "users", description = "Local user records mirrored from Keycloak"),
        (name = "media", description = "Image and video upload and management"),
        (name = "comments", description = "Timestamped comments on media"),
        (name = "annotations", description = "Frame annotations on media"),
        (name = "shares", description = "Sharing media with users and organizations"),
        (name = "organizations", description = "Organizations and their members"),
        (name = "org-invites", description = "Organization invitations"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "FrameSync API",
        version = "0.1.0",
        description = "Media collaboration API for FrameSync",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_collaboration_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/media/upload",
            "/api/comments",
            "/api/annotations",
            "/api/media-shared",
            "/api/org-invites/send",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(doc
            .components
            .as_ref()
            .unwrap()
            .security_schemes
            .contains_key("bearer_auth"));
    }

    #[test]
    fn test_swagger_info_modifier_overrides_info() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Custom".to_string(),
            version: "9.9.9".to_string(),
            description: "desc".to_string(),
        }
        .modify(&mut doc);
        assert_eq!(doc.info.title, "Custom");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
