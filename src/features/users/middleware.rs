use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::{CurrentUser, UserService};

/// Resolve the authenticated identity to a local user record.
///
/// Must run after `auth_middleware`; inserts [`CurrentUser`] into the request
/// extensions.
pub async fn resolve_current_user(
    State(service): State<Arc<UserService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = req
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    let user = service.resolve(&identity).await?;
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}
