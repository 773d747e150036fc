/// Rows returned by an unfiltered user listing
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum number of results returned by user search
pub const USER_SEARCH_LIMIT: i64 = 20;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Keycloak realm role allowed to manage user records directly
pub const ROLE_ADMIN: &str = "admin";

/// Role stored on newly provisioned local user records
pub const DEFAULT_USER_ROLE: &str = "user";
