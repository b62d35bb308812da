//! Well-known role name constants.
//!
//! These must match the `role` values stored in the `profiles` table and
//! the role claim embedded in access tokens.

/// A realtor who owns listings and handles their own viewing requests.
pub const ROLE_REALTOR: &str = "realtor";

/// An agency administrator who can see and manage every request and
/// listing in their agency.
pub const ROLE_AGENCY_ADMIN: &str = "agency_admin";

/// A platform operator. Not tied to any agency; authenticated from
/// environment-configured credentials rather than a profile row.
pub const ROLE_PLATFORM_ADMIN: &str = "platform_admin";
