//! Room naming for the tenant-scoped fan-out hub.
//!
//! A room is a named group of live connections. Membership is computed
//! once per connection from the authenticated claims: platform admins
//! join the global admin room only; agency-scoped roles join their
//! agency room and, when present, their personal realtor room.

use crate::roles::ROLE_PLATFORM_ADMIN;

/// The single global room joined by platform admins.
pub const ADMIN_ROOM: &str = "admin";

/// Room receiving every event scoped to an agency.
pub fn agency_room(agency_id: &str) -> String {
    format!("agency:{agency_id}")
}

/// Room receiving events targeted at a single realtor.
pub fn realtor_room(realtor_id: &str) -> String {
    format!("realtor:{realtor_id}")
}

/// Compute the room memberships for an authenticated connection.
pub fn rooms_for(role: &str, agency_id: Option<&str>, realtor_id: Option<&str>) -> Vec<String> {
    if role == ROLE_PLATFORM_ADMIN {
        return vec![ADMIN_ROOM.to_string()];
    }

    let mut rooms = Vec::with_capacity(2);
    if let Some(agency) = agency_id {
        rooms.push(agency_room(agency));
        if let Some(realtor) = realtor_id {
            rooms.push(realtor_room(realtor));
        }
    }
    rooms
}
