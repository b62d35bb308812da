//! Viewing-request domain rules: identifiers, required-field validation,
//! and the status state machine.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Reserved `realtor_id` value meaning "no specific agent targeted".
pub const UNASSIGNED_REALTOR: &str = "UNASSIGNED";

/// Provenance tag stamped on every request created through the storefront.
pub const SOURCE_STOREFRONT: &str = "storefront";

/// Request type applied when the visitor did not pick one.
pub const DEFAULT_REQUEST_TYPE: &str = "whatsapp";

/// Request types the storefront UI offers. The column is an open string
/// domain; these are the values the platform itself produces.
pub const KNOWN_REQUEST_TYPES: &[&str] = &["walk_in", "live_video", "whatsapp"];

const BASE36_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random suffix appended to generated request ids.
const REQUEST_ID_SUFFIX_LEN: usize = 4;

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a viewing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    New,
    Contacted,
    Booked,
    Closed,
    NoShow,
}

impl RequestStatus {
    /// Parse a wire/database value. Unknown values are a validation error.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "booked" => Ok(Self::Booked),
            "closed" => Ok(Self::Closed),
            "no_show" => Ok(Self::NoShow),
            other => Err(CoreError::Validation(format!(
                "Unknown request status: {other}"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Booked => "booked",
            Self::Closed => "closed",
            Self::NoShow => "no_show",
        }
    }

    /// Terminal states end the request's lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::NoShow)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TransitionPolicy
// ---------------------------------------------------------------------------

/// Governs which status transitions the lifecycle engine accepts.
///
/// The platform historically allowed any enumerated status to be set from
/// any other; `Lenient` preserves that. `Strict` additionally refuses to
/// move a request out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    #[default]
    Lenient,
    Strict,
}

impl TransitionPolicy {
    pub fn allows(self, from: RequestStatus, to: RequestStatus) -> bool {
        match self {
            Self::Lenient => true,
            Self::Strict => from == to || !from.is_terminal(),
        }
    }
}

// ---------------------------------------------------------------------------
// Identifier generation
// ---------------------------------------------------------------------------

/// Generate a new request id: `REQ-` + current millis in base36 + a short
/// random suffix. Time-ordered enough to sort, random enough to never
/// collide within a process.
pub fn generate_request_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut id = String::from("REQ-");
    id.push_str(&encode_base36(millis));
    let mut rng = rand::rng();
    for _ in 0..REQUEST_ID_SUFFIX_LEN {
        let idx = rng.random_range(0..BASE36_ALPHABET.len());
        id.push(BASE36_ALPHABET[idx] as char);
    }
    id
}

fn encode_base36(mut value: i64) -> String {
    if value <= 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).expect("base36 alphabet is ASCII")
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A request is only accepted with a contact name and phone number.
pub fn validate_contact(customer_name: &str, customer_phone: &str) -> Result<(), CoreError> {
    if customer_name.trim().is_empty() || customer_phone.trim().is_empty() {
        return Err(CoreError::Validation("Name and phone required".to_string()));
    }
    Ok(())
}
