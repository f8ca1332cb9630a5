//! ID generation utilities.

use uuid::Uuid;

/// Generates a new UUID v7 as a string.
///
/// UUID v7 includes timestamp information and is sortable, which keeps
/// idempotency keys ordered in server logs.
#[must_use]
pub fn generate_id_v7() -> String {
    Uuid::now_v7().to_string()
}
