//! UUID utilities

use uuid::Uuid;

/// Length of identifiers produced by [`short_id`]
pub const SHORT_ID_LEN: usize = 8;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generate a short opaque identifier: the first 8 hex digits of a UUIDv4
///
/// 32 random bits; callers storing these must handle the rare collision.
pub fn short_id() -> String {
    let mut id = generate().simple().to_string();
    id.truncate(SHORT_ID_LEN);
    id
}
