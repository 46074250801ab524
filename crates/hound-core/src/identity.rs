//! User and request identifiers.

/// Prefix for generated user ids.
pub const USER_ID_PREFIX: &str = "hound-";

/// Random bytes per generated id (rendered as twice as many hex chars).
const ID_BYTES: usize = 10;

/// Pseudo-unique uppercase hex string. Not for anything security-sensitive.
pub fn random_hex() -> String {
    let bytes: [u8; ID_BYTES] = rand::random();
    hex::encode_upper(bytes)
}

/// Pick the user id: the environment username verbatim if non-empty,
/// otherwise `hound-` plus a random suffix.
pub fn resolve_user_id(env_user: Option<&str>) -> String {
    match env_user {
        Some(user) if !user.is_empty() => user.to_string(),
        _ => format!("{USER_ID_PREFIX}{}", random_hex()),
    }
}

/// Fresh id for one outbound request.
pub fn new_request_id() -> String {
    random_hex()
}
