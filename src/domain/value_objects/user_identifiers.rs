use uuid::Uuid;

const HYPHENATED_UUID_LEN: usize = 36;

/// Parses `param2` into the user id format `app_users` is keyed by.
///
/// Only the canonical hyphenated form is accepted; braced, URN and simple
/// encodings are rejected even though they name a valid UUID.
pub fn parse_user_identifier(raw: &str) -> Option<Uuid> {
    if raw.len() != HYPHENATED_UUID_LEN {
        return None;
    }
    Uuid::try_parse(raw).ok()
}

pub fn is_valid_identifier(raw: &str) -> bool {
    parse_user_identifier(raw).is_some()
}
