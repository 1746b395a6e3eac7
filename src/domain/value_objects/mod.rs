pub mod click_callback;
pub mod click_signature;
pub mod enums;
pub mod prepare_ids;
pub mod user_identifiers;
