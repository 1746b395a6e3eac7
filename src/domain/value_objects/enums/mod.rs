pub mod cancellation_scopes;
pub mod click_actions;
pub mod click_error_codes;
pub mod payment_providers;
pub mod payment_statuses;
