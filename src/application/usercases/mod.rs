pub mod click_guards;
pub mod click_webhook;
