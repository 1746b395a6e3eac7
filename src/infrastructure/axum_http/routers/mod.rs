pub mod click_webhook;
