//! In-memory stores for the Click payment flow.
//!
//! They honor the same contracts as the Postgres repositories (conditional
//! insert on `external_transaction_id`, compare-and-swap status updates), which
//! makes them suitable for exercising the state machine without a database.

pub mod app_users;
pub mod payments;
