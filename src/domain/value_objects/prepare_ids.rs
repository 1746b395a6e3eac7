use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Issues `merchant_prepare_id` values from the wall clock in milliseconds.
///
/// Ids are strictly increasing within the process, so two Prepares landing in
/// the same millisecond still get distinct ids.
#[derive(Debug, Default)]
pub struct PrepareIdIssuer {
    last_issued: AtomicI64,
}

impl PrepareIdIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> i64 {
        self.next_at(Utc::now().timestamp_millis())
    }

    pub fn next_at(&self, now_millis: i64) -> i64 {
        let previous = match self.last_issued.fetch_update(
            Ordering::SeqCst,
            Ordering::SeqCst,
            |last| Some(now_millis.max(last + 1)),
        ) {
            Ok(previous) | Err(previous) => previous,
        };
        now_millis.max(previous + 1)
    }
}
