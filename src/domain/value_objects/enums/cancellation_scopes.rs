use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Which earlier cancellations block a new Prepare.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CancellationScope {
    /// Any canceled payment of the user blocks every later Prepare for that user.
    #[default]
    User,
    /// Only a canceled payment with the same `click_trans_id` blocks.
    Transaction,
}

impl CancellationScope {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Some(CancellationScope::User),
            "transaction" => Some(CancellationScope::Transaction),
            _ => None,
        }
    }
}

impl Display for CancellationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scope = match self {
            CancellationScope::User => "user",
            CancellationScope::Transaction => "transaction",
        };
        write!(f, "{}", scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_scopes_case_insensitively() {
        assert_eq!(
            CancellationScope::from_str("USER"),
            Some(CancellationScope::User)
        );
        assert_eq!(
            CancellationScope::from_str(" transaction "),
            Some(CancellationScope::Transaction)
        );
        assert_eq!(CancellationScope::from_str("global"), None);
    }
}
