use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Action code carried in the `action` field of a Click callback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ClickAction {
    Prepare,
    Complete,
}

impl ClickAction {
    pub fn code(&self) -> i64 {
        match self {
            ClickAction::Prepare => 0,
            ClickAction::Complete => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ClickAction::Prepare),
            1 => Some(ClickAction::Complete),
            _ => None,
        }
    }
}

impl Display for ClickAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let action = match self {
            ClickAction::Prepare => "prepare",
            ClickAction::Complete => "complete",
        };
        write!(f, "{}", action)
    }
}
