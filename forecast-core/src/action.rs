use std::sync::Arc;

use crate::{model::WeatherSnapshot, state::ErrorReason};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The user edited the city input.
    CityChange(String),

    /// A lookup began; move to `Loading`.
    LookupStart { ticket: u64 },

    /// A lookup failed before it could load anything; skips `Loading`.
    LookupReject { ticket: u64, reason: ErrorReason },

    LookupDidLoad {
        ticket: u64,
        snapshot: Arc<WeatherSnapshot>,
    },

    LookupDidError { ticket: u64, reason: ErrorReason },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::CityChange(_) => "CityChange",
            Action::LookupStart { .. } => "LookupStart",
            Action::LookupReject { .. } => "LookupReject",
            Action::LookupDidLoad { .. } => "LookupDidLoad",
            Action::LookupDidError { .. } => "LookupDidError",
        }
    }

    pub fn ticket(&self) -> Option<u64> {
        match self {
            Action::CityChange(_) => None,
            Action::LookupStart { ticket }
            | Action::LookupReject { ticket, .. }
            | Action::LookupDidLoad { ticket, .. }
            | Action::LookupDidError { ticket, .. } => Some(*ticket),
        }
    }
}
