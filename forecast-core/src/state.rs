//! Lookup state and its error taxonomy.
//!
//! The presentation layer only ever reads these values; all mutation goes
//! through [`crate::reducer::reducer`].

use std::sync::Arc;

use thiserror::Error;

use crate::{
    assets::{Background, Icon, resolve_background, resolve_icon},
    model::WeatherSnapshot,
};

/// Which user action started a lookup. Only affects the failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupOrigin {
    City,
    Location,
}

impl LookupOrigin {
    pub fn failure_message(&self) -> &'static str {
        match self {
            LookupOrigin::City => "City not found. Please try again.",
            LookupOrigin::Location => "Failed to fetch weather for your location.",
        }
    }
}

/// Failures the presentation layer displays.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorReason {
    #[error("Geolocation is not supported by your browser")]
    GeolocationUnsupported,

    #[error("Location access denied or unavailable.")]
    GeolocationDenied,

    /// Network failure, non-success status or unusable body.
    #[error("{}", .origin.failure_message())]
    ProviderLookupFailed { origin: LookupOrigin },
}

/// Outcome of a dispatcher call that did not produce a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Blank city input; the state was left untouched.
    #[error("city name is empty")]
    EmptyInput,

    /// A newer lookup started before this one finished; its result was dropped.
    #[error("lookup superseded by a newer request")]
    Superseded,

    #[error(transparent)]
    Failed(#[from] ErrorReason),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LookupState {
    #[default]
    Idle,
    Loading,
    Success(Arc<WeatherSnapshot>),
    Error(ErrorReason),
}

impl LookupState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LookupState::Loading)
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            LookupState::Success(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorReason> {
        match self {
            LookupState::Error(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn background(&self) -> Background {
        resolve_background(self.snapshot().map(|s| s.condition.as_str()))
    }

    pub fn icon(&self) -> Option<Icon> {
        self.snapshot().map(|s| resolve_icon(&s.condition))
    }
}

/// Everything a renderer needs: the input text and the current lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub city: String,
    pub lookup: LookupState,
    /// Sequence token of the lookup allowed to update `lookup`.
    pub ticket: u64,
}
