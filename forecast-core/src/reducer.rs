//! Pure state transitions: `(state, action) -> changed`.
//!
//! Tickets only move forward. A start or reject with an old ticket is
//! ignored, and results are applied only for the current ticket while it is
//! still `Loading`.

use crate::action::Action;
use crate::state::{AppState, LookupState};

pub fn reducer(state: &mut AppState, action: Action) -> bool {
    match action {
        Action::CityChange(text) => {
            if state.city == text {
                return false;
            }
            state.city = text;
            true
        }

        Action::LookupStart { ticket } => {
            if ticket <= state.ticket {
                return false;
            }
            state.ticket = ticket;
            state.lookup = LookupState::Loading;
            true
        }

        Action::LookupReject { ticket, reason } => {
            if ticket <= state.ticket {
                return false;
            }
            state.ticket = ticket;
            state.lookup = LookupState::Error(reason);
            true
        }

        Action::LookupDidLoad { ticket, snapshot } => {
            if !accepts_result(state, ticket) {
                return false;
            }
            state.lookup = LookupState::Success(snapshot);
            true
        }

        Action::LookupDidError { ticket, reason } => {
            if !accepts_result(state, ticket) {
                return false;
            }
            state.lookup = LookupState::Error(reason);
            true
        }
    }
}

fn accepts_result(state: &AppState, ticket: u64) -> bool {
    ticket == state.ticket && state.lookup.is_loading()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample_snapshot;
    use crate::state::{ErrorReason, LookupOrigin};
    use std::sync::Arc;

    fn loaded(ticket: u64) -> Action {
        Action::LookupDidLoad {
            ticket,
            snapshot: Arc::new(sample_snapshot()),
        }
    }

    #[test]
    fn start_sets_loading_and_clears_previous_result() {
        let mut state = AppState::default();
        reducer(&mut state, Action::LookupStart { ticket: 1 });
        reducer(&mut state, loaded(1));
        assert!(state.lookup.snapshot().is_some());

        let changed = reducer(&mut state, Action::LookupStart { ticket: 2 });

        assert!(changed);
        assert_eq!(state.lookup, LookupState::Loading);
        assert_eq!(state.ticket, 2);
    }

    #[test]
    fn stale_result_is_dropped() {
        let mut state = AppState::default();
        reducer(&mut state, Action::LookupStart { ticket: 1 });
        reducer(&mut state, Action::LookupStart { ticket: 2 });

        assert!(!reducer(&mut state, loaded(1)));
        assert_eq!(state.lookup, LookupState::Loading);

        assert!(reducer(&mut state, loaded(2)));
        assert!(state.lookup.snapshot().is_some());
    }

    #[test]
    fn result_after_completion_is_dropped() {
        let mut state = AppState::default();
        reducer(&mut state, Action::LookupStart { ticket: 1 });
        reducer(&mut state, loaded(1));

        let changed = reducer(
            &mut state,
            Action::LookupDidError {
                ticket: 1,
                reason: ErrorReason::ProviderLookupFailed { origin: LookupOrigin::City },
            },
        );

        assert!(!changed);
        assert!(state.lookup.snapshot().is_some());
    }

    #[test]
    fn old_start_does_not_rewind_ticket() {
        let mut state = AppState::default();
        reducer(&mut state, Action::LookupStart { ticket: 3 });

        assert!(!reducer(&mut state, Action::LookupStart { ticket: 2 }));
        assert_eq!(state.ticket, 3);
    }

    #[test]
    fn reject_skips_loading() {
        let mut state = AppState::default();
        let changed = reducer(
            &mut state,
            Action::LookupReject {
                ticket: 1,
                reason: ErrorReason::GeolocationUnsupported,
            },
        );

        assert!(changed);
        assert_eq!(
            state.lookup,
            LookupState::Error(ErrorReason::GeolocationUnsupported)
        );
    }

    #[test]
    fn city_change_only_rerenders_on_difference() {
        let mut state = AppState::default();
        assert!(reducer(&mut state, Action::CityChange("Rome".into())));
        assert!(!reducer(&mut state, Action::CityChange("Rome".into())));
        assert_eq!(state.city, "Rome");
    }
}
