use std::collections::VecDeque;

use super::error::{StateError, StateResult};
use super::{FilterEvent, FilterPhase, StateTransition};

const TRANSITION_LOG_CAPACITY: usize = 32;

#[derive(Debug)]
pub struct StateMachine {
    state: FilterPhase,
    transition_history: VecDeque<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: FilterPhase::default(),
            transition_history: VecDeque::with_capacity(TRANSITION_LOG_CAPACITY),
        }
    }

    pub fn state(&self) -> FilterPhase {
        self.state
    }

    pub fn can_transition(&self, event: FilterEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: FilterEvent) -> Option<FilterPhase> {
        use FilterEvent::*;
        match (self.state, event) {
            (_, Activate) => Some(FilterPhase::FilterSelected),
            (_, Deactivate) | (_, Reset) => Some(FilterPhase::Idle),
            (FilterPhase::FilterSelected | FilterPhase::Previewing, Preview) => {
                Some(FilterPhase::Previewing)
            }
            (FilterPhase::FilterSelected | FilterPhase::Previewing, Commit) => {
                Some(FilterPhase::FilterSelected)
            }
            (FilterPhase::FilterSelected | FilterPhase::Previewing, ExitPreview) => {
                Some(FilterPhase::FilterSelected)
            }
            (FilterPhase::Idle, Preview | Commit | ExitPreview) => None,
        }
    }

    pub fn transition(&mut self, event: FilterEvent) -> StateResult<FilterPhase> {
        tracing::trace!(from = ?self.state, event = ?event, "request filter transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::debug!(from = ?from, event = ?event, "invalid filter transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        if self.transition_history.len() == TRANSITION_LOG_CAPACITY {
            self.transition_history.pop_front();
        }
        self.transition_history
            .push_back(StateTransition::new(self.state, event, next));
        self.state = next;

        Ok(self.state)
    }

    pub fn recent_transitions(&self) -> impl Iterator<Item = &StateTransition> {
        self.transition_history.iter()
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FilterPhase::{:?}", self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(machine: &StateMachine) -> Vec<StateTransition> {
        machine.recent_transitions().copied().collect()
    }

    #[test]
    fn can_transition_tracks_valid_and_invalid_events() {
        let mut machine = StateMachine::new();
        assert!(machine.can_transition(FilterEvent::Activate));
        assert!(machine.can_transition(FilterEvent::Deactivate));
        assert!(!machine.can_transition(FilterEvent::Preview));
        assert!(!machine.can_transition(FilterEvent::Commit));

        let _ = machine
            .transition(FilterEvent::Activate)
            .expect("idle -> selected should transition");

        assert!(machine.can_transition(FilterEvent::Preview));
        assert!(machine.can_transition(FilterEvent::Commit));
        assert!(machine.can_transition(FilterEvent::ExitPreview));
    }

    #[test]
    fn transition_records_history_with_ordered_entries() {
        let mut machine = StateMachine::new();
        for event in [
            FilterEvent::Activate,
            FilterEvent::Preview,
            FilterEvent::Preview,
            FilterEvent::Commit,
            FilterEvent::Deactivate,
        ] {
            let _ = machine.transition(event).expect("transition should work");
        }

        assert_eq!(machine.state(), FilterPhase::Idle);
        assert_eq!(
            history(&machine),
            vec![
                StateTransition::new(
                    FilterPhase::Idle,
                    FilterEvent::Activate,
                    FilterPhase::FilterSelected
                ),
                StateTransition::new(
                    FilterPhase::FilterSelected,
                    FilterEvent::Preview,
                    FilterPhase::Previewing
                ),
                StateTransition::new(
                    FilterPhase::Previewing,
                    FilterEvent::Preview,
                    FilterPhase::Previewing
                ),
                StateTransition::new(
                    FilterPhase::Previewing,
                    FilterEvent::Commit,
                    FilterPhase::FilterSelected
                ),
                StateTransition::new(
                    FilterPhase::FilterSelected,
                    FilterEvent::Deactivate,
                    FilterPhase::Idle
                ),
            ]
        );
    }

    #[test]
    fn invalid_transition_returns_error_without_mutating_history() {
        let mut machine = StateMachine::new();

        let err = machine
            .transition(FilterEvent::Preview)
            .expect_err("idle -> preview should fail");
        assert_eq!(
            err,
            StateError::InvalidStateTransition {
                from: FilterPhase::Idle,
                event: FilterEvent::Preview
            }
        );
        assert_eq!(machine.state(), FilterPhase::Idle);
        assert!(history(&machine).is_empty());
    }

    #[test]
    fn transition_log_keeps_only_recent_entries() {
        let mut machine = StateMachine::new();
        let _ = machine.transition(FilterEvent::Activate).expect("activate");
        for _ in 0..(TRANSITION_LOG_CAPACITY * 2) {
            let _ = machine.transition(FilterEvent::Preview).expect("preview");
        }
        assert_eq!(history(&machine).len(), TRANSITION_LOG_CAPACITY);
        assert_eq!(machine.state(), FilterPhase::Previewing);
    }
}
