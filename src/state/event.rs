use super::FilterPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterEvent {
    Activate,
    Preview,
    Commit,
    ExitPreview,
    Deactivate,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: FilterPhase,
    pub event: FilterEvent,
    pub to: FilterPhase,
}

impl StateTransition {
    pub const fn new(from: FilterPhase, event: FilterEvent, to: FilterPhase) -> Self {
        Self { from, event, to }
    }
}
