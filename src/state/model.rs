/// Phase of a filter session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterPhase {
    #[default]
    Idle,
    FilterSelected,
    Previewing,
}
