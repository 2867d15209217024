/// Two-state machine tracking whether a cached matrix is stale.
///
/// `mark` moves to `Dirty`; `consume` moves back to `Clean` and reports the
/// state it left. Peeking with `is_dirty` never changes state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirtyState {
    Clean,
    /// Newly built transforms start dirty so the first frame uploads.
    #[default]
    Dirty,
}

impl DirtyState {
    pub fn mark(&mut self) {
        *self = DirtyState::Dirty;
    }

    /// Transition to `Clean`. Returns `true` if the state was `Dirty`.
    pub fn consume(&mut self) -> bool {
        std::mem::replace(self, DirtyState::Clean) == DirtyState::Dirty
    }

    pub fn is_dirty(self) -> bool {
        self == DirtyState::Dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_dirty() {
        assert!(DirtyState::default().is_dirty());
    }

    #[test]
    fn consume_clears_once() {
        let mut state = DirtyState::default();
        assert!(state.consume());
        assert!(!state.consume());
        assert_eq!(state, DirtyState::Clean);
    }

    #[test]
    fn mark_is_idempotent() {
        let mut state = DirtyState::Clean;
        state.mark();
        state.mark();
        assert!(state.is_dirty());
        assert!(state.consume());
        assert!(!state.is_dirty());
    }
}
