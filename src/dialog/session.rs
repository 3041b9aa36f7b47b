//! Per-conversation dialog state.

/// Where the dialog currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DialogState {
    /// Collecting slots or idle between exchanges.
    #[default]
    Idle,
    /// Memory-sourced slot values are staged and the user must confirm them
    /// before they take effect.
    AwaitingConfirmation,
}

/// Mutable state for one conversation, keyed by `dialog_id`.
///
/// Created implicitly on the first user turn for a dialog and mutated only
/// through the dialog engine's entry point. Active slots persist across
/// turns within one exchange; everything resets when a query completes,
/// the user denies a confirmation, or the user exits the flow.
#[derive(Debug, Clone, Default)]
pub struct DialogSession {
    /// Current state machine position.
    pub state: DialogState,
    /// Release repository URL slot.
    pub repo_url: Option<String>,
    /// Release tag slot.
    pub tag: Option<String>,
    /// Staged repository URL awaiting user confirmation.
    pub pending_repo_url: Option<String>,
    /// Staged tag awaiting user confirmation.
    pub pending_tag: Option<String>,
}

impl DialogSession {
    /// Reset every slot field and return to [`DialogState::Idle`].
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Clear only the active slots, keeping the state untouched.
    pub fn clear_slots(&mut self) {
        self.repo_url = None;
        self.tag = None;
    }

    /// Stage values for confirmation and enter
    /// [`DialogState::AwaitingConfirmation`].
    pub fn stage(&mut self, repo_url: String, tag: String) {
        self.pending_repo_url = Some(repo_url);
        self.pending_tag = Some(tag);
        self.state = DialogState::AwaitingConfirmation;
    }

    /// Take the staged values, leaving the pending fields empty and the
    /// state back at [`DialogState::Idle`].
    pub fn take_pending(&mut self) -> (Option<String>, Option<String>) {
        self.state = DialogState::Idle;
        (self.pending_repo_url.take(), self.pending_tag.take())
    }
}
