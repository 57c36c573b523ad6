//! The explicit state container.
//!
//! [`Store`] owns the current [`EditorState`].  Every change goes through
//! [`Store::dispatch`], which:
//!
//! 1. validates the command with [`guard::check`],
//! 2. derives the new state with [`EditorState::apply`],
//! 3. replaces the held state, and
//! 4. calls every subscribed [`StateObserver`] in subscription order with the
//!    command and the committed state.
//!
//! A rejected command never reaches step 2: the state and the observers are
//! left untouched.
//!
//! # Observers (for beginners)
//!
//! An observer is anything that wants to react *after* a change has been
//! committed, for example the sync bridge that forwards the config to the
//! host.  Observers see the state only through a shared reference and cannot
//! veto or alter a commit.

use signage_core::{Command, EditorState};
use tracing::warn;
use uuid::Uuid;

use super::guard::{self, CommandError};

/// Handle returned by [`Store::subscribe`].
pub type SubscriptionId = Uuid;

/// Post-commit hook.
pub trait StateObserver: Send {
    fn on_commit(&mut self, command: &Command, state: &EditorState);
}

/// Owns the editor state and its observers.
pub struct Store {
    state: EditorState,
    observers: Vec<(SubscriptionId, Box<dyn StateObserver>)>,
}

impl Store {
    pub fn new(state: EditorState) -> Self {
        Self {
            state,
            observers: Vec::new(),
        }
    }

    /// The committed state.
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Registers `observer`; it sees every commit from now on.
    pub fn subscribe(&mut self, observer: Box<dyn StateObserver>) -> SubscriptionId {
        let id = Uuid::new_v4();
        self.observers.push((id, observer));
        id
    }

    /// Drops the observer registered under `id`.  Returns `false` when no
    /// such subscription exists.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub_id, _)| *sub_id != id);
        self.observers.len() != before
    }

    /// Validates, applies and commits `command`, then notifies observers.
    ///
    /// # Errors
    ///
    /// Returns the guard's [`CommandError`] when the command is rejected.
    pub fn dispatch(&mut self, command: Command) -> Result<&EditorState, CommandError> {
        if let Err(e) = guard::check(&self.state, &command) {
            warn!(command = command.name(), "Command rejected: {e}");
            return Err(e);
        }

        self.state = self.state.apply(&command);

        for (_, observer) in &mut self.observers {
            observer.on_commit(&command, &self.state);
        }
        Ok(&self.state)
    }
}
