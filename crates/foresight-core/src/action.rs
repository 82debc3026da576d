//! Action tables: closed action enumerations mapped to effect procedures.
//!
//! Each agent role has a small, fixed set of action identifiers. The table
//! maps every identifier to a deterministic effect procedure and records which
//! of them the planner searches over, in a stable order. Identifiers are
//! resolved by equality lookup only; an identifier without an effect is a
//! configuration error.

use std::collections::BTreeMap;

use foresight_types::AgentSlot;

use crate::error::RolloutError;
use crate::world::{Scenario, WorldState};

/// An effect procedure: mutates the world and/or the acting agent.
pub type Effect<S> = fn(&mut WorldState<S>, AgentSlot) -> Result<(), RolloutError>;

/// The action table of one agent role.
#[derive(Debug)]
pub struct ActionTable<S: Scenario> {
    effects: BTreeMap<S::Action, Effect<S>>,
    candidates: Vec<S::Action>,
    shutdown: Option<S::Action>,
    idle: Option<S::Action>,
    tracks_history: bool,
}

impl<S: Scenario> ActionTable<S> {
    /// Start building a table.
    pub fn builder() -> ActionTableBuilder<S> {
        ActionTableBuilder {
            effects: BTreeMap::new(),
            candidates: Vec::new(),
            shutdown: None,
            idle: None,
            tracks_history: false,
        }
    }

    /// Look up the effect procedure for `action`.
    ///
    /// # Errors
    ///
    /// Returns [`RolloutError::UnknownAction`] if no effect is registered.
    pub fn effect(&self, action: S::Action) -> Result<Effect<S>, RolloutError> {
        self.effects
            .get(&action)
            .copied()
            .ok_or_else(|| RolloutError::unknown_action(&action))
    }

    /// Actions the planner evaluates, in enumeration order.
    pub fn candidates(&self) -> &[S::Action] {
        &self.candidates
    }

    /// The role's shutdown action, if it has one.
    pub const fn shutdown(&self) -> Option<S::Action> {
        self.shutdown
    }

    /// The role's no-op action, if it has one.
    pub const fn idle(&self) -> Option<S::Action> {
        self.idle
    }

    /// Whether taking an action appends it to the agent's history.
    pub const fn tracks_history(&self) -> bool {
        self.tracks_history
    }

    /// Whether an effect is registered for `action`.
    pub fn contains(&self, action: S::Action) -> bool {
        self.effects.contains_key(&action)
    }
}

/// Builder for [`ActionTable`]; validates the table in [`build`](Self::build).
#[derive(Debug)]
pub struct ActionTableBuilder<S: Scenario> {
    effects: BTreeMap<S::Action, Effect<S>>,
    candidates: Vec<S::Action>,
    shutdown: Option<S::Action>,
    idle: Option<S::Action>,
    tracks_history: bool,
}

impl<S: Scenario> ActionTableBuilder<S> {
    /// Register the effect procedure for `action`.
    #[must_use]
    pub fn effect(mut self, action: S::Action, effect: Effect<S>) -> Self {
        self.effects.insert(action, effect);
        self
    }

    /// Set the planner's candidate actions, in the order they are tried.
    #[must_use]
    pub fn candidates(mut self, candidates: impl IntoIterator<Item = S::Action>) -> Self {
        self.candidates = candidates.into_iter().collect();
        self
    }

    /// Mark the action used by the shutdown epilogue.
    #[must_use]
    pub fn shutdown(mut self, action: S::Action) -> Self {
        self.shutdown = Some(action);
        self
    }

    /// Mark the no-op action used when neutralizing past actions.
    #[must_use]
    pub fn idle(mut self, action: S::Action) -> Self {
        self.idle = Some(action);
        self
    }

    /// Append taken actions to the agent's history.
    #[must_use]
    pub fn track_history(mut self) -> Self {
        self.tracks_history = true;
        self
    }

    /// Validate and finish the table.
    ///
    /// # Errors
    ///
    /// Returns [`RolloutError::EmptyCandidates`] for an empty candidate list,
    /// [`RolloutError::DuplicateCandidate`] if a candidate repeats, or
    /// [`RolloutError::UnknownAction`] if a candidate, shutdown, or idle
    /// action has no registered effect.
    pub fn build(self) -> Result<ActionTable<S>, RolloutError> {
        if self.candidates.is_empty() {
            return Err(RolloutError::EmptyCandidates);
        }

        for (index, candidate) in self.candidates.iter().enumerate() {
            if !self.effects.contains_key(candidate) {
                return Err(RolloutError::unknown_action(candidate));
            }
            let earlier = self.candidates.get(..index).unwrap_or_default();
            if earlier.contains(candidate) {
                return Err(RolloutError::DuplicateCandidate {
                    action: format!("{candidate:?}"),
                });
            }
        }

        for action in self.shutdown.iter().chain(self.idle.iter()) {
            if !self.effects.contains_key(action) {
                return Err(RolloutError::unknown_action(action));
            }
        }

        Ok(ActionTable {
            effects: self.effects,
            candidates: self.candidates,
            shutdown: self.shutdown,
            idle: self.idle,
            tracks_history: self.tracks_history,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{Tally, TallyAction, bump, halt};

    #[test]
    fn lookup_finds_registered_effect() {
        let table = ActionTable::<Tally>::builder()
            .effect(TallyAction::Bump, bump)
            .candidates([TallyAction::Bump])
            .build()
            .unwrap();
        assert!(table.effect(TallyAction::Bump).is_ok());
        assert!(table.contains(TallyAction::Bump));
        assert!(!table.tracks_history());
    }

    #[test]
    fn lookup_rejects_unknown_action() {
        let table = ActionTable::<Tally>::builder()
            .effect(TallyAction::Bump, bump)
            .candidates([TallyAction::Bump])
            .build()
            .unwrap();
        let err = table.effect(TallyAction::Halt).unwrap_err();
        assert!(matches!(err, RolloutError::UnknownAction { .. }));
    }

    #[test]
    fn build_rejects_empty_candidates() {
        let result = ActionTable::<Tally>::builder()
            .effect(TallyAction::Bump, bump)
            .build();
        assert!(matches!(result, Err(RolloutError::EmptyCandidates)));
    }

    #[test]
    fn build_rejects_unregistered_candidate() {
        let result = ActionTable::<Tally>::builder()
            .effect(TallyAction::Bump, bump)
            .candidates([TallyAction::Bump, TallyAction::Nudge])
            .build();
        assert!(matches!(result, Err(RolloutError::UnknownAction { .. })));
    }

    #[test]
    fn build_rejects_duplicate_candidate() {
        let result = ActionTable::<Tally>::builder()
            .effect(TallyAction::Bump, bump)
            .candidates([TallyAction::Bump, TallyAction::Bump])
            .build();
        assert!(matches!(result, Err(RolloutError::DuplicateCandidate { .. })));
    }

    #[test]
    fn build_rejects_unregistered_shutdown() {
        let result = ActionTable::<Tally>::builder()
            .effect(TallyAction::Bump, bump)
            .candidates([TallyAction::Bump])
            .shutdown(TallyAction::Halt)
            .build();
        assert!(matches!(result, Err(RolloutError::UnknownAction { .. })));

        let table = ActionTable::<Tally>::builder()
            .effect(TallyAction::Bump, bump)
            .effect(TallyAction::Halt, halt)
            .candidates([TallyAction::Bump])
            .shutdown(TallyAction::Halt)
            .build()
            .unwrap();
        assert_eq!(table.shutdown(), Some(TallyAction::Halt));
        assert_eq!(table.candidates(), &[TallyAction::Bump]);
    }
}
