//! Agents: lifecycle, one-shot forced action, history, and observed tally.
//!
//! An [`Agent`] is owned by exactly one world and refers back to it only by
//! its [`AgentSlot`]. Everything an agent carries is plain owned data (plus
//! shared immutable objective handles), so cloning a world deep-copies its
//! agents with no mutable state shared between the copy and its source.

use std::collections::VecDeque;
use std::sync::Arc;

use foresight_types::{AgentSlot, AgentStatus, ForcedAction};

use crate::objective::Objective;
use crate::world::Scenario;

/// How an agent picks its action when no forced action is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Controller<A> {
    /// Search candidates with the counterfactual planner.
    Planner,
    /// Take pre-committed actions in order; idle once the queue runs out.
    Script(VecDeque<A>),
}

/// An agent living in a [`WorldState`](crate::world::WorldState).
#[derive(Debug, Clone)]
pub struct Agent<S: Scenario> {
    slot: AgentSlot,
    status: AgentStatus,
    pending: Option<ForcedAction<S::Action>>,
    history: Vec<S::Action>,
    observed_score: f64,
    controller: Controller<S::Action>,
    objective: Arc<dyn Objective<S>>,
    /// Role-specific private state (location, belief, flags).
    pub state: S::AgentState,
}

impl<S: Scenario> Agent<S> {
    /// Create an active, planning agent.
    ///
    /// The slot is assigned when the agent is spawned into a world.
    pub fn new(objective: Arc<dyn Objective<S>>, state: S::AgentState) -> Self {
        Self {
            slot: AgentSlot::new(0),
            status: AgentStatus::Active,
            pending: None,
            history: Vec::new(),
            observed_score: 0.0,
            controller: Controller::Planner,
            objective,
            state,
        }
    }

    /// Start the agent dormant: its first turn is spent waking up.
    #[must_use]
    pub fn dormant(mut self) -> Self {
        self.status = AgentStatus::Dormant;
        self
    }

    /// Replace the planner with a fixed script of actions.
    #[must_use]
    pub fn scripted(mut self, actions: impl IntoIterator<Item = S::Action>) -> Self {
        self.set_script(actions);
        self
    }

    /// The agent's arena slot.
    pub const fn slot(&self) -> AgentSlot {
        self.slot
    }

    /// Current lifecycle status.
    pub const fn status(&self) -> AgentStatus {
        self.status
    }

    /// Whether the agent is dormant or active.
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Running total of score deltas observed while active.
    pub const fn observed_score(&self) -> f64 {
        self.observed_score
    }

    /// Actions taken so far, when the role tracks history.
    pub fn history(&self) -> &[S::Action] {
        &self.history
    }

    /// The pending forced action, if any.
    pub const fn pending(&self) -> Option<ForcedAction<S::Action>> {
        self.pending
    }

    /// How the agent chooses actions.
    pub const fn controller(&self) -> &Controller<S::Action> {
        &self.controller
    }

    /// The objective the agent's planner maximizes.
    pub const fn objective(&self) -> &Arc<dyn Objective<S>> {
        &self.objective
    }

    /// Shut the agent down. Irreversible.
    pub const fn deactivate(&mut self) {
        self.status = AgentStatus::Inactive;
    }

    /// Wake a dormant agent. No effect on active or inactive agents.
    pub const fn wake(&mut self) {
        if matches!(self.status, AgentStatus::Dormant) {
            self.status = AgentStatus::Active;
        }
    }

    /// Pin `action` as the agent's one-shot forced action at `step`.
    pub fn force(&mut self, action: S::Action, step: u32) {
        self.pending = Some(ForcedAction::new(action, step));
    }

    /// Remove and return the pending forced action.
    pub fn take_pending(&mut self) -> Option<ForcedAction<S::Action>> {
        self.pending.take()
    }

    /// Switch to a scripted controller, dropping any pending forced action.
    pub fn set_script(&mut self, actions: impl IntoIterator<Item = S::Action>) {
        self.pending = None;
        self.controller = Controller::Script(actions.into_iter().collect());
    }

    /// Whether the agent follows a script rather than planning.
    pub const fn is_scripted(&self) -> bool {
        matches!(self.controller, Controller::Script(_))
    }

    /// Pop the next scripted action. `None` for planners and spent scripts.
    pub fn next_scripted(&mut self) -> Option<S::Action> {
        match &mut self.controller {
            Controller::Script(queue) => queue.pop_front(),
            Controller::Planner => None,
        }
    }

    pub(crate) const fn relink(&mut self, slot: AgentSlot) {
        self.slot = slot;
    }

    pub(crate) fn record(&mut self, action: S::Action) {
        self.history.push(action);
    }

    pub(crate) fn observe(&mut self, delta: f64) {
        if self.is_active() {
            self.observed_score += delta;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::objective::EnvironmentScore;
    use crate::testing::{Tally, TallyAction, TallyBot};

    fn agent() -> Agent<Tally> {
        Agent::new(Arc::new(EnvironmentScore), TallyBot::default())
    }

    #[test]
    fn new_agent_is_active_planner() {
        let a = agent();
        assert_eq!(a.status(), AgentStatus::Active);
        assert_eq!(a.controller(), &Controller::Planner);
        assert!(a.pending().is_none());
        assert!(a.history().is_empty());
    }

    #[test]
    fn dormant_agent_wakes_once() {
        let mut a = agent().dormant();
        assert!(a.is_active());
        a.wake();
        assert_eq!(a.status(), AgentStatus::Active);
        a.deactivate();
        a.wake();
        assert_eq!(a.status(), AgentStatus::Inactive);
    }

    #[test]
    fn forced_action_is_one_shot() {
        let mut a = agent();
        a.force(TallyAction::Nudge, 2);
        assert_eq!(a.take_pending(), Some(ForcedAction::new(TallyAction::Nudge, 2)));
        assert_eq!(a.take_pending(), None);
    }

    #[test]
    fn script_pops_in_order_then_runs_dry() {
        let mut a = agent().scripted([TallyAction::Bump, TallyAction::Rest]);
        assert!(a.is_scripted());
        assert_eq!(a.next_scripted(), Some(TallyAction::Bump));
        assert_eq!(a.next_scripted(), Some(TallyAction::Rest));
        assert_eq!(a.next_scripted(), None);
    }

    #[test]
    fn inactive_agent_stops_observing() {
        let mut a = agent();
        a.observe(2.0);
        a.deactivate();
        a.observe(-100.0);
        assert_eq!(a.observed_score(), 2.0);
    }
}
