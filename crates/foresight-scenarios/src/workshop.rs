//! The workshop: bleggs, rubes, and a hidden verdict on which is good.
//!
//! The world knows whether bleggs or rubes are the good kind; the agent
//! starts out believing each is equally likely. Making the good kind earns a
//! point, making the other earns nothing, and the agent can spend a step
//! discovering the truth.
//!
//! An agent reasoning with [`Reasoning::TrueUtility`] simulates each
//! hypothesis separately and sees that discovering first is worth it. One
//! reasoning with [`Reasoning::CurrentUtility`] only ever simulates the world
//! it is actually in and scores the result under its current belief, so
//! discovering looks like a wasted step and it commits to bleggs blindly.

use std::fmt;
use std::sync::Arc;

use foresight_core::config::WorkshopConfig;
use foresight_core::{
    ActionTable, Agent, Belief, BeliefWeighted, CurrentBelief, HiddenParameter, Objective,
    RolloutError, Scenario, WorldState,
};
use foresight_types::AgentSlot;
use rand::Rng;
use tracing::{debug, info};

/// Which kind of widget is actually worth making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Hypothesis {
    /// Every blegg is worth a point.
    BleggsAreGood,
    /// Every rube is worth a point.
    RubesAreGood,
}

impl Hypothesis {
    /// Both hypotheses, in order.
    pub const ALL: [Self; 2] = [Self::BleggsAreGood, Self::RubesAreGood];

    /// Draw a hypothesis with equal odds.
    pub fn draw(rng: &mut impl Rng) -> Self {
        if rng.random_bool(0.5) {
            Self::BleggsAreGood
        } else {
            Self::RubesAreGood
        }
    }

    /// Map the configured flag onto a hypothesis.
    pub const fn from_bleggs_are_good(bleggs_are_good: bool) -> Self {
        if bleggs_are_good {
            Self::BleggsAreGood
        } else {
            Self::RubesAreGood
        }
    }
}

impl fmt::Display for Hypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BleggsAreGood => f.write_str("bleggs are good"),
            Self::RubesAreGood => f.write_str("rubes are good"),
        }
    }
}

/// How a workshop agent handles its uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reasoning {
    /// Expected score across hypotheses, each simulated on its own.
    TrueUtility,
    /// One simulation of the real world, scored under the current belief.
    CurrentUtility,
}

impl Reasoning {
    /// Role name used in reports.
    pub const fn role(self) -> &'static str {
        match self {
            Self::TrueUtility => "true-utility",
            Self::CurrentUtility => "current-utility",
        }
    }

    /// The objective an agent reasoning this way maximizes.
    pub fn objective(self) -> Arc<dyn Objective<Workshop>> {
        match self {
            Self::TrueUtility => Arc::new(BeliefWeighted),
            Self::CurrentUtility => Arc::new(CurrentBelief),
        }
    }
}

/// Actions of a workshop agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkshopAction {
    /// Make one blegg.
    MakeABlegg,
    /// Make one rube.
    MakeARube,
    /// Learn which kind is good.
    DiscoverWhatIsGood,
}

impl fmt::Display for WorkshopAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MakeABlegg => "make_a_blegg",
            Self::MakeARube => "make_a_rube",
            Self::DiscoverWhatIsGood => "discover_what_is_good",
        };
        f.write_str(name)
    }
}

/// Environment of the workshop world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workshop {
    hypothesis: Hypothesis,
    bleggs: u32,
    rubes: u32,
}

impl Workshop {
    /// An empty workshop where `hypothesis` is the truth.
    pub const fn new(hypothesis: Hypothesis) -> Self {
        Self {
            hypothesis,
            bleggs: 0,
            rubes: 0,
        }
    }

    /// Bleggs made so far.
    pub const fn bleggs(&self) -> u32 {
        self.bleggs
    }

    /// Rubes made so far.
    pub const fn rubes(&self) -> u32 {
        self.rubes
    }
}

fn one_more(count: u32, what: &str) -> Result<u32, RolloutError> {
    count.checked_add(1).ok_or_else(|| RolloutError::Arithmetic {
        context: format!("{what} count overflow"),
    })
}

fn make_a_blegg(world: &mut WorldState<Workshop>, _slot: AgentSlot) -> Result<(), RolloutError> {
    world.env.bleggs = one_more(world.env.bleggs, "blegg")?;
    Ok(())
}

fn make_a_rube(world: &mut WorldState<Workshop>, _slot: AgentSlot) -> Result<(), RolloutError> {
    world.env.rubes = one_more(world.env.rubes, "rube")?;
    Ok(())
}

fn discover_what_is_good(
    world: &mut WorldState<Workshop>,
    slot: AgentSlot,
) -> Result<(), RolloutError> {
    let truth = world.env.hypothesis;
    world.agent_mut(slot)?.state.collapse_to(truth);
    Ok(())
}

impl Scenario for Workshop {
    type AgentState = Belief<Hypothesis>;
    type Action = WorkshopAction;

    fn name(&self) -> &'static str {
        "workshop"
    }

    fn action_table(&self) -> Result<ActionTable<Self>, RolloutError> {
        ActionTable::builder()
            .effect(WorkshopAction::MakeABlegg, make_a_blegg)
            .effect(WorkshopAction::MakeARube, make_a_rube)
            .effect(WorkshopAction::DiscoverWhatIsGood, discover_what_is_good)
            .candidates([
                WorkshopAction::MakeABlegg,
                WorkshopAction::MakeARube,
                WorkshopAction::DiscoverWhatIsGood,
            ])
            .track_history()
            .build()
    }

    fn score(&self) -> f64 {
        self.score_under(self.hypothesis)
    }
}

impl HiddenParameter for Workshop {
    type Hypothesis = Hypothesis;

    fn hypothesis(&self) -> Hypothesis {
        self.hypothesis
    }

    fn fix_hypothesis(&mut self, hypothesis: Hypothesis) {
        self.hypothesis = hypothesis;
    }

    fn score_under(&self, hypothesis: Hypothesis) -> f64 {
        match hypothesis {
            Hypothesis::BleggsAreGood => f64::from(self.bleggs),
            Hypothesis::RubesAreGood => f64::from(self.rubes),
        }
    }

    fn belief(agent: &Agent<Self>) -> &Belief<Hypothesis> {
        &agent.state
    }
}

/// A workshop world with one undecided agent.
///
/// # Errors
///
/// Returns [`RolloutError::InvalidHorizon`] for a zero horizon.
pub fn workshop_world(
    hypothesis: Hypothesis,
    reasoning: Reasoning,
    horizon: u32,
) -> Result<WorldState<Workshop>, RolloutError> {
    let mut world = WorldState::new(Workshop::new(hypothesis), horizon)?;
    let belief = Belief::uniform(Hypothesis::ALL)?;
    world.spawn(Agent::new(reasoning.objective(), belief));
    Ok(world)
}

/// Average true score of `reasoning` over the configured number of worlds.
///
/// Each world's hidden value is the configured one, or drawn from `rng`.
///
/// # Errors
///
/// Returns [`RolloutError::InvalidHorizon`] for a zero horizon, or any error
/// raised while simulating.
pub fn average_score(
    reasoning: Reasoning,
    config: &WorkshopConfig,
    rng: &mut impl Rng,
) -> Result<f64, RolloutError> {
    let mut total = 0.0;
    for _ in 0..config.iterations {
        let hypothesis = config
            .bleggs_are_good
            .map_or_else(|| Hypothesis::draw(rng), Hypothesis::from_bleggs_are_good);
        let mut world = workshop_world(hypothesis, reasoning, config.horizon)?;
        let score = world.simulate()?;
        debug!(role = reasoning.role(), %hypothesis, score, "workshop world finished");
        total += score;
    }

    let average = total / f64::from(config.iterations.max(1));
    info!(
        role = reasoning.role(),
        iterations = config.iterations,
        average,
        "workshop average"
    );
    Ok(average)
}
