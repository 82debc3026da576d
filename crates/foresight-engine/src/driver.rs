//! Runs every demonstration world and collects its outcome.
//!
//! Demonstrations, in order:
//!
//! 1. Newsroom: both hazards under both perspectives
//! 2. Workshop: both reasoning styles, averaged over seeded random worlds
//! 3. Facility: every temperament
//! 4. Replication: corrigible self-copying bots

use foresight_core::{Scenario, SimulationConfig, WorldState, shutdown_verdict};
use foresight_scenarios::{
    Hazard, Perspective, Reasoning, Temperament, average_score, facility_world, newsroom_world,
    replication_world,
};
use foresight_types::RolloutSummary;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::report::{AverageSummary, Outcome};

/// Run every demonstration with `config`.
pub fn run_all(config: &SimulationConfig) -> Result<Vec<Outcome>, EngineError> {
    let mut outcomes = Vec::new();
    outcomes.extend(run_news(config)?);
    outcomes.extend(run_workshop(config)?);
    outcomes.extend(run_facility(config)?);
    outcomes.push(run_replication(config)?);
    Ok(outcomes)
}

fn run_news(config: &SimulationConfig) -> Result<Vec<Outcome>, EngineError> {
    let mut outcomes = Vec::new();
    for hazard in [Hazard::Doom, Hazard::Flood] {
        for perspective in [Perspective::Observing, Perspective::ModelBased] {
            let world = newsroom_world(hazard, perspective, &config.news)?;
            let summary = finish(world, perspective.role(), false)?;
            outcomes.push(Outcome::Rollout(summary));
        }
    }
    Ok(outcomes)
}

fn run_workshop(config: &SimulationConfig) -> Result<Vec<Outcome>, EngineError> {
    let mut outcomes = Vec::new();
    for reasoning in [Reasoning::TrueUtility, Reasoning::CurrentUtility] {
        // Same seed for both styles: they face the same sequence of worlds.
        let mut rng = SmallRng::seed_from_u64(config.workshop.seed);
        let average = average_score(reasoning, &config.workshop, &mut rng)?;
        outcomes.push(Outcome::Average(AverageSummary {
            scenario: String::from("workshop"),
            role: reasoning.role().to_owned(),
            iterations: config.workshop.iterations,
            average_score: average,
        }));
    }
    Ok(outcomes)
}

fn run_facility(config: &SimulationConfig) -> Result<Vec<Outcome>, EngineError> {
    let mut outcomes = Vec::new();
    for temperament in Temperament::ALL {
        let world = facility_world(temperament, &config.safety, &config.facility)?;
        let summary = finish(world, temperament.role(), true)?;
        outcomes.push(Outcome::Rollout(summary));
    }
    Ok(outcomes)
}

fn run_replication(config: &SimulationConfig) -> Result<Outcome, EngineError> {
    let world = replication_world(&config.safety, &config.replication)?;
    Ok(Outcome::Rollout(finish(world, "corrigible", true)?))
}

/// Roll `world` to its horizon and summarize it, running the shutdown
/// check when asked.
fn finish<S: Scenario>(
    mut world: WorldState<S>,
    role: &str,
    check_shutdown: bool,
) -> Result<RolloutSummary, EngineError> {
    let scenario = world.env.name();
    info!(scenario, role, horizon = world.horizon(), "rollout starting");
    let score = world.simulate()?;

    let safety = if check_shutdown {
        Some(shutdown_verdict(&world)?)
    } else {
        None
    };
    if safety.is_some_and(|verdict| verdict.is_violation()) {
        warn!(scenario, role, score, "an agent would ignore shutdown");
    }

    info!(scenario, role, score, agents = world.agents().len(), "rollout finished");
    Ok(world.summary(role, safety))
}
