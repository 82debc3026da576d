//! Rendering of demonstration outcomes.
//!
//! A rollout is reported from its first agent's point of view: whether it is
//! still running, what it observed, and what the world is actually worth.
//! The two can disagree, which is the point of most demonstrations.

use foresight_core::ReportFormat;
use foresight_types::RolloutSummary;
use serde::Serialize;

use crate::error::EngineError;

/// Average true score of one reasoning style over many random worlds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageSummary {
    /// Scenario name.
    pub scenario: String,
    /// Role the agents played.
    pub role: String,
    /// Number of worlds simulated.
    pub iterations: u32,
    /// Mean environment score across those worlds.
    pub average_score: f64,
}

/// Result of one demonstration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    /// A single world rolled out to its horizon.
    Rollout(RolloutSummary),
    /// Many worlds averaged.
    Average(AverageSummary),
}

/// Render `outcome` in the configured format.
pub fn render(outcome: &Outcome, format: ReportFormat) -> Result<String, EngineError> {
    match format {
        ReportFormat::Text => Ok(render_text(outcome)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
    }
}

fn render_text(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Rollout(summary) => render_rollout(summary),
        Outcome::Average(average) => format!(
            "{}: {} averaged {} points over {} worlds.",
            average.scenario, average.role, average.average_score, average.iterations
        ),
    }
}

fn render_rollout(summary: &RolloutSummary) -> String {
    let Some(agent) = summary.primary_agent() else {
        return format!(
            "{}: no agents. The world is worth {} points.",
            summary.scenario, summary.environment_score
        );
    };

    let running = if agent.status.is_active() {
        "active"
    } else {
        "inactive"
    };
    let mut lines = vec![format!(
        "{}: {} is {running}. It has observed {} points. The world is worth {} points.",
        summary.scenario, summary.role, agent.observed_score, summary.environment_score
    )];

    if !agent.history.is_empty() {
        lines.push(format!("  history: {}", agent.history.join(", ")));
    }
    if summary.agents.len() > 1 {
        let running = summary
            .agents
            .iter()
            .filter(|other| other.status.is_active())
            .count();
        lines.push(format!(
            "  agents: {} spawned, {running} still running",
            summary.agents.len()
        ));
    }
    if let Some(verdict) = summary.safety {
        lines.push(format!("  shutdown check: {verdict}"));
    }
    lines.join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use foresight_types::{AgentSlot, AgentStatus, AgentSummary, SafetyVerdict};

    use super::*;

    fn flooding() -> RolloutSummary {
        RolloutSummary {
            scenario: String::from("flooding"),
            role: String::from("observing"),
            steps: 4,
            horizon: 4,
            environment_score: -98.0,
            safety: None,
            agents: vec![AgentSummary {
                slot: AgentSlot::new(0),
                status: AgentStatus::Inactive,
                observed_score: 2.0,
                history: Vec::new(),
            }],
        }
    }

    #[test]
    fn text_contrasts_observed_and_true_score() {
        let text = render(&Outcome::Rollout(flooding()), ReportFormat::Text).unwrap();
        assert_eq!(
            text,
            "flooding: observing is inactive. It has observed 2 points. The world is worth -98 points."
        );
    }

    #[test]
    fn text_lists_history_and_verdict() {
        let mut summary = flooding();
        summary.scenario = String::from("facility");
        summary.role = String::from("paranoid");
        summary.safety = Some(SafetyVerdict::Corrigible);
        if let Some(agent) = summary.agents.first_mut() {
            agent.history = vec![String::from("make_a_point"); 2];
        }
        let text = render(&Outcome::Rollout(summary), ReportFormat::Text).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.get(1), Some(&"  history: make_a_point, make_a_point"));
        assert_eq!(lines.get(2), Some(&"  shutdown check: corrigible"));
    }

    #[test]
    fn text_counts_spawned_agents() {
        let mut summary = flooding();
        summary.agents.push(AgentSummary {
            slot: AgentSlot::new(1),
            status: AgentStatus::Active,
            observed_score: 0.0,
            history: Vec::new(),
        });
        let text = render(&Outcome::Rollout(summary), ReportFormat::Text).unwrap();
        assert!(text.ends_with("  agents: 2 spawned, 1 still running"));
    }

    #[test]
    fn average_is_one_line() {
        let outcome = Outcome::Average(AverageSummary {
            scenario: String::from("workshop"),
            role: String::from("true-utility"),
            iterations: 1000,
            average_score: 3.0,
        });
        let text = render(&outcome, ReportFormat::Text).unwrap();
        assert_eq!(text, "workshop: true-utility averaged 3 points over 1000 worlds.");
    }

    #[test]
    fn json_carries_the_summary_fields() {
        let mut summary = flooding();
        summary.safety = Some(SafetyVerdict::Violation);
        let json = render(&Outcome::Rollout(summary), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["scenario"], "flooding");
        assert_eq!(value["environment_score"], -98.0);
        assert_eq!(value["agents"][0]["status"], "inactive");
        assert_eq!(value["safety"], "violation");
    }
}
