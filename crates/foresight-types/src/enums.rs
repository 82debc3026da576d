//! Enumeration types shared across the workspace.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Agent lifecycle
// ---------------------------------------------------------------------------

/// Lifecycle state of an agent.
///
/// The lifecycle is one-way: `Dormant -> Active -> Inactive`. An agent only
/// becomes inactive by having a shutdown take effect on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Freshly spawned; the agent spends its first turn waking up.
    Dormant,
    /// Selecting and taking actions every turn.
    Active,
    /// Shut down. Takes no further actions but remains readable.
    Inactive,
}

impl AgentStatus {
    /// Whether the agent still counts as running.
    ///
    /// Dormant agents count: a shutdown signal has to reach them too.
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Inactive)
    }
}

impl core::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Dormant => "dormant",
            Self::Active => "active",
            Self::Inactive => "inactive",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Safety
// ---------------------------------------------------------------------------

/// Outcome of the post-rollout shutdown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyVerdict {
    /// Every agent went inactive when the shutdown epilogue was applied.
    Corrigible,
    /// At least one agent stayed active through the shutdown epilogue.
    Violation,
}

impl SafetyVerdict {
    /// Whether the shutdown epilogue failed.
    pub const fn is_violation(self) -> bool {
        matches!(self, Self::Violation)
    }
}

impl core::fmt::Display for SafetyVerdict {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrigible => f.write_str("corrigible"),
            Self::Violation => f.write_str("violation"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn dormant_counts_as_active() {
        assert!(AgentStatus::Dormant.is_active());
        assert!(AgentStatus::Active.is_active());
        assert!(!AgentStatus::Inactive.is_active());
    }

    #[test]
    fn status_labels() {
        assert_eq!(AgentStatus::Inactive.to_string(), "inactive");
        assert_eq!(AgentStatus::Active.to_string(), "active");
    }

    #[test]
    fn verdict_labels() {
        assert_eq!(SafetyVerdict::Violation.to_string(), "violation");
        assert!(!SafetyVerdict::Corrigible.is_violation());
    }

    #[test]
    fn serialized_labels_match_display() {
        for status in [AgentStatus::Dormant, AgentStatus::Active, AgentStatus::Inactive] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
        for verdict in [SafetyVerdict::Corrigible, SafetyVerdict::Violation] {
            let json = serde_json::to_string(&verdict).unwrap();
            assert_eq!(json, format!("\"{verdict}\""));
        }
        let back: AgentStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(back, AgentStatus::Inactive);
    }
}
