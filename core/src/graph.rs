//! Insight graph primitives.
//!
//! Nodes and edges are built fresh for every insight map and never stored.

use serde::Serialize;
use utoipa::ToSchema;

use crate::cooccurrence::{HabitKind, SignalCategory};
use crate::records::QuestDuration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Mood,
    Signal,
    Habit,
    Routine,
    Quest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Low,
    Medium,
    High,
}

impl NodeState {
    pub const HIGH_AT: u8 = 70;
    pub const MEDIUM_AT: u8 = 45;

    /// Standard score tiers: 70 and up is high, 45 and up is medium.
    pub fn from_score(score: u8) -> Self {
        if score >= Self::HIGH_AT {
            Self::High
        } else if score >= Self::MEDIUM_AT {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoutineKind {
    Focus,
    Consistency,
}

/// Type tag plus the payload specific to that kind of node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum NodeKind {
    Mood {
        /// Rounded current-week mood average
        average: i64,
        delta: i64,
    },
    Signal {
        signal: SignalCategory,
        cooccurrence: u64,
    },
    Habit {
        habit: HabitKind,
    },
    Routine {
        routine: RoutineKind,
    },
    Quest {
        progress: u8,
        duration: QuestDuration,
    },
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Mood { .. } => NodeType::Mood,
            Self::Signal { .. } => NodeType::Signal,
            Self::Habit { .. } => NodeType::Habit,
            Self::Routine { .. } => NodeType::Routine,
            Self::Quest { .. } => NodeType::Quest,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightNode {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    pub state: NodeState,
    /// 0-100
    pub score: u8,
    pub occurrences: u64,
    pub summary: String,
    pub details: Vec<String>,
    pub suggestion: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStrength {
    Weak,
    Medium,
    Strong,
}

impl EdgeStrength {
    /// Generic tiering: 4 and up is strong, 2 and up is medium.
    pub fn from_score(score: u32) -> Self {
        if score >= 4 {
            Self::Strong
        } else if score >= 2 {
            Self::Medium
        } else {
            Self::Weak
        }
    }

    /// Tiering for signal edges, keyed on shared low-mood days.
    pub fn from_cooccurrence(days: u64) -> Self {
        if days >= 3 {
            Self::Strong
        } else if days >= 2 {
            Self::Medium
        } else {
            Self::Weak
        }
    }

    /// Base rank used when picking the highlight edge.
    pub const fn tier_weight(self) -> u32 {
        match self {
            Self::Strong => 300,
            Self::Medium => 200,
            Self::Weak => 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub strength: EdgeStrength,
    /// Always at least 1
    pub score: u32,
    pub reason: String,
}

impl InsightEdge {
    pub fn new(
        source: &str,
        target: &str,
        strength: EdgeStrength,
        score: u32,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("{source}->{target}"),
            source: source.to_string(),
            target: target.to_string(),
            strength,
            score: score.max(1),
            reason: reason.into(),
        }
    }

    /// Edge tiered from its own score.
    pub fn scored(source: &str, target: &str, score: u32, reason: impl Into<String>) -> Self {
        let score = score.max(1);
        Self::new(source, target, EdgeStrength::from_score(score), score, reason)
    }

    pub fn rank(&self) -> u32 {
        self.strength.tier_weight().saturating_add(self.score)
    }
}

/// Fixed palette keyed by node type and state.
pub fn node_color(node_type: NodeType, state: NodeState) -> &'static str {
    match (node_type, state) {
        (NodeType::Mood, NodeState::Low) => "#F4A261",
        (NodeType::Mood, NodeState::Medium) => "#E9C46A",
        (NodeType::Mood, NodeState::High) => "#2A9D8F",
        (NodeType::Signal, NodeState::Low) => "#FCD5CE",
        (NodeType::Signal, NodeState::Medium) => "#F28482",
        (NodeType::Signal, NodeState::High) => "#D62828",
        (NodeType::Habit, NodeState::Low) => "#D8F3DC",
        (NodeType::Habit, NodeState::Medium) => "#95D5B2",
        (NodeType::Habit, NodeState::High) => "#40916C",
        (NodeType::Routine, NodeState::Low) => "#DDE5F6",
        (NodeType::Routine, NodeState::Medium) => "#8EA8E0",
        (NodeType::Routine, NodeState::High) => "#3A5BA0",
        (NodeType::Quest, NodeState::Low) => "#EADCF8",
        (NodeType::Quest, NodeState::Medium) => "#B794E0",
        (NodeType::Quest, NodeState::High) => "#7B2CBF",
    }
}
