//! Highlight edge, growth path and suggestion selection.

use serde::Serialize;
use utoipa::ToSchema;

use crate::graph::{InsightEdge, InsightNode};
use crate::synthesis::{QUEST_ACTIVE_NODE_ID, ROUTINE_FOCUS_NODE_ID};

pub const MAX_SUGGESTIONS: usize = 3;

pub const NO_EDGES_MESSAGE: &str =
    "Keep checking in to discover how your habits and mood connect.";
pub const STRESS_TO_HABIT_LABEL: &str = "Turn stress into a calming habit";
pub const FOCUS_TO_QUEST_LABEL: &str = "Channel your focus into your quest";

const STRESS_NODE_ID: &str = "signal-stress";
const HABIT_NODE_PREFIX: &str = "habit-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPath {
    pub from_node_id: String,
    pub to_node_id: String,
    pub label: String,
}

/// Pick the edge with the highest tier weight plus score; the first one wins ties.
pub fn select_highlight(edges: &[InsightEdge]) -> Highlight {
    let best = edges.iter().fold(None, |best: Option<&InsightEdge>, edge| match best {
        Some(current) if current.rank() >= edge.rank() => Some(current),
        _ => Some(edge),
    });

    match best {
        Some(edge) => Highlight {
            edge_id: Some(edge.id.clone()),
            message: edge.reason.clone(),
        },
        None => Highlight {
            edge_id: None,
            message: NO_EDGES_MESSAGE.to_string(),
        },
    }
}

pub fn select_growth_path<S: AsRef<str>>(node_ids: &[S]) -> Option<GrowthPath> {
    let has = |wanted: &str| node_ids.iter().any(|id| id.as_ref() == wanted);

    if has(STRESS_NODE_ID) {
        if let Some(habit) = node_ids
            .iter()
            .map(|id| id.as_ref())
            .find(|id| id.starts_with(HABIT_NODE_PREFIX))
        {
            return Some(GrowthPath {
                from_node_id: STRESS_NODE_ID.to_string(),
                to_node_id: habit.to_string(),
                label: STRESS_TO_HABIT_LABEL.to_string(),
            });
        }
    }

    if has(ROUTINE_FOCUS_NODE_ID) && has(QUEST_ACTIVE_NODE_ID) {
        return Some(GrowthPath {
            from_node_id: ROUTINE_FOCUS_NODE_ID.to_string(),
            to_node_id: QUEST_ACTIVE_NODE_ID.to_string(),
            label: FOCUS_TO_QUEST_LABEL.to_string(),
        });
    }

    None
}

/// First three distinct suggestions, in node order.
pub fn collect_suggestions(nodes: &[InsightNode]) -> Vec<String> {
    let mut suggestions: Vec<String> = Vec::with_capacity(MAX_SUGGESTIONS);
    for node in nodes {
        if suggestions.len() == MAX_SUGGESTIONS {
            break;
        }
        if !suggestions.contains(&node.suggestion) {
            suggestions.push(node.suggestion.clone());
        }
    }
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeStrength, NodeKind, NodeState, RoutineKind};

    fn node(id: &str, suggestion: &str) -> InsightNode {
        InsightNode {
            id: id.to_string(),
            label: id.to_string(),
            kind: NodeKind::Routine {
                routine: RoutineKind::Focus,
            },
            state: NodeState::Low,
            score: 0,
            occurrences: 0,
            summary: String::new(),
            details: Vec::new(),
            suggestion: suggestion.to_string(),
            color: String::new(),
        }
    }

    #[test]
    fn highlight_prefers_stronger_tier_over_raw_score() {
        let edges = [
            InsightEdge::new("a", "mood", EdgeStrength::Medium, 90, "medium but big"),
            InsightEdge::new("b", "mood", EdgeStrength::Strong, 3, "strong"),
        ];
        // 200 + 90 = 290 < 300 + 3
        assert_eq!(select_highlight(&edges).edge_id.as_deref(), Some("b->mood"));
        assert_eq!(select_highlight(&edges).message, "strong");
    }

    #[test]
    fn highlight_ties_keep_first_edge() {
        let edges = [
            InsightEdge::scored("a", "mood", 2, "first"),
            InsightEdge::scored("b", "mood", 2, "second"),
        ];
        assert_eq!(select_highlight(&edges).edge_id.as_deref(), Some("a->mood"));
    }

    #[test]
    fn highlight_without_edges_encourages() {
        let highlight = select_highlight(&[]);
        assert_eq!(highlight.edge_id, None);
        assert_eq!(highlight.message, NO_EDGES_MESSAGE);
        let value = serde_json::to_value(&highlight).unwrap();
        assert!(value.get("edgeId").is_none());
    }

    #[test]
    fn stress_to_habit_path_wins_over_focus_to_quest() {
        let ids = ["mood", "signal-stress", "habit-exercise", "routine-focus", "quest-active"];
        let path = select_growth_path(&ids).unwrap();
        assert_eq!(path.from_node_id, "signal-stress");
        assert_eq!(path.to_node_id, "habit-exercise");
        assert_eq!(path.label, STRESS_TO_HABIT_LABEL);
    }

    #[test]
    fn focus_to_quest_path_when_no_stress_habit_pair() {
        let ids = ["mood", "signal-stress", "routine-focus", "quest-active"];
        let path = select_growth_path(&ids).unwrap();
        assert_eq!(path.from_node_id, "routine-focus");
        assert_eq!(path.to_node_id, "quest-active");
    }

    #[test]
    fn no_growth_path_otherwise() {
        assert!(select_growth_path(&["mood", "signal-fatigue", "habit-breathing"]).is_none());
        assert!(select_growth_path(&["mood", "routine-focus"]).is_none());
        assert!(select_growth_path::<&str>(&[]).is_none());
    }

    #[test]
    fn suggestions_are_distinct_and_capped() {
        let nodes = [
            node("mood", "rest"),
            node("signal-stress", "breathe"),
            node("habit-breathing", "breathe"),
            node("routine-focus", "plan"),
            node("quest-active", "step"),
        ];
        assert_eq!(collect_suggestions(&nodes), vec!["rest", "breathe", "plan"]);
    }
}
