//! Node and edge construction.
//!
//! Nodes are appended in a fixed order (mood, signal, habit, focus routine,
//! active quest) and the consistency fallback is only considered once every
//! primary candidate has had its turn. Changing the order changes output.

use crate::cooccurrence::{HabitCandidate, HabitKind, SignalCandidate, SignalCategory};
use crate::graph::{
    EdgeStrength, InsightEdge, InsightNode, NodeKind, NodeState, RoutineKind, node_color,
};
use crate::numeric::{clamp_score, round_half_up};
use crate::records::QuestRecord;

pub const MAX_NODES: usize = 5;
/// Below this many primary nodes the consistency fallback is added.
pub const MIN_PRIMARY_NODES: usize = 3;
/// Mood score used when there is no current-week average.
pub const NEUTRAL_MOOD_SCORE: f64 = 50.0;

pub const MOOD_NODE_ID: &str = "mood";
pub const ROUTINE_FOCUS_NODE_ID: &str = "routine-focus";
pub const QUEST_ACTIVE_NODE_ID: &str = "quest-active";
pub const CONSISTENCY_NODE_ID: &str = "consistency";

const QUEST_LABEL_MAX_CHARS: usize = 24;
const QUEST_LABEL_KEEP_CHARS: usize = 21;

/// Everything the synthesizer needs, already aggregated.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightStats {
    pub current_mood_average: f64,
    pub mood_delta: i64,
    pub current_check_ins: usize,
    pub low_mood_days: usize,
    pub focus_days: u64,
    pub chat_focus: u64,
    pub chat_motivation: u64,
    pub top_signal: Option<SignalCandidate>,
    pub top_habit: Option<HabitCandidate>,
    pub active_quest: Option<QuestRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsightGraph {
    pub nodes: Vec<InsightNode>,
    pub edges: Vec<InsightEdge>,
}

impl InsightGraph {
    fn has_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }

    #[allow(clippy::too_many_arguments)]
    fn push_node(
        &mut self,
        id: &str,
        label: impl Into<String>,
        kind: NodeKind,
        state: NodeState,
        score: u8,
        occurrences: u64,
        summary: String,
        details: Vec<String>,
        suggestion: &str,
    ) {
        let color = node_color(kind.node_type(), state).to_string();
        self.nodes.push(InsightNode {
            id: id.to_string(),
            label: label.into(),
            kind,
            state,
            score,
            occurrences,
            summary,
            details,
            suggestion: suggestion.to_string(),
            color,
        });
    }

    /// Keep the first `MAX_NODES` nodes and drop edges that lost an endpoint.
    fn finish(mut self) -> Self {
        self.nodes.truncate(MAX_NODES);
        let nodes = &self.nodes;
        self.edges.retain(|edge| {
            nodes.iter().any(|node| node.id == edge.source)
                && nodes.iter().any(|node| node.id == edge.target)
        });
        self
    }
}

pub fn synthesize(stats: &InsightStats) -> InsightGraph {
    let mut graph = InsightGraph::default();

    push_mood(&mut graph, stats);
    if let Some(signal) = &stats.top_signal {
        push_signal(&mut graph, signal);
    }
    if let Some(habit) = stats.top_habit.filter(|habit| habit.count() > 0) {
        push_habit(&mut graph, &habit, stats.mood_delta);
    }
    push_focus_routine(&mut graph, stats);
    if let Some(quest) = &stats.active_quest {
        push_active_quest(&mut graph, quest, stats);
    }
    if graph.nodes.len() < MIN_PRIMARY_NODES {
        push_consistency(&mut graph, stats.current_check_ins);
    }

    graph.finish()
}

/// "+N" for gains, plain "N" otherwise (so zero reads "0").
pub fn format_signed(value: i64) -> String {
    if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

/// Quest goals longer than 24 characters are cut to 21 plus "...".
pub fn quest_label(goal: &str) -> String {
    if goal.chars().count() > QUEST_LABEL_MAX_CHARS {
        let kept: String = goal.chars().take(QUEST_LABEL_KEEP_CHARS).collect();
        format!("{kept}...")
    } else {
        goal.to_string()
    }
}

fn push_mood(graph: &mut InsightGraph, stats: &InsightStats) {
    let baseline = if stats.current_mood_average == 0.0 {
        NEUTRAL_MOOD_SCORE
    } else {
        stats.current_mood_average
    };
    let score = clamp_score(baseline);
    let state = NodeState::from_score(score);
    let average = round_half_up(stats.current_mood_average);

    let suggestion = match state {
        NodeState::High => "Keep protecting the routines that lift your mood.",
        NodeState::Medium => "A short daily check-in helps you spot what moves your mood.",
        NodeState::Low => "Be gentle with yourself today and reach out to someone you trust.",
    };

    graph.push_node(
        MOOD_NODE_ID,
        "Mood",
        NodeKind::Mood {
            average,
            delta: stats.mood_delta,
        },
        state,
        score,
        stats.current_check_ins as u64,
        format!(
            "Your mood averaged {average}% this week ({} vs last week).",
            format_signed(stats.mood_delta)
        ),
        vec![
            format!("{} check-ins this week", stats.current_check_ins),
            format!("{} low-mood days", stats.low_mood_days),
        ],
        suggestion,
    );
}

fn push_signal(graph: &mut InsightGraph, signal: &SignalCandidate) {
    let count = signal.count();
    let score = clamp_score(count as f64 * 18.0 + signal.cooccurrence as f64 * 14.0);
    let state = if count >= 4 || signal.cooccurrence >= 3 {
        NodeState::High
    } else if count >= 2 {
        NodeState::Medium
    } else {
        NodeState::Low
    };
    let category = signal.category;
    let label = category.label();

    let suggestion = match category {
        SignalCategory::Stress => "Try a two-minute breathing break when stress builds.",
        SignalCategory::Fatigue => "Protect your sleep window and take short movement breaks.",
    };

    graph.push_node(
        category.node_id(),
        label,
        NodeKind::Signal {
            signal: category,
            cooccurrence: signal.cooccurrence,
        },
        state,
        score,
        count,
        format!(
            "{label} showed up {count} times this week, {} of them on low-mood days.",
            signal.cooccurrence
        ),
        vec![
            format!("{} check-in days", signal.day_count),
            format!("{} chat mentions", signal.chat_count),
        ],
        suggestion,
    );

    if signal.cooccurrence > 0 {
        graph.edges.push(InsightEdge::new(
            category.node_id(),
            MOOD_NODE_ID,
            EdgeStrength::from_cooccurrence(signal.cooccurrence),
            u32::try_from(signal.cooccurrence).unwrap_or(u32::MAX),
            format!(
                "{label} overlapped with low mood on {} days this week.",
                signal.cooccurrence
            ),
        ));
    }
}

fn push_habit(graph: &mut InsightGraph, habit: &HabitCandidate, mood_delta: i64) {
    let count = habit.count();
    let score = clamp_score(count as f64 * 16.0 + mood_delta.max(0) as f64 * 2.0);
    let state = if count >= 5 {
        NodeState::High
    } else if count >= 3 {
        NodeState::Medium
    } else {
        NodeState::Low
    };
    let kind = habit.habit;
    let label = kind.label();

    let suggestion = match kind {
        HabitKind::Breathing => {
            "Anchor a breathing exercise to a daily cue, like your morning coffee."
        }
        HabitKind::Reflection => "Close the day with three lines of journaling.",
        HabitKind::Exercise => "Schedule a short walk on your busiest days.",
    };

    graph.push_node(
        kind.node_id(),
        label,
        NodeKind::Habit { habit: kind },
        state,
        score,
        count,
        format!("{label} came up {count} times across chats and completed quests."),
        vec![
            format!("{} chat mentions", habit.chat_count),
            format!("{} completed quests", habit.quest_count),
        ],
        suggestion,
    );

    let lift = i64::from(mood_delta > 0);
    let edge_score = round_half_up(count as f64 / 2.0)
        .saturating_add(lift)
        .clamp(1, i64::from(u32::MAX)) as u32;
    let reason = if mood_delta > 0 {
        format!("{label} lines up with a lift in your mood this week.")
    } else {
        format!("{label} supports your mood this week.")
    };
    graph
        .edges
        .push(InsightEdge::scored(kind.node_id(), MOOD_NODE_ID, edge_score, reason));
}

fn push_focus_routine(graph: &mut InsightGraph, stats: &InsightStats) {
    let total = stats
        .focus_days
        .saturating_add(stats.chat_focus)
        .saturating_add(stats.chat_motivation.saturating_sub(1));
    if total == 0 {
        return;
    }
    let score = clamp_score(total as f64 * 14.0 + stats.focus_days as f64 * 6.0);

    graph.push_node(
        ROUTINE_FOCUS_NODE_ID,
        "Focus Routine",
        NodeKind::Routine {
            routine: RoutineKind::Focus,
        },
        NodeState::from_score(score),
        score,
        total,
        format!(
            "You had {} high-focus days and {} focus mentions this week.",
            stats.focus_days, stats.chat_focus
        ),
        vec![format!("{} motivation mentions", stats.chat_motivation)],
        "Block your sharpest hour for the task that matters most.",
    );
}

fn push_active_quest(graph: &mut InsightGraph, quest: &QuestRecord, stats: &InsightStats) {
    let score = clamp_score(f64::from(quest.progress));
    let suggestion = if quest.progress >= 50 {
        "You're past halfway; one small step today keeps the momentum."
    } else {
        "Break your quest into a step you can finish today."
    };

    graph.push_node(
        QUEST_ACTIVE_NODE_ID,
        quest_label(&quest.goal),
        NodeKind::Quest {
            progress: quest.progress,
            duration: quest.duration,
        },
        NodeState::from_score(score),
        score,
        1,
        format!("{} is {}% complete.", quest.goal, quest.progress),
        vec![format!("{} quest", quest.duration.as_str())],
        suggestion,
    );

    let progress_steps = f64::from(quest.progress) / 25.0;
    if graph.has_node(ROUTINE_FOCUS_NODE_ID) {
        let score = round_half_up((stats.focus_days as f64 + progress_steps) / 2.0).max(1) as u32;
        graph.edges.push(InsightEdge::scored(
            ROUTINE_FOCUS_NODE_ID,
            QUEST_ACTIVE_NODE_ID,
            score,
            "Focused days are moving your quest forward.",
        ));
    }
    if quest.progress >= 40 && stats.current_mood_average >= 55.0 {
        let score = round_half_up(progress_steps).max(1) as u32;
        graph.edges.push(InsightEdge::scored(
            QUEST_ACTIVE_NODE_ID,
            MOOD_NODE_ID,
            score,
            "Progress on your quest comes with a steadier mood.",
        ));
    }
}

fn push_consistency(graph: &mut InsightGraph, check_ins: usize) {
    let score = clamp_score(check_ins as f64 * 20.0);

    graph.push_node(
        CONSISTENCY_NODE_ID,
        "Consistency",
        NodeKind::Routine {
            routine: RoutineKind::Consistency,
        },
        NodeState::from_score(score),
        score,
        check_ins as u64,
        format!("You checked in {check_ins} times in the last 7 days."),
        Vec::new(),
        "Check in once a day to unlock more connections in your map.",
    );
    graph.edges.push(InsightEdge::new(
        CONSISTENCY_NODE_ID,
        MOOD_NODE_ID,
        EdgeStrength::Weak,
        1,
        "Regular check-ins make your mood picture clearer.",
    ));
}
