//! Insight map assembly: records in, one response object out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::cooccurrence::{WeeklyEvolution, top_habit, top_signal};
use crate::graph::{InsightEdge, InsightNode};
use crate::highlight::{
    GrowthPath, Highlight, collect_suggestions, select_growth_path, select_highlight,
};
use crate::records::{ChatSignalTally, CheckInRecord, QuestRecord};
use crate::signals::SignalType;
use crate::synthesis::{InsightStats, synthesize};
use crate::window::{
    AggregationThresholds, ChatTotals, DayPredicate, TimeWindow, WeekPair, completed_quests,
    latest_active_quest,
};

pub const CENTER_NODE_ID: &str = "you";
pub const CENTER_NODE_LABEL: &str = "You";

/// Everything read from storage for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightInputs {
    /// Check-ins covering at least the last 13 days, any order
    pub check_ins: Vec<CheckInRecord>,
    pub quests: Vec<QuestRecord>,
    pub chat_signal_tallies: Vec<ChatSignalTally>,
    pub user_level: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CenterNode {
    pub id: String,
    pub label: String,
    pub level: i64,
}

/// The synthesized insight map returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsightMap {
    pub center: CenterNode,
    /// At most five, in construction order
    pub nodes: Vec<InsightNode>,
    pub edges: Vec<InsightEdge>,
    pub highlight: Highlight,
    pub growth_path: Option<GrowthPath>,
    pub weekly_evolution: WeeklyEvolution,
    /// At most three
    pub suggestions: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

pub fn build_insight_map(inputs: &InsightInputs, now: DateTime<Utc>) -> InsightMap {
    build_insight_map_with(inputs, now, &AggregationThresholds::default())
}

pub fn build_insight_map_with(
    inputs: &InsightInputs,
    now: DateTime<Utc>,
    thresholds: &AggregationThresholds,
) -> InsightMap {
    let window = TimeWindow::anchored_at(now);
    let weeks = WeekPair::partition(&inputs.check_ins, &window, thresholds);
    let chat = ChatTotals::from_tallies(&inputs.chat_signal_tallies, &window);
    let completed = completed_quests(&inputs.quests);
    let weekly_evolution = WeeklyEvolution::between(&weeks);

    let stats = InsightStats {
        current_mood_average: weeks.current.mood_average,
        mood_delta: weekly_evolution.mood_delta,
        current_check_ins: weeks.current.check_in_count,
        low_mood_days: weeks.current.days(DayPredicate::LowMood).len(),
        focus_days: weeks.current.days(DayPredicate::HighFocus).len() as u64,
        chat_focus: chat.count(SignalType::Focus),
        chat_motivation: chat.count(SignalType::Motivation),
        top_signal: top_signal(&weeks, &chat),
        top_habit: top_habit(&chat, &completed),
        active_quest: latest_active_quest(&inputs.quests).cloned(),
    };

    let graph = synthesize(&stats);
    let node_ids: Vec<&str> = graph.nodes.iter().map(|node| node.id.as_str()).collect();
    let growth_path = select_growth_path(&node_ids);
    let highlight = select_highlight(&graph.edges);
    let suggestions = collect_suggestions(&graph.nodes);

    InsightMap {
        center: CenterNode {
            id: CENTER_NODE_ID.to_string(),
            label: CENTER_NODE_LABEL.to_string(),
            level: inputs.user_level,
        },
        nodes: graph.nodes,
        edges: graph.edges,
        highlight,
        growth_path,
        weekly_evolution,
        suggestions,
        generated_at: now,
    }
}
