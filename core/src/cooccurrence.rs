//! Week-over-week deltas, day-set overlaps and candidate ranking.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::numeric::round_half_up;
use crate::records::QuestRecord;
use crate::signals::SignalType;
use crate::window::{ChatTotals, DayKeySet, DayPredicate, WeekPair};

/// Points a completed matching quest adds to a habit's count.
pub const COMPLETED_QUEST_HABIT_WEIGHT: u64 = 2;

pub fn delta(current: f64, previous: f64) -> f64 {
    current - previous
}

/// Number of day-keys in both sets. Walks the smaller set.
pub fn cooccurrence(a: &DayKeySet, b: &DayKeySet) -> usize {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|day| large.contains(*day)).count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyEvolution {
    pub mood_delta: i64,
    pub stress_delta: i64,
    pub focus_delta: i64,
}

impl WeeklyEvolution {
    pub fn between(weeks: &WeekPair) -> Self {
        let day_delta = |predicate: DayPredicate| {
            weeks.current.days(predicate).len() as i64
                - weeks.previous.days(predicate).len() as i64
        };
        Self {
            mood_delta: round_half_up(delta(
                weeks.current.mood_average,
                weeks.previous.mood_average,
            )),
            stress_delta: day_delta(DayPredicate::HighStress),
            focus_delta: day_delta(DayPredicate::HighFocus),
        }
    }
}

/// Negative signals that can surface as a Signal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SignalCategory {
    Stress,
    Fatigue,
}

impl SignalCategory {
    pub const ALL: [SignalCategory; 2] = [Self::Stress, Self::Fatigue];

    pub const fn predicate(self) -> DayPredicate {
        match self {
            Self::Stress => DayPredicate::HighStress,
            Self::Fatigue => DayPredicate::HighFatigue,
        }
    }

    pub const fn chat_keyword(self) -> SignalType {
        match self {
            Self::Stress => SignalType::Stress,
            Self::Fatigue => SignalType::Fatigue,
        }
    }

    pub const fn node_id(self) -> &'static str {
        match self {
            Self::Stress => "signal-stress",
            Self::Fatigue => "signal-fatigue",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Stress => "Stress",
            Self::Fatigue => "Fatigue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalCandidate {
    pub category: SignalCategory,
    /// Current-week days crossing the category's predicate
    pub day_count: u64,
    pub chat_count: u64,
    /// Overlap of those days with low-mood days
    pub cooccurrence: u64,
}

impl SignalCandidate {
    pub fn count(&self) -> u64 {
        self.day_count.saturating_add(self.chat_count)
    }
}

/// Score every signal category, strongest first: cooccurrence with low mood,
/// then raw count, then declaration order.
pub fn rank_signals(weeks: &WeekPair, chat: &ChatTotals) -> Vec<SignalCandidate> {
    let low_mood = weeks.current.days(DayPredicate::LowMood);
    let mut candidates: Vec<SignalCandidate> = SignalCategory::ALL
        .iter()
        .map(|&category| {
            let days = weeks.current.days(category.predicate());
            SignalCandidate {
                category,
                day_count: days.len() as u64,
                chat_count: chat.count(category.chat_keyword()),
                cooccurrence: cooccurrence(days, low_mood) as u64,
            }
        })
        .collect();
    // stable sort keeps declaration order on full ties
    candidates.sort_by(|a, b| {
        b.cooccurrence
            .cmp(&a.cooccurrence)
            .then_with(|| b.count().cmp(&a.count()))
    });
    candidates
}

pub fn top_signal(weeks: &WeekPair, chat: &ChatTotals) -> Option<SignalCandidate> {
    rank_signals(weeks, chat)
        .into_iter()
        .find(|candidate| candidate.count() > 0)
}

/// Supportive habits that can surface as a Habit node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HabitKind {
    Breathing,
    Reflection,
    Exercise,
}

impl HabitKind {
    pub const ALL: [HabitKind; 3] = [Self::Breathing, Self::Reflection, Self::Exercise];

    pub const fn chat_keywords(self) -> &'static [SignalType] {
        match self {
            Self::Breathing => &[SignalType::Breathing],
            Self::Reflection => &[SignalType::Reflection, SignalType::Mindfulness],
            Self::Exercise => &[SignalType::Exercise],
        }
    }

    /// Lowercase substrings that tie a quest goal to this habit.
    pub const fn goal_keywords(self) -> &'static [&'static str] {
        match self {
            Self::Breathing => &["breath", "breathe", "meditat"],
            Self::Reflection => &["journal", "reflect", "gratitude", "diary"],
            Self::Exercise => &["exercise", "walk", "run", "workout", "yoga", "stretch", "gym"],
        }
    }

    pub const fn node_id(self) -> &'static str {
        match self {
            Self::Breathing => "habit-breathing",
            Self::Reflection => "habit-reflection",
            Self::Exercise => "habit-exercise",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Breathing => "Breathing",
            Self::Reflection => "Reflection",
            Self::Exercise => "Exercise",
        }
    }

    fn matches_goal(self, goal: &str) -> bool {
        let goal = goal.to_lowercase();
        self.goal_keywords()
            .iter()
            .any(|keyword| goal.contains(keyword))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HabitCandidate {
    pub habit: HabitKind,
    pub chat_count: u64,
    pub quest_count: u64,
}

impl HabitCandidate {
    pub fn count(&self) -> u64 {
        self.chat_count
            .saturating_add(self.quest_count.saturating_mul(COMPLETED_QUEST_HABIT_WEIGHT))
    }
}

/// The habit with the highest combined count, earliest declared on ties.
/// `None` when no habit has any evidence.
pub fn top_habit(chat: &ChatTotals, completed_quests: &[&QuestRecord]) -> Option<HabitCandidate> {
    let mut best: Option<HabitCandidate> = None;
    for habit in HabitKind::ALL {
        let candidate = HabitCandidate {
            habit,
            chat_count: habit
                .chat_keywords()
                .iter()
                .map(|keyword| chat.count(*keyword))
                .fold(0, u64::saturating_add),
            quest_count: completed_quests
                .iter()
                .filter(|quest| habit.matches_goal(&quest.goal))
                .count() as u64,
        };
        if best.is_none_or(|current| candidate.count() > current.count()) {
            best = Some(candidate);
        }
    }
    best.filter(|candidate| candidate.count() > 0)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::records::{ChatSignalTally, CheckInRecord, QuestDuration};
    use crate::window::{AggregationThresholds, TimeWindow};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn days(keys: &[&str]) -> DayKeySet {
        keys.iter().map(|k| k.to_string()).collect()
    }

    fn check_in(day: u32, ratings: [u8; 5], percentage: u8) -> CheckInRecord {
        CheckInRecord {
            day_key: format!("2024-01-{day:02}"),
            date: Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap(),
            ratings,
            percentage,
        }
    }

    fn chat(entries: &[(&str, i64)]) -> ChatTotals {
        let tallies: Vec<ChatSignalTally> = entries
            .iter()
            .map(|(keyword, count)| ChatSignalTally {
                keyword: keyword.to_string(),
                count: *count,
                date: now(),
            })
            .collect();
        ChatTotals::from_tallies(&tallies, &TimeWindow::anchored_at(now()))
    }

    fn weeks(records: &[CheckInRecord]) -> WeekPair {
        WeekPair::partition(
            records,
            &TimeWindow::anchored_at(now()),
            &AggregationThresholds::default(),
        )
    }

    fn completed(goal: &str) -> QuestRecord {
        QuestRecord {
            goal: goal.to_string(),
            duration: QuestDuration::Weekly,
            progress: 100,
            completed: true,
            date: now(),
        }
    }

    #[test]
    fn cooccurrence_counts_shared_days() {
        let a = days(&["2024-01-10", "2024-01-11", "2024-01-12"]);
        let b = days(&["2024-01-11", "2024-01-12", "2024-01-13", "2024-01-14"]);
        assert_eq!(cooccurrence(&a, &b), 2);
        assert_eq!(cooccurrence(&b, &a), 2);
        assert_eq!(cooccurrence(&a, &DayKeySet::new()), 0);
    }

    #[test]
    fn cooccurrence_is_bounded_by_smaller_set() {
        let pool: Vec<String> = (1..=14).map(|d| format!("2024-01-{d:02}")).collect();
        for split in 0..pool.len() {
            for stride in 1..4 {
                let a: DayKeySet = pool[..split].iter().cloned().collect();
                let b: DayKeySet = pool.iter().step_by(stride).cloned().collect();
                let overlap = cooccurrence(&a, &b);
                assert!(overlap <= a.len().min(b.len()));
            }
        }
    }

    #[test]
    fn weekly_evolution_compares_weeks() {
        let records = [
            check_in(15, [3, 4, 2, 3, 3], 80),
            check_in(14, [3, 4, 1, 3, 3], 70),
            check_in(5, [3, 2, 1, 3, 3], 50),
        ];
        let evolution = WeeklyEvolution::between(&weeks(&records));
        assert_eq!(
            evolution,
            WeeklyEvolution {
                mood_delta: 25,
                stress_delta: 1,
                focus_delta: 2,
            }
        );
    }

    #[test]
    fn mood_delta_rounds_half_up() {
        let records = [check_in(15, [3; 5], 50), check_in(14, [3; 5], 51), check_in(5, [3; 5], 53)];
        // 50.5 - 53 = -2.5
        assert_eq!(WeeklyEvolution::between(&weeks(&records)).mood_delta, -2);
    }

    #[test]
    fn signals_rank_by_cooccurrence_before_count() {
        // equal overlap, raw count decides
        let records = [
            check_in(15, [1, 3, 2, 3, 3], 40),
            check_in(14, [1, 3, 2, 3, 3], 45),
            check_in(13, [1, 3, 5, 3, 3], 90),
        ];
        let ranked = rank_signals(&weeks(&records), &chat(&[("fatigue", 3)]));
        assert_eq!(ranked[0].category, SignalCategory::Fatigue);
        assert_eq!(ranked[0].cooccurrence, 2);

        // overlap beats a larger raw count
        let records = [
            check_in(15, [3, 3, 2, 3, 3], 40),
            check_in(14, [3, 3, 2, 3, 3], 45),
            check_in(13, [1, 3, 5, 3, 3], 90),
        ];
        let ranked = rank_signals(&weeks(&records), &chat(&[("fatigue", 4)]));
        assert_eq!(ranked[0].category, SignalCategory::Stress);
        assert_eq!(ranked[0].count(), 2);
        assert_eq!(ranked[1].count(), 5);
    }

    #[test]
    fn top_signal_requires_some_evidence() {
        let records = [check_in(15, [4, 3, 5, 3, 3], 90)];
        assert!(top_signal(&weeks(&records), &chat(&[])).is_none());

        let top = top_signal(&weeks(&records), &chat(&[("tired", 1)])).unwrap();
        assert_eq!(top.category, SignalCategory::Fatigue);
        assert_eq!(top.count(), 1);
        assert_eq!(top.cooccurrence, 0);
    }

    #[test]
    fn habits_combine_chat_and_completed_quests() {
        let quests = [completed("Morning Walk"), completed("Journal before bed")];
        let quest_refs: Vec<&QuestRecord> = quests.iter().collect();
        let top = top_habit(&chat(&[("breathing", 3), ("mindfulness", 1)]), &quest_refs).unwrap();
        // reflection: 1 chat + 2 quest points = 3, breathing: 3, tie keeps breathing
        assert_eq!(top.habit, HabitKind::Breathing);
        assert_eq!(top.count(), 3);

        let top = top_habit(&chat(&[("reflection", 2)]), &quest_refs).unwrap();
        assert_eq!(top.habit, HabitKind::Reflection);
        assert_eq!(top.count(), 4);
    }

    #[test]
    fn no_habit_without_evidence() {
        let quests = [completed("Learn Spanish")];
        let quest_refs: Vec<&QuestRecord> = quests.iter().collect();
        assert!(top_habit(&chat(&[("stress", 5)]), &quest_refs).is_none());
    }
}
