//! Week windows and per-week day-key summaries.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::records::{ChatSignalTally, CheckInRecord, QuestRecord, RatingIndex};
use crate::signals::SignalType;

/// Distinct calendar days. A day counts once no matter how many records it holds.
pub type DayKeySet = BTreeSet<String>;

/// Current and previous 7-day windows, anchored on UTC day boundaries.
///
/// The current week is `today - 6d ..`, so it always includes today; the
/// previous week is the seven days before that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub today: DateTime<Utc>,
    pub week_start: DateTime<Utc>,
    pub previous_week_start: DateTime<Utc>,
}

impl TimeWindow {
    pub fn anchored_at(now: DateTime<Utc>) -> Self {
        let today = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        Self {
            today,
            week_start: today - Duration::days(6),
            previous_week_start: today - Duration::days(13),
        }
    }

    pub fn in_current_week(&self, date: DateTime<Utc>) -> bool {
        date >= self.week_start
    }

    pub fn in_previous_week(&self, date: DateTime<Utc>) -> bool {
        date >= self.previous_week_start && date < self.week_start
    }
}

/// Threshold crossings that mark a check-in day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPredicate {
    LowMood,
    HighStress,
    HighFatigue,
    HighFocus,
}

/// Cutoffs for the day predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationThresholds {
    /// Percentage strictly below this is a low-mood day
    pub low_mood_below: u8,
    /// Stress rating at or below this is a high-stress day (stress is inverted)
    pub high_stress_at_most: u8,
    /// Energy rating at or below this is a high-fatigue day
    pub high_fatigue_at_most: u8,
    /// Focus rating at or above this is a high-focus day
    pub high_focus_at_least: u8,
}

impl Default for AggregationThresholds {
    fn default() -> Self {
        Self {
            low_mood_below: 55,
            high_stress_at_most: 2,
            high_fatigue_at_most: 2,
            high_focus_at_least: 4,
        }
    }
}

impl AggregationThresholds {
    pub fn matches(&self, predicate: DayPredicate, record: &CheckInRecord) -> bool {
        match predicate {
            DayPredicate::LowMood => record.percentage < self.low_mood_below,
            DayPredicate::HighStress => {
                record.rating(RatingIndex::Stress) <= self.high_stress_at_most
            }
            DayPredicate::HighFatigue => {
                record.rating(RatingIndex::Energy) <= self.high_fatigue_at_most
            }
            DayPredicate::HighFocus => {
                record.rating(RatingIndex::Focus) >= self.high_focus_at_least
            }
        }
    }
}

/// Aggregates for one week of check-ins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekSummary {
    pub check_in_count: usize,
    pub mood_average: f64,
    pub low_mood_days: DayKeySet,
    pub high_stress_days: DayKeySet,
    pub high_fatigue_days: DayKeySet,
    pub high_focus_days: DayKeySet,
}

impl WeekSummary {
    pub fn summarize<'a>(
        records: impl IntoIterator<Item = &'a CheckInRecord>,
        thresholds: &AggregationThresholds,
    ) -> Self {
        let mut summary = Self::default();
        let mut percentages = Vec::new();

        for record in records {
            summary.check_in_count += 1;
            percentages.push(f64::from(record.percentage));
            for predicate in [
                DayPredicate::LowMood,
                DayPredicate::HighStress,
                DayPredicate::HighFatigue,
                DayPredicate::HighFocus,
            ] {
                if thresholds.matches(predicate, record) {
                    summary
                        .days_mut(predicate)
                        .insert(record.day_key.clone());
                }
            }
        }

        summary.mood_average = average(&percentages);
        summary
    }

    pub fn days(&self, predicate: DayPredicate) -> &DayKeySet {
        match predicate {
            DayPredicate::LowMood => &self.low_mood_days,
            DayPredicate::HighStress => &self.high_stress_days,
            DayPredicate::HighFatigue => &self.high_fatigue_days,
            DayPredicate::HighFocus => &self.high_focus_days,
        }
    }

    fn days_mut(&mut self, predicate: DayPredicate) -> &mut DayKeySet {
        match predicate {
            DayPredicate::LowMood => &mut self.low_mood_days,
            DayPredicate::HighStress => &mut self.high_stress_days,
            DayPredicate::HighFatigue => &mut self.high_fatigue_days,
            DayPredicate::HighFocus => &mut self.high_focus_days,
        }
    }
}

/// Current and previous week summaries for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekPair {
    pub current: WeekSummary,
    pub previous: WeekSummary,
}

impl WeekPair {
    /// Split check-ins by window. Input order doesn't matter; records older
    /// than the previous week are ignored.
    pub fn partition(
        check_ins: &[CheckInRecord],
        window: &TimeWindow,
        thresholds: &AggregationThresholds,
    ) -> Self {
        Self {
            current: WeekSummary::summarize(
                check_ins.iter().filter(|r| window.in_current_week(r.date)),
                thresholds,
            ),
            previous: WeekSummary::summarize(
                check_ins.iter().filter(|r| window.in_previous_week(r.date)),
                thresholds,
            ),
        }
    }
}

/// Current-week chat keyword counts. Unknown keywords and non-positive
/// counts are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatTotals {
    counts: HashMap<SignalType, u64>,
}

impl ChatTotals {
    pub fn from_tallies(tallies: &[ChatSignalTally], window: &TimeWindow) -> Self {
        let mut counts = HashMap::new();
        for tally in tallies {
            if tally.count <= 0 || !window.in_current_week(tally.date) {
                continue;
            }
            let Some(signal_type) = SignalType::from_keyword(&tally.keyword) else {
                continue;
            };
            let total = counts.entry(signal_type).or_insert(0u64);
            *total = total.saturating_add(tally.count as u64);
        }
        Self { counts }
    }

    pub fn count(&self, signal_type: SignalType) -> u64 {
        self.counts.get(&signal_type).copied().unwrap_or(0)
    }
}

/// Every completed quest, whatever its date. The quest feed is already capped
/// to the most recent quests upstream.
pub fn completed_quests(quests: &[QuestRecord]) -> Vec<&QuestRecord> {
    quests.iter().filter(|quest| quest.completed).collect()
}

/// The most recently dated incomplete quest, if any.
pub fn latest_active_quest(quests: &[QuestRecord]) -> Option<&QuestRecord> {
    quests
        .iter()
        .filter(|quest| !quest.completed)
        .fold(None, |latest: Option<&QuestRecord>, quest| match latest {
            Some(current) if current.date >= quest.date => Some(current),
            _ => Some(quest),
        })
}

/// Arithmetic mean; an empty list averages to 0.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
