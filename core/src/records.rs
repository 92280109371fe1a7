//! Engine input records.
//!
//! These are the shapes the insight engine consumes from storage. Rows are
//! validated once on the way in so the aggregation steps can index ratings
//! and trust ranges without re-checking.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::InsightError;

pub const RATING_COUNT: usize = 5;
pub const RATING_MIN: i32 = 1;
pub const RATING_MAX: i32 = 5;

/// Position of each dimension inside a check-in's ratings vector.
///
/// | index | dimension  | 1 means      | 5 means   |
/// |-------|------------|--------------|-----------|
/// | 0     | energy     | exhausted    | energized |
/// | 1     | focus      | scattered    | sharp     |
/// | 2     | stress     | very stressed| calm      |
/// | 3     | connection | isolated     | connected |
/// | 4     | outlook    | bleak        | hopeful   |
///
/// Stress is inverted: a low stress rating marks a high-stress day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingIndex {
    Energy = 0,
    Focus = 1,
    Stress = 2,
    Connection = 3,
    Outlook = 4,
}

/// One daily check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInRecord {
    /// Calendar-day identifier, unique per user (e.g. "2024-01-15")
    pub day_key: String,
    pub date: DateTime<Utc>,
    /// Ratings in `RatingIndex` order, each 1-5
    pub ratings: [u8; RATING_COUNT],
    /// Overall wellbeing score, 0-100
    pub percentage: u8,
}

impl CheckInRecord {
    /// Build a check-in from untyped storage values, rejecting anything out of range.
    pub fn try_new(
        day_key: impl Into<String>,
        date: DateTime<Utc>,
        ratings: &[i32],
        percentage: i32,
    ) -> Result<Self, InsightError> {
        let day_key = day_key.into();
        if ratings.len() != RATING_COUNT {
            return Err(InsightError::RatingArity {
                day_key,
                found: ratings.len(),
            });
        }

        let mut typed = [0u8; RATING_COUNT];
        for (index, value) in ratings.iter().copied().enumerate() {
            if !(RATING_MIN..=RATING_MAX).contains(&value) {
                return Err(InsightError::RatingOutOfRange {
                    day_key,
                    index,
                    value,
                });
            }
            typed[index] = value as u8;
        }

        if !(0..=100).contains(&percentage) {
            return Err(InsightError::PercentageOutOfRange {
                day_key,
                value: percentage,
            });
        }

        Ok(Self {
            day_key,
            date,
            ratings: typed,
            percentage: percentage as u8,
        })
    }

    pub fn rating(&self, index: RatingIndex) -> u8 {
        self.ratings[index as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum QuestDuration {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl QuestDuration {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl FromStr for QuestDuration {
    type Err = InsightError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(InsightError::UnknownDuration {
                value: value.to_string(),
            }),
        }
    }
}

/// A user-defined goal. `completed` is trusted as recorded upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRecord {
    pub goal: String,
    pub duration: QuestDuration,
    /// Progress percentage, 0-100
    pub progress: u8,
    pub completed: bool,
    pub date: DateTime<Utc>,
}

impl QuestRecord {
    pub fn try_new(
        goal: impl Into<String>,
        duration: &str,
        progress: i32,
        completed: bool,
        date: DateTime<Utc>,
    ) -> Result<Self, InsightError> {
        if !(0..=100).contains(&progress) {
            return Err(InsightError::ProgressOutOfRange { value: progress });
        }
        Ok(Self {
            goal: goal.into(),
            duration: duration.parse()?,
            progress: progress as u8,
            completed,
            date,
        })
    }
}

/// Per-day count of a keyword surfaced by the chat extractor.
///
/// The keyword stays raw here: upstream extraction is noisy, and unknown
/// keywords are dropped during aggregation rather than rejected on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChatSignalTally {
    pub keyword: String,
    pub count: i64,
    pub date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn check_in_maps_rating_positions() {
        let record = CheckInRecord::try_new("2024-01-15", noon(), &[1, 2, 3, 4, 5], 60).unwrap();
        assert_eq!(record.rating(RatingIndex::Energy), 1);
        assert_eq!(record.rating(RatingIndex::Focus), 2);
        assert_eq!(record.rating(RatingIndex::Stress), 3);
        assert_eq!(record.rating(RatingIndex::Connection), 4);
        assert_eq!(record.rating(RatingIndex::Outlook), 5);
    }

    #[test]
    fn check_in_rejects_wrong_arity() {
        let err = CheckInRecord::try_new("2024-01-15", noon(), &[3, 3, 3], 60).unwrap_err();
        assert_eq!(
            err,
            InsightError::RatingArity {
                day_key: "2024-01-15".to_string(),
                found: 3
            }
        );
    }

    #[test]
    fn check_in_rejects_rating_out_of_range() {
        let err = CheckInRecord::try_new("2024-01-15", noon(), &[3, 3, 0, 3, 3], 60).unwrap_err();
        assert!(matches!(
            err,
            InsightError::RatingOutOfRange { index: 2, value: 0, .. }
        ));
    }

    #[test]
    fn check_in_rejects_percentage_out_of_range() {
        let err = CheckInRecord::try_new("2024-01-15", noon(), &[3; 5], 101).unwrap_err();
        assert!(matches!(
            err,
            InsightError::PercentageOutOfRange { value: 101, .. }
        ));
    }

    #[test]
    fn quest_duration_parses_case_insensitively() {
        assert_eq!("Weekly".parse::<QuestDuration>().unwrap(), QuestDuration::Weekly);
        assert!("fortnightly".parse::<QuestDuration>().is_err());
    }

    #[test]
    fn quest_rejects_progress_out_of_range() {
        let err = QuestRecord::try_new("Run", "daily", 140, true, noon()).unwrap_err();
        assert_eq!(err, InsightError::ProgressOutOfRange { value: 140 });
    }
}
