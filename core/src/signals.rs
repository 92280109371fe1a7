//! Chat signal vocabulary and normalization.
//!
//! The upstream extractor is an open-vocabulary model, so anything it emits is
//! mapped onto a closed set of signal types through an alias table. Elements
//! that don't resolve are dropped without error.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::numeric::round_half_up;
use crate::records::ChatSignalTally;

pub const DEFAULT_INTENSITY: f64 = 3.0;
pub const DEFAULT_CONFIDENCE: f64 = 0.7;
pub const INTENSITY_MIN: f64 = 1.0;
pub const INTENSITY_MAX: f64 = 5.0;

const SIGNAL_TYPE_FIELDS: &[&str] = &["signalType", "signal_type", "type"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Stress,
    Fatigue,
    Focus,
    Motivation,
    Breathing,
    Reflection,
    Exercise,
    Confidence,
    Procrastination,
    Anxiety,
    Productivity,
    Mindfulness,
}

impl SignalType {
    pub const ALL: [SignalType; 12] = [
        Self::Stress,
        Self::Fatigue,
        Self::Focus,
        Self::Motivation,
        Self::Breathing,
        Self::Reflection,
        Self::Exercise,
        Self::Confidence,
        Self::Procrastination,
        Self::Anxiety,
        Self::Productivity,
        Self::Mindfulness,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stress => "stress",
            Self::Fatigue => "fatigue",
            Self::Focus => "focus",
            Self::Motivation => "motivation",
            Self::Breathing => "breathing",
            Self::Reflection => "reflection",
            Self::Exercise => "exercise",
            Self::Confidence => "confidence",
            Self::Procrastination => "procrastination",
            Self::Anxiety => "anxiety",
            Self::Productivity => "productivity",
            Self::Mindfulness => "mindfulness",
        }
    }

    /// Resolve a raw keyword: canonical names first, then the alias table.
    pub fn from_keyword(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }
        Self::ALL
            .iter()
            .copied()
            .find(|signal| signal.as_str() == normalized)
            .or_else(|| SIGNAL_ALIASES.get(normalized.as_str()).copied())
    }
}

static SIGNAL_ALIASES: LazyLock<HashMap<&'static str, SignalType>> = LazyLock::new(|| {
    HashMap::from([
        ("stressed", SignalType::Stress),
        ("stressful", SignalType::Stress),
        ("overwhelmed", SignalType::Stress),
        ("pressure", SignalType::Stress),
        ("tired", SignalType::Fatigue),
        ("exhausted", SignalType::Fatigue),
        ("fatigued", SignalType::Fatigue),
        ("sleepy", SignalType::Fatigue),
        ("concentration", SignalType::Focus),
        ("focused", SignalType::Focus),
        ("attention", SignalType::Focus),
        ("motivated", SignalType::Motivation),
        ("drive", SignalType::Motivation),
        ("breath", SignalType::Breathing),
        ("breathe", SignalType::Breathing),
        ("breathwork", SignalType::Breathing),
        ("journal", SignalType::Reflection),
        ("journaling", SignalType::Reflection),
        ("reflect", SignalType::Reflection),
        ("workout", SignalType::Exercise),
        ("training", SignalType::Exercise),
        ("walk", SignalType::Exercise),
        ("confident", SignalType::Confidence),
        ("procrastinating", SignalType::Procrastination),
        ("procrastinate", SignalType::Procrastination),
        ("anxious", SignalType::Anxiety),
        ("worry", SignalType::Anxiety),
        ("productive", SignalType::Productivity),
        ("meditation", SignalType::Mindfulness),
        ("mindful", SignalType::Mindfulness),
    ])
});

/// A single sanitized signal from one chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedSignal {
    pub signal_type: SignalType,
    /// 1-5
    pub intensity: u8,
    /// 0.0-1.0
    pub confidence: f64,
}

impl ExtractedSignal {
    /// True when `self` should replace `other`: strictly higher confidence,
    /// or equal confidence and strictly higher intensity.
    fn dominates(&self, other: &ExtractedSignal) -> bool {
        self.confidence > other.confidence
            || (self.confidence == other.confidence && self.intensity > other.intensity)
    }
}

/// Sanitize a raw extractor payload into at most one signal per type.
///
/// Accepts a bare array or an object wrapping one under `signals` or `data`.
/// Any other shape yields an empty list.
pub fn normalize(raw: &Value) -> Vec<ExtractedSignal> {
    let Some(items) = signal_items(raw) else {
        return Vec::new();
    };

    let mut kept: Vec<ExtractedSignal> = Vec::new();
    for candidate in items.iter().filter_map(parse_signal) {
        match kept
            .iter_mut()
            .find(|existing| existing.signal_type == candidate.signal_type)
        {
            Some(existing) => {
                if candidate.dominates(existing) {
                    *existing = candidate;
                }
            }
            None => kept.push(candidate),
        }
    }
    kept
}

/// One tally per normalized signal, dated at the chat turn.
pub fn tally_signals(signals: &[ExtractedSignal], date: DateTime<Utc>) -> Vec<ChatSignalTally> {
    signals
        .iter()
        .map(|signal| ChatSignalTally {
            keyword: signal.signal_type.as_str().to_string(),
            count: 1,
            date,
        })
        .collect()
}

fn signal_items(raw: &Value) -> Option<&Vec<Value>> {
    if let Some(items) = raw.as_array() {
        return Some(items);
    }
    let wrapper = raw.as_object()?;
    wrapper
        .get("signals")
        .and_then(Value::as_array)
        .or_else(|| wrapper.get("data").and_then(Value::as_array))
}

fn parse_signal(item: &Value) -> Option<ExtractedSignal> {
    let raw_type = SIGNAL_TYPE_FIELDS
        .iter()
        .find_map(|field| item.get(*field).and_then(Value::as_str))?;
    let signal_type = SignalType::from_keyword(raw_type)?;

    let intensity = numeric_field(item, "intensity")
        .unwrap_or(DEFAULT_INTENSITY)
        .clamp(INTENSITY_MIN, INTENSITY_MAX);
    let confidence = numeric_field(item, "confidence")
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    Some(ExtractedSignal {
        signal_type,
        intensity: round_half_up(intensity) as u8,
        confidence,
    })
}

/// Numbers and numeric strings both count; anything non-finite does not.
fn numeric_field(item: &Value, field: &str) -> Option<f64> {
    let value = match item.get(field)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}
