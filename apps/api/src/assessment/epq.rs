//! EPQ: Eysenck Personality Questionnaire, scales E, N, P, L.
//!
//! Each answered item is affirmative or not (XOR the item's reverse flag).
//! Per scale: `t = (raw − n/2) / (n/4) × 10 + 50`, clamped to [20, 80];
//! a scale with no answered items sits at T = 50.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::answers::{RawAnswerSet, AFFIRMATIVE_TOKENS};
use super::grading::{letter_grade, mean};
use super::{DimensionScore, InstrumentResult, InstrumentScorer, InstrumentType, Level, QuestionSpec};

pub const T_SCORE_MIN: f64 = 20.0;
pub const T_SCORE_MAX: f64 = 80.0;
pub const T_SCORE_NEUTRAL: f64 = 50.0;

/// Answer keys above this id mean the 88-item form was used.
const SHORT_FORM_ITEMS: u32 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpqScale {
    E,
    N,
    P,
    L,
}

impl EpqScale {
    pub const ALL: [EpqScale; 4] = [Self::E, Self::N, Self::P, Self::L];

    pub fn code(self) -> &'static str {
        match self {
            Self::E => "E",
            Self::N => "N",
            Self::P => "P",
            Self::L => "L",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::E => "Extraversion",
            Self::N => "Neuroticism",
            Self::P => "Psychoticism",
            Self::L => "Lie",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.code().eq_ignore_ascii_case(code.trim()))
    }

    fn short_form_range(self) -> RangeInclusive<u32> {
        match self {
            Self::E => 1..=12,
            Self::N => 13..=24,
            Self::P => 25..=36,
            Self::L => 37..=48,
        }
    }

    fn full_form_range(self) -> RangeInclusive<u32> {
        match self {
            Self::E => 1..=21,
            Self::N => 22..=45,
            Self::P => 46..=68,
            Self::L => 69..=88,
        }
    }
}

/// 2×2 classification on the E and N scales, split at the population mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpqArchetype {
    StableExtravert,
    UnstableExtravert,
    StableIntrovert,
    UnstableIntrovert,
}

impl EpqArchetype {
    pub fn classify(e_t_score: f64, n_t_score: f64) -> Self {
        let extravert = e_t_score > T_SCORE_NEUTRAL;
        let unstable = n_t_score > T_SCORE_NEUTRAL;
        match (extravert, unstable) {
            (true, false) => Self::StableExtravert,
            (true, true) => Self::UnstableExtravert,
            (false, false) => Self::StableIntrovert,
            (false, true) => Self::UnstableIntrovert,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StableExtravert => "stable_extravert",
            Self::UnstableExtravert => "unstable_extravert",
            Self::StableIntrovert => "stable_introvert",
            Self::UnstableIntrovert => "unstable_introvert",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::StableExtravert => "Outgoing and even-tempered",
            Self::UnstableExtravert => "Outgoing with strong emotional reactivity",
            Self::StableIntrovert => "Reserved and even-tempered",
            Self::UnstableIntrovert => "Reserved with strong emotional reactivity",
        }
    }
}

/// T-score for `raw` affirmative answers out of `answered` items.
pub fn t_score(raw: u32, answered: u32) -> f64 {
    if answered == 0 {
        return T_SCORE_NEUTRAL;
    }
    let n = f64::from(answered);
    let t = (f64::from(raw) - n / 2.0) / (n / 4.0) * 10.0 + 50.0;
    t.clamp(T_SCORE_MIN, T_SCORE_MAX)
}

fn is_affirmative(label: &str) -> bool {
    AFFIRMATIVE_TOKENS.contains(&label.to_lowercase().as_str())
}

pub struct EpqScorer;

impl InstrumentScorer for EpqScorer {
    fn instrument(&self) -> InstrumentType {
        InstrumentType::Epq
    }

    fn score(&self, answers: &RawAnswerSet, questions: Option<&[QuestionSpec]>) -> InstrumentResult {
        score_epq(answers, questions)
    }
}

fn score_epq(answers: &RawAnswerSet, questions: Option<&[QuestionSpec]>) -> InstrumentResult {
    // (affirmative, answered) per scale, in EpqScale::ALL order
    let mut counts = [(0u32, 0u32); 4];
    let mut record = |scale: EpqScale, label: &str, reverse: bool| {
        let idx = scale as usize;
        counts[idx].1 += 1;
        if is_affirmative(label) != reverse {
            counts[idx].0 += 1;
        }
    };

    match questions {
        Some(questions) => {
            for q in questions {
                let Some(scale) = q.dimension.as_deref().and_then(EpqScale::from_code) else {
                    continue;
                };
                if let Some(label) = answers.get(&q.id).and_then(|a| a.as_label()) {
                    record(scale, &label, q.reverse);
                }
            }
        }
        None => {
            let full_form = answers.max_numeric_id().is_some_and(|max| max > SHORT_FORM_ITEMS);
            debug!(full_form, "EPQ scored with legacy index ranges");
            for scale in EpqScale::ALL {
                let range = if full_form {
                    scale.full_form_range()
                } else {
                    scale.short_form_range()
                };
                for number in range {
                    if let Some(label) = answers.get(&number.to_string()).and_then(|a| a.as_label()) {
                        record(scale, &label, false);
                    }
                }
            }
        }
    }

    let dimension_scores: Vec<DimensionScore> = EpqScale::ALL
        .into_iter()
        .zip(counts)
        .map(|(scale, (raw, answered))| {
            let t = t_score(raw, answered);
            DimensionScore {
                dimension_code: scale.code().to_string(),
                label: scale.label().to_string(),
                raw_count: raw,
                answered,
                normalized_score: t,
                t_score: Some(t),
                signed_score: None,
                tendency: None,
                level: Level::from_score(t),
            }
        })
        .collect();

    let archetype = EpqArchetype::classify(
        dimension_scores[EpqScale::E as usize].normalized_score,
        dimension_scores[EpqScale::N as usize].normalized_score,
    );
    let t_scores: Vec<f64> = dimension_scores.iter().map(|d| d.normalized_score).collect();
    let total_score = mean(&t_scores).unwrap_or(T_SCORE_NEUTRAL);

    InstrumentResult {
        instrument_type: InstrumentType::Epq,
        dimension_scores,
        headline_type: archetype.as_str().to_string(),
        description: archetype.description().to_string(),
        total_score,
        grade: letter_grade(total_score).to_string(),
    }
}
