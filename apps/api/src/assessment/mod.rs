// Instrument scoring: MBTI, DISC and EPQ.
// Implements: answer-key normalization, per-instrument scoring, grade bucketing.
// Every scorer is a pure function over (answers, questions); no I/O, no shared state.

pub mod answers;
pub mod disc;
pub mod epq;
pub mod grading;
pub mod handlers;
pub mod mbti;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use answers::{AnswerValue, RawAnswerSet};

// ────────────────────────────────────────────────────────────────────────────
// Instrument identity
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstrumentType {
    #[serde(alias = "mbti")]
    Mbti,
    #[serde(alias = "disc")]
    Disc,
    #[serde(alias = "epq")]
    Epq,
    #[serde(alias = "custom")]
    Custom,
}

impl InstrumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mbti => "MBTI",
            Self::Disc => "DISC",
            Self::Epq => "EPQ",
            Self::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentType {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MBTI" => Ok(Self::Mbti),
            "DISC" => Ok(Self::Disc),
            "EPQ" => Ok(Self::Epq),
            "CUSTOM" => Ok(Self::Custom),
            _ => Err(ScoringError::UnsupportedInstrument(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("unsupported instrument type '{0}': only MBTI, DISC and EPQ have built-in scorers")]
    UnsupportedInstrument(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Question metadata (read-only input)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerType {
    #[serde(rename = "yesno", alias = "yes_no")]
    YesNo,
    #[default]
    #[serde(rename = "single_choice")]
    SingleChoice,
    #[serde(rename = "multi_choice", alias = "multiple_choice")]
    MultiChoice,
    #[serde(rename = "scale")]
    Scale,
}

/// Per-question metadata supplied by the questionnaire definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSpec {
    pub id: String,
    /// Instrument-specific dimension code, e.g. `E-I`, `D`, `N`.
    #[serde(default)]
    pub dimension: Option<String>,
    #[serde(default, rename = "type")]
    pub answer_type: AnswerType,
    #[serde(default)]
    pub reverse: bool,
    /// Explicit answer-label → score table, when the questionnaire defines one.
    #[serde(default)]
    pub option_scores: Option<BTreeMap<String, f64>>,
}

impl QuestionSpec {
    pub fn new(id: impl Into<String>, dimension: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dimension: Some(dimension.into()),
            answer_type: AnswerType::SingleChoice,
            reverse: false,
            option_scores: None,
        }
    }

    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    High,
    Medium,
    Low,
}

impl Level {
    /// High ≥ 60, Medium ≥ 40, else Low. Works for both 0–100 percentages and T-scores.
    pub fn from_score(score: f64) -> Self {
        if score >= 60.0 {
            Self::High
        } else if score >= 40.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// One scored axis of an instrument. Never mutated after scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionScore {
    pub dimension_code: String,
    pub label: String,
    /// Affirmative answers (EPQ), dominant-pole answers (MBTI) or summed ratings (DISC).
    pub raw_count: u32,
    /// Questions that contributed an answer to this dimension.
    pub answered: u32,
    /// 0 – 100. For EPQ this is the T-score.
    pub normalized_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t_score: Option<f64>,
    /// MBTI only: first-pole share mapped onto [-100, 100].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_score: Option<f64>,
    /// MBTI only: dominant pole letter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tendency: Option<String>,
    pub level: Level,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentResult {
    pub instrument_type: InstrumentType,
    pub dimension_scores: Vec<DimensionScore>,
    /// `ENTJ`, `D`, an EPQ archetype, or a custom grade.
    pub headline_type: String,
    #[serde(default)]
    pub description: String,
    pub total_score: f64,
    pub grade: String,
}

impl InstrumentResult {
    pub fn dimension(&self, code: &str) -> Option<&DimensionScore> {
        if self.instrument_type == InstrumentType::Mbti {
            let (dichotomy, _) = mbti::Dichotomy::parse(code)?;
            return self
                .dimension_scores
                .iter()
                .find(|d| mbti::Dichotomy::parse(&d.dimension_code).map(|(x, _)| x) == Some(dichotomy));
        }
        self.dimension_scores
            .iter()
            .find(|d| d.dimension_code.eq_ignore_ascii_case(code.trim()))
    }

    /// 0 – 100 value of a dimension as seen from the orientation of `code`.
    ///
    /// MBTI codes are directional: `T-F` reads the T share, `F-T` the F share.
    /// Every other instrument returns the stored normalized score.
    pub fn dimension_value(&self, code: &str) -> Option<f64> {
        let dim = self.dimension(code)?;
        if self.instrument_type != InstrumentType::Mbti {
            return Some(dim.normalized_score);
        }
        let (dichotomy, reversed) = mbti::Dichotomy::parse(code)?;
        let first_share = match dim.signed_score {
            Some(signed) => (signed + 100.0) / 2.0,
            None => {
                let first = dichotomy.poles().0.to_string();
                if dim.tendency.as_deref() == Some(first.as_str()) {
                    dim.normalized_score
                } else {
                    100.0 - dim.normalized_score
                }
            }
        };
        Some(if reversed { 100.0 - first_share } else { first_share })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scorer capability + dispatch table
// ────────────────────────────────────────────────────────────────────────────

/// Common capability of the built-in instrument scorers.
///
/// `questions = None` selects the legacy fixed index-range layout. That path is a
/// compatibility shim for callers that never stored question metadata; it silently
/// mis-scores any questionnaire whose items were reordered.
pub trait InstrumentScorer: Send + Sync {
    fn instrument(&self) -> InstrumentType;

    fn score(&self, answers: &RawAnswerSet, questions: Option<&[QuestionSpec]>)
        -> InstrumentResult;
}

/// Selects the scorer for an instrument. `CUSTOM` questionnaires have no fixed
/// dimension set and are scored by `custom::score_custom` instead.
pub fn scorer_for(instrument: InstrumentType) -> Result<&'static dyn InstrumentScorer, ScoringError> {
    match instrument {
        InstrumentType::Mbti => Ok(&mbti::MbtiScorer),
        InstrumentType::Disc => Ok(&disc::DiscScorer),
        InstrumentType::Epq => Ok(&epq::EpqScorer),
        InstrumentType::Custom => Err(ScoringError::UnsupportedInstrument(
            instrument.as_str().to_string(),
        )),
    }
}

pub fn score_instrument(
    instrument: InstrumentType,
    answers: &RawAnswerSet,
    questions: Option<&[QuestionSpec]>,
) -> Result<InstrumentResult, ScoringError> {
    let scorer = scorer_for(instrument)?;
    debug!(
        instrument = %scorer.instrument(),
        answers = answers.len(),
        with_questions = questions.is_some(),
        "Scoring instrument"
    );
    Ok(scorer.score(answers, questions))
}

/// String-keyed entry point for callers holding the instrument name from storage.
pub fn score_named(
    instrument: &str,
    answers: &RawAnswerSet,
    questions: Option<&[QuestionSpec]>,
) -> Result<InstrumentResult, ScoringError> {
    score_instrument(instrument.parse()?, answers, questions)
}
