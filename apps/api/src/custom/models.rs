use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::assessment::AnswerValue;
use crate::custom::CustomConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomQuestionType {
    SingleChoice,
    MultipleChoice,
    YesNo,
    Scale,
    Nps,
    ShortText,
    LongText,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    /// Any answer earns the question's full `max_score`.
    ByQuestion,
    /// The selected option's configured score is earned.
    ByOption,
}

impl FromStr for ScoringMethod {
    type Err = CustomConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "by_question" => Ok(Self::ByQuestion),
            "by_option" => Ok(Self::ByOption),
            other => Err(CustomConfigError::UnknownMethod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionScoring {
    #[serde(default)]
    pub max_score: f64,
    #[serde(default)]
    pub option_scores: BTreeMap<String, f64>,
}

pub const DEFAULT_SCALE_MAX: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomQuestion {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub question_type: CustomQuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub scale_max: Option<f64>,
    #[serde(default)]
    pub scoring: QuestionScoring,
}

impl CustomQuestion {
    pub fn scale_max(&self) -> f64 {
        self.scale_max.unwrap_or(DEFAULT_SCALE_MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    pub name: String,
    #[serde(default)]
    pub min_score: Option<f64>,
    #[serde(default)]
    pub max_score: Option<f64>,
}

/// Questionnaire-level scoring settings as stored by the questionnaire designer.
///
/// `method` stays a raw string so an unrecognized value reaches validation
/// instead of failing deserialization with a less useful message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub total_score: Option<f64>,
    #[serde(default)]
    pub grades: Vec<GradeBand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomQuestionnaire {
    #[serde(default)]
    pub scoring_config: ScoringConfig,
    #[serde(default)]
    pub questions: Vec<CustomQuestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomAnswer {
    pub question_id: String,
    #[serde(default = "null_answer")]
    pub answer: AnswerValue,
}

fn null_answer() -> AnswerValue {
    AnswerValue::Null
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub earned_score: f64,
    pub max_score: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerBreakdown {
    pub question_id: String,
    pub question_title: String,
    pub question_type: CustomQuestionType,
    pub answer: AnswerValue,
    /// `None` for non-scored questionnaires and for questions worth no points.
    pub scoring: Option<QuestionScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomScoreResult {
    pub total_score: Option<f64>,
    pub max_score: Option<f64>,
    pub percentage: Option<f64>,
    pub grade: Option<String>,
    pub breakdown: Vec<AnswerBreakdown>,
}

impl CustomScoreResult {
    pub fn is_scored(&self) -> bool {
        self.total_score.is_some()
    }
}
