//! DISC: behavioral style, four dimensions.
//!
//! Two raw shapes are accepted and may be mixed in one answer set:
//! - Likert ratings 1–5 against a per-dimension question grid (default 7 per
//!   dimension, so a dimension tops out at 35);
//! - forced-choice letters, `A/B/C/D` → `D/I/S/C`.
//!
//! Percentages are raw totals over the theoretical maximum, clamped to [0, 100].

use std::collections::BTreeMap;

use tracing::debug;

use super::answers::{canonical_key, AnswerValue, RawAnswerSet};
use super::grading::letter_grade;
use super::{DimensionScore, InstrumentResult, InstrumentScorer, InstrumentType, Level, QuestionSpec};

pub const QUESTIONS_PER_DIMENSION: u32 = 7;
pub const LIKERT_MIN: u32 = 1;
pub const LIKERT_MAX: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiscStyle {
    D,
    I,
    S,
    C,
}

impl DiscStyle {
    pub const ALL: [DiscStyle; 4] = [Self::D, Self::I, Self::S, Self::C];

    pub fn code(self) -> &'static str {
        match self {
            Self::D => "D",
            Self::I => "I",
            Self::S => "S",
            Self::C => "C",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::D => "Dominance",
            Self::I => "Influence",
            Self::S => "Steadiness",
            Self::C => "Conscientiousness",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::D => "Dominance: direct, decisive, results-oriented",
            Self::I => "Influence: outgoing, enthusiastic, sociable",
            Self::S => "Steadiness: patient, reliable, supportive",
            Self::C => "Conscientiousness: precise, analytical, detail-focused",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.code().eq_ignore_ascii_case(code.trim()))
    }

    /// Forced-choice option letter → style.
    fn from_choice(letter: &str) -> Option<Self> {
        match letter.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::D),
            "B" => Some(Self::I),
            "C" => Some(Self::S),
            "D" => Some(Self::C),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Question number → style for the fixed 28-item grid: 1–7 D, 8–14 I, 15–21 S, 22–28 C.
fn legacy_grid() -> BTreeMap<String, DiscStyle> {
    let mut grid = BTreeMap::new();
    for (offset, style) in DiscStyle::ALL.into_iter().enumerate() {
        let start = offset as u32 * QUESTIONS_PER_DIMENSION + 1;
        for number in start..start + QUESTIONS_PER_DIMENSION {
            grid.insert(number.to_string(), style);
        }
    }
    grid
}

/// Likert rating for an answer: the question's option table first, then a plain
/// integer in 1..=5.
fn likert_rating(answer: &AnswerValue, option_scores: Option<&BTreeMap<String, f64>>) -> Option<u32> {
    let mapped = option_scores.and_then(|table| {
        let label = answer.as_label()?;
        table
            .iter()
            .find(|(option, _)| option.eq_ignore_ascii_case(&label))
            .map(|(_, score)| *score)
    });
    let value = mapped.or_else(|| answer.as_number())?;
    if value.fract() != 0.0 {
        return None;
    }
    let value = value as i64;
    (i64::from(LIKERT_MIN)..=i64::from(LIKERT_MAX))
        .contains(&value)
        .then_some(value as u32)
}

pub struct DiscScorer;

impl InstrumentScorer for DiscScorer {
    fn instrument(&self) -> InstrumentType {
        InstrumentType::Disc
    }

    fn score(&self, answers: &RawAnswerSet, questions: Option<&[QuestionSpec]>) -> InstrumentResult {
        score_disc(answers, questions)
    }
}

fn score_disc(answers: &RawAnswerSet, questions: Option<&[QuestionSpec]>) -> InstrumentResult {
    let mut option_tables: BTreeMap<String, &BTreeMap<String, f64>> = BTreeMap::new();
    let dimension_of: BTreeMap<String, DiscStyle> = match questions {
        Some(questions) => {
            let mut dimension_of = BTreeMap::new();
            for q in questions {
                let Some(style) = q.dimension.as_deref().and_then(DiscStyle::from_code) else {
                    continue;
                };
                let key = canonical_key(&q.id);
                if let Some(table) = q.option_scores.as_ref() {
                    option_tables.insert(key.clone(), table);
                }
                dimension_of.insert(key, style);
            }
            dimension_of
        }
        None => {
            debug!("DISC scored with the fixed 28-item grid");
            legacy_grid()
        }
    };

    let mut questions_per_style = [0u32; 4];
    for style in dimension_of.values() {
        questions_per_style[style.index()] += 1;
    }

    let mut totals = [0u32; 4];
    let mut answered = [0u32; 4];
    let mut likert_answers = 0u32;
    let mut choice_answers = 0u32;

    for (key, value) in answers.iter() {
        if let Some(style) = dimension_of.get(key) {
            if let Some(rating) = likert_rating(value, option_tables.get(key).copied()) {
                totals[style.index()] += rating;
                answered[style.index()] += 1;
                likert_answers += 1;
                continue;
            }
        }
        if let Some(style) = value.as_label().as_deref().and_then(DiscStyle::from_choice) {
            totals[style.index()] += 1;
            answered[style.index()] += 1;
            choice_answers += 1;
        }
    }

    let nothing_answered = likert_answers == 0 && choice_answers == 0;
    let theoretical_max = |style: DiscStyle| -> u32 {
        if likert_answers > 0 {
            let per_style = match questions_per_style[style.index()] {
                0 => QUESTIONS_PER_DIMENSION,
                n => n,
            };
            LIKERT_MAX * per_style + choice_answers
        } else {
            choice_answers
        }
    };

    let dimension_scores: Vec<DimensionScore> = DiscStyle::ALL
        .into_iter()
        .map(|style| {
            let raw = totals[style.index()];
            let max = theoretical_max(style);
            let pct = if nothing_answered || max == 0 {
                50.0
            } else {
                (f64::from(raw) / f64::from(max) * 100.0).clamp(0.0, 100.0)
            };
            DimensionScore {
                dimension_code: style.code().to_string(),
                label: style.label().to_string(),
                raw_count: raw,
                answered: answered[style.index()],
                normalized_score: pct,
                t_score: None,
                signed_score: None,
                tendency: None,
                level: Level::from_score(pct),
            }
        })
        .collect();

    // Highest raw total wins; ties keep the earlier style in D, I, S, C order.
    let mut dominant = DiscStyle::D;
    for style in DiscStyle::ALL {
        if totals[style.index()] > totals[dominant.index()] {
            dominant = style;
        }
    }
    let total_score = dimension_scores[dominant.index()].normalized_score;

    InstrumentResult {
        instrument_type: InstrumentType::Disc,
        dimension_scores,
        headline_type: dominant.code().to_string(),
        description: dominant.description().to_string(),
        total_score,
        grade: letter_grade(total_score).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_likert_three_scores_sixty_everywhere() {
        let answers = RawAnswerSet::from_pairs((1..=28).map(|i| (i.to_string(), 3)));

        let result = score_disc(&answers, None);
        for d in &result.dimension_scores {
            assert_eq!(d.raw_count, 21);
            assert!((d.normalized_score - 60.0).abs() < 1e-9, "got {}", d.normalized_score);
        }
        assert_eq!(result.headline_type, "D");
        assert!((result.total_score - 60.0).abs() < 1e-9);
        assert_eq!(result.grade, "C");
    }

    #[test]
    fn test_likert_with_question_specs_and_string_ratings() {
        let questions: Vec<QuestionSpec> = (1..=8)
            .map(|i| QuestionSpec::new(format!("disc_{i}"), if i <= 4 { "S" } else { "C" }))
            .collect();
        let answers = RawAnswerSet::from_pairs((1..=8).map(|i| (i.to_string(), if i <= 4 { "5" } else { "2" })));

        let result = score_disc(&answers, Some(questions.as_slice()));
        assert_eq!(result.headline_type, "S");
        // S: 20 / (5 × 4) = 100%
        assert_eq!(result.dimension_scores[2].normalized_score, 100.0);
        // C: 8 / 20 = 40%
        assert_eq!(result.dimension_scores[3].normalized_score, 40.0);
        assert_eq!(result.total_score, 100.0);
    }

    #[test]
    fn test_forced_choice_letters() {
        let answers = RawAnswerSet::from_pairs([("1", "A"), ("2", "A"), ("3", "b"), ("4", "A")]);

        let result = score_disc(&answers, None);
        assert_eq!(result.headline_type, "D");
        assert_eq!(result.dimension_scores[0].raw_count, 3);
        assert_eq!(result.dimension_scores[0].normalized_score, 75.0);
        assert_eq!(result.dimension_scores[1].normalized_score, 25.0);
        assert_eq!(result.dimension_scores[2].normalized_score, 0.0);
    }

    #[test]
    fn test_out_of_range_ratings_ignored() {
        let answers = RawAnswerSet::from_pairs([("1", 9), ("2", 0), ("8", 4)]);

        let result = score_disc(&answers, None);
        assert_eq!(result.dimension_scores[0].raw_count, 0);
        assert_eq!(result.dimension_scores[1].raw_count, 4);
        assert_eq!(result.headline_type, "I");
    }

    #[test]
    fn test_option_score_table_maps_labels() {
        let mut table = BTreeMap::new();
        table.insert("agree".to_string(), 4.0);
        table.insert("disagree".to_string(), 2.0);
        let mut q = QuestionSpec::new("1", "D");
        q.option_scores = Some(table);

        let answers = RawAnswerSet::from_pairs([("1", "Agree")]);
        let result = score_disc(&answers, Some(std::slice::from_ref(&q)));
        assert_eq!(result.dimension_scores[0].raw_count, 4);
        assert_eq!(result.dimension_scores[0].normalized_score, 80.0);
    }

    #[test]
    fn test_empty_answers_neutral() {
        let result = score_disc(&RawAnswerSet::default(), None);
        assert!(result.dimension_scores.iter().all(|d| d.normalized_score == 50.0));
        assert_eq!(result.headline_type, "D");
        assert_eq!(result.total_score, 50.0);
    }

    #[test]
    fn test_empty_question_list_is_neutral() {
        let answers = RawAnswerSet::from_pairs((1..=7).map(|i| (i.to_string(), 5)));

        let result = score_disc(&answers, Some(&[][..]));
        assert!(result.dimension_scores.iter().all(|d| d.normalized_score == 50.0));
        assert!(result.dimension_scores.iter().all(|d| d.raw_count == 0));

        let untagged: Vec<QuestionSpec> = (1..=7)
            .map(|i| QuestionSpec {
                dimension: None,
                ..QuestionSpec::new(i.to_string(), "D")
            })
            .collect();
        let result = score_disc(&answers, Some(untagged.as_slice()));
        assert!(result.dimension_scores.iter().all(|d| d.normalized_score == 50.0));
        assert_eq!(result.total_score, 50.0);
    }

    #[test]
    fn test_percentages_bounded() {
        let answers = RawAnswerSet::from_pairs((1..=28).map(|i| (i.to_string(), 5)));
        let result = score_disc(&answers, None);
        assert!(result
            .dimension_scores
            .iter()
            .all(|d| (0.0..=100.0).contains(&d.normalized_score)));
    }
}
