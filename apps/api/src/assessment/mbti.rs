//! MBTI: four dichotomies, each answer favoring one pole.
//!
//! Answer `A` (or the first pole letter) favors E/S/T/J when the question is
//! declared in the canonical orientation; `B` (or the second letter) favors I/N/F/P.
//! A dichotomy with no clear majority, including one with no answers, resolves to
//! its second pole at 50%.

use std::ops::RangeInclusive;

use tracing::debug;

use super::answers::{AnswerValue, RawAnswerSet};
use super::grading::{letter_grade, mean};
use super::{DimensionScore, InstrumentResult, InstrumentScorer, InstrumentType, Level, QuestionSpec};

pub const MBTI_LEGACY_ITEM_COUNT: u32 = 93;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dichotomy {
    EI,
    SN,
    TF,
    JP,
}

impl Dichotomy {
    pub const ALL: [Dichotomy; 4] = [Self::EI, Self::SN, Self::TF, Self::JP];

    pub fn code(self) -> &'static str {
        match self {
            Self::EI => "E-I",
            Self::SN => "S-N",
            Self::TF => "T-F",
            Self::JP => "J-P",
        }
    }

    pub fn poles(self) -> (char, char) {
        match self {
            Self::EI => ('E', 'I'),
            Self::SN => ('S', 'N'),
            Self::TF => ('T', 'F'),
            Self::JP => ('J', 'P'),
        }
    }

    fn pole_labels(self) -> (&'static str, &'static str) {
        match self {
            Self::EI => ("Extraversion", "Introversion"),
            Self::SN => ("Sensing", "Intuition"),
            Self::TF => ("Thinking", "Feeling"),
            Self::JP => ("Judging", "Perceiving"),
        }
    }

    /// Question numbers of the 93-item legacy layout.
    fn legacy_range(self) -> RangeInclusive<u32> {
        match self {
            Self::EI => 1..=23,
            Self::SN => 24..=50,
            Self::TF => 51..=73,
            Self::JP => 74..=93,
        }
    }

    /// Parses `EI`, `E-I`, `e/i` and the reversed orientations (`I-E`).
    /// Returns the dichotomy and whether the code was written second-pole first.
    pub fn parse(code: &str) -> Option<(Dichotomy, bool)> {
        let letters: Vec<char> = code
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let [a, b] = letters.as_slice() else {
            return None;
        };
        Self::ALL.into_iter().find_map(|d| {
            let (first, second) = d.poles();
            if (*a, *b) == (first, second) {
                Some((d, false))
            } else if (*a, *b) == (second, first) {
                Some((d, true))
            } else {
                None
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pole {
    First,
    Second,
}

impl Pole {
    fn flip(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// Which pole an answer favors. `A`/`B` are relative to the question's declared
/// orientation; pole letters are absolute.
fn favored_pole(dichotomy: Dichotomy, declared_reversed: bool, answer: &AnswerValue) -> Option<Pole> {
    let label = answer.as_label()?.to_ascii_uppercase();
    let (first, second) = dichotomy.poles();
    let relative = |pole: Pole| if declared_reversed { pole.flip() } else { pole };
    match label.as_str() {
        "A" => Some(relative(Pole::First)),
        "B" => Some(relative(Pole::Second)),
        other if other == first.to_string() => Some(Pole::First),
        other if other == second.to_string() => Some(Pole::Second),
        _ => None,
    }
}

const TYPE_DESCRIPTIONS: &[(&str, &str)] = &[
    ("INTJ", "Architect: imaginative and strategic thinker"),
    ("INTP", "Logician: innovative inventor"),
    ("ENTJ", "Commander: bold, imaginative, strong-willed leader"),
    ("ENTP", "Debater: smart and curious thinker"),
    ("INFJ", "Advocate: quiet, mystical and inspiring"),
    ("INFP", "Mediator: poetic, kind and altruistic"),
    ("ENFJ", "Protagonist: charismatic and inspiring leader"),
    ("ENFP", "Campaigner: enthusiastic, creative and sociable free spirit"),
    ("ISTJ", "Logistician: practical and fact-minded"),
    ("ISFJ", "Defender: dedicated and warm protector"),
    ("ESTJ", "Executive: excellent administrator"),
    ("ESFJ", "Consul: caring, social and popular"),
    ("ISTP", "Virtuoso: bold and practical experimenter"),
    ("ISFP", "Adventurer: flexible and charming artist"),
    ("ESTP", "Entrepreneur: smart, energetic and perceptive"),
    ("ESFP", "Entertainer: spontaneous, energetic and enthusiastic"),
];

pub fn type_description(mbti_type: &str) -> String {
    TYPE_DESCRIPTIONS
        .iter()
        .find(|(code, _)| *code == mbti_type)
        .map(|(_, desc)| desc.to_string())
        .unwrap_or_else(|| format!("{mbti_type} personality type"))
}

pub struct MbtiScorer;

impl InstrumentScorer for MbtiScorer {
    fn instrument(&self) -> InstrumentType {
        InstrumentType::Mbti
    }

    fn score(&self, answers: &RawAnswerSet, questions: Option<&[QuestionSpec]>) -> InstrumentResult {
        score_mbti(answers, questions)
    }
}

fn score_mbti(answers: &RawAnswerSet, questions: Option<&[QuestionSpec]>) -> InstrumentResult {
    // (first-pole count, second-pole count) per dichotomy, in Dichotomy::ALL order
    let mut counts = [(0u32, 0u32); 4];
    let mut tally = |dichotomy: Dichotomy, pole: Pole| {
        let idx = Dichotomy::ALL.iter().position(|d| *d == dichotomy).unwrap_or(0);
        match pole {
            Pole::First => counts[idx].0 += 1,
            Pole::Second => counts[idx].1 += 1,
        }
    };

    match questions {
        Some(questions) => {
            for q in questions {
                let Some((dichotomy, declared_reversed)) =
                    q.dimension.as_deref().and_then(Dichotomy::parse)
                else {
                    continue;
                };
                let Some(pole) = answers
                    .get(&q.id)
                    .and_then(|a| favored_pole(dichotomy, declared_reversed, a))
                else {
                    continue;
                };
                tally(dichotomy, if q.reverse { pole.flip() } else { pole });
            }
        }
        None => {
            debug!("MBTI scored with legacy {MBTI_LEGACY_ITEM_COUNT}-item index ranges");
            for dichotomy in Dichotomy::ALL {
                for number in dichotomy.legacy_range() {
                    if let Some(pole) = answers
                        .get(&number.to_string())
                        .and_then(|a| favored_pole(dichotomy, false, a))
                    {
                        tally(dichotomy, pole);
                    }
                }
            }
        }
    }

    let mut mbti_type = String::with_capacity(4);
    let mut dimension_scores = Vec::with_capacity(4);

    for (dichotomy, (first_count, second_count)) in Dichotomy::ALL.into_iter().zip(counts) {
        let answered = first_count + second_count;
        let first_share = if answered == 0 {
            50.0
        } else {
            f64::from(first_count) / f64::from(answered) * 100.0
        };
        let (first, second) = dichotomy.poles();
        let (first_label, second_label) = dichotomy.pole_labels();
        let (tendency, value, raw_count, label) = if first_share > 50.0 {
            (first, first_share, first_count, first_label)
        } else {
            (second, 100.0 - first_share, second_count, second_label)
        };

        mbti_type.push(tendency);
        dimension_scores.push(DimensionScore {
            dimension_code: dichotomy.code().to_string(),
            label: label.to_string(),
            raw_count,
            answered,
            normalized_score: value,
            t_score: None,
            signed_score: Some(first_share * 2.0 - 100.0),
            tendency: Some(tendency.to_string()),
            level: Level::from_score(value),
        });
    }

    let values: Vec<f64> = dimension_scores.iter().map(|d| d.normalized_score).collect();
    let total_score = mean(&values).unwrap_or(50.0);

    InstrumentResult {
        instrument_type: InstrumentType::Mbti,
        description: type_description(&mbti_type),
        headline_type: mbti_type,
        dimension_scores,
        total_score,
        grade: letter_grade(total_score).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions_for(layout: &[(&str, u32)]) -> Vec<QuestionSpec> {
        let mut id = 0;
        let mut questions = Vec::new();
        for (code, n) in layout {
            for _ in 0..*n {
                id += 1;
                questions.push(QuestionSpec::new(id.to_string(), *code));
            }
        }
        questions
    }

    #[test]
    fn test_all_first_poles_scores_entj_100() {
        // E/I and T/F and J/P answered "A"; S/N answered "B" so N dominates.
        let questions = questions_for(&[("EI", 5), ("SN", 5), ("TF", 5), ("JP", 5)]);
        let answers = RawAnswerSet::from_pairs(questions.iter().map(|q| {
            let answer = if q.dimension.as_deref() == Some("SN") { "B" } else { "A" };
            (q.id.clone(), answer)
        }));

        let result = score_mbti(&answers, Some(questions.as_slice()));
        assert_eq!(result.headline_type, "ENTJ");
        assert_eq!(result.total_score, 100.0);
        assert_eq!(result.grade, "A");
        assert!(result.description.starts_with("Commander"));
    }

    #[test]
    fn test_pole_letters_accepted_as_answers() {
        let questions = questions_for(&[("E-I", 2), ("S-N", 2), ("T-F", 2), ("J-P", 2)]);
        let letters = ["I", "I", "S", "S", "F", "F", "P", "P"];
        let answers = RawAnswerSet::from_pairs(questions.iter().zip(letters).map(|(q, l)| (q.id.clone(), l)));

        let result = score_mbti(&answers, Some(questions.as_slice()));
        assert_eq!(result.headline_type, "ISFP");
    }

    #[test]
    fn test_tie_resolves_to_second_pole() {
        let questions = questions_for(&[("EI", 2)]);
        let answers = RawAnswerSet::from_pairs([("1", "A"), ("2", "B")]);

        let result = score_mbti(&answers, Some(questions.as_slice()));
        let ei = &result.dimension_scores[0];
        assert_eq!(ei.tendency.as_deref(), Some("I"));
        assert_eq!(ei.normalized_score, 50.0);
        assert_eq!(ei.signed_score, Some(0.0));
    }

    #[test]
    fn test_no_answers_degrades_to_neutral() {
        let result = score_mbti(&RawAnswerSet::default(), Some(&[][..]));
        assert_eq!(result.headline_type, "INFP");
        assert!(result.dimension_scores.iter().all(|d| d.normalized_score == 50.0));
        assert_eq!(result.total_score, 50.0);
        assert_eq!(result.grade, "D");
    }

    #[test]
    fn test_reverse_flag_flips_pole() {
        let questions = vec![
            QuestionSpec::new("1", "EI").reversed(),
            QuestionSpec::new("2", "EI").reversed(),
        ];
        let answers = RawAnswerSet::from_pairs([("1", "A"), ("2", "A")]);

        let result = score_mbti(&answers, Some(questions.as_slice()));
        assert!(result.headline_type.starts_with('I'));
        assert_eq!(result.dimension_scores[0].normalized_score, 100.0);
    }

    #[test]
    fn test_declared_reverse_orientation_reads_a_as_first_listed_pole() {
        let questions = vec![QuestionSpec::new("1", "I-E"), QuestionSpec::new("2", "I-E")];
        let answers = RawAnswerSet::from_pairs([("1", "A"), ("2", "a")]);

        let result = score_mbti(&answers, Some(questions.as_slice()));
        assert!(result.headline_type.starts_with('I'));
    }

    #[test]
    fn test_legacy_index_ranges() {
        // 1–23 E-I answered A, 24–50 S-N answered B, rest unanswered
        let mut pairs: Vec<(String, &str)> = (1..=23).map(|i| (format!("mbti_{i}"), "A")).collect();
        pairs.extend((24..=50).map(|i| (i.to_string(), "B")));
        let answers = RawAnswerSet::from_pairs(pairs);

        let result = score_mbti(&answers, None);
        assert_eq!(&result.headline_type[..2], "EN");
        assert_eq!(result.dimension_scores[0].answered, 23);
        assert_eq!(result.dimension_scores[1].answered, 27);
        assert_eq!(result.dimension_scores[2].answered, 0);
    }

    #[test]
    fn test_unrecognized_answers_ignored() {
        let questions = questions_for(&[("EI", 3)]);
        let answers = RawAnswerSet::from_pairs([("1", "A"), ("2", "maybe"), ("3", "C")]);

        let result = score_mbti(&answers, Some(questions.as_slice()));
        assert_eq!(result.dimension_scores[0].answered, 1);
        assert_eq!(result.dimension_scores[0].normalized_score, 100.0);
    }

    #[test]
    fn test_dichotomy_parse() {
        assert_eq!(Dichotomy::parse("E-I"), Some((Dichotomy::EI, false)));
        assert_eq!(Dichotomy::parse("ns"), Some((Dichotomy::SN, true)));
        assert_eq!(Dichotomy::parse("P/J"), Some((Dichotomy::JP, true)));
        assert_eq!(Dichotomy::parse("EN"), None);
        assert_eq!(Dichotomy::parse("D"), None);
    }

    #[test]
    fn test_scores_bounded() {
        let questions = questions_for(&[("EI", 3), ("SN", 3), ("TF", 3), ("JP", 3)]);
        let answers = RawAnswerSet::from_pairs(questions.iter().map(|q| (q.id.clone(), "B")));
        let result = score_mbti(&answers, Some(questions.as_slice()));
        for d in &result.dimension_scores {
            assert!((0.0..=100.0).contains(&d.normalized_score));
            assert!((-100.0..=100.0).contains(&d.signed_score.unwrap()));
        }
    }
}
