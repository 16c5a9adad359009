use std::collections::HashMap;

use tracing::debug;

use crate::assessment::grading::round1;
use crate::assessment::AnswerValue;
use crate::custom::models::{
    AnswerBreakdown, CustomAnswer, CustomQuestion, CustomQuestionType, CustomQuestionnaire,
    CustomScoreResult, GradeBand, QuestionScore, ScoringMethod,
};
use crate::custom::validation::validate_scoring_config;
use crate::custom::CustomConfigError;

pub const UNGRADED: &str = "N/A";

/// Scores a submission against a custom questionnaire.
///
/// Non-scored questionnaires pass answers through with no totals; the
/// breakdown is still produced for audit. Answers to unknown question ids are
/// dropped.
pub fn score_custom(
    questionnaire: &CustomQuestionnaire,
    answers: &[CustomAnswer],
) -> Result<CustomScoreResult, CustomConfigError> {
    let config = &questionnaire.scoring_config;
    let method = validate_scoring_config(config)?;

    let questions: HashMap<&str, &CustomQuestion> = questionnaire
        .questions
        .iter()
        .map(|q| (q.id.as_str(), q))
        .collect();

    let Some(method) = method else {
        let breakdown = answers
            .iter()
            .filter_map(|a| {
                let q = questions.get(a.question_id.as_str())?;
                Some(breakdown_entry(q, &a.answer, None))
            })
            .collect();
        return Ok(CustomScoreResult {
            total_score: None,
            max_score: None,
            percentage: None,
            grade: None,
            breakdown,
        });
    };

    let mut total_earned = 0.0;
    let mut breakdown = Vec::with_capacity(answers.len());
    for answer in answers {
        let Some(question) = questions.get(answer.question_id.as_str()) else {
            debug!(question_id = %answer.question_id, "Dropping answer for unknown question");
            continue;
        };
        let (earned, max) = question_score(question, &answer.answer, method);
        total_earned += earned;

        let scoring = (max > 0.0).then(|| QuestionScore {
            earned_score: round1(earned),
            max_score: max,
            percentage: round1(earned / max * 100.0),
        });
        breakdown.push(breakdown_entry(question, &answer.answer, scoring));
    }

    // validation guarantees a positive total
    let max_possible = config.total_score.unwrap_or_default();
    let percentage = if max_possible > 0.0 {
        round1(total_earned / max_possible * 100.0)
    } else {
        0.0
    };

    Ok(CustomScoreResult {
        total_score: Some(round1(total_earned)),
        max_score: Some(max_possible),
        percentage: Some(percentage),
        grade: Some(determine_grade(total_earned, &config.grades)),
        breakdown,
    })
}

fn breakdown_entry(
    question: &CustomQuestion,
    answer: &AnswerValue,
    scoring: Option<QuestionScore>,
) -> AnswerBreakdown {
    AnswerBreakdown {
        question_id: question.id.clone(),
        question_title: question.title.clone(),
        question_type: question.question_type,
        answer: answer.clone(),
        scoring,
    }
}

/// `(earned, max)` for one answered question.
pub fn question_score(
    question: &CustomQuestion,
    answer: &AnswerValue,
    method: ScoringMethod,
) -> (f64, f64) {
    let max = question.scoring.max_score;
    let option_score = |label: &str| -> f64 {
        question
            .scoring
            .option_scores
            .iter()
            .find(|(option, _)| option.as_str() == label)
            .map(|(_, score)| *score)
            .unwrap_or(0.0)
    };

    match question.question_type {
        CustomQuestionType::ShortText | CustomQuestionType::LongText | CustomQuestionType::Date => {
            (0.0, 0.0)
        }
        CustomQuestionType::Scale | CustomQuestionType::Nps => {
            let scale_max = question.scale_max();
            match answer.as_number() {
                Some(value) if scale_max > 0.0 => {
                    (value.clamp(0.0, scale_max) / scale_max * max, max)
                }
                _ => (0.0, max),
            }
        }
        CustomQuestionType::YesNo => {
            let yes = answer.as_bool().unwrap_or(false);
            let earned = match method {
                ScoringMethod::ByOption => question
                    .scoring
                    .option_scores
                    .iter()
                    .find(|(option, _)| option.eq_ignore_ascii_case(if yes { "true" } else { "false" }))
                    .map(|(_, score)| *score)
                    .unwrap_or(0.0),
                ScoringMethod::ByQuestion => {
                    if yes {
                        max
                    } else {
                        0.0
                    }
                }
            };
            (earned, max)
        }
        CustomQuestionType::SingleChoice => {
            let selected = answer.as_label();
            let earned = match (method, selected) {
                (_, None) => 0.0,
                (ScoringMethod::ByOption, Some(label)) => option_score(&label),
                (ScoringMethod::ByQuestion, Some(_)) => max,
            };
            (earned, max)
        }
        CustomQuestionType::MultipleChoice => {
            let selected = answer.as_labels();
            let earned = match method {
                ScoringMethod::ByOption => selected.iter().map(|label| option_score(label.as_str())).sum(),
                ScoringMethod::ByQuestion if question.options.is_empty() => 0.0,
                ScoringMethod::ByQuestion => {
                    selected.len() as f64 / question.options.len() as f64 * max
                }
            };
            (earned.min(max), max)
        }
    }
}

/// First band, by descending `min_score`, whose range contains `score`.
pub fn determine_grade(score: f64, bands: &[GradeBand]) -> String {
    let mut sorted: Vec<&GradeBand> = bands.iter().collect();
    sorted.sort_by(|a, b| {
        b.min_score
            .unwrap_or(0.0)
            .total_cmp(&a.min_score.unwrap_or(0.0))
    });

    sorted
        .into_iter()
        .find(|band| {
            let min = band.min_score.unwrap_or(0.0);
            let max = band.max_score.unwrap_or(100.0);
            (min..=max).contains(&score)
        })
        .map(|band| band.name.clone())
        .unwrap_or_else(|| UNGRADED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom::models::{QuestionScoring, ScoringConfig};

    fn question(id: &str, question_type: CustomQuestionType, max_score: f64) -> CustomQuestion {
        CustomQuestion {
            id: id.to_string(),
            title: format!("Question {id}"),
            question_type,
            options: Vec::new(),
            scale_max: None,
            scoring: QuestionScoring {
                max_score,
                option_scores: Default::default(),
            },
        }
    }

    fn band(name: &str, min: f64, max: f64) -> GradeBand {
        GradeBand {
            name: name.to_string(),
            min_score: Some(min),
            max_score: Some(max),
        }
    }

    fn scored(method: &str, total: f64, questions: Vec<CustomQuestion>) -> CustomQuestionnaire {
        CustomQuestionnaire {
            scoring_config: ScoringConfig {
                enabled: true,
                method: Some(method.to_string()),
                total_score: Some(total),
                grades: vec![band("Pass", 60.0, 100.0), band("Fail", 0.0, 59.9)],
            },
            questions,
        }
    }

    fn answer(id: &str, value: impl Into<AnswerValue>) -> CustomAnswer {
        CustomAnswer {
            question_id: id.to_string(),
            answer: value.into(),
        }
    }

    #[test]
    fn test_single_choice_by_question_full_marks() {
        let mut q = question("q1", CustomQuestionType::SingleChoice, 10.0);
        q.options = vec!["red".to_string(), "blue".to_string()];
        let questionnaire = scored("by_question", 10.0, vec![q]);

        let result = score_custom(&questionnaire, &[answer("q1", "blue")]).unwrap();
        assert_eq!(result.total_score, Some(10.0));
        assert_eq!(result.percentage, Some(100.0));
        let scoring = result.breakdown[0].scoring.as_ref().unwrap();
        assert_eq!(scoring.earned_score, 10.0);
        assert_eq!(scoring.percentage, 100.0);
    }

    #[test]
    fn test_single_choice_by_option_uses_table() {
        let mut q = question("q1", CustomQuestionType::SingleChoice, 10.0);
        q.scoring.option_scores.insert("good".to_string(), 7.0);
        q.scoring.option_scores.insert("bad".to_string(), 2.0);

        let (earned, max) = question_score(&q, &"good".into(), ScoringMethod::ByOption);
        assert_eq!((earned, max), (7.0, 10.0));
        let (earned, _) = question_score(&q, &"unlisted".into(), ScoringMethod::ByOption);
        assert_eq!(earned, 0.0);
    }

    #[test]
    fn test_scale_rescaled_and_clamped() {
        let mut q = question("q1", CustomQuestionType::Scale, 20.0);
        assert_eq!(question_score(&q, &7.into(), ScoringMethod::ByQuestion), (14.0, 20.0));
        assert_eq!(question_score(&q, &"5".into(), ScoringMethod::ByQuestion), (10.0, 20.0));
        assert_eq!(question_score(&q, &15.into(), ScoringMethod::ByQuestion), (20.0, 20.0));

        q.scale_max = Some(5.0);
        q.question_type = CustomQuestionType::Nps;
        assert_eq!(question_score(&q, &4.into(), ScoringMethod::ByOption), (16.0, 20.0));
    }

    #[test]
    fn test_yes_no_both_methods() {
        let mut q = question("q1", CustomQuestionType::YesNo, 5.0);
        assert_eq!(question_score(&q, &true.into(), ScoringMethod::ByQuestion).0, 5.0);
        assert_eq!(question_score(&q, &"no".into(), ScoringMethod::ByQuestion).0, 0.0);

        q.scoring.option_scores.insert("True".to_string(), 3.0);
        q.scoring.option_scores.insert("False".to_string(), 1.0);
        assert_eq!(question_score(&q, &true.into(), ScoringMethod::ByOption).0, 3.0);
        assert_eq!(question_score(&q, &false.into(), ScoringMethod::ByOption).0, 1.0);
    }

    #[test]
    fn test_multi_choice_capped_at_max() {
        let mut q = question("q1", CustomQuestionType::MultipleChoice, 10.0);
        q.options = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        q.scoring.option_scores.insert("a".to_string(), 6.0);
        q.scoring.option_scores.insert("b".to_string(), 6.0);

        let picked: AnswerValue = vec!["a", "b"].into();
        assert_eq!(question_score(&q, &picked, ScoringMethod::ByQuestion), (5.0, 10.0));
        assert_eq!(question_score(&q, &picked, ScoringMethod::ByOption), (10.0, 10.0));

        let everything: AnswerValue = vec!["a", "b", "c", "d", "e"].into();
        assert_eq!(question_score(&q, &everything, ScoringMethod::ByQuestion).0, 10.0);
    }

    #[test]
    fn test_text_questions_carry_no_scoring_block() {
        let questionnaire = scored(
            "by_question",
            100.0,
            vec![
                question("name", CustomQuestionType::ShortText, 0.0),
                question("q2", CustomQuestionType::YesNo, 100.0),
            ],
        );
        let result = score_custom(
            &questionnaire,
            &[answer("name", "Ada"), answer("q2", "yes"), answer("ghost", "x")],
        )
        .unwrap();

        assert_eq!(result.breakdown.len(), 2);
        assert!(result.breakdown[0].scoring.is_none());
        assert!(result.breakdown[1].scoring.is_some());
        assert_eq!(result.grade.as_deref(), Some("Pass"));
    }

    #[test]
    fn test_non_scored_passes_answers_through() {
        let questionnaire = CustomQuestionnaire {
            scoring_config: ScoringConfig::default(),
            questions: vec![question("q1", CustomQuestionType::SingleChoice, 10.0)],
        };
        let result = score_custom(&questionnaire, &[answer("q1", "x")]).unwrap();

        assert!(!result.is_scored());
        assert_eq!(result.grade, None);
        assert_eq!(result.breakdown.len(), 1);
        assert!(result.breakdown[0].scoring.is_none());
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let mut questionnaire = scored("by_question", 10.0, Vec::new());
        questionnaire.scoring_config.grades.clear();
        assert_eq!(
            score_custom(&questionnaire, &[]),
            Err(CustomConfigError::NoGradeBands)
        );
    }

    #[test]
    fn test_grade_bands_sorted_descending() {
        let bands = vec![band("C", 0.0, 100.0), band("A", 80.0, 100.0), band("B", 60.0, 79.9)];
        assert_eq!(determine_grade(85.0, &bands), "A");
        assert_eq!(determine_grade(65.0, &bands), "B");
        assert_eq!(determine_grade(10.0, &bands), "C");
        assert_eq!(determine_grade(150.0, &bands), UNGRADED);
        assert_eq!(determine_grade(50.0, &[]), UNGRADED);
    }
}
