//! Raw answer normalization.
//!
//! Submissions arrive with keys in several aliasing schemes (`"7"`, `"mbti_7"`,
//! `"007"`) and values of mixed type (`"A"`, `3`, `"3"`, `true`, `["a", "b"]`).
//! Keys are canonicalized once, when the `RawAnswerSet` is built; value coercion
//! lives on `AnswerValue`. Scorers never look at raw keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tokens treated as "yes" when an answer has to be read as a boolean.
pub const AFFIRMATIVE_TOKENS: &[&str] = &["a", "yes", "true", "1", "是", "y"];
const NEGATIVE_TOKENS: &[&str] = &["b", "no", "false", "0", "否", "n"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<AnswerValue>),
}

impl AnswerValue {
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.iter().all(AnswerValue::is_blank),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    /// Answer as a trimmed label. Integral numbers print without a fraction so
    /// `1` and `"1"` compare equal.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::List(items) if items.len() == 1 => items[0].as_label(),
            Self::List(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Self::List(items) if items.len() == 1 => items[0].as_number(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(b) = self {
            return Some(*b);
        }
        let label = self.as_label()?.to_lowercase();
        if AFFIRMATIVE_TOKENS.contains(&label.as_str()) {
            Some(true)
        } else if NEGATIVE_TOKENS.contains(&label.as_str()) {
            Some(false)
        } else {
            None
        }
    }

    /// Multi-select view: every non-blank label in a list, or the single label otherwise.
    pub fn as_labels(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.iter().filter_map(AnswerValue::as_label).collect(),
            other => other.as_label().into_iter().collect(),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i32> for AnswerValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<AnswerValue>> From<Vec<T>> for AnswerValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Canonical form of a question id: instrument prefix stripped from `<word>_<digits>`
/// keys, leading zeros dropped from numeric ids. Non-numeric ids pass through trimmed.
pub fn canonical_key(key: &str) -> String {
    let key = key.trim();
    let numeric_part = match key.rsplit_once('_') {
        Some((prefix, digits))
            if !prefix.is_empty()
                && prefix.chars().all(|c| c.is_ascii_alphabetic())
                && !digits.is_empty()
                && digits.chars().all(|c| c.is_ascii_digit()) =>
        {
            digits
        }
        _ => key,
    };
    if !numeric_part.is_empty() && numeric_part.chars().all(|c| c.is_ascii_digit()) {
        let trimmed = numeric_part.trim_start_matches('0');
        if trimmed.is_empty() {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    } else {
        key.to_string()
    }
}

/// Question id → answer map with canonicalized keys. Blank answers are dropped,
/// so an aliased duplicate never shadows a real answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, AnswerValue>", into = "BTreeMap<String, AnswerValue>")]
pub struct RawAnswerSet {
    answers: BTreeMap<String, AnswerValue>,
}

impl RawAnswerSet {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<AnswerValue>,
    {
        let mut answers = BTreeMap::new();
        for (key, value) in pairs {
            let value = value.into();
            if value.is_blank() {
                continue;
            }
            answers.entry(canonical_key(key.as_ref())).or_insert(value);
        }
        Self { answers }
    }

    pub fn get(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(&canonical_key(question_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AnswerValue)> {
        self.answers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Largest numeric question id present. Used to tell legacy questionnaire
    /// lengths apart.
    pub fn max_numeric_id(&self) -> Option<u32> {
        self.answers.keys().filter_map(|k| k.parse::<u32>().ok()).max()
    }
}

impl From<BTreeMap<String, AnswerValue>> for RawAnswerSet {
    fn from(map: BTreeMap<String, AnswerValue>) -> Self {
        Self::from_pairs(map)
    }
}

impl From<RawAnswerSet> for BTreeMap<String, AnswerValue> {
    fn from(set: RawAnswerSet) -> Self {
        set.answers
    }
}
