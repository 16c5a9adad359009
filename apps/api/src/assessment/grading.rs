/// Letter grade cutoffs shared by the professional instruments, highest first.
pub const GRADE_CUTOFFS: &[(f64, &str)] = &[(90.0, "A"), (75.0, "B"), (60.0, "C")];
pub const LOWEST_GRADE: &str = "D";

/// ≥90 A, ≥75 B, ≥60 C, else D.
pub fn letter_grade(score: f64) -> &'static str {
    GRADE_CUTOFFS
        .iter()
        .find(|(cutoff, _)| score >= *cutoff)
        .map(|(_, grade)| *grade)
        .unwrap_or(LOWEST_GRADE)
}

/// Unweighted mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
