use crate::custom::models::{ScoringConfig, ScoringMethod};
use crate::custom::CustomConfigError;

/// Checks a questionnaire's scoring settings.
///
/// Returns the parsed method when scoring is enabled, `None` when the
/// questionnaire only collects information.
pub fn validate_scoring_config(
    config: &ScoringConfig,
) -> Result<Option<ScoringMethod>, CustomConfigError> {
    if !config.enabled {
        return Ok(None);
    }

    match config.total_score {
        Some(total) if total > 0.0 => {}
        _ => return Err(CustomConfigError::NonPositiveTotal),
    }

    let method: ScoringMethod = config
        .method
        .as_deref()
        .ok_or(CustomConfigError::MissingMethod)?
        .parse()?;

    if config.grades.is_empty() {
        return Err(CustomConfigError::NoGradeBands);
    }

    for band in &config.grades {
        let (Some(min), Some(max)) = (band.min_score, band.max_score) else {
            return Err(CustomConfigError::BandWithoutRange(band.name.clone()));
        };
        if min > max {
            return Err(CustomConfigError::InvertedBand {
                name: band.name.clone(),
                min,
                max,
            });
        }
    }

    Ok(Some(method))
}
