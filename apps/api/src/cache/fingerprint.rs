use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Timestamps whose change must invalidate a cached profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectState {
    pub subject_updated_at: DateTime<Utc>,
    #[serde(default)]
    pub resume_uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub latest_submission_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub job_updated_at: Option<DateTime<Utc>>,
}

impl SubjectState {
    #[cfg(test)]
    pub fn new(subject_updated_at: DateTime<Utc>) -> Self {
        Self {
            subject_updated_at,
            resume_uploaded_at: None,
            latest_submission_at: None,
            job_updated_at: None,
        }
    }

    pub fn fingerprint(&self) -> String {
        fingerprint(self)
    }
}

/// SHA-256 hex over the subject's timestamps.
///
/// Each timestamp is tagged with its role and the parts are sorted before
/// joining, so the digest does not depend on collection order. Absent
/// timestamps are left out entirely rather than replaced by a placeholder.
pub fn fingerprint(state: &SubjectState) -> String {
    let mut parts = vec![format!("subject={}", state.subject_updated_at.timestamp_micros())];
    let optional = [
        ("resume", state.resume_uploaded_at),
        ("submission", state.latest_submission_at),
        ("job", state.job_updated_at),
    ];
    parts.extend(
        optional
            .into_iter()
            .filter_map(|(role, ts)| ts.map(|ts| format!("{role}={}", ts.timestamp_micros()))),
    );
    parts.sort();

    hex::encode(Sha256::digest(parts.join("|").as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> SubjectState {
        let t = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap();
        SubjectState {
            subject_updated_at: t,
            resume_uploaded_at: Some(t - Duration::days(3)),
            latest_submission_at: Some(t + Duration::hours(2)),
            job_updated_at: Some(t - Duration::days(10)),
        }
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(base().fingerprint(), base().fingerprint());
        assert_eq!(base().fingerprint().len(), 64);
    }

    #[test]
    fn test_each_timestamp_changes_fingerprint() {
        let original = base().fingerprint();

        let mut s = base();
        s.subject_updated_at += Duration::seconds(1);
        assert_ne!(s.fingerprint(), original);

        let mut s = base();
        s.latest_submission_at = s.latest_submission_at.map(|t| t + Duration::milliseconds(1));
        assert_ne!(s.fingerprint(), original);

        let mut s = base();
        s.job_updated_at = s.job_updated_at.map(|t| t + Duration::minutes(5));
        assert_ne!(s.fingerprint(), original);

        let mut s = base();
        s.resume_uploaded_at = None;
        assert_ne!(s.fingerprint(), original);
    }

    #[test]
    fn test_missing_parts_do_not_collide_across_roles() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut with_job = SubjectState::new(t);
        with_job.job_updated_at = Some(t);
        let mut with_submission = SubjectState::new(t);
        with_submission.latest_submission_at = Some(t);

        assert_ne!(with_job.fingerprint(), with_submission.fingerprint());
        assert_ne!(with_job.fingerprint(), SubjectState::new(t).fingerprint());
    }
}
