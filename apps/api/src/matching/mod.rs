// Competency matching: maps instrument dimensions onto job competencies.
// Implements: mapping rule table, weighted competency scoring with reversal and
// fallback, job profile validation and aggregate job fit, job family detection.

pub mod handlers;
pub mod job_family;
pub mod job_profile;
pub mod mapper;
pub mod rules;

pub use job_family::JobFamily;
pub use job_profile::{evaluate_job_fit, JobCompetencyProfile, JobFitReport, JobProfileError};
pub use mapper::{score_competency, CompetencyScore};
pub use rules::{MappingError, MappingTable};
