//! Batch matching over a set of license records.
//!
//! One [`CandidateIndex`] is built per run and shared by every record in it.
//! Records already decided by a reviewer or an exact match are skipped. A
//! record whose classification fails is skipped as well, logged and counted
//! as an error, and the run moves on to the next record.

use serde::{Deserialize, Serialize};

use crate::cascade::{MatchOutcome, MatchResult, MatchingCascade};
use crate::config::MatchingConfig;
use crate::index::CandidateIndex;
use crate::types::{Employee, LicenseRecord};

/// Outcome counts for one matching run.
///
/// Every record lands in exactly one of `auto_matched`, `suggested`,
/// `external`, `unmatched` and `skipped`, so they sum to `total`. `errors` is
/// the subset of `skipped` whose classification failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    /// Records seen, eligible or not.
    pub total: usize,
    /// Records assigned by exact email.
    pub auto_matched: usize,
    /// Records with a suggestion pending review.
    pub suggested: usize,
    /// External records with no candidate.
    pub external: usize,
    /// Internal records unknown to the roster.
    pub unmatched: usize,
    /// Records left untouched: already decided, or failed.
    pub skipped: usize,
    /// Skipped records whose classification failed.
    pub errors: usize,
}

/// Runs the matching cascade over license records.
#[derive(Debug)]
pub struct BatchOrchestrator {
    cascade: MatchingCascade,
}

impl BatchOrchestrator {
    /// Create an orchestrator with the standard cascade.
    #[must_use]
    pub fn new(config: &MatchingConfig) -> Self {
        Self {
            cascade: MatchingCascade::new(config),
        }
    }

    /// Create an orchestrator around a custom cascade.
    #[must_use]
    pub fn with_cascade(cascade: MatchingCascade) -> Self {
        Self { cascade }
    }

    /// Classify every eligible record against `employees` and apply the
    /// results in place.
    pub fn process(&self, records: &mut [LicenseRecord], employees: &[Employee]) -> MatchStats {
        let index = CandidateIndex::build(employees);
        let mut stats = MatchStats {
            total: records.len(),
            ..Default::default()
        };

        tracing::info!(
            records = records.len(),
            employees = index.len(),
            "Starting license matching run"
        );

        for record in records.iter_mut() {
            if !record.is_reclassifiable() {
                stats.skipped += 1;
                continue;
            }

            let identifier = record.external_identifier.as_str();
            match self.cascade.match_identifier(identifier, &index) {
                Ok(result) => {
                    apply_match(record, &result);
                    match result.outcome() {
                        MatchOutcome::AutoMatched(_) => stats.auto_matched += 1,
                        MatchOutcome::Suggested(_) => stats.suggested += 1,
                        MatchOutcome::ExternalReview => stats.external += 1,
                        MatchOutcome::NotFound => stats.unmatched += 1,
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        license_id = %record.id,
                        error = %e,
                        "License matching failed, record skipped"
                    );
                    stats.skipped += 1;
                    stats.errors += 1;
                }
            }
        }

        tracing::info!(
            total = stats.total,
            auto_matched = stats.auto_matched,
            suggested = stats.suggested,
            external = stats.external,
            unmatched = stats.unmatched,
            skipped = stats.skipped,
            errors = stats.errors,
            "License matching run completed"
        );

        stats
    }
}

/// Run the standard cascade over `records` with default similarity.
pub fn process<S: AsRef<str>>(
    records: &mut [LicenseRecord],
    employees: &[Employee],
    company_domains: &[S],
) -> MatchStats {
    let config = MatchingConfig::new(company_domains);
    BatchOrchestrator::new(&config).process(records, employees)
}

/// Write a cascade result onto a record.
///
/// Only match fields change; the identifier and review stamps are kept.
pub fn apply_match(record: &mut LicenseRecord, result: &MatchResult) {
    record.match_confidence = result.confidence();
    record.match_method = result.method();
    record.match_status = result.status();

    match result.outcome() {
        MatchOutcome::AutoMatched(m) => {
            record.employee_id = Some(m.employee_id);
            record.suggested_employee_id = None;
        }
        MatchOutcome::Suggested(m) => {
            record.employee_id = None;
            record.suggested_employee_id = Some(m.employee_id);
        }
        MatchOutcome::ExternalReview | MatchOutcome::NotFound => {
            record.employee_id = None;
            record.suggested_employee_id = None;
        }
    }
}
