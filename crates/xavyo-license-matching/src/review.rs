//! Review workflow for matched license records.
//!
//! Reviewers act on one record at a time:
//!
//! | Action                | Precondition          | Effect                                                        |
//! |-----------------------|-----------------------|---------------------------------------------------------------|
//! | `confirm`             | suggestion pending    | suggestion becomes the assignment, status `confirmed`         |
//! | `reject`              | none                  | suggestion cleared, status `rejected`, assignment untouched   |
//! | `mark_external_guest` | none                  | assignment and suggestion cleared, status `external_guest`    |
//! | `assign_manually`     | employee exists       | assignment set, confidence 1.0, no method, status `confirmed` |
//!
//! Every action stamps `reviewed_at` and `reviewed_by`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{LicenseMatchingError, Result};
use crate::types::{Employee, EmployeeId, LicenseId, LicenseRecord, MatchStatus};

// =============================================================================
// Transitions
// =============================================================================

/// A reviewer decision on a single license record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    /// Accept the pending suggestion.
    Confirm,
    /// Discard the pending suggestion.
    Reject,
    /// Declare the account a guest outside the roster.
    MarkExternalGuest,
    /// Assign a specific employee, overriding the engine.
    AssignManually(EmployeeId),
}

impl ReviewAction {
    /// Name used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::Reject => "reject",
            Self::MarkExternalGuest => "mark_external_guest",
            Self::AssignManually(_) => "assign_manually",
        }
    }
}

/// Apply `action` to `record`.
///
/// The record is only modified when the transition is legal.
///
/// # Errors
///
/// [`LicenseMatchingError::InvalidState`] when confirming a record without a
/// pending suggestion.
pub fn apply_review(
    record: &mut LicenseRecord,
    action: ReviewAction,
    reviewer_id: Uuid,
    now: DateTime<Utc>,
) -> Result<()> {
    match action {
        ReviewAction::Confirm => {
            let Some(suggested) = record.suggested_employee_id else {
                return Err(LicenseMatchingError::InvalidState {
                    license_id: record.id,
                    message: "no pending suggestion to confirm".to_string(),
                });
            };
            record.employee_id = Some(suggested);
            record.suggested_employee_id = None;
            record.match_status = Some(MatchStatus::Confirmed);
        }
        ReviewAction::Reject => {
            record.suggested_employee_id = None;
            record.match_status = Some(MatchStatus::Rejected);
        }
        ReviewAction::MarkExternalGuest => {
            record.employee_id = None;
            record.suggested_employee_id = None;
            record.match_status = Some(MatchStatus::ExternalGuest);
        }
        ReviewAction::AssignManually(employee_id) => {
            record.employee_id = Some(employee_id);
            record.suggested_employee_id = None;
            record.match_confidence = Some(1.0);
            record.match_method = None;
            record.match_status = Some(MatchStatus::Confirmed);
        }
    }

    record.reviewed_at = Some(now);
    record.reviewed_by = Some(reviewer_id);
    Ok(())
}

// =============================================================================
// Storage seams
// =============================================================================

/// Filter for listing license records.
#[derive(Debug, Clone, Default)]
pub struct LicenseRecordFilter {
    /// Match any of these statuses. `Some(vec![None])` selects unset records.
    pub statuses: Option<Vec<Option<MatchStatus>>>,
    /// Filter by assigned employee.
    pub employee_id: Option<EmployeeId>,
    /// Filter by suggested employee.
    pub suggested_employee_id: Option<EmployeeId>,
}

impl LicenseRecordFilter {
    fn matches(&self, record: &LicenseRecord) -> bool {
        self.statuses
            .as_ref()
            .map_or(true, |s| s.contains(&record.match_status))
            && self
                .employee_id
                .map_or(true, |id| record.employee_id == Some(id))
            && self
                .suggested_employee_id
                .map_or(true, |id| record.suggested_employee_id == Some(id))
    }
}

/// Storage for license records, owned by the persistence collaborator.
pub trait LicenseRecordStore: Send + Sync {
    /// Get a record by ID.
    fn get(&self, id: LicenseId) -> Result<Option<LicenseRecord>>;

    /// Insert or replace a record.
    fn save(&self, record: LicenseRecord) -> Result<()>;

    /// List records matching the filter.
    fn list(&self, filter: &LicenseRecordFilter) -> Result<Vec<LicenseRecord>>;
}

/// Read access to the employee roster.
pub trait EmployeeDirectory: Send + Sync {
    /// Get an employee by ID.
    fn get(&self, id: EmployeeId) -> Result<Option<Employee>>;
}

/// In-memory implementation of `LicenseRecordStore` for testing and embedding.
#[derive(Debug, Default)]
pub struct InMemoryLicenseRecordStore {
    records: RwLock<HashMap<LicenseId, LicenseRecord>>,
}

impl InMemoryLicenseRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`.
    pub fn with_records(records: impl IntoIterator<Item = LicenseRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().map(|r| (r.id, r)).collect()),
        }
    }
}

impl LicenseRecordStore for InMemoryLicenseRecordStore {
    fn get(&self, id: LicenseId) -> Result<Option<LicenseRecord>> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned())
    }

    fn save(&self, record: LicenseRecord) -> Result<()> {
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(record.id, record);
        Ok(())
    }

    fn list(&self, filter: &LicenseRecordFilter) -> Result<Vec<LicenseRecord>> {
        Ok(self
            .records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }
}

/// In-memory implementation of `EmployeeDirectory`.
#[derive(Debug, Default)]
pub struct InMemoryEmployeeDirectory {
    employees: RwLock<HashMap<EmployeeId, Employee>>,
}

impl InMemoryEmployeeDirectory {
    /// Create a directory from a roster.
    pub fn new(roster: impl IntoIterator<Item = Employee>) -> Self {
        Self {
            employees: RwLock::new(roster.into_iter().map(|e| (e.id, e)).collect()),
        }
    }
}

impl EmployeeDirectory for InMemoryEmployeeDirectory {
    fn get(&self, id: EmployeeId) -> Result<Option<Employee>> {
        Ok(self
            .employees
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned())
    }
}

// =============================================================================
// Service
// =============================================================================

/// Applies reviewer decisions to stored license records.
#[derive(Clone)]
pub struct ReviewService {
    records: Arc<dyn LicenseRecordStore>,
    employees: Arc<dyn EmployeeDirectory>,
}

impl ReviewService {
    /// Create a review service over the given stores.
    pub fn new(
        records: Arc<dyn LicenseRecordStore>,
        employees: Arc<dyn EmployeeDirectory>,
    ) -> Self {
        Self { records, employees }
    }

    /// Accept the pending suggestion on a license.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown license or a suggested employee that left
    /// the roster, `InvalidState` when no suggestion is pending.
    pub fn confirm(&self, license_id: LicenseId, reviewer_id: Uuid) -> Result<LicenseRecord> {
        let record = self.load(license_id)?;
        if let Some(suggested) = record.suggested_employee_id {
            self.ensure_employee(suggested)?;
        }
        self.transition(record, ReviewAction::Confirm, reviewer_id)
    }

    /// Discard the pending suggestion on a license.
    pub fn reject(&self, license_id: LicenseId, reviewer_id: Uuid) -> Result<LicenseRecord> {
        let record = self.load(license_id)?;
        self.transition(record, ReviewAction::Reject, reviewer_id)
    }

    /// Declare the license holder an external guest.
    pub fn mark_external_guest(
        &self,
        license_id: LicenseId,
        reviewer_id: Uuid,
    ) -> Result<LicenseRecord> {
        let record = self.load(license_id)?;
        self.transition(record, ReviewAction::MarkExternalGuest, reviewer_id)
    }

    /// Assign a license to an employee chosen by the reviewer.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown license or employee.
    pub fn assign_manually(
        &self,
        license_id: LicenseId,
        employee_id: EmployeeId,
        reviewer_id: Uuid,
    ) -> Result<LicenseRecord> {
        let record = self.load(license_id)?;
        self.ensure_employee(employee_id)?;
        let action = ReviewAction::AssignManually(employee_id);
        self.transition(record, action, reviewer_id)
    }

    /// Records waiting for a reviewer: `suggested` and `external_review`.
    pub fn review_queue(&self) -> Result<Vec<LicenseRecord>> {
        self.records.list(&LicenseRecordFilter {
            statuses: Some(vec![
                Some(MatchStatus::Suggested),
                Some(MatchStatus::ExternalReview),
            ]),
            ..Default::default()
        })
    }

    fn load(&self, license_id: LicenseId) -> Result<LicenseRecord> {
        self.records
            .get(license_id)?
            .ok_or_else(|| LicenseMatchingError::license_not_found(license_id))
    }

    fn ensure_employee(&self, employee_id: EmployeeId) -> Result<()> {
        self.employees
            .get(employee_id)?
            .map(|_| ())
            .ok_or_else(|| LicenseMatchingError::employee_not_found(employee_id))
    }

    fn transition(
        &self,
        mut record: LicenseRecord,
        action: ReviewAction,
        reviewer_id: Uuid,
    ) -> Result<LicenseRecord> {
        let previous = record.match_status;
        if let Err(e) = apply_review(&mut record, action, reviewer_id, Utc::now()) {
            tracing::warn!(
                license_id = %record.id,
                action = action.as_str(),
                error = %e,
                "Review action rejected"
            );
            return Err(e);
        }
        self.records.save(record.clone())?;

        tracing::info!(
            license_id = %record.id,
            reviewer_id = %reviewer_id,
            action = action.as_str(),
            from = ?previous,
            to = ?record.match_status,
            "License review applied"
        );
        Ok(record)
    }
}
