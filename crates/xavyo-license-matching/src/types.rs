//! Type definitions for license matching.
//!
//! Includes newtype wrappers for IDs, the employee and license record shapes
//! shared with the HR sync and ingestion collaborators, and the closed
//! enumerations for match method and review status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// ID Types (Newtype Pattern)
// ============================================================================

/// Error type for ID parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The underlying UUID parse error message.
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns a reference to the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self).map_err(|e| ParseIdError {
                    id_type: stringify!($name),
                    message: e.to_string(),
                })
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(
    /// Identifier of an employee in the HR roster.
    EmployeeId
);

define_id!(
    /// Identifier of a license grant pulled from a provider.
    LicenseId
);

// ============================================================================
// Enums
// ============================================================================

/// How a license identifier was linked to an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// The full email address matched an employee email.
    ExactEmail,
    /// The part before "@" matched an employee's local part.
    LocalPart,
    /// A name derived from the identifier resembled an employee's full name.
    FuzzyName,
}

impl MatchMethod {
    /// Wire representation used by the persistence layer.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactEmail => "exact_email",
            Self::LocalPart => "local_part",
            Self::FuzzyName => "fuzzy_name",
        }
    }
}

impl Display for MatchMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "exact_email" => Ok(Self::ExactEmail),
            "local_part" => Ok(Self::LocalPart),
            "fuzzy_name" => Ok(Self::FuzzyName),
            other => Err(format!("unknown match method: {other}")),
        }
    }
}

/// Review state of a license record.
///
/// The unset state ("not found in HRIS", or never classified) is modelled as
/// `Option::<MatchStatus>::None` on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Assigned by the engine without review (exact email only).
    AutoMatched,
    /// A candidate employee awaits human confirmation.
    Suggested,
    /// A reviewer confirmed or manually assigned the employee.
    Confirmed,
    /// A reviewer rejected the suggested employee.
    Rejected,
    /// A reviewer declared the account an external guest.
    ExternalGuest,
    /// External identifier with no candidate; needs a reviewer.
    ExternalReview,
}

impl MatchStatus {
    /// Wire representation used by the persistence layer.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoMatched => "auto_matched",
            Self::Suggested => "suggested",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::ExternalGuest => "external_guest",
            Self::ExternalReview => "external_review",
        }
    }

    /// Whether a record in `status` may be re-classified by a matching run.
    ///
    /// Only unset, `suggested` and `external_review` records are eligible.
    /// Everything else carries a decision (human or exact match) that a
    /// later run must not overwrite.
    #[must_use]
    pub fn is_reclassifiable(status: Option<Self>) -> bool {
        matches!(status, None | Some(Self::Suggested | Self::ExternalReview))
    }
}

impl Display for MatchStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto_matched" => Ok(Self::AutoMatched),
            "suggested" => Ok(Self::Suggested),
            "confirmed" => Ok(Self::Confirmed),
            "rejected" => Ok(Self::Rejected),
            "external_guest" => Ok(Self::ExternalGuest),
            "external_review" => Ok(Self::ExternalReview),
            other => Err(format!("unknown match status: {other}")),
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// An employee from the HR roster. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier.
    pub id: EmployeeId,
    /// Work email, unique case-insensitively.
    pub email: String,
    /// Display name; the HR feed may omit it.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Department, used for cost attribution only.
    #[serde(default)]
    pub department: Option<String>,
}

impl Employee {
    /// Create an employee with a name and no department.
    pub fn new(id: EmployeeId, email: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            full_name: Some(full_name.into()),
            department: None,
        }
    }

    /// Set the department.
    #[must_use]
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    /// Full name if present and not blank.
    #[must_use]
    pub fn usable_name(&self) -> Option<&str> {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// A license grant attached to an external account identifier.
///
/// Created by the ingestion collaborator; the engine only mutates the match
/// and review fields, never `external_identifier`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// Unique identifier.
    pub id: LicenseId,
    /// Account identifier at the provider, usually an email address.
    pub external_identifier: String,
    /// Active assignment.
    pub employee_id: Option<EmployeeId>,
    /// Pending, reviewable candidate.
    pub suggested_employee_id: Option<EmployeeId>,
    /// Confidence in `[0, 1]`; set only together with `match_method`, except
    /// for manual assignments which carry 1.0 and no method.
    pub match_confidence: Option<f64>,
    /// Algorithm that produced the match.
    pub match_method: Option<MatchMethod>,
    /// Review state.
    pub match_status: Option<MatchStatus>,
    /// When a reviewer last acted on the record.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Who last acted on the record.
    pub reviewed_by: Option<Uuid>,
}

impl LicenseRecord {
    /// A freshly ingested record with every match field unset.
    pub fn new(id: LicenseId, external_identifier: impl Into<String>) -> Self {
        Self {
            id,
            external_identifier: external_identifier.into(),
            employee_id: None,
            suggested_employee_id: None,
            match_confidence: None,
            match_method: None,
            match_status: None,
            reviewed_at: None,
            reviewed_by: None,
        }
    }

    /// Whether a matching run may overwrite this record.
    #[must_use]
    pub fn is_reclassifiable(&self) -> bool {
        MatchStatus::is_reclassifiable(self.match_status)
    }
}
