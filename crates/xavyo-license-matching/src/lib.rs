//! License-to-employee identity matching.
//!
//! License grants pulled from SaaS providers carry an external account
//! identifier, almost always an email address. This crate decides which
//! employee of the HR roster such an identifier belongs to, how confident
//! that decision is, and which review state the grant enters.
//!
//! # Components
//!
//! - [`domain`] - internal vs. external classification by company domain
//! - [`index::CandidateIndex`] - exact-email, local-part and fuzzy lookup
//!   structures built once per run
//! - [`fuzzy::FuzzyNameMatcher`] - name similarity between an identifier and
//!   employee full names
//! - [`cascade::MatchingCascade`] - ordered matcher levels, first match wins
//! - [`review::ReviewService`] - confirm / reject / external guest / manual
//!   assignment transitions
//! - [`batch::BatchOrchestrator`] - applies the cascade to many records and
//!   tallies outcomes
//!
//! The engine performs no I/O. Storage is reached through the
//! [`review::LicenseRecordStore`] and [`review::EmployeeDirectory`] traits.
//!
//! # Example
//!
//! ```
//! use xavyo_license_matching::{
//!     process, Employee, EmployeeId, LicenseId, LicenseRecord, MatchStatus,
//! };
//!
//! let roster = vec![Employee::new(EmployeeId::new(), "john.doe@co.com", "John Doe")];
//! let mut records = vec![LicenseRecord::new(LicenseId::new(), "John.Doe@co.com")];
//!
//! let stats = process(&mut records, &roster, &["co.com"]);
//! assert_eq!(stats.auto_matched, 1);
//! assert_eq!(records[0].match_status, Some(MatchStatus::AutoMatched));
//! ```

pub mod batch;
pub mod cascade;
pub mod config;
pub mod domain;
pub mod error;
pub mod fuzzy;
pub mod index;
pub mod review;
pub mod types;

// Re-export commonly used types
pub use batch::{apply_match, process, BatchOrchestrator, MatchStats};
pub use cascade::{
    match_identifier, ExactEmailLevel, FuzzyFallbackLevel, LocalPartLevel, MatchContext, MatchLevel,
    MatchOutcome, MatchResult, MatchingCascade, AUTO_ASSIGN_THRESHOLD, SUGGEST_THRESHOLD,
};
pub use config::{ConfigError, MatchingConfig};
pub use domain::is_external;
pub use error::{LicenseMatchingError, Result};
pub use fuzzy::{FuzzyNameMatcher, SimilarityAlgorithm};
pub use index::CandidateIndex;
pub use review::{
    apply_review, EmployeeDirectory, InMemoryEmployeeDirectory, InMemoryLicenseRecordStore,
    LicenseRecordFilter, LicenseRecordStore, ReviewAction, ReviewService,
};
pub use types::{Employee, EmployeeId, LicenseId, LicenseRecord, MatchMethod, MatchStatus};
