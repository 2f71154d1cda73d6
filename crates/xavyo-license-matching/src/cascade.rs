//! Matching cascade: resolves a license identifier to an employee.
//!
//! ## Levels
//!
//! Levels are evaluated in order and the first one that produces a result
//! wins:
//!
//! 1. **Exact email**: the identifier is a roster email. Confidence 1.0,
//!    auto-matched, always treated as internal.
//! 2. **Local part**: the part before "@" matches exactly one employee
//!    (0.90 internal, 0.85 external, suggested), or several employees that
//!    fuzzy name matching can tell apart (suggested).
//! 3. **Fuzzy fallback**: external identifiers only, scored against the
//!    whole roster (suggested).
//!
//! Without a result, external identifiers go to `external_review` and
//! internal ones are left unset ("not found in HRIS").
//!
//! Only exact matches reach [`AUTO_ASSIGN_THRESHOLD`], so nothing but an
//! exact email hit is ever assigned without a reviewer.

use serde::{Deserialize, Serialize};

use crate::config::MatchingConfig;
use crate::domain::{is_external, local_part};
use crate::error::Result;
use crate::fuzzy::{FuzzyCandidate, FuzzyNameMatcher};
use crate::index::CandidateIndex;
use crate::types::{EmployeeId, MatchMethod, MatchStatus};

/// Minimum confidence for assignment without review.
pub const AUTO_ASSIGN_THRESHOLD: f64 = 0.95;

/// Minimum confidence for a suggestion.
pub const SUGGEST_THRESHOLD: f64 = 0.5;

/// Local-part confidence for internal identifiers.
pub const LOCAL_PART_INTERNAL_CONFIDENCE: f64 = 0.90;

/// Local-part confidence for external identifiers.
pub const LOCAL_PART_EXTERNAL_CONFIDENCE: f64 = 0.85;

// =============================================================================
// Results
// =============================================================================

/// The employee a level settled on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchedEmployee {
    /// The matched employee.
    pub employee_id: EmployeeId,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Level that produced the match.
    pub method: MatchMethod,
}

/// Decision reached for one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Assigned without review.
    AutoMatched(MatchedEmployee),
    /// Proposed for review.
    Suggested(MatchedEmployee),
    /// External identifier without a candidate.
    ExternalReview,
    /// Internal identifier unknown to the roster.
    NotFound,
}

/// Immutable result of classifying one identifier.
///
/// Built only through its constructors, so a confidence and method exist
/// exactly when an employee does. Deserialization applies the same rules and
/// rejects anything the constructors could not have produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatchResultRepr")]
pub struct MatchResult {
    outcome: MatchOutcome,
    is_external: bool,
}

impl MatchResult {
    /// Exact email hit: confidence 1.0, always internal.
    #[must_use]
    pub fn auto_matched(employee_id: EmployeeId) -> Self {
        Self {
            outcome: MatchOutcome::AutoMatched(MatchedEmployee {
                employee_id,
                confidence: 1.0,
                method: MatchMethod::ExactEmail,
            }),
            is_external: false,
        }
    }

    /// Candidate proposed for review.
    ///
    /// Confidence is capped at [`LOCAL_PART_INTERNAL_CONFIDENCE`], the
    /// strongest evidence short of an exact email, so a suggestion never
    /// reaches [`AUTO_ASSIGN_THRESHOLD`].
    #[must_use]
    pub fn suggested(
        employee_id: EmployeeId,
        confidence: f64,
        method: MatchMethod,
        is_external: bool,
    ) -> Self {
        Self {
            outcome: MatchOutcome::Suggested(MatchedEmployee {
                employee_id,
                confidence: confidence.max(0.0).min(LOCAL_PART_INTERNAL_CONFIDENCE),
                method,
            }),
            is_external,
        }
    }

    /// External identifier left for a reviewer.
    #[must_use]
    pub fn external_review() -> Self {
        Self {
            outcome: MatchOutcome::ExternalReview,
            is_external: true,
        }
    }

    /// Internal identifier unknown to the roster.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            outcome: MatchOutcome::NotFound,
            is_external: false,
        }
    }

    /// The decision itself.
    #[must_use]
    pub fn outcome(&self) -> MatchOutcome {
        self.outcome
    }

    fn matched(&self) -> Option<&MatchedEmployee> {
        match &self.outcome {
            MatchOutcome::AutoMatched(m) | MatchOutcome::Suggested(m) => Some(m),
            MatchOutcome::ExternalReview | MatchOutcome::NotFound => None,
        }
    }

    /// Matched or suggested employee.
    #[must_use]
    pub fn employee_id(&self) -> Option<EmployeeId> {
        self.matched().map(|m| m.employee_id)
    }

    /// Confidence, set exactly when a method is.
    #[must_use]
    pub fn confidence(&self) -> Option<f64> {
        self.matched().map(|m| m.confidence)
    }

    /// Level that produced the match.
    #[must_use]
    pub fn method(&self) -> Option<MatchMethod> {
        self.matched().map(|m| m.method)
    }

    /// Review status the record should enter. `None` means "not found in HRIS".
    #[must_use]
    pub fn status(&self) -> Option<MatchStatus> {
        match self.outcome {
            MatchOutcome::AutoMatched(_) => Some(MatchStatus::AutoMatched),
            MatchOutcome::Suggested(_) => Some(MatchStatus::Suggested),
            MatchOutcome::ExternalReview => Some(MatchStatus::ExternalReview),
            MatchOutcome::NotFound => None,
        }
    }

    /// Whether the identifier was classified as external.
    #[must_use]
    pub fn is_external(&self) -> bool {
        self.is_external
    }
}

/// Wire form of [`MatchResult`], checked before it becomes one.
#[derive(Deserialize)]
struct MatchResultRepr {
    outcome: MatchOutcome,
    is_external: bool,
}

impl TryFrom<MatchResultRepr> for MatchResult {
    type Error = String;

    fn try_from(repr: MatchResultRepr) -> std::result::Result<Self, Self::Error> {
        let is_external = repr.is_external;
        let expected = match repr.outcome {
            MatchOutcome::AutoMatched(m) => Self::auto_matched(m.employee_id),
            MatchOutcome::Suggested(m) => {
                Self::suggested(m.employee_id, m.confidence, m.method, is_external)
            }
            MatchOutcome::ExternalReview => Self::external_review(),
            MatchOutcome::NotFound => Self::not_found(),
        };

        let result = Self {
            outcome: repr.outcome,
            is_external,
        };
        if result != expected {
            return Err(format!("inconsistent match result: {result:?}"));
        }
        Ok(result)
    }
}

// =============================================================================
// Levels
// =============================================================================

/// An identifier prepared for evaluation by the levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchContext {
    /// Trimmed, lowercased identifier.
    pub identifier: String,
    /// Local part, when the identifier contains "@".
    pub local_part: Option<String>,
    /// Domain classification of the identifier.
    pub is_external: bool,
}

impl MatchContext {
    /// Normalize and classify an identifier.
    pub fn new<S: AsRef<str>>(identifier: &str, company_domains: &[S]) -> Self {
        let identifier = identifier.trim().to_lowercase();
        let is_external = is_external(&identifier, company_domains);
        let local_part = local_part(&identifier).map(str::to_string);
        Self {
            identifier,
            local_part,
            is_external,
        }
    }
}

/// One step of the cascade.
///
/// Levels outside this crate build their results with the [`MatchResult`]
/// constructors, which hold the same invariants as the built-in levels.
pub trait MatchLevel: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Produce a result, or `None` to defer to the next level.
    fn evaluate(&self, ctx: &MatchContext, index: &CandidateIndex) -> Result<Option<MatchResult>>;
}

/// Level 1: the identifier is a roster email.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactEmailLevel;

impl MatchLevel for ExactEmailLevel {
    fn name(&self) -> &'static str {
        "exact_email"
    }

    fn evaluate(&self, ctx: &MatchContext, index: &CandidateIndex) -> Result<Option<MatchResult>> {
        Ok(index
            .exact(&ctx.identifier)
            .map(|employee| MatchResult::auto_matched(employee.id)))
    }
}

/// Level 2: the local part matches one or more employees.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPartLevel {
    matcher: FuzzyNameMatcher,
}

impl LocalPartLevel {
    /// Create the level with the matcher used to separate shared local parts.
    #[must_use]
    pub fn new(matcher: FuzzyNameMatcher) -> Self {
        Self { matcher }
    }
}

impl MatchLevel for LocalPartLevel {
    fn name(&self) -> &'static str {
        "local_part"
    }

    fn evaluate(&self, ctx: &MatchContext, index: &CandidateIndex) -> Result<Option<MatchResult>> {
        let Some(local) = ctx.local_part.as_deref() else {
            return Ok(None);
        };

        let candidates = index.by_local_part(local);
        match candidates.as_slice() {
            [] => Ok(None),
            [only] => {
                let confidence = if ctx.is_external {
                    LOCAL_PART_EXTERNAL_CONFIDENCE
                } else {
                    LOCAL_PART_INTERNAL_CONFIDENCE
                };
                Ok(Some(MatchResult::suggested(
                    only.id,
                    confidence,
                    MatchMethod::LocalPart,
                    ctx.is_external,
                )))
            }
            many => {
                let best = self.matcher.score(&ctx.identifier, many)?;
                Ok(fuzzy_suggestion(best, ctx.is_external))
            }
        }
    }
}

/// Level 3: external identifiers scored against the whole roster.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyFallbackLevel {
    matcher: FuzzyNameMatcher,
}

impl FuzzyFallbackLevel {
    /// Create the level with the given matcher.
    #[must_use]
    pub fn new(matcher: FuzzyNameMatcher) -> Self {
        Self { matcher }
    }
}

impl MatchLevel for FuzzyFallbackLevel {
    fn name(&self) -> &'static str {
        "fuzzy_fallback"
    }

    fn evaluate(&self, ctx: &MatchContext, index: &CandidateIndex) -> Result<Option<MatchResult>> {
        if !ctx.is_external {
            return Ok(None);
        }

        let best = self.matcher.score(&ctx.identifier, &index.fuzzy_pool())?;
        Ok(fuzzy_suggestion(best, true))
    }
}

/// A fuzzy candidate that clears [`SUGGEST_THRESHOLD`], as a suggestion.
fn fuzzy_suggestion(best: Option<FuzzyCandidate>, is_external: bool) -> Option<MatchResult> {
    let best = best.filter(|b| b.confidence >= SUGGEST_THRESHOLD)?;
    Some(MatchResult::suggested(
        best.employee_id,
        best.confidence,
        MatchMethod::FuzzyName,
        is_external,
    ))
}

// =============================================================================
// Cascade
// =============================================================================

/// Ordered list of levels, evaluated first-match-wins.
pub struct MatchingCascade {
    company_domains: Vec<String>,
    levels: Vec<Box<dyn MatchLevel>>,
}

impl std::fmt::Debug for MatchingCascade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchingCascade")
            .field("company_domains", &self.company_domains)
            .field("levels", &self.level_names())
            .finish()
    }
}

impl MatchingCascade {
    /// Standard cascade: exact email, local part, fuzzy fallback.
    #[must_use]
    pub fn new(config: &MatchingConfig) -> Self {
        let matcher = FuzzyNameMatcher::new(config.similarity);
        Self::with_levels(
            config.company_domains.clone(),
            vec![
                Box::new(ExactEmailLevel),
                Box::new(LocalPartLevel::new(matcher)),
                Box::new(FuzzyFallbackLevel::new(matcher)),
            ],
        )
    }

    /// Cascade with a custom level order.
    #[must_use]
    pub fn with_levels(company_domains: Vec<String>, levels: Vec<Box<dyn MatchLevel>>) -> Self {
        Self {
            company_domains,
            levels,
        }
    }

    /// Names of the levels in evaluation order.
    #[must_use]
    pub fn level_names(&self) -> Vec<&'static str> {
        self.levels.iter().map(|l| l.name()).collect()
    }

    /// Classify one identifier against the index.
    ///
    /// # Errors
    ///
    /// Propagates level failures, e.g. an ambiguous local part whose
    /// candidates cannot be name-scored.
    pub fn match_identifier(
        &self,
        identifier: &str,
        index: &CandidateIndex,
    ) -> Result<MatchResult> {
        let ctx = MatchContext::new(identifier, self.company_domains.as_slice());

        for level in &self.levels {
            if let Some(result) = level.evaluate(&ctx, index)? {
                tracing::debug!(
                    identifier = %ctx.identifier,
                    level = level.name(),
                    status = ?result.status(),
                    confidence = ?result.confidence(),
                    "Identifier matched"
                );
                return Ok(result);
            }
        }

        let result = if ctx.is_external {
            MatchResult::external_review()
        } else {
            MatchResult::not_found()
        };
        tracing::debug!(
            identifier = %ctx.identifier,
            is_external = ctx.is_external,
            "No match for identifier"
        );
        Ok(result)
    }
}

/// Classify one identifier with the standard cascade.
///
/// # Errors
///
/// See [`MatchingCascade::match_identifier`].
pub fn match_identifier<S: AsRef<str>>(
    identifier: &str,
    index: &CandidateIndex,
    company_domains: &[S],
) -> Result<MatchResult> {
    let config = MatchingConfig::new(company_domains);
    MatchingCascade::new(&config).match_identifier(identifier, index)
}
