//! Fuzzy name matching between license identifiers and employee names.
//!
//! The identifier's local part is turned into a name ("j.doe42" becomes
//! "j doe") and compared against each candidate's full name. Ordering
//! variants are scored as well so that "doe.john" and "John Q. Doe" still
//! line up with "john doe":
//!
//! - the derived name, and its two words reversed
//! - the candidate's full name, its "first last" reduction, and "last first"
//!
//! The best variant is the candidate's score. The winning score is scaled by
//! [`FUZZY_CONFIDENCE_CAP`] so fuzzy evidence never reaches the confidence of
//! an email match.

use std::fmt;
use std::str::FromStr;

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::domain::local_part;
use crate::error::{LicenseMatchingError, Result};
use crate::types::{Employee, EmployeeId};

/// Multiplier applied to the best raw similarity.
pub const FUZZY_CONFIDENCE_CAP: f64 = 0.85;

/// String similarity ratio used for name comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SimilarityAlgorithm {
    /// Gestalt pattern matching (Ratcliff/Obershelp).
    #[default]
    RatcliffObershelp,
    /// Jaro-Winkler similarity (positional matching, prefix bonus).
    JaroWinkler,
    /// Normalized Levenshtein similarity.
    Levenshtein,
}

impl SimilarityAlgorithm {
    /// Similarity of `a` and `b` in `[0, 1]`.
    #[must_use]
    pub fn ratio(&self, a: &str, b: &str) -> f64 {
        if a.is_empty() && b.is_empty() {
            return 1.0;
        }
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        match self {
            Self::RatcliffObershelp => ratcliff_obershelp(a, b),
            Self::JaroWinkler => jaro_winkler(a, b),
            Self::Levenshtein => normalized_levenshtein(a, b),
        }
    }

    /// Configuration name of the algorithm.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RatcliffObershelp => "ratcliff_obershelp",
            Self::JaroWinkler => "jaro_winkler",
            Self::Levenshtein => "levenshtein",
        }
    }
}

impl fmt::Display for SimilarityAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ratcliff_obershelp" | "gestalt" => Ok(Self::RatcliffObershelp),
            "jaro_winkler" => Ok(Self::JaroWinkler),
            "levenshtein" => Ok(Self::Levenshtein),
            other => Err(format!("unknown similarity algorithm: {other}")),
        }
    }
}

/// Ratcliff/Obershelp ratio: `2 * M / (|a| + |b|)`, where `M` counts the
/// characters in the longest common block plus, recursively, the blocks
/// left and right of it.
fn ratcliff_obershelp(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(a, b)];

    while let Some((a, b)) = pending.pop() {
        let (i, j, len) = longest_common_block(a, b);
        if len == 0 {
            continue;
        }
        matched += len;
        pending.push((&a[..i], &b[..j]));
        pending.push((&a[i + len..], &b[j + len..]));
    }

    matched
}

/// Longest common contiguous block as `(start_a, start_b, len)`.
///
/// Ties go to the block that starts earliest in `a`, then in `b`.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    if a.is_empty() || b.is_empty() {
        return best;
    }

    // Row of common suffix lengths ending at (i, j).
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb { previous[j] + 1 } else { 0 };
            let len = current[j + 1];
            if len > best.2 {
                best = (i + 1 - len, j + 1 - len, len);
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    best
}

/// Derive a lowercase person name from an identifier's local part.
///
/// Separators `.`, `_` and `-` become spaces and digits are dropped.
/// Returns `None` when nothing is left.
#[must_use]
pub fn extract_name(identifier: &str) -> Option<String> {
    let local = local_part(identifier).unwrap_or(identifier);
    let cleaned: String = local
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .map(|c| match c {
            '.' | '_' | '-' => ' ',
            other => other,
        })
        .collect::<String>()
        .to_lowercase();

    let name = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    (!name.is_empty()).then_some(name)
}

/// Best candidate found by the fuzzy matcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyCandidate {
    /// The employee with the highest similarity.
    pub employee_id: EmployeeId,
    /// Best raw similarity across all variants, in `[0, 1]`.
    pub similarity: f64,
    /// `similarity` scaled by [`FUZZY_CONFIDENCE_CAP`].
    pub confidence: f64,
}

/// Scores identifiers against candidate employees by name similarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyNameMatcher {
    algorithm: SimilarityAlgorithm,
}

impl FuzzyNameMatcher {
    /// Create a matcher using the given similarity ratio.
    #[must_use]
    pub fn new(algorithm: SimilarityAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Find the candidate whose name best resembles the identifier.
    ///
    /// Returns `Ok(None)` when no name can be derived from the identifier or
    /// no candidate scores above zero. Equal scores keep the candidate seen
    /// first, so ties depend on the order of `candidates`.
    ///
    /// # Errors
    ///
    /// [`LicenseMatchingError::IncompleteEmployee`] if a candidate has no
    /// usable full name.
    pub fn score(
        &self,
        identifier: &str,
        candidates: &[&Employee],
    ) -> Result<Option<FuzzyCandidate>> {
        let Some(name) = extract_name(identifier) else {
            return Ok(None);
        };
        let name_variants = name_variants(&name);

        let mut best: Option<(EmployeeId, f64)> = None;
        for candidate in candidates {
            let full_name = candidate
                .usable_name()
                .ok_or(LicenseMatchingError::IncompleteEmployee(candidate.id))?
                .to_lowercase();

            let score = name_variants
                .iter()
                .flat_map(|variant| {
                    candidate_variants(&full_name)
                        .into_iter()
                        .map(move |target| self.algorithm.ratio(variant, &target))
                })
                .fold(0.0_f64, f64::max);

            if score > best.map_or(0.0, |(_, s)| s) {
                best = Some((candidate.id, score));
            }
        }

        Ok(best.map(|(employee_id, similarity)| FuzzyCandidate {
            employee_id,
            similarity,
            confidence: similarity * FUZZY_CONFIDENCE_CAP,
        }))
    }
}

/// The derived name plus its reversal when it has exactly two words.
fn name_variants(name: &str) -> Vec<String> {
    let words: Vec<&str> = name.split_whitespace().collect();
    let mut variants = vec![name.to_string()];
    if let [first, last] = words.as_slice() {
        variants.push(format!("{last} {first}"));
    }
    variants
}

/// Full name plus "first last" and "last first" reductions.
fn candidate_variants(full_name: &str) -> Vec<String> {
    let words: Vec<&str> = full_name.split_whitespace().collect();
    let mut variants = vec![words.join(" ")];
    if let (Some(first), Some(last)) = (words.first(), words.last()) {
        if words.len() >= 2 {
            variants.push(format!("{first} {last}"));
            variants.push(format!("{last} {first}"));
        }
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(name: &str) -> Employee {
        Employee::new(EmployeeId::new(), "x@co.com", name)
    }

    fn approx(actual: f64, expected: f64) -> bool {
        (actual - expected).abs() < 1e-9
    }

    fn best(identifier: &str, candidates: &[&Employee]) -> FuzzyCandidate {
        let matcher = FuzzyNameMatcher::default();
        matcher.score(identifier, candidates).unwrap().unwrap()
    }

    #[test]
    fn test_ratcliff_obershelp_known_values() {
        let algo = SimilarityAlgorithm::RatcliffObershelp;
        assert!(approx(algo.ratio("john doe", "john doe"), 1.0));
        // " doe" + "j" = 5 matching chars: 10 / 13
        assert!(approx(algo.ratio("j doe", "john doe"), 10.0 / 13.0));
        // Classic example: "WIKIMEDIA" vs "WIKIMANIA" -> 2*7/18
        assert!(approx(algo.ratio("wikimedia", "wikimania"), 14.0 / 18.0));
        assert!(approx(algo.ratio("abc", "xyz"), 0.0));
    }

    #[test]
    fn test_ratio_empty_strings() {
        for algo in [
            SimilarityAlgorithm::RatcliffObershelp,
            SimilarityAlgorithm::JaroWinkler,
            SimilarityAlgorithm::Levenshtein,
        ] {
            assert!(approx(algo.ratio("", ""), 1.0));
            assert!(approx(algo.ratio("", "john"), 0.0));
        }
    }

    #[test]
    fn test_strsim_algorithms() {
        let jaro = SimilarityAlgorithm::JaroWinkler.ratio("jon smith", "john smith");
        assert!(jaro > 0.9);
        let lev = SimilarityAlgorithm::Levenshtein.ratio("kitten", "sitting");
        assert!(approx(lev, 1.0 - 3.0 / 7.0));
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!(
            "Jaro_Winkler".parse::<SimilarityAlgorithm>().unwrap(),
            SimilarityAlgorithm::JaroWinkler
        );
        assert!("soundex".parse::<SimilarityAlgorithm>().is_err());
    }

    #[test]
    fn test_extract_name() {
        assert_eq!(extract_name("john.doe@co.com").as_deref(), Some("john doe"));
        assert_eq!(extract_name("J_Doe-42@x.io").as_deref(), Some("j doe"));
        assert_eq!(
            extract_name("mary.ann.smith").as_deref(),
            Some("mary ann smith")
        );
        assert_eq!(extract_name("12345@x.io"), None);
        assert_eq!(extract_name("._-@x.io"), None);
        assert_eq!(extract_name(""), None);
    }

    #[test]
    fn test_score_prefers_closest_name() {
        let john = employee("John Doe");
        let jane = employee("Jane Roe");

        let top = best("john.doe@partner.io", &[&jane, &john]);
        assert_eq!(top.employee_id, john.id);
        assert!(approx(top.similarity, 1.0));
        assert!(approx(top.confidence, FUZZY_CONFIDENCE_CAP));
    }

    #[test]
    fn test_score_handles_reversed_and_middle_names() {
        let reversed = employee("John Doe");
        assert!(approx(best("doe.john@x.io", &[&reversed]).similarity, 1.0));

        let middle = employee("John Quincy Doe");
        assert!(approx(best("john.doe@x.io", &[&middle]).similarity, 1.0));
        assert!(approx(best("doe_john@x.io", &[&middle]).similarity, 1.0));
    }

    #[test]
    fn test_score_ties_keep_first_candidate() {
        let first = employee("Alex Kim");
        let second = employee("Alex Kim");

        let top = best("alex.kim@x.io", &[&first, &second]);
        assert_eq!(top.employee_id, first.id);

        let top = best("alex.kim@x.io", &[&second, &first]);
        assert_eq!(top.employee_id, second.id);
    }

    #[test]
    fn test_score_with_other_algorithms() {
        let john = employee("John Doe");
        let jane = employee("Jane Roe");
        for algorithm in [
            SimilarityAlgorithm::JaroWinkler,
            SimilarityAlgorithm::Levenshtein,
        ] {
            let matcher = FuzzyNameMatcher::new(algorithm);
            let scored = matcher.score("doe.john@x.io", &[&jane, &john]).unwrap();
            assert_eq!(scored.map(|b| b.employee_id), Some(john.id), "{algorithm}");
        }
    }

    #[test]
    fn test_score_without_name_or_candidates() {
        let matcher = FuzzyNameMatcher::default();
        let john = employee("John Doe");
        assert!(matcher.score("1234@x.io", &[&john]).unwrap().is_none());
        assert!(matcher.score("john.doe@x.io", &[]).unwrap().is_none());
    }

    #[test]
    fn test_score_rejects_nameless_candidate() {
        let matcher = FuzzyNameMatcher::default();
        let mut ghost = employee("");
        ghost.full_name = None;

        match matcher.score("john.doe@x.io", &[&ghost]) {
            Err(LicenseMatchingError::IncompleteEmployee(id)) => assert_eq!(id, ghost.id),
            other => panic!("expected IncompleteEmployee, got {other:?}"),
        }
    }
}
