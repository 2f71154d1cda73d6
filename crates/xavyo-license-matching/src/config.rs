//! Configuration for the matching engine.

use crate::fuzzy::SimilarityAlgorithm;

/// Environment variable holding the comma separated company domains.
pub const COMPANY_DOMAINS_VAR: &str = "LICENSE_MATCH_COMPANY_DOMAINS";

/// Environment variable selecting the name similarity algorithm.
pub const SIMILARITY_VAR: &str = "LICENSE_MATCH_SIMILARITY";

/// Configuration for a matching run.
///
/// Thresholds are deliberately not configurable; see [`crate::cascade`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchingConfig {
    /// Lowercase domains owned by the company. Empty means every identifier
    /// is treated as external.
    pub company_domains: Vec<String>,

    /// Ratio used to compare derived names against employee names.
    pub similarity: SimilarityAlgorithm,
}

impl MatchingConfig {
    /// Create a configuration for the given company domains.
    pub fn new<I, S>(company_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            company_domains: company_domains
                .into_iter()
                .filter_map(|d| normalize_domain(d.as_ref()))
                .collect(),
            similarity: SimilarityAlgorithm::default(),
        }
    }

    /// Override the similarity algorithm.
    #[must_use]
    pub fn with_similarity(mut self, similarity: SimilarityAlgorithm) -> Self {
        self.similarity = similarity;
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// This allows tests to supply variables without mutating process-global
    /// environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let company_domains = reader(COMPANY_DOMAINS_VAR)
            .map(|raw| raw.split(',').filter_map(normalize_domain).collect())
            .unwrap_or_default();

        let similarity = match reader(SIMILARITY_VAR) {
            Ok(raw) => raw
                .parse::<SimilarityAlgorithm>()
                .map_err(|e| ConfigError::InvalidValue(SIMILARITY_VAR.into(), e))?,
            Err(_) => SimilarityAlgorithm::default(),
        };

        Ok(Self {
            company_domains,
            similarity,
        })
    }
}

/// Trim, lowercase and strip a leading "@" or "." from a configured domain.
fn normalize_domain(raw: &str) -> Option<String> {
    let domain = raw
        .trim()
        .trim_start_matches(|c: char| c == '@' || c == '.')
        .to_lowercase();
    (!domain.is_empty()).then_some(domain)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env::VarError;

    /// Create a reader closure from a HashMap (no global env mutation).
    fn make_reader(vars: HashMap<&str, &str>) -> impl Fn(&str) -> Result<String, VarError> {
        let owned: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| owned.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[test]
    fn test_defaults() {
        let config = MatchingConfig::from_reader(make_reader(HashMap::new())).unwrap();
        assert!(config.company_domains.is_empty());
        assert_eq!(config.similarity, SimilarityAlgorithm::RatcliffObershelp);
    }

    #[test]
    fn test_domains_are_normalized() {
        let mut vars = HashMap::new();
        vars.insert(COMPANY_DOMAINS_VAR, " Acme.com, @acme.io,, .corp.acme.net");

        let config = MatchingConfig::from_reader(make_reader(vars)).unwrap();
        assert_eq!(
            config.company_domains,
            vec!["acme.com", "acme.io", "corp.acme.net"]
        );
    }

    #[test]
    fn test_similarity_selection() {
        let vars = HashMap::from([(SIMILARITY_VAR, "jaro_winkler")]);
        let config = MatchingConfig::from_reader(make_reader(vars)).unwrap();
        assert_eq!(config.similarity, SimilarityAlgorithm::JaroWinkler);
    }

    #[test]
    fn test_invalid_similarity() {
        let vars = HashMap::from([(SIMILARITY_VAR, "soundex")]);
        let err = MatchingConfig::from_reader(make_reader(vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_, _)));
        assert!(err.to_string().contains(SIMILARITY_VAR));
    }

    #[test]
    fn test_new_normalizes_domains() {
        let config = MatchingConfig::new(["CO.com", "  "]);
        assert_eq!(config.company_domains, vec!["co.com"]);
    }
}
