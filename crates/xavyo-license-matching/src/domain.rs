//! Company domain classification for license identifiers.

/// Decide whether `identifier` belongs outside the company.
///
/// An identifier without "@" cannot be verified as a company address and is
/// always external. Otherwise the domain after the last "@" is internal when
/// it equals, or is a dot-boundary subdomain of, one of `company_domains`
/// (case-insensitive). An empty domain list classifies everything external.
pub fn is_external<S: AsRef<str>>(identifier: &str, company_domains: &[S]) -> bool {
    let Some(domain) = domain_part(identifier) else {
        return true;
    };
    let domain = domain.trim().to_lowercase();

    !company_domains.iter().any(|company| {
        let company = company.as_ref().trim().to_lowercase();
        !company.is_empty()
            && (domain == company
                || domain
                    .strip_suffix(company.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.')))
    })
}

/// Substring before the first "@", if the identifier has one.
#[must_use]
pub fn local_part(identifier: &str) -> Option<&str> {
    identifier.split_once('@').map(|(local, _)| local)
}

/// Substring after the last "@", if the identifier has one.
#[must_use]
pub fn domain_part(identifier: &str) -> Option<&str> {
    identifier.rsplit_once('@').map(|(_, domain)| domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAINS: [&str; 1] = ["co.com"];

    #[test]
    fn test_no_at_sign_is_external() {
        assert!(is_external("jdoe", &DOMAINS));
        assert!(is_external("", &DOMAINS));
        assert!(is_external("co.com", &DOMAINS));
    }

    #[test]
    fn test_company_domain_is_internal() {
        assert!(!is_external("john.doe@co.com", &DOMAINS));
        assert!(!is_external("John.Doe@CO.COM", &DOMAINS));
    }

    #[test]
    fn test_subdomain_is_internal() {
        assert!(!is_external("ops@eu.co.com", &DOMAINS));
        assert!(!is_external("ops@a.b.co.com", &DOMAINS));
    }

    #[test]
    fn test_suffix_without_dot_boundary_is_external() {
        assert!(is_external("ops@otherco.com", &DOMAINS));
        assert!(is_external("ops@co.com.evil.io", &DOMAINS));
    }

    #[test]
    fn test_empty_domain_list_is_external() {
        let none: [&str; 0] = [];
        assert!(is_external("john.doe@co.com", &none));
    }

    #[test]
    fn test_multiple_at_signs() {
        assert!(!is_external("weird@name@co.com", &DOMAINS));
        assert_eq!(local_part("weird@name@co.com"), Some("weird"));
        assert_eq!(domain_part("weird@name@co.com"), Some("co.com"));
    }

    #[test]
    fn test_parts_without_at_sign() {
        assert_eq!(local_part("jdoe"), None);
        assert_eq!(domain_part("jdoe"), None);
    }
}
