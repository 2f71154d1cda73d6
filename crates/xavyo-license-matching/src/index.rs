//! Candidate index over an employee roster snapshot.
//!
//! Built once per matching run in a single pass and never mutated
//! afterwards, so every identifier in the run is resolved with hash lookups
//! instead of a roster scan. The index is a plain value: each run owns its
//! own snapshot, and nothing about it is shared between runs.

use std::collections::HashMap;

use crate::domain::local_part;
use crate::types::Employee;

/// Lookup structures for one matching run.
#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    employees: Vec<Employee>,
    /// Lowercased email -> position in `employees`.
    exact: HashMap<String, usize>,
    /// Lowercased local part -> positions, in roster order.
    local_part: HashMap<String, Vec<usize>>,
    /// Positions of employees with a usable full name, in roster order.
    fuzzy_pool: Vec<usize>,
}

impl CandidateIndex {
    /// Build the index from a roster.
    ///
    /// Duplicate emails resolve to the later employee for exact lookups;
    /// both remain local-part candidates.
    pub fn build(roster: &[Employee]) -> Self {
        let mut index = Self {
            employees: Vec::with_capacity(roster.len()),
            exact: HashMap::with_capacity(roster.len()),
            local_part: HashMap::new(),
            fuzzy_pool: Vec::with_capacity(roster.len()),
        };
        let mut nameless = 0usize;

        for employee in roster {
            let email = employee.email.trim().to_lowercase();
            if email.is_empty() {
                tracing::warn!(employee_id = %employee.id, "Employee has no email, skipping");
                continue;
            }

            let position = index.employees.len();
            index.employees.push(employee.clone());

            if let Some(previous) = index.exact.insert(email.clone(), position) {
                tracing::warn!(
                    email = %email,
                    replaced = %index.employees[previous].id,
                    employee_id = %employee.id,
                    "Duplicate employee email in roster, later entry wins"
                );
            }

            if let Some(local) = local_part(&email) {
                index
                    .local_part
                    .entry(local.to_string())
                    .or_default()
                    .push(position);
            }

            if employee.usable_name().is_some() {
                index.fuzzy_pool.push(position);
            } else {
                nameless += 1;
            }
        }

        if nameless > 0 {
            tracing::warn!(
                count = nameless,
                "Employees without a full name excluded from fuzzy matching"
            );
        }

        tracing::debug!(
            employees = index.employees.len(),
            emails = index.exact.len(),
            local_parts = index.local_part.len(),
            "Candidate index built"
        );

        index
    }

    /// Employee whose email equals `email`, ignoring case.
    #[must_use]
    pub fn exact(&self, email: &str) -> Option<&Employee> {
        self.exact
            .get(&email.trim().to_lowercase())
            .map(|&i| &self.employees[i])
    }

    /// Employees sharing the local part `local`, ignoring case, in roster order.
    #[must_use]
    pub fn by_local_part(&self, local: &str) -> Vec<&Employee> {
        self.local_part
            .get(&local.to_lowercase())
            .map(|positions| positions.iter().map(|&i| &self.employees[i]).collect())
            .unwrap_or_default()
    }

    /// Fallback pool for fuzzy matching against the whole roster.
    #[must_use]
    pub fn fuzzy_pool(&self) -> Vec<&Employee> {
        self.fuzzy_pool
            .iter()
            .map(|&i| &self.employees[i])
            .collect()
    }

    /// Number of indexed employees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Whether the roster was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmployeeId;

    fn employee(email: &str, name: &str) -> Employee {
        Employee::new(EmployeeId::new(), email, name)
    }

    #[test]
    fn test_exact_lookup_is_case_insensitive() {
        let roster = vec![employee("John.Doe@Co.com", "John Doe")];
        let index = CandidateIndex::build(&roster);

        assert_eq!(index.exact("john.doe@co.com").unwrap().id, roster[0].id);
        assert_eq!(index.exact("JOHN.DOE@CO.COM").unwrap().id, roster[0].id);
        assert!(index.exact("jane@co.com").is_none());
    }

    #[test]
    fn test_duplicate_email_later_wins() {
        let roster = vec![
            employee("dup@co.com", "First Entry"),
            employee("DUP@co.com", "Second Entry"),
        ];
        let index = CandidateIndex::build(&roster);

        assert_eq!(index.exact("dup@co.com").unwrap().id, roster[1].id);
        assert_eq!(index.by_local_part("dup").len(), 2);
    }

    #[test]
    fn test_local_part_groups_in_roster_order() {
        let roster = vec![
            employee("sam@co.com", "Sam Smith"),
            employee("alex@co.com", "Alex Jones"),
            employee("sam@eu.co.com", "Samantha Stone"),
        ];
        let index = CandidateIndex::build(&roster);

        let sams = index.by_local_part("SAM");
        assert_eq!(sams.len(), 2);
        assert_eq!(sams[0].id, roster[0].id);
        assert_eq!(sams[1].id, roster[2].id);
        assert!(index.by_local_part("nobody").is_empty());
    }

    #[test]
    fn test_fuzzy_pool_excludes_nameless() {
        let mut nameless = employee("ghost@co.com", "");
        nameless.full_name = None;
        let roster = vec![employee("a@co.com", "Ann Lee"), nameless.clone()];
        let index = CandidateIndex::build(&roster);

        assert_eq!(index.len(), 2);
        let pool = index.fuzzy_pool();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id, roster[0].id);
        // Still reachable through the exact and local-part indexes.
        assert_eq!(index.exact("ghost@co.com").unwrap().id, nameless.id);
        assert_eq!(index.by_local_part("ghost").len(), 1);
    }

    #[test]
    fn test_blank_email_skipped() {
        let roster = vec![employee("  ", "No Email")];
        let index = CandidateIndex::build(&roster);
        assert!(index.is_empty());
        assert!(index.fuzzy_pool().is_empty());
    }
}
