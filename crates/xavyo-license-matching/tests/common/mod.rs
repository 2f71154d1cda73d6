//! Shared fixtures for xavyo-license-matching integration tests.
//!
//! Everything is in memory; each test builds its own roster and stores.

#![allow(dead_code)]

use std::sync::Arc;

use xavyo_license_matching::{
    Employee, EmployeeId, InMemoryEmployeeDirectory, InMemoryLicenseRecordStore, LicenseId,
    LicenseRecord, ReviewService,
};

pub const COMPANY_DOMAINS: [&str; 1] = ["co.com"];

/// The single-employee roster used by the reference scenarios.
pub fn john_doe() -> Employee {
    let employee = Employee::new(EmployeeId::new(), "john.doe@co.com", "John Doe");
    employee.with_department("Engineering")
}

/// A small roster with shared local parts and reversed names.
pub fn roster() -> Vec<Employee> {
    vec![
        john_doe(),
        Employee::new(EmployeeId::new(), "Maria.Garcia@co.com", "Maria Garcia"),
        Employee::new(EmployeeId::new(), "a.chen@co.com", "Alice Chen"),
        Employee::new(EmployeeId::new(), "a.chen@labs.co.com", "Arthur Chen"),
        Employee::new(EmployeeId::new(), "wei.zhang@co.com", "Zhang Wei"),
        Employee::new(EmployeeId::new(), "ops@co.com", "Operations Desk"),
    ]
}

pub fn license(identifier: &str) -> LicenseRecord {
    LicenseRecord::new(LicenseId::new(), identifier)
}

/// Review stores seeded with records and a roster.
pub struct ReviewContext {
    pub records: Arc<InMemoryLicenseRecordStore>,
    pub service: ReviewService,
}

impl ReviewContext {
    pub fn new(records: Vec<LicenseRecord>, employees: Vec<Employee>) -> Self {
        let records = Arc::new(InMemoryLicenseRecordStore::with_records(records));
        let directory = Arc::new(InMemoryEmployeeDirectory::new(employees));
        let service = ReviewService::new(records.clone(), directory);
        Self { records, service }
    }
}
