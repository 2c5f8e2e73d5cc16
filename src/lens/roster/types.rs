//! Roster lens types
//!
//! Flat, serializable rows built from the mapped entities for display.

use crate::database::{Department, Employee};
use crate::lens::utils::{truncate_name, DEFAULT_NAME_MAX_LEN};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// A department with its current headcount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct DepartmentSummary {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub employees: usize,
}

impl DepartmentSummary {
    pub fn new(department: &Department, employees: usize) -> Self {
        Self {
            id: department.id.unwrap_or_default(),
            name: department.name.clone(),
            location: department.location.clone(),
            employees,
        }
    }
}

/// An employee joined with the name of its department
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct EmployeeRow {
    pub id: i64,
    pub name: String,
    pub job_title: String,
    pub department_id: i64,
    pub department: String,
}

impl EmployeeRow {
    pub fn new(employee: &Employee, department: Option<&Department>) -> Self {
        Self {
            id: employee.id.unwrap_or_default(),
            name: employee.name.clone(),
            job_title: employee.job_title.clone(),
            department_id: employee.department_id,
            department: department.map(|d| d.name.clone()).unwrap_or_default(),
        }
    }

    /// Copy with long text columns shortened for table output
    pub fn truncated(&self) -> Self {
        Self {
            name: truncate_name(&self.name, DEFAULT_NAME_MAX_LEN),
            job_title: truncate_name(&self.job_title, DEFAULT_NAME_MAX_LEN),
            department: truncate_name(&self.department, DEFAULT_NAME_MAX_LEN),
            ..self.clone()
        }
    }
}

/// A department together with every employee referencing it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentDetail {
    pub department: DepartmentSummary,
    pub employees: Vec<EmployeeRow>,
}
