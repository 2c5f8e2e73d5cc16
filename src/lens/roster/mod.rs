//! Roster lens
//!
//! This module provides the roster lens for browsing departments and their
//! employees. It combines both mappers with the flat row types used for output.

pub mod types;

pub use types::{DepartmentDetail, DepartmentSummary, EmployeeRow};

use crate::database::{CompanyDatabase, Department, Employee, Shared};
use anyhow::Result;
use std::collections::HashMap;

/// Roster lens over a staff database
///
/// This lens provides high-level operations for:
/// - Listing departments with their headcount
/// - Showing one department with its employees
/// - Listing employees with their department names
pub struct RosterLens<'a> {
    db: &'a CompanyDatabase,
}

impl<'a> RosterLens<'a> {
    /// Create a new roster lens
    pub fn new(db: &'a CompanyDatabase) -> Self {
        Self { db }
    }

    /// Resolve a department from a primary key or, failing that, a name
    pub fn resolve_department(&self, key: &str) -> Result<Option<Shared<Department>>> {
        if let Ok(id) = key.parse::<i64>() {
            if let Some(department) = self.db.departments().find_by_id(id)? {
                return Ok(Some(department));
            }
        }
        self.db.departments().find_by_name(key)
    }

    /// Resolve an employee from a primary key or, failing that, a name
    pub fn resolve_employee(&self, key: &str) -> Result<Option<Shared<Employee>>> {
        if let Ok(id) = key.parse::<i64>() {
            if let Some(employee) = self.db.employees().find_by_id(id)? {
                return Ok(Some(employee));
            }
        }
        self.db.employees().find_by_name(key)
    }

    /// Employee row for one employee, with its department name
    pub fn employee_row(&self, employee: &Employee) -> Result<EmployeeRow> {
        let department = self.db.employee_department(employee)?;
        let department = department.as_ref().map(|d| d.borrow());
        let row = EmployeeRow::new(employee, department.as_deref());
        Ok(row)
    }

    /// Every department with its employee count, ordered by id
    pub fn departments(&self) -> Result<Vec<DepartmentSummary>> {
        let mut summaries = Vec::new();
        for department in self.db.departments().get_all()? {
            let department = department.borrow();
            let headcount = self.db.department_employees(&department)?.len();
            summaries.push(DepartmentSummary::new(&department, headcount));
        }
        summaries.sort_by_key(|s| s.id);
        Ok(summaries)
    }

    /// A department and its employees, ordered by employee id
    pub fn department_detail(&self, key: &str) -> Result<Option<DepartmentDetail>> {
        let department = match self.resolve_department(key)? {
            Some(department) => department,
            None => return Ok(None),
        };
        let department = department.borrow();

        let mut employees: Vec<EmployeeRow> = self
            .db
            .department_employees(&department)?
            .iter()
            .map(|employee| EmployeeRow::new(&employee.borrow(), Some(&*department)))
            .collect();
        employees.sort_by_key(|e| e.id);

        Ok(Some(DepartmentDetail {
            department: DepartmentSummary::new(&department, employees.len()),
            employees,
        }))
    }

    /// Every employee with its department name, ordered by id
    pub fn employees(&self) -> Result<Vec<EmployeeRow>> {
        let departments: HashMap<i64, Shared<Department>> = self
            .db
            .departments()
            .get_all()?
            .into_iter()
            .filter_map(|d| {
                let id = d.borrow().id;
                id.map(|id| (id, d))
            })
            .collect();

        let mut rows: Vec<EmployeeRow> = self
            .db
            .employees()
            .get_all()?
            .iter()
            .map(|employee| {
                let employee = employee.borrow();
                let department = departments
                    .get(&employee.department_id)
                    .map(|d| d.borrow());
                EmployeeRow::new(&employee, department.as_deref())
            })
            .collect();
        rows.sort_by_key(|r| r.id);
        Ok(rows)
    }
}
