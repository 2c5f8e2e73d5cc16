//! Employee mapper
//!
//! Maps rows of the `employees` table to [`Employee`] entities. Employee is
//! the owning side of the department relationship: every insert and update
//! carries the `department_id` foreign key.

use std::fmt;

use anyhow::{anyhow, Result};
use rusqlite::types::Type;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::entity::{shared, write, DepartmentLookup, EmployeeLookup, Entity, Shared};
use super::identity_map::IdentityMap;
use super::Department;
use crate::database::core::{DatabaseConn, SchemaDefinitions};

const SELECT_EMPLOYEES: &str = "SELECT id, name, job_title, department_id FROM employees";

/// A row of the `employees` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Option<i64>,
    pub name: String,
    pub job_title: String,
    /// Primary key of the department this employee belongs to
    pub department_id: i64,
}

impl Employee {
    /// Create an unpersisted employee
    pub fn new(name: impl Into<String>, job_title: impl Into<String>, department_id: i64) -> Self {
        Self {
            id: None,
            name: name.into(),
            job_title: job_title.into(),
            department_id,
        }
    }
}

impl Entity for Employee {
    const TABLE: &'static str = "employees";
    const KIND: &'static str = "Employee";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    /// A NULL `department_id` is accepted by the column but is not a valid
    /// employee, so it fails the conversion with an error naming the row.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let id: Option<i64> = row.get(0)?;
        let department_id = row.get::<_, Option<i64>>(3)?.ok_or_else(|| {
            let id = id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "None".to_string());
            rusqlite::Error::FromSqlConversionFailure(
                3,
                Type::Null,
                format!("employee {} has no department", id).into(),
            )
        })?;

        Ok(Employee {
            id,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            job_title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            department_id,
        })
    }
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "None".to_string());
        write!(
            f,
            "<Employee {}: {}, {}, Department ID: {}>",
            id, self.name, self.job_title, self.department_id
        )
    }
}

/// Repository for employee rows
pub struct EmployeeRepository<'a> {
    db: &'a DatabaseConn,
    identity_map: &'a IdentityMap<Employee>,
}

impl<'a> EmployeeRepository<'a> {
    /// Create a new employee repository
    pub fn new(db: &'a DatabaseConn, identity_map: &'a IdentityMap<Employee>) -> Self {
        Self { db, identity_map }
    }

    /// Create the `employees` table if it does not exist
    pub fn create_table(&self) -> Result<()> {
        self.db
            .execute(SchemaDefinitions::EMPLOYEES_TABLE)
            .map_err(|e| anyhow!("Failed to create employees table: {}", e))?;
        Ok(())
    }

    /// Drop the `employees` table if it exists
    pub fn drop_table(&self) -> Result<()> {
        self.db
            .execute(SchemaDefinitions::DROP_EMPLOYEES_TABLE)
            .map_err(|e| anyhow!("Failed to drop employees table: {}", e))?;
        self.identity_map.clear();
        info!("Dropped employees table");
        Ok(())
    }

    /// Check if the employees table has no rows
    pub fn is_empty(&self) -> bool {
        self.count().map(|c| c == 0).unwrap_or(true)
    }

    /// Get the number of employee rows
    pub fn count(&self) -> Result<u64> {
        self.db.table_count(Employee::TABLE)
    }

    /// Construct an employee of the given department and persist it
    pub fn create(
        &self,
        name: &str,
        job_title: &str,
        department_id: i64,
    ) -> Result<Shared<Employee>> {
        let employee = shared(Employee::new(name, job_title, department_id));
        self.save(&employee)?;
        Ok(employee)
    }

    /// Insert a new row for an unpersisted employee and assign its id
    ///
    /// Fails if `department_id` does not name an existing department.
    pub fn save(&self, employee: &Shared<Employee>) -> Result<()> {
        let id = {
            let mut current = write(employee)?;
            if let Some(id) = current.id {
                return Err(anyhow!("Employee {} is already persisted", id));
            }
            let id = self
                .db
                .insert(
                    "INSERT INTO employees (name, job_title, department_id) VALUES (?1, ?2, ?3)",
                    params![current.name, current.job_title, current.department_id],
                )
                .map_err(|e| anyhow!("Failed to save employee '{}': {}", current.name, e))?;
            current.id = Some(id);
            id
        };

        self.identity_map.register(employee)?;
        debug!("Inserted employee {}", id);
        Ok(())
    }

    /// Overwrite the row of a persisted employee, department reference included
    pub fn update(&self, employee: &Employee) -> Result<()> {
        let id = employee.persisted_id()?;
        let changed = self
            .db
            .execute_with_params(
                "UPDATE employees SET name = ?1, job_title = ?2, department_id = ?3 WHERE id = ?4",
                params![employee.name, employee.job_title, employee.department_id, id],
            )
            .map_err(|e| anyhow!("Failed to update employee {}: {}", id, e))?;

        if changed == 0 {
            debug!("Update of employee {} matched no row", id);
        }
        Ok(())
    }

    /// Delete the row of a persisted employee and clear its id
    pub fn delete(&self, employee: &Shared<Employee>) -> Result<()> {
        let mut current = write(employee)?;
        let id = current.persisted_id()?;
        let changed = self
            .db
            .execute_with_params("DELETE FROM employees WHERE id = ?1", [id])
            .map_err(|e| anyhow!("Failed to delete employee {}: {}", id, e))?;

        if changed == 0 {
            debug!("Delete of employee {} matched no row", id);
        }

        self.identity_map.evict(id);
        current.id = None;
        Ok(())
    }

    /// Every employee row
    pub fn get_all(&self) -> Result<Vec<Shared<Employee>>> {
        self.reconcile_all(self.db.query_all(SELECT_EMPLOYEES, [], Employee::from_row)?)
    }

    /// Employee with the given primary key
    pub fn find_by_id(&self, id: i64) -> Result<Option<Shared<Employee>>> {
        self.db
            .query_one(
                &format!("{} WHERE id = ?1", SELECT_EMPLOYEES),
                [id],
                Employee::from_row,
            )?
            .map(|employee| self.identity_map.reconcile(employee))
            .transpose()
    }

    /// First employee with the given name
    pub fn find_by_name(&self, name: &str) -> Result<Option<Shared<Employee>>> {
        self.db
            .query_one(
                &format!("{} WHERE name IS ?1 ORDER BY id LIMIT 1", SELECT_EMPLOYEES),
                [name],
                Employee::from_row,
            )?
            .map(|employee| self.identity_map.reconcile(employee))
            .transpose()
    }

    /// Employees referencing the given department
    pub fn find_by_department(&self, department_id: i64) -> Result<Vec<Shared<Employee>>> {
        let rows = self.db.query_all(
            &format!("{} WHERE department_id = ?1", SELECT_EMPLOYEES),
            [department_id],
            Employee::from_row,
        )?;
        self.reconcile_all(rows)
    }

    /// Resolve the stored foreign key to the employee's department
    ///
    /// Returns `None` for a dangling reference, which the foreign key
    /// constraint normally rules out.
    pub fn department(
        &self,
        employee: &Employee,
        departments: &impl DepartmentLookup,
    ) -> Result<Option<Shared<Department>>> {
        departments.find_department(employee.department_id)
    }

    fn reconcile_all(&self, rows: Vec<Employee>) -> Result<Vec<Shared<Employee>>> {
        rows.into_iter()
            .map(|employee| self.identity_map.reconcile(employee))
            .collect()
    }
}

impl EmployeeLookup for EmployeeRepository<'_> {
    fn find_by_department(&self, department_id: i64) -> Result<Vec<Shared<Employee>>> {
        EmployeeRepository::find_by_department(self, department_id)
    }
}
