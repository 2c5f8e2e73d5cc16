//! Department mapper
//!
//! Maps rows of the `departments` table to [`Department`] entities. A
//! department never stores its employees; [`DepartmentRepository::list_employees`]
//! recomputes them from the `employees` table on every call.

use std::fmt;

use anyhow::{anyhow, Result};
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::entity::{shared, write, DepartmentLookup, EmployeeLookup, Entity, Shared};
use super::identity_map::IdentityMap;
use super::Employee;
use crate::database::core::{DatabaseConn, SchemaDefinitions};

const SELECT_DEPARTMENTS: &str = "SELECT id, name, location FROM departments";

/// A row of the `departments` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: Option<i64>,
    pub name: String,
    pub location: String,
}

impl Department {
    /// Create an unpersisted department
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            location: location.into(),
        }
    }
}

impl Entity for Department {
    const TABLE: &'static str = "departments";
    const KIND: &'static str = "Department";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Department {
            id: row.get(0)?,
            name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            location: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        })
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Department {}: {}, {}>", id, self.name, self.location),
            None => write!(f, "<Department None: {}, {}>", self.name, self.location),
        }
    }
}

/// Repository for department rows
///
/// Every mutating call is a single autocommitted statement.
pub struct DepartmentRepository<'a> {
    db: &'a DatabaseConn,
    identity_map: &'a IdentityMap<Department>,
}

impl<'a> DepartmentRepository<'a> {
    /// Create a new department repository
    pub fn new(db: &'a DatabaseConn, identity_map: &'a IdentityMap<Department>) -> Self {
        Self { db, identity_map }
    }

    /// Create the `departments` table if it does not exist
    pub fn create_table(&self) -> Result<()> {
        self.db
            .execute(SchemaDefinitions::DEPARTMENTS_TABLE)
            .map_err(|e| anyhow!("Failed to create departments table: {}", e))?;
        Ok(())
    }

    /// Drop the `departments` table if it exists
    pub fn drop_table(&self) -> Result<()> {
        self.db
            .execute(SchemaDefinitions::DROP_DEPARTMENTS_TABLE)
            .map_err(|e| anyhow!("Failed to drop departments table: {}", e))?;
        self.identity_map.clear();
        info!("Dropped departments table");
        Ok(())
    }

    /// Check if the departments table has no rows
    pub fn is_empty(&self) -> bool {
        self.count().map(|c| c == 0).unwrap_or(true)
    }

    /// Get the number of department rows
    pub fn count(&self) -> Result<u64> {
        self.db.table_count(Department::TABLE)
    }

    /// Construct a department and persist it
    pub fn create(&self, name: &str, location: &str) -> Result<Shared<Department>> {
        let department = shared(Department::new(name, location));
        self.save(&department)?;
        Ok(department)
    }

    /// Insert a new row for an unpersisted department and assign its id
    pub fn save(&self, department: &Shared<Department>) -> Result<()> {
        let id = {
            let mut current = write(department)?;
            if let Some(id) = current.id {
                return Err(anyhow!("Department {} is already persisted", id));
            }
            let id = self
                .db
                .insert(
                    "INSERT INTO departments (name, location) VALUES (?1, ?2)",
                    params![current.name, current.location],
                )
                .map_err(|e| anyhow!("Failed to save department '{}': {}", current.name, e))?;
            current.id = Some(id);
            id
        };

        self.identity_map.register(department)?;
        debug!("Inserted department {}", id);
        Ok(())
    }

    /// Overwrite the row of a persisted department with its current fields
    pub fn update(&self, department: &Department) -> Result<()> {
        let id = department.persisted_id()?;
        let changed = self
            .db
            .execute_with_params(
                "UPDATE departments SET name = ?1, location = ?2 WHERE id = ?3",
                params![department.name, department.location, id],
            )
            .map_err(|e| anyhow!("Failed to update department {}: {}", id, e))?;

        if changed == 0 {
            debug!("Update of department {} matched no row", id);
        }
        Ok(())
    }

    /// Delete the row of a persisted department and clear its id
    ///
    /// Fails while employees still reference the department.
    pub fn delete(&self, department: &Shared<Department>) -> Result<()> {
        let mut current = write(department)?;
        let id = current.persisted_id()?;
        let changed = self
            .db
            .execute_with_params("DELETE FROM departments WHERE id = ?1", [id])
            .map_err(|e| anyhow!("Failed to delete department {}: {}", id, e))?;

        if changed == 0 {
            debug!("Delete of department {} matched no row", id);
        }

        self.identity_map.evict(id);
        current.id = None;
        Ok(())
    }

    /// Every department row
    pub fn get_all(&self) -> Result<Vec<Shared<Department>>> {
        self.db
            .query_all(SELECT_DEPARTMENTS, [], Department::from_row)?
            .into_iter()
            .map(|department| self.identity_map.reconcile(department))
            .collect()
    }

    /// Department with the given primary key
    pub fn find_by_id(&self, id: i64) -> Result<Option<Shared<Department>>> {
        self.db
            .query_one(
                &format!("{} WHERE id = ?1", SELECT_DEPARTMENTS),
                [id],
                Department::from_row,
            )?
            .map(|department| self.identity_map.reconcile(department))
            .transpose()
    }

    /// First department with the given name
    pub fn find_by_name(&self, name: &str) -> Result<Option<Shared<Department>>> {
        self.db
            .query_one(
                &format!("{} WHERE name IS ?1 ORDER BY id LIMIT 1", SELECT_DEPARTMENTS),
                [name],
                Department::from_row,
            )?
            .map(|department| self.identity_map.reconcile(department))
            .transpose()
    }

    /// Employees whose department reference is this department
    ///
    /// Recomputed on every call; an unpersisted department has no employees.
    pub fn list_employees(
        &self,
        department: &Department,
        employees: &impl EmployeeLookup,
    ) -> Result<Vec<Shared<Employee>>> {
        match department.id {
            Some(id) => employees.find_by_department(id),
            None => Ok(Vec::new()),
        }
    }
}

impl DepartmentLookup for DepartmentRepository<'_> {
    fn find_department(&self, department_id: i64) -> Result<Option<Shared<Department>>> {
        self.find_by_id(department_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::company::CompanyDatabase;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup_test_db() -> CompanyDatabase {
        CompanyDatabase::open_in_memory().unwrap()
    }

    #[test]
    fn test_create_and_find_by_id() {
        let db = setup_test_db();
        let repo = db.departments();

        let payroll = repo.create("Payroll", "Building A, 5th Floor").unwrap();
        let id = payroll.borrow().id.unwrap();

        let found = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.borrow().name, "Payroll");
        assert_eq!(found.borrow().location, "Building A, 5th Floor");
        assert_eq!(found.borrow().id, Some(id));
    }

    #[test]
    fn test_find_missing_returns_none() {
        let db = setup_test_db();
        let repo = db.departments();

        assert!(repo.find_by_id(42).unwrap().is_none());
        assert!(repo.find_by_name("Nowhere").unwrap().is_none());
    }

    #[test]
    fn test_find_by_name_returns_first_match() {
        let db = setup_test_db();
        let repo = db.departments();

        let first = repo.create("Payroll", "Building A").unwrap();
        repo.create("Payroll", "Building B").unwrap();

        let found = repo.find_by_name("Payroll").unwrap().unwrap();
        assert!(Rc::ptr_eq(&found, &first));
        assert_eq!(found.borrow().location, "Building A");
    }

    #[test]
    fn test_update_round_trip() {
        let db = setup_test_db();
        let repo = db.departments();

        let department = repo.create("Payroll", "Building A").unwrap();
        let id = department.borrow().id;
        {
            let mut d = department.borrow_mut();
            d.name = "Payroll Services".to_string();
            d.location = "Building B".to_string();
        }
        repo.update(&department.borrow()).unwrap();

        db.clear_identity_maps();
        let found = db.departments().find_by_id(id.unwrap()).unwrap().unwrap();
        assert!(!Rc::ptr_eq(&found, &department));
        assert_eq!(found.borrow().id, id);
        assert_eq!(found.borrow().name, "Payroll Services");
        assert_eq!(found.borrow().location, "Building B");
    }

    #[test]
    fn test_delete_removes_row_and_clears_id() {
        let db = setup_test_db();
        let repo = db.departments();

        let payroll = repo.create("Payroll", "Building A").unwrap();
        let hr = repo.create("Human Resources", "Building C").unwrap();
        let payroll_id = payroll.borrow().id.unwrap();

        repo.delete(&payroll).unwrap();

        assert_eq!(payroll.borrow().id, None);
        assert!(repo.find_by_id(payroll_id).unwrap().is_none());

        let all = repo.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert!(Rc::ptr_eq(&all[0], &hr));
    }

    #[test]
    fn test_unpersisted_update_and_delete_fail() {
        let db = setup_test_db();
        let repo = db.departments();
        let unsaved = shared(Department::new("Payroll", "Building A"));

        let err = repo.update(&unsaved.borrow()).unwrap_err();
        assert!(err.to_string().contains("has not been persisted"));
        assert!(repo.delete(&unsaved).is_err());
        assert!(repo.is_empty());
    }

    #[test]
    fn test_save_twice_fails() {
        let db = setup_test_db();
        let repo = db.departments();

        let department = repo.create("Payroll", "Building A").unwrap();
        assert!(repo.save(&department).is_err());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_update_and_delete_of_vanished_row() {
        let db = setup_test_db();
        let repo = db.departments();

        let department = repo.create("Payroll", "Building A").unwrap();
        let id = department.borrow().id.unwrap();
        db.connection()
            .execute("DELETE FROM departments WHERE id = ?1", [id])
            .unwrap();

        department.borrow_mut().location = "Building B".to_string();
        assert!(repo.update(&department.borrow()).is_ok());
        assert_eq!(department.borrow().id, Some(id));

        assert!(repo.delete(&department).is_ok());
        assert_eq!(department.borrow().id, None);
        assert!(repo.identity_map.get(id).is_none());
        assert!(repo.is_empty());
    }

    #[test]
    fn test_save_and_delete_while_borrowed_fail() {
        let db = setup_test_db();
        let repo = db.departments();

        let unsaved = shared(Department::new("Payroll", "Building A"));
        {
            let _reader = unsaved.borrow();
            assert!(repo.save(&unsaved).is_err());
        }
        assert_eq!(unsaved.borrow().id, None);
        assert!(repo.is_empty());

        let saved = repo.create("Payroll", "Building A").unwrap();
        let id = saved.borrow().id.unwrap();
        {
            let _reader = saved.borrow();
            assert!(repo.delete(&saved).is_err());
        }
        assert!(repo.find_by_id(id).unwrap().is_some());
        assert_eq!(saved.borrow().id, Some(id));
    }

    #[test]
    fn test_identity_map_shares_instances() {
        let db = setup_test_db();
        let repo = db.departments();

        let created = repo.create("Payroll", "Building A").unwrap();
        let id = created.borrow().id.unwrap();

        let by_id = repo.find_by_id(id).unwrap().unwrap();
        let by_name = repo.find_by_name("Payroll").unwrap().unwrap();
        let all = repo.get_all().unwrap();

        assert!(Rc::ptr_eq(&created, &by_id));
        assert!(Rc::ptr_eq(&created, &by_name));
        assert!(Rc::ptr_eq(&created, &all[0]));
    }

    #[test]
    fn test_fetch_refreshes_from_row() {
        let db = setup_test_db();
        let repo = db.departments();

        let created = repo.create("Payroll", "Building A").unwrap();
        let id = created.borrow().id.unwrap();

        db.connection()
            .execute(
                "UPDATE departments SET location = 'Building Z' WHERE id = ?1",
                [id],
            )
            .unwrap();

        repo.find_by_id(id).unwrap();
        assert_eq!(created.borrow().location, "Building Z");
    }

    #[test]
    fn test_without_identity_map() {
        let db = CompanyDatabase::open_with_options(None, false).unwrap();
        let repo = db.departments();

        let created = repo.create("Payroll", "Building A").unwrap();
        let id = created.borrow().id.unwrap();

        let found = repo.find_by_id(id).unwrap().unwrap();
        assert!(!Rc::ptr_eq(&created, &found));
        assert_eq!(*found.borrow(), *created.borrow());
    }

    struct RecordingLookup {
        requested: RefCell<Vec<i64>>,
    }

    impl EmployeeLookup for RecordingLookup {
        fn find_by_department(&self, department_id: i64) -> Result<Vec<Shared<Employee>>> {
            self.requested.borrow_mut().push(department_id);
            Ok(vec![shared(Employee::new("Amir", "Accountant", department_id))])
        }
    }

    #[test]
    fn test_list_employees_uses_lookup() {
        let db = setup_test_db();
        let repo = db.departments();
        let lookup = RecordingLookup {
            requested: RefCell::new(Vec::new()),
        };

        let payroll = repo.create("Payroll", "Building A").unwrap();
        let id = payroll.borrow().id.unwrap();

        let employees = repo.list_employees(&payroll.borrow(), &lookup).unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(*lookup.requested.borrow(), vec![id]);

        let unsaved = Department::new("Marketing", "Building D");
        assert!(repo.list_employees(&unsaved, &lookup).unwrap().is_empty());
        assert_eq!(lookup.requested.borrow().len(), 1);
    }

    #[test]
    fn test_list_employees_filters_by_department() {
        let db = setup_test_db();
        let departments = db.departments();
        let employees = db.employees();

        let payroll = departments.create("Payroll", "Building A").unwrap();
        let hr = departments.create("Human Resources", "Building C").unwrap();
        let payroll_id = payroll.borrow().id.unwrap();
        let hr_id = hr.borrow().id.unwrap();

        employees.create("Amir", "Accountant", payroll_id).unwrap();
        employees.create("Bola", "Manager", payroll_id).unwrap();
        employees.create("Charlie", "Manager", hr_id).unwrap();

        let mut names: Vec<String> = departments
            .list_employees(&payroll.borrow(), &employees)
            .unwrap()
            .iter()
            .map(|e| e.borrow().name.clone())
            .collect();
        names.sort();
        assert_eq!(names, vec!["Amir", "Bola"]);

        let hr_staff = departments.list_employees(&hr.borrow(), &employees).unwrap();
        assert_eq!(hr_staff.len(), 1);
        assert_eq!(hr_staff[0].borrow().department_id, hr_id);
    }

    #[test]
    fn test_delete_referenced_department_fails() {
        let db = setup_test_db();
        let payroll = db.departments().create("Payroll", "Building A").unwrap();
        let id = payroll.borrow().id.unwrap();
        db.employees().create("Amir", "Accountant", id).unwrap();

        assert!(db.departments().delete(&payroll).is_err());
        assert_eq!(payroll.borrow().id, Some(id));
    }

    #[test]
    fn test_table_lifecycle_is_idempotent() {
        let db = setup_test_db();
        let repo = db.departments();

        db.employees().drop_table().unwrap();
        repo.drop_table().unwrap();
        repo.drop_table().unwrap();
        assert!(!db.database().table_exists("departments").unwrap());

        repo.create_table().unwrap();
        repo.create_table().unwrap();
        assert!(db.database().table_exists("departments").unwrap());
        assert!(repo.is_empty());
    }

    #[test]
    fn test_display() {
        let mut department = Department::new("Payroll", "Building A");
        assert_eq!(department.to_string(), "<Department None: Payroll, Building A>");

        department.set_id(Some(1));
        assert_eq!(department.to_string(), "<Department 1: Payroll, Building A>");
    }
}
