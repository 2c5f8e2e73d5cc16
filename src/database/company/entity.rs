//! Shared entity plumbing for the company mappers
//!
//! Both mappers hand out `Shared<T>` handles and convert rows through the
//! `Entity` trait. The lookup traits let the department mapper reach
//! employees (and vice versa) without either repository naming the other.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use anyhow::{anyhow, Result};
use rusqlite::Row;

use super::{Department, Employee};

/// A live, shared in-memory entity
///
/// Every handle returned for the same persisted row (while the identity map
/// is enabled) points at the same allocation.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wrap an entity into a fresh shared handle
pub fn shared<T>(entity: T) -> Shared<T> {
    Rc::new(RefCell::new(entity))
}

/// Borrow a shared entity for reading
///
/// Errors instead of panicking while the entity is mutably borrowed.
pub fn read<T: Entity>(entity: &Shared<T>) -> Result<Ref<'_, T>> {
    entity
        .try_borrow()
        .map_err(|e| anyhow!("Failed to read {}: {}", T::KIND, e))
}

/// Borrow a shared entity for writing
///
/// Errors instead of panicking while any other borrow is alive.
pub fn write<T: Entity>(entity: &Shared<T>) -> Result<RefMut<'_, T>> {
    entity
        .try_borrow_mut()
        .map_err(|e| anyhow!("Failed to modify {}: {}", T::KIND, e))
}

/// An in-memory type whose instances correspond one-to-one with rows of a table
pub trait Entity: Sized {
    /// Table holding the rows of this entity
    const TABLE: &'static str;

    /// Human-readable entity name used in error messages
    const KIND: &'static str;

    /// Primary key, absent until the entity is persisted
    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: Option<i64>);

    /// Build an entity from a row selected with the mapper's column order
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Primary key of an entity that must already be persisted
    fn persisted_id(&self) -> Result<i64> {
        self.id()
            .ok_or_else(|| anyhow!("{} has not been persisted", Self::KIND))
    }
}

/// Capability to fetch the employees of a department by its primary key
pub trait EmployeeLookup {
    fn find_by_department(&self, department_id: i64) -> Result<Vec<Shared<Employee>>>;
}

/// Capability to fetch a department by its primary key
pub trait DepartmentLookup {
    fn find_department(&self, department_id: i64) -> Result<Option<Shared<Department>>>;
}
