//! Identity map for mapped entities
//!
//! Keeps at most one live instance per persisted row. Converting a row whose
//! primary key is already registered refreshes that instance from the row
//! and returns it, so separate lookups never produce diverging copies.
//!
//! The map is owned by [`CompanyDatabase`](super::CompanyDatabase) and lives
//! exactly as long as it does; [`IdentityMap::clear`] drops every entry
//! (done on schema reset, and usable between test cases).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;
use tracing::debug;

use super::entity::{read, shared, write, Entity, Shared};

pub struct IdentityMap<T> {
    enabled: bool,
    entries: RefCell<HashMap<i64, Shared<T>>>,
}

impl<T> Default for IdentityMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IdentityMap<T> {
    /// Create an enabled, empty identity map
    pub fn new() -> Self {
        Self::with_enabled(true)
    }

    /// Create a map that never registers anything
    ///
    /// Every row conversion then yields a fresh instance.
    pub fn disabled() -> Self {
        Self::with_enabled(false)
    }

    pub fn with_enabled(enabled: bool) -> Self {
        Self {
            enabled,
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Number of registered instances
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Registered instance for a primary key, if any
    pub fn get(&self, id: i64) -> Option<Shared<T>> {
        self.entries.borrow().get(&id).cloned()
    }

    /// Remove the instance registered for a primary key
    pub fn evict(&self, id: i64) -> Option<Shared<T>> {
        self.entries.borrow_mut().remove(&id)
    }

    /// Drop every registered instance
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl<T: Entity> IdentityMap<T> {
    /// Register a persisted instance under its primary key
    pub fn register(&self, entity: &Shared<T>) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let id = read(entity)?.persisted_id()?;
        self.entries.borrow_mut().insert(id, Rc::clone(entity));
        Ok(())
    }

    /// Turn a freshly read row into the canonical instance for its key
    ///
    /// A registered instance is overwritten with the row's values and
    /// returned; otherwise `fresh` becomes the registered instance.
    pub fn reconcile(&self, fresh: T) -> Result<Shared<T>> {
        let id = match fresh.id() {
            Some(id) if self.enabled => id,
            _ => return Ok(shared(fresh)),
        };

        if let Some(existing) = self.get(id) {
            debug!("{} {} found in identity map, refreshing", T::KIND, id);
            *write(&existing)? = fresh;
            return Ok(existing);
        }

        let entity = shared(fresh);
        self.entries.borrow_mut().insert(id, Rc::clone(&entity));
        Ok(entity)
    }
}
