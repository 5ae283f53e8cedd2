//! Document: a hierarchy plus the consumers observing it.
//!
//! Every edit runs inside one update batch; the resulting diff actions are
//! published to all live subscribers.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use tracing::{debug, instrument, trace};

use crate::domain::{DiffAction, HierarchyStore};

type Handler<T> = Box<dyn FnMut(&HierarchyStore<T>, &[DiffAction])>;

struct Registry<T> {
    next_key: u64,
    handlers: BTreeMap<u64, Handler<T>>,
    /// Keys dropped while their handler was out for a notification
    cancelled: Vec<u64>,
}

trait Unsubscribe {
    fn unsubscribe(&mut self, key: u64);
}

impl<T> Unsubscribe for Registry<T> {
    fn unsubscribe(&mut self, key: u64) {
        if self.handlers.remove(&key).is_none() {
            self.cancelled.push(key);
        }
    }
}

/// Handle keeping a document subscription alive; dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    key: u64,
    registry: Weak<RefCell<dyn Unsubscribe>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().unsubscribe(self.key);
            trace!(key = self.key, "subscription dropped");
        }
    }
}

pub struct Document<T: 'static> {
    store: HierarchyStore<T>,
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: 'static> Default for Document<T> {
    fn default() -> Self {
        Self::new(HierarchyStore::new())
    }
}

impl<T: 'static> Document<T> {
    pub fn new(store: HierarchyStore<T>) -> Self {
        Self {
            store,
            registry: Rc::new(RefCell::new(Registry {
                next_key: 0,
                handlers: BTreeMap::new(),
                cancelled: Vec::new(),
            })),
        }
    }

    pub fn store(&self) -> &HierarchyStore<T> {
        &self.store
    }

    pub fn into_store(self) -> HierarchyStore<T> {
        self.store
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }

    /// Register `handler`; it is called right away with the current state and
    /// no actions, then after every edit.
    pub fn subscribe<F>(&mut self, mut handler: F) -> Subscription
    where
        F: FnMut(&HierarchyStore<T>, &[DiffAction]) + 'static,
    {
        handler(&self.store, &[]);

        let key = {
            let mut registry = self.registry.borrow_mut();
            let key = registry.next_key;
            registry.next_key += 1;
            registry.handlers.insert(key, Box::new(handler));
            key
        };
        debug!(key, "subscriber added");

        let registry: Rc<RefCell<dyn Unsubscribe>> = self.registry.clone();
        Subscription {
            key,
            registry: Rc::downgrade(&registry),
        }
    }

    /// Run `edit` as one update batch and publish the resulting actions.
    #[instrument(level = "debug", skip_all)]
    pub fn modify<R, F>(&mut self, edit: F) -> R
    where
        F: FnOnce(&mut HierarchyStore<T>) -> R,
    {
        self.store.start_updating();
        let result = edit(&mut self.store);
        let actions = self.store.end_updating();
        debug!(actions = actions.len(), "document modified");
        self.publish(&actions);
        result
    }

    /// Swap in a whole new hierarchy and publish the difference.
    #[instrument(level = "debug", skip_all)]
    pub fn replace(&mut self, store: HierarchyStore<T>) -> Vec<DiffAction> {
        let old = self.store.snapshot();
        self.store = store;
        let actions = self.store.snapshot().diff(&old);
        self.publish(&actions);
        actions
    }

    fn publish(&mut self, actions: &[DiffAction]) {
        // handlers are taken out so they can drop subscriptions while running
        let mut handlers = std::mem::take(&mut self.registry.borrow_mut().handlers);
        for handler in handlers.values_mut() {
            handler(&self.store, actions);
        }

        let cancelled = std::mem::take(&mut self.registry.borrow_mut().cancelled);
        // dropped handlers may own subscriptions, so no borrow is held here
        handlers.retain(|key, _| !cancelled.contains(key));

        let mut registry = self.registry.borrow_mut();
        registry.handlers.append(&mut handlers);
        trace!(subscribers = registry.handlers.len(), "actions published");
    }
}
