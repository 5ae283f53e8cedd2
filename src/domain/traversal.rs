//! Walking a [`HierarchyStore`] without recursion.

use tracing::instrument;

use crate::domain::store::HierarchyStore;
use crate::domain::ItemId;

impl<T> HierarchyStore<T> {
    /// Pre-order walk over the whole forest yielding `(level, item)`.
    pub fn iter(&self) -> PreOrderIter<'_, T> {
        PreOrderIter::new(self)
    }

    /// Pre-order walk yielding ids only.
    pub fn iter_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.iter_levels().map(|(_, id)| id)
    }

    pub fn iter_postorder(&self) -> PostOrderIter<'_, T> {
        PostOrderIter::new(self)
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: ItemId) -> Ancestors<'_, T> {
        Ancestors {
            store: self,
            current: Some(id),
        }
    }

    /// `id` followed by all of its descendants in pre-order; empty for unknown ids.
    #[instrument(level = "trace", skip(self))]
    pub fn subtree_ids(&self, id: ItemId) -> Vec<ItemId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children_ids(Some(current)).iter().rev());
        }
        result
    }

    /// Number of levels in the deepest branch, 0 for an empty store.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter_levels()
            .map(|(level, _)| level + 1)
            .max()
            .unwrap_or(0)
    }

    /// Items without children, left to right.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_ids(&self) -> Vec<ItemId> {
        self.iter_ids()
            .filter(|&id| self.number_of_children(Some(id)) == 0)
            .collect()
    }

    fn iter_levels(&self) -> LevelIter<'_, T> {
        let mut stack: Vec<(usize, ItemId)> = Vec::new();
        stack.extend(self.root_ids().iter().rev().map(|&id| (0, id)));
        LevelIter { store: self, stack }
    }
}

struct LevelIter<'a, T> {
    store: &'a HierarchyStore<T>,
    stack: Vec<(usize, ItemId)>,
}

impl<T> Iterator for LevelIter<'_, T> {
    type Item = (usize, ItemId);

    fn next(&mut self) -> Option<Self::Item> {
        let (level, id) = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        for &child in self.store.children_ids(Some(id)).iter().rev() {
            self.stack.push((level + 1, child));
        }
        Some((level, id))
    }
}

pub struct PreOrderIter<'a, T> {
    inner: LevelIter<'a, T>,
}

impl<'a, T> PreOrderIter<'a, T> {
    fn new(store: &'a HierarchyStore<T>) -> Self {
        Self {
            inner: store.iter_levels(),
        }
    }
}

impl<'a, T> Iterator for PreOrderIter<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (level, id) = self.inner.next()?;
            if let Some(item) = self.inner.store.item(id) {
                return Some((level, item));
            }
        }
    }
}

pub struct PostOrderIter<'a, T> {
    store: &'a HierarchyStore<T>,
    stack: Vec<(ItemId, bool)>,
}

impl<'a, T> PostOrderIter<'a, T> {
    fn new(store: &'a HierarchyStore<T>) -> Self {
        let stack = store.root_ids().iter().rev().map(|&id| (id, false)).collect();
        Self { store, stack }
    }
}

impl<'a, T> Iterator for PostOrderIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if !visited {
                self.stack.push((current, true));
                for &child in self.store.children_ids(Some(current)).iter().rev() {
                    self.stack.push((child, false));
                }
            } else if let Some(item) = self.store.item(current) {
                return Some(item);
            }
        }
        None
    }
}

pub struct Ancestors<'a, T> {
    store: &'a HierarchyStore<T>,
    current: Option<ItemId>,
}

impl<T> Iterator for Ancestors<'_, T> {
    type Item = ItemId;

    fn next(&mut self) -> Option<Self::Item> {
        let parent = self.store.parent(self.current?);
        self.current = parent;
        parent
    }
}
