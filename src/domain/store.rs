//! Canonical hierarchy state: root order, child order, parent lookups.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use tracing::{debug, instrument, trace, warn};

use crate::domain::action::DiffAction;
use crate::domain::destination::Destination;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::snapshot::Snapshot;
use crate::domain::{Identifiable, ItemId};

/// Ordered forest of identifiable items.
///
/// Every stored id lives in exactly one container: the root level or the
/// child list of its parent. `hierarchy` and `parents` are kept as mutual
/// inverses and leaf items map to an empty child list.
#[derive(Debug)]
pub struct HierarchyStore<T> {
    root: Vec<ItemId>,
    storage: HashMap<ItemId, T>,
    hierarchy: HashMap<ItemId, Vec<ItemId>>,
    parents: HashMap<ItemId, ItemId>,
    old_snapshot: Option<Snapshot>,
}

impl<T> Default for HierarchyStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HierarchyStore<T> {
    pub fn new() -> Self {
        Self {
            root: Vec::new(),
            storage: HashMap::new(),
            hierarchy: HashMap::new(),
            parents: HashMap::new(),
            old_snapshot: None,
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.storage.contains_key(&id)
    }

    pub fn root_ids(&self) -> &[ItemId] {
        &self.root
    }

    pub fn item(&self, id: ItemId) -> Option<&T> {
        self.storage.get(&id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut T> {
        self.storage.get_mut(&id)
    }

    /// Parent of `id`, `None` for root items and unknown ids.
    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.parents.get(&id).copied()
    }

    /// Child ids of `parent` (`None` = root level); empty for unknown parents.
    pub fn children_ids(&self, parent: Option<ItemId>) -> &[ItemId] {
        self.container(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children(&self, parent: Option<ItemId>) -> Vec<&T> {
        self.children_ids(parent)
            .iter()
            .filter_map(|id| self.storage.get(id))
            .collect()
    }

    pub fn number_of_children(&self, parent: Option<ItemId>) -> usize {
        self.children_ids(parent).len()
    }

    pub fn child(&self, parent: Option<ItemId>, index: usize) -> Option<&T> {
        self.children_ids(parent)
            .get(index)
            .and_then(|id| self.storage.get(id))
    }

    /// Position of `id` within its container.
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        self.children_ids(self.parent(id))
            .iter()
            .position(|&other| other == id)
    }

    /// True if `other` is a proper ancestor of `id`.
    pub fn is_descendant(&self, id: ItemId, other: ItemId) -> bool {
        self.ancestors(id).any(|ancestor| ancestor == other)
    }

    /// Number of hops to the root level, root items have level 0.
    pub fn level(&self, id: ItemId) -> Option<usize> {
        self.contains(id).then(|| self.ancestors(id).count())
    }

    /// False if `target` is one of `ids` or a descendant of one of them.
    pub fn can_move(&self, ids: &[ItemId], target: Option<ItemId>) -> bool {
        let Some(target) = target else {
            return true;
        };
        ids.iter()
            .all(|&id| id != target && !self.is_descendant(target, id))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.root.clone(),
            self.storage.keys().copied().collect(),
            self.hierarchy.clone(),
        )
    }

    pub fn is_updating(&self) -> bool {
        self.old_snapshot.is_some()
    }

    /// Open a batch: the current shape becomes the base of the next diff.
    ///
    /// # Panics
    /// If a batch is already open.
    #[instrument(level = "debug", skip(self))]
    pub fn start_updating(&mut self) {
        assert!(
            self.old_snapshot.is_none(),
            "start_updating called while a batch is already open"
        );
        self.old_snapshot = Some(self.snapshot());
    }

    /// Close the batch and return the actions since `start_updating`.
    ///
    /// # Panics
    /// If no batch is open.
    #[instrument(level = "debug", skip(self))]
    pub fn end_updating(&mut self) -> Vec<DiffAction> {
        let Some(old) = self.old_snapshot.take() else {
            panic!("end_updating called without start_updating");
        };
        self.snapshot().diff(&old)
    }

    /// Drop all items. An open batch stays open.
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&mut self) {
        self.root.clear();
        self.storage.clear();
        self.hierarchy.clear();
        self.parents.clear();
    }

    /// Check every structural invariant, reporting the first violation.
    pub fn validate(&self) -> DomainResult<()> {
        let inconsistent = |id: ItemId, reason: &str| DomainError::Inconsistent {
            id,
            reason: reason.to_string(),
        };

        let mut seen: HashSet<ItemId> = HashSet::new();
        for &id in &self.root {
            if !self.contains(id) {
                return Err(inconsistent(id, "root entry without item"));
            }
            if self.parents.contains_key(&id) {
                return Err(inconsistent(id, "root item has a parent"));
            }
            if !seen.insert(id) {
                return Err(inconsistent(id, "item placed twice"));
            }
        }
        for (&parent, children) in &self.hierarchy {
            if !self.contains(parent) {
                return Err(inconsistent(parent, "child list without item"));
            }
            for &child in children {
                if !self.contains(child) {
                    return Err(inconsistent(child, "child entry without item"));
                }
                if self.parent(child) != Some(parent) {
                    return Err(inconsistent(child, "parent lookup disagrees with child list"));
                }
                if !seen.insert(child) {
                    return Err(inconsistent(child, "item placed twice"));
                }
            }
        }
        for &id in self.storage.keys() {
            if !self.hierarchy.contains_key(&id) {
                return Err(inconsistent(id, "item without child list"));
            }
            if !seen.contains(&id) {
                return Err(inconsistent(id, "item not placed in any container"));
            }
        }
        if let Some((&id, _)) = self.parents.iter().find(|(id, _)| !self.contains(**id)) {
            return Err(inconsistent(id, "parent entry without item"));
        }
        // placed exactly once but unreachable from the root level means a cycle
        let reachable: HashSet<ItemId> = self.iter_ids().collect();
        if let Some(&id) = self.storage.keys().find(|id| !reachable.contains(id)) {
            return Err(inconsistent(id, "item unreachable from root level"));
        }
        Ok(())
    }

    fn container(&self, parent: Option<ItemId>) -> Option<&Vec<ItemId>> {
        match parent {
            None => Some(&self.root),
            Some(id) => self.hierarchy.get(&id),
        }
    }

    fn container_mut(&mut self, parent: Option<ItemId>) -> DomainResult<&mut Vec<ItemId>> {
        match parent {
            None => Ok(&mut self.root),
            Some(id) => self.hierarchy.get_mut(&id).ok_or(DomainError::NotFound(id)),
        }
    }

    /// De-duplicated ids that are currently stored, unknown ones are skipped.
    fn known(&self, ids: &[ItemId]) -> Vec<ItemId> {
        ids.iter()
            .copied()
            .unique()
            .filter(|&id| {
                let present = self.contains(id);
                if !present {
                    warn!(%id, "skipping unknown item");
                }
                present
            })
            .collect()
    }

    fn ensure_parent(&self, parent: Option<ItemId>) -> DomainResult<()> {
        match parent {
            Some(id) if !self.contains(id) => Err(DomainError::NotFound(id)),
            _ => Ok(()),
        }
    }

    /// Take `ids` out of their containers and clear their parent entries.
    fn detach(&mut self, ids: &[ItemId]) {
        let grouped: HashMap<Option<ItemId>, Vec<ItemId>> = ids
            .iter()
            .copied()
            .into_group_map_by(|id| self.parents.get(id).copied());

        for (parent, group) in grouped {
            let cache: HashSet<ItemId> = group.iter().copied().collect();
            if let Ok(container) = self.container_mut(parent) {
                container.retain(|id| !cache.contains(id));
            }
            for id in &group {
                self.parents.remove(id);
            }
        }
    }

    /// Remove `id` and its whole subtree from every index, pre-order.
    fn purge(&mut self, id: ItemId) -> Vec<T> {
        let mut purged = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let children = self.hierarchy.remove(&current).unwrap_or_default();
            self.parents.remove(&current);
            if let Some(item) = self.storage.remove(&current) {
                purged.push(item);
            }
            stack.extend(children.into_iter().rev());
        }
        purged
    }
}

impl<T: Identifiable> HierarchyStore<T> {
    /// Insert `items` at `index` of the root level, appending if `index` is `None`.
    pub fn insert_to_root(&mut self, items: Vec<T>, index: Option<usize>) -> DomainResult<()> {
        self.insert_into(items, None, index)
    }

    /// Insert `items` at `index` of `parent`'s children, appending if `index` is `None`.
    pub fn insert_to_parent(
        &mut self,
        items: Vec<T>,
        parent: ItemId,
        index: Option<usize>,
    ) -> DomainResult<()> {
        self.insert_into(items, Some(parent), index)
    }

    pub fn insert(&mut self, items: Vec<T>, destination: Destination) -> DomainResult<()> {
        self.insert_into(items, destination.target(), destination.index())
    }

    #[instrument(level = "trace", skip(self, items), fields(count = items.len()))]
    fn insert_into(
        &mut self,
        items: Vec<T>,
        parent: Option<ItemId>,
        index: Option<usize>,
    ) -> DomainResult<()> {
        self.ensure_parent(parent)?;

        let mut ids = Vec::with_capacity(items.len());
        for item in &items {
            let id = item.id();
            if self.contains(id) || ids.contains(&id) {
                return Err(DomainError::Conflict(id));
            }
            ids.push(id);
        }

        let container = self.container_mut(parent)?;
        if let Some(index) = index {
            check_index(index, container.len())?;
        }
        splice(container, index, &ids);

        for item in items {
            let id = item.id();
            self.storage.insert(id, item);
            self.hierarchy.insert(id, Vec::new());
            match parent {
                Some(parent) => self.parents.insert(id, parent),
                None => self.parents.remove(&id),
            };
        }
        trace!(?parent, inserted = ids.len(), "items inserted");
        Ok(())
    }

    /// Remove items with their subtrees and return the purged payloads in pre-order.
    ///
    /// Unknown ids are skipped, so removing twice is harmless.
    #[instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, ids: &[ItemId]) -> Vec<T> {
        let ids = self.known(ids);
        self.detach(&ids);

        let removed: Vec<T> = ids.into_iter().flat_map(|id| self.purge(id)).collect();
        debug!(removed = removed.len(), "items removed");
        removed
    }

    /// Move items to the root level at `index`, appending if `index` is `None`.
    pub fn move_to_root(&mut self, ids: &[ItemId], index: Option<usize>) -> DomainResult<()> {
        self.move_into(ids, None, index)
    }

    /// Move items under `parent` at `index`, appending if `index` is `None`.
    pub fn move_to_parent(
        &mut self,
        ids: &[ItemId],
        parent: ItemId,
        index: Option<usize>,
    ) -> DomainResult<()> {
        self.move_into(ids, Some(parent), index)
    }

    pub fn move_items(&mut self, ids: &[ItemId], destination: Destination) -> DomainResult<()> {
        self.move_into(ids, destination.target(), destination.index())
    }

    /// Moved items land as one block in the order given.
    ///
    /// `index` refers to the destination as it is before the move. Items
    /// already in the destination and positioned before `index` shift it
    /// down once they are taken out.
    #[instrument(level = "trace", skip(self))]
    fn move_into(
        &mut self,
        ids: &[ItemId],
        target: Option<ItemId>,
        index: Option<usize>,
    ) -> DomainResult<()> {
        self.ensure_parent(target)?;
        let ids = self.known(ids);
        if let Some(target) = target {
            if !self.can_move(&ids, Some(target)) {
                return Err(DomainError::InvalidMove { target });
            }
        }

        let destination = self.children_ids(target);
        let index = match index {
            Some(index) => {
                check_index(index, destination.len())?;
                let moved: HashSet<ItemId> = ids.iter().copied().collect();
                let shift = destination
                    .iter()
                    .take(index)
                    .filter(|id| moved.contains(id))
                    .count();
                Some(index - shift)
            }
            None => None,
        };
        if ids.is_empty() {
            return Ok(());
        }

        self.detach(&ids);
        let container = self.container_mut(target)?;
        splice(container, index, &ids);
        for &id in &ids {
            match target {
                Some(target) => self.parents.insert(id, target),
                None => self.parents.remove(&id),
            };
        }
        trace!(?target, ?index, moved = ids.len(), "items moved");
        Ok(())
    }

    /// Apply `f` to every listed item and, with `downstream`, to all their descendants.
    #[instrument(level = "trace", skip(self, f))]
    pub fn update<F>(&mut self, ids: &[ItemId], downstream: bool, mut f: F)
    where
        F: FnMut(&mut T),
    {
        let targets: Vec<ItemId> = if downstream {
            self.known(ids)
                .into_iter()
                .flat_map(|id| self.subtree_ids(id))
                .unique()
                .collect()
        } else {
            self.known(ids)
        };
        for id in targets {
            if let Some(item) = self.storage.get_mut(&id) {
                f(item);
            }
        }
    }
}

fn check_index(index: usize, len: usize) -> DomainResult<()> {
    if index > len {
        return Err(DomainError::IndexOutOfRange { index, len });
    }
    Ok(())
}

fn splice(container: &mut Vec<ItemId>, index: Option<usize>, ids: &[ItemId]) {
    match index {
        Some(index) => {
            container.splice(index..index, ids.iter().copied());
        }
        None => container.extend_from_slice(ids),
    }
}
