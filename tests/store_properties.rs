//! Property tests: random edit sequences keep the store consistent and the
//! emitted diff turns the old shape into the new one.

use std::collections::HashMap;

use proptest::prelude::*;

use hierarchy::domain::{
    DiffAction, DomainError, HierarchyStore, ItemContent, ItemEntity, ItemId,
};

#[derive(Debug, Clone)]
enum Op {
    Insert { parent: usize, index: usize, count: usize },
    Remove { picks: Vec<usize> },
    Move { picks: Vec<usize>, parent: usize, index: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (any::<usize>(), any::<usize>(), 1..4usize)
            .prop_map(|(parent, index, count)| Op::Insert { parent, index, count }),
        1 => prop::collection::vec(any::<usize>(), 1..3).prop_map(|picks| Op::Remove { picks }),
        2 => (prop::collection::vec(any::<usize>(), 1..4), any::<usize>(), any::<usize>())
            .prop_map(|(picks, parent, index)| Op::Move { picks, parent, index }),
    ]
}

/// `None` (root level) is one extra choice next to every stored id.
fn pick_parent(ids: &[ItemId], choice: usize) -> Option<ItemId> {
    match choice % (ids.len() + 1) {
        0 => None,
        n => Some(ids[n - 1]),
    }
}

fn pick_ids(ids: &[ItemId], picks: &[usize]) -> Vec<ItemId> {
    if ids.is_empty() {
        return Vec::new();
    }
    picks.iter().map(|p| ids[p % ids.len()]).collect()
}

fn apply(store: &mut HierarchyStore<ItemEntity>, op: &Op, next_id: &mut u128) {
    let ids: Vec<ItemId> = store.iter_ids().collect();
    match op {
        Op::Insert {
            parent,
            index,
            count,
        } => {
            let parent = pick_parent(&ids, *parent);
            let index = index % (store.number_of_children(parent) + 1);
            let items = (0..*count)
                .map(|_| {
                    *next_id += 1;
                    ItemEntity::with_id(ItemId::from_u128(*next_id), ItemContent::new("x"))
                })
                .collect();
            let result = match parent {
                Some(parent) => store.insert_to_parent(items, parent, Some(index)),
                None => store.insert_to_root(items, Some(index)),
            };
            assert_eq!(result, Ok(()));
        }
        Op::Remove { picks } => {
            store.remove(&pick_ids(&ids, picks));
        }
        Op::Move {
            picks,
            parent,
            index,
        } => {
            let moved = pick_ids(&ids, picks);
            let parent = pick_parent(&ids, *parent);
            let index = index % (store.number_of_children(parent) + 1);
            let result = match parent {
                Some(parent) => store.move_to_parent(&moved, parent, Some(index)),
                None => store.move_to_root(&moved, Some(index)),
            };
            match result {
                Ok(()) => {}
                Err(DomainError::InvalidMove { .. }) => {
                    assert!(!store.can_move(&moved, parent));
                }
                Err(other) => panic!("unexpected move error: {other}"),
            }
        }
    }
}

fn replay(
    old: &HierarchyStore<ItemEntity>,
    new: &HierarchyStore<ItemEntity>,
    actions: &[DiffAction],
) -> HashMap<Option<ItemId>, Vec<ItemId>> {
    let mut rendering: HashMap<Option<ItemId>, Vec<ItemId>> = old
        .iter_ids()
        .map(|id| (Some(id), old.children_ids(Some(id)).to_vec()))
        .collect();
    rendering.insert(None, old.root_ids().to_vec());

    for action in actions {
        match action {
            DiffAction::UpdateItem { .. } => {}
            DiffAction::RemoveItems { indices, parent } => {
                let children = rendering.entry(*parent).or_default();
                for &index in indices.iter().rev() {
                    children.remove(index);
                }
            }
            DiffAction::InsertItems { indices, parent } => {
                let source = new.children_ids(*parent);
                let children = rendering.entry(*parent).or_default();
                for &index in indices {
                    children.insert(index, source[index]);
                }
            }
        }
    }
    rendering
}

fn build(ops: &[Op], next_id: &mut u128) -> HierarchyStore<ItemEntity> {
    let mut store = HierarchyStore::new();
    for op in ops {
        apply(&mut store, op, next_id);
    }
    store
}

proptest! {
    #[test]
    fn random_edits_keep_store_consistent(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut next_id = 0;
        let mut store = HierarchyStore::new();
        for op in &ops {
            apply(&mut store, op, &mut next_id);
            prop_assert_eq!(store.validate(), Ok(()));
        }
        prop_assert_eq!(store.iter_ids().count(), store.len());
    }

    #[test]
    fn diff_of_batch_replays_to_new_shape(
        setup in prop::collection::vec(op_strategy(), 0..20),
        batch in prop::collection::vec(op_strategy(), 1..10),
    ) {
        let mut next_id = 0;
        let mut store = build(&setup, &mut next_id);
        let mut before_id = 0;
        let before = build(&setup, &mut before_id);

        store.start_updating();
        for op in &batch {
            apply(&mut store, op, &mut next_id);
        }
        let actions = store.end_updating();

        let rendering = replay(&before, &store, &actions);
        prop_assert_eq!(&rendering[&None], &store.root_ids().to_vec());
        for id in store.iter_ids() {
            let children = rendering.get(&Some(id)).cloned().unwrap_or_default();
            prop_assert_eq!(children, store.children_ids(Some(id)).to_vec());
        }
    }

    #[test]
    fn every_action_group_starts_with_update(
        setup in prop::collection::vec(op_strategy(), 0..20),
        batch in prop::collection::vec(op_strategy(), 1..10),
    ) {
        let mut next_id = 0;
        let mut store = build(&setup, &mut next_id);
        store.start_updating();
        for op in &batch {
            apply(&mut store, op, &mut next_id);
        }
        let actions = store.end_updating();

        let mut current: Option<Option<ItemId>> = None;
        for action in &actions {
            match action {
                DiffAction::UpdateItem { parent } => current = Some(*parent),
                other => {
                    prop_assert_eq!(current, Some(other.parent()));
                }
            }
        }
    }
}
