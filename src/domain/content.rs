//! Outline items: content, display options and bulk field mutation.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::store::HierarchyStore;
use crate::domain::{Identifiable, ItemId};

/// User-visible payload of an outline item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemContent {
    pub text: String,
    pub is_done: bool,
    pub icon_name: String,
    #[serde(default)]
    pub value: i64,
}

impl ItemContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_done: false,
            icon_name: "doc.text".to_string(),
            value: 0,
        }
    }
}

/// Optional decorations shown next to an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemOptions {
    pub checkbox: bool,
    pub badge: bool,
}

/// Item stored in an outline document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEntity {
    id: ItemId,
    pub content: ItemContent,
    pub options: ItemOptions,
}

impl ItemEntity {
    pub fn new(content: ItemContent) -> Self {
        Self::with_id(ItemId::new(), content)
    }

    pub fn with_id(id: ItemId, content: ItemContent) -> Self {
        Self {
            id,
            content,
            options: ItemOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ItemOptions) -> Self {
        self.options = options;
        self
    }
}

impl Identifiable for ItemEntity {
    fn id(&self) -> ItemId {
        self.id
    }
}

impl fmt::Display for ItemEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.content.text)
    }
}

/// One writable field of an [`ItemEntity`] together with its new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Text(String),
    Done(bool),
    Icon(String),
    Value(i64),
    Options(ItemOptions),
}

impl Mutation {
    pub fn apply(&self, entity: &mut ItemEntity) {
        match self {
            Mutation::Text(text) => entity.content.text = text.clone(),
            Mutation::Done(done) => entity.content.is_done = *done,
            Mutation::Icon(icon) => entity.content.icon_name = icon.clone(),
            Mutation::Value(value) => entity.content.value = *value,
            Mutation::Options(options) => entity.options = *options,
        }
    }
}

impl HierarchyStore<ItemEntity> {
    /// Set one field on every listed item, and on all descendants if `downstream`.
    #[instrument(level = "debug", skip(self))]
    pub fn apply(&mut self, ids: &[ItemId], mutation: &Mutation, downstream: bool) {
        self.update(ids, downstream, |entity| mutation.apply(entity));
    }

    /// A leaf is done when its own flag is set, a parent when all children are done.
    pub fn effective_status(&self, id: ItemId) -> Option<bool> {
        self.item(id)?;
        let mut status: HashMap<ItemId, bool> = HashMap::new();
        // reversed pre-order visits every child before its parent
        for current in self.subtree_ids(id).into_iter().rev() {
            let children = self.children_ids(Some(current));
            let done = if children.is_empty() {
                self.item(current)
                    .map(|item| item.content.is_done)
                    .unwrap_or(false)
            } else {
                children
                    .iter()
                    .all(|child| status.get(child).copied().unwrap_or(false))
            };
            status.insert(current, done);
        }
        status.get(&id).copied()
    }
}
