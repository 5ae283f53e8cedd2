//! Replayable edit scripts.
//!
//! A script is a TOML file with `[[setup]]` steps, applied to build the
//! initial outline, and `[[batch]]` steps, applied as one document edit whose
//! diff actions are collected. Items are named by script-local keys.
//!
//! ```toml
//! [[setup]]
//! op = "insert"
//! keys = ["inbox", "work"]
//!
//! [[batch]]
//! op = "move"
//! keys = ["inbox"]
//! parent = "work"
//! index = 0
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::application::document::Document;
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::{
    DiffAction, Destination, HierarchyStore, Identifiable, ItemContent, ItemEntity, ItemId,
    Mutation,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    pub setup: Vec<Step>,
    pub batch: Vec<Step>,
}

/// Single edit; unknown keys in `keys` lists are skipped except for `insert`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Insert {
        keys: Vec<String>,
        parent: Option<String>,
        index: Option<usize>,
    },
    Remove {
        keys: Vec<String>,
    },
    Move {
        keys: Vec<String>,
        parent: Option<String>,
        index: Option<usize>,
    },
    Set {
        keys: Vec<String>,
        text: Option<String>,
        done: Option<bool>,
        icon: Option<String>,
        value: Option<i64>,
        #[serde(default)]
        downstream: bool,
    },
}

impl Script {
    pub fn parse(content: &str) -> ApplicationResult<Self> {
        toml::from_str(content).map_err(|e| ApplicationError::Script {
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> ApplicationResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ApplicationError::io(format!("read {}", path.display()), e))?;
        Self::parse(&content)
    }
}

/// Result of replaying a script.
pub struct ScriptOutcome {
    pub document: Document<ItemEntity>,
    pub keys: BTreeMap<String, ItemId>,
    pub actions: Vec<DiffAction>,
}

/// Applies script steps to an outline document, tracking key → id.
#[derive(Default)]
pub struct ScriptRunner {
    document: Document<ItemEntity>,
    keys: BTreeMap<String, ItemId>,
}

impl ScriptRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay setup, then the batch, returning the batch's actions.
    pub fn run(script: &Script) -> ApplicationResult<ScriptOutcome> {
        let mut runner = Self::new();
        runner.setup(&script.setup)?;
        let actions = runner.run_batch(&script.batch)?;
        Ok(ScriptOutcome {
            document: runner.document,
            keys: runner.keys,
            actions,
        })
    }

    pub fn document(&self) -> &Document<ItemEntity> {
        &self.document
    }

    pub fn id(&self, key: &str) -> Option<ItemId> {
        self.keys.get(key).copied()
    }

    #[instrument(level = "debug", skip_all, fields(steps = steps.len()))]
    pub fn setup(&mut self, steps: &[Step]) -> ApplicationResult<()> {
        let keys = &mut self.keys;
        self.document
            .modify(|store| steps.iter().try_for_each(|step| apply_step(store, keys, step)))
    }

    /// Apply `steps` as one edit and collect the published actions.
    #[instrument(level = "debug", skip_all, fields(steps = steps.len()))]
    pub fn run_batch(&mut self, steps: &[Step]) -> ApplicationResult<Vec<DiffAction>> {
        let collected: Rc<RefCell<Vec<DiffAction>>> = Rc::default();
        let sink = Rc::clone(&collected);
        let subscription = self
            .document
            .subscribe(move |_, actions| sink.borrow_mut().extend_from_slice(actions));

        let keys = &mut self.keys;
        let result = self
            .document
            .modify(|store| steps.iter().try_for_each(|step| apply_step(store, keys, step)));
        subscription.unsubscribe();
        result?;

        let actions = collected.take();
        debug!(actions = actions.len(), "batch applied");
        Ok(actions)
    }
}

fn apply_step(
    store: &mut HierarchyStore<ItemEntity>,
    keys: &mut BTreeMap<String, ItemId>,
    step: &Step,
) -> ApplicationResult<()> {
    match step {
        Step::Insert {
            keys: names,
            parent,
            index,
        } => {
            for (i, name) in names.iter().enumerate() {
                if keys.contains_key(name) || names[..i].contains(name) {
                    return Err(ApplicationError::DuplicateKey(name.clone()));
                }
            }
            let parent = resolve(keys, parent.as_deref())?;
            let items: Vec<ItemEntity> = names
                .iter()
                .map(|name| ItemEntity::new(ItemContent::new(name.as_str())))
                .collect();
            let ids: Vec<ItemId> = items.iter().map(|item| item.id()).collect();
            store.insert(items, Destination::new(parent, *index))?;
            keys.extend(names.iter().cloned().zip(ids));
        }
        Step::Remove { keys: names } => {
            let ids = lookup(keys, names);
            store.remove(&ids);
            // descendants are purged too
            keys.retain(|_, id| store.contains(*id));
        }
        Step::Move {
            keys: names,
            parent,
            index,
        } => {
            let parent = resolve(keys, parent.as_deref())?;
            let ids = lookup(keys, names);
            store.move_items(&ids, Destination::new(parent, *index))?;
        }
        Step::Set {
            keys: names,
            text,
            done,
            icon,
            value,
            downstream,
        } => {
            let mutations: Vec<Mutation> = [
                text.clone().map(Mutation::Text),
                done.map(Mutation::Done),
                icon.clone().map(Mutation::Icon),
                value.map(Mutation::Value),
            ]
            .into_iter()
            .flatten()
            .collect();
            if mutations.is_empty() {
                return Err(ApplicationError::Script {
                    message: "set step without any field".to_string(),
                });
            }
            let ids = lookup(keys, names);
            for mutation in &mutations {
                store.apply(&ids, mutation, *downstream);
            }
        }
    }
    Ok(())
}

fn resolve(
    keys: &BTreeMap<String, ItemId>,
    name: Option<&str>,
) -> ApplicationResult<Option<ItemId>> {
    name.map(|name| {
        keys.get(name)
            .copied()
            .ok_or_else(|| ApplicationError::UnknownKey(name.to_string()))
    })
    .transpose()
}

fn lookup(keys: &BTreeMap<String, ItemId>, names: &[String]) -> Vec<ItemId> {
    names
        .iter()
        .filter_map(|name| {
            let id = keys.get(name).copied();
            if id.is_none() {
                warn!(key = %name, "skipping unknown key");
            }
            id
        })
        .collect()
}
