//! Import decision tracking.
//!
//! A tracker sits between one category's generator and the decision stream.
//! For each generator input it finds the candidate item the input refers to,
//! decides whether that item is already recorded in the prior import state,
//! and publishes the decision before handing the flag back to the generator.

use crate::generation::bind::{BindData, GenerateInput};
use crate::generation::input::ModelInput;
use crate::naming::{snake_to_pascal, to_snake};
use crate::resource::{Bucket, Function, Role};
use crate::state::{ImportDecision, ImportState, ItemKey};
use crate::types::ResourceCategory;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Capabilities every importable item provides: its category, its identity
/// in the import state, and the equality check against its category's bind
/// data.
pub trait ImportItem {
    const CATEGORY: ResourceCategory;

    fn identity(&self) -> String;

    fn display_name(&self) -> &str;

    fn matches(&self, bind: &BindData) -> bool;
}

impl ImportItem for ModelInput {
    const CATEGORY: ResourceCategory = ResourceCategory::Model;

    fn identity(&self) -> String {
        self.table.key().to_string()
    }

    fn display_name(&self) -> &str {
        &self.table.name
    }

    fn matches(&self, bind: &BindData) -> bool {
        match bind {
            BindData::Model(b) => {
                b.schema == self.table.schema && b.struct_name == snake_to_pascal(&self.table.name)
            }
            _ => false,
        }
    }
}

impl ImportItem for Role {
    const CATEGORY: ResourceCategory = ResourceCategory::Role;

    fn identity(&self) -> String {
        self.name.clone()
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn matches(&self, bind: &BindData) -> bool {
        matches!(bind, BindData::Role(b) if b.name == self.name)
    }
}

impl ImportItem for Function {
    const CATEGORY: ResourceCategory = ResourceCategory::Rpc;

    fn identity(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn matches(&self, bind: &BindData) -> bool {
        matches!(
            bind,
            BindData::Rpc(b) if b.schema == self.schema && b.name == snake_to_pascal(&self.name)
        )
    }
}

impl ImportItem for Bucket {
    const CATEGORY: ResourceCategory = ResourceCategory::Storage;

    fn identity(&self) -> String {
        self.name.clone()
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn matches(&self, bind: &BindData) -> bool {
        matches!(bind, BindData::Storage(b) if to_snake(&b.name) == to_snake(&self.name))
    }
}

pub type ItemMatcher<T> = fn(&T, &BindData) -> bool;

pub struct ImportDecisionTracker<'a, T, M = ItemMatcher<T>> {
    items: &'a [T],
    matches: M,
    prior: Arc<ImportState>,
    sender: mpsc::Sender<ImportDecision>,
    published: usize,
}

impl<'a, T: ImportItem> ImportDecisionTracker<'a, T> {
    /// Tracker using the item's own equality check.
    pub fn new(
        items: &'a [T],
        prior: Arc<ImportState>,
        sender: mpsc::Sender<ImportDecision>,
    ) -> Self {
        Self::with_matcher(items, T::matches, prior, sender)
    }
}

impl<'a, T, M> ImportDecisionTracker<'a, T, M>
where
    T: ImportItem,
    M: Fn(&T, &BindData) -> bool,
{
    pub fn with_matcher(
        items: &'a [T],
        matches: M,
        prior: Arc<ImportState>,
        sender: mpsc::Sender<ImportDecision>,
    ) -> Self {
        Self {
            items,
            matches,
            prior,
            sender,
            published: 0,
        }
    }

    /// Decide and publish for one generator input.
    ///
    /// Blocks while the decision channel is full; must be called from a
    /// blocking context, never from inside an async task.
    pub fn capture(&mut self, input: &GenerateInput) -> bool {
        let Some(item) = self
            .items
            .iter()
            .find(|item| (self.matches)(*item, &input.bind_data))
        else {
            warn!(
                category = %T::CATEGORY,
                input_category = %input.bind_data.category(),
                output_path = %input.output_path.display(),
                "No import item matches generated input"
            );
            return false;
        };

        let key = ItemKey::new(T::CATEGORY, item.identity());
        let existing = self.prior.contains(&key);
        debug!(
            category = %T::CATEGORY,
            identity = %key.identity,
            existing,
            "Captured import decision"
        );

        let decision = ImportDecision {
            key,
            name: item.display_name().to_string(),
            output_path: input.output_path.clone(),
            existing,
        };
        if self.sender.blocking_send(decision).is_err() {
            warn!(category = %T::CATEGORY, "Decision stream closed, decision dropped");
        } else {
            self.published += 1;
        }

        existing
    }

    pub fn published(&self) -> usize {
        self.published
    }
}
