//! The runtime document: applies update batches and fans them out to subscribers.

use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use log::trace;
use tokio::sync::broadcast;

use crate::index::DomIndexState;
use crate::observer::{MutationObserver, ObserverOptions};
use crate::{DOMSubscriber, DOMUpdate, NodeKey};

/// Number of batches a slow subscriber may fall behind before it starts lagging.
const BROADCAST_CAPACITY: usize = 64;

/// Document loading state, as exposed by `document.readyState`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ReadyState {
    #[default]
    Loading,
    Interactive,
}

/// Document shared between the host and the tasks reacting to it.
pub type SharedDom = Arc<Mutex<Dom>>;

#[derive(Debug)]
pub struct Dom {
    index: DomIndexState,
    ready_state: ReadyState,
    next_key: u64,
    update_sender: broadcast::Sender<Vec<DOMUpdate>>,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create an empty document in the `Loading` state.
    pub fn new() -> Self {
        let (update_sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            index: DomIndexState::default(),
            ready_state: ReadyState::Loading,
            next_key: 1,
            update_sender,
        }
    }

    /// Wrap the document for sharing across tasks.
    pub fn into_shared(self) -> SharedDom {
        Arc::new(Mutex::new(self))
    }

    pub fn index(&self) -> &DomIndexState {
        &self.index
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Subscribe to every batch applied from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<DOMUpdate>> {
        self.update_sender.subscribe()
    }

    /// Create a filtered observer on `target`, starting from the next batch.
    pub fn observe(&self, target: NodeKey, options: ObserverOptions) -> MutationObserver {
        MutationObserver::new(self.subscribe(), target, options)
    }

    /// Mint a key that is not used by any node of this document.
    pub fn allocate_key(&mut self) -> NodeKey {
        let key = NodeKey(self.next_key);
        self.next_key = self.next_key.wrapping_add(1);
        key
    }

    /// Apply a batch and broadcast it to subscribers.
    ///
    /// Updates are applied in order. The first failing update stops the batch:
    /// the updates before it stay applied and are broadcast on their own, so
    /// subscribers always see exactly what the document committed.
    ///
    /// # Errors
    /// Returns an error if an update references an unknown node.
    pub fn apply(&mut self, mut batch: Vec<DOMUpdate>) -> Result<()> {
        let mut applied = 0;
        let mut failure = None;
        for update in &batch {
            if let Err(err) = self.index.apply_update(update.clone()) {
                failure = Some(err);
                break;
            }
            match update {
                DOMUpdate::EndOfDocument => self.ready_state = ReadyState::Interactive,
                DOMUpdate::InsertElement { node, .. } => {
                    self.next_key = self.next_key.max(node.0.wrapping_add(1));
                }
                _ => {}
            }
            applied += 1;
        }
        batch.truncate(applied);
        if !batch.is_empty() && self.update_sender.send(batch).is_err() {
            trace!("DOM batch applied with no subscribers");
        }
        failure.map_or(Ok(()), Err)
    }

    /// Append a new element under `parent` and return its key.
    ///
    /// # Errors
    /// Returns an error if `parent` is not part of the document.
    pub fn create_element(&mut self, parent: NodeKey, tag: &str) -> Result<NodeKey> {
        let node = self.allocate_key();
        self.apply(vec![DOMUpdate::InsertElement {
            parent,
            node,
            tag: tag.to_owned(),
        }])?;
        Ok(node)
    }

    /// # Errors
    /// Returns an error if `node` is not part of the document.
    pub fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) -> Result<()> {
        self.apply(vec![DOMUpdate::SetAttr {
            node,
            name: name.to_owned(),
            value: value.to_owned(),
        }])
    }

    /// # Errors
    /// Returns an error if `node` is not part of the document.
    pub fn remove_attribute(&mut self, node: NodeKey, name: &str) -> Result<()> {
        self.apply(vec![DOMUpdate::RemoveAttr {
            node,
            name: name.to_owned(),
        }])
    }

    /// # Errors
    /// Returns an error if `node` is not part of the document.
    pub fn set_value(&mut self, node: NodeKey, value: &str) -> Result<()> {
        self.apply(vec![DOMUpdate::SetValue {
            node,
            value: value.to_owned(),
        }])
    }

    /// # Errors
    /// Returns an error if `node` is not part of the document.
    pub fn dispatch_event(&mut self, node: NodeKey, event: &str) -> Result<()> {
        self.apply(vec![DOMUpdate::DispatchEvent {
            node,
            event: event.to_owned(),
        }])
    }

    /// Add a class token, keeping the existing attribute order (`classList.add`).
    ///
    /// # Errors
    /// Returns an error if `node` is not part of the document.
    pub fn add_class(&mut self, node: NodeKey, class: &str) -> Result<()> {
        if self.index.has_class(node, class) {
            return self.ensure_present(node);
        }
        let current = self.index.attribute(node, "class").unwrap_or_default();
        let mut tokens: Vec<&str> = current.split_whitespace().collect();
        tokens.push(class);
        let value = tokens.join(" ");
        self.set_attribute(node, "class", &value)
    }

    /// Remove a class token if present (`classList.remove`).
    ///
    /// # Errors
    /// Returns an error if `node` is not part of the document.
    pub fn remove_class(&mut self, node: NodeKey, class: &str) -> Result<()> {
        if !self.index.has_class(node, class) {
            return self.ensure_present(node);
        }
        let value = self
            .index
            .attribute(node, "class")
            .unwrap_or_default()
            .split_whitespace()
            .filter(|token| !token.eq_ignore_ascii_case(class))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute(node, "class", &value)
    }

    /// Signal that parsing finished (`DOMContentLoaded`).
    ///
    /// # Errors
    /// Never fails for a well-formed document; kept fallible like every other batch.
    pub fn finish_loading(&mut self) -> Result<()> {
        self.apply(vec![DOMUpdate::EndOfDocument])
    }

    fn ensure_present(&self, node: NodeKey) -> Result<()> {
        if self.index.contains(node) {
            Ok(())
        } else {
            Err(anyhow!("unknown node {node:?}"))
        }
    }
}
