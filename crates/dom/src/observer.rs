//! Filtered, asynchronous view over the document's update broadcast.
//!
//! A [`MutationObserver`] owns its own broadcast receiver and yields only the
//! records matching its [`ObserverOptions`]: attribute changes on the target,
//! named events dispatched at the target, and the end-of-document signal.
//! A receiver that falls too far behind yields a single [`MutationKind::Lagged`]
//! record instead of the batches it missed, so callers recompute from scratch.

use log::warn;
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::{DOMUpdate, NodeKey};

/// What an observer is interested in.
#[derive(Clone, Debug, Default)]
pub struct ObserverOptions {
    /// Attribute names to watch on the target (lowercase). `None` disables attribute records.
    pub attribute_filter: Option<Vec<String>>,
    /// Event names to deliver when dispatched at the target.
    pub events: Vec<String>,
    /// Deliver a record when the document finishes loading.
    pub document_ready: bool,
}

impl ObserverOptions {
    /// Watch the listed attributes of the target.
    pub fn attributes(names: &[&str]) -> Self {
        Self {
            attribute_filter: Some(names.iter().map(|name| name.to_ascii_lowercase()).collect()),
            ..Self::default()
        }
    }

    /// Listen for the listed events at the target.
    pub fn events(names: &[&str]) -> Self {
        Self {
            events: names.iter().map(|name| (*name).to_owned()).collect(),
            ..Self::default()
        }
    }

    /// Wait for the end-of-document signal.
    pub fn document_ready() -> Self {
        Self {
            document_ready: true,
            ..Self::default()
        }
    }
}

/// The kind of change a record describes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationKind {
    /// An attribute was set or removed.
    Attribute { name: String },
    /// An event was dispatched.
    Event { event: String },
    EndOfDocument,
    /// Batches were dropped before this observer could read them; any of them
    /// may have matched.
    Lagged { skipped: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeKey,
    pub kind: MutationKind,
}

pub struct MutationObserver {
    receiver: Receiver<Vec<DOMUpdate>>,
    target: NodeKey,
    options: ObserverOptions,
}

impl MutationObserver {
    pub fn new(receiver: Receiver<Vec<DOMUpdate>>, target: NodeKey, options: ObserverOptions) -> Self {
        Self {
            receiver,
            target,
            options,
        }
    }

    pub fn target(&self) -> NodeKey {
        self.target
    }

    /// Wait for the next batch containing matching records.
    ///
    /// Returns `None` once the document has been dropped.
    pub async fn next_records(&mut self) -> Option<Vec<MutationRecord>> {
        loop {
            match self.receiver.recv().await {
                Ok(batch) => {
                    let records = self.filter(&batch);
                    if !records.is_empty() {
                        return Some(records);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("mutation observer on {:?} skipped {skipped} batches", self.target);
                    return Some(vec![self.lagged(skipped)]);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Synchronous, non-async variant for draining pending records.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        let mut records = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(batch) => records.extend(self.filter(&batch)),
                Err(TryRecvError::Lagged(skipped)) => records.push(self.lagged(skipped)),
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        records
    }

    fn lagged(&self, skipped: u64) -> MutationRecord {
        MutationRecord {
            target: self.target,
            kind: MutationKind::Lagged { skipped },
        }
    }

    fn filter(&self, batch: &[DOMUpdate]) -> Vec<MutationRecord> {
        batch
            .iter()
            .filter_map(|update| self.record_for(update))
            .collect()
    }

    fn record_for(&self, update: &DOMUpdate) -> Option<MutationRecord> {
        let kind = match update {
            DOMUpdate::SetAttr { node, name, .. } | DOMUpdate::RemoveAttr { node, name }
                if *node == self.target && self.watches_attribute(name) =>
            {
                MutationKind::Attribute {
                    name: name.to_ascii_lowercase(),
                }
            }
            DOMUpdate::DispatchEvent { node, event }
                if *node == self.target && self.options.events.iter().any(|wanted| wanted == event) =>
            {
                MutationKind::Event {
                    event: event.clone(),
                }
            }
            DOMUpdate::EndOfDocument if self.options.document_ready => MutationKind::EndOfDocument,
            _ => return None,
        };
        Some(MutationRecord {
            target: self.target,
            kind,
        })
    }

    fn watches_attribute(&self, name: &str) -> bool {
        self.options
            .attribute_filter
            .as_ref()
            .is_some_and(|filter| filter.iter().any(|wanted| wanted.eq_ignore_ascii_case(name)))
    }
}
