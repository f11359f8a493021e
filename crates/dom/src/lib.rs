//! Minimal in-memory DOM runtime.
//!
//! The document is modelled as a stream of batched [`DOMUpdate`] values. The
//! [`Dom`] runtime applies each batch to its [`DomIndexState`] and then
//! broadcasts the batch to every subscriber, which is how mutation observers
//! and event listeners learn about changes made by other parties.

#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

pub mod document;
pub use document::{Dom, ReadyState, SharedDom};

/// Element, attribute, class and form value indices kept in DOM order.
pub mod index;
pub use index::DomIndexState;

pub mod observer;
pub use observer::{MutationKind, MutationObserver, MutationRecord, ObserverOptions};

/// A 64-bit stable key for DOM nodes used to correlate asynchronous updates.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeKey(pub u64);

impl NodeKey {
    /// The document node (always present).
    pub const ROOT: Self = Self(0);
}

/// A batchable update applied to the runtime DOM and mirrored to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DOMUpdate {
    InsertElement {
        parent: NodeKey,
        node: NodeKey,
        tag: String,
    },
    SetAttr {
        node: NodeKey,
        name: String,
        value: String,
    },
    RemoveAttr {
        node: NodeKey,
        name: String,
    },
    /// Change the current value of a form control (for example a `<select>`).
    SetValue {
        node: NodeKey,
        value: String,
    },
    /// Fire a named event at a node. Carries no state change of its own.
    DispatchEvent {
        node: NodeKey,
        event: String,
    },
    RemoveNode {
        node: NodeKey,
    },
    /// The parser finished; the document is no longer loading.
    EndOfDocument,
}

/// A subscriber that receives `DOMUpdate` values and mirrors them into its own state.
pub trait DOMSubscriber {
    /// Apply a single `DOMUpdate` to the subscriber state.
    ///
    /// # Errors
    /// Returns an error if the update references a node the subscriber does not know.
    fn apply_update(&mut self, update: DOMUpdate) -> anyhow::Result<()>;
}
