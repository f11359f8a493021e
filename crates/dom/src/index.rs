#![allow(clippy::excessive_nesting, reason = "Tree walks over nested maps")]
//! Index over the document tree.
//!
//! Tracks tag names, attributes, class tokens, ids and form control values so
//! host lookups (`getElementById`, `querySelector`, `document.body`) stay cheap.

use std::collections::{HashMap, HashSet};

use anyhow::{Result, anyhow};
use smallvec::SmallVec;

use crate::{DOMSubscriber, DOMUpdate, NodeKey};

/// Attribute list of a single element, in insertion order.
pub type Attributes = SmallVec<(String, String), 4>;

/// Mutable state for the DOM index.
#[derive(Default, Debug)]
pub struct DomIndexState {
    /// Map node -> current tag name (for elements), lowercase.
    pub tag_by_key: HashMap<NodeKey, String>,
    /// Map node -> attributes; names are lowercase.
    pub attrs_by_key: HashMap<NodeKey, Attributes>,
    /// Map node -> current class list tokens (lowercase).
    pub classes_by_key: HashMap<NodeKey, HashSet<String>>,
    /// Map form control -> current value.
    pub value_by_key: HashMap<NodeKey, String>,
    /// Parent -> children relation, in insertion order.
    pub children_by_parent: HashMap<NodeKey, Vec<NodeKey>>,
    /// Child -> parent relation.
    pub parent_by_child: HashMap<NodeKey, NodeKey>,
    /// Lookup indices
    pub id_index: HashMap<String, NodeKey>,
    pub class_index: HashMap<String, Vec<NodeKey>>,
}

impl DomIndexState {
    /// Whether the node is the document or a known element.
    pub fn contains(&self, node: NodeKey) -> bool {
        node == NodeKey::ROOT || self.tag_by_key.contains_key(&node)
    }

    fn ensure_known(&self, node: NodeKey) -> Result<()> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(anyhow!("unknown node {node:?}"))
        }
    }

    /// Remove a node (and its descendants) from all indices.
    fn remove_recursively(&mut self, node: NodeKey) {
        if let Some(children) = self.children_by_parent.remove(&node) {
            for child in children {
                self.remove_recursively(child);
            }
        }
        if let Some(parent) = self.parent_by_child.remove(&node)
            && let Some(siblings) = self.children_by_parent.get_mut(&parent)
        {
            siblings.retain(|sibling| *sibling != node);
        }
        if let Some(attrs) = self.attrs_by_key.remove(&node) {
            for (name, value) in attrs.iter() {
                if name == "id" && self.id_index.get(value) == Some(&node) {
                    self.id_index.remove(value);
                }
            }
        }
        self.tag_by_key.remove(&node);
        self.set_classes_for(node, "");
        self.value_by_key.remove(&node);
    }

    /// Update class indices for a node from a whitespace-separated class attribute.
    fn set_classes_for(&mut self, node: NodeKey, class_attr: &str) {
        if let Some(prev) = self.classes_by_key.remove(&node) {
            for class in prev {
                if let Some(list) = self.class_index.get_mut(&class) {
                    list.retain(|key| *key != node);
                }
            }
        }
        let mut set = HashSet::new();
        for token in class_attr.split_whitespace() {
            let lowered = token.to_ascii_lowercase();
            if set.insert(lowered.clone()) {
                self.class_index.entry(lowered).or_default().push(node);
            }
        }
        if !set.is_empty() {
            self.classes_by_key.insert(node, set);
        }
    }

    fn set_attr(&mut self, node: NodeKey, name: &str, value: String) {
        let name_lc = name.to_ascii_lowercase();
        if name_lc == "id" {
            if let Some(old) = self.attribute(node, "id").map(str::to_owned)
                && self.id_index.get(&old) == Some(&node)
            {
                self.id_index.remove(&old);
            }
            if !value.is_empty() {
                self.id_index.insert(value.clone(), node);
            }
        } else if name_lc == "class" {
            self.set_classes_for(node, &value);
        }
        let attrs = self.attrs_by_key.entry(node).or_default();
        if let Some(slot) = attrs.iter_mut().find(|(existing, _)| *existing == name_lc) {
            slot.1 = value;
        } else {
            attrs.push((name_lc, value));
        }
    }

    fn remove_attr(&mut self, node: NodeKey, name: &str) {
        let name_lc = name.to_ascii_lowercase();
        let Some(attrs) = self.attrs_by_key.get_mut(&node) else {
            return;
        };
        let Some(position) = attrs.iter().position(|(existing, _)| *existing == name_lc) else {
            return;
        };
        let (_, old) = attrs.remove(position);
        if name_lc == "id" && self.id_index.get(&old) == Some(&node) {
            self.id_index.remove(&old);
        } else if name_lc == "class" {
            self.set_classes_for(node, "");
        }
    }
}

impl DOMSubscriber for DomIndexState {
    /// Apply a DOM update to keep indices current.
    fn apply_update(&mut self, update: DOMUpdate) -> Result<()> {
        use DOMUpdate::*;
        match update {
            InsertElement { parent, node, tag } => {
                self.ensure_known(parent)?;
                if self.contains(node) {
                    return Err(anyhow!("node {node:?} already inserted"));
                }
                self.parent_by_child.insert(node, parent);
                self.children_by_parent.entry(parent).or_default().push(node);
                self.tag_by_key.insert(node, tag.to_ascii_lowercase());
            }
            SetAttr { node, name, value } => {
                self.ensure_known(node)?;
                self.set_attr(node, &name, value);
            }
            RemoveAttr { node, name } => {
                self.ensure_known(node)?;
                self.remove_attr(node, &name);
            }
            SetValue { node, value } => {
                self.ensure_known(node)?;
                self.value_by_key.insert(node, value);
            }
            DispatchEvent { node, .. } => {
                self.ensure_known(node)?;
            }
            RemoveNode { node } => {
                if node == NodeKey::ROOT {
                    return Err(anyhow!("the document node cannot be removed"));
                }
                self.remove_recursively(node);
            }
            EndOfDocument => {}
        }
        Ok(())
    }
}

/// Accessor helpers for host functions.
impl DomIndexState {
    /// Return the value of an attribute (name is case-insensitive).
    pub fn attribute(&self, node: NodeKey, name: &str) -> Option<&str> {
        self.attrs_by_key.get(&node).and_then(|attrs| {
            attrs
                .iter()
                .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }

    /// Return the current value of a form control, if one was set.
    pub fn value(&self, node: NodeKey) -> Option<&str> {
        self.value_by_key.get(&node).map(String::as_str)
    }

    /// Whether the element carries the given class token (case-insensitive).
    pub fn has_class(&self, node: NodeKey, class: &str) -> bool {
        self.classes_by_key
            .get(&node)
            .is_some_and(|classes| classes.contains(&class.to_ascii_lowercase()))
    }

    /// Return the lowercase tag name of an element.
    pub fn tag_name(&self, node: NodeKey) -> Option<&str> {
        self.tag_by_key.get(&node).map(String::as_str)
    }

    /// Return the `<html>` element, the first `html` child of the document node.
    pub fn document_element(&self) -> Option<NodeKey> {
        self.first_child_with_tag(NodeKey::ROOT, "html")
    }

    /// Return the `<body>` element, the first `body` child of the document element.
    pub fn body(&self) -> Option<NodeKey> {
        self.first_child_with_tag(self.document_element()?, "body")
    }

    fn first_child_with_tag(&self, parent: NodeKey, tag: &str) -> Option<NodeKey> {
        self.children_by_parent
            .get(&parent)?
            .iter()
            .copied()
            .find(|child| self.tag_name(*child) == Some(tag))
    }

    /// Return the NodeKey for the element with the given id (case-sensitive, per HTML spec).
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeKey> {
        self.id_index.get(id).copied()
    }

    /// Return NodeKeys for elements with a given tag name (case-insensitive), in DOM order.
    pub fn get_elements_by_tag_name(&self, tag: &str) -> Vec<NodeKey> {
        let needle = tag.to_ascii_lowercase();
        self.collect_in_order(|state, node| state.tag_name(node) == Some(needle.as_str()))
    }

    /// Return NodeKeys for elements that have the given class token, in DOM order.
    pub fn get_elements_by_class_name(&self, class: &str) -> Vec<NodeKey> {
        let needle = class.to_ascii_lowercase();
        if !self.class_index.get(&needle).is_some_and(|list| !list.is_empty()) {
            return Vec::new();
        }
        self.collect_in_order(|state, node| state.has_class(node, &needle))
    }

    /// Resolve a simple selector: `#id`, `.class` or a bare tag name.
    ///
    /// Returns the first match in DOM order.
    pub fn query_selector(&self, selector: &str) -> Option<NodeKey> {
        let selector = selector.trim();
        if let Some(id) = selector.strip_prefix('#') {
            self.get_element_by_id(id)
        } else if let Some(class) = selector.strip_prefix('.') {
            self.get_elements_by_class_name(class).first().copied()
        } else if selector.is_empty() {
            None
        } else {
            self.get_elements_by_tag_name(selector).first().copied()
        }
    }

    fn collect_in_order<F>(&self, matches: F) -> Vec<NodeKey>
    where
        F: Fn(&Self, NodeKey) -> bool,
    {
        fn walk<F>(state: &DomIndexState, node: NodeKey, matches: &F, out: &mut Vec<NodeKey>)
        where
            F: Fn(&DomIndexState, NodeKey) -> bool,
        {
            if node != NodeKey::ROOT && matches(state, node) {
                out.push(node);
            }
            if let Some(children) = state.children_by_parent.get(&node) {
                for child in children {
                    walk(state, *child, matches, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(self, NodeKey::ROOT, &matches, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(state: &mut DomIndexState, parent: u64, node: u64, tag: &str) {
        state
            .apply_update(DOMUpdate::InsertElement {
                parent: NodeKey(parent),
                node: NodeKey(node),
                tag: tag.to_owned(),
            })
            .unwrap();
    }

    fn set_attr(state: &mut DomIndexState, node: u64, name: &str, value: &str) {
        state
            .apply_update(DOMUpdate::SetAttr {
                node: NodeKey(node),
                name: name.to_owned(),
                value: value.to_owned(),
            })
            .unwrap();
    }

    #[test]
    fn document_element_and_body_are_resolved_by_tag() {
        let mut state = DomIndexState::default();
        insert(&mut state, 0, 1, "HTML");
        insert(&mut state, 1, 2, "head");
        insert(&mut state, 1, 3, "body");
        assert_eq!(state.document_element(), Some(NodeKey(1)));
        assert_eq!(state.body(), Some(NodeKey(3)));
    }

    #[test]
    fn class_attribute_rewrites_replace_previous_tokens() {
        let mut state = DomIndexState::default();
        insert(&mut state, 0, 1, "div");
        set_attr(&mut state, 1, "class", "a B");
        assert!(state.has_class(NodeKey(1), "b"));
        set_attr(&mut state, 1, "class", "c");
        assert!(!state.has_class(NodeKey(1), "a"));
        assert!(state.get_elements_by_class_name("a").is_empty());
        assert_eq!(state.query_selector(".c"), Some(NodeKey(1)));
    }

    #[test]
    fn id_changes_keep_reverse_index_current() {
        let mut state = DomIndexState::default();
        insert(&mut state, 0, 1, "link");
        set_attr(&mut state, 1, "id", "first");
        set_attr(&mut state, 1, "ID", "second");
        assert_eq!(state.get_element_by_id("first"), None);
        assert_eq!(state.query_selector("#second"), Some(NodeKey(1)));
        assert_eq!(state.attribute(NodeKey(1), "id"), Some("second"));
    }

    #[test]
    fn removing_a_subtree_clears_lookups() {
        let mut state = DomIndexState::default();
        insert(&mut state, 0, 1, "html");
        insert(&mut state, 1, 2, "select");
        set_attr(&mut state, 2, "class", "combo");
        set_attr(&mut state, 2, "id", "picker");
        state
            .apply_update(DOMUpdate::RemoveNode { node: NodeKey(1) })
            .unwrap();
        assert_eq!(state.query_selector(".combo"), None);
        assert_eq!(state.get_element_by_id("picker"), None);
        assert_eq!(state.document_element(), None);
    }

    #[test]
    fn updates_for_unknown_nodes_are_rejected() {
        let mut state = DomIndexState::default();
        let result = state.apply_update(DOMUpdate::SetValue {
            node: NodeKey(9),
            value: String::from("ar"),
        });
        assert!(result.is_err());
    }
}
