// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The accessibility tree: a parallel tree of semantic instances.
//!
//! Each [`AccessNode`] describes one accessible element (its tag name and its
//! label, description, and inner content) and records the trail of scene
//! nodes that produced it. Unlike the scene, this is a strict tree.

use alloc::string::String;
use alloc::vec::Vec;

use crate::types::{NodeId, SceneError};

/// Identifier for an instance in an [`AccessTree`].
///
/// Generational, like [`NodeId`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct AccessId(u32, u32);

/// One accessible instance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessNode {
    /// Root-to-node scene trail of the node that produced this instance.
    pub trail: Vec<NodeId>,
    /// Element tag, for example `"button"` or `"div"`.
    pub tag_name: String,
    /// Accessible name.
    pub label: Option<String>,
    /// Accessible description.
    pub description: Option<String>,
    /// Inner text content.
    pub content: Option<String>,
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Clone, Debug)]
struct Entry {
    node: AccessNode,
    parent: Option<AccessId>,
    children: Vec<AccessId>,
    children_revision: u64,
}

/// An arena-backed accessibility tree with a single root.
#[derive(Clone, Debug, Default)]
pub struct AccessTree {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    root: Option<AccessId>,
}

impl AccessTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The root instance, if any.
    #[must_use]
    pub fn root(&self) -> Option<AccessId> {
        self.root
    }

    /// Insert `node` as the last child of `parent`, or as the root when
    /// `parent` is `None` (replacing and removing any previous root).
    pub fn insert(
        &mut self,
        parent: Option<AccessId>,
        node: AccessNode,
    ) -> Result<AccessId, SceneError> {
        if let Some(parent) = parent
            && self.entry(parent).is_none()
        {
            return Err(SceneError::StaleId);
        }
        if parent.is_none()
            && let Some(old) = self.root
        {
            self.remove(old);
        }
        let entry = Entry {
            node,
            parent,
            children: Vec::new(),
            children_revision: 0,
        };
        let id = if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.entry = Some(entry);
            AccessId(idx, slot.generation)
        } else {
            let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Slot {
                generation: 1,
                entry: Some(entry),
            });
            AccessId(idx, 1)
        };
        match parent {
            Some(parent) => {
                let parent = self.entry_mut(parent).ok_or(SceneError::StaleId)?;
                parent.children.push(id);
                parent.children_revision += 1;
            }
            None => self.root = Some(id),
        }
        Ok(id)
    }

    /// Remove an instance and its whole subtree.
    pub fn remove(&mut self, id: AccessId) -> Option<AccessNode> {
        let parent = self.entry(id)?.parent;
        match parent {
            Some(parent) => {
                if let Some(entry) = self.entry_mut(parent) {
                    entry.children.retain(|&c| c != id);
                    entry.children_revision += 1;
                }
            }
            None => self.root = None,
        }
        let mut stack: Vec<AccessId> = self.children_of(id).to_vec();
        while let Some(child) = stack.pop() {
            stack.extend_from_slice(self.children_of(child));
            self.free(child);
        }
        self.free(id)
    }

    /// Returns `true` if `id` refers to a live instance.
    #[must_use]
    pub fn is_alive(&self, id: AccessId) -> bool {
        self.entry(id).is_some()
    }

    /// Instance data for `id`.
    #[must_use]
    pub fn node(&self, id: AccessId) -> Option<&AccessNode> {
        self.entry(id).map(|e| &e.node)
    }

    /// Mutable instance data for `id`.
    pub fn node_mut(&mut self, id: AccessId) -> Option<&mut AccessNode> {
        self.entry_mut(id).map(|e| &mut e.node)
    }

    /// Ordered children of `id`. Empty for stale ids.
    #[must_use]
    pub fn children_of(&self, id: AccessId) -> &[AccessId] {
        self.entry(id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    /// A counter bumped whenever the child list of `id` changes.
    #[must_use]
    pub fn children_revision(&self, id: AccessId) -> u64 {
        self.entry(id).map_or(0, |e| e.children_revision)
    }

    fn free(&mut self, id: AccessId) -> Option<AccessNode> {
        let slot = self.slots.get_mut(id.0 as usize)?;
        if slot.generation != id.1 {
            return None;
        }
        let entry = slot.entry.take()?;
        self.free_list.push(id.0);
        Some(entry.node)
    }

    fn entry(&self, id: AccessId) -> Option<&Entry> {
        let slot = self.slots.get(id.0 as usize)?;
        if slot.generation != id.1 {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, id: AccessId) -> Option<&mut Entry> {
        let slot = self.slots.get_mut(id.0 as usize)?;
        if slot.generation != id.1 {
            return None;
        }
        slot.entry.as_mut()
    }
}
