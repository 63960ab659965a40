// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: identifiers, flags, listeners, and errors.

use core::fmt;

/// Identifier for a node in a [`Scene`](crate::Scene).
///
/// A small, copyable handle made of a slot index and a generation counter.
/// Removing a node frees its slot; reusing the slot bumps the generation, so a
/// stale `NodeId` never aliases a different live node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags::bitflags! {
    /// Node flags controlling visibility and picking.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible (participates in rendering and picking).
        const VISIBLE  = 0b0000_0001;
        /// Node is pickable. Clearing this marks the node (and its subtree)
        /// as explicitly non-interactive.
        const PICKABLE = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::PICKABLE
    }
}

bitflags::bitflags! {
    /// Which declared pointer areas a query honors.
    ///
    /// The empty set means geometry only: declared areas are ignored.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct PointerAreas: u8 {
        /// Honor fine-pointer (mouse) areas.
        const MOUSE = 0b01;
        /// Honor coarse-pointer (touch) areas.
        const TOUCH = 0b10;
    }
}

/// An interaction listener attached to a node.
///
/// The scene does not dispatch events; listeners are recorded so that
/// picking and inspection can tell interactive nodes apart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputListener {
    /// Short description used by inspection tools.
    pub name: Option<alloc::string::String>,
    /// The node this listener acts on, when different from the node it is
    /// attached to (for example a drag handle that moves its parent).
    pub target: Option<NodeId>,
}

impl InputListener {
    /// A listener acting on the node it is attached to.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: None,
            target: None,
        }
    }

    /// A listener acting on `target`.
    #[must_use]
    pub const fn targeting(target: NodeId) -> Self {
        Self {
            name: None,
            target: Some(target),
        }
    }
}

/// Errors returned by structural scene and accessibility-tree edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneError {
    /// An identifier did not refer to a live entry.
    StaleId,
    /// The edit would make a node its own ancestor.
    Cycle,
    /// The child is already attached to this parent.
    AlreadyChild,
    /// The node is not a child of the given parent.
    NotAChild,
    /// An insertion index was past the end of the child list.
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The current number of children.
        len: usize,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleId => f.write_str("identifier does not refer to a live entry"),
            Self::Cycle => f.write_str("edit would create a cycle"),
            Self::AlreadyChild => f.write_str("node is already a child of this parent"),
            Self::NotAChild => f.write_str("node is not a child of this parent"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "child index {index} out of bounds for {len} children")
            }
        }
    }
}

impl core::error::Error for SceneError {}
